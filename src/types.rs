use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A repository as returned by `GET /users/{user}/repos`.
///
/// Values only come out of a decoded response, so the fields stay private and
/// are read through accessors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    id: u64,
    name: String,
    html_url: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: Option<u32>,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Repository {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical web URL, used for both opening and sharing.
    pub fn html_url(&self) -> &str {
        &self.html_url
    }

    pub fn full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn stargazers_count(&self) -> Option<u32> {
        self.stargazers_count
    }

    pub fn is_fork(&self) -> bool {
        self.fork
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}
