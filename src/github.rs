use crate::error::{FetchError, Result};
use crate::types::Repository;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

pub const API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "GitHub Repo Lookup/0.1.0";

/// Anything that can list a user's public repositories.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    async fn fetch_repositories(
        &self,
        username: &str,
    ) -> std::result::Result<Vec<Repository>, FetchError>;
}

pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(base_url: &Url, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(GitHubClient {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for a username. The name goes into the path as typed.
    pub fn repositories_url(&self, username: &str) -> String {
        format!("{}/users/{}/repos", self.base_url, username)
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn fetch_repositories(
        &self,
        username: &str,
    ) -> std::result::Result<Vec<Repository>, FetchError> {
        let url = self.repositories_url(username);
        debug!(%url, "Requesting repository list");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status { status, body });
        }

        let repositories: Vec<Repository> = serde_json::from_str(&body)?;
        debug!(username, count = repositories.len(), "Decoded repository list");

        Ok(repositories)
    }
}
