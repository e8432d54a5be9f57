use crate::types::Repository;

/// Fixed text shown to the user when a lookup fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch repositories";

/// Where the latest lookup stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupStatus {
    #[default]
    Idle,
    Loading,
    Success(Vec<Repository>),
    Failed(String),
}

impl LookupStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupStatus::Loading)
    }
}

/// One fetch-and-render cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSession {
    /// Sequence number of the request, strictly increasing per controller.
    pub request: u64,
    pub username: String,
    pub status: LookupStatus,
}

impl LookupSession {
    pub fn new(request: u64, username: String) -> Self {
        Self {
            request,
            username,
            status: LookupStatus::Loading,
        }
    }
}

/// Point-in-time view of the controller's state.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSnapshot {
    pub input: String,
    pub input_enabled: bool,
    pub loading: bool,
    pub session: Option<LookupSession>,
    /// Rows currently on screen; kept across failed lookups.
    pub rendered: Vec<Repository>,
    pub requests_issued: u64,
}

impl LookupSnapshot {
    pub fn status(&self) -> LookupStatus {
        self.session
            .as_ref()
            .map(|session| session.status.clone())
            .unwrap_or_default()
    }
}
