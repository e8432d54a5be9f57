use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Settings store error: {0}")]
    Settings(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Terminal input error: {0}")]
    Input(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Controller error: {0}")]
    Actor(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;

/// Any failure to obtain or decode a user's repository list.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed repository list: {0}")]
    Decode(#[from] serde_json::Error),
}
