use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::github::{API_BASE_URL, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(name = "github-repo-lookup")]
#[command(about = "GitHub Repo Lookup - Lists a user's public repositories and opens or shares them")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = API_BASE_URL)]
    pub api_url: Url,

    /// Settings file holding the last username (defaults to the user config directory)
    #[arg(long, env = "SETTINGS_FILE")]
    pub settings_file: Option<PathBuf>,

    /// Keep settings in memory only for this session
    #[arg(long, conflicts_with = "settings_file")]
    pub ephemeral: bool,

    /// Command that receives shared links on stdin, e.g. "xclip -selection clipboard"
    #[arg(long, env = "SHARE_COMMAND")]
    pub share_command: Option<String>,

    /// User-Agent sent to the GitHub API
    #[arg(long, env = "GITHUB_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}
