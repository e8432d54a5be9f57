use crate::error::{LookupError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Hands a URL to an external browser.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<()>;
}

/// Hands plain text to whatever the user shares links with.
#[async_trait]
pub trait ShareSink: Send + Sync {
    async fn share(&self, text: &str) -> Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        if cfg!(target_os = "macos") {
            let mut command = Command::new("open");
            command.arg(url);
            command
        } else if cfg!(target_os = "windows") {
            let mut command = Command::new("cmd");
            command.args(["/C", "start", "", url]);
            command
        } else {
            let mut command = Command::new("xdg-open");
            command.arg(url);
            command
        }
    }
}

#[async_trait]
impl UrlOpener for SystemOpener {
    async fn open(&self, url: &str) -> Result<()> {
        let mut command = Self::command(url);
        let program = command.as_std().get_program().to_string_lossy().into_owned();
        let launch_err = |source| LookupError::Launch {
            command: program.clone(),
            source,
        };

        let mut child = command
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(launch_err)?;

        // Reap the launcher so it does not linger as a zombie.
        let status = child.wait().await.map_err(launch_err)?;
        debug!(%status, program = %program, "Browser launcher exited");

        info!(url, "Opened repository in browser");
        Ok(())
    }
}

/// Shares text by piping it into a command, or by printing it when no command
/// is configured.
#[derive(Debug, Default)]
pub struct CommandSharer {
    command: Option<Vec<String>>,
}

impl CommandSharer {
    /// `command_line` is split on whitespace, e.g. `"xclip -selection clipboard"`.
    pub fn new(command_line: Option<&str>) -> Result<Self> {
        let command = match command_line {
            None => None,
            Some(line) => {
                let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
                if parts.is_empty() {
                    return Err(LookupError::Config("share command is empty".to_string()));
                }
                Some(parts)
            }
        };

        Ok(CommandSharer { command })
    }
}

#[async_trait]
impl ShareSink for CommandSharer {
    async fn share(&self, text: &str) -> Result<()> {
        let Some(parts) = &self.command else {
            println!("{}", text);
            return Ok(());
        };

        let launch_err = |source| LookupError::Launch {
            command: parts.join(" "),
            source,
        };

        let mut child = Command::new(&parts[0])
            .args(&parts[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(launch_err)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(launch_err)?;
            // Closing stdin lets the command see end of input.
            drop(stdin);
        }
        child.wait().await.map_err(launch_err)?;

        debug!(command = %parts.join(" "), "Shared repository link");
        Ok(())
    }
}
