use anyhow::Context;
use clap::Parser;
use colored::*;
use github_repo_lookup::actors::{LookupController, LookupControllerArgs};
use github_repo_lookup::cli::Cli;
use github_repo_lookup::github::GitHubClient;
use github_repo_lookup::platform::{CommandSharer, SystemOpener};
use github_repo_lookup::repl::{self, HELP};
use github_repo_lookup::settings::{FileSettingsStore, MemorySettingsStore, SettingsStore};
use github_repo_lookup::view::{LookupView, TerminalView};
use std::io::BufReader;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Logs go to stderr so shared links on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!("{}", "GitHub Repo Lookup".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());
    println!("{}\n", HELP.dimmed());

    let settings: Arc<dyn SettingsStore> = if cli.ephemeral {
        println!("{}", "Settings are kept in memory for this session".yellow());
        Arc::new(MemorySettingsStore::new())
    } else {
        let path = cli
            .settings_file
            .clone()
            .or_else(FileSettingsStore::default_path)
            .context("No config directory found, pass --settings-file or --ephemeral")?;
        Arc::new(
            FileSettingsStore::open(path.clone())
                .await
                .with_context(|| format!("Failed to open settings at {}", path.display()))?,
        )
    };

    let source = Arc::new(GitHubClient::new(&cli.api_url, &cli.user_agent)?);
    let sharer = Arc::new(CommandSharer::new(cli.share_command.as_deref())?);
    let view: Arc<dyn LookupView> = Arc::new(TerminalView);

    let (controller, handle) = LookupController::spawn(LookupControllerArgs {
        source,
        settings,
        view: view.clone(),
        opener: Arc::new(SystemOpener),
        sharer,
    })
    .await
    .context("Failed to start lookup controller")?;

    info!(api_url = %cli.api_url, "Lookup session started");

    let input = repl::spawn_line_reader(BufReader::new(std::io::stdin()));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        println!();
    };

    repl::session(input, &controller, view.as_ref(), shutdown).await?;

    controller.stop(None);
    handle.await.context("Lookup controller panicked")?;

    println!("{}", "Bye".dimmed());
    Ok(())
}
