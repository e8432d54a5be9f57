use crate::actors::{LookupController, LookupControllerMessage};
use crate::error::{LookupError, Result};
use crate::view::LookupView;
use colored::*;
use ractor::ActorRef;
use std::future::Future;
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Lines read from the terminal, or the error that ended reading.
pub type InputLines = mpsc::Receiver<std::io::Result<String>>;

const INPUT_BUFFER: usize = 16;

pub const HELP: &str = "\
Type a GitHub username and press Enter to list its public repositories.
  :open N    open row N in the browser
  :share N   share the link of row N
  :list      show the current rows again
  :help      show this help
  :quit      exit";

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Confirm this text as the username. May be blank.
    Submit(String),
    /// Open the row at this one-based position.
    Open(usize),
    /// Share the row at this one-based position.
    Share(usize),
    List,
    Help,
    Quit,
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(command) = line.trim_start().strip_prefix(':') else {
            return ReplCommand::Submit(line.to_string());
        };

        let mut words = command.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("open"), Some(n), None) => Self::position(n).map_or_else(
                || ReplCommand::Invalid(format!("not a row number: {}", n)),
                ReplCommand::Open,
            ),
            (Some("share"), Some(n), None) => Self::position(n).map_or_else(
                || ReplCommand::Invalid(format!("not a row number: {}", n)),
                ReplCommand::Share,
            ),
            (Some("list"), None, None) => ReplCommand::List,
            (Some("help"), None, None) => ReplCommand::Help,
            (Some("quit" | "q" | "exit"), None, None) => ReplCommand::Quit,
            _ => ReplCommand::Invalid(format!("unknown command: {}", line.trim())),
        }
    }

    fn position(word: &str) -> Option<usize> {
        word.parse::<usize>().ok().filter(|n| *n > 0)
    }
}

/// Reads lines on a dedicated OS thread and forwards them over a channel.
///
/// A read blocked on the terminal never holds up runtime shutdown; the thread
/// is left behind and ends with the process.
pub fn spawn_line_reader<R>(reader: R) -> InputLines
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);

    std::thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });

    rx
}

/// Runs the command loop until it ends on its own or `shutdown` resolves.
pub async fn session<S>(
    input: InputLines,
    controller: &ActorRef<LookupControllerMessage>,
    view: &dyn LookupView,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()>,
{
    tokio::select! {
        result = run(input, controller, view) => result,
        _ = shutdown => {
            info!("Shutdown requested, leaving the session");
            Ok(())
        }
    }
}

/// Reads commands until `:quit` or end of input and forwards them to the controller.
pub async fn run(
    mut input: InputLines,
    controller: &ActorRef<LookupControllerMessage>,
    view: &dyn LookupView,
) -> Result<()> {
    while let Some(line) = input.recv().await {
        let line = line.map_err(LookupError::Input)?;
        let command = ReplCommand::parse(&line);
        debug!(?command, "Terminal command");

        let message = match command {
            ReplCommand::Submit(username) => LookupControllerMessage::Submit(username),
            ReplCommand::Open(position) => LookupControllerMessage::Open(position - 1),
            ReplCommand::Share(position) => LookupControllerMessage::Share(position - 1),
            ReplCommand::List => {
                let snapshot = LookupController::snapshot(controller).await?;
                view.render(&snapshot.rendered);
                continue;
            }
            ReplCommand::Help => {
                println!("{}", HELP.dimmed());
                continue;
            }
            ReplCommand::Quit => break,
            ReplCommand::Invalid(reason) => {
                view.notify(&reason);
                continue;
            }
        };

        controller
            .send_message(message)
            .map_err(|e| LookupError::Actor(format!("failed to reach controller: {}", e)))?;
    }

    Ok(())
}
