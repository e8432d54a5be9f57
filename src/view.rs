use crate::types::Repository;
use colored::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The surface the controller drives: an input field, a loading indicator,
/// a list and transient notifications.
pub trait LookupView: Send + Sync {
    fn show_input(&self, text: &str);
    fn set_input_enabled(&self, enabled: bool);
    fn set_loading(&self, loading: bool);
    fn render(&self, repositories: &[Repository]);
    fn notify(&self, message: &str);
}

pub type RepositoryHandler = Arc<dyn Fn(&Repository) + Send + Sync>;

/// Rendered rows plus the actions bound to them.
pub struct RepositoryList {
    repositories: Vec<Repository>,
    on_open: RepositoryHandler,
    on_share: RepositoryHandler,
}

impl RepositoryList {
    pub fn new(
        repositories: Vec<Repository>,
        on_open: RepositoryHandler,
        on_share: RepositoryHandler,
    ) -> Self {
        Self {
            repositories,
            on_open,
            on_share,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Arc::new(|_| {}), Arc::new(|_| {}))
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn get(&self, index: usize) -> Option<&Repository> {
        self.repositories.get(index)
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Runs the open handler for the row at `index`. Returns false if there is no such row.
    pub fn open(&self, index: usize) -> bool {
        match self.get(index) {
            Some(repo) => {
                (self.on_open)(repo);
                true
            }
            None => false,
        }
    }

    /// Runs the share handler for the row at `index`. Returns false if there is no such row.
    pub fn share(&self, index: usize) -> bool {
        match self.get(index) {
            Some(repo) => {
                (self.on_share)(repo);
                true
            }
            None => false,
        }
    }
}

/// Counts in-flight lookups and keeps the loading indicator in sync with them.
#[derive(Clone)]
pub struct LoadingTracker {
    view: Arc<dyn LookupView>,
    in_flight: Arc<AtomicUsize>,
}

impl LoadingTracker {
    pub fn new(view: Arc<dyn LookupView>) -> Self {
        Self {
            view,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn acquire(&self) -> LoadingGuard {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.view.set_loading(true);
            self.view.set_input_enabled(false);
        }
        LoadingGuard {
            tracker: self.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

/// Shows the loading indicator and disables input for as long as it lives.
/// The last guard dropped restores both.
pub struct LoadingGuard {
    tracker: LoadingTracker,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.view.set_loading(false);
            self.tracker.view.set_input_enabled(true);
        }
    }
}

/// Prints the session to the terminal.
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    fn prompt() {
        print!("{} ", ">".bold().cyan());
        let _ = std::io::stdout().flush();
    }
}

impl LookupView for TerminalView {
    fn show_input(&self, text: &str) {
        if !text.is_empty() {
            println!("{} {}", "Username:".dimmed(), text.bold());
        }
    }

    fn set_input_enabled(&self, enabled: bool) {
        if enabled {
            Self::prompt();
        }
    }

    fn set_loading(&self, loading: bool) {
        if loading {
            println!("{}", "Loading repositories...".yellow());
        }
    }

    fn render(&self, repositories: &[Repository]) {
        if repositories.is_empty() {
            println!("{}", "No public repositories.".dimmed());
            return;
        }

        for (position, repo) in repositories.iter().enumerate() {
            let mut line = format!("{:>3}. {}", position + 1, repo.name().bold());
            if let Some(language) = repo.language() {
                line.push_str(&format!(" [{}]", language.cyan()));
            }
            if let Some(stars) = repo.stargazers_count() {
                line.push_str(&format!(" {} {}", "★".yellow(), stars));
            }
            println!("{}", line);

            if let Some(description) = repo.description() {
                println!("     {}", description.dimmed());
            }
        }
        println!("{}", "Use :open N or :share N on a row.".dimmed());
    }

    fn notify(&self, message: &str) {
        println!("{}", message.red().bold());
    }
}
