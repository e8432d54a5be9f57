#![allow(dead_code)]

use async_trait::async_trait;
use github_repo_lookup::actors::{LookupController, LookupControllerArgs, LookupControllerMessage};
use github_repo_lookup::error::{FetchError, Result};
use github_repo_lookup::github::RepositorySource;
use github_repo_lookup::models::LookupSnapshot;
use github_repo_lookup::platform::{ShareSink, UrlOpener};
use github_repo_lookup::repl::InputLines;
use github_repo_lookup::settings::SettingsStore;
use github_repo_lookup::types::Repository;
use github_repo_lookup::view::LookupView;
use ractor::ActorRef;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub fn repo(id: u64, name: &str) -> Repository {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "html_url": format!("https://github.com/octocat/{}", name),
    }))
    .expect("valid repository fixture")
}

pub fn repos(names: &[&str]) -> Vec<Repository> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| repo(i as u64 + 1, name))
        .collect()
}

pub fn names(repositories: &[Repository]) -> Vec<String> {
    repositories.iter().map(|r| r.name().to_string()).collect()
}

/// What a fake lookup for one username does.
pub enum Scripted {
    Repos(Vec<Repository>),
    Fail,
    /// Resolve only once the sender fires.
    Gate(oneshot::Receiver<Vec<Repository>>),
}

/// Source answering from per-username scripts; unscripted names return an empty list.
#[derive(Default)]
pub struct FakeSource {
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, username: &str, response: Scripted) {
        self.scripts
            .lock()
            .unwrap()
            .entry(username.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositorySource for FakeSource {
    async fn fetch_repositories(
        &self,
        username: &str,
    ) -> std::result::Result<Vec<Repository>, FetchError> {
        self.calls.lock().unwrap().push(username.to_string());

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(username)
            .and_then(|queue| queue.pop_front());

        match scripted {
            None => Ok(Vec::new()),
            Some(Scripted::Repos(repositories)) => Ok(repositories),
            Some(Scripted::Fail) => Err(not_found()),
            Some(Scripted::Gate(gate)) => gate.await.map_err(|_| not_found()),
        }
    }
}

fn not_found() -> FetchError {
    FetchError::Status {
        status: StatusCode::NOT_FOUND,
        body: r#"{"message":"Not Found"}"#.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    ShowInput(String),
    InputEnabled(bool),
    Loading(bool),
    Render(Vec<String>),
    Notify(String),
}

#[derive(Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Notify(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn renders(&self) -> Vec<Vec<String>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Render(rows) => Some(rows),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ViewEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl LookupView for RecordingView {
    fn show_input(&self, text: &str) {
        self.push(ViewEvent::ShowInput(text.to_string()));
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.push(ViewEvent::InputEnabled(enabled));
    }

    fn set_loading(&self, loading: bool) {
        self.push(ViewEvent::Loading(loading));
    }

    fn render(&self, repositories: &[Repository]) {
        self.push(ViewEvent::Render(names(repositories)));
    }

    fn notify(&self, message: &str) {
        self.push(ViewEvent::Notify(message.to_string()));
    }
}

/// Records every URL or text handed to it.
#[derive(Default)]
pub struct Recorder {
    received: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Actions run on their own tasks, so wait for them to land.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..300 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Expected {} actions, got {:?}", count, self.received());
    }
}

#[async_trait]
impl UrlOpener for Recorder {
    async fn open(&self, url: &str) -> Result<()> {
        self.received.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[async_trait]
impl ShareSink for Recorder {
    async fn share(&self, text: &str) -> Result<()> {
        self.received.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Feeds the given lines to the command loop, then ends input.
pub fn input_lines(lines: &[&str]) -> InputLines {
    let (tx, rx) = mpsc::channel(lines.len().max(1));
    for line in lines {
        tx.try_send(Ok(line.to_string())).expect("input buffer sized to fit");
    }
    rx
}

pub struct Harness {
    pub controller: ActorRef<LookupControllerMessage>,
    pub source: Arc<FakeSource>,
    pub settings: Arc<dyn SettingsStore>,
    pub view: Arc<RecordingView>,
    pub opener: Arc<Recorder>,
    pub sharer: Arc<Recorder>,
}

impl Harness {
    pub async fn start(source: FakeSource, settings: Arc<dyn SettingsStore>) -> Self {
        let sharer = Arc::new(Recorder::default());
        Self::start_with_sharer(source, settings, sharer.clone(), sharer).await
    }

    /// Starts with `share_with` as the controller's share sink; `sharer` is what tests inspect.
    pub async fn start_with_sharer(
        source: FakeSource,
        settings: Arc<dyn SettingsStore>,
        share_with: Arc<dyn ShareSink>,
        sharer: Arc<Recorder>,
    ) -> Self {
        let source = Arc::new(source);
        let view = Arc::new(RecordingView::default());
        let opener = Arc::new(Recorder::default());

        let (controller, _handle) = LookupController::spawn(LookupControllerArgs {
            source: source.clone(),
            settings: settings.clone(),
            view: view.clone(),
            opener: opener.clone(),
            sharer: share_with,
        })
        .await
        .expect("Failed to spawn lookup controller");

        Harness {
            controller,
            source,
            settings,
            view,
            opener,
            sharer,
        }
    }

    pub fn send(&self, message: LookupControllerMessage) {
        self.controller
            .send_message(message)
            .expect("Failed to send message to controller");
    }

    pub async fn snapshot(&self) -> LookupSnapshot {
        LookupController::snapshot(&self.controller)
            .await
            .expect("Failed to get snapshot")
    }

    /// Polls the controller until `condition` holds, panicking after a few seconds.
    pub async fn wait_until<F>(&self, condition: F) -> LookupSnapshot
    where
        F: Fn(&LookupSnapshot) -> bool,
    {
        for _ in 0..300 {
            let snapshot = self.snapshot().await;
            if condition(&snapshot) {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Condition not reached, last state: {:?}", self.snapshot().await);
    }

    /// Waits until the startup lookup has finished.
    pub async fn settled(&self) -> LookupSnapshot {
        self.wait_until(|s| s.requests_issued >= 1 && !s.loading).await
    }

    pub fn stop(&self) {
        self.controller.stop(None);
    }
}
