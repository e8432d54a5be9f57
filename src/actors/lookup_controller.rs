use crate::error::{FetchError, LookupError};
use crate::github::RepositorySource;
use crate::models::{LookupSession, LookupSnapshot, LookupStatus, FETCH_FAILED_MESSAGE};
use crate::platform::{ShareSink, UrlOpener};
use crate::settings::{Settings, SettingsStore, USER_NAME_KEY};
use crate::types::Repository;
use crate::view::{LoadingGuard, LoadingTracker, LookupView, RepositoryHandler, RepositoryList};
use ractor::rpc::CallResult;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SpawnErr};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives a lookup session: restores the last username, runs lookups, renders
/// results and routes row actions.
pub struct LookupController;

/// Collaborators handed to the controller at spawn time.
pub struct LookupControllerArgs {
    pub source: Arc<dyn RepositorySource>,
    pub settings: Arc<dyn SettingsStore>,
    pub view: Arc<dyn LookupView>,
    pub opener: Arc<dyn UrlOpener>,
    pub sharer: Arc<dyn ShareSink>,
}

pub struct LookupControllerState {
    source: Arc<dyn RepositorySource>,
    settings: Arc<dyn SettingsStore>,
    view: Arc<dyn LookupView>,
    opener: Arc<dyn UrlOpener>,
    sharer: Arc<dyn ShareSink>,
    loading: LoadingTracker,
    input: String,
    session: Option<LookupSession>,
    list: RepositoryList,
    requests_issued: u64,
    settings_watch: JoinHandle<()>,
}

pub enum LookupControllerMessage {
    /// The user confirmed the given username.
    Submit(String),
    /// The stored username changed.
    UserNameChanged(String),
    /// A lookup task finished. Dropping `guard` releases the loading state.
    FetchCompleted {
        request: u64,
        username: String,
        result: Result<Vec<Repository>, FetchError>,
        guard: LoadingGuard,
    },
    /// Open the row at this zero-based position.
    Open(usize),
    /// Share the row at this zero-based position.
    Share(usize),
    GetSnapshot(RpcReplyPort<LookupSnapshot>),
}

impl fmt::Debug for LookupControllerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit(name) => f.debug_tuple("Submit").field(name).finish(),
            Self::UserNameChanged(name) => f.debug_tuple("UserNameChanged").field(name).finish(),
            Self::FetchCompleted { request, username, result, .. } => f
                .debug_struct("FetchCompleted")
                .field("request", request)
                .field("username", username)
                .field("ok", &result.is_ok())
                .finish(),
            Self::Open(index) => f.debug_tuple("Open").field(index).finish(),
            Self::Share(index) => f.debug_tuple("Share").field(index).finish(),
            Self::GetSnapshot(_) => f.write_str("GetSnapshot"),
        }
    }
}

impl LookupController {
    pub async fn spawn(
        args: LookupControllerArgs,
    ) -> Result<(ActorRef<LookupControllerMessage>, JoinHandle<()>), SpawnErr> {
        Actor::spawn(None, LookupController, args).await
    }

    /// Ask a running controller for its current state.
    pub async fn snapshot(
        controller: &ActorRef<LookupControllerMessage>,
    ) -> crate::error::Result<LookupSnapshot> {
        match controller
            .call(LookupControllerMessage::GetSnapshot, Some(SNAPSHOT_TIMEOUT))
            .await
        {
            Ok(CallResult::Success(snapshot)) => Ok(snapshot),
            Ok(CallResult::Timeout) => Err(LookupError::Actor("snapshot request timed out".to_string())),
            Ok(CallResult::SenderError) => {
                Err(LookupError::Actor("controller dropped the snapshot request".to_string()))
            }
            Err(e) => Err(LookupError::Actor(format!("failed to reach controller: {}", e))),
        }
    }
}

#[ractor::async_trait]
impl Actor for LookupController {
    type Msg = LookupControllerMessage;
    type State = LookupControllerState;
    type Arguments = LookupControllerArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let input = args.settings.get(USER_NAME_KEY).await?.unwrap_or_default();
        info!(restored = %input, "Starting lookup controller");
        args.view.show_input(&input);

        let settings_watch = watch_user_name(args.settings.subscribe(), input.clone(), myself.clone());

        let mut state = LookupControllerState {
            loading: LoadingTracker::new(args.view.clone()),
            source: args.source,
            settings: args.settings,
            view: args.view,
            opener: args.opener,
            sharer: args.sharer,
            input,
            session: None,
            list: RepositoryList::empty(),
            requests_issued: 0,
            settings_watch,
        };

        // Initial lookup with whatever the input holds, restored or empty.
        let username = state.input.clone();
        state.start_lookup(&myself, username);

        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            LookupControllerMessage::Submit(username) => {
                if username.trim().is_empty() {
                    debug!("Ignoring blank username submission");
                    return Ok(());
                }

                state.input = username.clone();
                state.start_lookup(&myself, username.clone());

                // Persisted whether or not the lookup succeeds.
                if let Err(e) = state.settings.set(USER_NAME_KEY, &username).await {
                    error!(username = %username, "Failed to persist username: {}", e);
                }
            }

            LookupControllerMessage::UserNameChanged(username) => {
                // Echoes of earlier writes can arrive after a newer submission.
                let stored = state.settings.get(USER_NAME_KEY).await?.unwrap_or_default();
                if username != stored {
                    debug!(username = %username, stored = %stored, "Ignoring stale username change");
                    return Ok(());
                }

                if username != state.input {
                    debug!(username = %username, "Stored username changed");
                    state.input = username;
                    state.view.show_input(&state.input);
                }
            }

            LookupControllerMessage::FetchCompleted {
                request,
                username,
                result,
                guard,
            } => {
                state.finish_lookup(request, &username, result);
                drop(guard);
            }

            LookupControllerMessage::Open(index) => {
                if !state.list.open(index) {
                    let position = index.saturating_add(1);
                    warn!(position, "Open requested for missing row");
                    state.view.notify(&format!("No repository at position {}", position));
                }
            }

            LookupControllerMessage::Share(index) => {
                if !state.list.share(index) {
                    let position = index.saturating_add(1);
                    warn!(position, "Share requested for missing row");
                    state.view.notify(&format!("No repository at position {}", position));
                }
            }

            LookupControllerMessage::GetSnapshot(reply) => {
                if reply.send(state.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.settings_watch.abort();
        info!(requests_issued = state.requests_issued, "Lookup controller stopped");
        Ok(())
    }
}

impl LookupControllerState {
    fn start_lookup(&mut self, myself: &ActorRef<LookupControllerMessage>, username: String) {
        self.requests_issued += 1;
        let request = self.requests_issued;

        let guard = self.loading.acquire();
        self.session = Some(LookupSession::new(request, username.clone()));
        info!(request, username = %username, "Fetching repositories");

        let source = self.source.clone();
        let controller = myself.clone();
        tokio::spawn(async move {
            let result = source.fetch_repositories(&username).await;
            let message = LookupControllerMessage::FetchCompleted {
                request,
                username,
                result,
                guard,
            };
            if let Err(e) = controller.send_message(message) {
                debug!(request, "Controller stopped before lookup finished: {}", e);
            }
        });
    }

    fn finish_lookup(
        &mut self,
        request: u64,
        username: &str,
        result: Result<Vec<Repository>, FetchError>,
    ) {
        if request < self.requests_issued {
            debug!(
                request,
                latest = self.requests_issued,
                username,
                ok = result.is_ok(),
                "Discarding superseded lookup result"
            );
            return;
        }

        let status = match result {
            Ok(repositories) => {
                info!(request, username, count = repositories.len(), "Lookup succeeded");
                self.view.render(&repositories);
                self.list = self.bind_list(repositories.clone());
                LookupStatus::Success(repositories)
            }
            Err(e) => {
                warn!(request, username, "Lookup failed: {}", e);
                self.view.notify(FETCH_FAILED_MESSAGE);
                LookupStatus::Failed(e.to_string())
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.status = status;
        }
    }

    fn bind_list(&self, repositories: Vec<Repository>) -> RepositoryList {
        // Launching runs on its own task so a slow command never stalls the controller.
        let opener = self.opener.clone();
        let view = self.view.clone();
        let on_open: RepositoryHandler = Arc::new(move |repo: &Repository| {
            let opener = opener.clone();
            let view = view.clone();
            let url = repo.html_url().to_string();
            tokio::spawn(async move {
                if let Err(e) = opener.open(&url).await {
                    error!(url = %url, "Failed to open repository: {}", e);
                    view.notify(&format!("Could not open {}", url));
                }
            });
        });

        let sharer = self.sharer.clone();
        let view = self.view.clone();
        let on_share: RepositoryHandler = Arc::new(move |repo: &Repository| {
            let sharer = sharer.clone();
            let view = view.clone();
            let url = repo.html_url().to_string();
            tokio::spawn(async move {
                if let Err(e) = sharer.share(&url).await {
                    error!(url = %url, "Failed to share repository: {}", e);
                    view.notify(&format!("Could not share {}", url));
                }
            });
        });

        RepositoryList::new(repositories, on_open, on_share)
    }

    fn snapshot(&self) -> LookupSnapshot {
        let loading = self.loading.is_loading();
        LookupSnapshot {
            input: self.input.clone(),
            input_enabled: !loading,
            loading,
            session: self.session.clone(),
            rendered: self.list.repositories().to_vec(),
            requests_issued: self.requests_issued,
        }
    }
}

/// Forwards changes of the stored username to the controller.
fn watch_user_name(
    mut settings: watch::Receiver<Settings>,
    mut last: String,
    controller: ActorRef<LookupControllerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let current = settings
                .borrow_and_update()
                .get(USER_NAME_KEY)
                .cloned()
                .unwrap_or_default();

            if current != last {
                last = current.clone();
                if let Err(e) = controller.send_message(LookupControllerMessage::UserNameChanged(current)) {
                    debug!("Controller gone, stopping settings watch: {}", e);
                    break;
                }
            }

            if settings.changed().await.is_err() {
                debug!("Settings store closed");
                break;
            }
        }
    })
}
