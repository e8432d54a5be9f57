use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

/// Key holding the last submitted username.
pub const USER_NAME_KEY: &str = "user_name";

pub type Settings = BTreeMap<String, String>;

/// Durable string key-value store.
///
/// A completed `set` is visible to the next `get` in the same process and is
/// published to every receiver handed out by `subscribe`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    fn subscribe(&self) -> watch::Receiver<Settings>;
}

/// Settings kept as a JSON object in a single file.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    state: watch::Sender<Settings>,
    write_lock: Mutex<()>,
}

impl FileSettingsStore {
    /// Default location under the user's config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("github-repo-lookup").join("settings.json"))
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let settings = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Settings::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file yet, starting empty");
                Settings::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), entries = settings.len(), "Opened settings store");

        let (state, _) = watch::channel(settings);
        Ok(FileSettingsStore {
            path,
            state,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers only ever see a complete file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(settings)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut next = self.state.borrow().clone();
        next.insert(key.to_string(), value.to_string());

        self.persist(&next).await?;
        self.state.send_replace(next);

        debug!(key, path = %self.path.display(), "Setting persisted");
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Settings> {
        self.state.subscribe()
    }
}

/// Process-local store for tests and `--ephemeral` sessions.
#[derive(Debug)]
pub struct MemorySettingsStore {
    state: watch::Sender<Settings>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::with_settings(Settings::new())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let (state, _) = watch::channel(settings);
        MemorySettingsStore { state }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.state.send_modify(|settings| {
            settings.insert(key.to_string(), value.to_string());
        });
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Settings> {
        self.state.subscribe()
    }
}
