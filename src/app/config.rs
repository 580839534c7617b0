use std::path::PathBuf;
use std::time::Duration;

use crate::ssh::SshOptions;
use crate::store::{StoreConfig, StoreResult};

const FALLBACK_STORE: &str = ".ssh-cred-manager/credentials.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_path: PathBuf,
    pub clipboard_timeout: Duration,
    pub ssh: SshOptions,
}

impl Default for AppConfig {
    /// Home directory store, or a relative one when no home is known
    fn default() -> Self {
        let path = StoreConfig::default_path().unwrap_or_else(|_| PathBuf::from(FALLBACK_STORE));
        Self::with_store_path(path)
    }
}

impl AppConfig {
    /// Resolve the store location, falling back to the home directory default
    pub fn new(store_path: Option<PathBuf>) -> StoreResult<Self> {
        let store_path = match store_path {
            Some(path) => path,
            None => StoreConfig::default_path()?,
        };
        Ok(Self::with_store_path(store_path))
    }

    pub fn with_store_path(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            clipboard_timeout: Duration::from_secs(15),
            ssh: SshOptions::default(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::with_path(&self.store_path)
    }

    /// TUI diagnostics go next to the store file
    pub fn log_path(&self) -> PathBuf {
        self.store_path.with_file_name("ssh-cli.log")
    }
}

#[derive(Debug, Clone)]
pub enum PendingAction {
    DeleteCredential(String),
}

impl PendingAction {
    pub fn confirm_message(&self) -> String {
        match self {
            Self::DeleteCredential(name) => format!("Delete credential '{name}'?"),
        }
    }
}
