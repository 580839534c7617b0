//! Store Module
//!
//! Plaintext JSON credential store with validation on every write.

pub mod credential;
pub mod manager;
pub mod validation;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential not found: {0}")]
    NotFound(String),

    #[error("credential with name '{0}' already exists")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file lists '{0}' more than once")]
    DuplicateName(String),

    #[error("invalid store data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not determine home directory")]
    NoHomeDir,
}

pub type StoreResult<T> = Result<T, StoreError>;

// Re-exports
pub use credential::{AuthType, Credential};
pub use manager::{CredentialStore, StoreConfig};
pub use validation::ValidationError;
