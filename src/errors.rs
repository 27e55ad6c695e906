use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Metadata table errors ---
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Entry {0} not found")]
    EntryNotFound(i64),

    // --- Secret store errors ---
    #[error("Secret store error: {0}")]
    Store(String),

    #[error("No secret stored under key '{0}'")]
    NotFound(String),

    #[error("Secret store not initialized at {0} (run `passvault init`)")]
    StoreNotInitialized(PathBuf),

    // --- Coordinator errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing to update — change the description or supply a new password")]
    NothingToUpdate,

    #[error("Entry {id} has no retrievable secret and could not be rolled back: {source}")]
    Inconsistent {
        id: i64,
        #[source]
        source: Box<VaultError>,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl From<rusqlite::Error> for VaultError {
    fn from(e: rusqlite::Error) -> Self {
        VaultError::Storage(e.to_string())
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
