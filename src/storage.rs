use std::{future::Future, path::PathBuf};

use thiserror::Error;

pub mod json;
#[cfg(test)]
pub mod memory;

/// Key under which the planner blob lives, next to whatever else the host stores.
pub const STORAGE_KEY: &str = "minty_planner_state_v1";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse stored JSON: {source}")]
    ParseFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Stored value is not a JSON object")]
    NotAnObject,

    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage task did not complete: {source}")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl StorageError {
    /// Read side failures, parse errors included. Everything else happened
    /// while producing or writing a snapshot.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            StorageError::ReadFailed { .. }
                | StorageError::ParseFailed { .. }
                | StorageError::NotAnObject
        )
    }
}

/// Asynchronous string store the planner snapshot is kept in.
pub trait KeyValueStore: Send + Sync + 'static {
    /// `Ok(None)` when nothing was ever stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Replaces any previous value under `key`.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}
