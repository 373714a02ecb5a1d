//! Session error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from durable token storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read token file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write token file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove token file {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from session mutations
#[derive(Error, Debug)]
pub enum SessionError {
    /// `login` was handed an empty token
    #[error("Server did not return a session token")]
    EmptyToken,

    /// Leading or trailing whitespace would not survive a restore
    #[error("Server returned a malformed session token")]
    PaddedToken,

    #[error("Could not persist session: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
