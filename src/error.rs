//! Error types for the store boundary and for rejected timer transitions.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the persistence collaborators.
///
/// None of these ever reach the state machine: the controller logs them
/// and keeps operating on its in-memory copy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not determine a data directory")]
    DataDir,
}

/// A transition the state machine refused to make in its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("timer is not running")]
    NotRunning,
    #[error("not on a break")]
    NotOnBreak,
}
