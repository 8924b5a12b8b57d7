use derd_core::DerdError;
use thiserror::Error;

/// Errors that can occur during journal and feed sync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("No network connection")]
    Offline,

    #[error("No user signed in")]
    NotAuthenticated,

    #[error("Flush already in progress")]
    AlreadyFlushing,

    #[error("Invalid input: {0}")]
    Invalid(String),

    /// A flush stopped part-way; the failed entry and everything after it are
    /// still queued in order
    #[error("Flush stopped after {committed} entries ({remaining} still queued): {source}")]
    Commit {
        committed: usize,
        remaining: usize,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Local storage error: {0}")]
    Storage(#[source] DerdError),

    #[error("Remote store error: {0}")]
    Remote(#[source] DerdError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Remote failure, keeping serialization problems distinguishable
    pub(crate) fn remote(err: DerdError) -> Self {
        match err {
            DerdError::Serialization(e) => Self::Serialization(e),
            other => Self::Remote(other),
        }
    }

    /// Local storage failure
    pub(crate) fn storage(err: DerdError) -> Self {
        match err {
            DerdError::Serialization(e) => Self::Serialization(e),
            other => Self::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
