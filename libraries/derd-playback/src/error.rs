//! Error types for playback management

use derd_core::DerdError;
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: the manager is always left in a consistent
/// state and the caller shows a dismissible alert.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Resource could not be loaded or decoded; no session is active
    #[error("Failed to load '{title}': {source}")]
    Load {
        title: String,
        #[source]
        source: DerdError,
    },

    /// Device refused access to the media library
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Platform failed to start, pause, or resume playback
    #[error("Playback failed: {0}")]
    Playback(#[source] DerdError),

    /// Platform failed while releasing a resource; the session is cleared anyway
    #[error("Teardown failed: {0}")]
    Teardown(#[source] DerdError),
}

impl PlaybackError {
    /// Map a loader failure, surfacing permission problems on their own
    pub(crate) fn load(title: &str, err: DerdError) -> Self {
        match err {
            DerdError::PermissionDenied(msg) => Self::PermissionDenied(msg),
            other => Self::Load {
                title: title.to_string(),
                source: other,
            },
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
