/// Core error types for Derd
use thiserror::Error;

/// Result type alias using `DerdError`
pub type Result<T> = std::result::Result<T, DerdError>;

/// Error type returned by platform trait implementations
#[derive(Error, Debug)]
pub enum DerdError {
    /// Local key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Remote document store errors (network, rejected write, ...)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Audio load/decode/playback errors
    #[error("Audio error: {0}")]
    Audio(String),

    /// Device denied access to media, notifications, ...
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DerdError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a remote error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create an audio error
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
