/// Audio source handle
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to an audio resource
///
/// The platform decides what it means (bundled asset name, file path, URL);
/// the core only hands it back to the [`AudioLoader`](crate::AudioLoader).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceHandle(String);

impl SourceHandle {
    /// Create a new source handle
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceHandle {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
