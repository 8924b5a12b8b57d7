/// Platform traits consumed by the Derd core
use crate::error::Result;
use crate::subscription::Subscription;
use crate::types::{Document, DocumentId, Fields, Query, SourceHandle, UserId};
use async_trait::async_trait;

/// Remote document database
///
/// Implementers resolve [`FieldValue`](crate::FieldValue) sentinels with their
/// own clock and push a full result set to every live subscription whenever a
/// matching document changes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document and return its store-assigned ID
    async fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId>;

    /// Update fields of an existing document
    ///
    /// # Errors
    /// Returns `NotFound` if the document does not exist
    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()>;

    /// Merge fields into a document with a caller-chosen ID, creating it if
    /// missing
    async fn merge(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()>;

    /// Point read
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>>;

    /// Live query; the subscription starts with the current result set
    async fn subscribe(&self, query: Query) -> Result<Subscription<Vec<Document>>>;
}

/// Small persistent key-value store on the device
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Platform audio loader (media library, bundled assets, ...)
#[async_trait]
pub trait AudioLoader: Send + Sync {
    /// Load and decode a resource, ready to play
    ///
    /// # Errors
    /// `PermissionDenied` when media access is refused, `Audio` when the
    /// resource cannot be read or decoded
    async fn load(&self, source: &SourceHandle) -> Result<Box<dyn AudioResource>>;
}

/// One loaded audio resource
///
/// Owned exclusively by the playback session manager.
#[async_trait]
pub trait AudioResource: Send + Sync {
    /// Start or resume playback from the current position
    async fn play(&mut self) -> Result<()>;

    /// Pause, keeping the position
    async fn pause(&mut self) -> Result<()>;

    /// Stop playback
    async fn stop(&mut self) -> Result<()>;

    /// Release the resource; no other call is made afterwards
    async fn unload(&mut self) -> Result<()>;
}

/// Authenticated identity, read at call time
///
/// Never cache the result across an await: the user may sign out meanwhile.
pub trait IdentityProvider: Send + Sync {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<UserId>;
}
