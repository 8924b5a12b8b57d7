//! Derd Core
//!
//! Platform-agnostic core types, traits, and error handling for Derd.
//!
//! This crate provides the foundational building blocks shared by the
//! playback, sync, and storage libraries and by every shell (mobile, CLI).
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `JournalEntry`, `QueuedEntry`, `FeedPost`, `Document`, etc.
//! - **Platform Traits**: `DocumentStore`, `KeyValueStore`, `AudioLoader`,
//!   `AudioResource`, `IdentityProvider`
//! - **Handles**: `Connectivity`, `Identity`, `Subscription`
//! - **Error Handling**: Unified `DerdError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use derd_core::{EntryDraft, Fields, Mood, Query, Direction};
//!
//! let draft = EntryDraft::new("Morning", "Slept well", Mood::Calm);
//! assert!(draft.validate().is_ok());
//!
//! let fields = Fields::new()
//!     .with("title", draft.title.as_str())
//!     .server_timestamp("createdAt");
//! assert_eq!(fields.len(), 2);
//!
//! let query = Query::collection("diaries")
//!     .where_eq("userId", "uid-1")
//!     .order_by("createdAt", Direction::Descending);
//! assert_eq!(query.collection, "diaries");
//! ```

#![forbid(unsafe_code)]

pub mod connectivity;
pub mod error;
pub mod identity;
pub mod subscription;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use connectivity::Connectivity;
pub use error::{DerdError, Result};
pub use identity::Identity;
pub use subscription::Subscription;
pub use traits::{AudioLoader, AudioResource, DocumentStore, IdentityProvider, KeyValueStore};

// Export all types
pub use types::{
    // Documents
    format_timestamp, parse_timestamp, Direction, Document, FieldValue, Fields, Query,
    // IDs
    DocumentId, EntryId, PostId, UserId,
    // Journal
    EntryDraft, JournalEntry, Mood, QueuedEntry,
    // Feed
    FeedPost, StoryType,
    // Audio
    SourceHandle,
};
