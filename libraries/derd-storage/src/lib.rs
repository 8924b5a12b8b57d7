//! Derd Storage
//!
//! Device-side persistence for Derd.
//!
//! # Architecture
//!
//! - **Key-value stores**: `MemoryKeyValueStore` (tests, ephemeral sessions)
//!   and `FileKeyValueStore` (single JSON file, atomic rewrite)
//! - **Document store**: `KvDocumentStore`, a `DocumentStore` with live
//!   subscriptions layered over any key-value store
//! - **Preferences**: habit streak tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use derd_core::{DocumentStore, Fields};
//! use derd_storage::{FileKeyValueStore, KvDocumentStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> derd_core::Result<()> {
//! let kv = FileKeyValueStore::open("./.derd/remote.json").await?;
//! let documents = KvDocumentStore::new(Arc::new(kv));
//!
//! let id = documents
//!     .create("diaries", Fields::new().with("title", "Morning").server_timestamp("createdAt"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod document;
mod kv;

pub mod habit;

pub use document::KvDocumentStore;
pub use habit::{HabitStatus, HabitTracker};
pub use kv::{FileKeyValueStore, MemoryKeyValueStore};
