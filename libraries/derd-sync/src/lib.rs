//! Derd Sync - journal and feed traffic with the remote store
//!
//! - [`OfflineQueue`]: journal entries buffered on the device while offline
//! - [`JournalService`]: save, edit, list and flush journal entries
//! - [`spawn_auto_flush`]: replay the queue whenever the device reconnects
//! - [`FeedService`]: anonymous posts and positive vibes
//!
//! # Example
//!
//! ```rust,no_run
//! use derd_core::{Connectivity, DocumentStore, EntryDraft, Identity, KeyValueStore, Mood, UserId};
//! use derd_sync::{spawn_auto_flush, JournalService, OfflineQueue, SaveOutcome};
//! use std::sync::Arc;
//!
//! # async fn example(remote: Arc<dyn DocumentStore>, device: Arc<dyn KeyValueStore>) -> derd_sync::Result<()> {
//! let connectivity = Connectivity::new(false);
//! let journal = Arc::new(JournalService::new(
//!     remote,
//!     Arc::new(OfflineQueue::new(device)),
//!     Arc::new(Identity::signed_in(UserId::new("u1"))),
//!     connectivity.clone(),
//! ));
//! let _watcher = spawn_auto_flush(journal.clone(), connectivity.clone(), true);
//!
//! let outcome = journal.save(EntryDraft::new("Walk", "Long walk by the sea", Mood::Calm)).await?;
//! assert_eq!(outcome, SaveOutcome::Queued);
//!
//! // Reconnecting uploads the queued entry in the background
//! connectivity.set_online(true);
//! # Ok(())
//! # }
//! ```

mod error;
mod feed;
mod journal;
mod queue;
mod types;
mod watcher;

pub use error::{Result, SyncError};
pub use feed::{FeedService, FEED_COLLECTION, VIBES_KEY};
pub use journal::{JournalService, DIARIES_COLLECTION, USERS_COLLECTION};
pub use queue::{OfflineQueue, OFFLINE_QUEUE_KEY};
pub use types::{FlushSummary, MindBalance, ProfileStats, SaveOutcome};
pub use watcher::spawn_auto_flush;
