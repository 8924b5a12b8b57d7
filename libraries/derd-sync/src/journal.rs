//! Journal service
//!
//! Saves go straight to the remote `diaries` collection while online and into
//! the [`OfflineQueue`] otherwise. [`JournalService::flush`] replays the queue
//! oldest first, removing each entry as soon as it commits. Flushed entries
//! are written under their idempotency key, so an entry that went up but
//! could not be dequeued is overwritten, not duplicated, on the next flush.

use crate::error::{Result, SyncError};
use crate::queue::OfflineQueue;
use crate::types::{FlushSummary, MindBalance, ProfileStats, SaveOutcome};
use derd_core::{
    Connectivity, Direction, DocumentId, DocumentStore, EntryDraft, EntryId, Fields,
    IdentityProvider, JournalEntry, Query, QueuedEntry, Subscription, UserId,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Remote collection of journal entries
pub const DIARIES_COLLECTION: &str = "diaries";

/// Remote collection of user profiles
pub const USERS_COLLECTION: &str = "users";

/// Journal writes, offline buffering and replay
pub struct JournalService {
    remote: Arc<dyn DocumentStore>,
    queue: Arc<OfflineQueue>,
    identity: Arc<dyn IdentityProvider>,
    connectivity: Connectivity,
    flush_lock: Mutex<()>,
}

impl JournalService {
    pub fn new(
        remote: Arc<dyn DocumentStore>,
        queue: Arc<OfflineQueue>,
        identity: Arc<dyn IdentityProvider>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            remote,
            queue,
            identity,
            connectivity,
            flush_lock: Mutex::new(()),
        }
    }

    /// Queue backing this service
    pub fn queue(&self) -> &Arc<OfflineQueue> {
        &self.queue
    }

    /// Connectivity handle the service reads before every write
    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// Save a new entry
    ///
    /// Offline the draft is queued and nothing is sent. Online the entry is
    /// created remotely and the user's `lastJournalAt` is bumped; a failed
    /// bump is logged but does not fail the save, since the entry exists.
    pub async fn save(&self, draft: EntryDraft) -> Result<SaveOutcome> {
        draft.validate().map_err(SyncError::Invalid)?;
        let user = self.require_user()?;

        if !self.connectivity.is_online() {
            let queued = self.queue.enqueue(draft).await?;
            info!(local_id = %queued.local_id, "Offline, entry saved locally");
            return Ok(SaveOutcome::Queued);
        }

        let id = self
            .remote
            .create(DIARIES_COLLECTION, entry_fields(&draft, &user))
            .await
            .map_err(SyncError::remote)?;

        let profile = DocumentId::new(user.as_str());
        if let Err(e) = self
            .remote
            .merge(
                USERS_COLLECTION,
                &profile,
                Fields::new().server_timestamp("lastJournalAt"),
            )
            .await
        {
            warn!(user_id = %user, "Failed to record last journal time: {}", e);
        }

        debug!(entry_id = %id, "Entry saved");
        Ok(SaveOutcome::Committed(id))
    }

    /// Edit a committed entry; online only
    pub async fn edit(&self, id: &EntryId, draft: EntryDraft) -> Result<()> {
        draft.validate().map_err(SyncError::Invalid)?;
        self.require_user()?;
        if !self.connectivity.is_online() {
            return Err(SyncError::Offline);
        }

        let fields = Fields::new()
            .with("title", draft.title)
            .with("content", draft.content)
            .with("mood", draft.mood.as_str());
        self.remote
            .update(DIARIES_COLLECTION, id, fields)
            .await
            .map_err(SyncError::remote)?;

        debug!(entry_id = %id, "Entry edited");
        Ok(())
    }

    /// Upload queued entries, oldest first
    ///
    /// Only the entries queued when the flush starts are sent; anything
    /// enqueued meanwhile waits for the next flush. The first failure stops
    /// the flush and leaves that entry and its successors queued.
    pub async fn flush(&self) -> Result<FlushSummary> {
        let Ok(_guard) = self.flush_lock.try_lock() else {
            return Err(SyncError::AlreadyFlushing);
        };

        if !self.connectivity.is_online() {
            return Err(SyncError::Offline);
        }
        self.require_user()?;

        let batch = self.queue.entries().await?;
        if batch.is_empty() {
            debug!("Nothing to flush");
            return Ok(FlushSummary::default());
        }

        info!(count = batch.len(), "Flushing offline entries");

        let mut committed = 0;
        for entry in &batch {
            // Re-read on every entry: the user may sign out mid-flush
            let Some(user) = self.identity.current_user() else {
                warn!(committed, "User signed out during flush, stopping");
                return Err(SyncError::NotAuthenticated);
            };

            // Keyed by the idempotency key, so a replay overwrites instead
            // of duplicating
            let doc_id = DocumentId::new(entry.local_id.to_string());
            if let Err(e) = self
                .remote
                .merge(DIARIES_COLLECTION, &doc_id, queued_fields(entry, &user))
                .await
            {
                return Err(self
                    .flush_stopped(entry, committed, batch.len() - committed, SyncError::remote(e))
                    .await);
            }
            committed += 1;

            if let Err(e) = self.queue.remove(&[entry.local_id]).await {
                return Err(self
                    .flush_stopped(entry, committed, batch.len() - committed + 1, e)
                    .await);
            }
        }

        let remaining = self.queue.len().await?;
        info!(committed, remaining, "Flush complete");
        Ok(FlushSummary {
            committed,
            remaining,
        })
    }

    /// Live list of the signed-in user's entries, newest first
    ///
    /// Entries still waiting for their server timestamp are left out.
    pub async fn watch_entries(&self) -> Result<Subscription<Vec<JournalEntry>>> {
        let user = self.require_user()?;
        let query = Query::collection(DIARIES_COLLECTION)
            .where_eq("userId", user.as_str())
            .order_by("createdAt", Direction::Descending);

        let docs = self
            .remote
            .subscribe(query)
            .await
            .map_err(SyncError::remote)?;
        Ok(docs.map(|docs| docs.iter().filter_map(JournalEntry::from_document).collect()))
    }

    /// Entry count and mind balance for the signed-in user
    ///
    /// Every owned entry is counted, including ones still waiting for their
    /// server timestamp; the balance comes from the newest timestamped entry.
    pub async fn profile_stats(&self) -> Result<ProfileStats> {
        let user = self.require_user()?;
        let query = Query::collection(DIARIES_COLLECTION).where_eq("userId", user.as_str());
        let docs = self
            .remote
            .subscribe(query)
            .await
            .map_err(SyncError::remote)?
            .current();

        let latest = docs
            .iter()
            .filter_map(|doc| doc.get_timestamp("createdAt").map(|at| (at, doc)))
            .max_by_key(|(at, _)| *at)
            .map(|(_, doc)| doc);

        Ok(ProfileStats {
            journal_count: docs.len(),
            mind_balance: MindBalance::from_latest_mood(
                latest.map(|doc| doc.get_str("mood").unwrap_or_default()),
            ),
        })
    }

    async fn flush_stopped(
        &self,
        entry: &QueuedEntry,
        committed: usize,
        fallback_remaining: usize,
        source: SyncError,
    ) -> SyncError {
        let remaining = self.queue.len().await.unwrap_or(fallback_remaining);
        error!(committed, remaining, local_id = %entry.local_id, "Flush failed: {}", source);
        SyncError::Commit {
            committed,
            remaining,
            source: Box::new(source),
        }
    }

    fn require_user(&self) -> Result<UserId> {
        self.identity
            .current_user()
            .ok_or(SyncError::NotAuthenticated)
    }
}

fn entry_fields(draft: &EntryDraft, user: &UserId) -> Fields {
    Fields::new()
        .with("title", draft.title.as_str())
        .with("content", draft.content.as_str())
        .with("mood", draft.mood.as_str())
        .with("userId", user.as_str())
        .server_timestamp("createdAt")
}

fn queued_fields(entry: &QueuedEntry, user: &UserId) -> Fields {
    Fields::new()
        .with("title", entry.title.as_str())
        .with("content", entry.content.as_str())
        .with("mood", entry.mood.as_str())
        .with("userId", user.as_str())
        .with("clientId", entry.local_id.to_string())
        .server_timestamp("createdAt")
}
