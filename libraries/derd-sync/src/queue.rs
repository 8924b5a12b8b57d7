//! Offline journal queue
//!
//! Journal entries written without a network path are buffered on the device
//! as one JSON array under [`OFFLINE_QUEUE_KEY`], oldest first. The queue
//! never talks to the remote store; [`JournalService::flush`] drains it.
//!
//! [`JournalService::flush`]: crate::JournalService::flush

use crate::error::{Result, SyncError};
use derd_core::{EntryDraft, KeyValueStore, QueuedEntry};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Device key holding the queue
pub const OFFLINE_QUEUE_KEY: &str = "offlineEntries";

/// Persisted FIFO of journal entries awaiting upload
pub struct OfflineQueue {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl OfflineQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Append a draft with a fresh idempotency key
    pub async fn enqueue(&self, draft: EntryDraft) -> Result<QueuedEntry> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;

        let entry = QueuedEntry::from_draft(draft);
        entries.push(entry.clone());
        self.write(&entries).await?;

        debug!(local_id = %entry.local_id, queued = entries.len(), "Entry queued");
        Ok(entry)
    }

    /// All queued entries, oldest first
    pub async fn entries(&self) -> Result<Vec<QueuedEntry>> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn len(&self) -> Result<usize> {
        Ok(self.entries().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Drop entries by idempotency key, keeping the rest in order
    ///
    /// Returns how many entries are left.
    pub async fn remove(&self, local_ids: &[Uuid]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let ids: HashSet<&Uuid> = local_ids.iter().collect();

        let mut entries = self.read().await?;
        let before = entries.len();
        entries.retain(|e| !ids.contains(&e.local_id));
        if entries.len() != before {
            self.write(&entries).await?;
        }
        Ok(entries.len())
    }

    /// Forget every queued entry
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.store
            .remove(OFFLINE_QUEUE_KEY)
            .await
            .map_err(SyncError::storage)
    }

    async fn read(&self) -> Result<Vec<QueuedEntry>> {
        match self
            .store
            .get(OFFLINE_QUEUE_KEY)
            .await
            .map_err(SyncError::storage)?
        {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write(&self, entries: &[QueuedEntry]) -> Result<()> {
        let result = if entries.is_empty() {
            self.store.remove(OFFLINE_QUEUE_KEY).await
        } else {
            let raw = serde_json::to_string(entries)?;
            self.store.set(OFFLINE_QUEUE_KEY, &raw).await
        };
        result.map_err(SyncError::storage)
    }
}
