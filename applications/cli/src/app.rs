//! Service wiring over the file-backed stores

use crate::config::DerdConfig;
use derd_core::{Connectivity, Identity, IdentityProvider, KeyValueStore, UserId};
use derd_storage::{FileKeyValueStore, HabitTracker, KvDocumentStore};
use derd_sync::{FeedService, JournalService, OfflineQueue, SyncError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a command needs
pub struct App {
    pub identity: Identity,
    pub connectivity: Connectivity,
    pub journal: Arc<JournalService>,
    pub feed: FeedService,
    pub habit: HabitTracker,
}

impl App {
    /// Open both stores under the configured data directory
    pub async fn open(config: &DerdConfig) -> derd_core::Result<Self> {
        let device: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::open(config.device_store_path()).await?);
        let remote = Arc::new(KvDocumentStore::new(Arc::new(
            FileKeyValueStore::open(config.remote_store_path()).await?,
        )));

        let identity = match &config.user.id {
            Some(id) => Identity::signed_in(UserId::new(id.trim())),
            None => Identity::anonymous(),
        };
        let connectivity = Connectivity::new(config.network.online);

        let journal = Arc::new(JournalService::new(
            remote.clone(),
            Arc::new(OfflineQueue::new(Arc::clone(&device))),
            Arc::new(identity.clone()),
            connectivity.clone(),
        ));
        let feed = FeedService::new(remote, Arc::clone(&device), connectivity.clone());
        let habit = HabitTracker::new(device);

        debug!(
            data_dir = %config.storage.data_dir.display(),
            online = config.network.online,
            "Stores opened"
        );

        Ok(Self {
            identity,
            connectivity,
            journal,
            feed,
            habit,
        })
    }

    /// Upload anything queued by earlier offline runs
    ///
    /// Skipped quietly when offline or signed out; failures are logged so the
    /// requested command still runs.
    pub async fn flush_pending(&self) {
        if !self.connectivity.is_online() || self.identity.current_user().is_none() {
            return;
        }
        match self.journal.flush().await {
            Ok(summary) if summary.committed > 0 => {
                info!(committed = summary.committed, "Synced offline entries");
            }
            Ok(_) => {}
            Err(SyncError::AlreadyFlushing) => {}
            Err(e) => warn!("Could not sync offline entries: {}", e),
        }
    }
}
