//! Automatic flush on reconnect

use crate::journal::JournalService;
use crate::SyncError;
use derd_core::Connectivity;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Flush the journal queue on every offline to online transition
///
/// With `flush_on_start` an initial flush also runs when the device is
/// already online. Transitions that happen while a flush is running are
/// not lost: any reconnect counted meanwhile triggers one more flush.
/// Errors are logged. Abort the handle to stop watching.
pub fn spawn_auto_flush(
    journal: Arc<JournalService>,
    connectivity: Connectivity,
    flush_on_start: bool,
) -> JoinHandle<()> {
    let mut reconnects = connectivity.subscribe_reconnects();

    tokio::spawn(async move {
        if flush_on_start && connectivity.is_online() {
            run_flush(&journal).await;
        }

        while reconnects.changed().await.is_ok() {
            let count = *reconnects.borrow_and_update();
            debug!(reconnects = count, "Connection restored");
            run_flush(&journal).await;
        }
    })
}

async fn run_flush(journal: &JournalService) {
    match journal.flush().await {
        Ok(summary) if summary.committed > 0 => {
            info!(
                committed = summary.committed,
                remaining = summary.remaining,
                "Offline entries synced"
            );
        }
        Ok(_) => {}
        Err(SyncError::AlreadyFlushing) => debug!("Flush already running, skipping"),
        Err(e) => warn!("Automatic flush failed: {}", e),
    }
}
