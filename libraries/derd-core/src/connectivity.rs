//! Network reachability handle
//!
//! The platform's reachability observer pushes transitions in with
//! [`Connectivity::set_online`]; the core reads and watches it.
//!
//! Watch receivers only see the latest value, so an offline blip between two
//! reads is invisible in the flag. Every offline to online transition also
//! bumps a reconnect counter that consumers can watch instead.

use std::sync::Arc;
use tokio::sync::watch;

/// Shared online/offline flag
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: Arc<watch::Sender<bool>>,
    reconnects: Arc<watch::Sender<u64>>,
}

impl Connectivity {
    /// Create a handle with the given initial state
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        let (reconnects, _rx) = watch::channel(0);
        Self {
            tx: Arc::new(tx),
            reconnects: Arc::new(reconnects),
        }
    }

    /// Whether the device currently has a network path
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Record a transition; repeated values do not notify watchers
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed && online {
            self.reconnects.send_modify(|count| *count += 1);
        }
    }

    /// Watch transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Watch the number of offline to online transitions so far
    pub fn subscribe_reconnects(&self) -> watch::Receiver<u64> {
        self.reconnects.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_real_transitions_notify() {
        let connectivity = Connectivity::new(false);
        let mut rx = connectivity.subscribe();

        connectivity.set_online(false);
        assert!(!rx.has_changed().unwrap());

        connectivity.set_online(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(connectivity.is_online());
    }

    #[tokio::test]
    async fn blips_between_reads_still_count() {
        let connectivity = Connectivity::new(true);
        let mut reconnects = connectivity.subscribe_reconnects();

        connectivity.set_online(false);
        connectivity.set_online(true);
        connectivity.set_online(false);
        connectivity.set_online(true);
        connectivity.set_online(true);

        // The flag looks unchanged, the counter does not
        assert!(connectivity.is_online());
        assert!(reconnects.has_changed().unwrap());
        assert_eq!(*reconnects.borrow_and_update(), 2);
    }
}
