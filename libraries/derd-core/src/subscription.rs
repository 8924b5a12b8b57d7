//! Cancellable live subscriptions
//!
//! A subscription always holds the latest value pushed by its producer.
//! Consumers read it with [`Subscription::current`] and wait for the next
//! push with [`Subscription::next`]. Dropping the subscription stops the
//! task that feeds it; subscribing again restarts from the current state.

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Live stream of full snapshots
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    task: Option<JoinHandle<()>>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Subscription fed directly by a watch sender
    pub fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx, task: None }
    }

    /// Subscription fed by a background task, aborted on drop
    pub fn with_task(rx: watch::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Latest snapshot
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot; `None` once the producer is gone
    pub async fn next(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Derive a subscription whose snapshots are `f` applied to ours
    ///
    /// Must be called inside a tokio runtime.
    pub fn map<U, F>(mut self, f: F) -> Subscription<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(&T) -> U + Send + 'static,
    {
        let initial = f(&*self.rx.borrow_and_update());
        let (tx, rx) = watch::channel(initial);
        let task = tokio::spawn(async move {
            while let Some(value) = self.next().await {
                if tx.send(f(&value)).is_err() {
                    break;
                }
            }
        });
        Subscription::with_task(rx, task)
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
