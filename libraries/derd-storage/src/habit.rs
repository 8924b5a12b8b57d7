//! Habit streak tracking
//!
//! The streak is a per-device counter kept in the key-value store under
//! two keys: the last completion date (ISO `YYYY-MM-DD`) and the streak
//! length. A day can be completed once; completing the day after the last
//! completion extends the streak, any longer gap starts over at one.
//!
//! # Example
//!
//! ```rust,no_run
//! use derd_storage::{HabitTracker, MemoryKeyValueStore};
//! use std::sync::Arc;
//! # async fn example() -> derd_core::Result<()> {
//! let tracker = HabitTracker::new(Arc::new(MemoryKeyValueStore::new()));
//! let today = chrono::Local::now().date_naive();
//!
//! let status = tracker.complete(today).await?;
//! assert!(status.completed_today);
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use derd_core::{KeyValueStore, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Last completion date key
pub const HABIT_LAST_DATE_KEY: &str = "habit_lastDate";

/// Streak length key
pub const HABIT_STREAK_KEY: &str = "habit_streak";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Streak as shown on the habit card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStatus {
    /// Consecutive completed days, zero once the streak is broken
    pub streak: u32,

    /// Whether today is already completed
    pub completed_today: bool,
}

/// Streak tracker over a key-value store
pub struct HabitTracker {
    store: Arc<dyn KeyValueStore>,
}

impl HabitTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current status as of `today`
    pub async fn status(&self, today: NaiveDate) -> Result<HabitStatus> {
        let (last, streak) = self.load().await?;
        let completed_today = last == Some(today);
        let alive = last.is_some_and(|d| d == today || d.succ_opt() == Some(today));

        Ok(HabitStatus {
            streak: if alive { streak } else { 0 },
            completed_today,
        })
    }

    /// Mark `today` as completed
    ///
    /// Completing the same day twice is a no-op. If the streak cannot be
    /// written, the previous date is put back so the day stays open.
    pub async fn complete(&self, today: NaiveDate) -> Result<HabitStatus> {
        let previous_date = self.store.get(HABIT_LAST_DATE_KEY).await?;
        let (last, streak) = self.load().await?;

        if last == Some(today) {
            return Ok(HabitStatus {
                streak,
                completed_today: true,
            });
        }

        let streak = match last {
            Some(d) if d.succ_opt() == Some(today) => streak.saturating_add(1),
            _ => 1,
        };

        self.store
            .set(HABIT_LAST_DATE_KEY, &today.format(DATE_FORMAT).to_string())
            .await?;
        if let Err(e) = self.store.set(HABIT_STREAK_KEY, &streak.to_string()).await {
            self.restore_date(previous_date.as_deref()).await;
            return Err(e);
        }

        debug!(%today, streak, "Habit completed");

        Ok(HabitStatus {
            streak,
            completed_today: true,
        })
    }

    /// Forget the streak entirely
    pub async fn reset(&self) -> Result<()> {
        self.store.remove(HABIT_LAST_DATE_KEY).await?;
        self.store.remove(HABIT_STREAK_KEY).await
    }

    async fn restore_date(&self, previous: Option<&str>) {
        let restored = match previous {
            Some(raw) => self.store.set(HABIT_LAST_DATE_KEY, raw).await,
            None => self.store.remove(HABIT_LAST_DATE_KEY).await,
        };
        if let Err(e) = restored {
            warn!("Habit date left ahead of streak: {}", e);
        }
    }

    async fn load(&self) -> Result<(Option<NaiveDate>, u32)> {
        let last = self
            .store
            .get(HABIT_LAST_DATE_KEY)
            .await?
            .and_then(|raw| match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!(value = %raw, "Ignoring unreadable habit date: {}", e);
                    None
                }
            });

        let streak = self
            .store
            .get(HABIT_STREAK_KEY)
            .await?
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);

        Ok((last, streak))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyValueStore;
    use async_trait::async_trait;
    use derd_core::DerdError;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Refuses streak writes while `fail_streak` is set
    struct StreakFailing {
        inner: MemoryKeyValueStore,
        fail_streak: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for StreakFailing {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if key == HABIT_STREAK_KEY && self.fail_streak.load(Ordering::SeqCst) {
                return Err(DerdError::storage("quota exceeded"));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key).await
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn tracker() -> (HabitTracker, Arc<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::new());
        (HabitTracker::new(store.clone()), store)
    }

    #[tokio::test]
    async fn fresh_tracker_has_no_streak() {
        let (tracker, _) = tracker();
        let status = tracker.status(day(1)).await.unwrap();
        assert_eq!(
            status,
            HabitStatus {
                streak: 0,
                completed_today: false
            }
        );
    }

    #[tokio::test]
    async fn consecutive_days_extend_streak() {
        let (tracker, store) = tracker();
        tracker.complete(day(1)).await.unwrap();
        tracker.complete(day(2)).await.unwrap();
        let status = tracker.complete(day(3)).await.unwrap();

        assert_eq!(status.streak, 3);
        assert_eq!(
            store.get(HABIT_LAST_DATE_KEY).await.unwrap().as_deref(),
            Some("2024-03-03")
        );
        assert_eq!(store.get(HABIT_STREAK_KEY).await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn completing_twice_in_one_day_is_idempotent() {
        let (tracker, _) = tracker();
        tracker.complete(day(1)).await.unwrap();
        let status = tracker.complete(day(1)).await.unwrap();
        assert_eq!(status.streak, 1);
        assert!(tracker.status(day(1)).await.unwrap().completed_today);
    }

    #[tokio::test]
    async fn gap_restarts_streak() {
        let (tracker, _) = tracker();
        tracker.complete(day(1)).await.unwrap();
        tracker.complete(day(2)).await.unwrap();

        // Yesterday still counts, the day after does not
        assert_eq!(tracker.status(day(3)).await.unwrap().streak, 2);
        assert_eq!(tracker.status(day(4)).await.unwrap().streak, 0);

        let status = tracker.complete(day(5)).await.unwrap();
        assert_eq!(status.streak, 1);
    }

    #[tokio::test]
    async fn reset_clears_keys() {
        let (tracker, store) = tracker();
        tracker.complete(day(1)).await.unwrap();
        tracker.reset().await.unwrap();
        assert!(store.keys().await.is_empty());
    }

    #[tokio::test]
    async fn failed_streak_write_leaves_day_open() {
        let store = Arc::new(StreakFailing {
            inner: MemoryKeyValueStore::new(),
            fail_streak: AtomicBool::new(false),
        });
        let tracker = HabitTracker::new(store.clone());
        tracker.complete(day(1)).await.unwrap();

        store.fail_streak.store(true, Ordering::SeqCst);
        assert!(tracker.complete(day(2)).await.is_err());
        assert_eq!(
            tracker.status(day(2)).await.unwrap(),
            HabitStatus {
                streak: 1,
                completed_today: false
            }
        );

        store.fail_streak.store(false, Ordering::SeqCst);
        assert_eq!(tracker.complete(day(2)).await.unwrap().streak, 2);
    }

    #[tokio::test]
    async fn failed_first_completion_clears_date() {
        let store = Arc::new(StreakFailing {
            inner: MemoryKeyValueStore::new(),
            fail_streak: AtomicBool::new(true),
        });
        let tracker = HabitTracker::new(store.clone());

        assert!(tracker.complete(day(1)).await.is_err());
        assert_eq!(store.get(HABIT_LAST_DATE_KEY).await.unwrap(), None);
    }
}
