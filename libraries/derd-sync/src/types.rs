use derd_core::{EntryId, Mood};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a saved entry ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveOutcome {
    /// Written to the remote store
    Committed(EntryId),

    /// Buffered on the device until the next flush
    Queued,
}

/// Result of a completed flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushSummary {
    /// Entries committed remotely and removed from the queue
    pub committed: usize,

    /// Entries left queued (enqueued after the flush started)
    pub remaining: usize,
}

/// Mental state shown on the profile, derived from the latest entry's mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MindBalance {
    /// No entries yet
    Unstable,

    /// Latest mood was calm or happy
    Calm,

    /// Any other latest mood
    Balanced,
}

impl MindBalance {
    /// Classify by the raw `mood` field of the newest entry, if any
    pub fn from_latest_mood(mood: Option<&str>) -> Self {
        match mood.map(str::parse::<Mood>) {
            None => Self::Unstable,
            Some(Ok(Mood::Calm | Mood::Happy)) => Self::Calm,
            Some(_) => Self::Balanced,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unstable => "Unstable",
            Self::Calm => "Calm",
            Self::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for MindBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Figures on the profile screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Committed entries owned by the user
    pub journal_count: usize,

    pub mind_balance: MindBalance,
}
