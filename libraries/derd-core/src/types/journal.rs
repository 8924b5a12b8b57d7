/// Journal domain types
use crate::types::{Document, EntryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Mood attached to a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Sad,
    Tense,
    Tired,
}

impl Mood {
    /// All moods in picker order
    pub const ALL: [Mood; 5] = [Mood::Happy, Mood::Calm, Mood::Sad, Mood::Tense, Mood::Tired];

    /// Stored key
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Sad => "sad",
            Mood::Tense => "tense",
            Mood::Tired => "tired",
        }
    }

    /// Emoji shown next to entry titles
    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Sad => "😔",
            Mood::Tense => "😠",
            Mood::Tired => "😴",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mood '{}'", s))
    }
}

/// User input for a new or edited entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub mood: Mood,
}

impl EntryDraft {
    /// Create a draft
    pub fn new(title: impl Into<String>, content: impl Into<String>, mood: Mood) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            mood,
        }
    }

    /// Title and content must both contain something besides whitespace
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.content.trim().is_empty() {
            return Err("title and content cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Journal entry that exists in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Remote document ID
    pub id: EntryId,

    pub title: String,

    pub content: String,

    pub mood: Mood,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,

    /// Owning user
    pub owner_id: UserId,
}

impl JournalEntry {
    /// Decode a `diaries` document.
    ///
    /// Returns `None` for documents that are incomplete (no server timestamp
    /// yet) or that carry an unknown mood.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            id: doc.id.clone(),
            title: doc.get_str("title")?.to_string(),
            content: doc.get_str("content")?.to_string(),
            mood: doc.get_str("mood")?.parse().ok()?,
            created_at: doc.get_timestamp("createdAt")?,
            owner_id: UserId::new(doc.get_str("userId")?),
        })
    }
}

/// Journal entry buffered on the device while offline
///
/// Has no remote ID by construction; `local_id` is an idempotency key that
/// travels with the entry when it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedEntry {
    pub local_id: Uuid,

    pub title: String,

    pub content: String,

    pub mood: Mood,

    /// Device wall-clock time at enqueue; replaced by the server time on commit
    pub queued_at: DateTime<Utc>,
}

impl QueuedEntry {
    /// Queue a draft with a fresh idempotency key
    pub fn from_draft(draft: EntryDraft) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            mood: draft.mood,
            queued_at: Utc::now(),
        }
    }
}
