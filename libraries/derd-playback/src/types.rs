//! Core types for playback management

use derd_core::SourceHandle;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of one `play` call
///
/// Titles are display labels and may repeat; observers compare sessions by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The piece of audio currently loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Assigned by the manager on `play`
    pub id: SessionId,

    /// Display label (meditation name, sound name)
    pub title: String,

    /// What was loaded
    pub source: SourceHandle,
}

impl PlaybackSession {
    pub(crate) fn new(title: String, source: SourceHandle) -> Self {
        Self {
            id: SessionId::generate(),
            title,
            source,
        }
    }
}

/// Coarse state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing loaded
    Idle,

    /// Loaded and playing
    Playing,

    /// Loaded, paused mid-session
    Paused,
}

/// Observable playback snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Active session, if any
    pub session: Option<PlaybackSession>,

    /// Whether audio is audible right now
    pub is_playing: bool,
}

impl PlaybackState {
    /// Derived status
    pub fn status(&self) -> PlaybackStatus {
        match (&self.session, self.is_playing) {
            (None, _) => PlaybackStatus::Idle,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    /// Active session title, for the mini-player label
    pub fn title(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.title.as_str())
    }
}
