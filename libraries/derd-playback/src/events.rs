//! Playback Events
//!
//! Discrete notifications for UI feedback (toasts, analytics). Continuous
//! state is observed through the manager's watch channel instead.

use crate::types::{PlaybackSession, SessionId};
use serde::{Deserialize, Serialize};

/// Events emitted by the session manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A new session is loaded and playing
    SessionStarted {
        session: PlaybackSession,
        /// Session it replaced, if any
        replaced: Option<SessionId>,
    },

    /// Playback paused
    Paused { session_id: SessionId },

    /// Playback resumed from the paused position
    Resumed { session_id: SessionId },

    /// Session released
    Stopped { session_id: SessionId },

    /// An operation failed
    Error {
        /// Error message, ready for an alert
        message: String,
    },
}
