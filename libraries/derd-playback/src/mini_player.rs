//! Mini-player controller
//!
//! The persistent bar shown on every screen while a session is loaded. It
//! holds no state of its own; everything is derived from the manager.

use crate::{error::Result, manager::SessionManager, types::PlaybackState};
use std::sync::Arc;
use tokio::sync::watch;

/// Downward drag distance, in points, past which a release dismisses the bar
pub const DISMISS_THRESHOLD: f32 = 60.0;

/// What the bar renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniPlayerView {
    pub title: String,
    pub is_playing: bool,
}

impl MiniPlayerView {
    /// `None` hides the bar
    pub fn from_state(state: &PlaybackState) -> Option<Self> {
        state.session.as_ref().map(|session| Self {
            title: session.title.clone(),
            is_playing: state.is_playing,
        })
    }
}

/// Controls bound to the shared session manager
#[derive(Clone)]
pub struct MiniPlayer {
    manager: Arc<SessionManager>,
}

impl MiniPlayer {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Current view, `None` while idle
    pub fn view(&self) -> Option<MiniPlayerView> {
        MiniPlayerView::from_state(&self.manager.state())
    }

    /// Raw state updates for re-rendering
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.manager.subscribe()
    }

    /// Play/pause button
    pub async fn toggle(&self) -> Result<()> {
        if self.manager.state().is_playing {
            self.manager.pause().await
        } else {
            self.manager.resume().await
        }
    }

    /// Drag released after moving `drag_distance` points downwards
    ///
    /// Returns whether the session was dismissed; shorter drags snap back.
    pub async fn release_drag(&self, drag_distance: f32) -> Result<bool> {
        if drag_distance <= DISMISS_THRESHOLD {
            return Ok(false);
        }
        self.manager.dismiss().await?;
        Ok(true)
    }
}
