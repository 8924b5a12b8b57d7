//! Session manager - the single owner of the app's audio resource
//!
//! Every operation locks the active slot for its whole duration, so a second
//! `play` waits until the first one has torn down its predecessor and
//! settled its own load. Two resources are never held at once.

use crate::{
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    types::{PlaybackSession, PlaybackState},
};
use derd_core::{AudioLoader, AudioResource, DerdError, SourceHandle};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, warn};

/// Buffered events per subscriber before the oldest are dropped
const EVENT_CAPACITY: usize = 32;

/// Loaded resource plus what observers know about it
struct ActiveSession {
    session: PlaybackSession,
    resource: Box<dyn AudioResource>,
    playing: bool,
}

/// App-wide playback session manager
///
/// Share it through an `Arc`; observers use [`subscribe`](Self::subscribe).
pub struct SessionManager {
    loader: Arc<dyn AudioLoader>,
    active: Mutex<Option<ActiveSession>>,
    state_tx: watch::Sender<PlaybackState>,
    events_tx: broadcast::Sender<PlaybackEvent>,
}

impl SessionManager {
    /// Create an idle manager that loads audio through `loader`
    pub fn new(loader: Arc<dyn AudioLoader>) -> Self {
        let (state_tx, _) = watch::channel(PlaybackState::default());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            loader,
            active: Mutex::new(None),
            state_tx,
            events_tx,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> PlaybackState {
        self.state_tx.borrow().clone()
    }

    /// Observe every change of session identity or `is_playing`
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    /// Discrete playback events
    pub fn events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events_tx.subscribe()
    }

    /// Replace whatever is loaded with a new session and start playing it
    ///
    /// The previous resource is stopped and unloaded before the new one is
    /// requested from the loader. On failure nothing is active.
    pub async fn play(
        &self,
        title: impl Into<String>,
        source: SourceHandle,
    ) -> Result<PlaybackSession> {
        let mut active = self.active.lock().await;

        let replaced = match active.take() {
            Some(previous) => {
                let id = previous.session.id;
                if let Err(e) = Self::teardown(previous).await {
                    warn!(session_id = %id, "Previous session did not release cleanly: {}", e);
                }
                self.publish(None);
                Some(id)
            }
            None => None,
        };

        let session = PlaybackSession::new(title.into(), source);
        debug!(session_id = %session.id, title = %session.title, "Loading session");

        let mut resource = match self.loader.load(&session.source).await {
            Ok(resource) => resource,
            Err(e) => {
                let err = PlaybackError::load(&session.title, e);
                self.emit_error(&err);
                return Err(err);
            }
        };

        if let Err(e) = resource.play().await {
            if let Err(unload_err) = resource.unload().await {
                warn!(session_id = %session.id, "Unload after failed start: {}", unload_err);
            }
            let err = PlaybackError::Playback(e);
            self.emit_error(&err);
            return Err(err);
        }

        *active = Some(ActiveSession {
            session: session.clone(),
            resource,
            playing: true,
        });
        self.publish(active.as_ref());
        self.emit(PlaybackEvent::SessionStarted {
            session: session.clone(),
            replaced,
        });

        debug!(session_id = %session.id, "Session playing");
        Ok(session)
    }

    /// Pause the active session; no-op when idle or already paused
    pub async fn pause(&self) -> Result<()> {
        let mut active = self.active.lock().await;
        let Some(current) = active.as_mut() else {
            return Ok(());
        };
        if !current.playing {
            return Ok(());
        }

        current
            .resource
            .pause()
            .await
            .map_err(PlaybackError::Playback)?;
        current.playing = false;
        let session_id = current.session.id;

        self.publish(active.as_ref());
        self.emit(PlaybackEvent::Paused { session_id });
        Ok(())
    }

    /// Resume from the paused position; no-op when idle or already playing
    pub async fn resume(&self) -> Result<()> {
        let mut active = self.active.lock().await;
        let Some(current) = active.as_mut() else {
            return Ok(());
        };
        if current.playing {
            return Ok(());
        }

        current
            .resource
            .play()
            .await
            .map_err(PlaybackError::Playback)?;
        current.playing = true;
        let session_id = current.session.id;

        self.publish(active.as_ref());
        self.emit(PlaybackEvent::Resumed { session_id });
        Ok(())
    }

    /// Release the resource and go idle; safe to call when already idle
    ///
    /// The session is cleared even if the platform reports a teardown error.
    pub async fn stop(&self) -> Result<()> {
        let mut active = self.active.lock().await;
        let Some(current) = active.take() else {
            return Ok(());
        };
        let session_id = current.session.id;

        let result = Self::teardown(current).await;
        self.publish(None);
        self.emit(PlaybackEvent::Stopped { session_id });
        debug!(%session_id, "Session stopped");

        result.map_err(PlaybackError::Teardown)
    }

    /// Mini-player dismiss gesture finished; same as [`stop`](Self::stop)
    pub async fn dismiss(&self) -> Result<()> {
        self.stop().await
    }

    /// Stop then unload; unload runs even when stop fails
    async fn teardown(mut current: ActiveSession) -> std::result::Result<(), DerdError> {
        let stopped = current.resource.stop().await;
        let unloaded = current.resource.unload().await;
        stopped.and(unloaded)
    }

    fn publish(&self, active: Option<&ActiveSession>) {
        let next = PlaybackState {
            session: active.map(|a| a.session.clone()),
            is_playing: active.is_some_and(|a| a.playing),
        };
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        // No receivers is fine
        let _ = self.events_tx.send(event);
    }

    fn emit_error(&self, err: &PlaybackError) {
        warn!("Playback error: {}", err);
        self.emit(PlaybackEvent::Error {
            message: err.to_string(),
        });
    }
}
