//! Derd Playback - app-wide audio session management
//!
//! Exactly one piece of audio may be loaded at a time, across all screens.
//! [`SessionManager`] owns the platform resource and tears the previous one
//! down before loading the next, so a meditation started on one screen and a
//! nature sound started on another never overlap.
//!
//! The crate is platform-agnostic: audio comes from an
//! [`AudioLoader`](derd_core::AudioLoader) the host application supplies.
//!
//! # Example
//!
//! ```rust,no_run
//! use derd_core::{AudioLoader, SourceHandle};
//! use derd_playback::SessionManager;
//! use std::sync::Arc;
//!
//! # async fn example(loader: Arc<dyn AudioLoader>) -> derd_playback::Result<()> {
//! let manager = SessionManager::new(loader);
//!
//! manager.play("Morning Calm", SourceHandle::new("meditations/morning")).await?;
//! manager.play("Rain", SourceHandle::new("sounds/rain")).await?;
//!
//! assert_eq!(manager.state().title(), Some("Rain"));
//! manager.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod manager;
pub mod mini_player;
pub mod types;

pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use manager::SessionManager;
pub use mini_player::{MiniPlayer, MiniPlayerView, DISMISS_THRESHOLD};
pub use types::{PlaybackSession, PlaybackState, PlaybackStatus, SessionId};
