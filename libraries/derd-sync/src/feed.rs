//! Anonymous feed: sharing posts and "positive vibes"
//!
//! Which posts this device has vibed is kept locally as a JSON array of post
//! IDs under [`VIBES_KEY`]; the public counter lives on the post itself.

use crate::error::{Result, SyncError};
use derd_core::{
    Connectivity, Direction, DocumentStore, FeedPost, Fields, KeyValueStore, PostId, Query,
    StoryType, Subscription,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Remote collection of feed posts
pub const FEED_COLLECTION: &str = "exploreContent";

/// Device key holding vibed post IDs
pub const VIBES_KEY: &str = "positiveVibes";

/// Feed posting and vibes
pub struct FeedService {
    remote: Arc<dyn DocumentStore>,
    local: Arc<dyn KeyValueStore>,
    connectivity: Connectivity,
    /// Serializes toggles so the local set and counter stay in step
    vibe_lock: Mutex<()>,
}

impl FeedService {
    pub fn new(
        remote: Arc<dyn DocumentStore>,
        local: Arc<dyn KeyValueStore>,
        connectivity: Connectivity,
    ) -> Self {
        Self {
            remote,
            local,
            connectivity,
            vibe_lock: Mutex::new(()),
        }
    }

    /// Publish an anonymous post
    pub async fn share(&self, content: &str, story_type: StoryType) -> Result<PostId> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SyncError::Invalid("post cannot be empty".to_string()));
        }
        self.require_online()?;

        let fields = Fields::new()
            .with("body", content)
            .with("storyType", story_type.as_str())
            .with("likesCount", 0)
            .server_timestamp("createdAt");
        let id = self
            .remote
            .create(FEED_COLLECTION, fields)
            .await
            .map_err(SyncError::remote)?;

        debug!(post_id = %id, story_type = story_type.as_str(), "Post shared");
        Ok(id)
    }

    /// Whether this device has vibed the post
    pub async fn has_vibed(&self, post_id: &PostId) -> Result<bool> {
        Ok(self.vibed().await?.iter().any(|id| id == post_id.as_str()))
    }

    /// Flip the vibe on a post and return the new state
    ///
    /// The local set changes only after the counter update succeeds. If the
    /// local write then fails, the counter is moved back before the error is
    /// returned.
    pub async fn toggle_vibe(&self, post_id: &PostId) -> Result<bool> {
        let _guard = self.vibe_lock.lock().await;
        self.require_online()?;

        let mut vibed = self.vibed().await?;
        let position = vibed.iter().position(|id| id == post_id.as_str());
        let delta = if position.is_some() { -1 } else { 1 };

        self.remote
            .update(
                FEED_COLLECTION,
                post_id,
                Fields::new().increment("likesCount", delta),
            )
            .await
            .map_err(SyncError::remote)?;

        match position {
            Some(index) => {
                vibed.remove(index);
            }
            None => vibed.push(post_id.to_string()),
        }
        let stored = match serde_json::to_string(&vibed) {
            Ok(raw) => self
                .local
                .set(VIBES_KEY, &raw)
                .await
                .map_err(SyncError::storage),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = stored {
            self.revert_counter(post_id, delta).await;
            return Err(e);
        }

        let now_vibed = position.is_none();
        debug!(post_id = %post_id, vibed = now_vibed, "Vibe toggled");
        Ok(now_vibed)
    }

    /// Live feed, newest first
    pub async fn watch_posts(&self) -> Result<Subscription<Vec<FeedPost>>> {
        let query =
            Query::collection(FEED_COLLECTION).order_by("createdAt", Direction::Descending);
        let docs = self
            .remote
            .subscribe(query)
            .await
            .map_err(SyncError::remote)?;
        Ok(docs.map(|docs| docs.iter().filter_map(FeedPost::from_document).collect()))
    }

    async fn revert_counter(&self, post_id: &PostId, delta: i64) {
        let undo = Fields::new().increment("likesCount", -delta);
        if let Err(e) = self.remote.update(FEED_COLLECTION, post_id, undo).await {
            warn!(post_id = %post_id, "Vibe counter left out of step: {}", e);
        }
    }

    async fn vibed(&self) -> Result<Vec<String>> {
        match self
            .local
            .get(VIBES_KEY)
            .await
            .map_err(SyncError::storage)?
        {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn require_online(&self) -> Result<()> {
        if self.connectivity.is_online() {
            Ok(())
        } else {
            Err(SyncError::Offline)
        }
    }
}
