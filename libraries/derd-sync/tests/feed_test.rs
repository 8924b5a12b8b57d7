//! Feed sharing and vibes

mod common;

use common::{FlakyKeyValueStore, RecordingStore};
use derd_core::{Connectivity, DocumentId, KeyValueStore, StoryType};
use derd_sync::{FeedService, SyncError, FEED_COLLECTION, VIBES_KEY};
use std::sync::Arc;

struct Feed {
    remote: Arc<RecordingStore>,
    device: Arc<FlakyKeyValueStore>,
    connectivity: Connectivity,
    service: FeedService,
}

fn feed() -> Feed {
    let remote = Arc::new(RecordingStore::new());
    let device = Arc::new(FlakyKeyValueStore::new());
    let connectivity = Connectivity::new(true);
    let service = FeedService::new(remote.clone(), device.clone(), connectivity.clone());
    Feed {
        remote,
        device,
        connectivity,
        service,
    }
}

#[tokio::test]
async fn shared_post_appears_in_feed() {
    let f = feed();
    let posts = f.service.watch_posts().await.unwrap();
    assert!(posts.current().is_empty());
    drop(posts);

    let id = f
        .service
        .share("  Ten minutes outside helped  ", StoryType::Advice)
        .await
        .unwrap();

    let posts = f.service.watch_posts().await.unwrap().current();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, id);
    assert_eq!(posts[0].content, "Ten minutes outside helped");
    assert_eq!(posts[0].story_type, StoryType::Advice);
    assert_eq!(posts[0].likes_count, 0);
}

#[tokio::test]
async fn shared_post_is_stored_as_body() {
    let f = feed();
    f.service
        .share("Breathe", StoryType::Advice)
        .await
        .unwrap();

    let docs = f.remote.all(FEED_COLLECTION).await;
    assert_eq!(docs[0].get_str("body"), Some("Breathe"));
    assert_eq!(docs[0].get_str("storyType"), Some("advice"));
    assert_eq!(docs[0].get("content"), None);
}

#[tokio::test]
async fn toggle_vibe_moves_counter_and_local_set() {
    let f = feed();
    let id = f
        .service
        .share("Keep going", StoryType::Motivation)
        .await
        .unwrap();
    assert!(!f.service.has_vibed(&id).await.unwrap());

    assert!(f.service.toggle_vibe(&id).await.unwrap());
    assert!(f.service.has_vibed(&id).await.unwrap());
    let post = f.remote.get_post(&id).await;
    assert_eq!(post.likes_count, 1);

    assert!(!f.service.toggle_vibe(&id).await.unwrap());
    assert!(!f.service.has_vibed(&id).await.unwrap());
    assert_eq!(f.remote.get_post(&id).await.likes_count, 0);

    assert_eq!(
        f.device.get(VIBES_KEY).await.unwrap().as_deref(),
        Some("[]")
    );
}

#[tokio::test]
async fn failed_counter_update_leaves_local_set_alone() {
    let f = feed();
    let missing = DocumentId::new("deleted-post");

    let err = f.service.toggle_vibe(&missing).await.unwrap_err();
    assert!(matches!(err, SyncError::Remote(_)));
    assert!(!f.service.has_vibed(&missing).await.unwrap());
    assert_eq!(f.device.get(VIBES_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn sharing_requires_content_and_network() {
    let f = feed();

    let err = f.service.share("   ", StoryType::Experience).await.unwrap_err();
    assert!(matches!(err, SyncError::Invalid(_)));

    f.connectivity.set_online(false);
    let err = f
        .service
        .share("Offline thought", StoryType::Experience)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Offline));
    assert_eq!(f.remote.write_count(FEED_COLLECTION), 0);
}

#[tokio::test]
async fn failed_local_write_rolls_counter_back() {
    let f = feed();
    let id = f.service.share("Small wins", StoryType::Experience).await.unwrap();

    f.device.fail_writes(true);
    let err = f.service.toggle_vibe(&id).await.unwrap_err();
    assert!(matches!(err, SyncError::Storage(_)));
    assert_eq!(f.remote.get_post(&id).await.likes_count, 0);
    assert!(!f.service.has_vibed(&id).await.unwrap());

    f.device.fail_writes(false);
    assert!(f.service.toggle_vibe(&id).await.unwrap());
    assert_eq!(f.remote.get_post(&id).await.likes_count, 1);
    assert!(f.service.has_vibed(&id).await.unwrap());
}
