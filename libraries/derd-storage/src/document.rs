//! Document store over a key-value store
//!
//! Each collection is one JSON object (`id -> fields`) stored under
//! `documents/<collection>`. Writes resolve server timestamps with the local
//! clock and bump a revision counter; every live subscription recomputes its
//! query on each revision and pushes the result when it differs from the
//! last one it sent.
//!
//! Backed by [`MemoryKeyValueStore`](crate::MemoryKeyValueStore) this is the
//! in-process remote used by tests; backed by
//! [`FileKeyValueStore`](crate::FileKeyValueStore) it is the CLI's local
//! stand-in for the cloud database.

use async_trait::async_trait;
use chrono::Utc;
use derd_core::{
    DerdError, Document, DocumentId, DocumentStore, Fields, KeyValueStore, Query, Result,
    Subscription,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

type Collection = BTreeMap<String, Map<String, Value>>;

/// Document store persisted through a [`KeyValueStore`]
#[derive(Clone)]
pub struct KvDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    revision: watch::Sender<u64>,
}

impl KvDocumentStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                kv,
                write_lock: Mutex::new(()),
                revision,
            }),
        }
    }
}

impl Inner {
    fn key(collection: &str) -> String {
        format!("documents/{}", collection)
    }

    async fn load(&self, collection: &str) -> Result<Collection> {
        match self.kv.get(&Self::key(collection)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Collection::new()),
        }
    }

    async fn save(&self, collection: &str, docs: &Collection) -> Result<()> {
        let raw = serde_json::to_string(docs)?;
        self.kv.set(&Self::key(collection), &raw).await?;
        self.revision.send_modify(|rev| *rev += 1);
        Ok(())
    }

    async fn snapshot(&self, query: &Query) -> Result<Vec<Document>> {
        let docs = self.load(&query.collection).await?;
        Ok(query.apply(
            docs.into_iter()
                .map(|(id, fields)| Document::new(DocumentId::new(id), fields)),
        ))
    }
}

#[async_trait]
impl DocumentStore for KvDocumentStore {
    async fn create(&self, collection: &str, fields: Fields) -> Result<DocumentId> {
        let _guard = self.inner.write_lock.lock().await;
        let mut docs = self.inner.load(collection).await?;

        let id = DocumentId::generate();
        let mut stored = Map::new();
        fields.apply_to(&mut stored, Utc::now());
        docs.insert(id.to_string(), stored);

        self.inner.save(collection, &docs).await?;
        debug!(collection, id = %id, "Created document");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;
        let mut docs = self.inner.load(collection).await?;

        let stored = docs
            .get_mut(id.as_str())
            .ok_or_else(|| DerdError::not_found(collection, id.as_str()))?;
        fields.apply_to(stored, Utc::now());

        self.inner.save(collection, &docs).await?;
        debug!(collection, id = %id, "Updated document");
        Ok(())
    }

    async fn merge(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<()> {
        let _guard = self.inner.write_lock.lock().await;
        let mut docs = self.inner.load(collection).await?;

        let stored = docs.entry(id.to_string()).or_default();
        fields.apply_to(stored, Utc::now());

        self.inner.save(collection, &docs).await?;
        debug!(collection, id = %id, "Merged document");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>> {
        let mut docs = self.inner.load(collection).await?;
        Ok(docs
            .remove(id.as_str())
            .map(|fields| Document::new(id.clone(), fields)))
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription<Vec<Document>>> {
        // Subscribe to revisions before the first read so no write is missed
        let mut revisions = self.inner.revision.subscribe();
        let initial = self.inner.snapshot(&query).await?;
        let (tx, rx) = watch::channel(initial);

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                match inner.snapshot(&query).await {
                    Ok(docs) => {
                        tx.send_if_modified(|current| {
                            if *current == docs {
                                return false;
                            }
                            *current = docs;
                            true
                        });
                    }
                    Err(e) => warn!(collection = %query.collection, "Snapshot refresh failed: {}", e),
                }
                if tx.is_closed() {
                    break;
                }
            }
        });

        Ok(Subscription::with_task(rx, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyValueStore;
    use derd_core::Direction;
    use serde_json::json;

    fn store() -> KvDocumentStore {
        KvDocumentStore::new(Arc::new(MemoryKeyValueStore::new()))
    }

    #[tokio::test]
    async fn create_resolves_server_timestamp() {
        let store = store();
        let id = store
            .create(
                "diaries",
                Fields::new().with("title", "A").server_timestamp("createdAt"),
            )
            .await
            .unwrap();

        let doc = store.get("diaries", &id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("title"), Some("A"));
        assert!(doc.get_timestamp("createdAt").is_some());
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = store();
        let err = store
            .update("diaries", &DocumentId::new("nope"), Fields::new().with("title", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DerdError::NotFound { .. }));
    }

    #[tokio::test]
    async fn merge_creates_then_keeps_other_fields() {
        let store = store();
        let id = DocumentId::new("u1");
        store
            .merge("users", &id, Fields::new().with("name", "Ada"))
            .await
            .unwrap();
        store
            .merge("users", &id, Fields::new().server_timestamp("lastJournalAt"))
            .await
            .unwrap();

        let doc = store.get("users", &id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("name"), Some("Ada"));
        assert!(doc.get_timestamp("lastJournalAt").is_some());
    }

    #[tokio::test]
    async fn increments_accumulate() {
        let store = store();
        let id = store
            .create("exploreContent", Fields::new().with("likesCount", 0))
            .await
            .unwrap();
        for _ in 0..3 {
            store
                .update("exploreContent", &id, Fields::new().increment("likesCount", 1))
                .await
                .unwrap();
        }
        store
            .update("exploreContent", &id, Fields::new().increment("likesCount", -1))
            .await
            .unwrap();

        let doc = store.get("exploreContent", &id).await.unwrap().unwrap();
        assert_eq!(doc.get("likesCount"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn subscription_pushes_matching_changes_only() {
        let store = store();
        let query = Query::collection("diaries")
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Descending);
        let mut sub = store.subscribe(query).await.unwrap();
        assert!(sub.current().is_empty());

        store
            .create(
                "diaries",
                Fields::new().with("userId", "u1").server_timestamp("createdAt"),
            )
            .await
            .unwrap();

        let snapshot = tokio::time::timeout(std::time::Duration::from_secs(2), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.len(), 1);

        // Another user's entry leaves this result set unchanged
        store
            .create(
                "diaries",
                Fields::new().with("userId", "u2").server_timestamp("createdAt"),
            )
            .await
            .unwrap();
        assert_eq!(sub.current().len(), 1);
    }
}
