//! Shared fixtures for sync integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use derd_core::{
    Connectivity, DerdError, Document, DocumentId, DocumentStore, FeedPost, Fields, FieldValue,
    Identity, KeyValueStore, Query, Subscription, UserId,
};
use derd_storage::{KvDocumentStore, MemoryKeyValueStore};
use derd_sync::{JournalService, OfflineQueue};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// Pauses a write until the test lets it continue
pub struct Gate {
    pub reached: Notify,
    pub resume: Notify,
}

/// Which `DocumentStore` call produced a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Merge,
}

/// One recorded write
#[derive(Debug, Clone)]
pub struct Write {
    pub kind: WriteKind,
    pub collection: String,
    pub id: Option<DocumentId>,
    pub fields: Fields,
}

/// Remote store that records writes and fails on demand
///
/// Creates and merges share one attempt index; `fail_write_at`,
/// `after_write` and `gate_next_write` all count against it.
pub struct RecordingStore {
    inner: KvDocumentStore,
    writes: Mutex<Vec<Write>>,
    attempts: Mutex<usize>,
    fail_write_at: Mutex<Option<usize>>,
    after_write: Mutex<Option<Hook>>,
    gate: Mutex<Option<Arc<Gate>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: KvDocumentStore::new(Arc::new(MemoryKeyValueStore::new())),
            writes: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            fail_write_at: Mutex::new(None),
            after_write: Mutex::new(None),
            gate: Mutex::new(None),
        }
    }

    /// Fail the create or merge attempt with this zero-based index
    pub fn fail_write_at(&self, index: Option<usize>) {
        *self.fail_write_at.lock().unwrap() = index;
    }

    /// Run after each successful create or merge, with its attempt index
    pub fn after_write(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.after_write.lock().unwrap() = Some(Box::new(hook));
    }

    /// Hold the next create or merge until `resume` is notified
    pub fn gate_next_write(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate {
            reached: Notify::new(),
            resume: Notify::new(),
        });
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    /// Writes of one kind, in call order
    pub fn writes_of(&self, kind: WriteKind) -> Vec<Write> {
        self.writes()
            .into_iter()
            .filter(|w| w.kind == kind)
            .collect()
    }

    /// Attempted writes of any kind into `collection`, failed ones included
    pub fn write_count(&self, collection: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.collection == collection)
            .count()
    }

    /// `field` of every write into `collection`, in call order
    pub fn written_values(&self, collection: &str, field: &str) -> Vec<Value> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.collection == collection)
            .filter_map(|w| match w.fields.get(field) {
                Some(FieldValue::Value(v)) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Decoded feed post; panics if missing
    pub async fn get_post(&self, id: &DocumentId) -> FeedPost {
        let doc = self
            .inner
            .get(derd_sync::FEED_COLLECTION, id)
            .await
            .unwrap()
            .expect("post exists");
        FeedPost::from_document(&doc).expect("post decodes")
    }

    /// Current contents of a collection
    pub async fn all(&self, collection: &str) -> Vec<Document> {
        self.inner
            .subscribe(Query::collection(collection))
            .await
            .unwrap()
            .current()
    }

    fn record(&self, kind: WriteKind, collection: &str, id: Option<&DocumentId>, fields: &Fields) {
        self.writes.lock().unwrap().push(Write {
            kind,
            collection: collection.to_string(),
            id: id.cloned(),
            fields: fields.clone(),
        });
    }

    /// Wait on the gate, then claim an attempt index; errors if it should fail
    async fn begin_attempt(&self) -> derd_core::Result<usize> {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.reached.notify_one();
            gate.resume.notified().await;
        }

        let index = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };
        if *self.fail_write_at.lock().unwrap() == Some(index) {
            return Err(DerdError::remote("connection reset"));
        }
        Ok(index)
    }

    fn finish_attempt(&self, index: usize) {
        if let Some(hook) = self.after_write.lock().unwrap().as_ref() {
            hook(index);
        }
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn create(&self, collection: &str, fields: Fields) -> derd_core::Result<DocumentId> {
        self.record(WriteKind::Create, collection, None, &fields);
        let index = self.begin_attempt().await?;
        let id = self.inner.create(collection, fields).await?;
        self.finish_attempt(index);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> derd_core::Result<()> {
        self.record(WriteKind::Update, collection, Some(id), &fields);
        self.inner.update(collection, id, fields).await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> derd_core::Result<()> {
        self.record(WriteKind::Merge, collection, Some(id), &fields);
        let index = self.begin_attempt().await?;
        self.inner.merge(collection, id, fields).await?;
        self.finish_attempt(index);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &DocumentId) -> derd_core::Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn subscribe(&self, query: Query) -> derd_core::Result<Subscription<Vec<Document>>> {
        self.inner.subscribe(query).await
    }
}

/// Device store whose writes can be switched off
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
}

impl FlakyKeyValueStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryKeyValueStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every `set` and `remove` fail until switched back
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> derd_core::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DerdError::storage("disk full"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FlakyKeyValueStore {
    async fn get(&self, key: &str) -> derd_core::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> derd_core::Result<()> {
        self.check_writable()?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> derd_core::Result<()> {
        self.check_writable()?;
        self.inner.remove(key).await
    }
}

/// Journal service wired to fakes
pub struct Harness {
    pub remote: Arc<RecordingStore>,
    pub device: Arc<FlakyKeyValueStore>,
    pub identity: Identity,
    pub connectivity: Connectivity,
    pub journal: Arc<JournalService>,
}

impl Harness {
    pub fn new(online: bool) -> Self {
        let remote = Arc::new(RecordingStore::new());
        let device = Arc::new(FlakyKeyValueStore::new());
        let identity = Identity::signed_in(UserId::new("user-1"));
        let connectivity = Connectivity::new(online);

        let device_store: Arc<dyn KeyValueStore> = device.clone();
        let journal = Arc::new(JournalService::new(
            remote.clone(),
            Arc::new(OfflineQueue::new(device_store)),
            Arc::new(identity.clone()),
            connectivity.clone(),
        ));

        Self {
            remote,
            device,
            identity,
            connectivity,
            journal,
        }
    }
}
