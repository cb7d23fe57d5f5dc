use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use agora_types::ContentAddress;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ByteStream, ContentStore};

/// Chunk size used when streaming a blob back out.
const CHUNK_SIZE: usize = 16 * 1024;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock`. Retrieval streams the blob back in fixed-size chunks so
/// consumers exercise the same concatenation path as against a real
/// gateway. Call counters and an offline toggle let tests observe and
/// disturb the facade's traffic.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<ContentAddress, Bytes>>,
    store_calls: AtomicU64,
    retrieve_calls: AtomicU64,
    offline: AtomicBool,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            store_calls: AtomicU64::new(0),
            retrieve_calls: AtomicU64::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Remove all blobs.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }

    /// Remove a single blob. Returns `true` if it existed.
    pub fn remove(&self, address: &ContentAddress) -> bool {
        self.blobs
            .write()
            .expect("lock poisoned")
            .remove(address)
            .is_some()
    }

    /// Number of `store` calls observed so far.
    pub fn store_count(&self) -> u64 {
        self.store_calls.load(Ordering::Relaxed)
    }

    /// Number of `retrieve` calls observed so far.
    pub fn retrieve_count(&self) -> u64 {
        self.retrieve_calls.load(Ordering::Relaxed)
    }

    /// Make every subsequent call fail with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("store is offline".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn store(&self, bytes: &[u8]) -> StoreResult<ContentAddress> {
        self.store_calls.fetch_add(1, Ordering::Relaxed);
        self.check_online()?;

        let address = ContentAddress::from_bytes(bytes);
        let mut map = self.blobs.write().expect("lock poisoned");
        // Idempotent: the same bytes always map to the same address.
        map.entry(address)
            .or_insert_with(|| Bytes::copy_from_slice(bytes));
        Ok(address)
    }

    async fn retrieve(&self, address: &ContentAddress) -> StoreResult<ByteStream> {
        self.retrieve_calls.fetch_add(1, Ordering::Relaxed);
        self.check_online()?;

        let blob = {
            let map = self.blobs.read().expect("lock poisoned");
            map.get(address)
                .cloned()
                .ok_or(StoreError::NotFound(*address))?
        };

        let chunks: Vec<StoreResult<Bytes>> = (0..blob.len())
            .step_by(CHUNK_SIZE.max(1))
            .map(|start| {
                let end = (start + CHUNK_SIZE).min(blob.len());
                Ok(blob.slice(start..end))
            })
            .collect();
        Ok(futures::stream::iter(chunks).boxed())
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::read_to_end;

    async fn roundtrip(store: &InMemoryContentStore, data: &[u8]) -> Vec<u8> {
        let address = store.store(data).await.unwrap();
        let stream = store.retrieve(&address).await.unwrap();
        read_to_end(stream).await.unwrap()
    }

    // -----------------------------------------------------------------------
    // Store / retrieve
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn store_and_retrieve_roundtrip() {
        let store = InMemoryContentStore::new();
        assert_eq!(roundtrip(&store, b"hello world").await, b"hello world");
    }

    #[tokio::test]
    async fn retrieve_streams_multiple_chunks() {
        let store = InMemoryContentStore::new();
        let big = vec![0xa5u8; CHUNK_SIZE * 3 + 17];
        assert_eq!(roundtrip(&store, &big).await, big);
    }

    #[tokio::test]
    async fn retrieve_missing_blob_is_not_found() {
        let store = InMemoryContentStore::new();
        let missing = ContentAddress::from_bytes(b"never stored");
        let err = store.retrieve(&missing).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound(a) if a == missing));
    }

    // -----------------------------------------------------------------------
    // Content-addressing
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn same_bytes_produce_same_address() {
        let store = InMemoryContentStore::new();
        let a1 = store.store(b"identical").await.unwrap();
        let a2 = store.store(b"identical").await.unwrap();
        assert_eq!(a1, a2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_bytes_produce_different_addresses() {
        let store = InMemoryContentStore::new();
        let a1 = store.store(b"aaa").await.unwrap();
        let a2 = store.store(b"bbb").await.unwrap();
        assert_ne!(a1, a2);
        assert_eq!(store.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Instrumentation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn counters_track_calls() {
        let store = InMemoryContentStore::new();
        let address = store.store(b"counted").await.unwrap();
        store.retrieve(&address).await.unwrap();
        store.retrieve(&address).await.unwrap();
        assert_eq!(store.store_count(), 1);
        assert_eq!(store.retrieve_count(), 2);
    }

    #[tokio::test]
    async fn offline_store_fails_unavailable() {
        let store = InMemoryContentStore::new();
        let address = store.store(b"data").await.unwrap();

        store.set_offline(true);
        assert!(matches!(
            store.store(b"more").await.unwrap_err(),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            store.retrieve(&address).await.err().unwrap(),
            StoreError::Unavailable(_)
        ));

        store.set_offline(false);
        store.retrieve(&address).await.unwrap();
    }

    #[tokio::test]
    async fn remove_deletes_a_single_blob() {
        let store = InMemoryContentStore::new();
        let address = store.store(b"to remove").await.unwrap();
        assert!(store.remove(&address));
        assert!(!store.remove(&address));
        assert!(matches!(
            store.retrieve(&address).await.err().unwrap(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn empty_blob_roundtrips() {
        let store = InMemoryContentStore::new();
        assert_eq!(roundtrip(&store, b"").await, b"");
    }

    #[test]
    fn debug_format() {
        let store = InMemoryContentStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("blob_count"));
    }
}
