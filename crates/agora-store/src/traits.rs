use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

use agora_types::ContentAddress;

use crate::error::StoreResult;

/// Lazy sequence of byte chunks produced by a retrieval.
///
/// Consumers must concatenate the full sequence before decoding; chunk
/// boundaries carry no meaning.
pub type ByteStream = BoxStream<'static, StoreResult<Bytes>>;

/// Content-addressed blob store.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once stored. Content-addressing guarantees this:
///   the same bytes always produce the same address, and a retrieval by
///   address returns byte-identical content.
/// - Storing identical bytes twice is a no-op (idempotent).
/// - The store never interprets blob contents — it is a pure byte store.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store a blob and return its content address.
    ///
    /// Fails with [`StoreError::Unavailable`] when the backing service
    /// cannot be reached.
    ///
    /// [`StoreError::Unavailable`]: crate::error::StoreError::Unavailable
    async fn store(&self, bytes: &[u8]) -> StoreResult<ContentAddress>;

    /// Retrieve a blob as a lazy stream of byte chunks.
    ///
    /// Fails with [`StoreError::NotFound`] when no blob exists at the
    /// address, or [`StoreError::Unavailable`] on transport failure.
    ///
    /// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
    /// [`StoreError::Unavailable`]: crate::error::StoreError::Unavailable
    async fn retrieve(&self, address: &ContentAddress) -> StoreResult<ByteStream>;
}

/// Concatenate a retrieval stream into a single buffer.
pub async fn read_to_end(mut stream: ByteStream) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}
