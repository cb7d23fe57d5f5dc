//! Content-addressed blob store boundary for Agora.
//!
//! The content store holds opaque byte blobs keyed by the BLAKE3 hash of
//! their content. It is an external collaborator: this crate defines the
//! narrow [`ContentStore`] interface the rest of the client talks through,
//! an in-memory implementation for tests and embedding, and a thin HTTP
//! binding to a blob gateway.

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use http::{GatewayConfig, GatewayProtocol, HttpContentStore};
pub use memory::InMemoryContentStore;
pub use traits::{read_to_end, ByteStream, ContentStore};
