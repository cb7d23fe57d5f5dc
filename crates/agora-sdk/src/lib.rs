//! High-level client for Agora.
//!
//! Provides [`PostStore`], the facade that publishes and retrieves
//! social-media posts by combining a content-addressed blob store with the
//! post registry on the ledger. This is the main entry point for
//! applications embedding Agora.
//!
//! The facade owns a process-local [`PostCache`]; cached engagement
//! counters are point-in-time snapshots kept honest by delete-on-write
//! invalidation. Install a `tracing` subscriber in the embedding
//! application to see what the client is doing.

pub mod cache;
pub mod client;
pub mod config;
pub mod draft;
pub mod error;

pub use cache::{PostCache, DEFAULT_CACHE_CAPACITY};
pub use client::{FeedQuery, PostStore};
pub use config::ClientConfig;
pub use draft::{CreatedPost, PostDraft, TxConfirmation};
pub use error::{ClientError, ClientResult, WriteError, WriteResult};

// Re-export key types
pub use agora_types::{AccountId, ContentAddress, FeedCursor, Post, PostId, Signer, TxHash};
pub use agora_store::{ContentStore, HttpContentStore, InMemoryContentStore, StoreError};
pub use agora_ledger::{
    HttpLedger, InMemoryLedger, LedgerError, LedgerReader, LedgerWriter, TxReceipt,
};
