//! Foundation types for Agora.
//!
//! This crate provides the identity, addressing, and post model types used
//! throughout the Agora client. Every other Agora crate depends on
//! `agora-types`.
//!
//! # Key Types
//!
//! - [`ContentAddress`] — Content-addressed blob identifier (BLAKE3 hash)
//! - [`AccountId`] — Account identity derived from an ed25519 public key
//! - [`PostId`] — Opaque post identifier assigned by the ledger
//! - [`Post`] — Fully materialized post, the cached form
//! - [`ContentRecord`] — The byte-exact payload handed to the content store
//! - [`Signer`] — Caller-held signing credential for ledger writes

pub mod account;
pub mod address;
pub mod error;
pub mod post;
pub mod signer;
pub mod tx;

pub use account::AccountId;
pub use address::ContentAddress;
pub use error::TypeError;
pub use post::{ContentRecord, FeedCursor, Post, PostId};
pub use signer::{Signature, Signer};
pub use tx::TxHash;
