use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::address::ContentAddress;
use crate::error::TypeError;

/// Opaque post identifier assigned by the ledger at creation.
///
/// Ids are never client-chosen, never reused, and never mutated.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    /// Wrap a raw ledger-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostId(p#{})", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p#{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Opaque pagination token defined by the ledger.
///
/// The client passes cursors through untouched; only the ledger interprets
/// them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedCursor(String);

impl FeedCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully materialized post, the form held in the post cache.
///
/// Every field except `likes` and `reposts` is write-once. The two counters
/// are point-in-time snapshots of ledger state; the cache's invalidation
/// discipline bounds how stale they can get.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Ledger-assigned identifier.
    pub id: PostId,
    /// Creating account, recorded by the ledger.
    pub author: AccountId,
    /// Text payload from the content store.
    pub content: String,
    /// Ordered content references attached to the post.
    pub attachments: Vec<ContentAddress>,
    /// Creation time (epoch milliseconds) recorded at content-store time.
    pub timestamp_ms: u64,
    /// Parent post, when this post is a reply.
    pub reply_to: Option<PostId>,
    /// Like counter snapshot. Authoritative value lives on the ledger.
    pub likes: u64,
    /// Repost counter snapshot. Authoritative value lives on the ledger.
    pub reposts: u64,
}

/// The exact payload handed to the content store when a post is created.
///
/// Serialization is canonical JSON in field order: the same record always
/// produces the same bytes, and therefore the same [`ContentAddress`]. The
/// record is never mutated after storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Post text.
    pub text: String,
    /// Ordered attachment references.
    pub attachments: Vec<ContentAddress>,
    /// Creation time in epoch milliseconds.
    pub timestamp_ms: u64,
}

impl ContentRecord {
    pub fn new(text: impl Into<String>, attachments: Vec<ContentAddress>, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            attachments,
            timestamp_ms,
        }
    }

    /// Serialize to the canonical byte form stored in the content store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::MalformedRecord(e.to_string()))
    }

    /// Decode a record retrieved from the content store.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::MalformedRecord(e.to_string()))
    }

    /// The content address the canonical bytes hash to.
    pub fn address(&self) -> Result<ContentAddress, TypeError> {
        Ok(ContentAddress::from_bytes(&self.to_bytes()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ContentRecord {
        ContentRecord::new(
            "hello",
            vec![ContentAddress::from_bytes(b"attachment")],
            1_700_000_000_000,
        )
    }

    #[test]
    fn post_id_display() {
        assert_eq!(format!("{}", PostId::new(42)), "p#42");
    }

    #[test]
    fn content_record_bytes_are_deterministic() {
        let a = record().to_bytes().unwrap();
        let b = record().to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn content_record_roundtrip() {
        let original = record();
        let bytes = original.to_bytes().unwrap();
        let decoded = ContentRecord::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn address_matches_canonical_bytes() {
        let r = record();
        let bytes = r.to_bytes().unwrap();
        assert_eq!(r.address().unwrap(), ContentAddress::from_bytes(&bytes));
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(matches!(
            ContentRecord::from_bytes(b"not json at all"),
            Err(TypeError::MalformedRecord(_))
        ));
    }

    #[test]
    fn feed_cursor_is_opaque_passthrough() {
        let cursor = FeedCursor::new("whatever-the-ledger-said");
        assert_eq!(cursor.as_str(), "whatever-the-ledger-said");
    }
}
