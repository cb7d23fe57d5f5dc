use std::time::Duration;

use thiserror::Error;

use agora_ledger::LedgerError;
use agora_store::StoreError;
use agora_types::{AccountId, PostId, TypeError};

/// Errors surfaced by read-path operations.
///
/// Reads propagate to the caller wrapped in the operation-level variant
/// (`PostFetchFailed` / `FeedFetchFailed`) with the root cause attached;
/// there is no sensible partial-success value for a read. No failure is
/// retried, and none poisons the facade.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("content store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("content record error: {0}")]
    Record(#[from] TypeError),

    #[error("{op} timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("failed to fetch post {id}: {source}")]
    PostFetchFailed {
        id: PostId,
        source: Box<ClientError>,
    },

    #[error("failed to fetch feed for {account}: {source}")]
    FeedFetchFailed {
        account: AccountId,
        source: Box<ClientError>,
    },
}

/// Result alias for read-path operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Structured failure returned by write-path operations.
///
/// Writes never raise a collaborator error past the facade; every failure
/// is folded into this value. The message is always non-empty and
/// human-readable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WriteError {
    pub message: String,
}

impl From<ClientError> for WriteError {
    fn from(err: ClientError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Result alias for write-path operations.
pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_wrap_embeds_the_root_cause() {
        let err = ClientError::PostFetchFailed {
            id: PostId::new(3),
            source: Box::new(ClientError::Ledger(LedgerError::UnknownPost(PostId::new(3)))),
        };
        let message = err.to_string();
        assert!(message.contains("failed to fetch post p#3"));
        assert!(message.contains("unknown post"));
    }

    #[test]
    fn write_error_carries_the_message() {
        let inner = ClientError::Ledger(LedgerError::Rejected("node said no".into()));
        let write = WriteError::from(inner);
        assert!(!write.message.is_empty());
        assert!(write.message.contains("node said no"));
    }
}
