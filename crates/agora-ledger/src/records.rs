use serde::{Deserialize, Serialize};

use agora_types::{AccountId, ContentAddress, PostId, TxHash};

/// The ledger's metadata row for a post.
///
/// Everything except the two counters is written once at creation. The
/// counters are the authoritative engagement state; cached copies elsewhere
/// are snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub author: AccountId,
    pub content_address: ContentAddress,
    pub reply_to: Option<PostId>,
    pub like_count: u64,
    pub repost_count: u64,
}

/// Handle for a submitted, not-yet-confirmed transaction.
///
/// Holding a `PendingTx` proves nothing about the outcome; the effect is
/// durable only once [`await_receipt`] returns a receipt.
///
/// [`await_receipt`]: crate::traits::LedgerWriter::await_receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: TxHash,
}

/// Event emitted by a confirmed registry transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A post was created and assigned an id.
    PostCreated { post_id: PostId, author: AccountId },
    /// A post's like counter was incremented.
    PostLiked { post_id: PostId, account: AccountId },
    /// A follow edge was added to the social graph.
    Followed {
        follower: AccountId,
        followee: AccountId,
    },
}

/// Confirmation result of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub events: Vec<LedgerEvent>,
}

impl TxReceipt {
    /// The post id assigned by a creation event, if one was emitted.
    pub fn post_created(&self) -> Option<PostId> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::PostCreated { post_id, .. } => Some(*post_id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_created_finds_the_creation_event() {
        let author = AccountId::ephemeral();
        let receipt = TxReceipt {
            tx_hash: TxHash::from_hash([1; 32]),
            events: vec![
                LedgerEvent::PostLiked {
                    post_id: PostId::new(7),
                    account: author.clone(),
                },
                LedgerEvent::PostCreated {
                    post_id: PostId::new(9),
                    author,
                },
            ],
        };
        assert_eq!(receipt.post_created(), Some(PostId::new(9)));
    }

    #[test]
    fn post_created_is_none_without_the_event() {
        let receipt = TxReceipt {
            tx_hash: TxHash::from_hash([2; 32]),
            events: vec![],
        };
        assert_eq!(receipt.post_created(), None);
    }
}
