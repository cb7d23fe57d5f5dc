use async_trait::async_trait;

use agora_types::{AccountId, ContentAddress, FeedCursor, PostId, Signer};

use crate::error::LedgerResult;
use crate::records::{PendingTx, PostRecord, TxReceipt};

/// Read boundary of the post registry. No signature required.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetch the metadata row for a post.
    async fn get_post(&self, id: PostId) -> LedgerResult<PostRecord>;

    /// Accounts the given account follows, in ledger order.
    async fn get_following(&self, account: &AccountId) -> LedgerResult<Vec<AccountId>>;

    /// Up to `limit` post ids authored by any of `authors`, newest first,
    /// resuming from `cursor`.
    ///
    /// The cursor is an opaque token the ledger defines; callers pass it
    /// through untouched. `None` starts from the newest post.
    async fn posts_by_authors(
        &self,
        authors: &[AccountId],
        limit: usize,
        cursor: Option<&FeedCursor>,
    ) -> LedgerResult<Vec<PostId>>;
}

/// Write boundary of the post registry.
///
/// All writes are two-phase: `submit_*` hands the signed transaction to the
/// ledger and returns a pending handle; the effect is durable only once
/// [`await_receipt`](LedgerWriter::await_receipt) confirms it. Failures are
/// surfaced, never silently retried.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Submit a post creation pointing at stored content.
    async fn submit_create_post(
        &self,
        signer: &Signer,
        content_address: &ContentAddress,
        reply_to: Option<PostId>,
    ) -> LedgerResult<PendingTx>;

    /// Submit a like for a post.
    async fn submit_like(&self, signer: &Signer, post: PostId) -> LedgerResult<PendingTx>;

    /// Submit a follow edge from the signer's account.
    async fn submit_follow(&self, signer: &Signer, account: &AccountId)
        -> LedgerResult<PendingTx>;

    /// Wait for a submitted transaction to confirm.
    ///
    /// Returns the receipt with emitted events, or
    /// [`LedgerError::Reverted`](crate::error::LedgerError::Reverted) when
    /// the transaction confirmed but its effects failed.
    async fn await_receipt(&self, pending: &PendingTx) -> LedgerResult<TxReceipt>;
}
