use agora_types::{PostId, TxHash};

/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Submission was refused before entering the ledger.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction was confirmed but its effects failed.
    #[error("transaction {tx_hash} reverted: {reason}")]
    Reverted { tx_hash: TxHash, reason: String },

    /// A confirmation receipt is missing an expected event.
    #[error("malformed receipt for {tx_hash}: {reason}")]
    MalformedReceipt { tx_hash: TxHash, reason: String },

    /// No post exists under the requested id.
    #[error("unknown post: {0}")]
    UnknownPost(PostId),

    /// The ledger has no record of the transaction.
    #[error("unknown transaction: {0}")]
    UnknownTx(TxHash),

    /// The ledger node could not be reached or returned garbage.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
