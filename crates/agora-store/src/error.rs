use agora_types::ContentAddress;

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing service could not be reached or refused the request.
    #[error("content store unavailable: {0}")]
    Unavailable(String),

    /// No blob exists at the requested address.
    #[error("content not found: {0}")]
    NotFound(ContentAddress),

    /// The stored payload is malformed or cannot be decoded.
    #[error("corrupt content at {address}: {reason}")]
    Corrupt {
        address: ContentAddress,
        reason: String,
    },

    /// A remote returned bytes that do not hash to the requested address.
    #[error("address mismatch: expected {expected}, computed {computed}")]
    AddressMismatch {
        expected: ContentAddress,
        computed: ContentAddress,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
