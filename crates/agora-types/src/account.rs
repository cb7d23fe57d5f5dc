use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque account identity on the ledger.
///
/// An `AccountId` is derived deterministically from an ed25519 public key
/// using BLAKE3. The same key always produces the same identity. The ledger
/// attributes posts, likes, and follow edges to account ids; this client
/// never inspects their structure.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    hash: [u8; 32],
}

impl AccountId {
    /// Derive an `AccountId` from an ed25519 public key.
    pub fn derive(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"agora-account-v1:");
        hasher.update(public_key);
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) account id for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&bytes)
    }

    /// The raw 32-byte identity hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters), for logs.
    pub fn short_id(&self) -> String {
        format!("ac:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `ac:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("ac:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.short_id())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
