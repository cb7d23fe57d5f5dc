use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Hash identifying a submitted ledger transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Create a transaction hash from a pre-computed digest.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.short_hex())
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let tx = TxHash::from_hash([0xab; 32]);
        assert_eq!(TxHash::from_hex(&tx.to_hex()).unwrap(), tx);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        assert!(matches!(
            TxHash::from_hex("abcd"),
            Err(TypeError::InvalidLength { .. })
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let tx = TxHash::from_hash([0x01; 32]);
        assert_eq!(format!("{tx}").len(), 64);
    }
}
