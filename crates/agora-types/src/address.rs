use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content-addressed identifier for a stored blob.
///
/// A `ContentAddress` is the BLAKE3 hash of a blob's bytes. Identical bytes
/// always produce the same address, so a retrieval by address returns
/// byte-identical content for as long as the blob exists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentAddress([u8; 32]);

impl ContentAddress {
    /// Compute the address of a blob.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create an address from a pre-computed hash.
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

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({})", self.short_hex())
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ContentAddress {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ContentAddress> for [u8; 32] {
    fn from(address: ContentAddress) -> Self {
        address.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_is_deterministic() {
        let data = b"hello world";
        let a1 = ContentAddress::from_bytes(data);
        let a2 = ContentAddress::from_bytes(data);
        assert_eq!(a1, a2);
    }

    #[test]
    fn different_data_produces_different_addresses() {
        let a1 = ContentAddress::from_bytes(b"hello");
        let a2 = ContentAddress::from_bytes(b"world");
        assert_ne!(a1, a2);
    }

    #[test]
    fn hex_roundtrip() {
        let address = ContentAddress::from_bytes(b"test");
        let hex = address.to_hex();
        let parsed = ContentAddress::from_hex(&hex).unwrap();
        assert_eq!(address, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = ContentAddress::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            ContentAddress::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let address = ContentAddress::from_bytes(b"test");
        let display = format!("{address}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, address.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        let address = ContentAddress::from_bytes(b"test");
        assert_eq!(address.short_hex().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let address = ContentAddress::from_bytes(b"serde test");
        let json = serde_json::to_string(&address).unwrap();
        let parsed: ContentAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(address, parsed);
    }
}
