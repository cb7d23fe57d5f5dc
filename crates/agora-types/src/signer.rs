use crate::account::AccountId;

/// Caller-held signing credential for ledger writes.
///
/// Wraps an ed25519 signing key. The credential authenticates exactly one
/// [`AccountId`]; the ledger verifies signatures, this client only produces
/// them. Agora never creates or persists a `Signer` on the caller's
/// behalf; `generate` exists for tests and embedding applications.
pub struct Signer(ed25519_dalek::SigningKey);

impl Signer {
    /// Generate a new random signing credential.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// The account this credential authenticates.
    pub fn account(&self) -> AccountId {
        AccountId::derive(&self.0.verifying_key().to_bytes())
    }

    /// The raw ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.0.verifying_key().to_bytes()
    }

    /// Sign a transaction payload.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer as _;
        Signature(self.0.sign(message))
    }

    /// Raw secret key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer(<redacted>)")
    }
}

/// Ed25519 signature over a transaction payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl Signature {
    /// The raw 64-byte signature.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Hex-encoded signature, the form carried in wire envelopes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_is_stable() {
        let signer = Signer::generate();
        assert_eq!(signer.account(), signer.account());
    }

    #[test]
    fn from_bytes_preserves_account() {
        let signer = Signer::generate();
        let restored = Signer::from_bytes(*signer.as_bytes());
        assert_eq!(signer.account(), restored.account());
    }

    #[test]
    fn distinct_signers_have_distinct_accounts() {
        assert_ne!(Signer::generate().account(), Signer::generate().account());
    }

    #[test]
    fn signatures_are_deterministic_per_key() {
        let signer = Signer::generate();
        assert_eq!(signer.sign(b"payload"), signer.sign(b"payload"));
    }

    #[test]
    fn signature_hex_is_128_chars() {
        let signer = Signer::generate();
        assert_eq!(signer.sign(b"x").to_hex().len(), 128);
    }

    #[test]
    fn debug_redacts_secret() {
        let signer = Signer::generate();
        assert_eq!(format!("{signer:?}"), "Signer(<redacted>)");
    }
}
