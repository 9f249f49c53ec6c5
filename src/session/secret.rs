/// Refresh-token secrets and their at-rest digests
///
/// Two newtypes keep the raw client-facing secret and the stored SHA-256
/// digest from being compared or logged interchangeably. The raw value is
/// generated at mint time, handed to the client once, and from then on
/// only its digest is ever used in a query predicate.
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A raw refresh-token secret. Never persisted.
#[derive(Clone)]
pub struct RawRefreshToken(String);

impl RawRefreshToken {
    /// Generate a fresh 256-bit secret, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a client-presented secret for validation.
    pub fn from_presented(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The deterministic one-way digest used for storage and lookup.
    /// Equality of digests substitutes for equality of secrets.
    pub fn digest(&self) -> TokenHash {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        TokenHash(hex::encode(hasher.finalize()))
    }

    /// Expose the raw value for the one-time handoff to the client.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

// Redacted so the secret cannot leak through debug logging
impl std::fmt::Debug for RawRefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawRefreshToken(<redacted>)")
    }
}

/// The stored SHA-256 digest of a refresh-token secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHash(String);

impl TokenHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let t = RawRefreshToken::from_presented("abc123");
        assert_eq!(t.digest(), t.digest());
    }

    #[test]
    fn digest_differs_for_different_secrets() {
        let a = RawRefreshToken::from_presented("abc123");
        let b = RawRefreshToken::from_presented("abc123x");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn generated_secrets_are_unique() {
        let a = RawRefreshToken::generate();
        let b = RawRefreshToken::generate();
        assert_ne!(a.reveal(), b.reveal());
        assert_eq!(a.reveal().len(), 64); // 32 bytes, hex
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let t = RawRefreshToken::from_presented("super-secret");
        let dbg = format!("{:?}", t);
        assert!(!dbg.contains("super-secret"));
    }
}
