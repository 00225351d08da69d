//! Settings fingerprints
//!
//! A fingerprint is the SHA-256 digest of a unit's canonical settings string,
//! rendered as 64 lowercase hex characters in directory names. The digest is
//! never truncated.

use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-width identity of a canonical settings string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest a canonical settings string
    pub fn of(canonical: &str) -> Self {
        let digest = Sha256::digest(canonical.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Full hex rendering used in directory names
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Leading hex characters for display only
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        let a = Fingerprint::of("(\"k\", 3)");
        let b = Fingerprint::of("(\"k\", 3)");
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn fingerprint_different_content() {
        assert_ne!(Fingerprint::of("(\"k\", 3)"), Fingerprint::of("(\"k\", 4)"));
    }

    #[test]
    fn fingerprint_known_digest() {
        assert_eq!(
            Fingerprint::of("").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn short_is_prefix() {
        let fp = Fingerprint::of("abc");
        assert_eq!(fp.short().len(), 12);
        assert!(fp.to_hex().starts_with(&fp.short()));
    }
}
