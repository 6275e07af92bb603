//! Fingerprint utilities for structural schema identity

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 fingerprint of a schema's canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute fingerprint from canonical text
    pub fn of(canonical: &str) -> Self {
        Self::from_bytes(canonical.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that canonical text matches this fingerprint
    pub fn verify(&self, canonical: &str) -> bool {
        *self == Self::of(canonical)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_consistency() {
        let canonical = r#"{"type":"string"}"#;
        assert_eq!(Fingerprint::of(canonical), Fingerprint::of(canonical));
        assert_eq!(Fingerprint::of(canonical).as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_different_content() {
        assert_ne!(
            Fingerprint::of(r#"{"type":"string"}"#),
            Fingerprint::of(r#"{"type":"long"}"#)
        );
    }

    #[test]
    fn test_fingerprint_verification() {
        let fp = Fingerprint::of("\"int\"");
        assert!(fp.verify("\"int\""));
        assert!(!fp.verify("\"long\""));
    }
}
