//! Content fingerprints.
//!
//! Wraps SHA-256 digests with a strong type. Every fingerprint is computed
//! over a domain-prefixed canonical preimage, so a creation digest and a
//! signature digest can never collide even over identical payload bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Domain prefix for document creation digests.
pub const DOCUMENT_DOMAIN: &[u8] = b"vellum-document-v0:";

/// Domain prefix for signature digests.
pub const SIGNATURE_DOMAIN: &[u8] = b"vellum-signature-v0:";

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Compute a domain-separated digest over a preimage.
    pub fn digest(domain: &[u8], preimage: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(preimage);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero digest (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Fingerprint {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST test vectors for SHA-256.
    #[test]
    fn test_sha256_known_answers() {
        assert_eq!(
            Fingerprint::hash(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            Fingerprint::hash(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_domains_separate() {
        let a = Fingerprint::digest(DOCUMENT_DOMAIN, b"payload");
        let b = Fingerprint::digest(SIGNATURE_DOMAIN, b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_deterministic() {
        let a = Fingerprint::digest(DOCUMENT_DOMAIN, b"payload");
        let b = Fingerprint::digest(DOCUMENT_DOMAIN, b"payload");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hex_roundtrip() {
        let fp = Fingerprint::hash(b"roundtrip");
        let recovered = Fingerprint::from_hex(&fp.to_hex()).unwrap();
        assert_eq!(fp, recovered);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Fingerprint::from_hex("abcd").is_err());
    }
}
