//! # Block Digest
//!
//! `BlockHash` is the 32-byte SHA-256 digest that identifies a calendar
//! block. On the wire it is always 64 lowercase hex characters.
//!
//! ## Security Invariant
//!
//! [`sha256_digest()`] accepts only `&CanonicalBytes`, so every block hash
//! is computed over a canonical preimage.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CryptoError;

/// `prevHash` of the genesis block: it has no real predecessor.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A SHA-256 block digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes. These are what the node signs.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from exactly 64 hex characters.
    ///
    /// Uppercase input is accepted and normalized; use the ledger's field
    /// validation when the lowercase wire form must be enforced.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        if s.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "block hash must be 64 hex chars, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CryptoError::KeyError(format!("invalid block hash hex: {e}")))?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockHash({})", self.to_hex())
    }
}

impl std::fmt::Display for BlockHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the SHA-256 digest of canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> BlockHash {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    BlockHash(bytes)
}

/// True if `value` is an even-length hex string of at least two characters.
pub fn is_hex(value: &str) -> bool {
    value.len() >= 2 && value.len() % 2 == 0 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Lowercase every hash in `hashes`.
pub fn lower_case_hashes<S: AsRef<str>>(hashes: &[S]) -> Vec<String> {
    hashes.iter().map(|h| h.as_ref().to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sha256_vector() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(
            sha256_digest(&cb).to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn genesis_sentinel_matches_const() {
        let sentinel = BlockHash::from_bytes([0u8; 32]);
        assert_eq!(sentinel.to_hex(), GENESIS_PREV_HASH);
        assert_eq!(BlockHash::from_hex(GENESIS_PREV_HASH).unwrap(), sentinel);
    }

    #[test]
    fn hex_roundtrip_is_lowercase() {
        let upper = "AB".repeat(32);
        let h = BlockHash::from_hex(&upper).unwrap();
        assert_eq!(h.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(BlockHash::from_hex("abcd").is_err());
        assert!(BlockHash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn serde_as_hex_string() {
        let h = BlockHash::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(32)));
        let back: BlockHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn is_hex_rules() {
        assert!(is_hex("ab"));
        assert!(is_hex("DEADbeef"));
        assert!(!is_hex("a"));
        assert!(!is_hex("abc"));
        assert!(!is_hex(""));
        assert!(!is_hex("zz"));
    }

    #[test]
    fn lower_case_all() {
        let out = lower_case_hashes(&["AB", "cD"]);
        assert_eq!(out, vec!["ab".to_string(), "cd".to_string()]);
    }
}
