//! # Ed25519 Block Signing
//!
//! A calendar node signs the 32 raw bytes of every block hash it appends.
//! The result is stored in the block's `sig` column as
//!
//! ```text
//! <first 12 hex chars of SHA-256(public key)>:<base64 Ed25519 signature>
//! ```
//!
//! The fingerprint prefix lets a verifier pick the right public key when a
//! node rotates keys; the base64 alphabet keeps the whole string inside
//! `^[a-zA-Z0-9:=+/]{1,255}$`.
//!
//! ## Security Invariant
//!
//! - Signing input is a `&BlockHash`, never arbitrary bytes.
//! - `NodeSigningKey` does not implement `Serialize`; its `Debug` output
//!   is redacted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cal_core::{BlockHash, CryptoError};
use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Number of hex characters of the key hash kept in a signature prefix.
pub const FINGERPRINT_LEN: usize = 12;

/// An Ed25519 public key (32 bytes). Serializes as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodePublicKey([u8; 32]);

/// The signing key of a calendar node.
pub struct NodeSigningKey {
    signing_key: ed25519_dalek::SigningKey,
}

/// A parsed `sig` column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSignature {
    fingerprint: String,
    signature: [u8; 64],
}

// ---------------------------------------------------------------------------
// NodePublicKey
// ---------------------------------------------------------------------------

impl NodePublicKey {
    /// Create a public key from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "public key hex must be 64 chars, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key hex: {e}")))?;
        Ok(Self(bytes))
    }

    /// First [`FINGERPRINT_LEN`] hex chars of SHA-256 over the key bytes.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0);
        let mut fp = hex::encode(digest);
        fp.truncate(FINGERPRINT_LEN);
        fp
    }

    fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Serialize for NodePublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NodePublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for NodePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodePublicKey({})", self.fingerprint())
    }
}

impl std::fmt::Display for NodePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// NodeSigningKey
// ---------------------------------------------------------------------------

impl NodeSigningKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Build a key from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Parse a key from a 64-character hex seed (the key file format).
    pub fn from_seed_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        if s.len() != 64 {
            return Err(CryptoError::KeyError(format!(
                "signing key seed must be 64 hex chars, got {}",
                s.len()
            )));
        }
        let mut seed = [0u8; 32];
        hex::decode_to_slice(s, &mut seed)
            .map_err(|e| CryptoError::KeyError(format!("invalid signing key hex: {e}")))?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex-encode the seed for writing to a key file.
    pub fn to_seed_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The matching public key.
    pub fn public_key(&self) -> NodePublicKey {
        NodePublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign the raw bytes of a block hash.
    pub fn sign_block_hash(&self, hash: &BlockHash) -> BlockSignature {
        let sig = self.signing_key.sign(hash.as_bytes());
        BlockSignature {
            fingerprint: self.public_key().fingerprint(),
            signature: sig.to_bytes(),
        }
    }
}

impl std::fmt::Debug for NodeSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeSigningKey(<private>)")
    }
}

// ---------------------------------------------------------------------------
// BlockSignature
// ---------------------------------------------------------------------------

impl BlockSignature {
    /// Key fingerprint prefix.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Raw signature bytes.
    pub fn signature_bytes(&self) -> &[u8; 64] {
        &self.signature
    }

    /// Render as the `sig` column value.
    pub fn to_sig_string(&self) -> String {
        format!("{}:{}", self.fingerprint, BASE64.encode(self.signature))
    }

    /// Parse a `sig` column value.
    pub fn parse(sig: &str) -> Result<Self, CryptoError> {
        let (fingerprint, encoded) = sig
            .split_once(':')
            .ok_or_else(|| CryptoError::MalformedSignature("missing ':' separator".to_string()))?;
        if fingerprint.len() != FINGERPRINT_LEN
            || !fingerprint.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(CryptoError::MalformedSignature(format!(
                "fingerprint must be {FINGERPRINT_LEN} hex chars, got {fingerprint:?}"
            )));
        }
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| CryptoError::MalformedSignature(format!("invalid base64: {e}")))?;
        let signature: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            CryptoError::MalformedSignature(format!(
                "signature must be 64 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            fingerprint: fingerprint.to_lowercase(),
            signature,
        })
    }
}

impl std::fmt::Display for BlockSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sig_string())
    }
}

/// Verify a `sig` column value against a block hash and public key.
///
/// Fails if the fingerprint does not belong to `public_key` or the Ed25519
/// signature does not verify over the raw hash bytes.
pub fn verify_block_hash(
    hash: &BlockHash,
    sig: &str,
    public_key: &NodePublicKey,
) -> Result<(), CryptoError> {
    let parsed = BlockSignature::parse(sig)?;
    let expected_fp = public_key.fingerprint();
    if parsed.fingerprint != expected_fp {
        return Err(CryptoError::VerificationFailed(format!(
            "signature fingerprint {} does not match key fingerprint {expected_fp}",
            parsed.fingerprint
        )));
    }
    let vk = public_key.to_verifying_key()?;
    let signature = ed25519_dalek::Signature::from_bytes(&parsed.signature);
    vk.verify(hash.as_bytes(), &signature)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}
