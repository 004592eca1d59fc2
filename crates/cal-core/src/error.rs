//! # Error Types: Ledger Error Taxonomy
//!
//! Every failure the ledger can report falls into one of four classes:
//!
//! - [`ValidationError`]: a candidate block field is malformed or out of
//!   policy. Raised before any persistence attempt; the caller fixes the
//!   input and resubmits.
//! - [`ChainIntegrityError`]: a `prevHash`/`hash` mismatch, found on append
//!   or during verification. Never patched, always surfaced.
//! - [`UniquenessConflictError`]: `id`, `prevHash` or `hash` already taken.
//!   The caller re-reads the head and retries.
//! - [`MalformedProofError`]: a proof object does not have the expected
//!   branch/ops/anchors shape.
//!
//! No error is ever downgraded to a warning.

use thiserror::Error;

/// A candidate block field violated its schema constraint.
///
/// `field` is the wire name of the offending field (`dataId`, `sig`, ...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human-readable description of the violated constraint.
    pub reason: String,
}

impl ValidationError {
    /// Build a validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// The hash chain is broken at a specific height.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainIntegrityError {
    /// `prevHash` does not equal the hash of the preceding block.
    #[error("prevHash mismatch at height {height}: expected {expected}, got {actual}")]
    PrevHashMismatch {
        /// Height of the block carrying the wrong `prevHash`.
        height: u64,
        /// Hash of the preceding block (or the genesis sentinel).
        expected: String,
        /// The `prevHash` actually recorded.
        actual: String,
    },

    /// Recomputing the block hash from its fields gave a different value.
    #[error("hash mismatch at height {height}: stored {stored}, recomputed {recomputed}")]
    HashMismatch {
        /// Height of the tampered block.
        height: u64,
        /// The `hash` recorded on the block.
        stored: String,
        /// The hash recomputed from the block's own fields.
        recomputed: String,
    },

    /// Block ids are not consecutive.
    #[error("height gap: expected block {expected}, found block {actual}")]
    HeightGap {
        /// The id that should appear at this position.
        expected: u64,
        /// The id that was found instead.
        actual: u64,
    },
}

impl ChainIntegrityError {
    /// The first height at which the chain fails verification.
    pub fn height(&self) -> u64 {
        match self {
            Self::PrevHashMismatch { height, .. } | Self::HashMismatch { height, .. } => *height,
            Self::HeightGap { expected, .. } => *expected,
        }
    }
}

/// A unique ledger column already holds the submitted value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {value} already exists in the ledger")]
pub struct UniquenessConflictError {
    /// Wire name of the colliding column (`id`, `prevHash` or `hash`).
    pub field: &'static str,
    /// The colliding value.
    pub value: String,
}

/// A proof object does not match the branch/ops/anchors shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed proof at {path}: {reason}")]
pub struct MalformedProofError {
    /// JSON path of the offending node, e.g. `$.branches[0].ops`.
    pub path: String,
    /// What was expected at that path.
    pub reason: String,
}

impl MalformedProofError {
    /// Build a malformed-proof error at `path`.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signature string could not be decoded.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field() {
        let err = ValidationError::new("dataVal", "must match ^[a-fA-F0-9:x]{1,255}$");
        assert_eq!(err.field, "dataVal");
        assert!(err.to_string().starts_with("invalid dataVal:"));
    }

    #[test]
    fn chain_integrity_height() {
        let err = ChainIntegrityError::HashMismatch {
            height: 7,
            stored: "aa".into(),
            recomputed: "bb".into(),
        };
        assert_eq!(err.height(), 7);

        let gap = ChainIntegrityError::HeightGap {
            expected: 3,
            actual: 5,
        };
        assert_eq!(gap.height(), 3);
    }
}
