//! # Ledger Errors
//!
//! The four taxonomy classes from `cal-core` plus the operational failures
//! a store or the append orchestrator can hit.

use std::path::PathBuf;

use cal_core::{
    CanonicalizationError, ChainIntegrityError, CryptoError, UniquenessConflictError,
    ValidationError,
};
use thiserror::Error;

/// Errors from ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A candidate field is malformed or out of policy.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Hash linkage or recomputation failed.
    #[error(transparent)]
    ChainIntegrity(#[from] ChainIntegrityError),

    /// `id`, `prevHash` or `hash` already taken.
    #[error(transparent)]
    UniquenessConflict(#[from] UniquenessConflictError),

    /// A stored signature does not verify.
    #[error("signature invalid at height {height}: {source}")]
    Signature {
        /// Height of the block whose `sig` failed.
        height: u64,
        /// Underlying verification failure.
        source: CryptoError,
    },

    /// Hash preimage could not be canonicalized.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// `genesis` was called on a ledger that already has blocks.
    #[error("ledger already holds a genesis block")]
    AlreadyInitialized,

    /// A non-genesis append was attempted on an empty ledger.
    #[error("ledger has no genesis block")]
    Uninitialized,

    /// A batch or range request is larger than the configured limit.
    #[error("{operation} of {requested} exceeds the limit of {limit}")]
    LimitExceeded {
        /// The operation that was limited.
        operation: &'static str,
        /// Requested size.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A persisted record could not be decoded.
    #[error("corrupt ledger record on line {line}: {source}")]
    CorruptRecord {
        /// 1-based line number in the ledger file.
        line: usize,
        /// Decoder failure.
        source: serde_json::Error,
    },

    /// A persisted record decoded but breaks the block schema.
    #[error("invalid ledger record on line {line}: {source}")]
    InvalidRecord {
        /// 1-based line number in the ledger file.
        line: usize,
        /// The failed field check.
        source: ValidationError,
    },

    /// Another handle already holds the ledger file.
    #[error("ledger file {} is locked by another handle: {source}", path.display())]
    Locked {
        /// The ledger file.
        path: PathBuf,
        /// Lock acquisition failure.
        source: std::io::Error,
    },

    /// A failed write could not be rolled back; the handle accepts no
    /// further appends.
    #[error("ledger file {} may hold a partial record; reopen to repair", path.display())]
    Poisoned {
        /// The ledger file.
        path: PathBuf,
    },

    /// Record encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage IO failed.
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// True for failures the caller should answer by re-reading the head
    /// and resubmitting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UniquenessConflict(_))
    }
}
