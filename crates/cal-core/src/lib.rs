//! # cal-core: Foundational Types for the Calendar Ledger
//!
//! This crate is the leaf of the calendar workspace. It defines the
//! primitives every other crate builds on:
//!
//! - **Type tags.** `BlockType` (the eight block kinds) and `AnchorType`
//!   (the subset that can appear as a proof anchor). One definition each,
//!   exhaustive `match` everywhere.
//!
//! - **`CanonicalBytes`.** The only input accepted by [`sha256_digest()`].
//!   Block hashes are computed over a JCS-serialized field tuple, so no two
//!   distinct tuples can share a preimage.
//!
//! - **`BlockHash`.** 32-byte SHA-256 digest rendered as 64 lowercase hex
//!   characters, plus the genesis sentinel.
//!
//! - **`Timestamp`.** UTC, seconds precision, the unit of block `time`.
//!
//! - **`CalendarConfig`.** Environment-derived node configuration, validated
//!   once at startup and passed by reference.
//!
//! - **Error taxonomy.** `ValidationError`, `ChainIntegrityError`,
//!   `UniquenessConflictError`, `MalformedProofError`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod block_type;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod temporal;

pub use block_type::{AnchorType, BlockType};
pub use canonical::CanonicalBytes;
pub use config::{CalendarConfig, ConfigError, SubmissionLimits};
pub use digest::{is_hex, lower_case_hashes, sha256_digest, BlockHash, GENESIS_PREV_HASH};
pub use error::{
    CanonicalizationError, ChainIntegrityError, CryptoError, MalformedProofError,
    UniquenessConflictError, ValidationError,
};
pub use temporal::Timestamp;
