//! # cal-crypto: Cryptographic Primitives
//!
//! Signing for the calendar ledger:
//!
//! - **`NodeSigningKey`**: the Ed25519 key a calendar node signs block
//!   hashes with. Never serialized, never logged.
//! - **`NodePublicKey`**: hex-serialized verifying key plus its
//!   fingerprint (first 12 hex chars of SHA-256 over the key bytes).
//! - **`BlockSignature`**: the `sig` column: `<fingerprint>:<base64>`.
//!
//! ## Crate Policy
//!
//! - Depends only on `cal-core` internally.
//! - Tests use real SHA-256 and real Ed25519, no mocks.

pub mod ed25519;

pub use ed25519::{verify_block_hash, BlockSignature, NodePublicKey, NodeSigningKey, FINGERPRINT_LEN};
