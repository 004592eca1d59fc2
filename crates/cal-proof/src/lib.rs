//! # cal-proof: Proof Anchors
//!
//! Proof-side logic that sits on top of the ledger:
//!
//! - [`anchors::resolve`]: the ordered list of anchor types a proof has
//!   accumulated, always starting with `cal`.
//! - [`batch::resolve_batch`]: resolution of many proofs at once, bounded
//!   by `POST_VERIFY_PROOFS_MAX`.
//! - [`retention::ProofRetention`]: when an assembled proof expires.
//!
//! Resolution is a pure function of its input and may be called from any
//! number of threads.

pub mod anchors;
pub mod batch;
pub mod error;
pub mod retention;

pub use anchors::{resolve, resolve_strings};
pub use batch::{resolve_batch, resolve_text, ProofResolution};
pub use error::ProofError;
pub use retention::ProofRetention;
