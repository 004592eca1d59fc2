//! # cal-ledger: Calendar Block Ledger
//!
//! An append-only, hash-linked sequence of calendar blocks. Each block
//! anchors one piece of external data (a Merkle root, a chain transaction
//! reference, a beacon value, a reward record) and commits to the hash of
//! the block before it.
//!
//! ## Components
//!
//! - [`block`]: `CalendarBlock`, `BlockCandidate`, the canonical hash.
//! - [`validation`]: per-field checks, each naming the field it rejects.
//! - [`store`]: the `LedgerStore` persistence boundary and an in-memory
//!   implementation.
//! - [`file_store`]: an append-only JSON-lines store.
//! - [`chain`]: pure verification over a range of blocks.
//! - [`ledger`]: `Ledger`, which validates, hashes, signs and appends.
//!
//! ## Concurrency
//!
//! Single logical writer, many readers. Stores serialize inserts behind a
//! write lock and re-check height and linkage under it, so of two writers
//! that read the same head exactly one succeeds. Readers take a read lock
//! and see either the old head or the new one.

pub mod block;
pub mod chain;
pub mod error;
pub mod file_store;
pub mod ledger;
pub mod store;
pub mod validation;

pub use block::{BlockCandidate, BlockEntry, CalendarBlock, DEFAULT_VERSION};
pub use chain::{verify_chain, verify_chain_from, verify_signatures, verify_store, VerifiedRange};
pub use error::LedgerError;
pub use file_store::FileLedgerStore;
pub use ledger::{Ledger, MAX_APPEND_ATTEMPTS};
pub use store::{LedgerStore, MemoryLedgerStore};
