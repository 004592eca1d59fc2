//! # Ledger Storage
//!
//! [`LedgerStore`] is the persistence boundary. A store must provide:
//!
//! 1. An atomic conditional insert: the block is accepted only if its `id`
//!    is the next height, its `prevHash` is unused and equals the head's
//!    hash, and its `hash` is unused. Two writers racing from the same head
//!    cannot both succeed; the loser gets a [`UniquenessConflictError`].
//! 2. A read of the current head (the block with the largest `id`).
//! 3. An ordered range scan by `id`.
//!
//! Readers never observe a partially written block: the in-memory index is
//! only updated after the insert has fully succeeded.
//!
//! [`MemoryLedgerStore`] keeps everything behind a `parking_lot::RwLock`.
//! [`FileLedgerStore`](crate::file_store::FileLedgerStore) adds an
//! append-only JSON-lines file under the same index.

use std::collections::HashSet;

use cal_core::{ChainIntegrityError, UniquenessConflictError, ValidationError, GENESIS_PREV_HASH};
use parking_lot::RwLock;

use crate::block::CalendarBlock;
use crate::error::LedgerError;

/// Durable storage for calendar blocks.
pub trait LedgerStore: Send + Sync {
    /// Insert `block` as the new head, atomically enforcing height and
    /// hash uniqueness against the current head.
    fn append(&self, block: CalendarBlock) -> Result<(), LedgerError>;

    /// The block with the largest `id`, if any.
    fn head(&self) -> Result<Option<CalendarBlock>, LedgerError>;

    /// Up to `limit` blocks with `id >= from`, in ascending `id` order.
    fn range_scan(&self, from: u64, limit: usize) -> Result<Vec<CalendarBlock>, LedgerError>;

    /// Number of blocks stored.
    fn len(&self) -> Result<u64, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }
}

/// Blocks in height order plus the unique-column indexes.
#[derive(Debug, Default)]
pub(crate) struct ChainIndex {
    blocks: Vec<CalendarBlock>,
    hashes: HashSet<String>,
    prev_hashes: HashSet<String>,
}

impl ChainIndex {
    pub(crate) fn head(&self) -> Option<&CalendarBlock> {
        self.blocks.last()
    }

    pub(crate) fn len(&self) -> u64 {
        self.blocks.len() as u64
    }

    pub(crate) fn range(&self, from: u64, limit: usize) -> Vec<CalendarBlock> {
        let Ok(start) = usize::try_from(from) else {
            return Vec::new();
        };
        self.blocks.iter().skip(start).take(limit).cloned().collect()
    }

    pub(crate) fn blocks(&self) -> &[CalendarBlock] {
        &self.blocks
    }

    /// Check that `block` may become the new head without mutating anything.
    pub(crate) fn check_insert(&self, block: &CalendarBlock) -> Result<(), LedgerError> {
        let next = self.len();
        if block.id < next {
            return Err(UniquenessConflictError {
                field: "id",
                value: block.id.to_string(),
            }
            .into());
        }
        if block.id > next {
            return Err(ValidationError::new(
                "id",
                format!("expected height {next}, got {}", block.id),
            )
            .into());
        }
        if self.prev_hashes.contains(&block.prev_hash) {
            return Err(UniquenessConflictError {
                field: "prevHash",
                value: block.prev_hash.clone(),
            }
            .into());
        }
        let expected = self
            .head()
            .map_or(GENESIS_PREV_HASH, |head| head.hash.as_str());
        if block.prev_hash != expected {
            return Err(ChainIntegrityError::PrevHashMismatch {
                height: block.id,
                expected: expected.to_string(),
                actual: block.prev_hash.clone(),
            }
            .into());
        }
        if self.hashes.contains(&block.hash) {
            return Err(UniquenessConflictError {
                field: "hash",
                value: block.hash.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Record a block that already passed [`check_insert`](Self::check_insert).
    pub(crate) fn insert(&mut self, block: CalendarBlock) {
        self.hashes.insert(block.hash.clone());
        self.prev_hashes.insert(block.prev_hash.clone());
        self.blocks.push(block);
    }
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    index: RwLock<ChainIndex>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn append(&self, block: CalendarBlock) -> Result<(), LedgerError> {
        let mut index = self.index.write();
        index.check_insert(&block)?;
        index.insert(block);
        Ok(())
    }

    fn head(&self) -> Result<Option<CalendarBlock>, LedgerError> {
        Ok(self.index.read().head().cloned())
    }

    fn range_scan(&self, from: u64, limit: usize) -> Result<Vec<CalendarBlock>, LedgerError> {
        Ok(self.index.read().range(from, limit))
    }

    fn len(&self) -> Result<u64, LedgerError> {
        Ok(self.index.read().len())
    }
}
