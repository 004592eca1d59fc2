//! # Ledger Orchestrator
//!
//! [`Ledger`] owns a store handle and the node signing key, and is the only
//! path by which blocks enter the store. `append` runs the full pipeline:
//!
//! 1. `id` is the next height after the current head (0 on an empty store);
//! 2. `stackId`, `type`, `dataId`, `dataVal` and `prevHash` pass their
//!    field checks;
//! 3. `prevHash` equals the head's `hash`, or the genesis sentinel;
//! 4. `hash` is computed over the canonical field tuple;
//! 5. `sig` is produced by the node key and checked against its format;
//! 6. the store's conditional insert enforces uniqueness atomically.
//!
//! Steps 1 to 5 read a head that may already be stale by the time step 6
//! runs. Step 6 is the authority: a writer that lost the race gets a
//! retryable [`UniquenessConflictError`](cal_core::UniquenessConflictError)
//! and should rebuild its candidate from the new head.

use cal_core::{
    BlockType, CalendarConfig, ChainIntegrityError, SubmissionLimits, Timestamp,
    UniquenessConflictError, ValidationError, GENESIS_PREV_HASH,
};
use cal_crypto::{NodePublicKey, NodeSigningKey};

use crate::block::{BlockCandidate, BlockEntry, CalendarBlock, DEFAULT_VERSION};
use crate::chain::{verify_store, VerifiedRange};
use crate::error::LedgerError;
use crate::store::LedgerStore;
use crate::validation;

/// Attempts per entry in [`Ledger::append_entry`] before a conflict is
/// returned to the caller.
pub const MAX_APPEND_ATTEMPTS: usize = 3;

/// The calendar ledger for one node.
pub struct Ledger<S: LedgerStore> {
    store: S,
    key: NodeSigningKey,
    stack_id: String,
    limits: SubmissionLimits,
}

impl<S: LedgerStore> Ledger<S> {
    /// Build a ledger over `store`, signing with `key` and stamping
    /// `stack_id` on every block.
    pub fn new(
        store: S,
        key: NodeSigningKey,
        stack_id: impl Into<String>,
        limits: SubmissionLimits,
    ) -> Result<Self, LedgerError> {
        let stack_id = stack_id.into();
        validation::check_stack_id(&stack_id)?;
        Ok(Self {
            store,
            key,
            stack_id,
            limits,
        })
    }

    pub fn from_config(
        store: S,
        key: NodeSigningKey,
        config: &CalendarConfig,
    ) -> Result<Self, LedgerError> {
        Self::new(store, key, config.stack_id.clone(), config.limits)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    pub fn limits(&self) -> &SubmissionLimits {
        &self.limits
    }

    pub fn public_key(&self) -> NodePublicKey {
        self.key.public_key()
    }

    /// The current chain head.
    pub fn head(&self) -> Result<Option<CalendarBlock>, LedgerError> {
        self.store.head()
    }

    /// Write block 0. Fails with [`LedgerError::AlreadyInitialized`] if
    /// the store already holds any block.
    pub fn genesis(&self, time: Timestamp) -> Result<CalendarBlock, LedgerError> {
        if !self.store.is_empty()? {
            return Err(LedgerError::AlreadyInitialized);
        }
        let candidate = BlockCandidate {
            id: 0,
            time: time.unix_secs(),
            version: DEFAULT_VERSION,
            stack_id: self.stack_id.clone(),
            block_type: BlockType::Gen,
            data_id: "0".to_string(),
            data_val: GENESIS_PREV_HASH.to_string(),
            prev_hash: GENESIS_PREV_HASH.to_string(),
        };
        self.append(candidate)
    }

    /// Build a candidate that links onto the current head.
    pub fn next_candidate(
        &self,
        block_type: BlockType,
        data_id: impl Into<String>,
        data_val: impl Into<String>,
        time: Timestamp,
    ) -> Result<BlockCandidate, LedgerError> {
        let head = self.store.head()?.ok_or(LedgerError::Uninitialized)?;
        Ok(BlockCandidate {
            id: head.id + 1,
            time: time.unix_secs(),
            version: DEFAULT_VERSION,
            stack_id: self.stack_id.clone(),
            block_type,
            data_id: data_id.into(),
            data_val: data_val.into(),
            prev_hash: head.hash,
        })
    }

    /// Validate, hash, sign and store `candidate` as the new head.
    pub fn append(&self, candidate: BlockCandidate) -> Result<CalendarBlock, LedgerError> {
        let head = self.store.head()?;

        let next = head.as_ref().map_or(0, |h| h.id + 1);
        if head.is_none() && candidate.id != 0 {
            return Err(LedgerError::Uninitialized);
        }
        if candidate.id < next {
            return Err(UniquenessConflictError {
                field: "id",
                value: candidate.id.to_string(),
            }
            .into());
        }
        if candidate.id > next {
            return Err(ValidationError::new(
                "id",
                format!("expected height {next}, got {}", candidate.id),
            )
            .into());
        }

        validation::validate_candidate(&candidate)?;

        let expected_prev = head.as_ref().map_or(GENESIS_PREV_HASH, |h| h.hash.as_str());
        if candidate.prev_hash != expected_prev {
            return Err(ChainIntegrityError::PrevHashMismatch {
                height: candidate.id,
                expected: expected_prev.to_string(),
                actual: candidate.prev_hash.clone(),
            }
            .into());
        }

        let hash = candidate.compute_hash()?;
        let sig = self.key.sign_block_hash(&hash);
        validation::check_sig(&sig.to_sig_string())?;

        let block = candidate.seal(&hash, &sig);
        if let Err(e) = self.store.append(block.clone()) {
            if e.is_retryable() {
                tracing::warn!(id = block.id, error = %e, "append lost race for chain head");
            } else {
                tracing::error!(id = block.id, error = %e, "append rejected by store");
            }
            return Err(e);
        }

        tracing::info!(
            id = block.id,
            block_type = %block.block_type,
            hash = %block.hash,
            "appended calendar block"
        );
        Ok(block)
    }

    /// Append one entry against whatever the head is, rebuilding the
    /// candidate after a lost race up to [`MAX_APPEND_ATTEMPTS`] times.
    pub fn append_entry(
        &self,
        entry: &BlockEntry,
        time: Timestamp,
    ) -> Result<CalendarBlock, LedgerError> {
        let mut attempt = 1;
        loop {
            let candidate = self.next_candidate(
                entry.block_type,
                entry.data_id.clone(),
                entry.data_val.clone(),
                time,
            )?;
            match self.append(candidate) {
                Err(e) if e.is_retryable() && attempt < MAX_APPEND_ATTEMPTS => {
                    tracing::debug!(attempt, "retrying append against refreshed head");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Append a batch of entries in order. Each entry is its own atomic
    /// append; a failure stops the batch and earlier entries stay written.
    pub fn append_entries(
        &self,
        entries: &[BlockEntry],
        time: Timestamp,
    ) -> Result<Vec<CalendarBlock>, LedgerError> {
        if entries.len() > self.limits.post_hashes_max {
            return Err(LedgerError::LimitExceeded {
                operation: "batch append",
                requested: entries.len(),
                limit: self.limits.post_hashes_max,
            });
        }
        entries
            .iter()
            .map(|entry| self.append_entry(entry, time))
            .collect()
    }

    /// Read up to `limit` blocks starting at height `from`.
    pub fn range(&self, from: u64, limit: usize) -> Result<Vec<CalendarBlock>, LedgerError> {
        if limit > self.limits.get_proofs_max {
            return Err(LedgerError::LimitExceeded {
                operation: "range read",
                requested: limit,
                limit: self.limits.get_proofs_max,
            });
        }
        self.store.range_scan(from, limit)
    }

    /// Verify the whole stored chain: linkage, hashes, and that every
    /// signature belongs to this node's key.
    pub fn verify(&self) -> Result<VerifiedRange, LedgerError> {
        self.verify_with_key(&self.key.public_key())
    }

    /// Verify the whole stored chain against an explicit public key.
    pub fn verify_with_key(&self, public_key: &NodePublicKey) -> Result<VerifiedRange, LedgerError> {
        verify_store(&self.store, self.limits.get_proofs_max, Some(public_key))
    }
}

impl<S: LedgerStore + std::fmt::Debug> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store)
            .field("key", &self.key)
            .field("stack_id", &self.stack_id)
            .field("limits", &self.limits)
            .finish()
    }
}
