//! # Chain Verification
//!
//! Pure checks over an ordered slice of blocks. For each block, in order:
//!
//! 1. its `id` follows the previous block's `id` by exactly one;
//! 2. its `hash` equals the hash recomputed from its own fields;
//! 3. its `prevHash` equals the previous block's `hash` (or the genesis
//!    sentinel at height 0).
//!
//! The first failure is returned, so the reported height is the lowest
//! height at which the range stops being trustworthy. Changing any hashed
//! field of an interior block is reported at that block, not at its
//! successor, because step 2 runs before the successor's step 3.
//!
//! Signatures are not part of the hash and are checked separately by
//! [`verify_signatures`].

use cal_core::{BlockHash, ChainIntegrityError, GENESIS_PREV_HASH};
use cal_crypto::{verify_block_hash, NodePublicKey};

use crate::block::CalendarBlock;
use crate::error::LedgerError;
use crate::store::LedgerStore;

/// Summary of a range that passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedRange {
    /// Height of the first block, `None` for an empty range.
    pub first: Option<u64>,
    /// Height of the last block, `None` for an empty range.
    pub last: Option<u64>,
    /// Number of blocks checked.
    pub count: usize,
}

/// Verify a range of blocks with no known predecessor.
///
/// A range starting at height 0 is checked against the genesis sentinel.
/// A range starting mid-chain trusts its first block's `prevHash`.
pub fn verify_chain(blocks: &[CalendarBlock]) -> Result<VerifiedRange, LedgerError> {
    verify_chain_from(None, blocks)
}

/// Verify a range of blocks that continues from `prev`.
pub fn verify_chain_from(
    prev: Option<&CalendarBlock>,
    blocks: &[CalendarBlock],
) -> Result<VerifiedRange, LedgerError> {
    let mut prior = prev;
    for block in blocks {
        if let Some(p) = prior {
            let expected = p.id + 1;
            if block.id != expected {
                return Err(ChainIntegrityError::HeightGap {
                    expected,
                    actual: block.id,
                }
                .into());
            }
        }

        let recomputed = block.recompute_hash()?.to_hex();
        if recomputed != block.hash {
            return Err(ChainIntegrityError::HashMismatch {
                height: block.id,
                stored: block.hash.clone(),
                recomputed,
            }
            .into());
        }

        let expected_prev = match prior {
            Some(p) => Some(p.hash.as_str()),
            None if block.id == 0 => Some(GENESIS_PREV_HASH),
            None => None,
        };
        if let Some(expected) = expected_prev {
            if block.prev_hash != expected {
                return Err(ChainIntegrityError::PrevHashMismatch {
                    height: block.id,
                    expected: expected.to_string(),
                    actual: block.prev_hash.clone(),
                }
                .into());
            }
        }

        prior = Some(block);
    }

    Ok(VerifiedRange {
        first: blocks.first().map(|b| b.id),
        last: blocks.last().map(|b| b.id),
        count: blocks.len(),
    })
}

/// Check every block's `sig` against `public_key`.
///
/// Blocks produced by a different node fail with a fingerprint mismatch.
pub fn verify_signatures(
    blocks: &[CalendarBlock],
    public_key: &NodePublicKey,
) -> Result<(), LedgerError> {
    for block in blocks {
        let hash = BlockHash::from_hex(&block.hash).map_err(|source| LedgerError::Signature {
            height: block.id,
            source,
        })?;
        verify_block_hash(&hash, &block.sig, public_key).map_err(|source| {
            LedgerError::Signature {
                height: block.id,
                source,
            }
        })?;
    }
    Ok(())
}

/// Verify everything in `store`, reading `page` blocks at a time.
///
/// Signatures are checked too when `public_key` is given.
pub fn verify_store<S: LedgerStore + ?Sized>(
    store: &S,
    page: usize,
    public_key: Option<&NodePublicKey>,
) -> Result<VerifiedRange, LedgerError> {
    let page = page.max(1);
    let mut from = 0u64;
    let mut prev: Option<CalendarBlock> = None;
    let mut total = VerifiedRange {
        first: None,
        last: None,
        count: 0,
    };
    loop {
        let blocks = store.range_scan(from, page)?;
        if blocks.is_empty() {
            break;
        }
        let range = verify_chain_from(prev.as_ref(), &blocks)?;
        if let Some(key) = public_key {
            verify_signatures(&blocks, key)?;
        }
        total.first = total.first.or(range.first);
        total.last = range.last;
        total.count += range.count;
        from += blocks.len() as u64;
        prev = blocks.into_iter().last();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockCandidate;
    use cal_core::BlockType;
    use cal_crypto::NodeSigningKey;

    fn build_chain(key: &NodeSigningKey, n: u64) -> Vec<CalendarBlock> {
        let mut blocks: Vec<CalendarBlock> = Vec::new();
        for id in 0..n {
            let candidate = BlockCandidate {
                id,
                time: 1_500_000_000 + id as i64,
                version: 1,
                stack_id: "a.example.org".to_string(),
                block_type: if id == 0 { BlockType::Gen } else { BlockType::Cal },
                data_id: id.to_string(),
                data_val: format!("{:064x}", id + 1),
                prev_hash: blocks
                    .last()
                    .map_or(GENESIS_PREV_HASH.to_string(), |b| b.hash.clone()),
            };
            let hash = candidate.compute_hash().unwrap();
            blocks.push(candidate.seal(&hash, &key.sign_block_hash(&hash)));
        }
        blocks
    }

    fn failure_height(err: LedgerError) -> u64 {
        match err {
            LedgerError::ChainIntegrity(e) => e.height(),
            other => panic!("expected chain integrity error, got {other:?}"),
        }
    }

    #[test]
    fn intact_chain_verifies() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let blocks = build_chain(&key, 6);
        let range = verify_chain(&blocks).unwrap();
        assert_eq!(range.first, Some(0));
        assert_eq!(range.last, Some(5));
        assert_eq!(range.count, 6);
        verify_signatures(&blocks, &key.public_key()).unwrap();
    }

    #[test]
    fn empty_range_is_intact() {
        let range = verify_chain(&[]).unwrap();
        assert_eq!(range.count, 0);
        assert_eq!(range.first, None);
    }

    #[test]
    fn tampered_data_reported_at_that_block() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let mut blocks = build_chain(&key, 6);
        blocks[3].data_val = "ff".to_string();
        assert_eq!(failure_height(verify_chain(&blocks).unwrap_err()), 3);
    }

    #[test]
    fn tampered_hash_reported_at_that_block() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let mut blocks = build_chain(&key, 6);
        blocks[2].hash = "0".repeat(64);
        assert_eq!(failure_height(verify_chain(&blocks).unwrap_err()), 2);
    }

    #[test]
    fn tampered_id_reported_at_that_height() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let mut blocks = build_chain(&key, 6);
        blocks[4].id = 9;
        assert_eq!(failure_height(verify_chain(&blocks).unwrap_err()), 4);
    }

    #[test]
    fn genesis_must_carry_sentinel() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let mut blocks = build_chain(&key, 1);
        let mut candidate = blocks[0].to_candidate();
        candidate.prev_hash = "1".repeat(64);
        let hash = candidate.compute_hash().unwrap();
        blocks[0] = candidate.seal(&hash, &key.sign_block_hash(&hash));
        let err = verify_chain(&blocks).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ChainIntegrity(ChainIntegrityError::PrevHashMismatch { height: 0, .. })
        ));
    }

    #[test]
    fn mid_chain_range_continues_from_prev() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let blocks = build_chain(&key, 6);
        verify_chain(&blocks[3..]).unwrap();
        verify_chain_from(Some(&blocks[2]), &blocks[3..]).unwrap();
        let err = verify_chain_from(Some(&blocks[1]), &blocks[3..]).unwrap_err();
        assert_eq!(failure_height(err), 2);
    }

    #[test]
    fn foreign_signature_rejected() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let other = NodeSigningKey::from_seed(&[2u8; 32]);
        let blocks = build_chain(&key, 3);
        let err = verify_signatures(&blocks, &other.public_key()).unwrap_err();
        assert!(matches!(err, LedgerError::Signature { height: 0, .. }));
    }

    #[test]
    fn swapped_signature_rejected() {
        let key = NodeSigningKey::from_seed(&[1u8; 32]);
        let mut blocks = build_chain(&key, 3);
        blocks[2].sig = blocks[1].sig.clone();
        let err = verify_signatures(&blocks, &key.public_key()).unwrap_err();
        assert!(matches!(err, LedgerError::Signature { height: 2, .. }));
    }
}
