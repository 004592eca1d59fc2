//! # Concurrent Append
//!
//! Two writers building from the same head: exactly one wins, the other
//! gets a retryable conflict and succeeds after rebuilding from the new
//! head.

use std::sync::{Arc, Barrier};
use std::thread;

use cal_core::{BlockType, SubmissionLimits, Timestamp};
use cal_crypto::NodeSigningKey;
use cal_ledger::{BlockEntry, Ledger, LedgerError, LedgerStore, MemoryLedgerStore};

fn ledger() -> Ledger<MemoryLedgerStore> {
    Ledger::new(
        MemoryLedgerStore::new(),
        NodeSigningKey::from_seed(&[3u8; 32]),
        "a.example.org",
        SubmissionLimits::default(),
    )
    .expect("valid ledger")
}

fn ts(secs: i64) -> Timestamp {
    Timestamp::from_unix(secs).expect("in range")
}

#[test]
fn loser_of_same_head_race_conflicts_then_retries() {
    let l = ledger();
    l.genesis(ts(1)).unwrap();

    let first = l.next_candidate(BlockType::BtcA, "", "aa", ts(2)).unwrap();
    let second = l.next_candidate(BlockType::EthA, "", "bb", ts(2)).unwrap();
    assert_eq!(first.prev_hash, second.prev_hash);

    let winner = l.append(first).unwrap();
    let err = l.append(second).unwrap_err();
    assert!(matches!(err, LedgerError::UniquenessConflict(_)));
    assert!(err.is_retryable());

    let retry = l.next_candidate(BlockType::EthA, "", "bb", ts(3)).unwrap();
    let b = l.append(retry).unwrap();
    assert_eq!(b.id, 2);
    assert_eq!(b.prev_hash, winner.hash);
    l.verify().unwrap();
}

#[test]
fn threaded_writers_produce_a_total_order() {
    const WRITERS: usize = 8;
    let l = Arc::new(ledger());
    l.genesis(ts(1)).unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let l = Arc::clone(&l);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let entry = BlockEntry::new(BlockType::Cal, "", format!("{i:02x}"));
                loop {
                    match l.append_entry(&entry, ts(2)) {
                        Ok(block) => return block,
                        Err(e) if e.is_retryable() => continue,
                        Err(e) => panic!("writer {i} failed: {e}"),
                    }
                }
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap().id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=WRITERS as u64).collect::<Vec<_>>());
    assert_eq!(l.store().len().unwrap(), WRITERS as u64 + 1);
    l.verify().unwrap();
}

#[test]
fn readers_see_whole_blocks_only() {
    let l = Arc::new(ledger());
    l.genesis(ts(1)).unwrap();

    let writer = {
        let l = Arc::clone(&l);
        thread::spawn(move || {
            for i in 0..50 {
                let entry = BlockEntry::new(BlockType::Cal, "", format!("{i:02x}"));
                l.append_entry(&entry, ts(2)).unwrap();
            }
        })
    };

    for _ in 0..200 {
        if let Some(head) = l.head().unwrap() {
            assert_eq!(head.recompute_hash().unwrap().to_hex(), head.hash);
        }
    }
    writer.join().unwrap();
    assert_eq!(l.head().unwrap().unwrap().id, 50);
}
