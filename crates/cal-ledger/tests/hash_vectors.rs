//! Block hashes for fixed candidates. These values are what an external
//! verifier computes from the stored columns.

use cal_core::{BlockType, GENESIS_PREV_HASH};
use cal_ledger::BlockCandidate;

fn candidate(id: u64, block_type: BlockType, data_id: &str, data_val: &str) -> BlockCandidate {
    BlockCandidate {
        id,
        time: 1_500_000_000,
        version: 1,
        stack_id: "a.example.org".to_string(),
        block_type,
        data_id: data_id.to_string(),
        data_val: data_val.to_string(),
        prev_hash: GENESIS_PREV_HASH.to_string(),
    }
}

#[test]
fn genesis_block_hash() {
    let c = candidate(0, BlockType::Gen, "0", GENESIS_PREV_HASH);
    assert_eq!(
        c.compute_hash().unwrap().to_hex(),
        "69572024da2625127420d74b785a50f3557955b4e45f470f69113f4059338b25"
    );
}

#[test]
fn calendar_block_hash() {
    let c = candidate(3, BlockType::Cal, "", "ab:cd");
    assert_eq!(
        c.compute_hash().unwrap().to_hex(),
        "9bc1c191dde11cf72e59db0d45472abf39c3e1d9af13a01606fd95b26b802d18"
    );
}
