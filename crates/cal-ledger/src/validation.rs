//! # Field Validation
//!
//! Per-field checks for calendar block records. Every check returns a
//! [`ValidationError`] naming the wire field it rejects.
//!
//! | field      | constraint                        |
//! |------------|-----------------------------------|
//! | `stackId`  | non-empty, at most 255 chars      |
//! | `type`     | `gen` exactly when `id == 0`      |
//! | `dataId`   | `^[a-fA-F0-9:x]{0,255}$`          |
//! | `dataVal`  | `^[a-fA-F0-9:x]{1,255}$`          |
//! | `prevHash` | `^[a-f0-9]{64}$`                  |
//! | `hash`     | `^[a-f0-9]{64}$`                  |
//! | `sig`      | `^[a-zA-Z0-9:=+/]{1,255}$`        |

use cal_core::{BlockType, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{BlockCandidate, CalendarBlock};

static DATA_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9:x]{0,255}$").expect("invalid dataId regex"));
static DATA_VAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-fA-F0-9:x]{1,255}$").expect("invalid dataVal regex"));
static HASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-f0-9]{64}$").expect("invalid hash regex"));
static SIG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9:=+/]{1,255}$").expect("invalid sig regex"));

const MAX_STACK_ID_LEN: usize = 255;

pub fn check_stack_id(stack_id: &str) -> Result<(), ValidationError> {
    if stack_id.trim().is_empty() {
        return Err(ValidationError::new("stackId", "must not be empty"));
    }
    if stack_id.len() > MAX_STACK_ID_LEN {
        return Err(ValidationError::new(
            "stackId",
            format!("must be at most {MAX_STACK_ID_LEN} chars, got {}", stack_id.len()),
        ));
    }
    Ok(())
}

/// Height 0 is reserved for `gen`, and `gen` is reserved for height 0.
pub fn check_type_for_height(id: u64, block_type: BlockType) -> Result<(), ValidationError> {
    match (id, block_type) {
        (0, BlockType::Gen) => Ok(()),
        (0, other) => Err(ValidationError::new(
            "type",
            format!("block 0 must be of type gen, got {other}"),
        )),
        (_, BlockType::Gen) => Err(ValidationError::new(
            "type",
            format!("type gen is reserved for block 0, got it at block {id}"),
        )),
        _ => Ok(()),
    }
}

pub fn check_data_id(data_id: &str) -> Result<(), ValidationError> {
    if DATA_ID_RE.is_match(data_id) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "dataId",
            format!("{data_id:?} must match ^[a-fA-F0-9:x]{{0,255}}$"),
        ))
    }
}

pub fn check_data_val(data_val: &str) -> Result<(), ValidationError> {
    if DATA_VAL_RE.is_match(data_val) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "dataVal",
            format!("{data_val:?} must match ^[a-fA-F0-9:x]{{1,255}}$"),
        ))
    }
}

pub fn check_prev_hash(prev_hash: &str) -> Result<(), ValidationError> {
    check_hash_format("prevHash", prev_hash)
}

pub fn check_hash(hash: &str) -> Result<(), ValidationError> {
    check_hash_format("hash", hash)
}

pub fn check_sig(sig: &str) -> Result<(), ValidationError> {
    if SIG_RE.is_match(sig) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "sig",
            "must match ^[a-zA-Z0-9:=+/]{1,255}$",
        ))
    }
}

fn check_hash_format(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if HASH_RE.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("{value:?} must be 64 lowercase hex chars"),
        ))
    }
}

/// Validate every candidate field that does not depend on the chain head,
/// in the documented order: stackId, type, dataId, dataVal, prevHash format.
pub fn validate_candidate(candidate: &BlockCandidate) -> Result<(), ValidationError> {
    check_stack_id(&candidate.stack_id)?;
    check_type_for_height(candidate.id, candidate.block_type)?;
    check_data_id(&candidate.data_id)?;
    check_data_val(&candidate.data_val)?;
    check_prev_hash(&candidate.prev_hash)?;
    Ok(())
}

/// Validate a sealed block's schema, including `hash` and `sig` formats.
pub fn validate_block(block: &CalendarBlock) -> Result<(), ValidationError> {
    check_stack_id(&block.stack_id)?;
    check_type_for_height(block.id, block.block_type)?;
    check_data_id(&block.data_id)?;
    check_data_val(&block.data_val)?;
    check_prev_hash(&block.prev_hash)?;
    check_hash(&block.hash)?;
    check_sig(&block.sig)?;
    Ok(())
}
