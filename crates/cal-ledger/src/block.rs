//! # Calendar Block Records
//!
//! [`CalendarBlock`] is the persisted record, one per chain height.
//! [`BlockCandidate`] is the same record before `hash` and `sig` are
//! derived. Sealing a candidate is the only way to produce a block.
//!
//! ## Hash Preimage
//!
//! The block hash is SHA-256 over the JCS serialization of the tuple
//! `[id, time, version, stackId, type, dataId, dataVal, prevHash]`. JSON
//! string quoting makes the encoding unambiguous: `("ab", "c")` and
//! `("a", "bc")` render as different byte strings. `sig` is not part of
//! the preimage.

use cal_core::{
    sha256_digest, BlockHash, BlockType, CanonicalBytes, CanonicalizationError, ValidationError,
};
use cal_crypto::BlockSignature;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::validation;

/// Default `version` for blocks that do not state one.
pub const DEFAULT_VERSION: i64 = 1;

fn default_version() -> i64 {
    DEFAULT_VERSION
}

/// One immutable record in the calendar ledger.
///
/// Field names on the wire are the ledger's column names and must not
/// change: external verifiers read them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarBlock {
    /// Chain height, starting at 0.
    pub id: u64,
    /// Creation time in seconds since the Unix epoch.
    pub time: i64,
    /// Record format version.
    #[serde(default = "default_version")]
    pub version: i64,
    /// Identifier of the producing node.
    #[serde(rename = "stackId")]
    pub stack_id: String,
    /// Block kind; decides how `dataId` and `dataVal` are read.
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// Type-specific reference, possibly empty.
    #[serde(rename = "dataId")]
    pub data_id: String,
    /// Type-specific payload, never empty.
    #[serde(rename = "dataVal")]
    pub data_val: String,
    /// Hash of the block at `id - 1`, or the genesis sentinel.
    #[serde(rename = "prevHash")]
    pub prev_hash: String,
    /// Lowercase hex SHA-256 of this block's preimage.
    pub hash: String,
    /// `<key fingerprint>:<base64 Ed25519 signature over hash>`.
    pub sig: String,
}

impl CalendarBlock {
    /// Recompute the hash from the stored fields.
    pub fn recompute_hash(&self) -> Result<BlockHash, CanonicalizationError> {
        block_hash(
            self.id,
            self.time,
            self.version,
            &self.stack_id,
            self.block_type,
            &self.data_id,
            &self.data_val,
            &self.prev_hash,
        )
    }

    /// The unsigned fields of this block.
    pub fn to_candidate(&self) -> BlockCandidate {
        BlockCandidate {
            id: self.id,
            time: self.time,
            version: self.version,
            stack_id: self.stack_id.clone(),
            block_type: self.block_type,
            data_id: self.data_id.clone(),
            data_val: self.data_val.clone(),
            prev_hash: self.prev_hash.clone(),
        }
    }
}

/// A block with every field populated except `hash` and `sig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCandidate {
    pub id: u64,
    pub time: i64,
    #[serde(default = "default_version")]
    pub version: i64,
    #[serde(rename = "stackId")]
    pub stack_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(rename = "dataId")]
    pub data_id: String,
    #[serde(rename = "dataVal")]
    pub data_val: String,
    #[serde(rename = "prevHash")]
    pub prev_hash: String,
}

impl BlockCandidate {
    /// Compute the block hash over the canonical field tuple.
    pub fn compute_hash(&self) -> Result<BlockHash, CanonicalizationError> {
        block_hash(
            self.id,
            self.time,
            self.version,
            &self.stack_id,
            self.block_type,
            &self.data_id,
            &self.data_val,
            &self.prev_hash,
        )
    }

    /// Attach the derived `hash` and `sig`, producing the immutable record.
    pub fn seal(self, hash: &BlockHash, sig: &BlockSignature) -> CalendarBlock {
        CalendarBlock {
            id: self.id,
            time: self.time,
            version: self.version,
            stack_id: self.stack_id,
            block_type: self.block_type,
            data_id: self.data_id,
            data_val: self.data_val,
            prev_hash: self.prev_hash,
            hash: hash.to_hex(),
            sig: sig.to_sig_string(),
        }
    }

    /// Build a candidate from untyped JSON, failing on the first bad field.
    ///
    /// Fields are checked in order: `id`, `time`, `version`, `stackId`,
    /// `type`, `dataId`, `dataVal`, `prevHash`. A missing `version` means
    /// [`DEFAULT_VERSION`]. Anything in the object that is not a candidate
    /// field (including a caller-supplied `hash` or `sig`) is ignored.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::new("candidate", "must be a JSON object"))?;

        let id = obj
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| ValidationError::new("id", "must be a non-negative integer"))?;
        let time = integer_field(obj, "time")?
            .ok_or_else(|| ValidationError::new("time", "is required"))?;
        let version = integer_field(obj, "version")?.unwrap_or(DEFAULT_VERSION);

        let stack_id = string_field(obj, "stackId")?;
        let raw_type = string_field(obj, "type")?;
        let block_type: BlockType = raw_type.parse()?;
        let data_id = string_field(obj, "dataId")?;
        let data_val = string_field(obj, "dataVal")?;
        let prev_hash = string_field(obj, "prevHash")?;

        let candidate = Self {
            id,
            time,
            version,
            stack_id,
            block_type,
            data_id,
            data_val,
            prev_hash,
        };
        validation::validate_candidate(&candidate)?;
        Ok(candidate)
    }
}

/// Type-specific fields for one entry in a batch append. The ledger fills
/// in height, time, stack and linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntry {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(rename = "dataId", default)]
    pub data_id: String,
    #[serde(rename = "dataVal")]
    pub data_val: String,
}

impl BlockEntry {
    pub fn new(block_type: BlockType, data_id: impl Into<String>, data_val: impl Into<String>) -> Self {
        Self {
            block_type,
            data_id: data_id.into(),
            data_val: data_val.into(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn block_hash(
    id: u64,
    time: i64,
    version: i64,
    stack_id: &str,
    block_type: BlockType,
    data_id: &str,
    data_val: &str,
    prev_hash: &str,
) -> Result<BlockHash, CanonicalizationError> {
    let preimage = (
        id,
        time,
        version,
        stack_id,
        block_type.as_str(),
        data_id,
        data_val,
        prev_hash,
    );
    let canonical = CanonicalBytes::new(&preimage)?;
    Ok(sha256_digest(&canonical))
}

fn integer_field(obj: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| ValidationError::new(field, "must be an integer")),
    }
}

fn string_field(obj: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::new(field, "must be a string")),
        None => Err(ValidationError::new(field, "is required")),
    }
}
