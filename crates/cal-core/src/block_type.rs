//! # Block and Anchor Type Tags
//!
//! `BlockType` is the single definition of the eight block kinds. The tag
//! decides how a block's `dataId` and `dataVal` are read:
//!
//! | tag      | `dataId`                    | `dataVal`                  |
//! |----------|-----------------------------|----------------------------|
//! | `gen`    | `0`                         | zero digest                |
//! | `cal`    | aggregation interval id     | Merkle root                |
//! | `nist`   | beacon timestamp            | beacon value               |
//! | `btc-a`  | anchored block range        | Merkle root sent to Bitcoin |
//! | `btc-c`  | Bitcoin transaction id      | Bitcoin block Merkle root  |
//! | `eth-a`  | anchored block range        | Merkle root sent to Ethereum |
//! | `eth-c`  | Ethereum transaction id     | Ethereum block Merkle root |
//! | `reward` | reward recipient reference  | reward record hash         |
//!
//! `AnchorType` is the subset that can appear as a proof anchor (`gen` and
//! `reward` never do).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ValidationError;

/// The kind of a calendar block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    /// Genesis block, height 0 only.
    #[serde(rename = "gen")]
    Gen,
    /// Calendar aggregation root.
    #[serde(rename = "cal")]
    Cal,
    /// NIST randomness beacon value.
    #[serde(rename = "nist")]
    Nist,
    /// Bitcoin anchor submission.
    #[serde(rename = "btc-a")]
    BtcA,
    /// Bitcoin anchor confirmation.
    #[serde(rename = "btc-c")]
    BtcC,
    /// Ethereum anchor submission.
    #[serde(rename = "eth-a")]
    EthA,
    /// Ethereum anchor confirmation.
    #[serde(rename = "eth-c")]
    EthC,
    /// Reward record.
    #[serde(rename = "reward")]
    Reward,
}

impl BlockType {
    /// All block types in declaration order.
    pub fn all() -> &'static [BlockType] {
        &[
            Self::Gen,
            Self::Cal,
            Self::Nist,
            Self::BtcA,
            Self::BtcC,
            Self::EthA,
            Self::EthC,
            Self::Reward,
        ]
    }

    /// The wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gen => "gen",
            Self::Cal => "cal",
            Self::Nist => "nist",
            Self::BtcA => "btc-a",
            Self::BtcC => "btc-c",
            Self::EthA => "eth-a",
            Self::EthC => "eth-c",
            Self::Reward => "reward",
        }
    }

    fn anchor_type(&self) -> Option<AnchorType> {
        match self {
            Self::Gen | Self::Reward => None,
            Self::Cal => Some(AnchorType::Cal),
            Self::Nist => Some(AnchorType::Nist),
            Self::BtcA => Some(AnchorType::BtcA),
            Self::BtcC => Some(AnchorType::BtcC),
            Self::EthA => Some(AnchorType::EthA),
            Self::EthC => Some(AnchorType::EthC),
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ValidationError::new(
                    "type",
                    format!(
                        "unknown block type {s:?}; expected one of gen, cal, nist, btc-a, btc-c, eth-a, eth-c, reward"
                    ),
                )
            })
    }
}

/// The kind of an anchor found in a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorType {
    /// The calendar anchor every proof carries.
    #[serde(rename = "cal")]
    Cal,
    /// NIST beacon anchor.
    #[serde(rename = "nist")]
    Nist,
    /// Bitcoin anchor, submitted.
    #[serde(rename = "btc-a")]
    BtcA,
    /// Bitcoin anchor, confirmed.
    #[serde(rename = "btc-c")]
    BtcC,
    /// Ethereum anchor, submitted.
    #[serde(rename = "eth-a")]
    EthA,
    /// Ethereum anchor, confirmed.
    #[serde(rename = "eth-c")]
    EthC,
}

impl AnchorType {
    /// The wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cal => "cal",
            Self::Nist => "nist",
            Self::BtcA => "btc-a",
            Self::BtcC => "btc-c",
            Self::EthA => "eth-a",
            Self::EthC => "eth-c",
        }
    }
}

impl std::fmt::Display for AnchorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnchorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::from_str(s)
            .ok()
            .and_then(|t| t.anchor_type())
            .ok_or_else(|| ValidationError::new("type", format!("{s:?} is not an anchor type")))
    }
}
