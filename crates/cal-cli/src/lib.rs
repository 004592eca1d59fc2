//! # cal-cli: the `calendar` Tool
//!
//! Operates a file-backed calendar ledger from the command line.
//!
//! ## Subcommands
//!
//! - `calendar keygen`: generate the node Ed25519 keypair.
//! - `calendar init`: write the genesis block.
//! - `calendar append`: append one block of a given type.
//! - `calendar head` / `calendar range`: read blocks as JSON.
//! - `calendar verify`: check hashes, linkage and optionally signatures.
//! - `calendar anchors`: resolve the anchor types of proof files.
//!
//! ```bash
//! calendar keygen --output keys
//! calendar init --key keys/calendar.key
//! calendar append --key keys/calendar.key --type btc-a --data-id 1f --data-val ab:cd
//! calendar verify --pubkey keys/calendar.pub
//! ```
//!
//! Every handler writes its report to a caller-supplied writer and returns
//! a process exit code, so the same code paths run under test.

pub mod anchors;
pub mod blocks;
pub mod keys;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cal_core::CalendarConfig;
use cal_ledger::FileLedgerStore;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Directory holding the ledger file.
    pub data_dir: PathBuf,
    /// Node configuration, loaded once at startup.
    pub config: CalendarConfig,
}

impl CliContext {
    pub fn new(data_dir: impl Into<PathBuf>, config: CalendarConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    /// Open the ledger file named by `CALENDAR_TABLE_NAME` in the data dir.
    pub fn open_store(&self) -> Result<FileLedgerStore> {
        FileLedgerStore::open(&self.data_dir, &self.config.table_name).with_context(|| {
            format!(
                "failed to open ledger {} in {}",
                self.config.table_name,
                self.data_dir.display()
            )
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
