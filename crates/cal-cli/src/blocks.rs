//! # Block Subcommands
//!
//! `init`, `append`, `head`, `range` and `verify` over the file-backed
//! ledger in the data directory. Blocks are printed as JSON using the
//! ledger's wire field names.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cal_core::{BlockType, Timestamp};
use cal_ledger::{verify_store, BlockEntry, CalendarBlock, Ledger, LedgerError, LedgerStore};

use crate::keys::{load_public_key, load_signing_key};
use crate::CliContext;

fn open_ledger(ctx: &CliContext, key_path: &Path) -> Result<Ledger<cal_ledger::FileLedgerStore>> {
    let store = ctx.open_store()?;
    let key = load_signing_key(key_path)?;
    Ledger::from_config(store, key, &ctx.config).context("failed to set up ledger")
}

fn print_block(out: &mut impl Write, block: &CalendarBlock) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(block)?)?;
    Ok(())
}

/// Write the genesis block.
pub fn cmd_init(ctx: &CliContext, key_path: &Path, out: &mut impl Write) -> Result<u8> {
    let ledger = open_ledger(ctx, key_path)?;
    match ledger.genesis(Timestamp::now()) {
        Ok(block) => {
            print_block(out, &block)?;
            Ok(0)
        }
        Err(LedgerError::AlreadyInitialized) => {
            bail!("ledger {} is already initialized", ctx.config.table_name)
        }
        Err(e) => Err(e).context("failed to write genesis block"),
    }
}

/// Append one block of `block_type` onto the current head.
pub fn cmd_append(
    ctx: &CliContext,
    key_path: &Path,
    block_type: &str,
    data_id: &str,
    data_val: &str,
    out: &mut impl Write,
) -> Result<u8> {
    let block_type: BlockType = block_type.parse()?;
    let ledger = open_ledger(ctx, key_path)?;
    let entry = BlockEntry::new(block_type, data_id, data_val);
    let block = ledger
        .append_entry(&entry, Timestamp::now())
        .context("append rejected")?;
    print_block(out, &block)?;
    Ok(0)
}

/// Print the current head, or report an empty ledger with exit code 1.
pub fn cmd_head(ctx: &CliContext, out: &mut impl Write) -> Result<u8> {
    let store = ctx.open_store()?;
    match store.head()? {
        Some(block) => {
            print_block(out, &block)?;
            Ok(0)
        }
        None => {
            writeln!(out, "ledger is empty")?;
            Ok(1)
        }
    }
}

/// Print up to `limit` blocks from height `from`.
pub fn cmd_range(ctx: &CliContext, from: u64, limit: usize, out: &mut impl Write) -> Result<u8> {
    let max = ctx.config.limits.get_proofs_max;
    if limit > max {
        bail!("range of {limit} blocks exceeds GET_PROOFS_MAX_REST ({max})");
    }
    let store = ctx.open_store()?;
    let blocks = store.range_scan(from, limit)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&blocks)?)?;
    Ok(0)
}

/// Verify the stored chain. Signatures are checked when `pubkey` is given.
pub fn cmd_verify(ctx: &CliContext, pubkey: Option<&Path>, out: &mut impl Write) -> Result<u8> {
    let public_key = pubkey.map(load_public_key).transpose()?;
    // Opening a file store already replays and verifies the chain.
    let store = match ctx.open_store() {
        Ok(store) => store,
        Err(e) => return report_failure(out, e),
    };
    match verify_store(&store, ctx.config.limits.get_proofs_max, public_key.as_ref()) {
        Ok(range) => {
            let signatures = if public_key.is_some() { "checked" } else { "not checked" };
            writeln!(
                out,
                "OK: {} blocks intact (heights {}..={}), signatures {signatures}",
                range.count,
                range.first.map_or("-".to_string(), |h| h.to_string()),
                range.last.map_or("-".to_string(), |h| h.to_string()),
            )?;
            Ok(0)
        }
        Err(e) => report_failure(out, e.into()),
    }
}

fn report_failure(out: &mut impl Write, err: anyhow::Error) -> Result<u8> {
    let finding = err.chain().find_map(|cause| match cause.downcast_ref::<LedgerError>() {
        Some(LedgerError::ChainIntegrity(e)) => Some(format!("chain broken at height {}", e.height())),
        Some(LedgerError::Signature { height, .. }) => {
            Some(format!("chain broken at height {height}"))
        }
        Some(LedgerError::InvalidRecord { line, .. }) => Some(format!("invalid record on line {line}")),
        _ => None,
    });
    match finding {
        Some(f) => writeln!(out, "FAIL: {f}: {err:#}")?,
        None => return Err(err),
    }
    Ok(1)
}
