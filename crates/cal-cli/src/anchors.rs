//! `calendar anchors FILE...`: resolve which anchor types each proof has.
//!
//! Prints one JSON object per proof with its anchor list and the instant
//! it leaves the retention window, taken from the file's modification time.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cal_core::Timestamp;
use cal_proof::{resolve_batch, ProofRetention};
use serde::Serialize;

use crate::CliContext;

#[derive(Debug, Serialize)]
struct AnchorReport<'a> {
    file: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchors: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    expires_at: String,
}

/// Resolve every proof in `files`. Exit code 1 if any proof is malformed.
pub fn cmd_anchors(ctx: &CliContext, files: &[PathBuf], out: &mut impl Write) -> Result<u8> {
    let retention = ProofRetention::from_config(&ctx.config);

    let mut proofs = Vec::with_capacity(files.len());
    let mut created = Vec::with_capacity(files.len());
    for file in files {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read proof: {}", file.display()))?;
        let proof: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse JSON: {}", file.display()))?;
        proofs.push(proof);
        created.push(modified_at(file)?);
    }

    let results = resolve_batch(&proofs, &ctx.config.limits)?;
    let mut malformed = 0;
    for ((file, result), created) in files.iter().zip(results).zip(created) {
        let (anchors, error) = match result {
            Ok(found) => (Some(found.iter().map(|a| a.as_str()).collect()), None),
            Err(e) => {
                malformed += 1;
                (None, Some(e.to_string()))
            }
        };
        let report = AnchorReport {
            file,
            anchors,
            error,
            expires_at: retention.expires_at(created).to_iso8601(),
        };
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    }

    Ok(if malformed == 0 { 0 } else { 1 })
}

fn modified_at(path: &Path) -> Result<Timestamp> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("failed to read modification time: {}", path.display()))?;
    Ok(Timestamp::from_system_time(modified))
}
