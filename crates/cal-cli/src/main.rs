//! # calendar CLI entry point
//!
//! Parses arguments, loads configuration from the environment, installs
//! logging, and dispatches to the subcommand handlers in `cal_cli`.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cal_cli::anchors::cmd_anchors;
use cal_cli::blocks::{cmd_append, cmd_head, cmd_init, cmd_range, cmd_verify};
use cal_cli::keys::cmd_keygen;
use cal_cli::CliContext;
use cal_core::CalendarConfig;

/// Calendar ledger tool.
///
/// Maintains an append-only, hash-linked ledger of calendar blocks and
/// reports which anchors a proof has accumulated.
#[derive(Parser, Debug)]
#[command(name = "calendar", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the ledger file.
    #[arg(long, global = true, default_value = "calendar-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the node Ed25519 keypair.
    Keygen {
        /// Output directory for `calendar.key` and `calendar.pub`.
        #[arg(long, short, default_value = ".")]
        output: PathBuf,
    },

    /// Write the genesis block of an empty ledger.
    Init {
        /// Path to the private key file (hex-encoded 32-byte seed).
        #[arg(long)]
        key: PathBuf,
    },

    /// Append one block onto the current head.
    Append {
        /// Path to the private key file (hex-encoded 32-byte seed).
        #[arg(long)]
        key: PathBuf,
        /// Block type: cal, nist, btc-a, btc-c, eth-a, eth-c or reward.
        #[arg(long = "type")]
        block_type: String,
        /// Type-specific reference.
        #[arg(long, default_value = "")]
        data_id: String,
        /// Type-specific payload.
        #[arg(long)]
        data_val: String,
    },

    /// Print the chain head as JSON.
    Head,

    /// Print a range of blocks as JSON.
    Range {
        /// First height to print.
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// Maximum number of blocks (bounded by GET_PROOFS_MAX_REST).
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Verify hashes and linkage, and signatures when a public key is given.
    Verify {
        /// Path to the public key file (hex-encoded).
        #[arg(long)]
        pubkey: Option<PathBuf>,
    },

    /// Resolve the anchor types of one or more proof files.
    Anchors {
        /// Proof JSON files.
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = CalendarConfig::from_env().context("invalid configuration")?;
    tracing::debug!(
        table = %config.table_name,
        stack_id = %config.stack_id,
        data_dir = %cli.data_dir.display(),
        "loaded configuration"
    );
    let ctx = CliContext::new(cli.data_dir, config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let code = match &cli.command {
        Commands::Keygen { output } => cmd_keygen(output, &mut out),
        Commands::Init { key } => cmd_init(&ctx, key, &mut out),
        Commands::Append {
            key,
            block_type,
            data_id,
            data_val,
        } => cmd_append(&ctx, key, block_type, data_id, data_val, &mut out),
        Commands::Head => cmd_head(&ctx, &mut out),
        Commands::Range { from, limit } => cmd_range(&ctx, *from, *limit, &mut out),
        Commands::Verify { pubkey } => cmd_verify(&ctx, pubkey.as_deref(), &mut out),
        Commands::Anchors { files } => cmd_anchors(&ctx, files, &mut out),
    }?;
    out.flush()?;
    Ok(code)
}
