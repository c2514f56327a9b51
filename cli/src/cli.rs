//! # CLI Interface
//!
//! Command-line argument structure for the `lumen` maintenance tool, using
//! `clap` derive. Every subcommand operates on a local ledger database —
//! there is no network surface here, by design.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// LUMEN attestation ledger maintenance tool.
///
/// Inspects and maintains a local DA attestation ledger: chain tail,
/// record lookups, bulk listing, chain verification, and record deletion
/// for rollback scenarios.
#[derive(Parser, Debug)]
#[command(
    name = "lumen",
    about = "LUMEN attestation ledger maintenance tool",
    version,
    propagate_version = true
)]
pub struct LumenCli {
    /// Path to the ledger data directory.
    #[arg(long, short = 'd', env = "LUMEN_DATA_DIR", default_value = "~/.lumen", global = true)]
    pub data_dir: PathBuf,

    /// Emit machine-parseable JSON log lines instead of pretty output.
    #[arg(long, env = "LUMEN_LOG_JSON", global = true)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `lumen` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the chain tail state hash.
    Tail,
    /// Fetch a single record by one of its lookup keys.
    Get(GetArgs),
    /// Stream record summaries (tx hash, commitment, received-at).
    List,
    /// Replay the hash chain from genesis and report the first break.
    Verify(VerifyArgs),
    /// Delete a record by transaction hash (rollback/pruning only —
    /// the chain is not relinked around the hole).
    Delete(DeleteArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `get` subcommand. Exactly one key must be given;
/// `main` enforces the exclusivity and reports anything else as a usage
/// error.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Transaction hash (32 bytes of hex, `0x` prefix optional).
    #[arg(long, conflicts_with_all = ["commitment", "commitment_hash"])]
    pub tx_hash: Option<String>,

    /// Raw marshaled commitment (64 bytes of hex).
    #[arg(long, conflicts_with = "commitment_hash")]
    pub commitment: Option<String>,

    /// Derived commitment hash (32 bytes of hex) — the indexed path.
    #[arg(long)]
    pub commitment_hash: Option<String>,

    /// Print the record as JSON instead of the human layout.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Genesis state hash the chain is expected to start from
    /// (32 bytes of hex). Defaults to all zeros.
    #[arg(long)]
    pub genesis: Option<String>,
}

/// Arguments for the `delete` subcommand.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Transaction hash of the record to remove.
    #[arg(long)]
    pub tx_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        LumenCli::command().debug_assert();
    }
}
