// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # LUMEN Maintenance Tool
//!
//! Entry point for the `lumen` binary: a local inspection and maintenance
//! tool for DA attestation ledgers. Parses CLI arguments, initializes
//! logging, opens the ledger database, and dispatches one operation.
//!
//! The binary supports six subcommands:
//!
//! - `tail`    — print the chain tail state hash
//! - `get`     — fetch a record by tx hash, commitment, or commitment hash
//! - `list`    — stream record summaries for audit/export
//! - `verify`  — replay the hash chain from genesis
//! - `delete`  — remove a record (rollback/pruning)
//! - `version` — print build version information

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::Path;

use lumen_ledger::config::GENESIS_STATE_HASH;
use lumen_ledger::{
    decode_hex, decode_hex_fixed, encode_hex, Ledger, LedgerError, LedgerRecord,
};

use cli::{Commands, DeleteArgs, GetArgs, LumenCli, VerifyArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = LumenCli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging("lumen=info,lumen_ledger=info", format);

    match cli.command {
        Commands::Tail => print_tail(&cli.data_dir),
        Commands::Get(args) => get_record(&cli.data_dir, args),
        Commands::List => list_records(&cli.data_dir),
        Commands::Verify(args) => verify_chain(&cli.data_dir, args),
        Commands::Delete(args) => delete_record(&cli.data_dir, args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens the ledger database under the data directory.
fn open_ledger(data_dir: &Path) -> Result<Ledger> {
    let db_path = data_dir.join("ledger");
    Ledger::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))
}

/// Prints the chain tail, distinguishing an empty ledger from a failure.
fn print_tail(data_dir: &Path) -> Result<()> {
    let ledger = open_ledger(data_dir)?;
    match ledger.chain_tail() {
        Ok(tail) => {
            println!("{}", encode_hex(&tail));
            Ok(())
        }
        Err(LedgerError::EmptyLedger) => {
            println!("(ledger is empty — thread the genesis hash into the first append)");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetches one record by whichever key the caller supplied.
fn get_record(data_dir: &Path, args: GetArgs) -> Result<()> {
    let ledger = open_ledger(data_dir)?;

    let entry = if let Some(tx_hash) = &args.tx_hash {
        let key = decode_hex_fixed::<32>(tx_hash).context("bad --tx-hash")?;
        ledger.get_by_tx_hash(&key)?
    } else if let Some(commitment) = &args.commitment {
        let bytes = decode_hex(commitment).context("bad --commitment")?;
        ledger.get_by_commitment(&bytes)?
    } else if let Some(commitment_hash) = &args.commitment_hash {
        let key = decode_hex_fixed::<32>(commitment_hash).context("bad --commitment-hash")?;
        ledger.get_by_commitment_hash(&key)?
    } else {
        bail!("one of --tx-hash, --commitment, or --commitment-hash is required");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record_json(&entry))?);
    } else {
        print_record(&entry);
    }
    Ok(())
}

/// Streams the audit projection, one record per line.
fn list_records(data_dir: &Path) -> Result<()> {
    let ledger = open_ledger(data_dir)?;
    let mut count = 0usize;
    for summary in ledger.iter_summaries() {
        let summary = summary?;
        println!(
            "{}  {}  {}",
            encode_hex(&summary.tx_hash),
            summary.commitment.to_hex(),
            summary.received_at.to_rfc3339(),
        );
        count += 1;
    }
    tracing::info!(records = count, "listing complete");
    Ok(())
}

/// Replays the hash chain from genesis and reports the outcome.
fn verify_chain(data_dir: &Path, args: VerifyArgs) -> Result<()> {
    let ledger = open_ledger(data_dir)?;

    let genesis = match &args.genesis {
        Some(hex) => decode_hex_fixed::<32>(hex).context("bad --genesis")?,
        None => GENESIS_STATE_HASH,
    };

    match ledger.verify_chain(genesis) {
        Ok(count) => {
            println!("chain OK: {} record(s) verified", count);
            Ok(())
        }
        Err(e @ LedgerError::ChainMismatch { .. }) => {
            println!("chain BROKEN: {}", e);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Removes one record. The chain is not relinked — a later `verify` will
/// stop at the hole, which is the documented behavior.
fn delete_record(data_dir: &Path, args: DeleteArgs) -> Result<()> {
    let ledger = open_ledger(data_dir)?;
    let key = decode_hex_fixed::<32>(&args.tx_hash).context("bad --tx-hash")?;

    match ledger.delete_by_tx_hash(&key) {
        Ok(()) => {
            println!("deleted {}", encode_hex(&key));
            Ok(())
        }
        Err(e) if e.is_absent() => {
            println!("no record for {}", encode_hex(&key));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Human layout for a single record.
fn print_record(entry: &LedgerRecord) {
    let r = &entry.record;
    println!("sequence id      : {}", entry.sequence_id);
    println!("sender           : {}", r.sender);
    println!("index / length   : {} / {}", r.index, r.length);
    println!("tx hash          : {}", encode_hex(&r.tx_hash));
    println!("commitment       : {}", r.commitment.to_hex());
    println!("commitment hash  : {}", encode_hex(&r.commitment.commitment_hash()));
    println!("block number     : {}", r.block_num);
    println!("received at      : {}", r.received_at.to_rfc3339());
    println!("parent state hash: {}", encode_hex(&entry.parent_state_hash));
    println!("state hash       : {}", encode_hex(&entry.state_hash));
    println!("payload bytes    : {}", r.data.len());
    println!("signers          : {}", r.sign_addr.len());
    for (addr, sig) in r.sign_addr.iter().zip(&r.sign_data) {
        println!("  {}  sig[{}B]", addr, sig.len());
    }
}

/// JSON view of a single record, hex throughout — the same shapes the
/// row stores.
fn record_json(entry: &LedgerRecord) -> serde_json::Value {
    let r = &entry.record;
    serde_json::json!({
        "sequence_id": entry.sequence_id,
        "sender": r.sender.to_hex(),
        "index": r.index,
        "length": r.length,
        "tx_hash": encode_hex(&r.tx_hash),
        "commitment": r.commitment.to_hex(),
        "commitment_hash": encode_hex(&r.commitment.commitment_hash()),
        "data": encode_hex(&r.data),
        "sign_data": r.sign_data.iter().map(|s| encode_hex(s)).collect::<Vec<_>>(),
        "sign_addr": r.sign_addr.iter().map(|a| a.to_hex()).collect::<Vec<_>>(),
        "parent_state_hash": encode_hex(&entry.parent_state_hash),
        "state_hash": encode_hex(&entry.state_hash),
        "block_num": r.block_num,
        "received_at": r.received_at.to_rfc3339(),
    })
}

/// Prints version information to stdout.
fn print_version() {
    println!("lumen {}", env!("CARGO_PKG_VERSION"));
    println!(
        "ledger format: {} chain / {} lookups on {}",
        lumen_ledger::config::CHAIN_HASH_FUNCTION,
        lumen_ledger::config::LOOKUP_HASH_FUNCTION,
        lumen_ledger::config::COMMITMENT_CURVE,
    );
}
