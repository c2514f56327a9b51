//! End-to-end scenarios for the attestation ledger.
//!
//! These tests exercise the full record lifecycle — append, chained batch,
//! every lookup path, deletion, and chain verification — against both
//! temporary and on-disk databases. Each test stands alone with its own
//! store; no shared state, no ordering dependencies.

use ark_bn254::{Fr, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use chrono::{TimeZone, Utc};
use std::ops::Mul;

use lumen_ledger::config::GENESIS_STATE_HASH;
use lumen_ledger::{next_state_hash, Address, DaRecord, KzgCommitment, Ledger, LedgerError};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn commitment_for(seed: u64) -> KzgCommitment {
    KzgCommitment::new(G1Affine::generator().mul(Fr::from(seed + 1)).into_affine())
}

fn attestation(n: u8) -> DaRecord {
    DaRecord {
        sender: Address([n; 20]),
        index: n as u64,
        length: 4096,
        tx_hash: [n; 32],
        commitment: commitment_for(n as u64),
        data: vec![0xd0, n],
        sign_data: vec![vec![n; 65], vec![n.wrapping_add(1); 65]],
        sign_addr: vec![
            Address([n.wrapping_add(2); 20]),
            Address([n.wrapping_add(3); 20]),
        ],
        block_num: 7_000 + n as u64,
        received_at: Utc.with_ymd_and_hms(2026, 4, 2, 12, 0, n as u32 % 60).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn chain_grows_and_every_lookup_path_agrees() {
    let ledger = Ledger::open_temporary().expect("temp ledger");

    assert!(matches!(
        ledger.chain_tail().unwrap_err(),
        LedgerError::EmptyLedger
    ));

    let r1 = attestation(1);
    let r2 = attestation(2);
    let h1 = ledger.append(&r1, GENESIS_STATE_HASH).unwrap();
    let h2 = ledger.append(&r2, h1).unwrap();
    assert_eq!(ledger.chain_tail().unwrap(), h2);

    // All three lookup paths return the same record.
    let by_tx = ledger.get_by_tx_hash(&r1.tx_hash).unwrap();
    let by_commitment = ledger.get_by_commitment(&r1.commitment.to_bytes()).unwrap();
    let by_hash = ledger
        .get_by_commitment_hash(&r1.commitment.commitment_hash())
        .unwrap();
    assert_eq!(by_tx, by_commitment);
    assert_eq!(by_tx, by_hash);
    assert_eq!(by_tx.state_hash, h1);

    // The chain replays from stored fields alone.
    assert_eq!(ledger.verify_chain(GENESIS_STATE_HASH).unwrap(), 2);
    let recomputed = next_state_hash(&by_tx.record.commitment, &by_tx.record.sender, &by_tx.parent_state_hash);
    assert_eq!(recomputed, h1);
}

#[test]
fn ledger_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let records: Vec<DaRecord> = (1..=3).map(attestation).collect();

    let tail = {
        let ledger = Ledger::open(dir.path()).expect("open");
        let tail = ledger.append_batch(&records, GENESIS_STATE_HASH).unwrap();
        ledger.flush().unwrap();
        tail
    };

    // A fresh handle sees the same chain, byte for byte.
    let reopened = Ledger::open(dir.path()).expect("reopen");
    assert_eq!(reopened.record_count(), 3);
    assert_eq!(reopened.chain_tail().unwrap(), tail);
    assert_eq!(reopened.verify_chain(GENESIS_STATE_HASH).unwrap(), 3);

    let entry = reopened.get_by_tx_hash(&records[1].tx_hash).unwrap();
    assert_eq!(entry.record, records[1]);
}

#[test]
fn failed_batch_leaves_persisted_chain_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = Ledger::open(dir.path()).expect("open");

    let seeded = attestation(5);
    let before = ledger.append(&seeded, GENESIS_STATE_HASH).unwrap();

    // Batch collides on its fourth record.
    let batch: Vec<DaRecord> = vec![attestation(10), attestation(11), attestation(12), attestation(5)];
    assert!(matches!(
        ledger.append_batch(&batch, before).unwrap_err(),
        LedgerError::DuplicateTxHash(_)
    ));

    // Unchanged now — and unchanged after a reopen.
    assert_eq!(ledger.chain_tail().unwrap(), before);
    drop(ledger);

    let reopened = Ledger::open(dir.path()).expect("reopen");
    assert_eq!(reopened.record_count(), 1);
    assert_eq!(reopened.chain_tail().unwrap(), before);
}

#[test]
fn deletion_truncates_the_verifiable_chain() {
    let ledger = Ledger::open_temporary().expect("temp ledger");
    let records: Vec<DaRecord> = (1..=4).map(attestation).collect();
    ledger.append_batch(&records, GENESIS_STATE_HASH).unwrap();
    assert_eq!(ledger.verify_chain(GENESIS_STATE_HASH).unwrap(), 4);

    // Remove the second record: the hole breaks verification at the third.
    ledger.delete_by_tx_hash(&records[1].tx_hash).unwrap();
    assert_eq!(ledger.record_count(), 3);

    match ledger.verify_chain(GENESIS_STATE_HASH).unwrap_err() {
        LedgerError::ChainMismatch { seq, .. } => {
            let third = ledger.get_by_tx_hash(&records[2].tx_hash).unwrap();
            assert_eq!(seq, third.sequence_id);
        }
        other => panic!("expected ChainMismatch, got {other:?}"),
    }

    // Deleting the tail moves the tail back to the survivor before it.
    ledger.delete_by_tx_hash(&records[3].tx_hash).unwrap();
    let third = ledger.get_by_tx_hash(&records[2].tx_hash).unwrap();
    assert_eq!(ledger.chain_tail().unwrap(), third.state_hash);
}

#[test]
fn summaries_stream_the_audit_projection() {
    let ledger = Ledger::open_temporary().expect("temp ledger");
    let records: Vec<DaRecord> = (1..=5).map(attestation).collect();
    ledger.append_batch(&records, GENESIS_STATE_HASH).unwrap();

    let summaries: Vec<_> = ledger
        .iter_summaries()
        .collect::<Result<_, _>>()
        .expect("clean scan");
    assert_eq!(summaries.len(), 5);
    for (summary, record) in summaries.iter().zip(&records) {
        assert_eq!(summary.tx_hash, record.tx_hash);
        assert_eq!(summary.commitment, record.commitment);
    }
}
