//! # The Chained Ledger
//!
//! The persistence layer for DA attestations, built on sled's embedded
//! key-value store. All append/lookup/delete traffic flows through this
//! module, and it is the only place chain invariants are enforced.
//!
//! ## Tree Layout
//!
//! sled organizes data into named "trees" (analogous to column families in
//! RocksDB or tables in SQL). We use two:
//!
//! | Tree      | Key                              | Value                      |
//! |-----------|----------------------------------|----------------------------|
//! | `records` | `sequence_id` (8B BE)            | `bincode(StoredDaRecord)`  |
//! | `lookups` | `"tx:"` + tx hash (32B)          | `sequence_id` (8B BE)      |
//! | `lookups` | `"cm:"` + commitment hash (32B)  | `sequence_id` (8B BE)      |
//!
//! Sequence ids come from sled's monotonic id generator, so big-endian keys
//! iterate in insertion order and `last()` is the chain tail. The two index
//! keyspaces share one tree under distinct prefixes so that a row and both
//! of its index entries commit in a single two-tree transaction.
//!
//! ## The Chaining Rule
//!
//! ```text
//! state_hash = BLAKE3( X_be32 || Y_be32 || sender_20 || parent_32 )
//! ```
//!
//! The split X/Y coordinate encodings — not the combined 64-byte form — and
//! exactly this concatenation order. This is a hard contract: every stored
//! `state_hash` was produced by it, and [`Ledger::verify_chain`] replays it
//! to audit the chain from genesis. Change a byte of the preimage layout
//! and every existing ledger fails verification.
//!
//! ## Atomicity
//!
//! A batch of appends is one sled transaction. Either every row and index
//! entry in the batch lands, or the ledger is byte-for-byte unchanged —
//! including when the failure is a duplicate tx hash in the middle of the
//! batch. There is no partial-commit mode.
//!
//! ## Writers
//!
//! The chain tail is threaded through `append` arguments, never read from
//! ambient state. Two callers racing on the same parent hash is a caller
//! bug the API makes visible; the ledger assumes one logical writer at a
//! time. Reads are lock-free and may run concurrently with anything.

use sled::transaction::ConflictableTransactionError;
use sled::{Db, Transactional, Tree};
use std::collections::HashSet;
use std::path::Path;

use crate::commitment::KzgCommitment;
use crate::config::{COMMITMENT_HASH_BYTES, STATE_HASH_BYTES, TX_HASH_BYTES};
use crate::error::{LedgerError, LedgerResult};
use crate::hash::blake3_hash_multi;
use crate::record::{
    encode_hex, from_row, summary_from_row, to_row, Address, DaRecord, DaSummary, LedgerRecord,
    StoredDaRecord,
};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

const RECORDS_TREE: &str = "records";
const LOOKUPS_TREE: &str = "lookups";

/// Index keyspace prefixes within the `lookups` tree.
const TX_KEY_PREFIX: &[u8] = b"tx:";
const COMMITMENT_KEY_PREFIX: &[u8] = b"cm:";

fn tx_lookup_key(tx_hash: &[u8; TX_HASH_BYTES]) -> Vec<u8> {
    [TX_KEY_PREFIX, tx_hash.as_slice()].concat()
}

fn commitment_lookup_key(hash: &[u8; COMMITMENT_HASH_BYTES]) -> Vec<u8> {
    [COMMITMENT_KEY_PREFIX, hash.as_slice()].concat()
}

// ---------------------------------------------------------------------------
// Chaining Rule
// ---------------------------------------------------------------------------

/// Derive a record's state hash from its commitment, sender, and parent.
///
/// Pure and public on purpose: anyone holding a stored row can recompute
/// this from the row's own fields and compare it against the stored
/// `state_hash`, no ledger handle required.
pub fn next_state_hash(
    commitment: &KzgCommitment,
    sender: &Address,
    parent_state_hash: &[u8; STATE_HASH_BYTES],
) -> [u8; STATE_HASH_BYTES] {
    let x = commitment.x_bytes();
    let y = commitment.y_bytes();
    blake3_hash_multi(&[&x, &y, sender.as_bytes(), parent_state_hash])
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// The append-only DA attestation ledger.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized writes, so
/// `Ledger` can be shared across threads via `Arc<Ledger>` (or cloned — the
/// handles are cheap). The *chain* discipline is stricter than the storage
/// discipline: see the module docs on writers.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The underlying sled database handle.
    db: Db,
    /// Rows by big-endian sequence id.
    records: Tree,
    /// Secondary indexes: tx hash and commitment hash, each mapping to a
    /// sequence id.
    lookups: Tree,
}

/// A fully encoded row waiting inside an append transaction.
struct PreparedRow {
    sequence_id: u64,
    tx_hash: [u8; TX_HASH_BYTES],
    commitment_hash: [u8; COMMITMENT_HASH_BYTES],
    row_bytes: Vec<u8>,
}

impl Ledger {
    /// Open or create a ledger database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary ledger that is cleaned up on drop.
    ///
    /// Ideal for tests — no filesystem residue, no cleanup.
    pub fn open_temporary() -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> LedgerResult<Self> {
        let records = db.open_tree(RECORDS_TREE)?;
        let lookups = db.open_tree(LOOKUPS_TREE)?;
        Ok(Self {
            db,
            records,
            lookups,
        })
    }

    // -- Append -------------------------------------------------------------

    /// Append one attestation to the chain.
    ///
    /// `parent_state_hash` is the current chain tail (or the genesis value
    /// for the very first record). On success the new state hash is
    /// returned; the caller threads it into the next append.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateTxHash`] when a record with this tx hash
    /// already exists; [`LedgerError::Encoding`] when the record cannot be
    /// marshaled; [`LedgerError::Storage`] on backend failure.
    pub fn append(
        &self,
        record: &DaRecord,
        parent_state_hash: [u8; STATE_HASH_BYTES],
    ) -> LedgerResult<[u8; STATE_HASH_BYTES]> {
        self.append_batch(std::slice::from_ref(record), parent_state_hash)
    }

    /// Append a batch of attestations, chained in the given order.
    ///
    /// Each record's parent is the previous record's freshly computed state
    /// hash — the chain links *within* the batch, not just across batches.
    /// The whole batch commits atomically: any failure (duplicate tx hash
    /// included) leaves the ledger unchanged. Returns the state hash of the
    /// last record, or `parent_state_hash` itself for an empty batch.
    pub fn append_batch(
        &self,
        records: &[DaRecord],
        parent_state_hash: [u8; STATE_HASH_BYTES],
    ) -> LedgerResult<[u8; STATE_HASH_BYTES]> {
        if records.is_empty() {
            return Ok(parent_state_hash);
        }

        // Chain math and row encoding happen before the transaction: the
        // closure below may be retried by sled and must stay cheap and pure.
        let mut seen = HashSet::with_capacity(records.len());
        let mut parent = parent_state_hash;
        let mut prepared = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.tx_hash) {
                return Err(LedgerError::DuplicateTxHash(encode_hex(&record.tx_hash)));
            }
            let state_hash = next_state_hash(&record.commitment, &record.sender, &parent);
            let sequence_id = self.db.generate_id()?;
            let row = to_row(record, &parent, &state_hash, sequence_id)?;
            let row_bytes =
                bincode::serialize(&row).map_err(|e| LedgerError::Encoding(e.to_string()))?;
            prepared.push(PreparedRow {
                sequence_id,
                tx_hash: record.tx_hash,
                commitment_hash: record.commitment.commitment_hash(),
                row_bytes,
            });
            parent = state_hash;
        }

        (&self.records, &self.lookups)
            .transaction(|(records_t, lookups_t)| {
                for row in &prepared {
                    let tx_key = tx_lookup_key(&row.tx_hash);
                    if lookups_t.get(tx_key.as_slice())?.is_some() {
                        return Err(ConflictableTransactionError::Abort(
                            LedgerError::DuplicateTxHash(encode_hex(&row.tx_hash)),
                        ));
                    }
                    let seq_key = row.sequence_id.to_be_bytes();
                    records_t.insert(&seq_key[..], row.row_bytes.as_slice())?;
                    lookups_t.insert(tx_key, &seq_key[..])?;
                    lookups_t.insert(commitment_lookup_key(&row.commitment_hash), &seq_key[..])?;
                }
                Ok(())
            })
            .map_err(LedgerError::from)?;

        self.db.flush()?;
        tracing::debug!(
            count = records.len(),
            tail = %encode_hex(&parent),
            "appended records"
        );
        Ok(parent)
    }

    // -- Lookups ------------------------------------------------------------

    /// Fetch the record with the given transaction hash.
    pub fn get_by_tx_hash(&self, tx_hash: &[u8; TX_HASH_BYTES]) -> LedgerResult<LedgerRecord> {
        self.ensure_not_empty()?;
        let seq = self
            .lookups
            .get(tx_lookup_key(tx_hash))?
            .ok_or_else(|| LedgerError::NotFound(format!("tx hash {}", encode_hex(tx_hash))))?;
        from_row(&self.load_row(&seq)?)
    }

    /// Fetch the record matching raw marshaled commitment bytes.
    ///
    /// The input is decoded (validating width and curve membership) and
    /// re-encoded canonically, then matched against the stored `commitment`
    /// field by scanning rows. This is the deliberate slow path — callers
    /// who already hold the derived hash should use
    /// [`Self::get_by_commitment_hash`].
    pub fn get_by_commitment(&self, commitment: &[u8]) -> LedgerResult<LedgerRecord> {
        self.ensure_not_empty()?;
        let canonical = KzgCommitment::from_bytes(commitment)?;
        let needle = canonical.to_hex();
        for item in self.records.iter() {
            let (_, value) = item?;
            let row: StoredDaRecord = decode_row_bytes(&value)?;
            if row.commitment == needle {
                return from_row(&row);
            }
        }
        Err(LedgerError::NotFound(format!("commitment {}", needle)))
    }

    /// Fetch the record with the given derived commitment hash — the
    /// indexed fast path.
    pub fn get_by_commitment_hash(
        &self,
        hash: &[u8; COMMITMENT_HASH_BYTES],
    ) -> LedgerResult<LedgerRecord> {
        self.ensure_not_empty()?;
        let seq = self
            .lookups
            .get(commitment_lookup_key(hash))?
            .ok_or_else(|| {
                LedgerError::NotFound(format!("commitment hash {}", encode_hex(hash)))
            })?;
        from_row(&self.load_row(&seq)?)
    }

    /// The state hash of the most recently appended record — the value to
    /// thread into the next append.
    ///
    /// # Errors
    ///
    /// [`LedgerError::EmptyLedger`] when no records exist.
    pub fn chain_tail(&self) -> LedgerResult<[u8; STATE_HASH_BYTES]> {
        let (_, value) = self.records.last()?.ok_or(LedgerError::EmptyLedger)?;
        let row: StoredDaRecord = decode_row_bytes(&value)?;
        crate::record::decode_hex_fixed::<STATE_HASH_BYTES>(&row.state_hash)
    }

    /// Lazily iterate `(tx hash, commitment, received at)` summaries over
    /// every record, in insertion order. Restartable — each call starts a
    /// fresh scan.
    pub fn iter_summaries(&self) -> impl Iterator<Item = LedgerResult<DaSummary>> + '_ {
        self.records.iter().map(|item| -> LedgerResult<DaSummary> {
            let (_, value) = item?;
            summary_from_row(&decode_row_bytes(&value)?)
        })
    }

    // -- Delete -------------------------------------------------------------

    /// Remove the record with the given transaction hash.
    ///
    /// A maintenance operation for rollback and pruning — the chain is NOT
    /// relinked around the hole. A subsequent [`Self::verify_chain`] will
    /// stop at the gap, which is exactly the point: deletion truncates the
    /// verifiable chain.
    pub fn delete_by_tx_hash(&self, tx_hash: &[u8; TX_HASH_BYTES]) -> LedgerResult<()> {
        let tx_key = tx_lookup_key(tx_hash);
        (&self.records, &self.lookups)
            .transaction(|(records_t, lookups_t)| {
                let seq = match lookups_t.get(tx_key.as_slice())? {
                    Some(seq) => seq,
                    None => {
                        return Err(ConflictableTransactionError::Abort(LedgerError::NotFound(
                            format!("tx hash {}", encode_hex(tx_hash)),
                        )))
                    }
                };
                let row_bytes = records_t.get(&seq)?.ok_or_else(|| {
                    ConflictableTransactionError::Abort(LedgerError::Encoding(format!(
                        "index entry for tx hash {} points at a missing row",
                        encode_hex(tx_hash)
                    )))
                })?;
                let row: StoredDaRecord = decode_row_bytes(&row_bytes)
                    .map_err(ConflictableTransactionError::Abort)?;
                let commitment_hash =
                    crate::record::decode_hex_fixed::<COMMITMENT_HASH_BYTES>(&row.commitment_hash)
                        .map_err(ConflictableTransactionError::Abort)?;

                lookups_t.remove(tx_key.clone())?;
                lookups_t.remove(commitment_lookup_key(&commitment_hash))?;
                records_t.remove(seq)?;
                Ok(())
            })
            .map_err(LedgerError::from)?;

        self.db.flush()?;
        tracing::debug!(tx_hash = %encode_hex(tx_hash), "deleted record");
        Ok(())
    }

    // -- Verification -------------------------------------------------------

    /// Walk the whole chain from `genesis`, recomputing every state hash
    /// from stored fields and checking parent linkage.
    ///
    /// Returns the number of verified records. Fails with
    /// [`LedgerError::ChainMismatch`] at the first record whose stored
    /// hashes do not replay — including the record after a deletion hole.
    pub fn verify_chain(&self, genesis: [u8; STATE_HASH_BYTES]) -> LedgerResult<u64> {
        let mut expected_parent = genesis;
        let mut verified = 0u64;
        for item in self.records.iter() {
            let (_, value) = item?;
            let entry = from_row(&decode_row_bytes(&value)?)?;

            if entry.parent_state_hash != expected_parent {
                return Err(LedgerError::ChainMismatch {
                    seq: entry.sequence_id,
                    reason: format!(
                        "parent hash {} does not extend {}",
                        encode_hex(&entry.parent_state_hash),
                        encode_hex(&expected_parent)
                    ),
                });
            }

            let recomputed = next_state_hash(
                &entry.record.commitment,
                &entry.record.sender,
                &entry.parent_state_hash,
            );
            if recomputed != entry.state_hash {
                return Err(LedgerError::ChainMismatch {
                    seq: entry.sequence_id,
                    reason: "stored state hash does not match recomputation".into(),
                });
            }

            expected_parent = entry.state_hash;
            verified += 1;
        }

        tracing::debug!(records = verified, "chain verified");
        Ok(verified)
    }

    // -- Utility ------------------------------------------------------------

    /// Number of records in the ledger.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// True when the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Block until all pending writes are durable on disk.
    pub fn flush(&self) -> LedgerResult<()> {
        self.db.flush()?;
        Ok(())
    }

    // -- Internals ----------------------------------------------------------

    /// Lookups distinguish "no rows at all" from "no match": the empty
    /// check runs first, same as the original count-then-query shape.
    fn ensure_not_empty(&self) -> LedgerResult<()> {
        if self.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }
        Ok(())
    }

    fn load_row(&self, seq_key: &sled::IVec) -> LedgerResult<StoredDaRecord> {
        let bytes = self.records.get(seq_key)?.ok_or_else(|| {
            LedgerError::Encoding("index entry points at a missing row".into())
        })?;
        decode_row_bytes(&bytes)
    }
}

fn decode_row_bytes(bytes: &[u8]) -> LedgerResult<StoredDaRecord> {
    bincode::deserialize(bytes).map_err(|e| LedgerError::Encoding(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
