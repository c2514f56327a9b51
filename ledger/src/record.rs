//! # Attestation Model & Row Codec
//!
//! Three shapes of the same data, one honest mapping between them:
//!
//! - [`DaRecord`] — what callers hand to `append`: curve point, raw bytes,
//!   real timestamps. Never touches disk directly.
//! - [`StoredDaRecord`] — the persisted row: every byte field lowercase hex,
//!   the timestamp a fixed-format RFC 3339 string. Bincode-serialized.
//! - [`LedgerRecord`] — what reads return: the attestation plus the chain
//!   fields storage assigned to it (sequence id, parent/state hashes).
//!
//! The mapping is the explicit pair [`to_row`]/[`from_row`]: every field
//! enumerated by hand, every decode failure loud. No reflection, no field
//! binding by name, no "it probably lines up".
//!
//! ## Hex policy
//!
//! Writes emit bare lowercase hex. Reads tolerate a `0x`/`0X` prefix and
//! mixed case — older writers were not consistent, so the parser normalizes
//! instead of litigating.
//!
//! ## Timestamp policy
//!
//! `received_at` is normalized to UTC and persisted as RFC 3339 with a
//! fixed nine-digit fraction (`2026-03-01T09:30:00.000000000Z`): lossless
//! for `DateTime<Utc>` and byte-sortable as text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::commitment::KzgCommitment;
use crate::config::{ADDRESS_BYTES, STATE_HASH_BYTES, TX_HASH_BYTES};
use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// Hex Helpers
// ---------------------------------------------------------------------------

/// Lowercase hex, no prefix — the only form we ever write.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Tolerant hex decode: accepts a `0x`/`0X` prefix and mixed case.
pub fn decode_hex(s: &str) -> LedgerResult<Vec<u8>> {
    let bare = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(bare).map_err(|e| LedgerError::Encoding(format!("invalid hex {:?}: {}", s, e)))
}

/// [`decode_hex`] with an exact-width requirement.
pub fn decode_hex_fixed<const N: usize>(s: &str) -> LedgerResult<[u8; N]> {
    let bytes = decode_hex(s)?;
    bytes.as_slice().try_into().map_err(|_| {
        LedgerError::Encoding(format!("expected {} bytes of hex, got {}", N, bytes.len()))
    })
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identifier — the sender of a commitment or one of its
/// attesting signers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    pub fn from_hex(s: &str) -> LedgerResult<Self> {
        Ok(Self(decode_hex_fixed::<ADDRESS_BYTES>(s)?))
    }

    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// DaRecord
// ---------------------------------------------------------------------------

/// One data-availability attestation, as submitted by a caller.
///
/// `sign_data[i]` is the signature produced by `sign_addr[i]` — the two
/// arrays must have the same length, and [`to_row`] refuses anything else.
/// The ledger stores the signatures; it does not verify them.
#[derive(Clone, Debug, PartialEq)]
pub struct DaRecord {
    /// Address of the party that produced the commitment.
    pub sender: Address,
    /// Position of the committed blob within its batch.
    pub index: u64,
    /// Size of the committed blob in bytes.
    pub length: u64,
    /// Hash of the originating transaction — the ledger-wide unique key.
    pub tx_hash: [u8; TX_HASH_BYTES],
    /// The KZG commitment pinning the blob's contents.
    pub commitment: KzgCommitment,
    /// Raw committed payload. May be empty — retention is deployment policy.
    pub data: Vec<u8>,
    /// Signer attestations, one signature per signer.
    pub sign_data: Vec<Vec<u8>>,
    /// Signer addresses, index-aligned with `sign_data`.
    pub sign_addr: Vec<Address>,
    /// Block height association, set by the caller.
    pub block_num: u64,
    /// When this attestation was received.
    pub received_at: DateTime<Utc>,
}

/// An attestation as read back from the ledger: the record plus the chain
/// fields assigned at append time.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerRecord {
    /// Storage-assigned, monotonically increasing sequence id.
    pub sequence_id: u64,
    /// State hash of the chain tail this record extended.
    pub parent_state_hash: [u8; STATE_HASH_BYTES],
    /// This record's own state hash — the next record's parent.
    pub state_hash: [u8; STATE_HASH_BYTES],
    /// The attestation itself.
    pub record: DaRecord,
}

/// The bulk-export projection: just enough to audit what was committed and
/// when, without decoding payloads or signer arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct DaSummary {
    pub tx_hash: [u8; TX_HASH_BYTES],
    pub commitment: KzgCommitment,
    pub received_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// StoredDaRecord
// ---------------------------------------------------------------------------

/// The flat on-disk row. All byte fields are lowercase hex text; the
/// timestamp is fixed-format RFC 3339. This is the only shape bincode
/// ever sees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDaRecord {
    pub sequence_id: u64,
    pub sender: String,
    pub index: u64,
    pub length: u64,
    pub tx_hash: String,
    pub commitment: String,
    pub commitment_hash: String,
    pub data: String,
    pub sign_data: Vec<String>,
    pub sign_addr: Vec<String>,
    pub parent_state_hash: String,
    pub state_hash: String,
    pub block_num: u64,
    pub received_at: String,
}

/// Render a timestamp in the one format rows carry.
fn format_received_at(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a stored timestamp, accepting any RFC 3339 offset and normalizing
/// to UTC.
fn parse_received_at(s: &str) -> LedgerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LedgerError::Encoding(format!("invalid received_at {:?}: {}", s, e)))
}

/// Marshal an attestation into its row form.
///
/// The chain fields (`parent_state_hash`, `state_hash`, `sequence_id`) are
/// supplied by the ledger — this function only encodes, it never derives.
///
/// # Errors
///
/// [`LedgerError::Encoding`] when the signer arrays disagree in length.
pub fn to_row(
    record: &DaRecord,
    parent_state_hash: &[u8; STATE_HASH_BYTES],
    state_hash: &[u8; STATE_HASH_BYTES],
    sequence_id: u64,
) -> LedgerResult<StoredDaRecord> {
    if record.sign_data.len() != record.sign_addr.len() {
        return Err(LedgerError::Encoding(format!(
            "signer arrays disagree: {} signatures, {} addresses",
            record.sign_data.len(),
            record.sign_addr.len()
        )));
    }

    Ok(StoredDaRecord {
        sequence_id,
        sender: record.sender.to_hex(),
        index: record.index,
        length: record.length,
        tx_hash: encode_hex(&record.tx_hash),
        commitment: record.commitment.to_hex(),
        commitment_hash: encode_hex(&record.commitment.commitment_hash()),
        data: encode_hex(&record.data),
        sign_data: record.sign_data.iter().map(|s| encode_hex(s)).collect(),
        sign_addr: record.sign_addr.iter().map(Address::to_hex).collect(),
        parent_state_hash: encode_hex(parent_state_hash),
        state_hash: encode_hex(state_hash),
        block_num: record.block_num,
        received_at: format_received_at(&record.received_at),
    })
}

/// Unmarshal a row back into a [`LedgerRecord`], field by field.
///
/// Every decode failure surfaces as [`LedgerError::Encoding`] (or
/// [`LedgerError::MalformedCommitment`] for the commitment itself) naming
/// the offending value — a row that half-parses is a row that lies.
pub fn from_row(row: &StoredDaRecord) -> LedgerResult<LedgerRecord> {
    if row.sign_data.len() != row.sign_addr.len() {
        return Err(LedgerError::Encoding(format!(
            "stored signer arrays disagree: {} signatures, {} addresses",
            row.sign_data.len(),
            row.sign_addr.len()
        )));
    }

    let sign_data = row
        .sign_data
        .iter()
        .map(|s| decode_hex(s))
        .collect::<LedgerResult<Vec<_>>>()?;
    let sign_addr = row
        .sign_addr
        .iter()
        .map(|s| Address::from_hex(s))
        .collect::<LedgerResult<Vec<_>>>()?;

    Ok(LedgerRecord {
        sequence_id: row.sequence_id,
        parent_state_hash: decode_hex_fixed::<STATE_HASH_BYTES>(&row.parent_state_hash)?,
        state_hash: decode_hex_fixed::<STATE_HASH_BYTES>(&row.state_hash)?,
        record: DaRecord {
            sender: Address::from_hex(&row.sender)?,
            index: row.index,
            length: row.length,
            tx_hash: decode_hex_fixed::<TX_HASH_BYTES>(&row.tx_hash)?,
            commitment: KzgCommitment::from_bytes(&decode_hex(&row.commitment)?)?,
            data: decode_hex(&row.data)?,
            sign_data,
            sign_addr,
            block_num: row.block_num,
            received_at: parse_received_at(&row.received_at)?,
        },
    })
}

/// Decode only the projection fields of a row — the cheap path for
/// bulk export.
pub fn summary_from_row(row: &StoredDaRecord) -> LedgerResult<DaSummary> {
    Ok(DaSummary {
        tx_hash: decode_hex_fixed::<TX_HASH_BYTES>(&row.tx_hash)?,
        commitment: KzgCommitment::from_bytes(&decode_hex(&row.commitment)?)?,
        received_at: parse_received_at(&row.received_at)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
