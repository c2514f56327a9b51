//! Error taxonomy for ledger operations.
//!
//! The variants mirror what callers actually branch on: duplicates and
//! misses are expected, non-fatal outcomes; storage failures pass through
//! opaquely for the caller to decide on retry policy. The ledger itself
//! never retries.

use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A record with this transaction hash already exists. The tx hash is
    /// the ledger's unique dedup key, so this is an expected outcome for
    /// replayed submissions, not a fault.
    #[error("duplicate tx hash: {0}")]
    DuplicateTxHash(String),

    /// No record matched the given key. Distinct from [`Self::EmptyLedger`]
    /// so callers can tell "no match" from "no rows at all".
    #[error("no record found for {0}")]
    NotFound(String),

    /// The ledger holds no records whatsoever.
    #[error("ledger is empty")]
    EmptyLedger,

    /// Commitment bytes failed decoding: wrong width, a coordinate outside
    /// the field, or a point that is not on the curve.
    #[error("malformed commitment: {0}")]
    MalformedCommitment(String),

    /// A record could not be marshaled to its row form, or a stored row
    /// could not be decoded back. Either way, loud beats lossy.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Chain verification found a record whose stored hashes do not match
    /// what the chaining rule recomputes from its own fields.
    #[error("chain integrity violation at sequence {seq}: {reason}")]
    ChainMismatch { seq: u64, reason: String },

    /// Opaque passthrough from the storage backend.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// True for the two "nothing there" outcomes — [`Self::NotFound`] and
    /// [`Self::EmptyLedger`] — which callers typically handle together.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::EmptyLedger)
    }
}

/// Flattens sled's transaction wrapper: an explicit abort carries our own
/// error out; anything else is a storage failure.
impl From<sled::transaction::TransactionError<LedgerError>> for LedgerError {
    fn from(err: sled::transaction::TransactionError<LedgerError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(inner) => inner,
            sled::transaction::TransactionError::Storage(e) => LedgerError::Storage(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_covers_both_miss_variants() {
        assert!(LedgerError::NotFound("tx hash ab".into()).is_absent());
        assert!(LedgerError::EmptyLedger.is_absent());
        assert!(!LedgerError::DuplicateTxHash("ab".into()).is_absent());
        assert!(!LedgerError::Encoding("nope".into()).is_absent());
    }

    #[test]
    fn display_messages_name_the_key() {
        let err = LedgerError::DuplicateTxHash("deadbeef".into());
        assert!(err.to_string().contains("deadbeef"));

        let err = LedgerError::ChainMismatch {
            seq: 7,
            reason: "parent hash does not extend tail".into(),
        };
        assert!(err.to_string().contains("sequence 7"));
    }
}
