//! # Hashing
//!
//! Two digest functions, used for two distinct jobs, and we refuse to
//! support more without a very good reason:
//!
//! - **BLAKE3** — the chain digest. State hashes are LUMEN-internal: we
//!   control both the writer and the verifier, so we take the faster hash.
//! - **SHA-256** — the lookup digest. Commitment hashes are derived by
//!   external consumers who want to find a record without re-marshaling
//!   anything, and external systems speak SHA-256.
//!
//! Both emit 32 bytes. Neither choice is negotiable after the first record
//! lands on disk — the stored hashes *are* the contract.

use sha2::{Digest, Sha256};

/// Compute the BLAKE3 hash of the input data.
///
/// The workhorse digest for chain state hashes. Returns a fixed-size array
/// because every caller feeds it straight into the next preimage.
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeds the parts sequentially into one hasher — same digest as hashing
/// the concatenation, minus the temporary buffer. The chaining rule hashes
/// `(x || y || sender || parent)` through this, so the part *order* is
/// consensus-critical.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute the SHA-256 hash of the input data as a fixed-size array.
///
/// Used for derived commitment hashes, the externally-computable lookup key.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}
