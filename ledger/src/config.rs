//! # Ledger Constants
//!
//! Every magic number in LUMEN lives here. If you're hardcoding a byte
//! width somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Most of these are wire-format contracts: the commitment encoding, the
//! chaining preimage, and the on-disk hex widths are all derived from them.
//! Changing any of them invalidates every ledger already on disk, so don't.

// ---------------------------------------------------------------------------
// Commitment Encoding
// ---------------------------------------------------------------------------

/// The curve the external KZG scheme commits on. BN254 (a.k.a. alt_bn128):
/// mature arkworks support, Ethereum precompiles, acceptable proving times.
/// The ledger never does curve arithmetic — it only carries points — but the
/// encoding widths below are dictated by this choice.
pub const COMMITMENT_CURVE: &str = "BN254";

/// Width of one big-endian base-field element encoding. BN254's base field
/// modulus fits in 254 bits, so every element packs into 32 bytes.
pub const FIELD_ELEMENT_BYTES: usize = 32;

/// Width of a marshaled commitment: `X_be32 || Y_be32`, uncompressed.
/// The identity point is the all-zeros encoding — (0, 0) is not on the
/// curve, so there is no ambiguity with a real point.
pub const COMMITMENT_BYTES: usize = 2 * FIELD_ELEMENT_BYTES;

// ---------------------------------------------------------------------------
// Identifiers & Digests
// ---------------------------------------------------------------------------

/// Sender and signer addresses are 20-byte account identifiers, persisted
/// as 40 lowercase hex characters.
pub const ADDRESS_BYTES: usize = 20;

/// Transaction hashes are 32 bytes. They are produced upstream; the ledger
/// only uses them as the unique dedup key.
pub const TX_HASH_BYTES: usize = 32;

/// Width of a chain state hash. BLAKE3 output — the ledger's native digest
/// for the hash chain, same as everywhere else we control both ends.
pub const STATE_HASH_BYTES: usize = 32;

/// Width of a derived commitment hash. SHA-256 output — external consumers
/// derive this lookup key themselves, and external systems speak SHA-256.
pub const COMMITMENT_HASH_BYTES: usize = 32;

/// The digest chaining records together.
pub const CHAIN_HASH_FUNCTION: &str = "BLAKE3";

/// The digest deriving commitment lookup keys.
pub const LOOKUP_HASH_FUNCTION: &str = "SHA-256";

// ---------------------------------------------------------------------------
// Chain Bootstrap
// ---------------------------------------------------------------------------

/// Conventional genesis state hash for a fresh chain. Append always takes
/// the parent hash explicitly; this constant is merely the customary value
/// callers thread into the very first append.
pub const GENESIS_STATE_HASH: [u8; STATE_HASH_BYTES] = [0u8; STATE_HASH_BYTES];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_width_is_two_field_elements() {
        assert_eq!(COMMITMENT_BYTES, 2 * FIELD_ELEMENT_BYTES);
        assert_eq!(COMMITMENT_BYTES, 64);
    }

    #[test]
    fn digest_widths_are_32_bytes() {
        // Both BLAKE3 and SHA-256 emit 256-bit digests. If these drift apart,
        // someone swapped a hash function without reading this file.
        assert_eq!(STATE_HASH_BYTES, 32);
        assert_eq!(COMMITMENT_HASH_BYTES, 32);
        assert_eq!(TX_HASH_BYTES, 32);
    }

    #[test]
    fn genesis_is_all_zeros() {
        assert!(GENESIS_STATE_HASH.iter().all(|b| *b == 0));
    }
}
