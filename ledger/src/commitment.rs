//! # KZG Commitment Codec
//!
//! A KZG commitment is a point on BN254/G1, produced by an external
//! commitment scheme. The ledger never opens, verifies, or aggregates it —
//! this module's entire job is turning the point into a canonical byte
//! string and back, with enough validation that garbage cannot masquerade
//! as a commitment.
//!
//! ## Encoding
//!
//! ```text
//! ┌────────────────────┬────────────────────┐
//! │  X (32B, big-end.) │  Y (32B, big-end.) │   = 64 bytes, uncompressed
//! └────────────────────┴────────────────────┘
//! ```
//!
//! Each coordinate is the big-endian encoding of its base-field element.
//! The identity point encodes as 64 zero bytes — (0, 0) does not satisfy
//! `y² = x³ + 3`, so the sentinel cannot collide with a real point.
//!
//! The split X/Y encodings are load-bearing beyond storage: the chaining
//! rule hashes `X_be || Y_be` (not the combined form), so [`KzgCommitment::
//! x_bytes`]/[`KzgCommitment::y_bytes`] are part of the chain contract.
//!
//! ## Decoding validates three things
//!
//! 1. The width is exactly 64 bytes.
//! 2. Each coordinate is a canonical field element (strictly below the
//!    modulus — no wraparound aliases accepted).
//! 3. The resulting point is on the curve and in the right subgroup.
//!    (G1 on BN254 has cofactor 1, so the subgroup check is free, but we
//!    say what we mean.)

use ark_bn254::{Fq, G1Affine};
use ark_ec::AffineRepr;
use ark_ff::{BigInteger, PrimeField};

use crate::config::{COMMITMENT_BYTES, COMMITMENT_HASH_BYTES, FIELD_ELEMENT_BYTES};
use crate::error::{LedgerError, LedgerResult};
use crate::hash::sha256_array;

// ---------------------------------------------------------------------------
// KzgCommitment
// ---------------------------------------------------------------------------

/// An opaque KZG commitment: a BN254/G1 point the ledger carries but never
/// computes with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KzgCommitment(pub G1Affine);

impl KzgCommitment {
    /// Wrap an existing curve point.
    pub fn new(point: G1Affine) -> Self {
        Self(point)
    }

    /// The canonical marshaled form: `X_be32 || Y_be32`, identity as zeros.
    pub fn to_bytes(&self) -> [u8; COMMITMENT_BYTES] {
        let mut out = [0u8; COMMITMENT_BYTES];
        if let Some((x, y)) = self.0.xy() {
            out[..FIELD_ELEMENT_BYTES].copy_from_slice(&fq_to_be_bytes(x));
            out[FIELD_ELEMENT_BYTES..].copy_from_slice(&fq_to_be_bytes(y));
        }
        out
    }

    /// The X coordinate's 32-byte big-endian encoding (zeros for identity).
    pub fn x_bytes(&self) -> [u8; FIELD_ELEMENT_BYTES] {
        match self.0.xy() {
            Some((x, _)) => fq_to_be_bytes(x),
            None => [0u8; FIELD_ELEMENT_BYTES],
        }
    }

    /// The Y coordinate's 32-byte big-endian encoding (zeros for identity).
    pub fn y_bytes(&self) -> [u8; FIELD_ELEMENT_BYTES] {
        match self.0.xy() {
            Some((_, y)) => fq_to_be_bytes(y),
            None => [0u8; FIELD_ELEMENT_BYTES],
        }
    }

    /// Decode and validate a marshaled commitment.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MalformedCommitment`] on wrong width, a non-canonical
    /// coordinate, or an off-curve point.
    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        if bytes.len() != COMMITMENT_BYTES {
            return Err(LedgerError::MalformedCommitment(format!(
                "expected {} bytes, got {}",
                COMMITMENT_BYTES,
                bytes.len()
            )));
        }

        if bytes.iter().all(|b| *b == 0) {
            return Ok(Self(G1Affine::zero()));
        }

        let x = fq_from_be_bytes(&bytes[..FIELD_ELEMENT_BYTES]).ok_or_else(|| {
            LedgerError::MalformedCommitment("x coordinate is not a canonical field element".into())
        })?;
        let y = fq_from_be_bytes(&bytes[FIELD_ELEMENT_BYTES..]).ok_or_else(|| {
            LedgerError::MalformedCommitment("y coordinate is not a canonical field element".into())
        })?;

        let point = G1Affine::new_unchecked(x, y);
        if !point.is_on_curve() {
            return Err(LedgerError::MalformedCommitment(
                "point is not on the curve".into(),
            ));
        }
        if !point.is_in_correct_subgroup_assuming_on_curve() {
            return Err(LedgerError::MalformedCommitment(
                "point is not in the prime-order subgroup".into(),
            ));
        }

        Ok(Self(point))
    }

    /// The derived lookup key: SHA-256 of the canonical encoding.
    pub fn commitment_hash(&self) -> [u8; COMMITMENT_HASH_BYTES] {
        sha256_array(&self.to_bytes())
    }

    /// Lowercase hex of the canonical encoding — the stored text form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

// ---------------------------------------------------------------------------
// Field element <-> bytes
// ---------------------------------------------------------------------------

/// Big-endian, fixed-width encoding of a base-field element.
fn fq_to_be_bytes(fq: &Fq) -> [u8; FIELD_ELEMENT_BYTES] {
    let repr = fq.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_ELEMENT_BYTES];
    out.copy_from_slice(&repr);
    out
}

/// Inverse of [`fq_to_be_bytes`]. Returns `None` when the integer is not
/// strictly below the field modulus — non-canonical encodings are rejected,
/// not silently reduced.
fn fq_from_be_bytes(bytes: &[u8]) -> Option<Fq> {
    debug_assert_eq!(bytes.len(), FIELD_ELEMENT_BYTES);
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.rchunks(8)) {
        *limb = u64::from_be_bytes(chunk.try_into().ok()?);
    }
    Fq::from_bigint(ark_ff::BigInt::new(limbs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{Fr, G1Projective};
    use ark_ec::CurveGroup;
    use ark_ff::UniformRand;
    use ark_std::test_rng;
    use std::ops::Mul;

    fn sample_point(seed: u64) -> G1Affine {
        G1Affine::generator().mul(Fr::from(seed)).into_affine()
    }

    #[test]
    fn round_trip_generator() {
        let c = KzgCommitment::new(G1Affine::generator());
        let restored = KzgCommitment::from_bytes(&c.to_bytes()).unwrap();
        assert_eq!(c, restored);
    }

    #[test]
    fn round_trip_random_points() {
        let mut rng = test_rng();
        for _ in 0..16 {
            let point = G1Projective::rand(&mut rng).into_affine();
            let c = KzgCommitment::new(point);
            let restored = KzgCommitment::from_bytes(&c.to_bytes()).unwrap();
            assert_eq!(c, restored);
        }
    }

    #[test]
    fn identity_encodes_as_zeros() {
        let c = KzgCommitment::new(G1Affine::zero());
        assert_eq!(c.to_bytes(), [0u8; COMMITMENT_BYTES]);
        assert_eq!(c.x_bytes(), [0u8; FIELD_ELEMENT_BYTES]);

        let restored = KzgCommitment::from_bytes(&[0u8; COMMITMENT_BYTES]).unwrap();
        assert!(restored.0.is_zero());
    }

    #[test]
    fn split_coordinates_match_combined_encoding() {
        // The chaining rule depends on x_bytes || y_bytes == to_bytes.
        let c = KzgCommitment::new(sample_point(7));
        let combined = c.to_bytes();
        assert_eq!(&combined[..FIELD_ELEMENT_BYTES], &c.x_bytes());
        assert_eq!(&combined[FIELD_ELEMENT_BYTES..], &c.y_bytes());
    }

    #[test]
    fn wrong_width_rejected() {
        assert!(matches!(
            KzgCommitment::from_bytes(&[1u8; 63]),
            Err(LedgerError::MalformedCommitment(_))
        ));
        assert!(matches!(
            KzgCommitment::from_bytes(&[1u8; 65]),
            Err(LedgerError::MalformedCommitment(_))
        ));
    }

    #[test]
    fn off_curve_point_rejected() {
        // Perturb a valid Y coordinate; the result satisfies neither the
        // curve equation nor our patience.
        let mut bytes = KzgCommitment::new(sample_point(3)).to_bytes();
        bytes[COMMITMENT_BYTES - 1] ^= 0x01;
        assert!(matches!(
            KzgCommitment::from_bytes(&bytes),
            Err(LedgerError::MalformedCommitment(_))
        ));
    }

    #[test]
    fn non_canonical_field_element_rejected() {
        // 0xff..ff is far above the BN254 base-field modulus.
        let bytes = [0xffu8; COMMITMENT_BYTES];
        assert!(matches!(
            KzgCommitment::from_bytes(&bytes),
            Err(LedgerError::MalformedCommitment(_))
        ));
    }

    #[test]
    fn commitment_hash_is_sha256_of_encoding() {
        let c = KzgCommitment::new(sample_point(11));
        assert_eq!(c.commitment_hash(), sha256_array(&c.to_bytes()));
    }

    #[test]
    fn distinct_points_distinct_encodings() {
        let a = KzgCommitment::new(sample_point(1));
        let b = KzgCommitment::new(sample_point(2));
        assert_ne!(a.to_bytes(), b.to_bytes());
        assert_ne!(a.commitment_hash(), b.commitment_hash());
    }

    #[test]
    fn hex_form_is_lowercase_and_fixed_width() {
        let h = KzgCommitment::new(sample_point(5)).to_hex();
        assert_eq!(h.len(), COMMITMENT_BYTES * 2);
        assert_eq!(h, h.to_lowercase());
    }
}
