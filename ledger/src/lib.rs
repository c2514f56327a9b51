// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # LUMEN — Data Availability Attestation Ledger
//!
//! LUMEN persists data-availability attestations for rollup batches: who
//! published a blob, the KZG commitment that pins its contents, the signers
//! who vouched for it, and — the part that actually matters — a hash chain
//! that welds every record to the one before it. Tamper with a row and every
//! descendant's state hash stops matching. That's the whole trick.
//!
//! LUMEN does *not* compute KZG commitments, verify attestation signatures,
//! or talk to a network. It carries opaque curve points, stores opaque
//! signatures, and answers lookups. Cryptographic ambition lives elsewhere.
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the actual concerns of an
//! attestation ledger:
//!
//! - **commitment** — The BN254 commitment codec. Curve point in, fixed
//!   64 bytes out, and back again with full validation.
//! - **record** — The attestation model and the row codec: every field
//!   enumerated, every decode failure loud.
//! - **ledger** — The append/lookup/delete surface and the chaining rule.
//!   The only place chain invariants are enforced.
//! - **hash** — The two digest functions we allow ourselves.
//! - **error** — One error enum, `thiserror`, no surprises.
//! - **config** — Byte widths and protocol constants. All of them.
//!
//! ## Design Philosophy
//!
//! 1. The chain tail is threaded through arguments, never ambient state.
//!    If two writers race, the API shape makes the crime visible.
//! 2. Batches land atomically or not at all. Partial chains are how you
//!    end up explaining yourself in a post-mortem.
//! 3. Every byte that hits disk is lowercase hex or big-endian. Sortable,
//!    greppable, boring. Boring is a feature in storage code.

pub mod commitment;
pub mod config;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod record;

pub use commitment::KzgCommitment;
pub use error::{LedgerError, LedgerResult};
pub use ledger::{next_state_hash, Ledger};
pub use record::{
    decode_hex, decode_hex_fixed, encode_hex, Address, DaRecord, DaSummary, LedgerRecord,
};
