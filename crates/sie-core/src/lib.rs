#![deny(unsafe_code)]
//! # sie-core
//!
//! Foundation of the Signed Instruction Envelope (SIE) protocol: the
//! canonical JSON codec, Ed25519 signing primitives and the envelope model.
//!
//! ## Signing flow
//!
//! ```text
//! content --> InstructionEnvelope::new --> sign(KeyPair) --> *.sie.json
//! *.sie.json --> load --> verify(public key) --> VerifiedInstructions
//! ```
//!
//! The signature covers `canonicalize(envelope - {signature, public_key})`.
//! Canonical form sorts keys at every level and uses no whitespace, so any
//! two logically equal envelopes sign to the same bytes.
//!
//! ## Key Types
//!
//! - [`InstructionEnvelope`] — the signed schema
//! - [`Constraints`] — typed known constraints plus pass-through extras
//! - [`VerifiedInstructions`] — only produced by successful verification
//! - [`KeyPair`] — Ed25519 key pair with base64 rendering
//! - [`InputError`] / [`VerificationError`] — caller mistakes vs. trust failures

pub mod canonical;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod io;

pub use canonical::{canonical_string, canonicalize, canonicalize_value};
pub use crypto::{
    b64_decode, b64_encode, decode_public_key, sha256_hex, sha256_text, utc_now_iso,
    verify_bytes, KeyPair,
};
pub use envelope::{
    Constraints, InstructionEnvelope, Payload, VerifiedInstructions, ENVELOPE_SUFFIX,
    INSTRUCTION_CHANNEL, SIE_VERSION,
};
pub use error::{CryptoError, InputError, Result, SieError, VerificationError};
