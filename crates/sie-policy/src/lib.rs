#![deny(unsafe_code)]
//! # sie-policy
//!
//! Applies signed constraints to untrusted data. Constraints come from a
//! verified instruction envelope; the untrusted text is only ever screened,
//! never obeyed.
//!
//! ## Key Types
//!
//! - [`ContentPolicyGate`] — screens input, returns a [`PolicyDecision`]
//! - [`DisclosureDetector`] — pluggable detection; [`SubstringDetector`] is the default
//! - [`require_instruction_channel`] — rejects non-instruction envelopes

pub mod channel;
pub mod error;
pub mod gate;
pub mod patterns;

pub use channel::require_instruction_channel;
pub use error::{PolicyError, Result};
pub use gate::{
    evaluate_untrusted_input, ContentPolicyGate, PolicyDecision, ALLOW_REASON, REJECT_REASON,
};
pub use patterns::{DisclosureDetector, SubstringDetector, DEFAULT_DISCLOSURE_PATTERNS};
