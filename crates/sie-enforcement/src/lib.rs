#![deny(unsafe_code)]
//! # sie-enforcement
//!
//! Loader-time enforcement: decides whether a skill file may be loaded,
//! based on its sibling `*.sie.json` envelope and the configured trust
//! source.
//!
//! ## Decision order
//!
//! | # | Condition | Code | Allowed |
//! |---|-----------|------|---------|
//! | 1 | enforcement disabled | `SIE_DISABLED` | yes |
//! | 2 | skill file missing | `SKILL_NOT_FOUND` | no |
//! | 3 | no envelope, warn mode | `UNSIGNED_WARN` | yes |
//! | 4 | no envelope, strict mode | `UNSIGNED_STRICT` | no |
//! | 5 | verification failed | `VERIFY_FAILED` | no |
//! | 6 | verification passed | `VERIFIED` | yes |
//!
//! Anything else fails closed as `VERIFY_FAILED`.
//!
//! ## Key Types
//!
//! - [`EnforcementConfig`] — serde config (TOML or JSON)
//! - [`EnforcementDecision`] / [`ReasonCode`] — decision outcome
//! - [`IssuerTrust`] — key resolution over [`sie_registry::Keyring`],
//!   [`sie_registry::RegistrySnapshot`] or a [`PinnedKey`]
//! - [`load_skill_text`] / [`load_verified_instructions`] — loader flows

pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod loader;
pub mod rules;
pub mod trust;

pub use config::{EnforcementConfig, EnforcementMode, TrustSource};
pub use decision::{EnforcementDecision, ReasonCode};
pub use engine::{enforce_skill, evaluate_skill};
pub use error::{EnforcementError, EnforcementRejection, Result};
pub use loader::{load_skill_text, load_verified_instructions};
pub use rules::{DecisionFacts, Rule, Verification, RULES};
pub use trust::{IssuerTrust, PinnedKey, TrustMaterial};
