#![deny(unsafe_code)]
//! # sie-registry
//!
//! Trust material for SIE verification.
//!
//! ## Registry trust chain
//!
//! ```text
//! records --> canonical JSON --> root signature --> registry/{registry.json, registry.sig,
//!                                                             registry_root_public_key.b64}
//! ```
//!
//! The registry root key is separate from every issuer key. Loading verifies
//! the root signature over the raw `registry.json` bytes before parsing.
//! Revocation records are authoritative: a present issuer record never
//! overrides a matching revocation, whatever the record order.
//!
//! ## Key Types
//!
//! - [`RegistrySnapshot`] — verified catalog with issuer/revocation queries
//! - [`RegistryBuilder`] / [`build`] — produce signed [`RegistryArtifacts`]
//! - [`RegistryClient`] — load and verify a registry directory
//! - [`Keyring`] — static issuer id → public key map

pub mod builder;
pub mod client;
pub mod error;
pub mod keyring;
pub mod snapshot;

pub use builder::{
    build, sign_snapshot, RegistryArtifacts, RegistryBuilder, REGISTRY_FILE,
    ROOT_PUBLIC_KEY_FILE, SIGNATURE_FILE,
};
pub use client::{verify_snapshot_bytes, RegistryClient, DEFAULT_REGISTRY_DIR};
pub use error::{RegistryError, Result};
pub use keyring::{Keyring, DEFAULT_KEYRING_FILE};
pub use snapshot::{
    IssuerRecord, RegistryRecord, RegistrySnapshot, RevocationRecord, REGISTRY_VERSION,
};
