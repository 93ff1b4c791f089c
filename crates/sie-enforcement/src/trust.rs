//! Issuer key resolution.
//!
//! Trust material is an immutable value passed into every decision. The
//! same [`IssuerTrust`] seam covers a static keyring, a verified registry
//! snapshot and a pinned key.

use std::path::Path;

use chrono::Utc;
use sie_core::VerificationError;
use sie_registry::{Keyring, RegistryClient, RegistrySnapshot};
use tracing::debug;

use crate::config::{EnforcementConfig, TrustSource};
use crate::error::Result;

/// Resolves the public key enforcement may use for an issuer.
pub trait IssuerTrust {
    /// Base64 public key for `issuer_id`, or why there is none.
    fn issuer_key(&self, issuer_id: &str) -> std::result::Result<&str, VerificationError>;
}

impl IssuerTrust for Keyring {
    fn issuer_key(&self, issuer_id: &str) -> std::result::Result<&str, VerificationError> {
        self.public_key(issuer_id)
            .ok_or_else(|| VerificationError::UntrustedIssuer(issuer_id.to_string()))
    }
}

impl IssuerTrust for RegistrySnapshot {
    fn issuer_key(&self, issuer_id: &str) -> std::result::Result<&str, VerificationError> {
        self.resolve_issuer_key(issuer_id, Utc::now())
    }
}

/// A single key trusted for every issuer, e.g. an explicit `--pubkey`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedKey(pub String);

impl IssuerTrust for PinnedKey {
    fn issuer_key(&self, _issuer_id: &str) -> std::result::Result<&str, VerificationError> {
        Ok(&self.0)
    }
}

/// Trust material loaded from a [`TrustSource`].
#[derive(Debug, Clone)]
pub enum TrustMaterial {
    Keyring(Keyring),
    Registry(RegistrySnapshot),
}

impl TrustMaterial {
    /// Load from `source`; relative paths resolve against `base_dir`.
    pub fn load(source: &TrustSource, base_dir: Option<&Path>) -> Result<Self> {
        let resolve = |p: &Path| match base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        };
        match source {
            TrustSource::Keyring { path } => {
                let path = resolve(path);
                debug!(path = %path.display(), "loading issuer keyring");
                Ok(Self::Keyring(Keyring::load(&path)?))
            }
            TrustSource::Registry { dir } => {
                let dir = resolve(dir);
                debug!(dir = %dir.display(), "loading issuer registry");
                Ok(Self::Registry(RegistryClient::new(dir).load_verified_snapshot()?))
            }
        }
    }

    /// Load the trust source named by `config`.
    pub fn from_config(config: &EnforcementConfig) -> Result<Self> {
        Self::load(&config.trust, config.base_dir.as_deref())
    }
}

impl IssuerTrust for TrustMaterial {
    fn issuer_key(&self, issuer_id: &str) -> std::result::Result<&str, VerificationError> {
        match self {
            Self::Keyring(keyring) => keyring.issuer_key(issuer_id),
            Self::Registry(snapshot) => snapshot.issuer_key(issuer_id),
        }
    }
}
