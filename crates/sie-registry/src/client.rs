//! Loading and verifying a registry directory.

use std::path::{Path, PathBuf};

use sie_core::{io, verify_bytes, VerificationError};
use tracing::{debug, warn};

use crate::builder::{REGISTRY_FILE, ROOT_PUBLIC_KEY_FILE, SIGNATURE_FILE};
use crate::error::{RegistryError, Result};
use crate::snapshot::RegistrySnapshot;

/// Default registry directory.
pub const DEFAULT_REGISTRY_DIR: &str = "registry";

/// Verify a detached root signature over raw snapshot bytes, then parse.
///
/// The signature is checked over the bytes exactly as stored, before any
/// parsing. A root key that does not decode fails the same way as a bad
/// signature.
pub fn verify_snapshot_bytes(
    snapshot_bytes: &[u8],
    signature_b64: &str,
    root_public_key_b64: &str,
) -> Result<RegistrySnapshot> {
    match verify_bytes(snapshot_bytes, signature_b64.trim(), root_public_key_b64.trim()) {
        Ok(()) => {}
        Err(VerificationError::InvalidPublicKey(detail)) => {
            warn!(%detail, "registry root public key does not decode");
            return Err(RegistryError::InvalidRegistrySignature);
        }
        Err(_) => {
            warn!("registry root signature mismatch");
            return Err(RegistryError::InvalidRegistrySignature);
        }
    }
    serde_json::from_slice(snapshot_bytes).map_err(|e| RegistryError::Parse(e.to_string()))
}

/// Reads the three registry artifacts from a directory.
///
/// Every call to [`RegistryClient::load_verified_snapshot`] re-reads the
/// files; callers needing one consistent view should load once and query the
/// returned [`RegistrySnapshot`].
#[derive(Debug, Clone)]
pub struct RegistryClient {
    registry_dir: PathBuf,
}

impl Default for RegistryClient {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_DIR)
    }
}

impl RegistryClient {
    pub fn new(registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
        }
    }

    pub fn registry_dir(&self) -> &Path {
        &self.registry_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.registry_dir.join(REGISTRY_FILE)
    }

    pub fn signature_path(&self) -> PathBuf {
        self.registry_dir.join(SIGNATURE_FILE)
    }

    pub fn root_public_key_path(&self) -> PathBuf {
        self.registry_dir.join(ROOT_PUBLIC_KEY_FILE)
    }

    /// Load, verify and parse the snapshot.
    pub fn load_verified_snapshot(&self) -> Result<RegistrySnapshot> {
        let paths = [
            (REGISTRY_FILE, self.snapshot_path()),
            (SIGNATURE_FILE, self.signature_path()),
            (ROOT_PUBLIC_KEY_FILE, self.root_public_key_path()),
        ];
        let missing: Vec<String> = paths
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::MissingRegistryFiles {
                dir: self.registry_dir.clone(),
                missing,
            });
        }

        let snapshot_bytes = io::read_bytes(&paths[0].1, "Registry snapshot")?;
        let signature_b64 = io::read_text(&paths[1].1, "Registry signature")?;
        let root_public_key_b64 = io::read_text(&paths[2].1, "Registry root public key")?;

        let snapshot =
            verify_snapshot_bytes(&snapshot_bytes, &signature_b64, &root_public_key_b64)?;
        debug!(
            dir = %self.registry_dir.display(),
            records = snapshot.records.len(),
            "registry snapshot verified"
        );
        Ok(snapshot)
    }
}
