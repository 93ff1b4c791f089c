//! Building and signing registry snapshots.

use std::path::Path;

use sie_core::{canonicalize, io, KeyPair};
use tracing::info;

use crate::client::verify_snapshot_bytes;
use crate::error::Result;
use crate::snapshot::{IssuerRecord, RegistryRecord, RegistrySnapshot, RevocationRecord};

/// File holding the canonical snapshot bytes.
pub const REGISTRY_FILE: &str = "registry.json";

/// File holding the detached base64 root signature.
pub const SIGNATURE_FILE: &str = "registry.sig";

/// File holding the base64 registry-root public key.
pub const ROOT_PUBLIC_KEY_FILE: &str = "registry_root_public_key.b64";

/// The three artifacts a registry build produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryArtifacts {
    /// Canonical JSON of `{version, generated_at, records}`.
    pub snapshot_bytes: Vec<u8>,
    /// Root signature over exactly `snapshot_bytes`.
    pub signature_b64: String,
    pub root_public_key_b64: String,
}

impl RegistryArtifacts {
    /// Write `registry.json`, `registry.sig` and `registry_root_public_key.b64`
    /// into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir).map_err(|source| sie_core::InputError::Write {
            kind: "Registry directory",
            path: dir.to_path_buf(),
            source,
        })?;
        io::write_bytes(&dir.join(REGISTRY_FILE), &self.snapshot_bytes, "Registry snapshot")?;
        io::write_bytes(
            &dir.join(SIGNATURE_FILE),
            self.signature_b64.as_bytes(),
            "Registry signature",
        )?;
        io::write_bytes(
            &dir.join(ROOT_PUBLIC_KEY_FILE),
            self.root_public_key_b64.as_bytes(),
            "Registry root public key",
        )?;
        Ok(())
    }

    /// Verify the artifacts against themselves and parse the snapshot.
    pub fn verify(&self) -> Result<RegistrySnapshot> {
        verify_snapshot_bytes(
            &self.snapshot_bytes,
            &self.signature_b64,
            &self.root_public_key_b64,
        )
    }
}

/// Sign `records` with the registry root key.
///
/// The root key must be distinct from every issuer key: a compromised issuer
/// key must not be able to forge registry entries.
pub fn build(records: Vec<RegistryRecord>, root: &KeyPair) -> Result<RegistryArtifacts> {
    sign_snapshot(&RegistrySnapshot::new(records), root)
}

/// Sign an already-assembled snapshot.
pub fn sign_snapshot(snapshot: &RegistrySnapshot, root: &KeyPair) -> Result<RegistryArtifacts> {
    let snapshot_bytes = canonicalize(snapshot)?;
    let signature_b64 = root.sign(&snapshot_bytes);

    info!(
        records = snapshot.records.len(),
        generated_at = %snapshot.generated_at,
        "registry snapshot signed"
    );

    Ok(RegistryArtifacts {
        snapshot_bytes,
        signature_b64,
        root_public_key_b64: root.public_key_b64(),
    })
}

/// Incremental builder for registry snapshots.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    records: Vec<RegistryRecord>,
    generated_at: Option<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(mut self, record: IssuerRecord) -> Self {
        self.records.push(RegistryRecord::Issuer(record));
        self
    }

    pub fn revoke(mut self, record: RevocationRecord) -> Self {
        self.records.push(RegistryRecord::Revocation(record));
        self
    }

    /// Pin `generated_at` instead of using the current time.
    pub fn generated_at(mut self, at: impl Into<String>) -> Self {
        self.generated_at = Some(at.into());
        self
    }

    pub fn snapshot(self) -> RegistrySnapshot {
        let mut snapshot = RegistrySnapshot::new(self.records);
        if let Some(at) = self.generated_at {
            snapshot.generated_at = at;
        }
        snapshot
    }

    pub fn build(self, root: &KeyPair) -> Result<RegistryArtifacts> {
        sign_snapshot(&self.snapshot(), root)
    }
}
