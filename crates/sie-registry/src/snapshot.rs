//! Registry snapshot types and trust queries.
//!
//! A snapshot is an ordered list of issuer and revocation records. Queries
//! are linear scans; snapshots are small and loaded once per decision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sie_core::{utc_now_iso, VerificationError};

/// Registry format version.
pub const REGISTRY_VERSION: &str = "0.1";

/// An issuer bound to a public key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuerRecord {
    pub issuer_id: String,
    pub public_key: String,
    pub created: String,
    /// RFC 3339 expiry; `null` means no expiry.
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl IssuerRecord {
    pub fn new(issuer_id: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            public_key: public_key.into(),
            created: utc_now_iso(),
            expires: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_created(mut self, created: impl Into<String>) -> Self {
        self.created = created.into();
        self
    }

    pub fn with_expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Whether the record has expired at `now`.
    ///
    /// An expiry that does not parse counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match &self.expires {
            None => false,
            Some(expires) => match DateTime::parse_from_rfc3339(expires) {
                Ok(at) => at.with_timezone(&Utc) <= now,
                Err(_) => true,
            },
        }
    }
}

/// Revokes one specific key of an issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevocationRecord {
    pub issuer_id: String,
    pub revoked_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RevocationRecord {
    pub fn new(issuer_id: impl Into<String>, revoked_key: impl Into<String>) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            revoked_key: revoked_key.into(),
            revoked_at: None,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_revoked_at(mut self, at: impl Into<String>) -> Self {
        self.revoked_at = Some(at.into());
        self
    }
}

/// One registry entry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegistryRecord {
    Issuer(IssuerRecord),
    Revocation(RevocationRecord),
    /// A record kind this version does not understand; ignored by queries.
    #[serde(other)]
    Unknown,
}

/// The signed catalog of issuers and revocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub version: String,
    pub generated_at: String,
    #[serde(default)]
    pub records: Vec<RegistryRecord>,
}

impl RegistrySnapshot {
    pub fn new(records: Vec<RegistryRecord>) -> Self {
        Self {
            version: REGISTRY_VERSION.to_string(),
            generated_at: utc_now_iso(),
            records,
        }
    }

    /// All issuer records, in order.
    pub fn issuers(&self) -> impl Iterator<Item = &IssuerRecord> {
        self.records.iter().filter_map(|r| match r {
            RegistryRecord::Issuer(rec) => Some(rec),
            _ => None,
        })
    }

    /// All revocation records, in order.
    pub fn revocations(&self) -> impl Iterator<Item = &RevocationRecord> {
        self.records.iter().filter_map(|r| match r {
            RegistryRecord::Revocation(rec) => Some(rec),
            _ => None,
        })
    }

    /// First issuer record for `issuer_id`.
    pub fn issuer_record(&self, issuer_id: &str) -> Option<&IssuerRecord> {
        self.issuers().find(|rec| rec.issuer_id == issuer_id)
    }

    /// Public key of the first issuer record for `issuer_id`.
    ///
    /// A returned key must still be checked with [`Self::is_key_revoked`].
    pub fn issuer_public_key(&self, issuer_id: &str) -> Option<&str> {
        self.issuer_record(issuer_id)
            .map(|rec| rec.public_key.as_str())
    }

    pub fn is_issuer_present(&self, issuer_id: &str) -> bool {
        self.issuer_record(issuer_id).is_some()
    }

    /// True if any revocation matches both issuer and key, wherever it sits
    /// in the record list.
    pub fn is_key_revoked(&self, issuer_id: &str, public_key_b64: &str) -> bool {
        self.revocations()
            .any(|rec| rec.issuer_id == issuer_id && rec.revoked_key == public_key_b64)
    }

    /// The key enforcement may use for `issuer_id` at `now`.
    ///
    /// Revocation always wins over presence; expiry is checked last.
    pub fn resolve_issuer_key(
        &self,
        issuer_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&str, VerificationError> {
        let record = self
            .issuer_record(issuer_id)
            .ok_or_else(|| VerificationError::UntrustedIssuer(issuer_id.to_string()))?;
        if self.is_key_revoked(issuer_id, &record.public_key) {
            return Err(VerificationError::RevokedKey {
                issuer: issuer_id.to_string(),
            });
        }
        if record.is_expired_at(now) {
            return Err(VerificationError::IssuerExpired {
                issuer: issuer_id.to_string(),
                expires: record.expires.clone().unwrap_or_default(),
            });
        }
        Ok(&record.public_key)
    }
}
