//! Static trusted-issuer keyring.
//!
//! A keyring is a JSON object mapping issuer id to base64 public key:
//!
//! ```json
//! {"palxislabs": "q0Fv...="}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use sie_core::{canonicalize, io, InputError};

/// Default keyring location.
pub const DEFAULT_KEYRING_FILE: &str = "trusted_issuers.json";

const KEYRING_KIND: &str = "Trusted issuer file";

/// Issuer id to base64 public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyring {
    issuers: BTreeMap<String, String>,
}

impl Keyring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issuer(
        mut self,
        issuer_id: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        self.insert(issuer_id, public_key);
        self
    }

    pub fn insert(&mut self, issuer_id: impl Into<String>, public_key: impl Into<String>) {
        self.issuers.insert(issuer_id.into(), public_key.into());
    }

    /// Parse keyring JSON. Anything but an object of strings is an input error.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let map = io::parse_json_object(text, KEYRING_KIND)?;
        let mut issuers = BTreeMap::new();
        for (issuer_id, value) in map {
            match value {
                Value::String(key) => {
                    issuers.insert(issuer_id, key);
                }
                other => {
                    return Err(InputError::Schema {
                        kind: KEYRING_KIND,
                        detail: format!(
                            "issuer '{}' must map to a base64 string, found {}",
                            issuer_id, other
                        ),
                    })
                }
            }
        }
        Ok(Self { issuers })
    }

    /// Load a keyring file.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = io::read_text(path, KEYRING_KIND)?;
        Self::from_json_str(&text)
    }

    /// Write the keyring as canonical JSON.
    pub fn save(&self, path: &Path) -> Result<(), InputError> {
        let bytes = canonicalize(&self.issuers)?;
        io::write_bytes(path, &bytes, KEYRING_KIND)
    }

    /// The trusted key for `issuer_id`, if any. Empty keys count as absent.
    pub fn public_key(&self, issuer_id: &str) -> Option<&str> {
        self.issuers
            .get(issuer_id)
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }

    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }

    pub fn issuer_ids(&self) -> impl Iterator<Item = &str> {
        self.issuers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_of_strings() {
        let ring = Keyring::from_json_str(r#"{"acme":"KEY1","beta":"KEY2"}"#).unwrap();
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.public_key("acme"), Some("KEY1"));
        assert_eq!(ring.public_key("nobody"), None);
        assert_eq!(ring.issuer_ids().collect::<Vec<_>>(), ["acme", "beta"]);
    }

    #[test]
    fn empty_object_is_valid_and_trusts_nobody() {
        let ring = Keyring::from_json_str("{}").unwrap();
        assert!(ring.is_empty());
        assert_eq!(ring.public_key("acme"), None);
    }

    #[test]
    fn array_is_rejected() {
        let err = Keyring::from_json_str("[]").unwrap_err();
        assert!(err.to_string().to_lowercase().contains("must be a json object"));
    }

    #[test]
    fn non_string_value_rejected() {
        let err = Keyring::from_json_str(r#"{"acme": 42}"#).unwrap_err();
        assert!(matches!(err, InputError::Schema { .. }));
    }

    #[test]
    fn empty_key_counts_as_absent() {
        let ring = Keyring::new().with_issuer("acme", "");
        assert_eq!(ring.public_key("acme"), None);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_KEYRING_FILE);
        let ring = Keyring::new().with_issuer("acme", "KEY1");
        ring.save(&path).unwrap();
        assert_eq!(Keyring::load(&path).unwrap(), ring);
    }

    #[test]
    fn missing_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Keyring::load(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(err, InputError::NotFound { .. }));
    }
}
