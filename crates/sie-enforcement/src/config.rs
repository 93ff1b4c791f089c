//! Enforcement configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sie_core::{io, InputError, ENVELOPE_SUFFIX};
use sie_registry::{DEFAULT_KEYRING_FILE, DEFAULT_REGISTRY_DIR};

const CONFIG_KIND: &str = "Enforcement config";

/// How unsigned skills are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Unsigned skills load with a warning.
    Warn,
    /// Unsigned skills are rejected.
    Strict,
}

/// Where issuer keys come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrustSource {
    /// Static keyring file.
    Keyring {
        #[serde(default = "default_keyring_path")]
        path: PathBuf,
    },
    /// Root-signed registry directory.
    Registry {
        #[serde(default = "default_registry_dir")]
        dir: PathBuf,
    },
}

impl Default for TrustSource {
    fn default() -> Self {
        Self::Keyring {
            path: default_keyring_path(),
        }
    }
}

/// Skill admission configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Master switch; everything is allowed when off.
    #[serde(default)]
    pub enabled: bool,

    /// Reject unsigned skills instead of warning.
    #[serde(default)]
    pub strict: bool,

    /// Envelope location is `<skill path><suffix>`.
    #[serde(default = "default_envelope_suffix", alias = "envelopeSuffix")]
    pub envelope_suffix: String,

    /// Compare the skill file text against the signed payload digest.
    #[serde(default = "default_true", alias = "checkContentHash")]
    pub check_content_hash: bool,

    /// Relative skill and trust paths resolve against this directory.
    #[serde(default, alias = "baseDir", skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    #[serde(default, alias = "trustedIssuerSource")]
    pub trust: TrustSource,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strict: false,
            envelope_suffix: default_envelope_suffix(),
            check_content_hash: true,
            base_dir: None,
            trust: TrustSource::default(),
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_envelope_suffix() -> String {
    ENVELOPE_SUFFIX.to_string()
}

fn default_keyring_path() -> PathBuf {
    PathBuf::from(DEFAULT_KEYRING_FILE)
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_DIR)
}

impl EnforcementConfig {
    /// Enabled, warn mode, default keyring.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_trust(mut self, trust: TrustSource) -> Self {
        self.trust = trust;
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_check_content_hash(mut self, check: bool) -> Self {
        self.check_content_hash = check;
        self
    }

    pub fn mode(&self) -> EnforcementMode {
        if self.strict {
            EnforcementMode::Strict
        } else {
            EnforcementMode::Warn
        }
    }

    /// Resolve `path` against `base_dir` when it is relative.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Envelope path for a (resolved) skill path.
    pub fn envelope_path(&self, skill_path: &Path) -> PathBuf {
        sie_core::InstructionEnvelope::sibling_path(skill_path, &self.envelope_suffix)
    }

    /// Parse TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, InputError> {
        toml::from_str(text).map_err(|e| InputError::Schema {
            kind: CONFIG_KIND,
            detail: e.to_string(),
        })
    }

    /// Parse JSON configuration; the top level must be an object.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let map = io::parse_json_object(text, CONFIG_KIND)?;
        serde_json::from_value(Value::Object(map)).map_err(|e| InputError::Schema {
            kind: CONFIG_KIND,
            detail: e.to_string(),
        })
    }

    /// Load from a `.toml` file, or JSON for any other extension.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = io::read_text(path, CONFIG_KIND)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml_str(&text)
        } else {
            Self::from_json_str(&text)
        }
    }
}
