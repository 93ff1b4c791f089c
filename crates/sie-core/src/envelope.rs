//! The signed instruction envelope.
//!
//! An envelope wraps instructional content (typically a `SKILL.md`) together
//! with its issuer, declared scope and constraints. The signature covers the
//! canonical JSON of every field except `signature` and `public_key`, so key
//! material can travel beside the signed region without being part of it.
//!
//! Only an envelope whose `channel` is `"instruction"` may ever influence
//! trusted behavior; anything else is data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::canonical::{canonicalize, canonicalize_value};
use crate::crypto::{sha256_text, utc_now_iso, verify_bytes, KeyPair};
use crate::error::{CryptoError, InputError, VerificationError};
use crate::io;

/// Protocol version every envelope must carry.
pub const SIE_VERSION: &str = "0.1";

/// The only channel allowed to carry trusted instructions.
pub const INSTRUCTION_CHANNEL: &str = "instruction";

/// Default suffix locating an envelope beside the file it signs.
pub const ENVELOPE_SUFFIX: &str = ".sie.json";

const ENVELOPE_KIND: &str = "Envelope file";

/// Signed constraints.
///
/// Known keys are typed; anything else lands in `extra` and is carried
/// through untouched so newer constraint kinds never break older readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_prompt_disclosure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_external_urls: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deny_prompt_disclosure(mut self, deny: bool) -> Self {
        self.deny_prompt_disclosure = Some(deny);
        self
    }

    pub fn with_no_external_urls(mut self, deny: bool) -> Self {
        self.no_external_urls = Some(deny);
        self
    }

    pub fn with_max_output_tokens(mut self, max: i64) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Add a constraint this version does not interpret.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// `deny_prompt_disclosure`, absent meaning `false`.
    pub fn denies_prompt_disclosure(&self) -> bool {
        self.deny_prompt_disclosure.unwrap_or(false)
    }

    /// `no_external_urls`, absent meaning `false`.
    pub fn denies_external_urls(&self) -> bool {
        self.no_external_urls.unwrap_or(false)
    }
}

/// The signed instructional content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub name: String,
    pub content_type: String,
    /// Hex SHA-256 of `content` (UTF-8) at creation time.
    pub sha256: String,
    pub content: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Payload {
    /// Whether `text` hashes to the signed digest.
    pub fn digest_matches(&self, text: &str) -> bool {
        !self.sha256.is_empty() && sha256_text(text) == self.sha256
    }
}

/// A Signed Instruction Envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionEnvelope {
    pub version: String,
    pub issuer: String,
    pub issued_at: String,
    pub id: String,
    pub channel: String,
    pub scope: Vec<String>,
    pub constraints: Constraints,
    pub payload: Payload,

    /// Issuer public key, carried outside the signed region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Top-level fields this version does not know; part of the signed bytes.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl InstructionEnvelope {
    /// Build an unsigned envelope around `content`.
    pub fn new(
        issuer: impl Into<String>,
        scope: Vec<String>,
        constraints: Constraints,
        payload_name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<String>,
        public_key: Option<String>,
    ) -> Self {
        let content = content.into();
        Self {
            version: SIE_VERSION.to_string(),
            issuer: issuer.into(),
            issued_at: utc_now_iso(),
            id: uuid::Uuid::new_v4().to_string(),
            channel: INSTRUCTION_CHANNEL.to_string(),
            scope,
            constraints,
            payload: Payload {
                name: payload_name.into(),
                content_type: content_type.into(),
                sha256: sha256_text(&content),
                content,
                extra: BTreeMap::new(),
            },
            public_key: public_key.filter(|k| !k.is_empty()),
            signature: None,
            extra: BTreeMap::new(),
        }
    }

    /// Parse an envelope from JSON text.
    ///
    /// Not JSON, not an object, or missing required keys are all
    /// [`InputError`]s; no trust decision is made here.
    pub fn from_json_str(text: &str) -> Result<Self, InputError> {
        let map = io::parse_json_object(text, ENVELOPE_KIND)?;
        serde_json::from_value(Value::Object(map)).map_err(|e| InputError::Schema {
            kind: ENVELOPE_KIND,
            detail: e.to_string(),
        })
    }

    /// Load an envelope file.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let text = io::read_text(path, ENVELOPE_KIND)?;
        Self::from_json_str(&text)
    }

    /// Write the canonical form of this envelope to `path`.
    pub fn save(&self, path: &Path) -> Result<(), InputError> {
        let bytes = self.canonical_bytes().map_err(|e| InputError::Schema {
            kind: ENVELOPE_KIND,
            detail: e.to_string(),
        })?;
        io::write_bytes(path, &bytes, ENVELOPE_KIND)
    }

    /// Canonical JSON of the whole envelope, signature included.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        canonicalize(self)
    }

    /// The exact bytes covered by the signature: canonical JSON without the
    /// top-level `signature` and `public_key` fields.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.remove("signature");
            map.remove("public_key");
        }
        canonicalize_value(&value)
    }

    /// Return a signed copy of this envelope.
    pub fn sign(&self, key_pair: &KeyPair) -> Result<Self, CryptoError> {
        let signature = key_pair.sign(&self.signing_bytes()?);
        let mut signed = self.clone();
        signed.signature = Some(signature);
        Ok(signed)
    }

    /// Verify structure and signature against `public_key_b64`.
    ///
    /// Checks run in a fixed order: version, channel, signature presence,
    /// then the signature itself.
    pub fn verify(&self, public_key_b64: &str) -> Result<(), VerificationError> {
        if self.version != SIE_VERSION {
            return Err(VerificationError::InvalidVersion(self.version.clone()));
        }
        if self.channel != INSTRUCTION_CHANNEL {
            return Err(VerificationError::InvalidChannel(self.channel.clone()));
        }
        let signature = self
            .signature
            .as_deref()
            .ok_or(VerificationError::MissingSignature)?;
        let message = self
            .signing_bytes()
            .map_err(|_| VerificationError::BadSignature)?;
        verify_bytes(&message, signature, public_key_b64)?;

        debug!(issuer = %self.issuer, envelope_id = %self.id, "envelope signature verified");
        Ok(())
    }

    /// Compare the hash of `text` (UTF-8) against `payload.sha256`.
    pub fn check_content_digest(&self, text: &str) -> Result<(), VerificationError> {
        if self.payload.sha256.is_empty() {
            return Err(VerificationError::MissingPayloadDigest);
        }
        if !self.payload.digest_matches(text) {
            return Err(VerificationError::ContentHashMismatch {
                expected: self.payload.sha256.clone(),
                computed: sha256_text(text),
            });
        }
        Ok(())
    }

    /// The issuer id, rejecting an empty one.
    pub fn issuer_id(&self) -> Result<&str, VerificationError> {
        if self.issuer.trim().is_empty() {
            return Err(VerificationError::MissingIssuer);
        }
        Ok(&self.issuer)
    }

    /// Verify and, on success, consume into the trusted view.
    pub fn into_verified(
        self,
        public_key_b64: &str,
    ) -> Result<VerifiedInstructions, VerificationError> {
        self.verify(public_key_b64)?;
        Ok(VerifiedInstructions {
            issuer: self.issuer,
            envelope_id: self.id,
            scope: self.scope,
            constraints: self.constraints,
            payload_name: self.payload.name,
            content: self.payload.content,
        })
    }

    /// `<path><suffix>`, the conventional sibling envelope location.
    pub fn sibling_path(path: &Path, suffix: &str) -> std::path::PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(suffix);
        os.into()
    }
}

/// Instructions whose envelope passed signature verification.
///
/// Only obtainable through [`InstructionEnvelope::into_verified`], so holding
/// one is proof that the constraints came from the instruction channel.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedInstructions {
    issuer: String,
    envelope_id: String,
    scope: Vec<String>,
    constraints: Constraints,
    payload_name: String,
    content: String,
}

impl VerifiedInstructions {
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn envelope_id(&self) -> &str {
        &self.envelope_id
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn payload_name(&self) -> &str {
        &self.payload_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hello_envelope(kp: &KeyPair) -> InstructionEnvelope {
        InstructionEnvelope::new(
            "acme",
            vec!["read_files".into()],
            Constraints::new().with_deny_prompt_disclosure(true),
            "SKILL.md",
            "text/markdown",
            "Hello",
            Some(kp.public_key_b64()),
        )
    }

    #[test]
    fn new_envelope_fields() {
        let kp = KeyPair::generate();
        let env = hello_envelope(&kp);
        assert_eq!(env.version, SIE_VERSION);
        assert_eq!(env.channel, INSTRUCTION_CHANNEL);
        assert_eq!(env.payload.sha256, sha256_text("Hello"));
        assert!(uuid::Uuid::parse_str(&env.id).is_ok());
        assert!(env.issued_at.ends_with('Z'));
        assert!(env.signature.is_none());
    }

    #[test]
    fn sign_then_verify() {
        let kp = KeyPair::generate();
        let signed = hello_envelope(&kp).sign(&kp).unwrap();
        assert!(signed.verify(&kp.public_key_b64()).is_ok());
    }

    #[test]
    fn appended_character_breaks_signature() {
        let kp = KeyPair::generate();
        let mut signed = hello_envelope(&kp).sign(&kp).unwrap();
        signed.payload.content.push('!');
        assert_eq!(
            signed.verify(&kp.public_key_b64()),
            Err(VerificationError::BadSignature)
        );
    }

    #[test]
    fn other_key_fails() {
        let kp = KeyPair::generate();
        let other = KeyPair::generate();
        let signed = hello_envelope(&kp).sign(&kp).unwrap();
        assert_eq!(
            signed.verify(&other.public_key_b64()),
            Err(VerificationError::BadSignature)
        );
    }

    #[test]
    fn check_order_version_before_channel_before_signature() {
        let kp = KeyPair::generate();
        let mut env = hello_envelope(&kp);
        env.version = "9.9".into();
        env.channel = "data".into();
        assert_eq!(
            env.verify(&kp.public_key_b64()),
            Err(VerificationError::InvalidVersion("9.9".into()))
        );
        env.version = SIE_VERSION.into();
        assert_eq!(
            env.verify(&kp.public_key_b64()),
            Err(VerificationError::InvalidChannel("data".into()))
        );
        env.channel = INSTRUCTION_CHANNEL.into();
        assert_eq!(
            env.verify(&kp.public_key_b64()),
            Err(VerificationError::MissingSignature)
        );
    }

    #[test]
    fn public_key_outside_signed_region() {
        let kp = KeyPair::generate();
        let mut signed = hello_envelope(&kp).sign(&kp).unwrap();
        signed.public_key = None;
        assert!(signed.verify(&kp.public_key_b64()).is_ok());
        signed.public_key = Some("something-else".into());
        assert!(signed.verify(&kp.public_key_b64()).is_ok());
    }

    #[test]
    fn signing_bytes_exclude_signature_and_key() {
        let kp = KeyPair::generate();
        let signed = hello_envelope(&kp).sign(&kp).unwrap();
        let text = String::from_utf8(signed.signing_bytes().unwrap()).unwrap();
        assert!(!text.contains("\"signature\""));
        assert!(!text.contains("\"public_key\""));
        assert!(text.starts_with("{\"channel\":\"instruction\",\"constraints\":"));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let kp = KeyPair::generate();
        let mut env = hello_envelope(&kp);
        env.constraints = env
            .constraints
            .with_extra("allowed_domains", json!(["example.com"]));
        env.extra.insert("x_origin".into(), json!({"ci": true}));
        let signed = env.sign(&kp).unwrap();

        let text = String::from_utf8(signed.canonical_bytes().unwrap()).unwrap();
        let reloaded = InstructionEnvelope::from_json_str(&text).unwrap();
        assert_eq!(reloaded, signed);
        assert!(reloaded.verify(&kp.public_key_b64()).is_ok());
    }

    #[test]
    fn foreign_float_text_still_verifies() {
        let kp = KeyPair::generate();
        let mut env = hello_envelope(&kp);
        env.constraints = env.constraints.with_extra("temperature", json!(1e-7));
        env.extra.insert("x_budget".into(), json!(1e20));
        let signed = env.sign(&kp).unwrap();

        // Same envelope with floats spelled the way another implementation
        // writes them.
        let mut value = serde_json::to_value(&signed).unwrap();
        value["constraints"].as_object_mut().unwrap().remove("temperature");
        value.as_object_mut().unwrap().remove("x_budget");
        let text = serde_json::to_string_pretty(&value)
            .unwrap()
            .replacen("{", "{\"x_budget\": 1e+20, ", 1)
            .replacen("\"constraints\": {", "\"constraints\": {\"temperature\": 1e-07, ", 1);
        let reloaded = InstructionEnvelope::from_json_str(&text).unwrap();
        assert!(reloaded.verify(&kp.public_key_b64()).is_ok());
        let canonical = String::from_utf8(reloaded.signing_bytes().unwrap()).unwrap();
        assert!(canonical.contains("\"temperature\":1e-07"));
        assert!(canonical.contains("\"x_budget\":1e+20"));
    }

    #[test]
    fn external_url_constraint_defaults_off() {
        assert!(!Constraints::new().denies_external_urls());
        assert!(Constraints::new()
            .with_no_external_urls(true)
            .denies_external_urls());
    }

    #[test]
    fn missing_required_key_is_input_error() {
        let err = InstructionEnvelope::from_json_str(r#"{"version":"0.1"}"#).unwrap_err();
        assert!(matches!(err, InputError::Schema { .. }));
    }

    #[test]
    fn non_object_is_input_error() {
        let err = InstructionEnvelope::from_json_str("[1,2]").unwrap_err();
        assert!(matches!(err, InputError::NotAnObject { .. }));
    }

    #[test]
    fn content_digest_check() {
        let kp = KeyPair::generate();
        let env = hello_envelope(&kp);
        assert!(env.check_content_digest("Hello").is_ok());
        assert!(env.payload.digest_matches("Hello"));
        assert!(!env.payload.digest_matches("hello"));
        assert!(matches!(
            env.check_content_digest("Hello\n"),
            Err(VerificationError::ContentHashMismatch { .. })
        ));
        let mut no_digest = env.clone();
        no_digest.payload.sha256.clear();
        assert_eq!(
            no_digest.check_content_digest("Hello"),
            Err(VerificationError::MissingPayloadDigest)
        );
    }

    #[test]
    fn into_verified_exposes_constraints() {
        let kp = KeyPair::generate();
        let signed = hello_envelope(&kp).sign(&kp).unwrap();
        let id = signed.id.clone();
        let verified = signed.into_verified(&kp.public_key_b64()).unwrap();
        assert_eq!(verified.issuer(), "acme");
        assert_eq!(verified.envelope_id(), id);
        assert_eq!(verified.content(), "Hello");
        assert!(verified.constraints().denies_prompt_disclosure());
    }

    #[test]
    fn empty_issuer_is_missing() {
        let kp = KeyPair::generate();
        let mut env = hello_envelope(&kp);
        env.issuer = "  ".into();
        assert_eq!(env.issuer_id(), Err(VerificationError::MissingIssuer));
    }

    #[test]
    fn sibling_path_appends_suffix() {
        let p = InstructionEnvelope::sibling_path(Path::new("skills/SKILL.md"), ENVELOPE_SUFFIX);
        assert_eq!(p, Path::new("skills/SKILL.md.sie.json"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let kp = KeyPair::generate();
        let signed = hello_envelope(&kp).sign(&kp).unwrap();
        let path = dir.path().join("SKILL.md.sie.json");
        signed.save(&path).unwrap();
        let loaded = InstructionEnvelope::load(&path).unwrap();
        assert!(loaded.verify(&kp.public_key_b64()).is_ok());
    }
}
