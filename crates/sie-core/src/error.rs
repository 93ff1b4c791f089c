use std::path::PathBuf;

use thiserror::Error;

/// Result type for operations that can fail with either an input or a trust error.
pub type Result<T> = std::result::Result<T, SieError>;

/// Errors from the low-level codec and key handling.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    KeyLength { expected: usize, actual: usize },

    #[error("canonical serialization failed: {0}")]
    Canonical(#[from] serde_json::Error),
}

/// Caller mistakes: missing files, malformed JSON, wrong document shape.
///
/// Kept apart from [`VerificationError`] so that a schema problem is never
/// reported as (or confused with) a trust failure.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{kind} not found: {}", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("{kind} could not be read: {}: {source}", path.display())]
    Read {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} could not be written: {}: {source}", path.display())]
    Write {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} is not valid JSON: {source}")]
    InvalidJson {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} must be a JSON object")]
    NotAnObject { kind: &'static str },

    #[error("{kind} has invalid structure: {detail}")]
    Schema { kind: &'static str, detail: String },

    #[error("invalid key material: {0}")]
    Key(#[from] CryptoError),
}

/// Cryptographic or trust verification failures. Always fail-closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    #[error("Missing signature")]
    MissingSignature,

    #[error("Bad signature")]
    BadSignature,

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Envelope missing issuer field")]
    MissingIssuer,

    #[error("Issuer '{0}' is not trusted.")]
    UntrustedIssuer(String),

    #[error("Issuer '{issuer}' key has been revoked")]
    RevokedKey { issuer: String },

    #[error("Issuer '{issuer}' registry record expired at {expires}")]
    IssuerExpired { issuer: String, expires: String },

    #[error("Envelope has no payload.sha256 to compare against.")]
    MissingPayloadDigest,

    #[error("External file hash does not match signed payload.sha256 (file was modified).")]
    ContentHashMismatch { expected: String, computed: String },
}

impl VerificationError {
    /// Machine-stable code for audit logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidVersion(_) => "INVALID_VERSION",
            Self::InvalidChannel(_) => "INVALID_CHANNEL",
            Self::MissingSignature => "MISSING_SIGNATURE",
            Self::BadSignature => "BAD_SIGNATURE",
            Self::InvalidPublicKey(_) => "INVALID_PUBLIC_KEY",
            Self::MissingIssuer => "MISSING_ISSUER",
            Self::UntrustedIssuer(_) => "UNTRUSTED_ISSUER",
            Self::RevokedKey { .. } => "REVOKED_KEY",
            Self::IssuerExpired { .. } => "ISSUER_EXPIRED",
            Self::MissingPayloadDigest => "MISSING_PAYLOAD_DIGEST",
            Self::ContentHashMismatch { .. } => "CONTENT_HASH_MISMATCH",
        }
    }
}

/// Umbrella error for flows that load and then verify.
#[derive(Debug, Error)]
pub enum SieError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl SieError {
    /// True when the failure is a trust failure rather than a caller mistake.
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::Verification(_))
    }
}
