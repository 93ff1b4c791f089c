//! Ed25519 key pairs, detached signatures, SHA-256 digests and base64 helpers.
//!
//! Keys and signatures travel as standard base64: public keys are the 32-byte
//! verifying key, private keys are the 32-byte seed.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{CryptoError, VerificationError};

/// Length of an Ed25519 public key / private seed in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of an Ed25519 signature in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Encode bytes as standard base64.
pub fn b64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard base64, ignoring surrounding whitespace.
pub fn b64_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    Ok(STANDARD.decode(text.trim())?)
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Lowercase hex SHA-256 of the UTF-8 encoding of `text`.
pub fn sha256_text(text: &str) -> String {
    sha256_hex(text.as_bytes())
}

/// Current UTC time, second precision, `Z` suffix (`2026-02-07T00:00:00Z`).
pub fn utc_now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// An Ed25519 key pair.
///
/// The private seed never leaves this type except through
/// [`KeyPair::private_key_b64`], which hands it back in a zeroizing buffer.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut rand::rngs::OsRng),
        }
    }

    /// Rebuild a key pair from a base64 private seed.
    pub fn from_private_key_b64(private_key_b64: &str) -> Result<Self, CryptoError> {
        let bytes = Zeroizing::new(b64_decode(private_key_b64)?);
        let seed: [u8; KEY_LENGTH] =
            bytes.as_slice().try_into().map_err(|_| CryptoError::KeyLength {
                expected: KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    /// Base64 public (verifying) key.
    pub fn public_key_b64(&self) -> String {
        b64_encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Base64 private seed. Keep secret.
    pub fn private_key_b64(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.signing_key.to_bytes());
        Zeroizing::new(b64_encode(seed.as_slice()))
    }

    /// Detached base64 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> String {
        b64_encode(&self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_b64())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Decode a base64 Ed25519 public key.
pub fn decode_public_key(public_key_b64: &str) -> Result<VerifyingKey, VerificationError> {
    let bytes = b64_decode(public_key_b64)
        .map_err(|e| VerificationError::InvalidPublicKey(e.to_string()))?;
    let raw: [u8; KEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
        VerificationError::InvalidPublicKey(format!(
            "expected {} bytes, got {}",
            KEY_LENGTH,
            bytes.len()
        ))
    })?;
    VerifyingKey::from_bytes(&raw).map_err(|e| VerificationError::InvalidPublicKey(e.to_string()))
}

/// Verify a detached base64 signature over `message`.
///
/// An undecodable or wrong-length signature is a bad signature; an
/// undecodable public key is reported separately.
pub fn verify_bytes(
    message: &[u8],
    signature_b64: &str,
    public_key_b64: &str,
) -> Result<(), VerificationError> {
    let verifying_key = decode_public_key(public_key_b64)?;
    let sig_bytes = b64_decode(signature_b64).map_err(|_| VerificationError::BadSignature)?;
    if sig_bytes.len() != SIGNATURE_LENGTH {
        return Err(VerificationError::BadSignature);
    }
    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| VerificationError::BadSignature)?;
    verifying_key
        .verify(message, &signature)
        .map_err(|_| VerificationError::BadSignature)
}
