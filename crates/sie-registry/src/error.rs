use std::path::PathBuf;

use sie_core::{CryptoError, InputError};
use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from building, loading or verifying a registry snapshot.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry files missing in {}: {}", dir.display(), missing.join(", "))]
    MissingRegistryFiles { dir: PathBuf, missing: Vec<String> },

    #[error("Registry signature invalid")]
    InvalidRegistrySignature,

    #[error("registry snapshot is not valid: {0}")]
    Parse(String),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
