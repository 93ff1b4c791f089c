//! CLI error types

use sie_core::{CryptoError, InputError, SieError, VerificationError};
use sie_enforcement::EnforcementError;
use sie_policy::PolicyError;
use sie_registry::RegistryError;
use thiserror::Error;

/// Exit code for a verification or trust failure.
pub const EXIT_VERIFY_FAIL: u8 = 2;

/// Exit code for missing or malformed input.
pub const EXIT_INPUT_ERROR: u8 = 3;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Enforcement(#[from] EnforcementError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Invalid key material: {0}")]
    Crypto(#[from] CryptoError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<SieError> for CliError {
    fn from(err: SieError) -> Self {
        match err {
            SieError::Input(e) => Self::Input(e),
            SieError::Verification(e) => Self::Verification(e),
            SieError::Crypto(e) => Self::Crypto(e),
        }
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Input(_) | Self::Crypto(_) | Self::InvalidInput(_) => EXIT_INPUT_ERROR,
            Self::Verification(_) | Self::Policy(_) => EXIT_VERIFY_FAIL,
            Self::Registry(RegistryError::MissingRegistryFiles { .. })
            | Self::Registry(RegistryError::Input(_))
            | Self::Registry(RegistryError::Crypto(_)) => EXIT_INPUT_ERROR,
            Self::Registry(_) => EXIT_VERIFY_FAIL,
            Self::Enforcement(e) if e.is_input() => EXIT_INPUT_ERROR,
            Self::Enforcement(_) => EXIT_VERIFY_FAIL,
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
