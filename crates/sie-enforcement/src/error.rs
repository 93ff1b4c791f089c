use sie_core::{InputError, SieError, VerificationError};
use sie_registry::RegistryError;
use thiserror::Error;

use crate::decision::ReasonCode;

/// Result type for enforcement operations.
pub type Result<T> = std::result::Result<T, EnforcementError>;

/// A skill load refused by enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skill rejected ({reason}): {detail}")]
pub struct EnforcementRejection {
    pub reason: ReasonCode,
    pub detail: String,
}

/// Errors from enforcement and the loader flows.
#[derive(Debug, Error)]
pub enum EnforcementError {
    #[error(transparent)]
    Rejected(#[from] EnforcementRejection),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl From<SieError> for EnforcementError {
    fn from(err: SieError) -> Self {
        match err {
            SieError::Input(e) => Self::Input(e),
            SieError::Verification(e) => Self::Verification(e),
            SieError::Crypto(e) => Self::Input(InputError::Key(e)),
        }
    }
}

impl EnforcementError {
    /// True for caller mistakes (missing or malformed files).
    pub fn is_input(&self) -> bool {
        match self {
            Self::Input(_) => true,
            Self::Registry(RegistryError::Input(_)) => true,
            Self::Registry(RegistryError::MissingRegistryFiles { .. }) => true,
            _ => false,
        }
    }
}
