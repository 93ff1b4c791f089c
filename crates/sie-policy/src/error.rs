use sie_core::VerificationError;
use thiserror::Error;

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors raised before any content is screened.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Constraints may only come from the instruction channel.
    #[error("Not an instruction envelope (channel '{channel}')")]
    NotInstructionChannel { channel: String },

    #[error(transparent)]
    Verification(#[from] VerificationError),
}
