//! CLI command implementations

use std::path::PathBuf;

use clap::Args;
use sie_enforcement::{IssuerTrust, PinnedKey, TrustMaterial, TrustSource};
use sie_registry::DEFAULT_KEYRING_FILE;

use crate::error::{CliResult, EXIT_VERIFY_FAIL};

pub mod check_skill;
pub mod keygen;
pub mod registry;
pub mod screen;
pub mod sign;
pub mod verify;

/// Non-error result of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran but the answer was "no" (rejected, blocked).
    Refused,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Refused => EXIT_VERIFY_FAIL,
        }
    }
}

/// Where issuer keys come from. Precedence: `--pubkey`, then `--registry`,
/// then the keyring.
#[derive(Args, Debug, Clone)]
pub struct TrustArgs {
    /// Public key (base64) override; skips issuer lookup
    #[arg(long)]
    pub pubkey: Option<String>,

    /// Trusted issuer keyring (JSON object issuer -> base64 key)
    #[arg(long, default_value = DEFAULT_KEYRING_FILE)]
    pub trusted_issuers: PathBuf,

    /// Registry directory to resolve issuers from instead of the keyring
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

impl TrustArgs {
    pub fn load(&self) -> CliResult<Box<dyn IssuerTrust>> {
        if let Some(pubkey) = &self.pubkey {
            return Ok(Box::new(PinnedKey(pubkey.trim().to_string())));
        }
        let source = match &self.registry {
            Some(dir) => TrustSource::Registry { dir: dir.clone() },
            None => TrustSource::Keyring {
                path: self.trusted_issuers.clone(),
            },
        };
        Ok(Box::new(TrustMaterial::load(&source, None)?))
    }
}
