//! Envelope verification

use std::path::PathBuf;

use clap::Args;
use sie_enforcement::load_verified_instructions;
use tracing::info;

use crate::commands::{Outcome, TrustArgs};
use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Envelope file (.sie.json)
    #[arg(long)]
    pub file: PathBuf,

    /// External file to hash-check against payload.sha256
    #[arg(long)]
    pub check_file: Option<PathBuf>,

    #[command(flatten)]
    pub trust: TrustArgs,
}

pub fn execute(args: VerifyArgs) -> CliResult<Outcome> {
    let trust = args.trust.load()?;
    let verified =
        load_verified_instructions(&args.file, trust.as_ref(), args.check_file.as_deref())?;
    info!(
        issuer = %verified.issuer(),
        envelope_id = %verified.envelope_id(),
        "envelope verified"
    );
    println!("[OK] Signature verified and basic checks passed.");
    Ok(Outcome::Success)
}
