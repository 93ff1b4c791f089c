//! Screen untrusted input under verified constraints

use std::path::PathBuf;

use clap::Args;
use sie_core::io;
use sie_enforcement::load_verified_instructions;
use sie_policy::ContentPolicyGate;

use crate::commands::{Outcome, TrustArgs};
use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Signed instruction envelope supplying the constraints
    #[arg(long)]
    pub envelope: PathBuf,

    /// Untrusted input file to screen
    #[arg(long)]
    pub input: PathBuf,

    /// Extra disclosure pattern (repeatable)
    #[arg(long = "pattern")]
    pub patterns: Vec<String>,

    #[command(flatten)]
    pub trust: TrustArgs,
}

pub fn execute(args: ScreenArgs) -> CliResult<Outcome> {
    let trust = args.trust.load()?;
    let instructions = load_verified_instructions(&args.envelope, trust.as_ref(), None)?;
    let untrusted = io::read_text(&args.input, "Input file")?;

    let decision =
        ContentPolicyGate::new().evaluate_verified(&instructions, &untrusted, &args.patterns);
    if decision.allowed {
        println!("[ALLOW] {}", decision.reason);
        Ok(Outcome::Success)
    } else {
        println!("[BLOCKED] {}", decision.reason);
        Ok(Outcome::Refused)
    }
}
