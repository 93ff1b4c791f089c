//! Loader-time skill check

use std::path::PathBuf;

use clap::Args;
use sie_enforcement::{enforce_skill, EnforcementConfig};

use crate::commands::Outcome;
use crate::error::CliResult;

#[derive(Args, Debug)]
pub struct CheckSkillArgs {
    /// Skill file to check
    #[arg(long)]
    pub skill: PathBuf,

    /// Enforcement config (.toml, or JSON for any other extension)
    #[arg(long)]
    pub config: PathBuf,

    /// Print the decision as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: CheckSkillArgs) -> CliResult<Outcome> {
    let config = EnforcementConfig::load(&args.config)?;
    let decision = enforce_skill(&args.skill, &config);

    if args.json {
        match serde_json::to_string(&decision) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{:?}", decision),
        }
    } else {
        let verdict = if decision.allowed { "ALLOW" } else { "REJECT" };
        println!("{} {}: {}", verdict, decision.reason, decision.detail);
    }

    Ok(if decision.allowed {
        Outcome::Success
    } else {
        Outcome::Refused
    })
}
