//! SIE CLI - Signed Instruction Envelope tools
//!
//! - Generate issuer keys and sign instruction files
//! - Verify envelopes against a keyring, a registry or a pinned key
//! - Build and verify root-signed issuer registries
//! - Run loader-time skill checks and screen untrusted input
//!
//! Exit codes: 0 ok, 2 verification failure or refusal, 3 input error.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod keys;

use commands::{check_skill, keygen, registry, screen, sign, verify, Outcome};
use error::CliError;

/// SIE CLI application
#[derive(Parser)]
#[command(name = "sie")]
#[command(about = "SIE - Signed Instruction Envelope tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Generate an Ed25519 issuer keypair
    Keygen(keygen::KeygenArgs),

    /// Sign an instruction file into a .sie.json envelope
    Sign(sign::SignArgs),

    /// Verify a .sie.json envelope
    Verify(verify::VerifyArgs),

    /// Build or verify an issuer registry
    Registry {
        #[command(subcommand)]
        command: registry::RegistryCommands,
    },

    /// Decide whether a skill file may load
    CheckSkill(check_skill::CheckSkillArgs),

    /// Screen untrusted input against signed constraints
    Screen(screen::ScreenArgs),
}

fn run(command: Commands) -> anyhow::Result<Outcome> {
    let outcome = match command {
        Commands::Keygen(args) => keygen::execute(args)?,
        Commands::Sign(args) => sign::execute(args)?,
        Commands::Verify(args) => verify::execute(args)?,
        Commands::Registry { command } => registry::execute(command)?,
        Commands::CheckSkill(args) => check_skill::execute(args)?,
        Commands::Screen(args) => screen::execute(args)?,
    };
    Ok(outcome)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    match run(cli.command) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            println!("[FAIL] {}", err);
            let code = err
                .downcast_ref::<CliError>()
                .map(CliError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
