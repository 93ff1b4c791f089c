//! Registry build and verification

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use sie_core::io;
use sie_registry::{
    IssuerRecord, RegistryBuilder, RegistryClient, RevocationRecord, DEFAULT_REGISTRY_DIR,
    REGISTRY_FILE, ROOT_PUBLIC_KEY_FILE, SIGNATURE_FILE,
};

use crate::commands::Outcome;
use crate::error::{CliError, CliResult};
use crate::keys::{generate_keyfile, load_keyfile};

/// Registry subcommands
#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    /// Build and sign a registry snapshot
    Build(BuildArgs),

    /// Verify a registry snapshot signature
    Verify {
        /// Registry directory
        #[arg(long, default_value = DEFAULT_REGISTRY_DIR)]
        dir: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Output directory
    #[arg(long, default_value = DEFAULT_REGISTRY_DIR)]
    pub outdir: PathBuf,

    /// Issuer id of the issuer record
    #[arg(long, default_value = "palxislabs")]
    pub issuer_id: String,

    /// Issuer public key file (base64)
    #[arg(long, default_value = ".sie_private_key.b64.pub")]
    pub issuer_pubkey_file: PathBuf,

    /// Display name stored in the issuer metadata
    #[arg(long)]
    pub issuer_name: Option<String>,

    /// RFC 3339 expiry for the issuer record
    #[arg(long)]
    pub expires: Option<String>,

    /// Revoke a key: <issuer>=<base64 key> (repeatable)
    #[arg(long, value_name = "ISSUER=KEY")]
    pub revoke: Vec<String>,

    /// Registry root private key file
    #[arg(long, default_value = ".registry_root_private_key.b64")]
    pub root_key_file: PathBuf,

    /// Generate new registry root keys
    #[arg(long)]
    pub new_registry_keys: bool,
}

/// Execute a registry command
pub fn execute(command: RegistryCommands) -> CliResult<Outcome> {
    match command {
        RegistryCommands::Build(args) => build(args),
        RegistryCommands::Verify { dir } => verify(&dir),
    }
}

fn build(args: BuildArgs) -> CliResult<Outcome> {
    let issuer_key = io::read_text(&args.issuer_pubkey_file, "Issuer public key file")?;
    let root_public_path = args.outdir.join(ROOT_PUBLIC_KEY_FILE);
    let root = if args.new_registry_keys
        || !args.root_key_file.exists()
        || !root_public_path.exists()
    {
        std::fs::create_dir_all(&args.outdir).map_err(|source| sie_core::InputError::Write {
            kind: "Registry directory",
            path: args.outdir.clone(),
            source,
        })?;
        let root = generate_keyfile(&args.root_key_file, &root_public_path)?;
        println!("[OK] Generated registry root keypair.");
        println!("     Private: {}  (KEEP SECRET)", args.root_key_file.display());
        println!("     Public : {}", root_public_path.display());
        root
    } else {
        load_keyfile(&args.root_key_file)?
    };

    let mut issuer = IssuerRecord::new(&args.issuer_id, issuer_key.trim());
    if let Some(name) = &args.issuer_name {
        issuer = issuer.with_metadata("name", name.as_str());
    }
    if let Some(expires) = &args.expires {
        issuer = issuer.with_expires(expires);
    }

    let mut builder = RegistryBuilder::new().issuer(issuer);
    for spec in &args.revoke {
        builder = builder.revoke(parse_revocation(spec)?);
    }
    builder.build(&root)?.write_to(&args.outdir)?;

    println!("[OK] Wrote registry snapshot:");
    println!("     {}", args.outdir.join(REGISTRY_FILE).display());
    println!("     {}", args.outdir.join(SIGNATURE_FILE).display());
    println!("[OK] Registry root public key:");
    println!("     {}", root_public_path.display());
    Ok(Outcome::Success)
}

fn verify(dir: &Path) -> CliResult<Outcome> {
    let snapshot = RegistryClient::new(dir).load_verified_snapshot()?;
    println!(
        "[OK] Registry signature verified. ({} issuers, {} revocations)",
        snapshot.issuers().count(),
        snapshot.revocations().count()
    );
    Ok(Outcome::Success)
}

fn parse_revocation(spec: &str) -> CliResult<RevocationRecord> {
    match spec.split_once('=') {
        Some((issuer, key)) if !issuer.trim().is_empty() && !key.trim().is_empty() => {
            Ok(RevocationRecord::new(issuer.trim(), key.trim()))
        }
        _ => Err(CliError::InvalidInput(format!(
            "--revoke expects <issuer>=<key>, got '{}'",
            spec
        ))),
    }
}
