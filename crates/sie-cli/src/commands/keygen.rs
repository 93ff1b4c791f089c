//! Key generation

use std::path::PathBuf;

use clap::Args;

use crate::commands::Outcome;
use crate::error::{CliError, CliResult};
use crate::keys::{generate_keyfile, public_key_path};

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the private key (base64 seed)
    #[arg(long, default_value = ".sie_private_key.b64")]
    pub keyfile: PathBuf,

    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: KeygenArgs) -> CliResult<Outcome> {
    if args.keyfile.exists() && !args.force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            args.keyfile.display()
        )));
    }
    let public_path = public_key_path(&args.keyfile);
    let key_pair = generate_keyfile(&args.keyfile, &public_path)?;

    println!("[OK] Generated new Ed25519 keypair.");
    println!("     Private key: {}  (KEEP SECRET)", args.keyfile.display());
    println!("     Public key : {}", public_path.display());
    println!("     {}", key_pair.public_key_b64());
    Ok(Outcome::Success)
}
