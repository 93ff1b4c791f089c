//! Envelope signing

use std::path::PathBuf;

use clap::Args;
use sie_core::{io, Constraints, InstructionEnvelope, ENVELOPE_SUFFIX};
use tracing::warn;

use crate::commands::Outcome;
use crate::error::CliResult;
use crate::keys::{generate_keyfile, load_keyfile, public_key_path};

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Issuer identifier, e.g. palxislabs
    #[arg(long)]
    pub issuer: String,

    /// Instruction file to sign, e.g. SKILL.md
    #[arg(long)]
    pub infile: PathBuf,

    /// Output path (default: <infile>.sie.json)
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Declared scope list
    #[arg(long, num_args = 0.., default_value = "read_files")]
    pub scope: Vec<String>,

    /// Set the deny_prompt_disclosure constraint
    #[arg(long)]
    pub deny_prompt_disclosure: bool,

    /// Set the no_external_urls constraint
    #[arg(long)]
    pub no_external_urls: bool,

    /// Set the max_output_tokens constraint
    #[arg(long, default_value_t = 2000)]
    pub max_output_tokens: i64,

    /// Payload content type
    #[arg(long, default_value = "text/markdown")]
    pub content_type: String,

    /// Where to store/load the private key (base64)
    #[arg(long, default_value = ".sie_private_key.b64")]
    pub keyfile: PathBuf,

    /// Generate a new keypair and overwrite the key file
    #[arg(long)]
    pub new_keys: bool,
}

pub fn execute(args: SignArgs) -> CliResult<Outcome> {
    let content = io::read_text(&args.infile, "Input file")?;
    let outfile = args
        .outfile
        .clone()
        .unwrap_or_else(|| InstructionEnvelope::sibling_path(&args.infile, ENVELOPE_SUFFIX));

    let public_path = public_key_path(&args.keyfile);
    let (key_pair, embed_public_key) = if args.new_keys || !args.keyfile.exists() {
        let key_pair = generate_keyfile(&args.keyfile, &public_path)?;
        println!("[OK] Generated new Ed25519 keypair.");
        println!("     Private key: {}  (KEEP SECRET)", args.keyfile.display());
        println!("     Public key : {}", public_path.display());
        (key_pair, true)
    } else {
        let key_pair = load_keyfile(&args.keyfile)?;
        let embed = public_path.exists();
        if embed {
            let on_disk = io::read_text(&public_path, "Public key file")?;
            if on_disk.trim() != key_pair.public_key_b64() {
                warn!(
                    path = %public_path.display(),
                    "public key file does not match private key; embedding derived key"
                );
            }
        }
        (key_pair, embed)
    };

    let constraints = Constraints::new()
        .with_no_external_urls(args.no_external_urls)
        .with_max_output_tokens(args.max_output_tokens)
        .with_deny_prompt_disclosure(args.deny_prompt_disclosure);

    let payload_name = args
        .infile
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.infile.display().to_string());

    let envelope = InstructionEnvelope::new(
        args.issuer,
        args.scope,
        constraints,
        payload_name,
        args.content_type,
        content,
        embed_public_key.then(|| key_pair.public_key_b64()),
    )
    .sign(&key_pair)?;
    envelope.save(&outfile)?;

    println!("[OK] Wrote signed envelope: {}", outfile.display());
    Ok(Outcome::Success)
}
