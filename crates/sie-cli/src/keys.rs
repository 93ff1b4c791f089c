//! Key file handling.
//!
//! A key file holds the base64 Ed25519 seed; the public key sits beside it
//! at `<keyfile>.pub`.

use std::io::Write;
use std::path::{Path, PathBuf};

use sie_core::{io, InputError, InstructionEnvelope, KeyPair};

use crate::error::CliResult;

const PRIVATE_KEY_KIND: &str = "Private key file";

/// `<keyfile>.pub`
pub fn public_key_path(keyfile: &Path) -> PathBuf {
    InstructionEnvelope::sibling_path(keyfile, ".pub")
}

/// Load a key pair from a base64 seed file.
pub fn load_keyfile(keyfile: &Path) -> CliResult<KeyPair> {
    let text = io::read_text(keyfile, PRIVATE_KEY_KIND)?;
    Ok(KeyPair::from_private_key_b64(text.trim())?)
}

/// Generate a key pair, writing the seed to `keyfile` and the public key to
/// `public_path`.
pub fn generate_keyfile(keyfile: &Path, public_path: &Path) -> CliResult<KeyPair> {
    let key_pair = KeyPair::generate();
    write_secret(keyfile, key_pair.private_key_b64().as_bytes())?;
    io::write_bytes(public_path, key_pair.public_key_b64().as_bytes(), "Public key file")?;
    Ok(key_pair)
}

/// Write secret material, owner-only on Unix.
fn write_secret(path: &Path, bytes: &[u8]) -> CliResult<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let to_input_error = |source| InputError::Write {
        kind: PRIVATE_KEY_KIND,
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(path).map_err(to_input_error)?;
    file.write_all(bytes).map_err(to_input_error)?;
    Ok(())
}
