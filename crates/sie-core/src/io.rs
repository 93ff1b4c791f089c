//! Blocking file helpers shared by every loader in the workspace.
//!
//! All functions here perform synchronous reads/writes; async hosts should
//! call them from a blocking task.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::InputError;

/// Read a UTF-8 text file, mapping absence and I/O failures to [`InputError`].
pub fn read_text(path: &Path, kind: &'static str) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| InputError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file's raw bytes.
pub fn read_bytes(path: &Path, kind: &'static str) -> Result<Vec<u8>, InputError> {
    if !path.exists() {
        return Err(InputError::NotFound {
            kind,
            path: path.to_path_buf(),
        });
    }
    std::fs::read(path).map_err(|source| InputError::Read {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Write bytes to a file.
pub fn write_bytes(path: &Path, bytes: &[u8], kind: &'static str) -> Result<(), InputError> {
    std::fs::write(path, bytes).map_err(|source| InputError::Write {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `text` as JSON and require a top-level object.
pub fn parse_json_object(text: &str, kind: &'static str) -> Result<Map<String, Value>, InputError> {
    let value: Value =
        serde_json::from_str(text).map_err(|source| InputError::InvalidJson { kind, source })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(InputError::NotAnObject { kind }),
    }
}

/// Load a JSON file whose top level must be an object.
pub fn load_json_object(path: &Path, kind: &'static str) -> Result<Map<String, Value>, InputError> {
    let text = read_text(path, kind)?;
    parse_json_object(&text, kind)
}
