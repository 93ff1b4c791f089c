//! Canonical JSON encoding.
//!
//! The canonical form is the exact input to every signature and hash in the
//! protocol:
//!
//! - object keys sorted by code point at every nesting level
//! - `,` and `:` separators, no insignificant whitespace
//! - non-ASCII characters written literally (UTF-8), not `\u` escaped
//! - floats in shortest round-trip form, with a signed two-digit exponent
//!   outside `1e-4 <= |x| < 1e16` (`1e-07`, `1.5e+20`, `0.0001`, `1.0`)
//!
//! Logically equal values encode to identical bytes no matter how they were
//! built. Key order is imposed here explicitly rather than relying on the map
//! type `serde_json` happens to be compiled with.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::error::CryptoError;

/// Serialize any value to canonical JSON bytes.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let value = serde_json::to_value(value)?;
    canonicalize_value(&value)
}

/// Canonical JSON bytes for an already-built [`Value`].
pub fn canonicalize_value(value: &Value) -> Result<Vec<u8>, CryptoError> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, CanonicalFormatter);
    sorted(value).serialize(&mut ser)?;
    Ok(out)
}

/// Canonical JSON as a `String`.
pub fn canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, CryptoError> {
    let bytes = canonicalize(value)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Compact formatter with interoperable float text.
///
/// Everything except floats uses the compact defaults.
#[derive(Debug, Clone, Copy, Default)]
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.write_f64(writer, f64::from(value))
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

/// Shortest round-trip float text.
///
/// Fixed notation when the decimal exponent is in `-4..16`, always with a
/// fractional part. Scientific notation otherwise, exponent signed and at
/// least two digits.
fn format_float(value: f64) -> String {
    // `{:e}` yields the shortest round-trip digits as `d[.ddd]e[-]x`.
    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exponent: i32 = match exponent.parse() {
        Ok(exp) => exp,
        Err(_) => return sci,
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-4..16).contains(&exponent) {
        if exponent >= 0 {
            let int_len = exponent as usize + 1;
            if digits.len() > int_len {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            } else {
                format!("{}{}.0", digits, "0".repeat(int_len - digits.len()))
            }
        } else {
            let zeros = "0".repeat((-exponent - 1) as usize);
            format!("0.{}{}", zeros, digits)
        }
    } else {
        let (head, tail) = digits.split_at(1);
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        if tail.is_empty() {
            format!("{}e{}{:02}", head, exp_sign, exponent.abs())
        } else {
            format!("{}.{}e{}{:02}", head, tail, exp_sign, exponent.abs())
        }
    };
    format!("{}{}", sign, body)
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (key, child) in entries {
                out.insert(key.clone(), sorted(child));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}
