//! Line format of a backing file.
//!
//! One record per line:
//!
//! ```text
//! <key>,<value>,<owner>
//! ```
//!
//! - Every field is escaped: `\` becomes `\\`, `,` becomes `\,`, and
//!   line breaks become `\n` / `\r`.  Values may therefore contain any
//!   character, commas included.
//! - With an obfuscation codec configured, `value` and `owner` hold the
//!   standard base64 of the codec output.  `key` is always plain.
//! - Blank lines are ignored by the reader.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::codec::ObfuscationCodec;
use crate::errors::{CredVaultError, Result};

use super::index::Record;

/// Field separator.
pub const FIELD_SEP: char = ',';

/// Escape character.
const ESCAPE: char = '\\';

/// Number of fields in a well-formed line.
const FIELD_COUNT: usize = 3;

/// Render a record as a single line (without the trailing newline).
pub fn encode_line(record: &Record, codec: Option<&dyn ObfuscationCodec>) -> String {
    let value = obscure_field(&record.value, codec);
    let owner = obscure_field(&record.owner, codec);

    let mut line = escape_field(&record.key);
    line.push(FIELD_SEP);
    line.push_str(&escape_field(&value));
    line.push(FIELD_SEP);
    line.push_str(&escape_field(&owner));
    line
}

/// Parse a line produced by `encode_line`.
///
/// Returns `MalformedRecord` for a wrong field count, a bad escape,
/// invalid base64, or codec output that is not UTF-8.
pub fn decode_line(line: &str, codec: Option<&dyn ObfuscationCodec>) -> Result<Record> {
    let fields = split_fields(line)?;
    if fields.len() != FIELD_COUNT {
        return Err(CredVaultError::MalformedRecord(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let mut fields = fields.into_iter();
    let key = fields.next().unwrap_or_default();
    let value = reveal_field(&fields.next().unwrap_or_default(), codec)?;
    let owner = reveal_field(&fields.next().unwrap_or_default(), codec)?;

    Ok(Record { key, value, owner })
}

/// Escape separator, escape and line-break characters in a field.
pub fn escape_field(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            FIELD_SEP => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Split a line on unescaped separators, unescaping each field.
fn split_fields(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(ESCAPE) => current.push(ESCAPE),
                Some(FIELD_SEP) => current.push(FIELD_SEP),
                Some('n') => current.push('\n'),
                Some('r') => current.push('\r'),
                Some(other) => {
                    return Err(CredVaultError::MalformedRecord(format!(
                        "unknown escape sequence '\\{other}'"
                    )));
                }
                None => {
                    return Err(CredVaultError::MalformedRecord(
                        "line ends with a dangling escape".into(),
                    ));
                }
            },
            FIELD_SEP => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    Ok(fields)
}

fn obscure_field(plain: &str, codec: Option<&dyn ObfuscationCodec>) -> String {
    match codec {
        Some(codec) => BASE64.encode(codec.obscure(plain.as_bytes())),
        None => plain.to_string(),
    }
}

fn reveal_field(stored: &str, codec: Option<&dyn ObfuscationCodec>) -> Result<String> {
    let Some(codec) = codec else {
        return Ok(stored.to_string());
    };

    let obscured = BASE64
        .decode(stored)
        .map_err(|e| CredVaultError::MalformedRecord(format!("invalid base64: {e}")))?;

    String::from_utf8(codec.reveal(&obscured)).map_err(|_| {
        CredVaultError::MalformedRecord("decoded field is not valid UTF-8".into())
    })
}
