//! Canonical CBOR encoding for digest preimages.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats (timestamps are i64 milliseconds)
//!
//! Determinism is the whole point: the same stored fields must produce the
//! same preimage bytes, and therefore the same fingerprint, on every
//! platform and every run. Otherwise verification would report false
//! mismatches on perfectly intact documents.

use ciborium::value::Value;

use crate::content::{Content, FieldValue};
use crate::ids::{DocumentId, UserId};

/// Preimage field keys (integer keys 0-23 encode as single bytes).
mod keys {
    // Creation preimage.
    pub const TITLE: u64 = 0;
    pub const CONTENT: u64 = 1;
    pub const CREATED_AT: u64 = 2;

    // Signature preimage.
    pub const DOCUMENT_ID: u64 = 0;
    pub const SIGNER_ID: u64 = 1;
    pub const SIGNED_AT: u64 = 2;
}

/// Field value kind tags.
///
/// Values are encoded as `[tag, value]` pairs so that `Number(5)` and
/// `Date(5)` never share preimage bytes.
mod tags {
    pub const TEXT: u64 = 0;
    pub const NUMBER: u64 = 1;
    pub const DATE: u64 = 2;
    pub const BOOL: u64 = 3;
}

/// Build the creation digest preimage over `{title, content, created_at}`.
///
/// `created_at` must be the stored creation timestamp. Verification calls
/// this with the same stored fields; feeding it a current timestamp would
/// fail every document ever created.
pub fn creation_preimage(title: &str, content: &Content, created_at: i64) -> Vec<u8> {
    let map = Value::Map(vec![
        (
            Value::Integer(keys::TITLE.into()),
            Value::Text(title.to_owned()),
        ),
        (Value::Integer(keys::CONTENT.into()), content_value(content)),
        (
            Value::Integer(keys::CREATED_AT.into()),
            Value::Integer(created_at.into()),
        ),
    ]);
    to_canonical_bytes(&map)
}

/// Build the signature digest preimage over `{document_id, signer_id, signed_at}`.
pub fn signature_preimage(document: &DocumentId, signer: &UserId, signed_at: i64) -> Vec<u8> {
    let map = Value::Map(vec![
        (
            Value::Integer(keys::DOCUMENT_ID.into()),
            Value::Bytes(document.0.to_vec()),
        ),
        (
            Value::Integer(keys::SIGNER_ID.into()),
            Value::Bytes(signer.0.to_vec()),
        ),
        (
            Value::Integer(keys::SIGNED_AT.into()),
            Value::Integer(signed_at.into()),
        ),
    ]);
    to_canonical_bytes(&map)
}

/// Convert a content map to a CBOR map of name -> tagged value.
fn content_value(content: &Content) -> Value {
    let entries = content
        .iter()
        .map(|(name, value)| (Value::Text(name.clone()), field_value(value)))
        .collect();
    Value::Map(entries)
}

/// Encode a field value as a `[tag, value]` pair.
fn field_value(value: &FieldValue) -> Value {
    let (tag, inner) = match value {
        FieldValue::Text(s) => (tags::TEXT, Value::Text(s.clone())),
        FieldValue::Number(n) => (tags::NUMBER, Value::Integer((*n).into())),
        FieldValue::Date(ms) => (tags::DATE, Value::Integer((*ms).into())),
        FieldValue::Bool(b) => (tags::BOOL, Value::Bool(*b)),
    };
    Value::Array(vec![Value::Integer(tag.into()), inner])
}

/// Encode a CBOR value to canonical bytes.
fn to_canonical_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    write_value(&mut buf, value);
    buf
}

/// Recursively encode a CBOR value.
fn write_value(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => write_integer(buf, i128::from(*i)),
        Value::Bytes(bytes) => {
            write_uint(buf, 2, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        }
        Value::Text(s) => {
            write_uint(buf, 3, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) => {
            write_uint(buf, 4, items.len() as u64);
            for item in items {
                write_value(buf, item);
            }
        }
        Value::Map(entries) => write_map(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Null => buf.push(0xf6),
        Value::Float(_) => panic!("floats not supported in canonical encoding"),
        _ => panic!("unsupported CBOR value type"),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn write_integer(buf: &mut Vec<u8>, n: i128) {
    if n >= 0 {
        write_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        write_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer argument with the given major type, using the
/// smallest valid form.
fn write_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    match n {
        0..=23 => buf.push(mt | (n as u8)),
        24..=0xff => {
            buf.push(mt | 24);
            buf.push(n as u8);
        }
        0x100..=0xffff => {
            buf.push(mt | 25);
            buf.extend_from_slice(&(n as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(mt | 26);
            buf.extend_from_slice(&(n as u32).to_be_bytes());
        }
        _ => {
            buf.push(mt | 27);
            buf.extend_from_slice(&n.to_be_bytes());
        }
    }
}

/// Encode a map canonically (major type 5).
///
/// Keys are sorted by their encoded byte comparison, per RFC 8949 §4.2.1.
fn write_map(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut encoded: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(key, value)| {
            let mut key_buf = Vec::new();
            write_value(&mut key_buf, key);
            (key_buf, value)
        })
        .collect();
    encoded.sort_by(|a, b| a.0.cmp(&b.0));

    write_uint(buf, 5, encoded.len() as u64);
    for (key_bytes, value) in encoded {
        buf.extend_from_slice(&key_bytes);
        write_value(buf, value);
    }
}
