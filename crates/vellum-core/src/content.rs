//! Structured document content.
//!
//! Content is a flat map of named fields. The value set is deliberately
//! small and float-free: every variant round-trips exactly through the
//! canonical encoding, so fingerprints never depend on formatting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::template::FieldKind;

/// Document content: field name to value, iterated in key order.
pub type Content = BTreeMap<String, FieldValue>;

/// A single content field value.
///
/// `Number` is integral and `Date` is Unix milliseconds. There is no float
/// variant; the canonical encoder rejects floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Date(i64),
    Bool(bool),
}

impl FieldValue {
    /// The template field kind this value satisfies.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Bool(_) => FieldKind::Bool,
        }
    }
}
