//! Reusable document templates.
//!
//! Templates declare the named fields a document's content is expected to
//! carry. Retiring a template is a soft delete: the record stays resolvable
//! by id (existing documents reference it) but drops out of listings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{TemplateId, UserId};

/// Field kinds a template may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    Bool,
}

impl FieldKind {
    /// Stable string form, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Bool => "boolean",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "text" => Ok(FieldKind::Text),
            "number" => Ok(FieldKind::Number),
            "date" => Ok(FieldKind::Date),
            "boolean" => Ok(FieldKind::Bool),
            other => Err(CoreError::UnknownFieldKind(other.to_owned())),
        }
    }
}

/// One declared field of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Display label for form rendering.
    pub label: String,
}

/// A reusable document template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub fields: Vec<TemplateField>,
    pub category: String,
    pub created_by: UserId,
    /// Soft-delete flag; retired templates have `active = false`.
    pub active: bool,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_parse_roundtrip() {
        for kind in [
            FieldKind::Text,
            FieldKind::Number,
            FieldKind::Date,
            FieldKind::Bool,
        ] {
            assert_eq!(FieldKind::parse(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn test_field_kind_rejects_unknown() {
        assert!(FieldKind::parse("float").is_err());
        // The persisted form is "boolean", not "bool".
        assert!(FieldKind::parse("bool").is_err());
    }
}
