//! Activity log records.
//!
//! Every mutating operation emits one record, fire-and-forget: a failed
//! append is logged by the dispatcher and never fails the operation that
//! produced it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{DocumentId, UserId};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    DocumentCreated,
    DocumentSigned,
    DocumentShared,
    TemplateCreated,
    TemplateUpdated,
    TemplateRetired,
    UserRegistered,
    RoleUpdated,
    AdminSeeded,
}

impl ActivityKind {
    /// Stable string form, as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::DocumentCreated => "DOCUMENT_CREATED",
            ActivityKind::DocumentSigned => "DOCUMENT_SIGNED",
            ActivityKind::DocumentShared => "DOCUMENT_SHARED",
            ActivityKind::TemplateCreated => "TEMPLATE_CREATED",
            ActivityKind::TemplateUpdated => "TEMPLATE_UPDATED",
            ActivityKind::TemplateRetired => "TEMPLATE_RETIRED",
            ActivityKind::UserRegistered => "USER_REGISTERED",
            ActivityKind::RoleUpdated => "ROLE_UPDATED",
            ActivityKind::AdminSeeded => "ADMIN_SEEDED",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "DOCUMENT_CREATED" => Ok(ActivityKind::DocumentCreated),
            "DOCUMENT_SIGNED" => Ok(ActivityKind::DocumentSigned),
            "DOCUMENT_SHARED" => Ok(ActivityKind::DocumentShared),
            "TEMPLATE_CREATED" => Ok(ActivityKind::TemplateCreated),
            "TEMPLATE_UPDATED" => Ok(ActivityKind::TemplateUpdated),
            "TEMPLATE_RETIRED" => Ok(ActivityKind::TemplateRetired),
            "USER_REGISTERED" => Ok(ActivityKind::UserRegistered),
            "ROLE_UPDATED" => Ok(ActivityKind::RoleUpdated),
            "ADMIN_SEEDED" => Ok(ActivityKind::AdminSeeded),
            other => Err(CoreError::UnknownActivityKind(other.to_owned())),
        }
    }
}

/// One entry in the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Who performed the operation.
    pub actor: UserId,
    pub action: ActivityKind,
    /// The document involved, when there is one.
    pub document: Option<DocumentId>,
    /// Human-readable summary, e.g. the document title.
    pub detail: String,
    pub at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_kind_parse_roundtrip() {
        for kind in [
            ActivityKind::DocumentCreated,
            ActivityKind::DocumentSigned,
            ActivityKind::DocumentShared,
            ActivityKind::TemplateCreated,
            ActivityKind::TemplateUpdated,
            ActivityKind::TemplateRetired,
            ActivityKind::UserRegistered,
            ActivityKind::RoleUpdated,
            ActivityKind::AdminSeeded,
        ] {
            assert_eq!(ActivityKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(ActivityKind::parse("DOCUMENT_DELETED").is_err());
    }
}
