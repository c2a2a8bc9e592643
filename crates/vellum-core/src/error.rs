//! Error types for Vellum core.

use thiserror::Error;

use crate::ids::UserId;

/// Errors from parsing stored record fields.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown document status: {0}")]
    UnknownDocumentStatus(String),

    #[error("unknown signer status: {0}")]
    UnknownSignerStatus(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),

    #[error("unknown activity kind: {0}")]
    UnknownActivityKind(String),
}

/// Validation failures for caller-supplied input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("duplicate signer {0} in signer list")]
    DuplicateSigner(UserId),

    #[error("template name must not be empty")]
    EmptyTemplateName,

    #[error("template field name must not be empty")]
    EmptyFieldName,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),
}
