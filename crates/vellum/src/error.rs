//! Error types for the Vault.

use thiserror::Error;
use vellum_core::{DocumentId, TemplateId, UserId, ValidationError};
use vellum_lifecycle::LifecycleError;
use vellum_store::StoreError;

/// Errors that can occur during Vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller-supplied input failed structural validation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Template not found.
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// User not found in the directory.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The acting identity lacks the required relationship to the resource.
    #[error("not authorized: {0}")]
    NotAuthorized(&'static str),

    /// The actor already signed this document. The original signature
    /// stands; nothing was changed.
    #[error("already signed by this user")]
    AlreadySigned {
        /// When the original signature landed, if the slot recorded it.
        signed_at: Option<i64>,
    },

    /// The actor's signer slot was declined earlier; declined slots are
    /// terminal.
    #[error("signer slot was already declined")]
    AlreadyDeclined,

    /// Conditional-update retries ran out under write contention.
    #[error("document {document} under contention, retries exhausted")]
    Contention { document: DocumentId },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification for boundary layers.
///
/// A protocol adapter maps each kind to one status code; nothing upstream
/// needs to match on message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Authorization,
    Conflict,
    Storage,
}

impl VaultError {
    /// The taxonomy kind of this error.
    ///
    /// Store-level uniqueness violations (duplicate id, taken email)
    /// classify as conflicts, not storage faults.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Validation(_) => ErrorKind::Validation,
            VaultError::DocumentNotFound(_)
            | VaultError::TemplateNotFound(_)
            | VaultError::UserNotFound(_) => ErrorKind::NotFound,
            VaultError::NotAuthorized(_) => ErrorKind::Authorization,
            VaultError::AlreadySigned { .. }
            | VaultError::AlreadyDeclined
            | VaultError::Contention { .. } => ErrorKind::Conflict,
            VaultError::Store(
                StoreError::DocumentExists(_)
                | StoreError::UserExists(_)
                | StoreError::EmailTaken(_),
            ) => ErrorKind::Conflict,
            VaultError::Store(_) => ErrorKind::Storage,
        }
    }
}

impl From<LifecycleError> for VaultError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::NotASigner => {
                VaultError::NotAuthorized("not a signer on this document")
            }
            LifecycleError::AlreadySigned { signed_at } => VaultError::AlreadySigned { signed_at },
            LifecycleError::AlreadyDeclined => VaultError::AlreadyDeclined,
            LifecycleError::NotCreator => {
                VaultError::NotAuthorized("only the creator can share this document")
            }
        }
    }
}

/// Result type for Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
