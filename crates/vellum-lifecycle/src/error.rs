//! Error types for the lifecycle state machine.

use thiserror::Error;

/// Errors from applying a lifecycle operation to a document.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The actor holds no signer slot on this document.
    #[error("not authorized to sign this document")]
    NotASigner,

    /// The actor already signed. The original signature stands; repeat
    /// attempts fail rather than silently succeed.
    #[error("already signed by this user")]
    AlreadySigned {
        /// When the original signature landed, if the slot recorded it.
        signed_at: Option<i64>,
    },

    /// The actor's slot was declined earlier; declined slots are terminal.
    #[error("signer slot was already declined")]
    AlreadyDeclined,

    /// Only the creator may share a document. Admins do not bypass this.
    #[error("only the creator can share this document")]
    NotCreator,
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;
