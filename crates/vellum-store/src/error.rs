//! Error types for the store crate.

use thiserror::Error;

use vellum_core::{DocumentId, UserId};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A document with this id is already stored.
    #[error("document already exists: {0}")]
    DocumentExists(DocumentId),

    /// A user with this id is already registered.
    #[error("user already exists: {0}")]
    UserExists(UserId),

    /// Another account already holds this email address.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// Record encoding error.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Stored bytes could not be turned back into a record.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The connection mutex was poisoned by a panicking thread.
    #[error("connection lock poisoned")]
    LockPoisoned,

    /// The blocking task running the query was cancelled or panicked.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
