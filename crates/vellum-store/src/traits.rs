//! RecordStore trait: the abstract interface for persistence.
//!
//! This trait keeps the vault storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use std::sync::Arc;

use async_trait::async_trait;

use vellum_core::{
    ActivityRecord, Document, DocumentId, DocumentStatus, Role, Template, TemplateId, User, UserId,
};

use crate::error::Result;

/// Result of a conditional document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The update was applied; this is the revision now stored.
    Updated { revision: u64 },
    /// No document with this id exists.
    Missing,
    /// The stored revision differs from the one the caller read; nothing
    /// was written. Reload and retry against fresh state.
    Stale { current: u64 },
}

/// Aggregate counters for the admin overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub documents: u64,
    pub completed: u64,
    pub templates: u64,
    pub users: u64,
}

/// The RecordStore trait: async interface for document persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Conditional updates**: `update_document` writes only when the stored
///   revision matches the revision on the passed document, and bumps it by
///   one. This is the serialization point for concurrent signature writes.
/// - **Whole-aggregate writes**: a document is read and written together
///   with its signer slots; there is no partial signer update.
/// - **Stable ordering**: listings are newest-first with the id as a
///   tiebreak, identical across implementations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new document, signer slots included.
    ///
    /// Documents enter at revision 0. A duplicate id is
    /// [`StoreError::DocumentExists`](crate::StoreError::DocumentExists).
    async fn insert_document(&self, document: &Document) -> Result<()>;

    /// Get a document by id, with its signer slots in order.
    async fn document(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Conditionally replace a document and its signer slots.
    ///
    /// The write applies only if the stored revision equals
    /// `document.revision`; on success the stored revision becomes
    /// `document.revision + 1`. `created_by` and `created_at` are never
    /// rewritten.
    async fn update_document(&self, document: &Document) -> Result<UpdateOutcome>;

    /// All documents `user` created or holds a signer slot in, newest first.
    async fn documents_for(&self, user: &UserId) -> Result<Vec<Document>>;

    /// Number of documents `user` created or holds a signer slot in.
    async fn count_documents_for(&self, user: &UserId) -> Result<u64>;

    /// Documents with a pending slot for `user` that are not yet signed,
    /// newest first.
    async fn pending_for(&self, user: &UserId) -> Result<Vec<Document>>;

    /// Total number of documents.
    async fn count_documents(&self) -> Result<u64>;

    /// Number of documents currently in `status`.
    async fn count_documents_with_status(&self, status: DocumentStatus) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Template Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new template.
    async fn insert_template(&self, template: &Template) -> Result<()>;

    /// Get a template by id, retired ones included.
    async fn template(&self, id: &TemplateId) -> Result<Option<Template>>;

    /// All templates that have not been retired, newest first.
    async fn active_templates(&self) -> Result<Vec<Template>>;

    /// Replace a template record. Returns false if the id is unknown.
    async fn update_template(&self, template: &Template) -> Result<bool>;

    /// Number of active templates.
    async fn count_templates(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // User Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new user. Duplicate ids are
    /// [`StoreError::UserExists`](crate::StoreError::UserExists), duplicate
    /// emails [`StoreError::EmailTaken`](crate::StoreError::EmailTaken).
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// Get a user by id.
    async fn user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by exact email address.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// The earliest-registered user holding `role`, if any.
    async fn find_user_with_role(&self, role: Role) -> Result<Option<User>>;

    /// Set a user's role. Returns false if the id is unknown.
    async fn set_user_role(&self, id: &UserId, role: Role) -> Result<bool>;

    /// A page of users ordered by username, then id.
    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>>;

    /// Total number of users.
    async fn count_users(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Activity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append one entry to the activity trail.
    async fn append_activity(&self, record: &ActivityRecord) -> Result<()>;

    /// The newest entries across all actors, newest first.
    async fn recent_activity(&self, limit: u64) -> Result<Vec<ActivityRecord>>;

    /// The newest entries recorded for `user`, newest first.
    async fn activity_for(&self, user: &UserId, limit: u64) -> Result<Vec<ActivityRecord>>;

    /// Total entries recorded for `user`.
    async fn count_activity_for(&self, user: &UserId) -> Result<u64>;
}

/// Forwarding impl so a shared handle works anywhere a store is expected.
#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn insert_document(&self, document: &Document) -> Result<()> {
        (**self).insert_document(document).await
    }

    async fn document(&self, id: &DocumentId) -> Result<Option<Document>> {
        (**self).document(id).await
    }

    async fn update_document(&self, document: &Document) -> Result<UpdateOutcome> {
        (**self).update_document(document).await
    }

    async fn documents_for(&self, user: &UserId) -> Result<Vec<Document>> {
        (**self).documents_for(user).await
    }

    async fn count_documents_for(&self, user: &UserId) -> Result<u64> {
        (**self).count_documents_for(user).await
    }

    async fn pending_for(&self, user: &UserId) -> Result<Vec<Document>> {
        (**self).pending_for(user).await
    }

    async fn count_documents(&self) -> Result<u64> {
        (**self).count_documents().await
    }

    async fn count_documents_with_status(&self, status: DocumentStatus) -> Result<u64> {
        (**self).count_documents_with_status(status).await
    }

    async fn insert_template(&self, template: &Template) -> Result<()> {
        (**self).insert_template(template).await
    }

    async fn template(&self, id: &TemplateId) -> Result<Option<Template>> {
        (**self).template(id).await
    }

    async fn active_templates(&self) -> Result<Vec<Template>> {
        (**self).active_templates().await
    }

    async fn update_template(&self, template: &Template) -> Result<bool> {
        (**self).update_template(template).await
    }

    async fn count_templates(&self) -> Result<u64> {
        (**self).count_templates().await
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        (**self).insert_user(user).await
    }

    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        (**self).user(id).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        (**self).user_by_email(email).await
    }

    async fn find_user_with_role(&self, role: Role) -> Result<Option<User>> {
        (**self).find_user_with_role(role).await
    }

    async fn set_user_role(&self, id: &UserId, role: Role) -> Result<bool> {
        (**self).set_user_role(id, role).await
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>> {
        (**self).list_users(offset, limit).await
    }

    async fn count_users(&self) -> Result<u64> {
        (**self).count_users().await
    }

    async fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        (**self).append_activity(record).await
    }

    async fn recent_activity(&self, limit: u64) -> Result<Vec<ActivityRecord>> {
        (**self).recent_activity(limit).await
    }

    async fn activity_for(&self, user: &UserId, limit: u64) -> Result<Vec<ActivityRecord>> {
        (**self).activity_for(user, limit).await
    }

    async fn count_activity_for(&self, user: &UserId) -> Result<u64> {
        (**self).count_activity_for(user).await
    }
}

/// Extension trait for common store patterns.
pub trait StoreExt: RecordStore {
    /// Gather the aggregate counters in one call.
    fn stats(&self) -> impl std::future::Future<Output = Result<StoreStats>> + Send;
}

impl<S: RecordStore + ?Sized> StoreExt for S {
    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            documents: self.count_documents().await?,
            completed: self
                .count_documents_with_status(DocumentStatus::Signed)
                .await?,
            templates: self.count_templates().await?,
            users: self.count_users().await?,
        })
    }
}
