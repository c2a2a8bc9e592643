//! In-memory implementation of the RecordStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite,
//! result ordering included, but keeps everything in memory with no
//! persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use vellum_core::{
    ActivityRecord, Document, DocumentId, DocumentStatus, Role, Template, TemplateId, User, UserId,
};

use crate::error::{Result, StoreError};
use crate::traits::{RecordStore, UpdateOutcome};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    documents: HashMap<DocumentId, Document>,
    templates: HashMap<TemplateId, Template>,
    users: HashMap<UserId, User>,
    /// Append-only, in arrival order.
    activity: Vec<ActivityRecord>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest `created_at` first, id as tiebreak. Matches the SQLite ordering.
fn newest_first(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.0.cmp(&b.id.0))
    });
}

/// Newest `at` first. The stable sort over reverse arrival order keeps
/// ties in reverse insertion order, matching the SQLite rowid tiebreak.
fn newest_activity<'a, I>(records: I, limit: u64) -> Vec<ActivityRecord>
where
    I: DoubleEndedIterator<Item = &'a ActivityRecord>,
{
    let mut newest: Vec<ActivityRecord> = records.rev().cloned().collect();
    newest.sort_by(|a, b| b.at.cmp(&a.at));
    newest.truncate(limit as usize);
    newest
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_document(&self, document: &Document) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.documents.contains_key(&document.id) {
            return Err(StoreError::DocumentExists(document.id));
        }
        inner.documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn document(&self, id: &DocumentId) -> Result<Option<Document>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.documents.get(id).cloned())
    }

    async fn update_document(&self, document: &Document) -> Result<UpdateOutcome> {
        let mut inner = self.inner.write().unwrap();
        let stored = match inner.documents.get_mut(&document.id) {
            None => return Ok(UpdateOutcome::Missing),
            Some(stored) => stored,
        };
        if stored.revision != document.revision {
            return Ok(UpdateOutcome::Stale {
                current: stored.revision,
            });
        }

        let mut next = document.clone();
        next.revision += 1;
        // Creation provenance is immutable under update.
        next.created_by = stored.created_by;
        next.created_at = stored.created_at;
        let revision = next.revision;
        *stored = next;
        Ok(UpdateOutcome::Updated { revision })
    }

    async fn documents_for(&self, user: &UserId) -> Result<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<Document> = inner
            .documents
            .values()
            .filter(|doc| doc.is_creator(user) || doc.has_signer(user))
            .cloned()
            .collect();
        newest_first(&mut matches);
        Ok(matches)
    }

    async fn count_documents_for(&self, user: &UserId) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let count = inner
            .documents
            .values()
            .filter(|doc| doc.is_creator(user) || doc.has_signer(user))
            .count();
        Ok(count as u64)
    }

    async fn pending_for(&self, user: &UserId) -> Result<Vec<Document>> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<Document> = inner
            .documents
            .values()
            .filter(|doc| {
                doc.status != DocumentStatus::Signed
                    && doc.signer(user).is_some_and(|slot| slot.is_pending())
            })
            .cloned()
            .collect();
        newest_first(&mut matches);
        Ok(matches)
    }

    async fn count_documents(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.documents.len() as u64)
    }

    async fn count_documents_with_status(&self, status: DocumentStatus) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let count = inner
            .documents
            .values()
            .filter(|doc| doc.status == status)
            .count();
        Ok(count as u64)
    }

    async fn insert_template(&self, template: &Template) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn template(&self, id: &TemplateId) -> Result<Option<Template>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.templates.get(id).cloned())
    }

    async fn active_templates(&self) -> Result<Vec<Template>> {
        let inner = self.inner.read().unwrap();
        let mut active: Vec<Template> = inner
            .templates
            .values()
            .filter(|template| template.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        Ok(active)
    }

    async fn update_template(&self, template: &Template) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner.templates.get_mut(&template.id) {
            None => Ok(false),
            Some(stored) => {
                *stored = template.clone();
                Ok(true)
            }
        }
    }

    async fn count_templates(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let count = inner
            .templates
            .values()
            .filter(|template| template.active)
            .count();
        Ok(count as u64)
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.contains_key(&user.id) {
            return Err(StoreError::UserExists(user.id));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken(user.email.clone()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn user(&self, id: &UserId) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_with_role(&self, role: Role) -> Result<Option<User>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .users
            .values()
            .filter(|u| u.role == role)
            .min_by_key(|u| (u.created_at, u.id.0))
            .cloned())
    }

    async fn set_user_role(&self, id: &UserId, role: Role) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner.users.get_mut(id) {
            None => Ok(false),
            Some(user) => {
                user.role = role;
                Ok(true)
            }
        }
    }

    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>> {
        let inner = self.inner.read().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then_with(|| a.id.0.cmp(&b.id.0)));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_users(&self) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner.users.len() as u64)
    }

    async fn append_activity(&self, record: &ActivityRecord) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.activity.push(record.clone());
        Ok(())
    }

    async fn recent_activity(&self, limit: u64) -> Result<Vec<ActivityRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(newest_activity(inner.activity.iter(), limit))
    }

    async fn activity_for(&self, user: &UserId, limit: u64) -> Result<Vec<ActivityRecord>> {
        let inner = self.inner.read().unwrap();
        Ok(newest_activity(
            inner.activity.iter().filter(|r| r.actor == *user),
            limit,
        ))
    }

    async fn count_activity_for(&self, user: &UserId) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        let count = inner.activity.iter().filter(|r| r.actor == *user).count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vellum_core::{ActivityKind, Content, Signer};

    fn sample_doc(title: &str, created_at: i64) -> Document {
        Document {
            id: DocumentId::generate(),
            title: title.into(),
            template: TemplateId::generate(),
            content: Content::new(),
            status: DocumentStatus::Pending,
            created_by: UserId::generate(),
            signers: vec![],
            fingerprint: None,
            created_at,
            completed_at: None,
            revision: 0,
        }
    }

    fn sample_user(username: &str, email: &str, created_at: i64) -> User {
        User {
            id: UserId::generate(),
            username: username.into(),
            email: email.into(),
            role: Role::Member,
            created_at,
        }
    }

    fn activity(actor: UserId, at: i64) -> ActivityRecord {
        ActivityRecord {
            actor,
            action: ActivityKind::DocumentCreated,
            document: None,
            detail: format!("at {}", at),
            at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_document() {
        let store = MemoryStore::new();
        let doc = sample_doc("NDA", 100);

        store.insert_document(&doc).await.unwrap();
        let fetched = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(fetched, doc);

        assert!(store
            .document(&DocumentId::generate())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_document_rejected() {
        let store = MemoryStore::new();
        let doc = sample_doc("NDA", 100);

        store.insert_document(&doc).await.unwrap();
        let err = store.insert_document(&doc).await.unwrap_err();
        assert!(matches!(err, StoreError::DocumentExists(id) if id == doc.id));
    }

    #[tokio::test]
    async fn test_stale_update_rejected() {
        let store = MemoryStore::new();
        let mut doc = sample_doc("NDA", 100);
        store.insert_document(&doc).await.unwrap();

        doc.title = "NDA v2".into();
        let outcome = store.update_document(&doc).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { revision: 1 });

        // The struct still claims revision 0; the store has moved on.
        doc.title = "NDA v3".into();
        let outcome = store.update_document(&doc).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Stale { current: 1 });

        let stored = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "NDA v2");
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let store = MemoryStore::new();
        let doc = sample_doc("NDA", 100);
        let outcome = store.update_document(&doc).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Missing);
    }

    #[tokio::test]
    async fn test_update_preserves_creation_provenance() {
        let store = MemoryStore::new();
        let doc = sample_doc("NDA", 100);
        store.insert_document(&doc).await.unwrap();

        let mut tampered = doc.clone();
        tampered.created_by = UserId::generate();
        tampered.created_at = 999;
        store.update_document(&tampered).await.unwrap();

        let stored = store.document(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored.created_by, doc.created_by);
        assert_eq!(stored.created_at, 100);
    }

    #[tokio::test]
    async fn test_documents_for_covers_creator_and_signer() {
        let store = MemoryStore::new();
        let alice = UserId::generate();
        let bob = UserId::generate();

        let mut created = sample_doc("by alice", 10);
        created.created_by = alice;

        let mut signing = sample_doc("for alice", 20);
        signing.created_by = bob;
        signing.signers.push(Signer::listed(alice));

        let unrelated = sample_doc("unrelated", 30);

        store.insert_document(&created).await.unwrap();
        store.insert_document(&signing).await.unwrap();
        store.insert_document(&unrelated).await.unwrap();

        let docs = store.documents_for(&alice).await.unwrap();
        assert_eq!(docs.len(), 2);
        // Newest first.
        assert_eq!(docs[0].id, signing.id);
        assert_eq!(docs[1].id, created.id);

        assert_eq!(store.count_documents_for(&alice).await.unwrap(), 2);
        assert_eq!(store.count_documents_for(&bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pending_for_requires_pending_slot() {
        let store = MemoryStore::new();
        let alice = UserId::generate();

        let mut waiting = sample_doc("waiting", 10);
        waiting.signers.push(Signer::listed(alice));

        let mut already_done = sample_doc("done", 20);
        already_done.status = DocumentStatus::Signed;
        already_done.signers.push(Signer::listed(alice));

        let other_signer = sample_doc("other", 30);

        store.insert_document(&waiting).await.unwrap();
        store.insert_document(&already_done).await.unwrap();
        store.insert_document(&other_signer).await.unwrap();

        let pending = store.pending_for(&alice).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, waiting.id);
    }

    #[tokio::test]
    async fn test_email_taken() {
        let store = MemoryStore::new();
        store
            .insert_user(&sample_user("alice", "alice@example.com", 1))
            .await
            .unwrap();

        let err = store
            .insert_user(&sample_user("imposter", "alice@example.com", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));

        let found = store
            .user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_find_user_with_role_prefers_earliest() {
        let store = MemoryStore::new();

        let mut first = sample_user("first", "first@example.com", 10);
        first.role = Role::Admin;
        let mut second = sample_user("second", "second@example.com", 20);
        second.role = Role::Admin;

        store.insert_user(&second).await.unwrap();
        store.insert_user(&first).await.unwrap();

        let found = store.find_user_with_role(Role::Admin).await.unwrap();
        assert_eq!(found.unwrap().id, first.id);
        assert!(store
            .find_user_with_role(Role::Member)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_users_pages_alphabetically() {
        let store = MemoryStore::new();
        for (name, email) in [
            ("carol", "carol@example.com"),
            ("alice", "alice@example.com"),
            ("bob", "bob@example.com"),
        ] {
            store.insert_user(&sample_user(name, email, 1)).await.unwrap();
        }

        let page = store.list_users(0, 2).await.unwrap();
        assert_eq!(page[0].username, "alice");
        assert_eq!(page[1].username, "bob");

        let rest = store.list_users(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].username, "carol");
    }

    #[tokio::test]
    async fn test_recent_activity_newest_first_with_limit() {
        let store = MemoryStore::new();
        let alice = UserId::generate();
        let bob = UserId::generate();

        store.append_activity(&activity(alice, 10)).await.unwrap();
        store.append_activity(&activity(bob, 30)).await.unwrap();
        store.append_activity(&activity(alice, 20)).await.unwrap();

        let recent = store.recent_activity(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].at, 30);
        assert_eq!(recent[1].at, 20);

        let for_alice = store.activity_for(&alice, 10).await.unwrap();
        assert_eq!(for_alice.len(), 2);
        assert_eq!(for_alice[0].at, 20);
        assert_eq!(store.count_activity_for(&alice).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_activity_ties_break_toward_latest_entry() {
        let store = MemoryStore::new();
        let alice = UserId::generate();

        let mut first = activity(alice, 50);
        first.detail = "first".into();
        let mut second = activity(alice, 50);
        second.detail = "second".into();

        store.append_activity(&first).await.unwrap();
        store.append_activity(&second).await.unwrap();

        let recent = store.recent_activity(10).await.unwrap();
        assert_eq!(recent[0].detail, "second");
        assert_eq!(recent[1].detail, "first");
    }

    proptest! {
        #[test]
        fn test_newest_first_is_ordered(stamps in proptest::collection::vec(0i64..100, 0..16)) {
            let mut docs: Vec<Document> =
                stamps.iter().map(|&at| sample_doc("t", at)).collect();
            newest_first(&mut docs);
            for pair in docs.windows(2) {
                prop_assert!(
                    pair[0].created_at > pair[1].created_at
                        || (pair[0].created_at == pair[1].created_at
                            && pair[0].id.0 <= pair[1].id.0)
                );
            }
        }
    }
}
