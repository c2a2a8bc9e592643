//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a vault over a fresh
//! in-memory store, three registered members, and one template.

use std::sync::Arc;

use vellum::{NewDocument, NewTemplate, NewUser, Vault, VaultConfig};
use vellum_core::{
    Content, Document, FieldKind, FieldValue, Role, Template, TemplateField, User, UserId,
};
use vellum_outbox::Outbox;
use vellum_store::MemoryStore;

/// A vault test fixture with a seeded directory.
pub struct TestFixture {
    pub vault: Vault<Arc<MemoryStore>>,
    /// The store behind the vault, for direct reads and writes.
    pub store: Arc<MemoryStore>,
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub template: Template,
}

impl TestFixture {
    /// Create a fixture with silenced collaborators.
    pub async fn new() -> Self {
        Self::with_outbox(Outbox::noop()).await
    }

    /// Create a fixture with the given collaborators wired in.
    pub async fn with_outbox(outbox: Outbox) -> Self {
        let store = Arc::new(MemoryStore::new());
        let vault = Vault::new(Arc::clone(&store), outbox, VaultConfig::default());

        let alice = register(&vault, "alice").await;
        let bob = register(&vault, "bob").await;
        let carol = register(&vault, "carol").await;

        let template = vault
            .create_template(
                &alice.id,
                NewTemplate {
                    name: "Mutual NDA".into(),
                    description: "Standard mutual non-disclosure".into(),
                    fields: vec![TemplateField {
                        name: "counterparty".into(),
                        kind: FieldKind::Text,
                        required: true,
                        label: "Counterparty".into(),
                    }],
                    category: "legal".into(),
                },
            )
            .await
            .expect("create template");

        Self {
            vault,
            store,
            alice,
            bob,
            carol,
            template,
        }
    }

    /// Create a document authored by alice, listing `signers`.
    pub async fn make_document(&self, title: &str, signers: Vec<UserId>) -> Document {
        let mut content = Content::new();
        content.insert(
            "counterparty".into(),
            FieldValue::Text("Hollis & Gray LLP".into()),
        );
        self.vault
            .create_document(
                &self.alice.id,
                NewDocument {
                    title: title.into(),
                    template: self.template.id,
                    content,
                    signers,
                },
            )
            .await
            .expect("create document")
    }

    /// Create a document and drive it to completion by signing every
    /// slot in order. With no signers the draft comes back as created;
    /// nothing completes it.
    pub async fn make_completed(&self, title: &str, signers: Vec<UserId>) -> Document {
        let document = self.make_document(title, signers.clone()).await;
        let mut latest = document;
        for signer in &signers {
            latest = self
                .vault
                .sign_document(signer, &latest.id)
                .await
                .expect("sign document")
                .document;
        }
        latest
    }

    /// Register `count` additional members, named member-0 onwards.
    pub async fn more_members(&self, count: usize) -> Vec<User> {
        let mut users = Vec::with_capacity(count);
        for i in 0..count {
            users.push(register(&self.vault, &format!("member-{i}")).await);
        }
        users
    }
}

async fn register(vault: &Vault<Arc<MemoryStore>>, username: &str) -> User {
    vault
        .register_user(NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            role: Role::Member,
        })
        .await
        .expect("register user")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::DocumentStatus;
    use vellum_store::RecordStore;

    #[tokio::test]
    async fn test_fixture_seeds_directory_and_template() {
        let fixture = TestFixture::new().await;

        assert_ne!(fixture.alice.id, fixture.bob.id);
        assert_ne!(fixture.bob.id, fixture.carol.id);

        let template = fixture.vault.template(&fixture.template.id).await.unwrap();
        assert!(template.active);
    }

    #[tokio::test]
    async fn test_make_completed_signs_every_slot() {
        let fixture = TestFixture::new().await;
        let document = fixture
            .make_completed("Acquisition NDA", vec![fixture.bob.id, fixture.carol.id])
            .await;

        assert_eq!(document.status, DocumentStatus::Signed);
        assert!(document.all_signed());
        assert!(document.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_more_members_land_in_the_directory() {
        let fixture = TestFixture::new().await;
        let extra = fixture.more_members(3).await;

        assert_eq!(extra.len(), 3);
        for user in &extra {
            let found = fixture.store.user(&user.id).await.unwrap();
            assert!(found.is_some());
        }
    }
}
