//! # Vellum
//!
//! The unified API for the Vellum system - tamper-evident document
//! records with an ordered signature lifecycle.
//!
//! ## Overview
//!
//! Vellum is an embeddable library for keeping signed records honest:
//!
//! - **Documents**: Instantiated from templates, fingerprinted at creation
//! - **Signers**: Ordered per-user slots with forward-only statuses
//! - **Verification**: Reads recompute the creation digest from stored
//!   fields and report a boolean verdict
//! - **Collaborators**: Notices, the audit trail, and fingerprint
//!   anchoring run post-commit and are never load-bearing
//!
//! ## Key Concepts
//!
//! - **Fingerprint**: SHA-256 over a domain-separated canonical preimage.
//!   Computed once at creation; never recomputed on update.
//! - **Forward-only statuses**: Signatures cannot be unsigned and
//!   declines cannot be undone. Anything not in the transition table is
//!   rejected.
//! - **Completion**: A document becomes `Signed` exactly when every
//!   signer slot is signed; a zero-signer document never completes.
//! - **Conditional updates**: Every document write is revision-checked,
//!   so concurrent signers serialize without losing updates.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vellum::outbox::Outbox;
//! use vellum::store::SqliteStore;
//! use vellum::{Content, NewDocument, NewTemplate, NewUser, Role, Vault, VaultConfig};
//!
//! async fn example() {
//!     // Open storage
//!     let store = SqliteStore::open("vault.db").unwrap();
//!
//!     // Create the vault with silenced collaborators
//!     let vault = Vault::new(store, Outbox::noop(), VaultConfig::default());
//!
//!     // Register a signer
//!     let alice = vault
//!         .register_user(NewUser {
//!             username: "alice".into(),
//!             email: "alice@example.com".into(),
//!             role: Role::Member,
//!         })
//!         .await
//!         .unwrap();
//!
//!     // A document needs a template to instantiate
//!     let template = vault
//!         .create_template(
//!             &alice.id,
//!             NewTemplate {
//!                 name: "Mutual NDA".into(),
//!                 description: "Two-party non-disclosure".into(),
//!                 fields: vec![],
//!                 category: "legal".into(),
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     // Create and sign
//!     let document = vault
//!         .create_document(
//!             &alice.id,
//!             NewDocument {
//!                 title: "NDA with Acme".into(),
//!                 template: template.id,
//!                 content: Content::new(),
//!                 signers: vec![alice.id],
//!             },
//!         )
//!         .await
//!         .unwrap();
//!
//!     let receipt = vault.sign_document(&alice.id, &document.id).await.unwrap();
//!     assert!(receipt.completed);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `vellum::core` - Domain model (Document, Signer, Fingerprint, etc.)
//! - `vellum::lifecycle` - Pure signature state machine
//! - `vellum::store` - Storage abstraction, SQLite and in-memory
//! - `vellum::outbox` - Post-commit collaborators and test doubles

pub mod error;
pub mod vault;

// Re-export component crates
pub use vellum_core as core;
pub use vellum_lifecycle as lifecycle;
pub use vellum_outbox as outbox;
pub use vellum_store as store;

// Re-export main types for convenience
pub use error::{ErrorKind, Result, VaultError};
pub use vault::{
    NewDocument, NewTemplate, NewUser, SeedOutcome, SignReceipt, UserPage, UserSummary, Vault,
    VaultConfig, VaultStats, VerifiedDocument,
};

// Re-export commonly used core types
pub use vellum_core::{
    ActivityKind, ActivityRecord, Content, Document, DocumentId, DocumentStatus, FieldKind,
    FieldValue, Fingerprint, Role, Signer, SignerStatus, Template, TemplateField, TemplateId, User,
    UserId,
};
