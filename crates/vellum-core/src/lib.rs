//! # Vellum Core
//!
//! Pure primitives for Vellum: documents, signers, templates, and the
//! canonical encoding behind content fingerprints.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over domain records.
//!
//! ## Key Types
//!
//! - [`Document`] - The aggregate root: title, content, signer list, fingerprint
//! - [`Signer`] - A per-user signature slot inside a document
//! - [`Fingerprint`] - SHA-256 digest over a domain-separated canonical preimage
//! - [`DocumentStatus`] / [`SignerStatus`] - Forward-only lifecycle states
//!
//! ## Canonicalization
//!
//! Digest preimages are encoded as deterministic CBOR. See [`canonical`].

pub mod activity;
pub mod canonical;
pub mod content;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod ids;
pub mod template;
pub mod user;
pub mod validation;

pub use activity::{ActivityKind, ActivityRecord};
pub use canonical::{creation_preimage, signature_preimage};
pub use content::{Content, FieldValue};
pub use document::{Document, DocumentStatus, Signer, SignerStatus};
pub use error::{CoreError, ValidationError};
pub use fingerprint::Fingerprint;
pub use ids::{DocumentId, TemplateId, UserId};
pub use template::{FieldKind, Template, TemplateField};
pub use user::{Role, User};
pub use validation::{validate_new_document, validate_new_template, validate_new_user};
