//! # Vellum Outbox
//!
//! Post-commit collaborator interfaces for Vellum: notice delivery,
//! fingerprint anchoring, and the audit trail.
//!
//! ## Overview
//!
//! The vault commits an operation first and fans its side effects out
//! afterwards through the [`Outbox`]. Collaborators sit behind small
//! capability traits so deployments can plug in a mail relay, a real
//! ledger, or nothing at all.
//!
//! ## Key Types
//!
//! - [`Outbox`] - Bundles the collaborators and dispatches engine events
//! - [`Notifier`] / [`Notice`] - Signing lifecycle notices to users
//! - [`Anchor`] / [`AnchorReceipt`] - External fingerprint registration
//! - [`AuditSink`] - One entry per committed operation
//!
//! ## Key Properties
//!
//! - **Post-commit**: Dispatch happens after the store write has landed
//! - **Best-effort**: Collaborator failures are logged, never propagated
//! - **Swappable**: Noop, recording, and store-backed implementations ship
//!   in-crate; anything else implements the traits

pub mod anchor;
pub mod audit;
pub mod dispatch;
pub mod notify;

pub use anchor::{Anchor, AnchorReceipt, FailingAnchor, NoopAnchor, RecordingAnchor};
pub use audit::{AuditSink, FailingAudit, NoopAudit, RecordingAudit, StoreAudit};
pub use dispatch::Outbox;
pub use notify::{FailingNotifier, NoopNotifier, Notice, Notifier, RecordingNotifier};
