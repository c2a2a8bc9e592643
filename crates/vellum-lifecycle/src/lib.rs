//! # Vellum Lifecycle
//!
//! The signature state machine: pure functions over a [`Document`] plus a
//! caller-supplied `now`. No I/O and no clock access live here, so every
//! decision is deterministic and replayable; the engine wraps these
//! functions in its conditional-update loop and re-runs them against fresh
//! state after a lost race.
//!
//! ## Operations
//!
//! - [`record_signature`] - sign a pending slot, possibly completing the document
//! - [`decline_signature`] - decline a pending slot; blocks completion, never
//!   propagates to the document
//! - [`add_signer`] - creator-only, idempotent share
//! - [`evaluate_completion`] - the single completion rule
//! - [`initial_status`] - status of a freshly created document
//!
//! [`Document`]: vellum_core::Document

pub mod completion;
pub mod error;
pub mod share;
pub mod sign;

pub use completion::{evaluate_completion, initial_status};
pub use error::{LifecycleError, Result};
pub use share::{add_signer, ShareOutcome};
pub use sign::{decline_signature, record_signature, SignOutcome};
