//! # Vellum Store
//!
//! Storage abstraction for Vellum. Provides a trait-based interface for
//! document, template, user, and activity persistence with SQLite and
//! in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts persistence behind the [`RecordStore`] trait,
//! keeping the vault storage-agnostic. The primary implementation is
//! [`SqliteStore`], with [`MemoryStore`] for tests.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`UpdateOutcome`] - Result of a conditional document update
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vellum_store::{RecordStore, SqliteStore};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("vellum.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     // let document = store.document(&id).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Conditional updates**: Document writes carry the revision they were
//!   read at; a mismatch returns [`UpdateOutcome::Stale`] and writes nothing
//! - **Whole-aggregate writes**: A document update rewrites its signer rows
//!   in the same transaction as the document row
//! - **Blocking pool**: SQLite calls run under `spawn_blocking` so the async
//!   runtime is never parked on disk I/O

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StoreExt, StoreStats, UpdateOutcome};
