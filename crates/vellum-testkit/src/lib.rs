//! # Vellum Testkit
//!
//! Testing utilities for Vellum.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed inputs with derived fingerprints for
//!   cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up vault test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors pin the canonical encoding:
//!
//! ```rust
//! use vellum_testkit::vectors::{all_vectors, fingerprint_from_vector};
//!
//! for vector in all_vectors() {
//!     let fingerprint = fingerprint_from_vector(&vector);
//!     println!("{}: {}", vector.name, fingerprint.to_hex());
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vellum_testkit::generators::{document_from_params, DocumentParams};
//!
//! proptest! {
//!     #[test]
//!     fn fingerprint_is_deterministic(params: DocumentParams) {
//!         let a = document_from_params(&params);
//!         let b = document_from_params(&params);
//!         prop_assert_eq!(a.fingerprint, b.fingerprint);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up a vault with a directory and a template:
//!
//! ```rust,ignore
//! use vellum_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new().await;
//! let document = fixture.make_document("Mutual NDA", vec![fixture.bob.id]).await;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
pub use vectors::{all_vectors, fingerprint_from_vector, signature_vectors, GoldenVector};
