//! # Meadowcap Testkit
//!
//! Testing utilities for Meadowcap.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known encodings for cross-implementation verification
//! - **Generators**: Proptest strategies for ranges, products and keys
//! - **Fixtures**: Communal and owned namespaces with ready-made keypairs
//!
//! ## Golden Vectors
//!
//! ```rust
//! use meadowcap_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok, hex) in verify_all_vectors() {
//!     assert!(ok, "{name}: {hex}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use meadowcap::{Ed25519Params, Meadowcap};
//! use meadowcap_testkit::generators::product;
//!
//! proptest! {
//!     #[test]
//!     fn product_roundtrip(p in product()) {
//!         let mc = Meadowcap::new(Ed25519Params::new());
//!         prop_assert_eq!(mc.decode_product(&mc.encode_product(&p)).unwrap(), p);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use meadowcap::AccessMode;
//! use meadowcap_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::communal(2);
//! let cap = fixture.source(AccessMode::Write, 0).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{keypair_with_last_bit, multi_namespace_fixtures, NamespaceKind, TestFixture};
pub use generators::{product, product_from_params, ProductParams};
pub use vectors::{all_vectors, encode_vector, vectors_json, verify_all_vectors, GoldenVector, VectorInput};
