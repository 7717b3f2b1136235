//! # Ledgerwire Testkit
//!
//! Testing utilities for ledgerwire.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Fixed seeds and payments with their expected signed bytes and hashes
//! - **Generators**: Proptest strategies for field trees, amounts and signing inputs
//! - **Fixtures**: A shared definitions table, sample transactions and signer setups
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ledgerwire_testkit::fixtures::engine;
//! use ledgerwire_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, hash) in verify_all_vectors(&engine()) {
//!     println!("{}: {} {}", name, matches, hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ledgerwire_testkit::fixtures::engine;
//! use ledgerwire_testkit::generators::payment;
//!
//! proptest! {
//!     #[test]
//!     fn encoding_is_deterministic(tx in payment()) {
//!         let engine = engine();
//!         prop_assert_eq!(engine.encode(&tx).unwrap(), engine.encode(&tx).unwrap());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ledgerwire_testkit::fixtures::TestFixture;
//! use ledgerwire_keys::KeyType;
//!
//! let fixture = TestFixture::with_tag(1, KeyType::Ed25519);
//! let signed = fixture.sign(&fixture.payment(1, 1_000));
//! println!("{}", signed.hash_hex());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{definitions, engine, multi_party_fixtures, sample_payment, TestFixture};
pub use generators::SigningParams;
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
