//! # Ledgerwire
//!
//! Canonical binary encoding and signing for ledger transactions.
//!
//! ## Overview
//!
//! Ledgerwire turns a transaction field tree into the exact bytes the ledger
//! network hashes and signs, and produces or checks signatures over them:
//!
//! - **Codec**: Field headers, canonical field order, strict decoding
//! - **Signing blobs**: Single, multi-signer, payment-channel claim, batch
//! - **Keys**: Deterministic secp256k1 and Ed25519 derivation from a seed
//! - **Engine**: Sign, multi-sign, assemble and verify transactions
//!
//! ## Key Concepts
//!
//! - **Definitions table**: Field name to type, ordinal and signing flag. Built
//!   once and shared.
//! - **Canonical order**: Fields sorted by `(type_code, field_code)`. Two
//!   encoders that disagree produce incompatible signatures.
//! - **Low S**: secp256k1 signatures are always produced with `s <= n/2`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ledgerwire::{SigningEngine, FieldTree, Amount, AccountId};
//! use ledgerwire::keys::{KeyType, Seed};
//!
//! fn example() -> ledgerwire::Result<()> {
//!     let engine = SigningEngine::with_embedded_definitions()?;
//!     let seed = Seed::from_passphrase("masterpassphrase", KeyType::Secp256k1)?;
//!
//!     let tx = FieldTree::new()
//!         .with("TransactionType", 0u16)
//!         .with("Sequence", 1u32)
//!         .with("Amount", Amount::Native(1_000))
//!         .with("Fee", Amount::Native(10))
//!         .with("Account", AccountId::ZERO)
//!         .with("Destination", AccountId::ZERO);
//!
//!     let signed = engine.sign_with_seed(&seed, &tx)?;
//!     println!("{} {}", signed.hash_hex(), signed.tx_blob_hex());
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ledgerwire::core` - Definitions, value model, codec, signing blobs
//! - `ledgerwire::keys` - Seeds, key pairs, signature algorithms

pub mod engine;
pub mod error;

// Re-export component crates
pub use ledgerwire_core as core;
pub use ledgerwire_keys as keys;

// Re-export main types for convenience
pub use engine::{
    EngineConfig, SignedTransaction, SignerEntry, SigningEngine, SigningRequest, BATCH_SIGNER,
    SIGNER, SIGNERS,
};
pub use error::{EngineError, Result};

// Re-export commonly used component types
pub use ledgerwire_core::{
    AccountId, Amount, ArrayElement, Batch, DefinitionsTable, FieldTree, FieldValue, Hash256,
};
pub use ledgerwire_keys::{KeyPair, KeyType, PublicKey, Seed, Signature};
