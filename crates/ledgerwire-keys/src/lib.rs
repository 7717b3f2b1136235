//! # Ledgerwire Keys
//!
//! Seeds, deterministic key derivation and signatures for the two curve
//! families the ledger accepts.
//!
//! - **Ed25519**: the private key is SHA-512/half of the seed entropy;
//!   signatures are over the raw signing blob.
//! - **secp256k1**: the private key comes from an iterative scalar search;
//!   signatures are ECDSA over SHA-512/half of the blob, DER-encoded, low-S.
//!
//! Secret-bearing types ([`Seed`], [`PrivateKey`]) zero themselves on drop
//! and can be destroyed early.

pub mod algorithm;
pub mod der;
pub mod derive;
pub mod error;
pub mod keys;
pub mod seed;

pub use algorithm::{
    algorithm_for, derive_keypair, sign, verify, verify_with, Ed25519Algorithm, KeyAlgorithm,
    Secp256k1Algorithm,
};
pub use der::DerSignature;
pub use error::{KeyError, Result};
pub use keys::{KeyPair, KeyType, PrivateKey, PublicKey, Signature};
pub use seed::Seed;
