//! # Ledgerwire Core
//!
//! The canonical binary format for ledger transactions.
//!
//! This crate contains no key material and no I/O beyond loading a
//! definitions file. It turns a [`FieldTree`] into the exact bytes the ledger
//! network hashes and signs, and back.
//!
//! ## Key Types
//!
//! - [`DefinitionsTable`] - Field name to type, ordinal and signing flag
//! - [`FieldHeader`] - The 1-3 byte wire tag of a field
//! - [`FieldTree`] / [`FieldValue`] - The closed value model
//! - [`Amount`] - Native drops or an issued-currency amount
//!
//! ## Canonical order
//!
//! Fields are always written sorted by `(type_code, field_code)`; see the
//! [`canonical`] module. The [`signing`] module builds the prefixed blobs
//! that get signed.

pub mod binary;
pub mod canonical;
pub mod definitions;
pub mod error;
pub mod field;
pub mod hash;
pub mod signing;
pub mod types;
pub mod value;

pub use canonical::{decode, decode_hex, encode, encode_hex};
pub use definitions::{DefinitionsTable, FieldInfo};
pub use error::{CodecError, Result};
pub use field::{decode_field_id, encode_field_id, FieldHeader};
pub use hash::{HashPrefix, Sha512Half};
pub use signing::{
    encode_for_multisigning, encode_for_multisigning_batch, encode_for_signing,
    encode_for_signing_batch, encode_for_signing_claim, inner_transaction_id,
    remove_non_signing_fields, transaction_hash, transaction_id, Batch,
};
pub use types::{AccountId, Amount, Currency, Hash128, Hash160, Hash256, IssuedValue};
pub use value::{ArrayElement, FieldTree, FieldValue};
