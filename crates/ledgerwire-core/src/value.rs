//! The field-tree value model.
//!
//! A [`FieldTree`] maps field names to [`FieldValue`]s. Insertion order does
//! not matter: the codec always recomputes canonical order from the
//! definitions table.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{AccountId, Amount, Hash128, Hash160, Hash256};

/// One value of a closed set of field kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Hash128(Hash128),
    Hash160(Hash160),
    Hash256(Hash256),
    Blob(Bytes),
    AccountId(AccountId),
    Amount(Amount),
    Vector256(Vec<Hash256>),
    Object(FieldTree),
    Array(Vec<ArrayElement>),
}

impl FieldValue {
    /// The definitions-table type name this value encodes as.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::UInt8(_) => "UInt8",
            FieldValue::UInt16(_) => "UInt16",
            FieldValue::UInt32(_) => "UInt32",
            FieldValue::UInt64(_) => "UInt64",
            FieldValue::Hash128(_) => "Hash128",
            FieldValue::Hash160(_) => "Hash160",
            FieldValue::Hash256(_) => "Hash256",
            FieldValue::Blob(_) => "Blob",
            FieldValue::AccountId(_) => "AccountID",
            FieldValue::Amount(_) => "Amount",
            FieldValue::Vector256(_) => "Vector256",
            FieldValue::Object(_) => "STObject",
            FieldValue::Array(_) => "STArray",
        }
    }

    /// An empty blob.
    pub fn empty_blob() -> Self {
        FieldValue::Blob(Bytes::new())
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Bytes> {
        match self {
            FieldValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_account_id(&self) -> Option<&AccountId> {
        match self {
            FieldValue::AccountId(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_hash256(&self) -> Option<&Hash256> {
        match self {
            FieldValue::Hash256(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FieldTree> {
        match self {
            FieldValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ArrayElement]> {
        match self {
            FieldValue::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::UInt8(v)
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        FieldValue::UInt16(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::UInt32(v)
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt64(v)
    }
}

impl From<Hash256> for FieldValue {
    fn from(v: Hash256) -> Self {
        FieldValue::Hash256(v)
    }
}

impl From<AccountId> for FieldValue {
    fn from(v: AccountId) -> Self {
        FieldValue::AccountId(v)
    }
}

impl From<Amount> for FieldValue {
    fn from(v: Amount) -> Self {
        FieldValue::Amount(v)
    }
}

impl From<Bytes> for FieldValue {
    fn from(v: Bytes) -> Self {
        FieldValue::Blob(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Blob(Bytes::from(v))
    }
}

impl From<FieldTree> for FieldValue {
    fn from(v: FieldTree) -> Self {
        FieldValue::Object(v)
    }
}

impl From<Vec<ArrayElement>> for FieldValue {
    fn from(v: Vec<ArrayElement>) -> Self {
        FieldValue::Array(v)
    }
}

/// One element of an array: a single named inner object, e.g. a `Memo`
/// inside `Memos` or a `Signer` inside `Signers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayElement {
    pub field: String,
    pub object: FieldTree,
}

impl ArrayElement {
    pub fn new(field: impl Into<String>, object: FieldTree) -> Self {
        Self {
            field: field.into(),
            object,
        }
    }
}

/// A transaction or nested ledger object: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldTree(BTreeMap<String, FieldValue>);

impl FieldTree {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the fields for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &FieldValue) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }
}

impl FromIterator<(String, FieldValue)> for FieldTree {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldTree {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
