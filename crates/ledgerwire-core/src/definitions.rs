//! The definitions table: field names, types and ordinals.
//!
//! The table is external data in the ledger's standard `definitions.json`
//! layout (`TYPES`, `FIELDS`, `TRANSACTION_TYPES`, `LEDGER_ENTRY_TYPES`). It is
//! parsed once and is read-only afterwards; share it behind an `Arc` and pass
//! it to every codec entry point.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::field::FieldHeader;

/// The bundled table shipped with the crate.
const EMBEDDED_DEFINITIONS: &str = include_str!("../data/definitions.json");

/// Everything the codec knows about one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub field_name: String,
    pub type_name: String,
    pub nth: u16,
    pub is_signing_field: bool,
    pub is_variable_length: bool,
    pub is_serialized: bool,
}

/// Raw per-field attributes as they appear in `definitions.json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldInfo {
    nth: i32,
    #[serde(rename = "isVLEncoded")]
    is_vl_encoded: bool,
    is_serialized: bool,
    is_signing_field: bool,
    #[serde(rename = "type")]
    type_name: String,
}

#[derive(Debug, Deserialize)]
struct RawDefinitions {
    #[serde(rename = "TYPES")]
    types: HashMap<String, i32>,
    #[serde(rename = "FIELDS")]
    fields: Vec<(String, RawFieldInfo)>,
    #[serde(rename = "TRANSACTION_TYPES", default)]
    transaction_types: HashMap<String, i32>,
    #[serde(rename = "LEDGER_ENTRY_TYPES", default)]
    ledger_entry_types: HashMap<String, i32>,
}

/// Immutable lookup tables built from `definitions.json`.
#[derive(Debug, Clone)]
pub struct DefinitionsTable {
    fields: HashMap<String, FieldInfo>,
    type_ordinals: HashMap<String, u16>,
    by_header: HashMap<FieldHeader, String>,
    transaction_types: HashMap<String, u16>,
    transaction_type_names: HashMap<u16, String>,
    ledger_entry_types: HashMap<String, u16>,
}

impl DefinitionsTable {
    /// Parse the bundled table.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_DEFINITIONS)
    }

    /// Load a table from a `definitions.json` file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CodecError::Definitions(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    /// Parse a table from JSON text.
    ///
    /// Every serialized field must have `1 <= nth <= 255` and no two
    /// serialized fields may share a header.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawDefinitions =
            serde_json::from_str(json).map_err(|e| CodecError::Definitions(e.to_string()))?;

        // Only ordinals that can appear on the wire get an entry.
        let type_ordinals: HashMap<String, u16> = raw
            .types
            .iter()
            .filter(|(_, &ordinal)| (1..=255).contains(&ordinal))
            .map(|(name, &ordinal)| (name.clone(), ordinal as u16))
            .collect();

        let mut fields = HashMap::with_capacity(raw.fields.len());
        let mut by_header = HashMap::with_capacity(raw.fields.len());

        for (name, info) in raw.fields {
            // A serialized field whose type has no wire ordinal stays in the
            // table but is unreachable from headers; lookups report UnknownType.
            let type_code = type_ordinals.get(&info.type_name).copied();
            if let (true, Some(type_code)) = (info.is_serialized, type_code) {
                if !(1..=255).contains(&info.nth) {
                    return Err(CodecError::Definitions(format!(
                        "serialized field {} has nth {} outside 1..=255",
                        name, info.nth
                    )));
                }
                let header = FieldHeader::new(type_code, info.nth as u16);
                if let Some(existing) = by_header.insert(header, name.clone()) {
                    return Err(CodecError::Definitions(format!(
                        "fields {} and {} share header {:?}",
                        existing, name, header
                    )));
                }
            }

            let nth = u16::try_from(info.nth).unwrap_or(0);
            fields.insert(
                name.clone(),
                FieldInfo {
                    field_name: name,
                    type_name: info.type_name,
                    nth,
                    is_signing_field: info.is_signing_field,
                    is_variable_length: info.is_vl_encoded,
                    is_serialized: info.is_serialized,
                },
            );
        }

        let transaction_types: HashMap<String, u16> = raw
            .transaction_types
            .into_iter()
            .filter_map(|(name, code)| u16::try_from(code).ok().map(|c| (name, c)))
            .collect();
        let transaction_type_names = transaction_types
            .iter()
            .map(|(name, &code)| (code, name.clone()))
            .collect();
        let ledger_entry_types = raw
            .ledger_entry_types
            .into_iter()
            .filter_map(|(name, code)| u16::try_from(code).ok().map(|c| (name, c)))
            .collect();

        Ok(Self {
            fields,
            type_ordinals,
            by_header,
            transaction_types,
            transaction_type_names,
            ledger_entry_types,
        })
    }

    /// Look up a field by name.
    pub fn field_info(&self, name: &str) -> Result<&FieldInfo> {
        self.fields
            .get(name)
            .ok_or_else(|| CodecError::UnknownField(name.to_string()))
    }

    /// Wire ordinal of a type name.
    pub fn type_ordinal(&self, type_name: &str) -> Option<u16> {
        self.type_ordinals.get(type_name).copied()
    }

    /// The header of a named field.
    pub fn header(&self, name: &str) -> Result<FieldHeader> {
        let info = self.field_info(name)?;
        if !info.is_serialized {
            return Err(CodecError::InvalidValue {
                field: name.to_string(),
                reason: "field is never serialized".into(),
            });
        }
        let type_code = self
            .type_ordinal(&info.type_name)
            .ok_or_else(|| CodecError::UnknownType {
                field: name.to_string(),
                type_name: info.type_name.clone(),
            })?;
        Ok(FieldHeader::new(type_code, info.nth))
    }

    /// Reverse lookup: the serialized field carrying `header`.
    pub fn field_by_header(&self, header: &FieldHeader) -> Option<&FieldInfo> {
        self.by_header
            .get(header)
            .and_then(|name| self.fields.get(name))
    }

    /// All fields, in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.values()
    }

    /// Numeric code of a transaction type such as `Payment`.
    pub fn transaction_type(&self, name: &str) -> Option<u16> {
        self.transaction_types.get(name).copied()
    }

    /// Name of a transaction type code.
    pub fn transaction_type_name(&self, code: u16) -> Option<&str> {
        self.transaction_type_names.get(&code).map(String::as_str)
    }

    /// Numeric code of a ledger entry type such as `AccountRoot`.
    pub fn ledger_entry_type(&self, name: &str) -> Option<u16> {
        self.ledger_entry_types.get(name).copied()
    }
}
