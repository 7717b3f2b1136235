//! Field header codec.
//!
//! A header packs `(type_code, field_code)` into one to three bytes:
//!
//! ```text
//! type < 16,  field < 16   [type << 4 | field]
//! type < 16,  field >= 16  [type << 4, field]
//! type >= 16, field < 16   [field, type]
//! type >= 16, field >= 16  [0, type, field]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::definitions::DefinitionsTable;
use crate::error::{CodecError, Result};

/// Maximum encoded header length in bytes.
pub const MAX_HEADER_LEN: usize = 3;

/// Wire identity of a field: its type ordinal and its ordinal within that type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldHeader {
    pub type_code: u16,
    pub field_code: u16,
}

impl FieldHeader {
    pub const fn new(type_code: u16, field_code: u16) -> Self {
        Self {
            type_code,
            field_code,
        }
    }

    /// Number of bytes this header occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        match (self.type_code < 16, self.field_code < 16) {
            (true, true) => 1,
            (false, false) => 3,
            _ => 2,
        }
    }

    /// Append the header bytes to `buf`.
    ///
    /// Both codes must fit in a byte; the definitions table guarantees this
    /// for every serialized field.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        let type_code = self.type_code as u8;
        let field_code = self.field_code as u8;
        if self.type_code < 16 {
            if self.field_code < 16 {
                buf.push(type_code << 4 | field_code);
            } else {
                buf.push(type_code << 4);
                buf.push(field_code);
            }
        } else if self.field_code < 16 {
            buf.push(field_code);
            buf.push(type_code);
        } else {
            buf.push(0);
            buf.push(type_code);
            buf.push(field_code);
        }
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MAX_HEADER_LEN);
        self.write_to(&mut buf);
        buf
    }

    /// Length of the header whose first byte is `first`.
    pub fn len_from_first_byte(first: u8) -> usize {
        match (first >> 4, first & 0x0f) {
            (0, 0) => 3,
            (0, _) | (_, 0) => 2,
            _ => 1,
        }
    }

    /// Decode a complete header.
    ///
    /// `bytes` must be exactly the header, in its shortest form; anything
    /// else is rejected rather than normalized.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, &'static str> {
        let first = *bytes.first().ok_or("empty header")?;
        if bytes.len() > MAX_HEADER_LEN {
            return Err("header longer than 3 bytes");
        }
        if bytes.len() != Self::len_from_first_byte(first) {
            return Err("header length does not match its first byte");
        }

        let high = (first >> 4) as u16;
        let low = (first & 0x0f) as u16;
        let header = match bytes.len() {
            1 => Self::new(high, low),
            2 if high == 0 => Self::new(bytes[1] as u16, low),
            2 => Self::new(high, bytes[1] as u16),
            _ => Self::new(bytes[1] as u16, bytes[2] as u16),
        };

        // Extended bytes must carry values that did not fit in a nibble.
        if (bytes.len() == 2 && high == 0 && header.type_code < 16)
            || (bytes.len() == 2 && high != 0 && header.field_code < 16)
            || (bytes.len() == 3 && (header.type_code < 16 || header.field_code < 16))
        {
            return Err("header not in shortest form");
        }

        Ok(header)
    }
}

impl fmt::Debug for FieldHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldHeader({}, {})", self.type_code, self.field_code)
    }
}

/// Encode a field name as its hex header.
pub fn encode_field_id(defs: &DefinitionsTable, field_name: &str) -> Result<String> {
    let header = defs.header(field_name)?;
    Ok(hex::encode_upper(header.to_bytes()))
}

/// Decode a hex header back to the field name.
pub fn decode_field_id<'a>(defs: &'a DefinitionsTable, hex_header: &str) -> Result<&'a str> {
    let malformed = |reason| CodecError::MalformedHeader {
        input: hex_header.to_string(),
        reason,
    };

    if hex_header.len() < 2 {
        return Err(malformed("shorter than one byte"));
    }
    let bytes = hex::decode(hex_header).map_err(|_| malformed("not valid hex"))?;
    if bytes.len() > MAX_HEADER_LEN {
        return Err(malformed("hex value too large"));
    }

    let header = FieldHeader::from_bytes(&bytes).map_err(malformed)?;
    defs.field_by_header(&header)
        .map(|info| info.field_name.as_str())
        .ok_or(CodecError::UnknownHeader {
            type_code: header.type_code,
            field_code: header.field_code,
            offset: 0,
        })
}
