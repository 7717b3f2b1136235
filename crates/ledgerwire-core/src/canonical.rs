//! Canonical object codec.
//!
//! Encoding sorts the fields of every object by `(type_code, field_code)`
//! and writes each as `header || value`, recursing into nested objects and
//! arrays. Decoding is the exact inverse and accepts nothing the encoder
//! would not have produced: fields must be strictly ascending, headers and
//! length prefixes shortest-form, amounts normalized.

use bytes::Bytes;
use tracing::trace;

use crate::binary::{BinaryParser, BinarySerializer};
use crate::definitions::{DefinitionsTable, FieldInfo};
use crate::error::{CodecError, Result};
use crate::field::FieldHeader;
use crate::types::{
    AccountId, Amount, Currency, Hash128, Hash160, Hash256, IssuedValue, MAX_NATIVE_DROPS,
};
use crate::value::{ArrayElement, FieldTree, FieldValue};

const OBJECT_END_MARKER: &str = "ObjectEndMarker";
const ARRAY_END_MARKER: &str = "ArrayEndMarker";

/// Whether a declared type (with its VL flag) has a wire form in the
/// closed value model.
fn has_wire_form(type_name: &str, is_variable_length: bool) -> bool {
    match type_name {
        "Blob" | "Vector256" => is_variable_length,
        "AccountID" => true,
        "UInt8" | "UInt16" | "UInt32" | "UInt64" | "Hash128" | "Hash160" | "Hash256"
        | "Amount" | "STObject" | "STArray" => !is_variable_length,
        _ => false,
    }
}

/// End-of-container headers, resolved from the table once per call.
struct Markers {
    object_end: FieldHeader,
    array_end: FieldHeader,
}

impl Markers {
    fn resolve(defs: &DefinitionsTable) -> Result<Self> {
        Ok(Self {
            object_end: defs.header(OBJECT_END_MARKER)?,
            array_end: defs.header(ARRAY_END_MARKER)?,
        })
    }

    fn is_marker(&self, header: FieldHeader) -> bool {
        header == self.object_end || header == self.array_end
    }
}

// ─── Encode ─────────────────────────────────────────────────────────────────

/// Encode a field tree to canonical bytes.
pub fn encode(defs: &DefinitionsTable, tree: &FieldTree) -> Result<Vec<u8>> {
    let markers = Markers::resolve(defs)?;
    let mut out = BinarySerializer::new();
    write_object(defs, &markers, tree, &mut out)?;
    Ok(out.into_bytes())
}

/// Encode a field tree to upper-case hex.
pub fn encode_hex(defs: &DefinitionsTable, tree: &FieldTree) -> Result<String> {
    Ok(hex::encode_upper(encode(defs, tree)?))
}

fn write_object(
    defs: &DefinitionsTable,
    markers: &Markers,
    tree: &FieldTree,
    out: &mut BinarySerializer,
) -> Result<()> {
    let mut fields = Vec::with_capacity(tree.len());
    for (name, value) in tree.iter() {
        let info = defs.field_info(name)?;
        if !info.is_serialized {
            trace!(field = name, "skipping non-serialized field");
            continue;
        }
        let header = defs.header(name)?;
        if markers.is_marker(header) {
            return Err(CodecError::InvalidValue {
                field: name.to_string(),
                reason: "end markers are written by the encoder, not supplied".into(),
            });
        }
        fields.push((header, info, value));
    }
    fields.sort_by_key(|(header, ..)| *header);

    for (header, info, value) in fields {
        trace!(field = %info.field_name, ?header, "encoding field");
        out.write_header(header);
        write_value(defs, markers, info, value, out)?;
    }
    Ok(())
}

fn write_value(
    defs: &DefinitionsTable,
    markers: &Markers,
    info: &FieldInfo,
    value: &FieldValue,
    out: &mut BinarySerializer,
) -> Result<()> {
    if !has_wire_form(&info.type_name, info.is_variable_length) {
        return Err(CodecError::UnsupportedType {
            field: info.field_name.clone(),
            type_name: info.type_name.clone(),
        });
    }
    if value.type_name() != info.type_name {
        return Err(CodecError::TypeMismatch {
            field: info.field_name.clone(),
            expected: info.type_name.clone(),
            found: value.type_name(),
        });
    }

    match value {
        FieldValue::Object(inner) => {
            write_object(defs, markers, inner, out)?;
            out.write_header(markers.object_end);
        }
        FieldValue::Array(elements) => {
            for element in elements {
                let element_info = defs.field_info(&element.field)?;
                if element_info.type_name != "STObject" {
                    return Err(CodecError::TypeMismatch {
                        field: format!("{}.{}", info.field_name, element.field),
                        expected: "STObject".into(),
                        found: "array element",
                    });
                }
                out.write_header(defs.header(&element.field)?);
                write_object(defs, markers, &element.object, out)?;
                out.write_header(markers.object_end);
            }
            out.write_header(markers.array_end);
        }
        scalar => {
            let mut bytes = Vec::new();
            write_scalar(info, scalar, &mut bytes)?;
            if info.is_variable_length {
                out.write_vl(&bytes)?;
            } else {
                out.write_bytes(&bytes);
            }
        }
    }
    Ok(())
}

fn write_scalar(info: &FieldInfo, value: &FieldValue, buf: &mut Vec<u8>) -> Result<()> {
    match value {
        FieldValue::UInt8(v) => buf.push(*v),
        FieldValue::UInt16(v) => buf.extend_from_slice(&v.to_be_bytes()),
        FieldValue::UInt32(v) => buf.extend_from_slice(&v.to_be_bytes()),
        FieldValue::UInt64(v) => buf.extend_from_slice(&v.to_be_bytes()),
        FieldValue::Hash128(h) => buf.extend_from_slice(h.as_bytes()),
        FieldValue::Hash160(h) => buf.extend_from_slice(h.as_bytes()),
        FieldValue::Hash256(h) => buf.extend_from_slice(h.as_bytes()),
        FieldValue::AccountId(a) => buf.extend_from_slice(a.as_bytes()),
        FieldValue::Blob(b) => buf.extend_from_slice(b),
        FieldValue::Vector256(hashes) => {
            for h in hashes {
                buf.extend_from_slice(h.as_bytes());
            }
        }
        FieldValue::Amount(amount) => {
            amount.write_to(buf).map_err(|e| match e {
                CodecError::InvalidValue { reason, .. } => CodecError::InvalidValue {
                    field: info.field_name.clone(),
                    reason,
                },
                other => other,
            })?;
        }
        FieldValue::Object(_) | FieldValue::Array(_) => {
            return Err(CodecError::TypeMismatch {
                field: info.field_name.clone(),
                expected: info.type_name.clone(),
                found: value.type_name(),
            })
        }
    }
    Ok(())
}

// ─── Decode ─────────────────────────────────────────────────────────────────

/// Decode canonical bytes into a field tree.
pub fn decode(defs: &DefinitionsTable, bytes: &[u8]) -> Result<FieldTree> {
    let markers = Markers::resolve(defs)?;
    let mut parser = BinaryParser::new(bytes);
    read_object(defs, &markers, &mut parser, false)
}

/// Decode hex-encoded canonical bytes into a field tree.
pub fn decode_hex(defs: &DefinitionsTable, hex_blob: &str) -> Result<FieldTree> {
    let bytes = hex::decode(hex_blob)?;
    decode(defs, &bytes)
}

/// Read fields until the object-end marker (nested) or end of input (top level).
fn read_object(
    defs: &DefinitionsTable,
    markers: &Markers,
    parser: &mut BinaryParser<'_>,
    nested: bool,
) -> Result<FieldTree> {
    let mut tree = FieldTree::new();
    let mut previous: Option<FieldHeader> = None;

    loop {
        if !nested && parser.is_at_end() {
            break;
        }
        let offset = parser.position();
        let header = parser.read_header()?;

        if header == markers.object_end {
            if nested {
                break;
            }
            return Err(CodecError::TrailingBytes {
                offset,
                remaining: parser.remaining() + header.encoded_len(),
            });
        }
        if header == markers.array_end {
            return Err(CodecError::NonCanonical {
                offset,
                reason: "array end marker outside an array".into(),
            });
        }

        let info = defs
            .field_by_header(&header)
            .ok_or(CodecError::UnknownHeader {
                type_code: header.type_code,
                field_code: header.field_code,
                offset,
            })?;
        if let Some(prev) = previous {
            if header <= prev {
                return Err(CodecError::NonCanonical {
                    offset,
                    reason: format!(
                        "field {} out of canonical order or repeated",
                        info.field_name
                    ),
                });
            }
        }
        previous = Some(header);

        let value = read_value(defs, markers, parser, info)?;
        trace!(field = %info.field_name, offset, "decoded field");
        tree.insert(info.field_name.clone(), value);
    }
    Ok(tree)
}

fn read_value(
    defs: &DefinitionsTable,
    markers: &Markers,
    parser: &mut BinaryParser<'_>,
    info: &FieldInfo,
) -> Result<FieldValue> {
    let offset = parser.position();
    let non_canonical = |reason: String| CodecError::NonCanonical { offset, reason };

    let value = match (info.type_name.as_str(), info.is_variable_length) {
        ("STObject", false) => FieldValue::Object(read_object(defs, markers, parser, true)?),
        ("STArray", false) => FieldValue::Array(read_array(defs, markers, parser)?),
        ("UInt8", false) => FieldValue::UInt8(parser.read_u8()?),
        ("UInt16", false) => FieldValue::UInt16(u16::from_be_bytes(parser.read_array()?)),
        ("UInt32", false) => FieldValue::UInt32(u32::from_be_bytes(parser.read_array()?)),
        ("UInt64", false) => FieldValue::UInt64(u64::from_be_bytes(parser.read_array()?)),
        ("Hash128", false) => FieldValue::Hash128(Hash128(parser.read_array()?)),
        ("Hash160", false) => FieldValue::Hash160(Hash160(parser.read_array()?)),
        ("Hash256", false) => FieldValue::Hash256(Hash256(parser.read_array()?)),
        ("AccountID", false) => FieldValue::AccountId(AccountId(parser.read_array()?)),
        ("Amount", false) => FieldValue::Amount(read_amount(parser)?),
        ("Blob", true) => FieldValue::Blob(Bytes::copy_from_slice(parser.read_vl()?)),
        ("AccountID", true) => {
            let data = parser.read_vl()?;
            let id = AccountId::try_from(data).map_err(|_| {
                non_canonical(format!("{} must be 20 bytes, got {}", info.field_name, data.len()))
            })?;
            FieldValue::AccountId(id)
        }
        ("Vector256", true) => {
            let data = parser.read_vl()?;
            if data.len() % Hash256::LEN != 0 {
                return Err(non_canonical(format!(
                    "{} length {} is not a multiple of 32",
                    info.field_name,
                    data.len()
                )));
            }
            let hashes = data
                .chunks_exact(Hash256::LEN)
                .map(|chunk| Hash256::try_from(chunk))
                .collect::<Result<Vec<_>>>()?;
            FieldValue::Vector256(hashes)
        }
        _ => {
            return Err(CodecError::UnsupportedType {
                field: info.field_name.clone(),
                type_name: info.type_name.clone(),
            })
        }
    };
    Ok(value)
}

fn read_array(
    defs: &DefinitionsTable,
    markers: &Markers,
    parser: &mut BinaryParser<'_>,
) -> Result<Vec<ArrayElement>> {
    let mut elements = Vec::new();
    loop {
        let offset = parser.position();
        let header = parser.read_header()?;
        if header == markers.array_end {
            return Ok(elements);
        }
        if header == markers.object_end {
            return Err(CodecError::NonCanonical {
                offset,
                reason: "object end marker where an array element was expected".into(),
            });
        }
        let info = defs
            .field_by_header(&header)
            .ok_or(CodecError::UnknownHeader {
                type_code: header.type_code,
                field_code: header.field_code,
                offset,
            })?;
        if info.type_name != "STObject" {
            return Err(CodecError::NonCanonical {
                offset,
                reason: format!("array element {} is not an object", info.field_name),
            });
        }
        let object = read_object(defs, markers, parser, true)?;
        elements.push(ArrayElement::new(info.field_name.clone(), object));
    }
}

fn read_amount(parser: &mut BinaryParser<'_>) -> Result<Amount> {
    let offset = parser.position();
    let word = u64::from_be_bytes(parser.read_array()?);
    let non_canonical = |reason: &str| CodecError::NonCanonical {
        offset,
        reason: reason.to_string(),
    };

    if word >> 63 == 0 {
        if (word >> 62) & 1 == 0 {
            return Err(non_canonical("native amount without the positive bit"));
        }
        let drops = word & ((1 << 62) - 1);
        if drops > MAX_NATIVE_DROPS {
            return Err(non_canonical("native amount above 10^17 drops"));
        }
        return Ok(Amount::Native(drops));
    }

    let value = IssuedValue::from_word(word).map_err(non_canonical)?;
    let currency = Currency(parser.read_array()?);
    let issuer = AccountId(parser.read_array()?);
    if currency.standard_code() == Some("XRP") {
        return Err(non_canonical("issued amount with XRP currency"));
    }
    Ok(Amount::Issued {
        value,
        currency,
        issuer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYMENT_HEX: &str = "120000228000000024000000016140000000000003E868400000000000000A\
        73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020\
        8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
        83140102030405060708090A0B0C0D0E0F1011121314";

    fn defs() -> DefinitionsTable {
        DefinitionsTable::embedded().unwrap()
    }

    fn destination() -> AccountId {
        let mut bytes = [0u8; 20];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8 + 1;
        }
        AccountId(bytes)
    }

    fn payment() -> FieldTree {
        FieldTree::new()
            .with("TransactionType", 0u16)
            .with("Flags", 0x8000_0000u32)
            .with("Sequence", 1u32)
            .with("Amount", Amount::Native(1000))
            .with("Fee", Amount::Native(10))
            .with(
                "SigningPubKey",
                hex::decode("0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020")
                    .unwrap(),
            )
            .with(
                "Account",
                AccountId::from_hex("B5F762798A53D543A014CAF8B297CFF8F2F937E8").unwrap(),
            )
            .with("Destination", destination())
    }

    #[test]
    fn test_payment_golden() {
        let defs = defs();
        assert_eq!(encode_hex(&defs, &payment()).unwrap(), PAYMENT_HEX);
        assert_eq!(decode_hex(&defs, PAYMENT_HEX).unwrap(), payment());
    }

    #[test]
    fn test_insertion_order_does_not_change_bytes() {
        let defs = defs();
        let reversed: FieldTree = payment().into_iter().rev().collect();
        let mut shuffled = FieldTree::new();
        for (name, value) in payment().into_iter().filter(|(n, _)| n.len() % 2 == 0) {
            shuffled.insert(name, value);
        }
        for (name, value) in payment().into_iter().filter(|(n, _)| n.len() % 2 == 1) {
            shuffled.insert(name, value);
        }
        let expected = encode(&defs, &payment()).unwrap();
        assert_eq!(encode(&defs, &reversed).unwrap(), expected);
        assert_eq!(encode(&defs, &shuffled).unwrap(), expected);
    }

    #[test]
    fn test_type_order_not_name_order() {
        let defs = defs();
        let account = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";
        let tree = FieldTree::new()
            .with("Account", AccountId::from_hex(account).unwrap())
            .with("Fee", Amount::Native(10))
            .with("Sequence", 1u32);
        let names: Vec<String> = tree.clone().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Account", "Fee", "Sequence"]);

        // UInt32 (2) < Amount (6) < AccountID (8)
        let sequence = "2400000001";
        let fee = "68400000000000000A";
        let account_field = format!("8114{}", account);
        assert_eq!(
            encode_hex(&defs, &tree).unwrap(),
            format!("{}{}{}", sequence, fee, account_field)
        );

        let by_name = format!("{}{}{}", account_field, fee, sequence);
        assert!(matches!(
            decode_hex(&defs, &by_name),
            Err(CodecError::NonCanonical { offset: 22, .. })
        ));
    }

    #[test]
    fn test_memos_array() {
        let defs = defs();
        let memo = FieldTree::new().with("MemoData", vec![0xABu8]);
        let tree = FieldTree::new().with("Memos", vec![ArrayElement::new("Memo", memo)]);
        let hex = encode_hex(&defs, &tree).unwrap();
        assert_eq!(hex, "F9EA7D01ABE1F1");
        assert_eq!(decode_hex(&defs, &hex).unwrap(), tree);
    }

    #[test]
    fn test_nested_object_and_vector256() {
        let defs = defs();
        let tree = FieldTree::new()
            .with("LedgerEntryType", 0x0061u16)
            .with("OwnerNode", 7u64)
            .with(
                "Indexes",
                FieldValue::Vector256(vec![Hash256([1; 32]), Hash256([2; 32])]),
            )
            .with(
                "PreviousFields",
                FieldTree::new().with("Sequence", 3u32).with("TickSize", 5u8),
            );
        let bytes = encode(&defs, &tree).unwrap();
        assert_eq!(decode(&defs, &bytes).unwrap(), tree);
    }

    #[test]
    fn test_issued_amount_roundtrip() {
        let defs = defs();
        let amount = Amount::Issued {
            value: "-12.5".parse().unwrap(),
            currency: Currency::from_code("USD").unwrap(),
            issuer: destination(),
        };
        let tree = FieldTree::new().with("Amount", amount);
        let bytes = encode(&defs, &tree).unwrap();
        assert_eq!(bytes.len(), 1 + 48);
        assert_eq!(decode(&defs, &bytes).unwrap(), tree);
    }

    #[test]
    fn test_non_serialized_field_skipped() {
        let defs = defs();
        let mut tree = payment();
        tree.insert("hash", Hash256([9; 32]));
        assert_eq!(encode_hex(&defs, &tree).unwrap(), PAYMENT_HEX);
    }

    #[test]
    fn test_encode_errors() {
        let defs = defs();
        assert!(matches!(
            encode(&defs, &FieldTree::new().with("NotAField", 1u32)),
            Err(CodecError::UnknownField(_))
        ));
        assert!(matches!(
            encode(&defs, &FieldTree::new().with("Sequence", 1u16)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode(&defs, &FieldTree::new().with("Paths", 1u32)),
            Err(CodecError::UnsupportedType { .. })
        ));
        assert!(matches!(
            encode(&defs, &FieldTree::new().with("Amount", Amount::Native(u64::MAX))),
            Err(CodecError::InvalidValue { .. })
        ));
        let bad_element = FieldTree::new().with(
            "Memos",
            vec![ArrayElement::new("Sequence", FieldTree::new())],
        );
        assert!(matches!(
            encode(&defs, &bad_element),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_blob_too_large() {
        let defs = defs();
        let tree = FieldTree::new().with("MemoData", vec![0u8; 918_745]);
        assert!(matches!(
            encode(&defs, &tree),
            Err(CodecError::ValueTooLarge { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_out_of_order_and_duplicates() {
        let defs = defs();
        assert!(matches!(
            decode_hex(&defs, "2400000001120000"),
            Err(CodecError::NonCanonical { offset: 5, .. })
        ));
        assert!(matches!(
            decode_hex(&defs, "24000000012400000002"),
            Err(CodecError::NonCanonical { offset: 5, .. })
        ));
    }

    #[test]
    fn test_decode_malformed_input() {
        let defs = defs();
        let trailing = format!("{}E1", PAYMENT_HEX);
        assert!(matches!(
            decode_hex(&defs, &trailing),
            Err(CodecError::TrailingBytes { remaining: 1, .. })
        ));
        assert!(matches!(
            decode_hex(&defs, "24000000"),
            Err(CodecError::TruncatedInput { .. })
        ));
        assert!(matches!(
            decode_hex(&defs, "202F00000000"),
            Err(CodecError::UnknownHeader { offset: 0, .. })
        ));
        assert!(matches!(
            decode_hex(&defs, "200400000001"),
            Err(CodecError::MalformedHeader { .. })
        ));
        // nested object never closed
        assert!(matches!(
            decode_hex(&defs, "E62400000001"),
            Err(CodecError::TruncatedInput { .. })
        ));
        assert!(decode_hex(&defs, "zz").unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_decode_rejects_non_canonical_amounts() {
        let defs = defs();
        // native amount with the sign bit cleared
        assert!(matches!(
            decode_hex(&defs, "6100000000000003E8"),
            Err(CodecError::NonCanonical { .. })
        ));
        // issued mantissa 1, exponent 0: not normalized
        let word = (1u64 << 63) | (1 << 62) | (97u64 << 54) | 1;
        let hex = format!("61{:016X}{}", word, "00".repeat(40));
        assert!(matches!(
            decode_hex(&defs, &hex),
            Err(CodecError::NonCanonical { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_short_account_id() {
        let defs = defs();
        assert!(matches!(
            decode_hex(&defs, "8102AABB"),
            Err(CodecError::NonCanonical { .. })
        ));
    }
}
