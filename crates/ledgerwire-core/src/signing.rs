//! Signing-blob constructors.
//!
//! Each function returns the exact bytes that are hashed (or, for Ed25519,
//! signed directly) for one protocol variant:
//!
//! | variant | bytes |
//! |---|---|
//! | single | `STX\0 ‖ encode(signing fields)` |
//! | multi | `SMT\0 ‖ encode(signing fields, SigningPubKey = "") ‖ signer` |
//! | claim | `CLM\0 ‖ Channel ‖ u64be(Amount)` |
//! | batch | `BCH\0 ‖ u32be(flags) ‖ u32be(count) ‖ inner ids...` |
//! | batch multi | batch bytes `‖ signer` |

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::canonical;
use crate::definitions::DefinitionsTable;
use crate::error::{CodecError, Result};
use crate::hash::{HashPrefix, Sha512Half};
use crate::types::{AccountId, Amount, Hash256};
use crate::value::{FieldTree, FieldValue};

pub const SIGNING_PUB_KEY: &str = "SigningPubKey";
pub const TXN_SIGNATURE: &str = "TxnSignature";
pub const FLAGS: &str = "Flags";

/// Keep only the top-level fields the table marks as signing fields.
///
/// Nested objects and arrays are copied as they are.
pub fn remove_non_signing_fields(defs: &DefinitionsTable, tx: &FieldTree) -> Result<FieldTree> {
    let mut out = FieldTree::new();
    for (name, value) in tx.iter() {
        if defs.field_info(name)?.is_signing_field {
            out.insert(name, value.clone());
        } else {
            trace!(field = name, "dropping non-signing field");
        }
    }
    Ok(out)
}

/// Bytes signed by a single signer.
pub fn encode_for_signing(defs: &DefinitionsTable, tx: &FieldTree) -> Result<Vec<u8>> {
    let filtered = remove_non_signing_fields(defs, tx)?;
    let mut blob = HashPrefix::TransactionSign.as_bytes().to_vec();
    blob.extend(canonical::encode(defs, &filtered)?);
    Ok(blob)
}

/// Bytes signed by one member of a multi-signature set.
pub fn encode_for_multisigning(
    defs: &DefinitionsTable,
    tx: &FieldTree,
    signer: &AccountId,
) -> Result<Vec<u8>> {
    let mut tx = tx.clone();
    tx.insert(SIGNING_PUB_KEY, FieldValue::empty_blob());
    let filtered = remove_non_signing_fields(defs, &tx)?;

    let mut blob = HashPrefix::TransactionMultiSign.as_bytes().to_vec();
    blob.extend(canonical::encode(defs, &filtered)?);
    blob.extend_from_slice(signer.as_bytes());
    Ok(blob)
}

/// Bytes signed to authorize a payment-channel claim.
///
/// Only `Channel` and `Amount` are read; the general object codec is not
/// involved.
pub fn encode_for_signing_claim(claim: &FieldTree) -> Result<Vec<u8>> {
    let channel = match claim.get("Channel").ok_or(CodecError::MissingField("Channel"))? {
        FieldValue::Hash256(h) => *h,
        other => {
            return Err(CodecError::TypeMismatch {
                field: "Channel".into(),
                expected: "Hash256".into(),
                found: other.type_name(),
            })
        }
    };
    let drops = match claim.get("Amount").ok_or(CodecError::MissingField("Amount"))? {
        FieldValue::Amount(Amount::Native(drops)) => *drops,
        other => {
            return Err(CodecError::TypeMismatch {
                field: "Amount".into(),
                expected: "native Amount".into(),
                found: other.type_name(),
            })
        }
    };

    let mut blob = HashPrefix::PaymentChannelClaim.as_bytes().to_vec();
    blob.extend_from_slice(channel.as_bytes());
    blob.extend_from_slice(&drops.to_be_bytes());
    Ok(blob)
}

/// A batch of inner transactions authorized together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub flags: u32,
    pub transactions: Vec<FieldTree>,
}

impl Batch {
    pub fn new(flags: u32, transactions: Vec<FieldTree>) -> Self {
        Self {
            flags,
            transactions,
        }
    }
}

/// Collapse a `Flags` field held as a one-entry object into its integer.
pub fn normalize_flags(tx: &mut FieldTree) -> Result<()> {
    let flags = match tx.get(FLAGS) {
        Some(FieldValue::Object(inner)) => {
            let mut values = inner.iter().map(|(_, v)| v);
            match (values.next(), values.next()) {
                (Some(FieldValue::UInt32(v)), None) => *v,
                _ => {
                    return Err(CodecError::TypeMismatch {
                        field: FLAGS.into(),
                        expected: "UInt32".into(),
                        found: "STObject",
                    })
                }
            }
        }
        _ => return Ok(()),
    };
    tx.insert(FLAGS, flags);
    Ok(())
}

/// Id of an inner batch transaction as committed to by the batch blob.
pub fn inner_transaction_id(defs: &DefinitionsTable, tx: &FieldTree) -> Result<Hash256> {
    let mut inner = remove_non_signing_fields(defs, tx)?;
    inner.insert(SIGNING_PUB_KEY, FieldValue::empty_blob());
    normalize_flags(&mut inner)?;
    let bytes = canonical::encode(defs, &inner)?;
    Ok(Sha512Half::hash_prefixed(HashPrefix::TransactionId, bytes))
}

/// Bytes signed to authorize a batch.
pub fn encode_for_signing_batch(defs: &DefinitionsTable, batch: &Batch) -> Result<Vec<u8>> {
    let count = u32::try_from(batch.transactions.len()).map_err(|_| CodecError::InvalidValue {
        field: "RawTransactions".into(),
        reason: "more inner transactions than a u32 can count".into(),
    })?;

    let mut blob = HashPrefix::Batch.as_bytes().to_vec();
    blob.extend_from_slice(&batch.flags.to_be_bytes());
    blob.extend_from_slice(&count.to_be_bytes());
    for tx in &batch.transactions {
        blob.extend_from_slice(inner_transaction_id(defs, tx)?.as_bytes());
    }
    Ok(blob)
}

/// Bytes signed by one member of a multi-signature set authorizing a batch.
pub fn encode_for_multisigning_batch(
    defs: &DefinitionsTable,
    batch: &Batch,
    signer: &AccountId,
) -> Result<Vec<u8>> {
    let mut blob = encode_for_signing_batch(defs, batch)?;
    blob.extend_from_slice(signer.as_bytes());
    Ok(blob)
}

/// Id of a fully encoded transaction.
pub fn transaction_id(tx_bytes: &[u8]) -> Hash256 {
    Sha512Half::hash_prefixed(HashPrefix::TransactionId, tx_bytes)
}

/// Id of a signed transaction tree.
pub fn transaction_hash(defs: &DefinitionsTable, signed: &FieldTree) -> Result<Hash256> {
    Ok(transaction_id(&canonical::encode(defs, signed)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MP_ACCOUNT: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";
    const MP_PUBLIC: &str = "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020";
    const ED_ACCOUNT: &str = "629CCC144AC8464561F11D8870A57DC376A0D191";
    const DESTINATION: &str = "0102030405060708090A0B0C0D0E0F1011121314";

    fn defs() -> DefinitionsTable {
        DefinitionsTable::embedded().unwrap()
    }

    fn payment() -> FieldTree {
        FieldTree::new()
            .with("TransactionType", 0u16)
            .with("Flags", 0x8000_0000u32)
            .with("Sequence", 1u32)
            .with("Amount", Amount::Native(1000))
            .with("Fee", Amount::Native(10))
            .with("SigningPubKey", hex::decode(MP_PUBLIC).unwrap())
            .with("Account", AccountId::from_hex(MP_ACCOUNT).unwrap())
            .with("Destination", AccountId::from_hex(DESTINATION).unwrap())
    }

    fn inner_payment() -> FieldTree {
        FieldTree::new()
            .with("TransactionType", 0u16)
            .with("Flags", 0x4000_0000u32)
            .with("Sequence", 8u32)
            .with("Amount", Amount::Native(5))
            .with("Fee", Amount::Native(0))
            .with("SigningPubKey", FieldValue::empty_blob())
            .with("Account", AccountId::from_hex(ED_ACCOUNT).unwrap())
            .with("Destination", AccountId::from_hex(DESTINATION).unwrap())
    }

    #[test]
    fn test_single_sign_blob_strips_signature() {
        let defs = defs();
        let mut tx = payment();
        tx.insert(TXN_SIGNATURE, vec![0xAAu8; 70]);
        let blob = encode_for_signing(&defs, &tx).unwrap();
        assert_eq!(
            hex::encode_upper(blob),
            "53545800120000228000000024000000016140000000000003E868400000000000000A\
             73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020\
             8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
             83140102030405060708090A0B0C0D0E0F1011121314"
        );
    }

    #[test]
    fn test_multisign_blob() {
        let defs = defs();
        let signer = AccountId::from_hex(MP_ACCOUNT).unwrap();
        let blob = encode_for_multisigning(&defs, &payment(), &signer).unwrap();
        assert_eq!(
            hex::encode_upper(blob),
            "534D5400120000228000000024000000016140000000000003E868400000000000000A\
             7300\
             8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
             83140102030405060708090A0B0C0D0E0F1011121314\
             B5F762798A53D543A014CAF8B297CFF8F2F937E8"
        );
    }

    #[test]
    fn test_remove_non_signing_is_shallow() {
        let defs = defs();
        let signer = FieldTree::new()
            .with("Account", AccountId::ZERO)
            .with(TXN_SIGNATURE, vec![1u8, 2, 3]);
        let tx = payment()
            .with(TXN_SIGNATURE, vec![1u8])
            .with("Signers", vec![crate::value::ArrayElement::new("Signer", signer.clone())])
            .with("PreviousFields", signer.clone());

        let filtered = remove_non_signing_fields(&defs, &tx).unwrap();
        assert!(!filtered.contains(TXN_SIGNATURE));
        assert!(!filtered.contains("Signers"));
        // nested objects keep their non-signing fields
        assert_eq!(filtered.get("PreviousFields"), Some(&FieldValue::Object(signer)));
    }

    #[test]
    fn test_remove_non_signing_unknown_field() {
        let defs = defs();
        let tx = payment().with("Bogus", 1u32);
        assert!(matches!(
            remove_non_signing_fields(&defs, &tx),
            Err(CodecError::UnknownField(name)) if name == "Bogus"
        ));
    }

    #[test]
    fn test_claim_blob() {
        let channel =
            Hash256::from_hex("5DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3")
                .unwrap();
        let claim = FieldTree::new()
            .with("Channel", channel)
            .with("Amount", Amount::Native(100));
        assert_eq!(
            hex::encode_upper(encode_for_signing_claim(&claim).unwrap()),
            "434C4D005DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3\
             0000000000000064"
        );
    }

    #[test]
    fn test_claim_missing_fields() {
        let only_amount = FieldTree::new().with("Amount", Amount::Native(1));
        assert!(matches!(
            encode_for_signing_claim(&only_amount),
            Err(CodecError::MissingField("Channel"))
        ));
        let only_channel = FieldTree::new().with("Channel", Hash256::ZERO);
        assert!(matches!(
            encode_for_signing_claim(&only_channel),
            Err(CodecError::MissingField("Amount"))
        ));
    }

    #[test]
    fn test_empty_batch_blob() {
        let defs = defs();
        let blob = encode_for_signing_batch(&defs, &Batch::default()).unwrap();
        assert_eq!(hex::encode_upper(blob), "424348000000000000000000");
    }

    #[test]
    fn test_batch_blob() {
        let defs = defs();
        assert_eq!(
            inner_transaction_id(&defs, &inner_payment()).unwrap().to_hex(),
            "1FC25D5F6667F570EA5DB859F795497DCD6CD11183097B32CF5641C6D17D3635"
        );

        let batch = Batch::new(0x0001_0000, vec![inner_payment()]);
        let blob = encode_for_signing_batch(&defs, &batch).unwrap();
        assert_eq!(
            hex::encode_upper(&blob),
            "424348000001000000000001\
             1FC25D5F6667F570EA5DB859F795497DCD6CD11183097B32CF5641C6D17D3635"
        );

        let signer = AccountId::from_hex(MP_ACCOUNT).unwrap();
        let multi = encode_for_multisigning_batch(&defs, &batch, &signer).unwrap();
        assert_eq!(&multi[..blob.len()], blob.as_slice());
        assert_eq!(&multi[blob.len()..], signer.as_bytes());
    }

    #[test]
    fn test_inner_id_ignores_signing_key_and_signature() {
        let defs = defs();
        let tx = inner_payment()
            .with("SigningPubKey", vec![0xEDu8; 33])
            .with(TXN_SIGNATURE, vec![0u8; 64]);
        assert_eq!(
            inner_transaction_id(&defs, &tx).unwrap(),
            inner_transaction_id(&defs, &inner_payment()).unwrap()
        );
    }

    #[test]
    fn test_structured_flags_normalized() {
        let defs = defs();
        let tx = inner_payment().with("Flags", FieldTree::new().with("Flags", 0x4000_0000u32));
        assert_eq!(
            inner_transaction_id(&defs, &tx).unwrap(),
            inner_transaction_id(&defs, &inner_payment()).unwrap()
        );

        let mut bad = inner_payment().with(
            "Flags",
            FieldTree::new().with("Flags", 1u32).with("Sequence", 2u32),
        );
        assert!(matches!(
            normalize_flags(&mut bad),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_transaction_hash_matches_id_of_bytes() {
        let defs = defs();
        let bytes = canonical::encode(&defs, &payment()).unwrap();
        assert_eq!(transaction_hash(&defs, &payment()).unwrap(), transaction_id(&bytes));
    }
}
