//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ledgerwire_core::types::{MAX_EXPONENT, MAX_MANTISSA, MAX_NATIVE_DROPS, MIN_EXPONENT, MIN_MANTISSA};
use ledgerwire_core::{
    AccountId, Amount, ArrayElement, Currency, FieldTree, FieldValue, Hash256, IssuedValue,
};
use ledgerwire_keys::{KeyType, Seed};

/// Generate a key type.
pub fn key_type() -> impl Strategy<Value = KeyType> {
    prop_oneof![Just(KeyType::Secp256k1), Just(KeyType::Ed25519)]
}

/// Generate random seed entropy.
pub fn entropy() -> impl Strategy<Value = [u8; 16]> {
    any::<[u8; 16]>()
}

/// Generate a random AccountId.
pub fn account_id() -> impl Strategy<Value = AccountId> {
    any::<[u8; 20]>().prop_map(AccountId::from_bytes)
}

/// Generate a random Hash256.
pub fn hash256() -> impl Strategy<Value = Hash256> {
    any::<[u8; 32]>().prop_map(Hash256::from_bytes)
}

/// Generate a native amount in range.
pub fn native_amount() -> impl Strategy<Value = Amount> {
    (0..=MAX_NATIVE_DROPS).prop_map(Amount::Native)
}

/// Generate a standard currency code other than `XRP`.
pub fn currency() -> impl Strategy<Value = Currency> {
    "[A-Z]{3}".prop_filter_map("XRP is native", |code| Currency::from_code(&code).ok())
}

/// Generate a normalized issued value, zero included.
pub fn issued_value() -> impl Strategy<Value = IssuedValue> {
    prop_oneof![
        1 => Just(IssuedValue::ZERO),
        9 => (any::<bool>(), MIN_MANTISSA..=MAX_MANTISSA, MIN_EXPONENT..=MAX_EXPONENT)
            .prop_filter_map("normalized", |(negative, mantissa, exponent)| {
                IssuedValue::new(negative, mantissa, exponent).ok()
            }),
    ]
}

/// Generate an issued-currency amount.
pub fn issued_amount() -> impl Strategy<Value = Amount> {
    (issued_value(), currency(), account_id()).prop_map(|(value, currency, issuer)| {
        Amount::Issued {
            value,
            currency,
            issuer,
        }
    })
}

/// Generate any amount.
pub fn amount() -> impl Strategy<Value = Amount> {
    prop_oneof![native_amount(), issued_amount()]
}

/// Generate blob bytes of specified max length.
pub fn blob(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a `Memo` array element.
pub fn memo() -> impl Strategy<Value = ArrayElement> {
    (blob(16), blob(300)).prop_map(|(memo_type, memo_data)| {
        ArrayElement::new(
            "Memo",
            FieldTree::new()
                .with("MemoType", memo_type)
                .with("MemoData", memo_data),
        )
    })
}

/// Generate the fields of a Payment as `(name, value)` pairs.
///
/// Optional fields are present or absent at random. No `SigningPubKey` or
/// `TxnSignature` is included.
pub fn payment_fields() -> impl Strategy<Value = Vec<(String, FieldValue)>> {
    (
        any::<u32>(),
        1u32..=u32::MAX,
        amount(),
        native_amount(),
        account_id(),
        account_id(),
        proptest::option::of(any::<u32>()),
        proptest::option::of(any::<u32>()),
        proptest::option::of(hash256()),
        prop::collection::vec(memo(), 0..3),
    )
        .prop_map(
            |(flags, sequence, amount, fee, account, destination, tag, last_ledger, invoice, memos)| {
                let mut fields: Vec<(String, FieldValue)> = vec![
                    ("TransactionType".into(), 0u16.into()),
                    ("Flags".into(), flags.into()),
                    ("Sequence".into(), sequence.into()),
                    ("Amount".into(), amount.into()),
                    ("Fee".into(), fee.into()),
                    ("Account".into(), account.into()),
                    ("Destination".into(), destination.into()),
                ];
                if let Some(tag) = tag {
                    fields.push(("DestinationTag".into(), tag.into()));
                }
                if let Some(last) = last_ledger {
                    fields.push(("LastLedgerSequence".into(), last.into()));
                }
                if let Some(invoice) = invoice {
                    fields.push(("InvoiceID".into(), invoice.into()));
                }
                if !memos.is_empty() {
                    fields.push(("Memos".into(), memos.into()));
                }
                fields
            },
        )
}

/// Generate a Payment field tree.
pub fn payment() -> impl Strategy<Value = FieldTree> {
    payment_fields().prop_map(|fields| fields.into_iter().collect())
}

/// Parameters for signing: a key type, seed entropy and a transaction.
#[derive(Debug, Clone)]
pub struct SigningParams {
    pub key_type: KeyType,
    pub entropy: [u8; 16],
    pub tx: FieldTree,
}

impl SigningParams {
    pub fn seed(&self) -> Seed {
        Seed::from_entropy(&self.entropy, self.key_type).expect("16-byte entropy")
    }
}

impl Arbitrary for SigningParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (key_type(), entropy(), payment())
            .prop_map(|(key_type, entropy, tx)| SigningParams {
                key_type,
                entropy,
                tx,
            })
            .boxed()
    }
}
