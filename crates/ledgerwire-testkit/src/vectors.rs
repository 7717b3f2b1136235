//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding, signing blob, signature and
//! transaction hash for fixed seeds. Both signature schemes are deterministic
//! (Ed25519 natively, secp256k1 through RFC 6979), so a conforming
//! implementation reproduces every byte.

use serde::Serialize;

use ledgerwire::{SignedTransaction, SigningEngine};
use ledgerwire_core::{AccountId, Amount, FieldTree};
use ledgerwire_keys::{derive_keypair, KeyType, Seed};

/// `(field name, header hex)` pairs covering all three header widths.
pub const HEADER_VECTORS: &[(&str, &str)] = &[
    ("TransactionType", "12"),
    ("Sequence", "24"),
    ("Account", "81"),
    ("LastLedgerSequence", "201B"),
    ("Indexes", "0113"),
    ("TickSize", "001010"),
    ("ObjectEndMarker", "E1"),
    ("ArrayEndMarker", "F1"),
];

/// Channel id used by the claim vector.
pub const CLAIM_CHANNEL: &str = "5DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3";
/// Claim blob for [`CLAIM_CHANNEL`] and 100 drops.
pub const CLAIM_BLOB: &str =
    "434C4D005DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB30000000000000064";
/// Batch blob with no inner transactions and zero flags.
pub const EMPTY_BATCH_BLOB: &str = "424348000000000000000000";

/// A signed-payment golden vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub key_type: KeyType,
    /// Seed entropy, hex.
    pub entropy: &'static str,
    pub account: &'static str,
    pub destination: &'static str,
    pub flags: u32,
    pub sequence: u32,
    pub amount_drops: u64,
    pub fee_drops: u64,
    pub expected_public_key: &'static str,
    pub expected_tx_blob: &'static str,
    pub expected_hash: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "secp256k1 master payment",
            key_type: KeyType::Secp256k1,
            // passphrase "masterpassphrase"
            entropy: "DEDCE9CE67B451D852FD4E846FCDE31C",
            account: "B5F762798A53D543A014CAF8B297CFF8F2F937E8",
            destination: "0102030405060708090A0B0C0D0E0F1011121314",
            flags: 0x8000_0000,
            sequence: 1,
            amount_drops: 1000,
            fee_drops: 10,
            expected_public_key: "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020",
            expected_tx_blob: concat!(
                "120000228000000024000000016140000000000003E868400000000000000A",
                "73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020",
                "7446",
                "30440220749DF3356674E938B5250471205ECD7D145B70FC99B098C08986CDE7B5A909840220",
                "6339A3491F90B57285BBC23D4D1651FBC8D21D36DF885573355737BB54A83029",
                "8114B5F762798A53D543A014CAF8B297CFF8F2F937E8",
                "83140102030405060708090A0B0C0D0E0F1011121314",
            ),
            expected_hash: "12C4E55DC331C4FEF396BB9301BBCAC50DB4F58F2F73D731FA76E344902FB02D",
        },
        GoldenVector {
            name: "ed25519 zero-seed payment",
            key_type: KeyType::Ed25519,
            entropy: "00000000000000000000000000000000",
            account: "629CCC144AC8464561F11D8870A57DC376A0D191",
            destination: "0102030405060708090A0B0C0D0E0F1011121314",
            flags: 0,
            sequence: 7,
            amount_drops: 1,
            fee_drops: 12,
            expected_public_key: "ED1A7C082846CFF58FF9A892BA4BA2593151CCF1DBA59F37714CC9ED39824AF85F",
            expected_tx_blob: concat!(
                "1200002200000000240000000761400000000000000168400000000000000C",
                "7321ED1A7C082846CFF58FF9A892BA4BA2593151CCF1DBA59F37714CC9ED39824AF85F",
                "7440",
                "3E765E557E9525D0D8B6C7060E3B59AEA80F10625FBFA81981D48B5809F81462",
                "665E83CA7B2594ADA7436E1CABB3403327259D66B3AEE238761F219D087CA503",
                "8114629CCC144AC8464561F11D8870A57DC376A0D191",
                "83140102030405060708090A0B0C0D0E0F1011121314",
            ),
            expected_hash: "20239098A959AC00D5533E352F457C48DC059163B749B47FFA92E3696051AA75",
        },
    ]
}

/// The seed a vector signs with.
pub fn seed_from_vector(vector: &GoldenVector) -> ledgerwire_keys::Result<Seed> {
    Seed::from_entropy(&hex::decode(vector.entropy)?, vector.key_type)
}

/// The unsigned payment a vector describes.
pub fn transaction_from_vector(vector: &GoldenVector) -> ledgerwire_core::Result<FieldTree> {
    Ok(FieldTree::new()
        .with("TransactionType", 0u16)
        .with("Flags", vector.flags)
        .with("Sequence", vector.sequence)
        .with("Amount", Amount::Native(vector.amount_drops))
        .with("Fee", Amount::Native(vector.fee_drops))
        .with("Account", AccountId::from_hex(vector.account)?)
        .with("Destination", AccountId::from_hex(vector.destination)?))
}

/// Sign a vector's payment with its seed.
pub fn sign_vector(engine: &SigningEngine, vector: &GoldenVector) -> ledgerwire::Result<SignedTransaction> {
    let seed = seed_from_vector(vector)?;
    engine.sign_with_seed(&seed, &transaction_from_vector(vector)?)
}

/// Check every vector against `engine`.
///
/// Returns `(name, matches, actual hash)` per vector.
pub fn verify_all_vectors(engine: &SigningEngine) -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match sign_vector(engine, v) {
            Ok(signed) => {
                let hash = signed.hash_hex();
                let matches = hash == v.expected_hash && signed.tx_blob_hex() == v.expected_tx_blob;
                (v.name.to_string(), matches, hash)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}

/// All golden vectors as pretty-printed JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}

/// The public key a vector's seed derives to, hex.
pub fn derived_public_key(vector: &GoldenVector) -> ledgerwire_keys::Result<String> {
    Ok(derive_keypair(&seed_from_vector(vector)?)?.public_key.to_hex())
}
