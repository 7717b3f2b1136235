//! Golden test vectors for cross-implementation verification.
//!
//! Every conforming implementation must produce identical:
//! - field headers
//! - canonical transaction bytes
//! - signing blobs (single, multi, claim, batch)
//! - derived keys
//! - signatures (deterministic Ed25519 and RFC 6979 secp256k1)
//! - transaction hashes

use std::io::Write;
use std::sync::{Arc, Once};

use anyhow::Result;
use serde::Serialize;

use ledgerwire::core::field::encode_field_id;
use ledgerwire::core::{
    encode_for_multisigning, encode_for_signing, encode_for_signing_batch,
    encode_for_signing_claim, inner_transaction_id,
};
use ledgerwire::keys::{derive_keypair, DerSignature};
use ledgerwire::{
    AccountId, Amount, Batch, DefinitionsTable, EngineConfig, FieldTree, Hash256, KeyType, Seed,
    SigningEngine,
};

const MP_ACCOUNT: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";
const MP_PUBLIC: &str = "0330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020";
const MP_PRIVATE: &str = "001ACAAEDECE405B2A958212629E16F2EB46B153EEE94CDD350FDEFF52795525B7";
const ED_ACCOUNT: &str = "629CCC144AC8464561F11D8870A57DC376A0D191";
const ED_ZERO_PUBLIC: &str = "ED1A7C082846CFF58FF9A892BA4BA2593151CCF1DBA59F37714CC9ED39824AF85F";
const DESTINATION: &str = "0102030405060708090A0B0C0D0E0F1011121314";

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

fn engine() -> Result<SigningEngine> {
    init_tracing();
    Ok(SigningEngine::with_embedded_definitions()?)
}

fn master_seed() -> Result<Seed> {
    Ok(Seed::from_passphrase("masterpassphrase", KeyType::Secp256k1)?)
}

fn zero_ed_seed() -> Result<Seed> {
    Ok(Seed::from_entropy(&[0u8; 16], KeyType::Ed25519)?)
}

/// Payment from the master account, fully populated for single signing.
fn master_payment() -> Result<FieldTree> {
    Ok(FieldTree::new()
        .with("TransactionType", 0u16)
        .with("Flags", 0x8000_0000u32)
        .with("Sequence", 1u32)
        .with("Amount", Amount::Native(1000))
        .with("Fee", Amount::Native(10))
        .with("Account", AccountId::from_hex(MP_ACCOUNT)?)
        .with("Destination", AccountId::from_hex(DESTINATION)?))
}

/// Payment from the zero-seed Ed25519 account.
fn ed_payment() -> Result<FieldTree> {
    Ok(FieldTree::new()
        .with("TransactionType", 0u16)
        .with("Flags", 0u32)
        .with("Sequence", 7u32)
        .with("Amount", Amount::Native(1))
        .with("Fee", Amount::Native(12))
        .with("Account", AccountId::from_hex(ED_ACCOUNT)?)
        .with("Destination", AccountId::from_hex(DESTINATION)?))
}

/// A signed-transaction golden vector.
#[derive(Debug, Serialize)]
pub struct GoldenVector {
    pub name: String,
    pub key_type: KeyType,
    pub public_key: String,
    pub signing_blob: String,
    pub signature: String,
    pub tx_blob: String,
    pub hash: String,
}

fn generate_vector(engine: &SigningEngine, name: &str, seed: &Seed, tx: &FieldTree) -> Result<GoldenVector> {
    let keypair = derive_keypair(seed)?;
    let signed = engine.sign(&keypair, tx)?;
    let blob = encode_for_signing(engine.definitions(), &signed.unsigned)?;
    Ok(GoldenVector {
        name: name.to_string(),
        key_type: keypair.key_type(),
        public_key: keypair.public_key.to_hex(),
        signing_blob: hex::encode_upper(blob),
        signature: signed.signature.as_ref().map(|s| s.to_hex()).unwrap_or_default(),
        tx_blob: signed.tx_blob_hex(),
        hash: signed.hash_hex(),
    })
}

fn generate_all_vectors(engine: &SigningEngine) -> Result<Vec<GoldenVector>> {
    Ok(vec![
        generate_vector(engine, "secp256k1-master-payment", &master_seed()?, &master_payment()?)?,
        generate_vector(engine, "ed25519-zero-seed-payment", &zero_ed_seed()?, &ed_payment()?)?,
    ])
}

// =============================================================================
// FIELD HEADERS
// =============================================================================

#[test]
fn test_header_lengths() -> Result<()> {
    let engine = engine()?;
    let defs = engine.definitions();
    assert_eq!(encode_field_id(defs, "Sequence")?, "24");
    assert_eq!(encode_field_id(defs, "LastLedgerSequence")?, "201B");
    assert_eq!(encode_field_id(defs, "TickSize")?, "001010");
    Ok(())
}

// =============================================================================
// KEY DERIVATION
// =============================================================================

#[test]
fn test_key_derivation_vectors() -> Result<()> {
    let master = derive_keypair(&master_seed()?)?;
    assert_eq!(master.public_key.to_hex(), MP_PUBLIC);
    assert_eq!(hex::encode_upper(master.private_key.as_bytes()), MP_PRIVATE);

    let zero = derive_keypair(&zero_ed_seed()?)?;
    assert_eq!(zero.public_key.to_hex(), ED_ZERO_PUBLIC);
    Ok(())
}

// =============================================================================
// SIGNED TRANSACTIONS
// =============================================================================

#[test]
fn test_secp256k1_signed_payment() -> Result<()> {
    let engine = engine()?;
    let signed = engine.sign_with_seed(&master_seed()?, &master_payment()?)?;

    let signature = signed.signature.clone().expect("single-signed");
    assert_eq!(
        signature.to_hex(),
        "30440220749DF3356674E938B5250471205ECD7D145B70FC99B098C08986CDE7B5A909840220\
         6339A3491F90B57285BBC23D4D1651FBC8D21D36DF885573355737BB54A83029"
    );
    assert!(DerSignature::parse_strict(signature.as_bytes())?.is_low_s());
    assert_eq!(
        signed.tx_blob_hex(),
        "120000228000000024000000016140000000000003E868400000000000000A\
         73210330E7FC9D56BB25D6893BA3F317AE5BCF33B3291BD63DB32654A313222F7FD020\
         7446\
         30440220749DF3356674E938B5250471205ECD7D145B70FC99B098C08986CDE7B5A909840220\
         6339A3491F90B57285BBC23D4D1651FBC8D21D36DF885573355737BB54A83029\
         8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
         83140102030405060708090A0B0C0D0E0F1011121314"
    );
    assert_eq!(
        signed.hash_hex(),
        "12C4E55DC331C4FEF396BB9301BBCAC50DB4F58F2F73D731FA76E344902FB02D"
    );

    let public = derive_keypair(&master_seed()?)?.public_key;
    assert!(engine.verify(&public, &engine.decode_hex(&signed.tx_blob_hex())?)?);
    Ok(())
}

#[test]
fn test_ed25519_signed_payment() -> Result<()> {
    let engine = engine()?;
    let signed = engine.sign_with_seed(&zero_ed_seed()?, &ed_payment()?)?;

    assert_eq!(
        hex::encode_upper(encode_for_signing(engine.definitions(), &signed.unsigned)?),
        "53545800\
         1200002200000000240000000761400000000000000168400000000000000C\
         7321ED1A7C082846CFF58FF9A892BA4BA2593151CCF1DBA59F37714CC9ED39824AF85F\
         8114629CCC144AC8464561F11D8870A57DC376A0D191\
         83140102030405060708090A0B0C0D0E0F1011121314"
    );
    assert_eq!(
        signed.tx_blob_hex(),
        "1200002200000000240000000761400000000000000168400000000000000C\
         7321ED1A7C082846CFF58FF9A892BA4BA2593151CCF1DBA59F37714CC9ED39824AF85F\
         7440\
         3E765E557E9525D0D8B6C7060E3B59AEA80F10625FBFA81981D48B5809F81462\
         665E83CA7B2594ADA7436E1CABB3403327259D66B3AEE238761F219D087CA503\
         8114629CCC144AC8464561F11D8870A57DC376A0D191\
         83140102030405060708090A0B0C0D0E0F1011121314"
    );
    assert_eq!(
        signed.hash_hex(),
        "20239098A959AC00D5533E352F457C48DC059163B749B47FFA92E3696051AA75"
    );
    Ok(())
}

#[test]
fn test_vectors_deterministic() -> Result<()> {
    let engine = engine()?;
    let v1 = generate_all_vectors(&engine)?;
    let v2 = generate_all_vectors(&engine)?;
    for (a, b) in v1.iter().zip(v2.iter()) {
        assert_eq!(a.signature, b.signature, "signature mismatch for {}", a.name);
        assert_eq!(a.tx_blob, b.tx_blob, "tx_blob mismatch for {}", a.name);
        assert_eq!(a.hash, b.hash, "hash mismatch for {}", a.name);
    }
    Ok(())
}

#[test]
fn print_golden_vectors_json() -> Result<()> {
    let engine = engine()?;

    #[derive(Serialize)]
    struct VectorFile {
        description: String,
        vectors: Vec<GoldenVector>,
    }

    let file = VectorFile {
        description: "Signed ledger transactions. Every implementation must produce identical outputs."
            .to_string(),
        vectors: generate_all_vectors(&engine)?,
    };
    println!("{}", serde_json::to_string_pretty(&file)?);
    Ok(())
}

// =============================================================================
// SIGNING BLOBS
// =============================================================================

#[test]
fn test_multisign_blob() -> Result<()> {
    let engine = engine()?;
    let signer = AccountId::from_hex(MP_ACCOUNT)?;
    let tx = master_payment()?.with("SigningPubKey", hex::decode(MP_PUBLIC)?);
    assert_eq!(
        hex::encode_upper(encode_for_multisigning(engine.definitions(), &tx, &signer)?),
        "534D5400120000228000000024000000016140000000000003E868400000000000000A\
         7300\
         8114B5F762798A53D543A014CAF8B297CFF8F2F937E8\
         83140102030405060708090A0B0C0D0E0F1011121314\
         B5F762798A53D543A014CAF8B297CFF8F2F937E8"
    );
    Ok(())
}

#[test]
fn test_claim_blob() -> Result<()> {
    let claim = FieldTree::new()
        .with(
            "Channel",
            Hash256::from_hex("5DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3")?,
        )
        .with("Amount", Amount::Native(100));
    assert_eq!(
        hex::encode_upper(encode_for_signing_claim(&claim)?),
        "434C4D005DB01B7FFED6B67E6B0414DED11E051D2EE2B7619CE0EAA6286D67A3A4D5BDB3\
         0000000000000064"
    );
    Ok(())
}

#[test]
fn test_batch_blobs() -> Result<()> {
    let engine = engine()?;
    let defs = engine.definitions();
    assert_eq!(
        hex::encode_upper(encode_for_signing_batch(defs, &Batch::default())?),
        "424348000000000000000000"
    );

    let inner = FieldTree::new()
        .with("TransactionType", 0u16)
        .with("Flags", 0x4000_0000u32)
        .with("Sequence", 8u32)
        .with("Amount", Amount::Native(5))
        .with("Fee", Amount::Native(0))
        .with("Account", AccountId::from_hex(ED_ACCOUNT)?)
        .with("Destination", AccountId::from_hex(DESTINATION)?);
    assert_eq!(
        inner_transaction_id(defs, &inner)?.to_hex(),
        "1FC25D5F6667F570EA5DB859F795497DCD6CD11183097B32CF5641C6D17D3635"
    );

    let batch = Batch::new(0x0001_0000, vec![inner]);
    assert_eq!(
        hex::encode_upper(encode_for_signing_batch(defs, &batch)?),
        "424348000001000000000001\
         1FC25D5F6667F570EA5DB859F795497DCD6CD11183097B32CF5641C6D17D3635"
    );

    let keypair = derive_keypair(&zero_ed_seed()?)?;
    let signature = engine.sign_batch(&keypair, &batch)?;
    assert!(engine.verify_batch(&keypair.public_key, &batch, &signature)?);
    Ok(())
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn test_definitions_from_disk_match_embedded() -> Result<()> {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(include_str!("../../ledgerwire-core/data/definitions.json").as_bytes())?;

    let config = EngineConfig::from_json(r#"{"strict_canonical": true, "verify_after_sign": true}"#)?;
    let from_disk = SigningEngine::new(Arc::new(DefinitionsTable::from_path(file.path())?), config);
    let embedded = engine()?;

    let tx = master_payment()?;
    assert_eq!(from_disk.encode_hex(&tx)?, embedded.encode_hex(&tx)?);
    Ok(())
}

// =============================================================================
// REJECTION VECTORS
// =============================================================================

#[test]
fn test_reject_malformed_blobs() -> Result<()> {
    let engine = engine()?;
    // trailing object end marker
    let err = engine.decode_hex("2400000001E1").unwrap_err();
    assert!(err.is_malformed_input(), "{}", err);
    // header with zero type and field codes
    let err = engine.decode_hex("00000000").unwrap_err();
    assert!(err.is_malformed_input(), "{}", err);
    // Sequence cut short
    let err = engine.decode_hex("240000").unwrap_err();
    assert!(err.is_malformed_input(), "{}", err);
    Ok(())
}
