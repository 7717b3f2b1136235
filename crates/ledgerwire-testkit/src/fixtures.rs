//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, OnceLock};

use ledgerwire::{EngineConfig, SignedTransaction, SigningEngine};
use ledgerwire_core::{AccountId, Amount, ArrayElement, DefinitionsTable, FieldTree};
use ledgerwire_keys::{derive_keypair, KeyPair, KeyType, Seed};

static DEFINITIONS: OnceLock<Arc<DefinitionsTable>> = OnceLock::new();

/// The bundled definitions table, parsed once per process.
pub fn definitions() -> Arc<DefinitionsTable> {
    DEFINITIONS
        .get_or_init(|| Arc::new(DefinitionsTable::embedded().expect("bundled definitions parse")))
        .clone()
}

/// An engine over the shared table with the default config.
pub fn engine() -> SigningEngine {
    SigningEngine::new(definitions(), EngineConfig::default())
}

/// A Payment of `drops` from `account` to `destination`.
pub fn sample_payment(account: AccountId, destination: AccountId, sequence: u32, drops: u64) -> FieldTree {
    FieldTree::new()
        .with("TransactionType", 0u16)
        .with("Flags", 0u32)
        .with("Sequence", sequence)
        .with("Amount", Amount::Native(drops))
        .with("Fee", Amount::Native(12))
        .with("Account", account)
        .with("Destination", destination)
}

/// A Payment carrying one memo, exercising nested arrays and objects.
pub fn sample_memo_payment(account: AccountId, destination: AccountId) -> FieldTree {
    let memo = FieldTree::new()
        .with("MemoType", b"text/plain".to_vec())
        .with("MemoData", b"hello".to_vec());
    sample_payment(account, destination, 1, 1)
        .with("Memos", vec![ArrayElement::new("Memo", memo)])
        .with("DestinationTag", 42u32)
}

/// A signer with a deterministic key and a stand-in account id.
///
/// The account id is not derived from the public key.
pub struct TestFixture {
    pub engine: SigningEngine,
    pub keypair: KeyPair,
    pub account: AccountId,
}

impl TestFixture {
    /// Create a new test fixture with a random seed.
    pub fn new(key_type: KeyType) -> Self {
        let seed = Seed::generate(key_type);
        Self {
            engine: engine(),
            keypair: derive_keypair(&seed).expect("fresh seed derives"),
            account: AccountId::from_bytes(rand::random()),
        }
    }

    /// Create with a deterministic key from a one-byte tag.
    pub fn with_tag(tag: u8, key_type: KeyType) -> Self {
        let seed = Seed::from_entropy(&[tag; 16], key_type).expect("16-byte entropy");
        Self {
            engine: engine(),
            keypair: derive_keypair(&seed).expect("fixed seed derives"),
            account: AccountId::from_bytes([tag; 20]),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.keypair.key_type()
    }

    /// A Payment from this fixture's account.
    pub fn payment(&self, sequence: u32, drops: u64) -> FieldTree {
        sample_payment(self.account, AccountId::from_bytes([0xDD; 20]), sequence, drops)
    }

    /// Sign `tx` with this fixture's key.
    pub fn sign(&self, tx: &FieldTree) -> SignedTransaction {
        self.engine.sign(&self.keypair, tx).expect("fixture signs")
    }
}

/// Create multiple test fixtures for multi-party tests.
///
/// Key types alternate, starting with secp256k1.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let key_type = if i % 2 == 0 {
                KeyType::Secp256k1
            } else {
                KeyType::Ed25519
            };
            TestFixture::with_tag(i as u8 + 1, key_type)
        })
        .collect()
}
