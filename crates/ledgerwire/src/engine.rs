//! The signing engine: unified API over the codec and key crates.
//!
//! The engine owns a shared definitions table and an [`EngineConfig`]. Every
//! operation is a pure function of its arguments and that table, so one
//! engine can be shared across threads.

use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ledgerwire_core::signing::{SIGNING_PUB_KEY, TXN_SIGNATURE};
use ledgerwire_core::{
    canonical, encode_for_multisigning, encode_for_multisigning_batch, encode_for_signing,
    encode_for_signing_batch, encode_for_signing_claim, transaction_id, AccountId, ArrayElement,
    Batch, CodecError, DefinitionsTable, FieldTree, FieldValue, Hash256,
};
use ledgerwire_keys::{self as keys, KeyPair, PublicKey, Seed, Signature};

use crate::error::{EngineError, Result};

/// Array holding multi-signature entries on a transaction.
pub const SIGNERS: &str = "Signers";
/// Element name inside [`SIGNERS`].
pub const SIGNER: &str = "Signer";
/// Element name for a batch multi-signature entry.
pub const BATCH_SIGNER: &str = "BatchSigner";
const ACCOUNT: &str = "Account";

/// Configuration for the signing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject high-S secp256k1 signatures on verification.
    pub strict_canonical: bool,
    /// Verify every produced signature before returning it.
    pub verify_after_sign: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_canonical: true,
            verify_after_sign: true,
        }
    }
}

impl EngineConfig {
    /// Parse from JSON. Missing keys take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What is being signed. Each variant maps to one signing blob.
#[derive(Debug, Clone, Copy)]
pub enum SigningRequest<'a> {
    /// A transaction signed by its own account.
    Single(&'a FieldTree),
    /// One member of a multi-signature set.
    Multi {
        tx: &'a FieldTree,
        signer: AccountId,
    },
    /// A payment-channel claim (`Channel` and `Amount`).
    Claim(&'a FieldTree),
    /// A batch signed by its outer account.
    Batch(&'a Batch),
    /// One member of a multi-signature set authorizing a batch.
    BatchMulti {
        batch: &'a Batch,
        signer: AccountId,
    },
}

impl SigningRequest<'_> {
    /// The exact bytes handed to the signature algorithm.
    pub fn signing_blob(&self, defs: &DefinitionsTable) -> Result<Vec<u8>> {
        let blob = match self {
            SigningRequest::Single(tx) => encode_for_signing(defs, tx)?,
            SigningRequest::Multi { tx, signer } => encode_for_multisigning(defs, tx, signer)?,
            SigningRequest::Claim(claim) => encode_for_signing_claim(claim)?,
            SigningRequest::Batch(batch) => encode_for_signing_batch(defs, batch)?,
            SigningRequest::BatchMulti { batch, signer } => {
                encode_for_multisigning_batch(defs, batch, signer)?
            }
        };
        Ok(blob)
    }

    fn kind(&self) -> &'static str {
        match self {
            SigningRequest::Single(_) => "single",
            SigningRequest::Multi { .. } => "multi",
            SigningRequest::Claim(_) => "claim",
            SigningRequest::Batch(_) => "batch",
            SigningRequest::BatchMulti { .. } => "batch-multi",
        }
    }
}

/// One signer's contribution to a multi-signed transaction or batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerEntry {
    pub account: AccountId,
    pub signing_pub_key: PublicKey,
    pub signature: Signature,
}

impl SignerEntry {
    /// The array element for this entry, e.g. a `Signer` inside `Signers`.
    pub fn to_element(&self, element: &str) -> ArrayElement {
        ArrayElement::new(
            element,
            FieldTree::new()
                .with(ACCOUNT, self.account)
                .with(SIGNING_PUB_KEY, self.signing_pub_key.as_bytes().to_vec())
                .with(TXN_SIGNATURE, self.signature.as_bytes().to_vec()),
        )
    }

    /// Read an entry back from its array element.
    pub fn from_element(element: &ArrayElement) -> Result<Self> {
        let inner = &element.object;
        let account = *inner
            .get(ACCOUNT)
            .and_then(FieldValue::as_account_id)
            .ok_or(CodecError::MissingField(ACCOUNT))?;
        let key = inner
            .get(SIGNING_PUB_KEY)
            .and_then(FieldValue::as_blob)
            .ok_or(CodecError::MissingField(SIGNING_PUB_KEY))?;
        let signature = inner
            .get(TXN_SIGNATURE)
            .and_then(FieldValue::as_blob)
            .ok_or(CodecError::MissingField(TXN_SIGNATURE))?;
        Ok(Self {
            account,
            signing_pub_key: PublicKey::from_bytes(key)?,
            signature: Signature::from_bytes(signature.to_vec()),
        })
    }
}

/// A signed transaction together with its encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction as signed, without `TxnSignature` or `Signers`.
    pub unsigned: FieldTree,
    /// The single signature. `None` for a multi-signed transaction.
    pub signature: Option<Signature>,
    /// The complete transaction.
    pub signed: FieldTree,
    /// Canonical encoding of `signed`.
    pub signed_bytes: Bytes,
}

impl SignedTransaction {
    /// Transaction id: SHA-512/half of `TXN\0 ‖ signed_bytes`.
    pub fn hash(&self) -> Hash256 {
        transaction_id(&self.signed_bytes)
    }

    pub fn hash_hex(&self) -> String {
        self.hash().to_hex()
    }

    /// Upper-case hex of the signed encoding, ready for submission.
    pub fn tx_blob_hex(&self) -> String {
        hex::encode_upper(&self.signed_bytes)
    }
}

/// Signs and verifies ledger transactions against one definitions table.
#[derive(Debug, Clone)]
pub struct SigningEngine {
    defs: Arc<DefinitionsTable>,
    config: EngineConfig,
}

impl SigningEngine {
    pub fn new(defs: Arc<DefinitionsTable>, config: EngineConfig) -> Self {
        Self { defs, config }
    }

    /// An engine over the bundled definitions with the default config.
    pub fn with_embedded_definitions() -> Result<Self> {
        Ok(Self::new(
            Arc::new(DefinitionsTable::embedded()?),
            EngineConfig::default(),
        ))
    }

    pub fn definitions(&self) -> &Arc<DefinitionsTable> {
        &self.defs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ─── Codec ──────────────────────────────────────────────────────────────

    pub fn encode(&self, tree: &FieldTree) -> Result<Vec<u8>> {
        Ok(canonical::encode(&self.defs, tree)?)
    }

    pub fn encode_hex(&self, tree: &FieldTree) -> Result<String> {
        Ok(canonical::encode_hex(&self.defs, tree)?)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<FieldTree> {
        Ok(canonical::decode(&self.defs, bytes)?)
    }

    pub fn decode_hex(&self, hex_blob: &str) -> Result<FieldTree> {
        Ok(canonical::decode_hex(&self.defs, hex_blob)?)
    }

    // ─── Generic requests ───────────────────────────────────────────────────

    /// Sign any request variant.
    pub fn sign_request(&self, keypair: &KeyPair, request: &SigningRequest<'_>) -> Result<Signature> {
        let blob = request.signing_blob(&self.defs)?;
        let signature = self.sign_blob(keypair, &blob)?;
        debug!(
            kind = request.kind(),
            key_type = %keypair.key_type(),
            public_key = %keypair.public_key,
            "signed request"
        );
        Ok(signature)
    }

    /// Verify a signature over any request variant.
    pub fn verify_request(
        &self,
        public_key: &PublicKey,
        request: &SigningRequest<'_>,
        signature: &Signature,
    ) -> Result<bool> {
        let blob = request.signing_blob(&self.defs)?;
        let valid = self.verify_blob(public_key, &blob, signature)?;
        debug!(kind = request.kind(), key_type = %public_key.key_type(), valid, "verified request");
        Ok(valid)
    }

    fn sign_blob(&self, keypair: &KeyPair, blob: &[u8]) -> Result<Signature> {
        let signature = keys::sign(&keypair.private_key, blob)?;
        if self.config.verify_after_sign && !self.verify_blob(&keypair.public_key, blob, &signature)? {
            return Err(EngineError::SelfCheckFailed {
                key_type: keypair.key_type(),
            });
        }
        Ok(signature)
    }

    fn verify_blob(&self, public_key: &PublicKey, blob: &[u8], signature: &Signature) -> Result<bool> {
        Ok(keys::verify_with(
            public_key,
            blob,
            signature,
            self.config.strict_canonical,
        )?)
    }

    // ─── Single signature ───────────────────────────────────────────────────

    /// Sign `tx` with `keypair`, filling in `SigningPubKey` and
    /// `TxnSignature`.
    pub fn sign(&self, keypair: &KeyPair, tx: &FieldTree) -> Result<SignedTransaction> {
        let mut unsigned = tx.clone();
        unsigned.remove(TXN_SIGNATURE);
        unsigned.insert(SIGNING_PUB_KEY, keypair.public_key.as_bytes().to_vec());

        let blob = encode_for_signing(&self.defs, &unsigned)?;
        let signature = self.sign_blob(keypair, &blob)?;

        let signed = unsigned
            .clone()
            .with(TXN_SIGNATURE, signature.as_bytes().to_vec());
        let signed_bytes = Bytes::from(canonical::encode(&self.defs, &signed)?);
        let envelope = SignedTransaction {
            unsigned,
            signature: Some(signature),
            signed,
            signed_bytes,
        };
        debug!(
            key_type = %keypair.key_type(),
            hash = %envelope.hash(),
            "signed transaction"
        );
        Ok(envelope)
    }

    /// Derive the key pair for `seed` and sign `tx` with it.
    pub fn sign_with_seed(&self, seed: &Seed, tx: &FieldTree) -> Result<SignedTransaction> {
        let keypair = keys::derive_keypair(seed)?;
        self.sign(&keypair, tx)
    }

    /// Check `TxnSignature` on `tx` against `public_key`.
    pub fn verify(&self, public_key: &PublicKey, tx: &FieldTree) -> Result<bool> {
        let signature = tx
            .get(TXN_SIGNATURE)
            .and_then(FieldValue::as_blob)
            .ok_or(CodecError::MissingField(TXN_SIGNATURE))?;
        let signature = Signature::from_bytes(signature.to_vec());
        self.verify_request(public_key, &SigningRequest::Single(tx), &signature)
    }

    // ─── Multi-signature ────────────────────────────────────────────────────

    /// Produce one signer's entry for a multi-signed `tx`.
    pub fn multi_sign(&self, keypair: &KeyPair, tx: &FieldTree, signer: AccountId) -> Result<SignerEntry> {
        let signature = self.sign_request(keypair, &SigningRequest::Multi { tx, signer })?;
        Ok(SignerEntry {
            account: signer,
            signing_pub_key: keypair.public_key,
            signature,
        })
    }

    /// Assemble signer entries into a multi-signed transaction.
    ///
    /// Entries are sorted by account id. Every entry must verify.
    pub fn combine_multisigned(
        &self,
        tx: &FieldTree,
        mut signers: Vec<SignerEntry>,
    ) -> Result<SignedTransaction> {
        if signers.is_empty() {
            return Err(EngineError::NoSigners);
        }
        signers.sort_by(|a, b| a.account.cmp(&b.account));
        if let Some(pair) = signers.windows(2).find(|w| w[0].account == w[1].account) {
            return Err(EngineError::DuplicateSigner(pair[0].account));
        }

        let mut unsigned = tx.clone();
        unsigned.remove(TXN_SIGNATURE);
        unsigned.remove(SIGNERS);
        unsigned.insert(SIGNING_PUB_KEY, FieldValue::empty_blob());

        for entry in &signers {
            let request = SigningRequest::Multi {
                tx: &unsigned,
                signer: entry.account,
            };
            if !self.verify_request(&entry.signing_pub_key, &request, &entry.signature)? {
                return Err(EngineError::InvalidSignerSignature(entry.account));
            }
        }

        let elements: Vec<ArrayElement> = signers.iter().map(|s| s.to_element(SIGNER)).collect();
        let signed = unsigned.clone().with(SIGNERS, elements);
        let signed_bytes = Bytes::from(canonical::encode(&self.defs, &signed)?);
        let envelope = SignedTransaction {
            unsigned,
            signature: None,
            signed,
            signed_bytes,
        };
        debug!(signers = signers.len(), hash = %envelope.hash(), "combined multi-signed transaction");
        Ok(envelope)
    }

    /// Check every entry of `Signers` on `tx`.
    ///
    /// `Ok(false)` if any signature fails, the entries are out of order or
    /// duplicated, or `SigningPubKey` is not empty.
    pub fn verify_multisigned(&self, tx: &FieldTree) -> Result<bool> {
        let elements = tx
            .get(SIGNERS)
            .and_then(FieldValue::as_array)
            .ok_or(CodecError::MissingField(SIGNERS))?;
        if elements.is_empty() {
            return Err(EngineError::NoSigners);
        }
        let signers = elements
            .iter()
            .map(SignerEntry::from_element)
            .collect::<Result<Vec<_>>>()?;

        if tx
            .get(SIGNING_PUB_KEY)
            .and_then(FieldValue::as_blob)
            .map_or(false, |key| !key.is_empty())
        {
            warn!("multi-signed transaction carries a SigningPubKey");
            return Ok(false);
        }
        if signers.windows(2).any(|w| w[0].account >= w[1].account) {
            warn!("Signers not strictly ascending by account");
            return Ok(false);
        }

        for entry in &signers {
            let request = SigningRequest::Multi {
                tx,
                signer: entry.account,
            };
            if !self.verify_request(&entry.signing_pub_key, &request, &entry.signature)? {
                debug!(account = %entry.account, "signer signature rejected");
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ─── Payment-channel claims ─────────────────────────────────────────────

    pub fn sign_claim(&self, keypair: &KeyPair, claim: &FieldTree) -> Result<Signature> {
        self.sign_request(keypair, &SigningRequest::Claim(claim))
    }

    pub fn verify_claim(
        &self,
        public_key: &PublicKey,
        claim: &FieldTree,
        signature: &Signature,
    ) -> Result<bool> {
        self.verify_request(public_key, &SigningRequest::Claim(claim), signature)
    }

    // ─── Batches ────────────────────────────────────────────────────────────

    pub fn sign_batch(&self, keypair: &KeyPair, batch: &Batch) -> Result<Signature> {
        self.sign_request(keypair, &SigningRequest::Batch(batch))
    }

    /// Produce one signer's `BatchSigner` entry.
    pub fn sign_batch_multi(
        &self,
        keypair: &KeyPair,
        batch: &Batch,
        signer: AccountId,
    ) -> Result<SignerEntry> {
        let signature = self.sign_request(keypair, &SigningRequest::BatchMulti { batch, signer })?;
        Ok(SignerEntry {
            account: signer,
            signing_pub_key: keypair.public_key,
            signature,
        })
    }

    pub fn verify_batch(
        &self,
        public_key: &PublicKey,
        batch: &Batch,
        signature: &Signature,
    ) -> Result<bool> {
        self.verify_request(public_key, &SigningRequest::Batch(batch), signature)
    }

    /// Check a `BatchSigner` entry against `batch`.
    pub fn verify_batch_signer(&self, batch: &Batch, entry: &SignerEntry) -> Result<bool> {
        let request = SigningRequest::BatchMulti {
            batch,
            signer: entry.account,
        };
        self.verify_request(&entry.signing_pub_key, &request, &entry.signature)
    }
}
