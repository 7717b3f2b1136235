//! Signature algorithms behind one capability trait.
//!
//! [`KeyAlgorithm`] is implemented once per curve family. The free functions
//! [`derive_keypair`], [`sign`] and [`verify`] pick the implementation from
//! the key's type tag.

use ed25519_dalek::{
    Signature as Ed25519Signature, Signer, SigningKey as Ed25519SigningKey,
    VerifyingKey as Ed25519VerifyingKey,
};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature as K256Signature, SigningKey, VerifyingKey};
use tracing::{trace, warn};

use ledgerwire_core::{Hash256, Sha512Half};

use crate::der::DerSignature;
use crate::derive::{derive_ed25519, derive_secp256k1};
use crate::error::{KeyError, Result};
use crate::keys::{KeyPair, KeyType, PrivateKey, PublicKey, Signature};
use crate::seed::Seed;

/// Key derivation, signing and verification for one curve family.
pub trait KeyAlgorithm: Send + Sync {
    fn key_type(&self) -> KeyType;

    /// Derive the key pair for `seed`. The seed must carry this algorithm's
    /// key type.
    fn derive_keypair(&self, seed: &Seed) -> Result<KeyPair>;

    /// Sign `message` (a signing blob, not a digest).
    fn sign(&self, private_key: &PrivateKey, message: &[u8]) -> Result<Signature>;

    /// `Ok(false)` for a well-formed signature that does not verify; `Err`
    /// only for malformed bytes or a key of the wrong family.
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool>;
}

fn check_tag(expected: KeyType, found: KeyType) -> Result<()> {
    if expected != found {
        return Err(KeyError::WrongCurveTag { expected, found });
    }
    Ok(())
}

// ─── Ed25519 ────────────────────────────────────────────────────────────────

/// Ed25519 over the raw message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Algorithm;

impl KeyAlgorithm for Ed25519Algorithm {
    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    fn derive_keypair(&self, seed: &Seed) -> Result<KeyPair> {
        check_tag(KeyType::Ed25519, seed.key_type())?;
        derive_ed25519(seed.live_entropy()?)
    }

    fn sign(&self, private_key: &PrivateKey, message: &[u8]) -> Result<Signature> {
        check_tag(KeyType::Ed25519, private_key.key_type())?;
        let signing_key = Ed25519SigningKey::try_from(private_key.secret()?)
            .map_err(|e| KeyError::InvalidPrivateKey(e.to_string()))?;
        let signature = signing_key.sign(message);
        Ok(Signature::from_bytes(signature.to_bytes().to_vec()))
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool> {
        check_tag(KeyType::Ed25519, public_key.key_type())?;
        let signature = Ed25519Signature::from_slice(signature.as_bytes()).map_err(|_| {
            KeyError::MalformedSignature {
                key_type: KeyType::Ed25519,
                reason: format!("expected 64 bytes, got {}", signature.len()),
            }
        })?;
        let key_bytes: [u8; 32] = public_key.as_bytes()[1..]
            .try_into()
            .map_err(|_| KeyError::InvalidPublicKey("ed25519 key is not 32 bytes".into()))?;
        let verifying_key = Ed25519VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
        Ok(verifying_key.verify_strict(message, &signature).is_ok())
    }
}

// ─── secp256k1 ──────────────────────────────────────────────────────────────

/// ECDSA over secp256k1, signing SHA-512/half of the message.
///
/// Produced signatures always have low `s`. With `strict_canonical` set,
/// verification also refuses high-`s` signatures from elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct Secp256k1Algorithm {
    pub strict_canonical: bool,
}

impl Default for Secp256k1Algorithm {
    fn default() -> Self {
        Self {
            strict_canonical: true,
        }
    }
}

impl Secp256k1Algorithm {
    pub fn new(strict_canonical: bool) -> Self {
        Self { strict_canonical }
    }

    /// Message digest that is actually signed.
    pub fn digest(message: &[u8]) -> Hash256 {
        Sha512Half::hash(message)
    }
}

impl KeyAlgorithm for Secp256k1Algorithm {
    fn key_type(&self) -> KeyType {
        KeyType::Secp256k1
    }

    fn derive_keypair(&self, seed: &Seed) -> Result<KeyPair> {
        check_tag(KeyType::Secp256k1, seed.key_type())?;
        derive_secp256k1(seed.live_entropy()?)
    }

    fn sign(&self, private_key: &PrivateKey, message: &[u8]) -> Result<Signature> {
        check_tag(KeyType::Secp256k1, private_key.key_type())?;
        let signing_key = SigningKey::from_slice(private_key.secret()?)
            .map_err(|_| KeyError::InvalidPrivateKey("scalar outside [1, n)".into()))?;
        let digest = Self::digest(message);
        let signature: K256Signature = signing_key
            .sign_prehash(digest.as_bytes())
            .map_err(|_| KeyError::InvalidPrivateKey("signing failed".into()))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(Signature::from_bytes(DerSignature::from_k256(&signature).to_der()))
    }

    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool> {
        check_tag(KeyType::Secp256k1, public_key.key_type())?;
        let mut parsed = DerSignature::parse(signature.as_bytes())?;
        if !parsed.is_low_s() {
            if self.strict_canonical {
                warn!(public_key = %public_key, "rejecting high-S secp256k1 signature");
                return Ok(false);
            }
            trace!("normalizing high-S signature before verification");
            parsed = parsed.normalize_s()?;
        }

        let verifying_key = VerifyingKey::from_sec1_bytes(public_key.as_bytes())
            .map_err(|_| KeyError::InvalidPublicKey("not a point on secp256k1".into()))?;
        let digest = Self::digest(message);
        Ok(verifying_key
            .verify_prehash(digest.as_bytes(), &parsed.to_k256()?)
            .is_ok())
    }
}

// ─── Dispatch ───────────────────────────────────────────────────────────────

static ED25519: Ed25519Algorithm = Ed25519Algorithm;
static SECP256K1_STRICT: Secp256k1Algorithm = Secp256k1Algorithm {
    strict_canonical: true,
};
static SECP256K1_LENIENT: Secp256k1Algorithm = Secp256k1Algorithm {
    strict_canonical: false,
};

/// The algorithm for `key_type`.
pub fn algorithm_for(key_type: KeyType, strict_canonical: bool) -> &'static dyn KeyAlgorithm {
    match (key_type, strict_canonical) {
        (KeyType::Ed25519, _) => &ED25519,
        (KeyType::Secp256k1, true) => &SECP256K1_STRICT,
        (KeyType::Secp256k1, false) => &SECP256K1_LENIENT,
    }
}

/// Derive the key pair for a seed using the seed's own key type.
pub fn derive_keypair(seed: &Seed) -> Result<KeyPair> {
    algorithm_for(seed.key_type(), true).derive_keypair(seed)
}

/// Sign with whichever algorithm the key belongs to.
pub fn sign(private_key: &PrivateKey, message: &[u8]) -> Result<Signature> {
    algorithm_for(private_key.key_type(), true).sign(private_key, message)
}

/// Verify with strict canonical checks.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<bool> {
    verify_with(public_key, message, signature, true)
}

/// Verify, choosing whether high-`s` secp256k1 signatures are refused.
pub fn verify_with(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
    strict_canonical: bool,
) -> Result<bool> {
    algorithm_for(public_key.key_type(), strict_canonical).verify(public_key, message, signature)
}
