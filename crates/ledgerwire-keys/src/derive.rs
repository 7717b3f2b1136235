//! Deterministic key derivation from seed entropy.
//!
//! Ed25519 hashes the entropy once. secp256k1 runs a scalar search: hash
//! `input ‖ discriminator? ‖ counter` with SHA-512/half until the result is
//! a valid nonzero scalar, then adds an account-level tweak to the root key.

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, FieldBytes, ProjectivePoint, Scalar};
use tracing::trace;
use zeroize::Zeroizing;

use ledgerwire_core::Sha512Half;

use crate::error::{KeyError, Result};
use crate::keys::{KeyPair, KeyType, PrivateKey, PublicKey, ED25519_PREFIX, KEY_LEN};

/// The only account index this library derives.
pub const ACCOUNT_INDEX: u32 = 0;

/// First scalar in `(0, n)` from hashing `input ‖ discriminator? ‖ counter`.
pub fn derive_scalar(input: &[u8], discriminator: Option<u32>) -> Result<Scalar> {
    for counter in 0..=u32::MAX {
        let mut hasher = Sha512Half::new();
        hasher.update(input);
        if let Some(d) = discriminator {
            hasher.update(d.to_be_bytes());
        }
        hasher.update(counter.to_be_bytes());
        let candidate = Zeroizing::new(hasher.finalize().0);

        let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::from(*candidate)).into();
        if let Some(scalar) = scalar {
            if !bool::from(scalar.is_zero()) {
                trace!(counter, "scalar search accepted candidate");
                return Ok(scalar);
            }
        }
    }
    Err(KeyError::InvalidScalar {
        key_type: KeyType::Secp256k1,
    })
}

pub(crate) fn compressed_point(scalar: &Scalar) -> Result<[u8; KEY_LEN]> {
    let point = AffinePoint::from(ProjectivePoint::GENERATOR * *scalar);
    point
        .to_encoded_point(true)
        .as_bytes()
        .try_into()
        .map_err(|_| KeyError::InvalidScalar {
            key_type: KeyType::Secp256k1,
        })
}

/// Derive a secp256k1 key pair from seed entropy (account index 0).
pub fn derive_secp256k1(entropy: &[u8]) -> Result<KeyPair> {
    let root = derive_scalar(entropy, None)?;
    let root_public = compressed_point(&root)?;
    let tweak = derive_scalar(&root_public, Some(ACCOUNT_INDEX))?;
    let scalar = root + tweak;
    if bool::from(scalar.is_zero()) {
        return Err(KeyError::InvalidScalar {
            key_type: KeyType::Secp256k1,
        });
    }

    let mut private = [0u8; KEY_LEN];
    private[1..].copy_from_slice(&scalar.to_bytes());
    let public = compressed_point(&scalar)?;
    Ok(KeyPair {
        private_key: PrivateKey::new(private, KeyType::Secp256k1),
        public_key: PublicKey::from_array(public),
    })
}

/// Derive an Ed25519 key pair from seed entropy.
pub fn derive_ed25519(entropy: &[u8]) -> Result<KeyPair> {
    let secret = Zeroizing::new(Sha512Half::hash(entropy).0);
    let signing_key = Ed25519SigningKey::from_bytes(&secret);

    let mut private = [0u8; KEY_LEN];
    private[0] = ED25519_PREFIX;
    private[1..].copy_from_slice(&secret[..]);
    let mut public = [0u8; KEY_LEN];
    public[0] = ED25519_PREFIX;
    public[1..].copy_from_slice(signing_key.verifying_key().as_bytes());

    Ok(KeyPair {
        private_key: PrivateKey::new(private, KeyType::Ed25519),
        public_key: PublicKey::from_array(public),
    })
}
