//! Error types for key derivation and signatures.

use thiserror::Error;

use crate::keys::KeyType;

/// Errors raised by seeds, key derivation, signing and verification.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("seed has been destroyed")]
    NullSeed,

    #[error("entropy is empty")]
    NullEntropy,

    #[error("entropy must be 16 bytes, got {0}")]
    InvalidEntropyLength(usize),

    #[error("wrong curve: expected {expected} key material, got {found}")]
    WrongCurveTag { expected: KeyType, found: KeyType },

    #[error("{key_type} scalar search exhausted its counter")]
    InvalidScalar { key_type: KeyType },

    #[error("malformed {key_type} signature: {reason}")]
    MalformedSignature { key_type: KeyType, reason: String },

    #[error("secp256k1 signature has a high S value")]
    NonCanonicalSignature,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl KeyError {
    /// True when the error describes corrupt untrusted bytes (a signature or
    /// public key received from elsewhere) rather than a caller bug.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            KeyError::MalformedSignature { .. }
                | KeyError::NonCanonicalSignature
                | KeyError::InvalidPublicKey(_)
                | KeyError::InvalidHex(_)
        )
    }

    pub(crate) fn malformed_secp(reason: impl Into<String>) -> Self {
        KeyError::MalformedSignature {
            key_type: KeyType::Secp256k1,
            reason: reason.into(),
        }
    }
}

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
