//! Error types for the signing engine.

use ledgerwire_core::{AccountId, CodecError};
use ledgerwire_keys::{KeyError, KeyType};
use thiserror::Error;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Encoding, decoding or signing-blob error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Key derivation, signing or verification error.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// A freshly produced signature did not verify.
    #[error("{key_type} signature failed its post-sign verification")]
    SelfCheckFailed { key_type: KeyType },

    /// Multi-signing needs at least one signer.
    #[error("no signers supplied")]
    NoSigners,

    /// The same account signed twice.
    #[error("duplicate signer {0}")]
    DuplicateSigner(AccountId),

    /// A signer entry carries a signature that does not verify.
    #[error("signature from {0} does not verify")]
    InvalidSignerSignature(AccountId),

    /// Engine configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    /// True when the error comes from corrupt untrusted input.
    pub fn is_malformed_input(&self) -> bool {
        match self {
            EngineError::Codec(e) => e.is_malformed_input(),
            EngineError::Key(e) => e.is_malformed_input(),
            _ => false,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
