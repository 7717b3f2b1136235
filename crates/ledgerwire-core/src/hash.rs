//! SHA-512/half hashing and the protocol's hash prefixes.

use sha2::{Digest, Sha512};

use crate::types::Hash256;

/// Four-byte magic values prepended to data before hashing or signing.
///
/// These are fixed by the protocol; every conforming implementation uses
/// the same bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashPrefix {
    /// `TXN\0`: transaction id.
    TransactionId,
    /// `STX\0`: single-signed transaction.
    TransactionSign,
    /// `SMT\0`: multi-signed transaction.
    TransactionMultiSign,
    /// `CLM\0`: payment channel claim.
    PaymentChannelClaim,
    /// `BCH\0`: batch of inner transactions.
    Batch,
}

impl HashPrefix {
    pub const fn as_bytes(self) -> [u8; 4] {
        match self {
            HashPrefix::TransactionId => [0x54, 0x58, 0x4E, 0x00],
            HashPrefix::TransactionSign => [0x53, 0x54, 0x58, 0x00],
            HashPrefix::TransactionMultiSign => [0x53, 0x4D, 0x54, 0x00],
            HashPrefix::PaymentChannelClaim => [0x43, 0x4C, 0x4D, 0x00],
            HashPrefix::Batch => [0x42, 0x43, 0x48, 0x00],
        }
    }
}

/// Incremental SHA-512/half: the first 32 bytes of a SHA-512 digest.
#[derive(Clone, Default)]
pub struct Sha512Half(Sha512);

impl Sha512Half {
    pub fn new() -> Self {
        Self(Sha512::new())
    }

    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        self.0.update(data.as_ref());
        self
    }

    pub fn finalize(self) -> Hash256 {
        let digest = self.0.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..32]);
        Hash256(out)
    }

    /// Hash a single buffer.
    pub fn hash(data: impl AsRef<[u8]>) -> Hash256 {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    /// Hash `prefix || data`.
    pub fn hash_prefixed(prefix: HashPrefix, data: impl AsRef<[u8]>) -> Hash256 {
        let mut hasher = Self::new();
        hasher.update(prefix.as_bytes()).update(data);
        hasher.finalize()
    }
}
