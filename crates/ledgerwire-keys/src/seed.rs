//! Seeds: 16 bytes of entropy tagged with the curve family they derive.

use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use ledgerwire_core::Sha512Half;

use crate::error::{KeyError, Result};
use crate::keys::KeyType;

/// Entropy length in bytes.
pub const ENTROPY_LEN: usize = 16;

/// Seed material for deterministic key derivation.
///
/// Zeroed on drop and on [`Seed::destroy`]. After destruction the entropy
/// reads as zeros and derivation fails with [`KeyError::NullSeed`].
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    entropy: [u8; ENTROPY_LEN],
    #[zeroize(skip)]
    key_type: KeyType,
    #[zeroize(skip)]
    destroyed: bool,
}

impl Seed {
    /// Fresh random entropy from the thread-local CSPRNG.
    pub fn generate(key_type: KeyType) -> Self {
        let mut entropy = [0u8; ENTROPY_LEN];
        rand::thread_rng().fill_bytes(&mut entropy);
        let seed = Self::new(entropy, key_type);
        entropy.zeroize();
        seed
    }

    /// Wrap existing entropy.
    pub fn from_entropy(entropy: &[u8], key_type: KeyType) -> Result<Self> {
        if entropy.is_empty() {
            return Err(KeyError::NullEntropy);
        }
        let arr: [u8; ENTROPY_LEN] = entropy
            .try_into()
            .map_err(|_| KeyError::InvalidEntropyLength(entropy.len()))?;
        Ok(Self::new(arr, key_type))
    }

    /// Entropy from a passphrase: the first 16 bytes of SHA-512/half.
    pub fn from_passphrase(passphrase: &str, key_type: KeyType) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(KeyError::NullEntropy);
        }
        let mut digest = Sha512Half::hash(passphrase.as_bytes()).0;
        let mut entropy = [0u8; ENTROPY_LEN];
        entropy.copy_from_slice(&digest[..ENTROPY_LEN]);
        digest.zeroize();
        let seed = Self::new(entropy, key_type);
        entropy.zeroize();
        Ok(seed)
    }

    fn new(entropy: [u8; ENTROPY_LEN], key_type: KeyType) -> Self {
        Self {
            entropy,
            key_type,
            destroyed: false,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The raw entropy. All zeros once destroyed.
    pub fn entropy(&self) -> &[u8; ENTROPY_LEN] {
        &self.entropy
    }

    /// Entropy for derivation, refusing a destroyed seed.
    pub(crate) fn live_entropy(&self) -> Result<&[u8; ENTROPY_LEN]> {
        if self.destroyed {
            return Err(KeyError::NullSeed);
        }
        Ok(&self.entropy)
    }

    /// Zero the entropy. Idempotent.
    pub fn destroy(&mut self) {
        self.entropy.zeroize();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, <redacted>)", self.key_type)
    }
}
