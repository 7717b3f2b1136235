//! Key and signature types.
//!
//! Both curve families use 33-byte keys. Ed25519 keys carry a leading
//! `0xED` byte; secp256k1 private keys a leading `0x00`, and secp256k1
//! public keys are SEC1-compressed points (`0x02`/`0x03`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{KeyError, Result};

/// Length of every private and public key.
pub const KEY_LEN: usize = 33;

/// Prefix byte marking Ed25519 key material.
pub const ED25519_PREFIX: u8 = 0xED;

/// Curve family discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Secp256k1,
    Ed25519,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Secp256k1 => f.write_str("secp256k1"),
            KeyType::Ed25519 => f.write_str("ed25519"),
        }
    }
}

/// A private key. Zeroed on drop; never copied implicitly.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; KEY_LEN],
    #[zeroize(skip)]
    key_type: KeyType,
    #[zeroize(skip)]
    destroyed: bool,
}

impl PrivateKey {
    /// Parse a 33-byte private key (`00 ‖ scalar` or `ED ‖ secret`).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidPrivateKey(format!("expected 33 bytes, got {}", bytes.len())))?;
        let key_type = match arr[0] {
            0x00 => KeyType::Secp256k1,
            ED25519_PREFIX => KeyType::Ed25519,
            other => {
                return Err(KeyError::InvalidPrivateKey(format!(
                    "unknown prefix byte 0x{:02X}",
                    other
                )))
            }
        };
        Ok(Self::new(arr, key_type))
    }

    pub(crate) fn new(bytes: [u8; KEY_LEN], key_type: KeyType) -> Self {
        Self {
            bytes,
            key_type,
            destroyed: false,
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// The 33-byte key. All zeros once destroyed.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// The 32 secret bytes without the prefix.
    pub(crate) fn secret(&self) -> Result<&[u8]> {
        if self.destroyed {
            return Err(KeyError::InvalidPrivateKey("key has been destroyed".into()));
        }
        Ok(&self.bytes[1..])
    }

    /// Zero the key material. Idempotent.
    pub fn destroy(&mut self) {
        self.bytes.zeroize();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, <redacted>)", self.key_type)
    }
}

/// A 33-byte public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; KEY_LEN]);

impl PublicKey {
    /// Parse and shape-check a public key. Curve membership is checked when
    /// the key is used.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::InvalidPublicKey(format!("expected 33 bytes, got {}", bytes.len())))?;
        match arr[0] {
            ED25519_PREFIX | 0x02 | 0x03 => Ok(Self(arr)),
            other => Err(KeyError::InvalidPublicKey(format!(
                "unknown prefix byte 0x{:02X}",
                other
            ))),
        }
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    pub fn key_type(&self) -> KeyType {
        if self.0[0] == ED25519_PREFIX {
            KeyType::Ed25519
        } else {
            KeyType::Secp256k1
        }
    }

    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    pub(crate) fn from_array(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// 33-byte arrays have no serde impls; keys travel as hex strings.
impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A private key with its public key.
pub struct KeyPair {
    pub private_key: PrivateKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    pub fn key_type(&self) -> KeyType {
        self.public_key.key_type()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({:?})", self.public_key)
    }
}

/// A signature: 64 raw bytes (Ed25519) or a DER-encoded `(r, s)` pair
/// (secp256k1).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode_upper(&self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
