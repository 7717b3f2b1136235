//! Strong types for fixed-width ledger primitives and amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, Result};

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// All-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Create from raw bytes.
            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Get the raw bytes.
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Convert to upper-case hex.
            pub fn to_hex(&self) -> String {
                hex::encode_upper(self.0)
            }

            /// Parse from hex.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = hex::decode(s)?;
                Self::try_from(bytes.as_slice())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl TryFrom<&[u8]> for $name {
            type Error = CodecError;

            fn try_from(slice: &[u8]) -> Result<Self> {
                let arr: [u8; $len] = slice.try_into().map_err(|_| CodecError::InvalidValue {
                    field: $label.to_string(),
                    reason: format!("expected {} bytes, got {}", $len, slice.len()),
                })?;
                Ok(Self(arr))
            }
        }
    };
}

fixed_bytes!(
    /// A 128-bit hash.
    Hash128, 16, "Hash128"
);
fixed_bytes!(
    /// A 160-bit hash.
    Hash160, 20, "Hash160"
);
fixed_bytes!(
    /// A 256-bit hash: transaction ids, ledger object ids, channel ids.
    Hash256, 32, "Hash256"
);
fixed_bytes!(
    /// A 20-byte account identifier (the raw form behind a classic address).
    AccountId, 20, "AccountId"
);
fixed_bytes!(
    /// A 20-byte currency code.
    Currency, 20, "Currency"
);

impl Currency {
    /// Build a standard three-character code such as `USD`.
    ///
    /// `XRP` is reserved for the native asset and is rejected.
    pub fn from_code(code: &str) -> Result<Self> {
        let invalid = |reason: &str| CodecError::InvalidValue {
            field: "Currency".into(),
            reason: format!("{:?}: {}", code, reason),
        };
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(invalid("standard codes are three printable ASCII characters"));
        }
        if code == "XRP" {
            return Err(invalid("reserved for the native asset"));
        }
        let mut bytes = [0u8; 20];
        bytes[12..15].copy_from_slice(code.as_bytes());
        Ok(Self(bytes))
    }

    /// The three-character code, if this is a standard currency.
    pub fn standard_code(&self) -> Option<&str> {
        let zero_outside = self.0[..12].iter().chain(&self.0[15..]).all(|&b| b == 0);
        if !zero_outside {
            return None;
        }
        std::str::from_utf8(&self.0[12..15]).ok()
    }
}

/// Largest native amount in drops (10^17).
pub const MAX_NATIVE_DROPS: u64 = 100_000_000_000_000_000;

/// Smallest normalized issued mantissa (10^15).
pub const MIN_MANTISSA: u64 = 1_000_000_000_000_000;

/// Largest normalized issued mantissa (10^16 - 1).
pub const MAX_MANTISSA: u64 = 9_999_999_999_999_999;

pub const MIN_EXPONENT: i32 = -96;
pub const MAX_EXPONENT: i32 = 80;

/// The decimal value of an issued (non-native) amount.
///
/// Always stored normalized: either zero, or a mantissa in
/// `MIN_MANTISSA..=MAX_MANTISSA` with an exponent in `MIN_EXPONENT..=MAX_EXPONENT`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IssuedValueParts", into = "IssuedValueParts")]
pub struct IssuedValue {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

/// Serialized form of [`IssuedValue`]. Normalized on the way in.
#[derive(Serialize, Deserialize)]
struct IssuedValueParts {
    negative: bool,
    mantissa: u64,
    exponent: i32,
}

impl TryFrom<IssuedValueParts> for IssuedValue {
    type Error = CodecError;

    fn try_from(parts: IssuedValueParts) -> Result<Self> {
        Self::new(parts.negative, parts.mantissa, parts.exponent)
    }
}

impl From<IssuedValue> for IssuedValueParts {
    fn from(value: IssuedValue) -> Self {
        Self {
            negative: value.negative,
            mantissa: value.mantissa,
            exponent: value.exponent,
        }
    }
}

impl IssuedValue {
    pub const ZERO: Self = Self {
        negative: false,
        mantissa: 0,
        exponent: 0,
    };

    /// Normalize `mantissa * 10^exponent`.
    ///
    /// Values too small to represent collapse to zero. Values too large, or
    /// that would lose significant digits, are rejected.
    pub fn new(negative: bool, mantissa: u64, exponent: i32) -> Result<Self> {
        let invalid = |reason: &str| CodecError::InvalidValue {
            field: "IssuedValue".into(),
            reason: reason.to_string(),
        };
        if mantissa == 0 {
            return Ok(Self::ZERO);
        }

        let mut mantissa = mantissa;
        let mut exponent = exponent;
        while mantissa < MIN_MANTISSA && exponent > MIN_EXPONENT {
            mantissa *= 10;
            exponent -= 1;
        }
        while mantissa > MAX_MANTISSA {
            if mantissa % 10 != 0 {
                return Err(invalid("more than 16 significant digits"));
            }
            mantissa /= 10;
            exponent = exponent.saturating_add(1);
        }
        if exponent > MAX_EXPONENT {
            return Err(invalid("exponent above 80"));
        }
        if exponent < MIN_EXPONENT || mantissa < MIN_MANTISSA {
            return Ok(Self::ZERO);
        }
        Ok(Self {
            negative,
            mantissa,
            exponent,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn mantissa(&self) -> u64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// The 8-byte wire word (without currency and issuer).
    pub fn to_word(&self) -> u64 {
        if self.is_zero() {
            return 1 << 63;
        }
        let mut word = 1u64 << 63;
        if !self.negative {
            word |= 1 << 62;
        }
        word |= ((self.exponent + 97) as u64) << 54;
        word | self.mantissa
    }

    /// Parse the 8-byte wire word, insisting on normalized form.
    pub fn from_word(word: u64) -> std::result::Result<Self, &'static str> {
        if word >> 63 == 0 {
            return Err("not an issued amount");
        }
        if word == 1 << 63 {
            return Ok(Self::ZERO);
        }
        let negative = (word >> 62) & 1 == 0;
        let exponent = ((word >> 54) & 0xff) as i32 - 97;
        let mantissa = word & ((1 << 54) - 1);
        if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa)
            || !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent)
        {
            return Err("issued amount not normalized");
        }
        Ok(Self {
            negative,
            mantissa,
            exponent,
        })
    }
}

impl FromStr for IssuedValue {
    type Err = CodecError;

    /// Parse a decimal string such as `"1"`, `"-0.25"` or `"1.5e3"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodecError::InvalidValue {
            field: "IssuedValue".into(),
            reason: format!("not a decimal number: {:?}", s),
        };

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (number, exp_part) = match body.find(['e', 'E']) {
            Some(i) => (&body[..i], Some(&body[i + 1..])),
            None => (body, None),
        };
        let mut exponent: i32 = match exp_part {
            Some(e) => e.parse().map_err(|_| invalid())?,
            None => 0,
        };
        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let out_of_range = || CodecError::InvalidValue {
            field: "IssuedValue".into(),
            reason: format!("exponent out of range: {:?}", s),
        };
        let digits = format!("{}{}", int_part, frac_part);
        let digits = digits.trim_start_matches('0');
        // Trailing zeros move into the exponent so that long round numbers fit.
        let trimmed = digits.trim_end_matches('0');
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        exponent = i32::try_from(frac_part.len())
            .ok()
            .and_then(|shift| exponent.checked_sub(shift))
            .ok_or_else(out_of_range)?;
        exponent = i32::try_from(digits.len() - trimmed.len())
            .ok()
            .and_then(|shift| exponent.checked_add(shift))
            .ok_or_else(out_of_range)?;
        if trimmed.len() > 16 {
            return Err(CodecError::InvalidValue {
                field: "IssuedValue".into(),
                reason: format!("more than 16 significant digits: {:?}", s),
            });
        }
        let mantissa: u64 = trimmed.parse().map_err(|_| invalid())?;
        Self::new(negative, mantissa, exponent)
    }
}

impl fmt::Display for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        let mut mantissa = self.mantissa;
        let mut exponent = self.exponent;
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent += 1;
        }
        let sign = if self.negative { "-" } else { "" };
        if exponent == 0 {
            write!(f, "{}{}", sign, mantissa)
        } else {
            write!(f, "{}{}e{}", sign, mantissa, exponent)
        }
    }
}

impl fmt::Debug for IssuedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuedValue({})", self)
    }
}

/// A ledger amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    /// Native asset, in drops.
    Native(u64),
    /// An issued currency balance.
    Issued {
        value: IssuedValue,
        currency: Currency,
        issuer: AccountId,
    },
}

impl Amount {
    /// Wire width: 8 bytes native, 48 bytes issued.
    pub fn encoded_len(&self) -> usize {
        match self {
            Amount::Native(_) => 8,
            Amount::Issued { .. } => 48,
        }
    }

    /// Append the wire form to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Amount::Native(drops) => {
                if *drops > MAX_NATIVE_DROPS {
                    return Err(CodecError::InvalidValue {
                        field: "Amount".into(),
                        reason: format!("{} drops exceeds 10^17", drops),
                    });
                }
                buf.extend_from_slice(&(drops | 1 << 62).to_be_bytes());
            }
            Amount::Issued {
                value,
                currency,
                issuer,
            } => {
                if currency.standard_code() == Some("XRP") {
                    return Err(CodecError::InvalidValue {
                        field: "Amount".into(),
                        reason: "issued amount with XRP currency".into(),
                    });
                }
                buf.extend_from_slice(&value.to_word().to_be_bytes());
                buf.extend_from_slice(currency.as_bytes());
                buf.extend_from_slice(issuer.as_bytes());
            }
        }
        Ok(())
    }
}
