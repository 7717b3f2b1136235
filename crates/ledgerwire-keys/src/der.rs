//! Strict DER codec for secp256k1 ECDSA signatures.
//!
//! ```text
//! 30 len 02 rlen r... 02 slen s...
//! ```
//!
//! Every structural rule is enforced on parse: total length 8..=72, exact
//! declared lengths, integer lengths 1..=33, no negative integers, no
//! redundant zero padding, and `r`, `s` in `[1, n)`.

use k256::ecdsa::Signature as K256Signature;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, Scalar};

use crate::error::{KeyError, Result};

/// secp256k1 group order `n`, big-endian.
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// `n / 2`, big-endian. `s` above this is high.
pub const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

const MIN_DER_LEN: usize = 8;
const MAX_DER_LEN: usize = 72;

/// An ECDSA `(r, s)` pair, each a 32-byte big-endian integer in `[1, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerSignature {
    r: [u8; 32],
    s: [u8; 32],
}

impl DerSignature {
    /// Parse with structural and range checks. High `s` is accepted.
    pub fn parse(der: &[u8]) -> Result<Self> {
        if !(MIN_DER_LEN..=MAX_DER_LEN).contains(&der.len()) {
            return Err(KeyError::malformed_secp(format!(
                "DER length {} outside 8..=72",
                der.len()
            )));
        }
        if der[0] != 0x30 {
            return Err(KeyError::malformed_secp("missing SEQUENCE tag 0x30"));
        }
        if der[1] as usize != der.len() - 2 {
            return Err(KeyError::malformed_secp(format!(
                "declared length {} does not match {} content bytes",
                der[1],
                der.len() - 2
            )));
        }

        let (r, rest) = read_integer(&der[2..], "r")?;
        let (s, rest) = read_integer(rest, "s")?;
        if !rest.is_empty() {
            return Err(KeyError::malformed_secp("bytes after s"));
        }
        Ok(Self { r, s })
    }

    /// Parse and additionally require low `s`.
    pub fn parse_strict(der: &[u8]) -> Result<Self> {
        let sig = Self::parse(der)?;
        if !sig.is_low_s() {
            return Err(KeyError::NonCanonicalSignature);
        }
        Ok(sig)
    }

    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// `s <= n - s`.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// The same signature with `s` replaced by `n - s` when high.
    pub fn normalize_s(&self) -> Result<Self> {
        if self.is_low_s() {
            return Ok(*self);
        }
        let s = scalar(&self.s)?;
        let mut out = *self;
        out.s.copy_from_slice(&(-s).to_bytes());
        Ok(out)
    }

    /// Minimal DER encoding.
    pub fn to_der(&self) -> Vec<u8> {
        let r = encode_integer(&self.r);
        let s = encode_integer(&self.s);
        let mut out = Vec::with_capacity(2 + r.len() + s.len());
        out.push(0x30);
        out.push((r.len() + s.len()) as u8);
        out.extend(r);
        out.extend(s);
        out
    }

    pub fn from_k256(sig: &K256Signature) -> Self {
        let (r, s) = sig.split_bytes();
        let mut out = Self {
            r: [0u8; 32],
            s: [0u8; 32],
        };
        out.r.copy_from_slice(&r);
        out.s.copy_from_slice(&s);
        out
    }

    pub fn to_k256(&self) -> Result<K256Signature> {
        K256Signature::from_scalars(FieldBytes::from(self.r), FieldBytes::from(self.s))
            .map_err(|_| KeyError::malformed_secp("r or s rejected by the curve"))
    }
}

fn scalar(bytes: &[u8; 32]) -> Result<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*bytes)))
        .ok_or_else(|| KeyError::malformed_secp("integer not below the curve order"))
}

/// Read one `02 len value` integer, returning it left-padded to 32 bytes.
fn read_integer<'a>(input: &'a [u8], name: &str) -> Result<([u8; 32], &'a [u8])> {
    if input.len() < 2 {
        return Err(KeyError::malformed_secp(format!("{} truncated", name)));
    }
    if input[0] != 0x02 {
        return Err(KeyError::malformed_secp(format!("{} missing INTEGER tag 0x02", name)));
    }
    let len = input[1] as usize;
    if !(1..=33).contains(&len) {
        return Err(KeyError::malformed_secp(format!("{} length {} outside 1..=33", name, len)));
    }
    if input.len() < 2 + len {
        return Err(KeyError::malformed_secp(format!("{} truncated", name)));
    }
    let value = &input[2..2 + len];
    if value[0] & 0x80 != 0 {
        return Err(KeyError::malformed_secp(format!("{} is negative", name)));
    }
    if len > 1 && value[0] == 0 && value[1] & 0x80 == 0 {
        return Err(KeyError::malformed_secp(format!("{} has redundant zero padding", name)));
    }

    let digits = if value[0] == 0 { &value[1..] } else { value };
    if digits.len() > 32 {
        return Err(KeyError::malformed_secp(format!("{} wider than 256 bits", name)));
    }
    let mut out = [0u8; 32];
    out[32 - digits.len()..].copy_from_slice(digits);
    if out == [0u8; 32] || out >= CURVE_ORDER {
        return Err(KeyError::malformed_secp(format!("{} outside [1, n)", name)));
    }
    Ok((out, &input[2 + len..]))
}

fn encode_integer(value: &[u8; 32]) -> Vec<u8> {
    let first = value.iter().position(|&b| b != 0).unwrap_or(31);
    let digits = &value[first..];
    let mut out = Vec::with_capacity(digits.len() + 3);
    out.push(0x02);
    if digits[0] & 0x80 != 0 {
        out.push(digits.len() as u8 + 1);
        out.push(0);
    } else {
        out.push(digits.len() as u8);
    }
    out.extend_from_slice(digits);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic signature over the master-key Payment, normalized to low S.
    const LOW_S: &str = "30440220749DF3356674E938B5250471205ECD7D145B70FC99B098C08986CDE7B5A909840220\
                         6339A3491F90B57285BBC23D4D1651FBC8D21D36DF885573355737BB54A83029";
    const HIGH_S: &str = "30450220749DF3356674E938B5250471205ECD7D145B70FC99B098C08986CDE7B5A90984022100\
                          9CC65CB6E06F4A8D7A443DC2B2E9AE02F1DCBFAFCFC04AC88A7B26D17B8E1118";

    fn bytes(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    fn is_malformed(result: Result<DerSignature>) -> bool {
        matches!(result, Err(KeyError::MalformedSignature { .. }))
    }

    #[test]
    fn test_roundtrip() {
        let sig = DerSignature::parse_strict(&bytes(LOW_S)).unwrap();
        assert_eq!(hex::encode_upper(sig.to_der()), LOW_S);
        assert!(sig.is_low_s());
    }

    #[test]
    fn test_high_s() {
        let high = DerSignature::parse(&bytes(HIGH_S)).unwrap();
        assert!(!high.is_low_s());
        assert!(matches!(
            DerSignature::parse_strict(&bytes(HIGH_S)),
            Err(KeyError::NonCanonicalSignature)
        ));
        let normalized = high.normalize_s().unwrap();
        assert_eq!(hex::encode_upper(normalized.to_der()), LOW_S);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut der = bytes(LOW_S);
        der[1] += 1;
        assert!(is_malformed(DerSignature::parse(&der)));

        let mut truncated = bytes(LOW_S);
        truncated.pop();
        assert!(is_malformed(DerSignature::parse(&truncated)));
    }

    #[test]
    fn test_structural_violations() {
        assert!(is_malformed(DerSignature::parse(&[0x30, 0x04, 0x02, 0x01])));
        assert!(is_malformed(DerSignature::parse(&[0u8; 73])));

        let mut wrong_tag = bytes(LOW_S);
        wrong_tag[0] = 0x31;
        assert!(is_malformed(DerSignature::parse(&wrong_tag)));

        let mut wrong_int_tag = bytes(LOW_S);
        wrong_int_tag[2] = 0x03;
        assert!(is_malformed(DerSignature::parse(&wrong_int_tag)));

        // r = -1
        assert!(is_malformed(DerSignature::parse(&[
            0x30, 0x06, 0x02, 0x01, 0x81, 0x02, 0x01, 0x01
        ])));
        // r = 1 padded to two bytes
        assert!(is_malformed(DerSignature::parse(&[
            0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01
        ])));
        // r = 0
        assert!(is_malformed(DerSignature::parse(&[
            0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x01
        ])));
    }

    #[test]
    fn test_minimal_signature_accepted() {
        let sig = DerSignature::parse_strict(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]).unwrap();
        assert_eq!(sig.r()[31], 1);
        assert_eq!(sig.to_der(), vec![0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_r_at_curve_order_rejected() {
        let mut der = vec![0x30, 0x26, 0x02, 0x21, 0x00];
        der.extend_from_slice(&CURVE_ORDER);
        der.extend_from_slice(&[0x02, 0x01, 0x01]);
        assert!(is_malformed(DerSignature::parse(&der)));
    }

    #[test]
    fn test_k256_conversion() {
        let sig = DerSignature::parse(&bytes(LOW_S)).unwrap();
        let k = sig.to_k256().unwrap();
        assert_eq!(DerSignature::from_k256(&k), sig);
    }
}
