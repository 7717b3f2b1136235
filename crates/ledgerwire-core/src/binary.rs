//! Low-level byte sink and cursor for the canonical format.
//!
//! Variable-length (VL) values are prefixed with their length in one to
//! three bytes:
//!
//! ```text
//! 0 ..= 192          [len]
//! 193 ..= 12480      [193 + (n >> 8), n & 0xff]                    n = len - 193
//! 12481 ..= 918744   [241 + (n >> 16), (n >> 8) & 0xff, n & 0xff]  n = len - 12481
//! ```

use crate::error::{CodecError, Result};
use crate::field::FieldHeader;

/// Largest length a VL prefix can express.
pub const MAX_VL_LENGTH: usize = 918_744;

/// Encode a VL length prefix.
pub fn encode_vl_length(buf: &mut Vec<u8>, length: usize) -> Result<()> {
    if length <= 192 {
        buf.push(length as u8);
    } else if length <= 12_480 {
        let n = length - 193;
        buf.push(193 + (n >> 8) as u8);
        buf.push((n & 0xff) as u8);
    } else if length <= MAX_VL_LENGTH {
        let n = length - 12_481;
        buf.push(241 + (n >> 16) as u8);
        buf.push(((n >> 8) & 0xff) as u8);
        buf.push((n & 0xff) as u8);
    } else {
        return Err(CodecError::ValueTooLarge {
            length,
            max: MAX_VL_LENGTH,
        });
    }
    Ok(())
}

/// Append-only output buffer.
#[derive(Debug, Default)]
pub struct BinarySerializer {
    buf: Vec<u8>,
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_header(&mut self, header: FieldHeader) {
        header.write_to(&mut self.buf);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write `bytes` preceded by its VL length.
    pub fn write_vl(&mut self, bytes: &[u8]) -> Result<()> {
        encode_vl_length(&mut self.buf, bytes.len())?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Mutable access for value writers that append directly.
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A cursor over untrusted input that reports byte offsets in its errors.
#[derive(Debug)]
pub struct BinaryParser<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Consume exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    /// Consume exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read(N)?);
        Ok(out)
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Read a field header in its shortest form.
    pub fn read_header(&mut self) -> Result<FieldHeader> {
        let start = self.pos;
        let first = self.peek_u8().ok_or(CodecError::TruncatedInput {
            offset: start,
            needed: 1,
            available: 0,
        })?;
        let len = FieldHeader::len_from_first_byte(first);
        let bytes = self.read(len)?;
        FieldHeader::from_bytes(bytes).map_err(|reason| CodecError::MalformedHeader {
            input: format!("{} at offset {}", hex::encode_upper(bytes), start),
            reason,
        })
    }

    /// Read a VL length prefix, rejecting over-long forms.
    pub fn read_vl_length(&mut self) -> Result<usize> {
        let start = self.pos;
        let b0 = self.read_u8()? as usize;
        let length = match b0 {
            0..=192 => b0,
            193..=240 => {
                let b1 = self.read_u8()? as usize;
                193 + (b0 - 193) * 256 + b1
            }
            241..=254 => {
                let b1 = self.read_u8()? as usize;
                let b2 = self.read_u8()? as usize;
                12_481 + (b0 - 241) * 65_536 + b1 * 256 + b2
            }
            _ => {
                return Err(CodecError::NonCanonical {
                    offset: start,
                    reason: "invalid variable-length prefix byte 0xFF".into(),
                })
            }
        };

        let shortest = match length {
            0..=192 => 1,
            193..=12_480 => 2,
            _ => 3,
        };
        if self.pos - start != shortest || length > MAX_VL_LENGTH {
            return Err(CodecError::NonCanonical {
                offset: start,
                reason: format!("length {} not in its shortest prefix form", length),
            });
        }
        Ok(length)
    }

    /// Read a VL-prefixed value.
    pub fn read_vl(&mut self) -> Result<&'a [u8]> {
        let length = self.read_vl_length()?;
        self.read(length)
    }
}
