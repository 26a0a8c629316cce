//! Byte-level helpers shared by the product and capability codecs.
//!
//! All multi-byte integers are big-endian. Variable-width integers use the
//! smallest of 1, 2, 4 or 8 bytes that can hold a known maximum, so both
//! sides agree on the width without a length prefix.

use crate::error::{DecodeError, DecodeResult};

/// Smallest width (1, 2, 4 or 8 bytes) able to hold `max`.
pub fn width_for(max: u64) -> usize {
    if max <= 0xff {
        1
    } else if max <= 0xffff {
        2
    } else if max <= 0xffff_ffff {
        4
    } else {
        8
    }
}

/// Append `value` as a big-endian integer of exactly `width` bytes.
///
/// `width` must be 1, 2, 4 or 8 and large enough to hold `value`; the
/// callers derive it from [`width_for`].
pub fn write_uint(out: &mut Vec<u8>, value: u64, width: usize) {
    debug_assert!(
        width == 8 || value >> (8 * width) == 0,
        "{value} does not fit in {width} bytes"
    );
    let bytes = value.to_be_bytes();
    out.extend_from_slice(&bytes[8 - width..]);
}

/// Append `value` as 8 big-endian bytes.
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// A bounds-checked cursor over an input byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Whether the input is exhausted.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> DecodeResult<u8> {
        self.bytes
            .get(self.position)
            .copied()
            .ok_or(DecodeError::UnexpectedEnd {
                needed: 1,
                remaining: 0,
            })
    }

    /// Consume exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::UnexpectedEnd {
                needed: len,
                remaining,
            });
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Consume a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let slice = self.read_bytes(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(slice);
        Ok(arr)
    }

    /// Consume one byte.
    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    /// Consume an 8-byte big-endian integer.
    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        Ok(u64::from_be_bytes(self.read_array::<8>()?))
    }

    /// Consume a big-endian integer of `width` bytes (1, 2, 4 or 8).
    pub fn read_uint(&mut self, width: usize) -> DecodeResult<u64> {
        let slice = self.read_bytes(width)?;
        let mut buf = [0u8; 8];
        buf[8 - width..].copy_from_slice(slice);
        Ok(u64::from_be_bytes(buf))
    }

    /// Fail unless the whole input has been consumed.
    pub fn finish(&self) -> DecodeResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}
