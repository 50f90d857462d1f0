//! Unsigned LEB128 varints.
//!
//! Each byte carries 7 payload bits, least-significant group first, with the
//! high bit set on every byte except the last. Values up to `u32::MAX` take at
//! most 5 bytes, full `u64` values at most 10.

use crate::error::{MetaIndexError, Result};

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// Appends the encoding of `value` to `buf`.
#[inline]
pub fn encode_into(buf: &mut Vec<u8>, mut value: u64) {
    while value >= u64::from(CONTINUATION) {
        buf.push((value as u8 & PAYLOAD_MASK) | CONTINUATION);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Encodes `value` into a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    encode_into(&mut buf, value);
    buf
}

/// Decodes one value starting at `cursor`, returning it with the cursor
/// advanced past the consumed bytes.
///
/// Running off the end of `bytes` before a terminating byte is a
/// [`MetaIndexError::TruncatedVarint`].
pub fn decode(bytes: &[u8], cursor: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    let mut offset = cursor;
    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(MetaIndexError::TruncatedVarint {
                offset,
                len: bytes.len(),
            });
        };
        offset += 1;

        let payload = u64::from(byte & PAYLOAD_MASK);
        // The tenth byte may only contribute the single remaining bit.
        if shift == 63 && payload > 1 {
            return Err(MetaIndexError::VarintOverflow { offset: cursor });
        }
        value |= payload << shift;

        if byte & CONTINUATION == 0 {
            return Ok((value, offset));
        }
        shift += 7;
        if shift > 63 {
            return Err(MetaIndexError::VarintOverflow { offset: cursor });
        }
    }
}

/// Iterator decoding consecutive varints until the buffer is exhausted.
#[derive(Debug, Clone)]
pub struct VarintIter<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> VarintIter<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }
}

impl Iterator for VarintIter<'_> {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.bytes.len() {
            return None;
        }
        match decode(self.bytes, self.cursor) {
            Ok((value, next)) => {
                self.cursor = next;
                Some(Ok(value))
            }
            Err(err) => {
                // Stop after the first fault; the rest of the stream is unreliable.
                self.cursor = self.bytes.len();
                Some(Err(err))
            }
        }
    }
}
