//! Byte cursor for ViewState object streams
//!
//! Every read is bounds checked and fails with [`DecodeError::Truncated`]
//! without moving the cursor. The cursor also carries the nesting depth of
//! composite decoders so hostile input cannot recurse without bound.

use crate::error::DecodeError;

/// Default limit on nested composite values
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Longest accepted variable-length integer (5 groups covers 32 bits)
const MAX_VARINT_BYTES: usize = 5;

/// Read position into an immutable byte buffer
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Unread bytes from the current position
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.pos,
            needed,
            available: self.remaining(),
        }
    }

    /// Fail early when a declared element count cannot possibly fit
    pub fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if needed > self.remaining() {
            return Err(self.truncated(needed));
        }
        Ok(())
    }

    /// Look at the next byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek().ok_or_else(|| self.truncated(1))?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u32_be(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    /// Read a 7-bit group integer, least significant group first.
    /// The high bit of each byte means another byte follows.
    pub fn read_varint(&mut self) -> Result<u32, DecodeError> {
        let start = self.pos;
        let mut value: u32 = 0;

        for i in 0..MAX_VARINT_BYTES {
            let byte = match self.data.get(start + i) {
                Some(&b) => b,
                None => {
                    return Err(DecodeError::Truncated {
                        offset: start,
                        needed: i + 1,
                        available: self.data.len() - start,
                    })
                }
            };

            // The last group holds only the top 4 bits and cannot continue
            if i == MAX_VARINT_BYTES - 1 && byte & 0xF0 != 0 {
                return Err(DecodeError::VarintOverflow { offset: start });
            }

            value |= u32::from(byte & 0x7F) << (7 * i);

            if byte & 0x80 == 0 {
                self.pos = start + i + 1;
                return Ok(value);
            }
        }

        Err(DecodeError::VarintOverflow { offset: start })
    }

    /// Read a varint used as an element count or byte length
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        self.read_varint().map(|n| n as usize)
    }

    /// Read bytes up to a 0x00 terminator, consuming the terminator
    pub fn read_until_nul(&mut self) -> Result<&'a [u8], DecodeError> {
        let rest = self.rest();
        let end = memchr::memchr(0, rest).ok_or_else(|| self.truncated(rest.len() + 1))?;
        let bytes = &rest[..end];
        self.pos += end + 1;
        Ok(bytes)
    }

    /// Enter a composite value, failing past the depth limit
    pub fn descend(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::TooDeep {
                limit: self.max_depth,
                offset: self.pos,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}
