//! Cursor over a byte slice that reads packed bit-fields and byte-aligned data.

use crate::{bits, errors::ReadError};

/// A single monotonically increasing bit position into `data`.
///
/// Integer reads advance by their exact width; byte reads realign to the next
/// byte boundary first.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    /// Length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Reads `n` bits (max 64) at the cursor without realigning.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, ReadError> {
        let value = bits::read_bits_at(self.data, self.bit_pos, n)?;
        self.bit_pos += n;

        Ok(value)
    }

    pub fn align_to(&mut self, bits: usize) {
        self.bit_pos = bits::align_up(self.bit_pos, bits);
    }

    /// Realigns to a byte boundary and reads exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        self.align_to(8);

        let start = self.bit_pos / 8;
        let bytes = start
            .checked_add(n)
            .and_then(|end| self.data.get(start..end))
            .ok_or(ReadError::OutOfBounds {
                bit_offset: self.bit_pos,
                bits: n.saturating_mul(8),
            })?;

        self.bit_pos += n * 8;

        Ok(bytes)
    }

    /// Realigns to a byte boundary and reads at most `n` bytes, stopping before
    /// the first zero byte. Only the bytes up to the terminator must exist; the
    /// cursor always advances by `n` bytes, even past the end of the buffer.
    pub fn read_bounded(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        self.align_to(8);

        let start = self.bit_pos / 8;
        let rest = self.data.get(start..).unwrap_or_default();
        let window = &rest[..rest.len().min(n)];
        let len = match window.iter().position(|&b| b == 0) {
            Some(len) => len,
            None if window.len() == n => n,
            None => {
                return Err(ReadError::OutOfBounds {
                    bit_offset: self.bit_pos,
                    bits: n.saturating_mul(8),
                });
            }
        };

        self.bit_pos = self.bit_pos.saturating_add(n.saturating_mul(8));

        Ok(&window[..len])
    }

    /// Realigns to a byte boundary and reads up to (not including) the next zero
    /// byte. The cursor ends just past the terminator.
    pub fn read_until_zero(&mut self) -> Result<&'a [u8], ReadError> {
        self.align_to(8);

        let start = self.bit_pos / 8;
        let rest = self.data.get(start..).unwrap_or_default();
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(ReadError::MissingTerminator {
                bit_offset: self.bit_pos,
            })?;

        self.bit_pos += (len + 1) * 8;

        Ok(&rest[..len])
    }
}
