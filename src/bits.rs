//! Low-level bit read utilities for byte slices.
//!
//! Bits are addressed in LSB-first order: bit 0 is the low bit of the first byte,
//! bit 8 the low bit of the second, so a little-endian word and its packed
//! bit-fields share one numbering.

use crate::errors::ReadError;

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits).
///
/// The bytes spanning the range are assembled little-endian, shifted right by
/// `bit_pos % 8` and masked to `n` bits.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> Result<u64, ReadError> {
    debug_assert!(n <= 64);

    let out_of_bounds = ReadError::OutOfBounds {
        bit_offset: bit_pos,
        bits: n,
    };

    let end = bit_pos.checked_add(n).ok_or(out_of_bounds.clone())?;
    if end > data.len() * 8 {
        return Err(out_of_bounds);
    }

    if n == 0 {
        return Ok(0);
    }

    let first = bit_pos / 8;
    let last = end.div_ceil(8);

    // At most 9 bytes: 64 bits plus a partial leading byte.
    let mut acc = 0u128;
    for &byte in data[first..last].iter().rev() {
        acc = (acc << 8) | byte as u128;
    }

    acc >>= bit_pos % 8;

    Ok((acc & mask(n) as u128) as u64)
}

/// Rounds `bit_pos` up to the next multiple of `bits`.
pub fn align_up(bit_pos: usize, bits: usize) -> usize {
    if bits == 0 {
        return bit_pos;
    }

    bit_pos.div_ceil(bits) * bits
}

/// All-ones mask of the low `bits` bits.
pub fn mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Largest unsigned value of a `bits`-wide integer.
pub fn unsigned_max(bits: usize) -> u64 {
    mask(bits)
}

/// Largest two's-complement value of a `bits`-wide integer.
pub fn signed_max(bits: usize) -> u64 {
    mask(bits) >> 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_at() {
        let data = [0b11111111];
        assert_eq!(read_bits_at(&data, 0, 8).unwrap(), 0b11111111);
    }

    #[test]
    fn test_read_bits_low_bits_first() {
        let data = [0b1010_0110];
        assert_eq!(read_bits_at(&data, 0, 2).unwrap(), 0b10);
        assert_eq!(read_bits_at(&data, 2, 3).unwrap(), 0b001);
        assert_eq!(read_bits_at(&data, 5, 3).unwrap(), 0b101);
    }

    #[test]
    fn test_read_bits_across_bytes() {
        let data = 0x1234_5678u32.to_le_bytes();
        assert_eq!(read_bits_at(&data, 0, 32).unwrap(), 0x1234_5678);
        assert_eq!(read_bits_at(&data, 4, 16).unwrap(), 0x4567);
        assert_eq!(read_bits_at(&data, 8, 16).unwrap(), 0x3456);
    }

    #[test]
    fn test_read_64_bits_unaligned() {
        let mut data = [0u8; 9];
        data[..8].copy_from_slice(&u64::MAX.to_le_bytes());
        data[8] = 0b1;
        // Shifted by one: the top bit comes from the ninth byte.
        assert_eq!(read_bits_at(&data, 1, 64).unwrap(), u64::MAX);
        assert_eq!(
            read_bits_at(&data, 9, 64).unwrap_err(),
            ReadError::OutOfBounds {
                bit_offset: 9,
                bits: 64
            }
        );
    }

    #[test]
    fn test_read_bits_out_of_bounds() {
        let data = [0b11111111];
        assert_eq!(
            read_bits_at(&data, 0, 9).unwrap_err(),
            ReadError::OutOfBounds {
                bit_offset: 0,
                bits: 9
            }
        );
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 8), 16);
        assert_eq!(align_up(5, 0), 5);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0b11111111, 8), -1);
        assert_eq!(sign_extend(0b0111_1111, 8), 127);
        assert_eq!(sign_extend(0b10_0000_0000, 10), -512);
    }

    #[test]
    fn test_maxima() {
        assert_eq!(unsigned_max(8), 255);
        assert_eq!(signed_max(8), 127);
        assert_eq!(unsigned_max(64), u64::MAX);
        assert_eq!(signed_max(64), i64::MAX as u64);
    }
}
