use crate::error::{BitError, BitResult};

/// Forward-only, MSB-first bit cursor over a borrowed buffer.
///
/// A read that would run past the end fails without moving the cursor.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Offset of the next bit, counted from the start of the buffer.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining_bits(&self) -> usize {
        (self.buf.len() * 8).saturating_sub(self.pos)
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining_bits() == 0
    }

    /// Claims `wanted` bits and returns the offset of the first.
    fn claim(&mut self, wanted: usize) -> BitResult<usize> {
        let left = self.remaining_bits();
        if wanted > left {
            return Err(BitError::Exhausted {
                at: self.pos,
                wanted,
                left,
            });
        }
        let at = self.pos;
        self.pos += wanted;
        Ok(at)
    }

    fn bit_at(&self, at: usize) -> bool {
        (self.buf[at / 8] >> (7 - at % 8)) & 1 == 1
    }

    pub fn read_bit(&mut self) -> BitResult<bool> {
        let at = self.claim(1)?;
        Ok(self.bit_at(at))
    }

    /// Reads eight bits, which may straddle two bytes.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        let at = self.claim(8)?;
        let (index, shift) = (at / 8, at % 8);
        let high = self.buf[index] << shift;
        if shift == 0 {
            return Ok(high);
        }
        Ok(high | (self.buf[index + 1] >> (8 - shift)))
    }

    /// Reads `width` bits as an unsigned value, first bit most significant.
    ///
    /// # Errors
    ///
    /// [`BitError::TooWide`] when `width` is over 64, [`BitError::Exhausted`]
    /// when fewer than `width` bits are left.
    pub fn read_bits(&mut self, width: u32) -> BitResult<u64> {
        if width > 64 {
            return Err(BitError::TooWide { width });
        }
        let start = self.claim(width as usize)?;
        Ok((start..self.pos).fold(0, |value, at| (value << 1) | u64::from(self.bit_at(at))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_flag_then_unaligned_byte() {
        // Flag 1, then 'A' starting at bit 1.
        let mut reader = BitReader::new(&[0b1010_0000, 0b1000_0000]);
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_byte().unwrap(), b'A');
        assert_eq!(reader.position(), 9);
        assert_eq!(reader.remaining_bits(), 7);
    }

    #[test]
    fn codes_walk_bit_by_bit() {
        let mut reader = BitReader::new(&[0b0101_1011]);
        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(bits, [false, true, false, true, true, false, true, true]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn read_bits_msb_first_across_bytes() {
        let mut reader = BitReader::new(&[0xF3, 0x45]);
        assert_eq!(reader.read_bits(4).unwrap(), 0xF);
        assert_eq!(reader.read_bits(12).unwrap(), 0x345);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
    }

    #[test]
    fn read_bits_full_width() {
        let mut reader = BitReader::new(&[0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x80]);
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.read_bits(64).unwrap(), u64::MAX);
    }

    #[test]
    fn truncated_byte_leaves_cursor_in_place() {
        let mut reader = BitReader::new(&[0xFF]);
        reader.read_bit().unwrap();
        assert_eq!(
            reader.read_byte(),
            Err(BitError::Exhausted {
                at: 1,
                wanted: 8,
                left: 7
            })
        );
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_bits(7).unwrap(), 0x7F);
    }

    #[test]
    fn empty_buffer_has_no_bits() {
        let mut reader = BitReader::new(&[]);
        assert!(reader.is_exhausted());
        assert!(matches!(
            reader.read_bit(),
            Err(BitError::Exhausted { at: 0, wanted: 1, left: 0 })
        ));
    }

    #[test]
    fn width_over_64_rejected() {
        let mut reader = BitReader::new(&[0; 16]);
        assert_eq!(reader.read_bits(65), Err(BitError::TooWide { width: 65 }));
        assert_eq!(reader.position(), 0);
    }
}
