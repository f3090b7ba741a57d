use crate::error::{BitError, BitResult};

/// MSB-first bit sink.
///
/// Bits land in the high end of each byte first, the order the Huffman
/// tree and its codes are laid out in a save. The unused low bits of the
/// last byte are always zero, so [`finish`](Self::finish) has nothing left
/// to pad.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    /// Bits already taken in the last byte of `out`; `0` when aligned.
    used: u8,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink with room for `bytes` bytes before reallocating.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            out: Vec::with_capacity(bytes),
            used: 0,
        }
    }

    #[must_use]
    pub fn bits_written(&self) -> usize {
        let open = if self.used == 0 { 0 } else { 8 - usize::from(self.used) };
        self.out.len() * 8 - open
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.used == 0 {
            self.out.push(0);
        }
        if bit {
            if let Some(last) = self.out.last_mut() {
                *last |= 0x80 >> self.used;
            }
        }
        self.used = (self.used + 1) % 8;
    }

    /// Writes eight bits, split across two bytes when unaligned.
    pub fn write_byte(&mut self, byte: u8) {
        if self.used == 0 {
            self.out.push(byte);
            return;
        }
        if let Some(last) = self.out.last_mut() {
            *last |= byte >> self.used;
        }
        self.out.push(byte << (8 - self.used));
    }

    /// Writes the low `width` bits of `value`, most significant first.
    ///
    /// Bits of `value` above `width` are ignored.
    ///
    /// # Errors
    ///
    /// [`BitError::TooWide`] when `width` is over 64.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_bits(&mut self, value: u64, width: u32) -> BitResult<()> {
        if width > 64 {
            return Err(BitError::TooWide { width });
        }
        let mut left = width;
        while left >= 8 {
            left -= 8;
            self.write_byte((value >> left) as u8);
        }
        while left > 0 {
            left -= 1;
            self.write_bit((value >> left) & 1 == 1);
        }
        Ok(())
    }

    /// The written bytes; a partial last byte keeps zero low bits.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_flag_then_byte() {
        // A serialized leaf: flag 1 then its byte, nine bits in all.
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_byte(b'A');
        assert_eq!(writer.bits_written(), 9);
        assert_eq!(writer.finish(), [0b1010_0000, 0b1000_0000]);
    }

    #[test]
    fn aligned_byte_is_copied() {
        let mut writer = BitWriter::with_capacity(4);
        writer.write_byte(0x5A);
        writer.write_byte(0xC3);
        assert_eq!(writer.bits_written(), 16);
        assert_eq!(writer.finish(), [0x5A, 0xC3]);
    }

    #[test]
    fn short_codes_share_a_byte() {
        // Codes 0, 10, 110 and 111 back to back.
        let mut writer = BitWriter::new();
        let codes: [&[bool]; 4] = [&[false], &[true, false], &[true, true, false], &[true, true, true]];
        for code in codes {
            for &bit in code {
                writer.write_bit(bit);
            }
        }
        assert_eq!(writer.bits_written(), 9);
        assert_eq!(writer.finish(), [0b0101_1011, 0b1000_0000]);
    }

    #[test]
    fn last_byte_padded_with_zeros() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b111, 3).unwrap();
        assert_eq!(writer.finish(), [0b1110_0000]);
    }

    #[test]
    fn write_bits_ignores_high_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF0F, 4).unwrap();
        writer.write_bits(0x1_2345, 12).unwrap();
        assert_eq!(writer.finish(), [0xF3, 0x45]);
    }

    #[test]
    fn write_bits_full_width() {
        let mut writer = BitWriter::new();
        writer.write_bit(false);
        writer.write_bits(u64::MAX, 64).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0x7F);
        assert_eq!(bytes[8], 0x80);
    }

    #[test]
    fn width_over_64_rejected() {
        let mut writer = BitWriter::new();
        assert_eq!(
            writer.write_bits(1, 65),
            Err(BitError::TooWide { width: 65 })
        );
        assert_eq!(writer.bits_written(), 0);
    }

    #[test]
    fn nothing_written_is_empty() {
        assert!(BitWriter::new().finish().is_empty());
    }
}
