//! LEB128-style unsigned varints and the byte cursor the field reader runs on.

use crate::error::{WireError, WireResult};

/// Maximum encoded length of a `u64` varint.
pub const VARINT_MAX_BYTES: usize = 10;

/// Appends `value` as a varint: 7 payload bits per byte, low group first.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value > 0x7F {
        out.push(0x80 | (value & 0x7F) as u8);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Returns the number of bytes `value` occupies as a varint.
#[must_use]
pub const fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value > 0x7F {
        value >>= 7;
        len += 1;
    }
    len
}

/// Decodes a varint starting at `offset`, returning the value and the offset after it.
pub fn decode_varint(buf: &[u8], offset: usize) -> WireResult<(u64, usize)> {
    let mut cursor = ByteReader::new(buf);
    cursor.skip(offset)?;
    let value = cursor.read_varint()?;
    Ok((value, cursor.position()))
}

/// A forward-only cursor over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn skip(&mut self, len: usize) -> WireResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> WireResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(WireError::Truncated {
            needed: self.pos + 1,
            available: self.data.len(),
        })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads a varint. A stream that ends before a terminating byte is truncated.
    pub fn read_varint(&mut self) -> WireResult<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            let payload = u64::from(byte & 0x7F);
            if shift >= 64 || (shift > 0 && payload >> (64 - shift) != 0) {
                return Err(WireError::VarintOverflow);
            }
            value |= payload << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// Reads a little-endian `u32`.
    pub fn read_fixed32(&mut self) -> WireResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads a little-endian `u64`.
    pub fn read_fixed64(&mut self) -> WireResult<u64> {
        let bytes = self.read_array::<8>()?;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(WireError::LengthOverflow { length: len })?;
        if end > self.data.len() {
            return Err(WireError::Truncated {
                needed: end,
                available: self.data.len(),
            });
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> WireResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_varint(value, &mut out);
        out
    }

    #[test]
    fn encode_300() {
        assert_eq!(encoded(300), vec![0xAC, 0x02]);
    }

    #[test]
    fn encode_single_byte_values() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7F]);
        assert_eq!(encoded(128), vec![0x80, 0x01]);
    }

    #[test]
    fn roundtrip_reference_values() {
        for value in [0, 1, 127, 128, 300, u64::from(u32::MAX), u64::MAX] {
            let bytes = encoded(value);
            assert_eq!(bytes.len(), varint_len(value));
            let (decoded, next) = decode_varint(&bytes, 0).unwrap();
            assert_eq!(decoded, value);
            assert_eq!(next, bytes.len());
        }
    }

    #[test]
    fn decode_at_offset() {
        let bytes = [0xFF, 0xAC, 0x02, 0x05];
        assert_eq!(decode_varint(&bytes, 1).unwrap(), (300, 3));
    }

    #[test]
    fn unterminated_varint_is_truncated() {
        let err = decode_varint(&[0x80, 0x80], 0).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn oversized_varint_overflows() {
        let mut bytes = vec![0xFF; 10];
        bytes.push(0x01);
        let err = decode_varint(&bytes, 0).unwrap_err();
        assert_eq!(err, WireError::VarintOverflow);
    }

    #[test]
    fn fixed_width_reads_are_little_endian() {
        let mut reader = ByteReader::new(&[0x78, 0x56, 0x34, 0x12, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(reader.read_fixed32().unwrap(), 0x1234_5678);
        assert_eq!(reader.read_fixed64().unwrap(), 1);
        assert!(reader.is_empty());
    }

    #[test]
    fn read_bytes_past_end_fails() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        let err = reader.read_bytes(4).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                needed: 4,
                available: 3
            }
        );
    }
}
