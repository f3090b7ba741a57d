#![no_main]

use bitstream::BitReader;
use libfuzzer_sys::fuzz_target;

// Each input byte picks the next read; the reader walks the same input.
fuzz_target!(|data: &[u8]| {
    let mut reader = BitReader::new(data);
    for &op in data.iter().take(1024) {
        let before = reader.position();
        let result = match op % 3 {
            0 => reader.read_bit().map(u64::from),
            1 => reader.read_byte().map(u64::from),
            _ => reader.read_bits(u32::from(op / 3) % 66),
        };
        if result.is_err() {
            assert_eq!(reader.position(), before);
        }
    }
});
