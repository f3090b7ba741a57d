//! Obfuscated item blobs.
//!
//! Layout: `header byte | key: i32 be | body`, where the body is
//! `checksum: u16 be | packed values`, rotated left by `key & 31` bytes
//! and XORed with a keystream seeded by `key >> 5`.

use crate::error::{ItemError, ItemResult};
use crate::layout::ItemKind;
use crate::pack::{pack_values, unpack_values};

/// Header byte plus big-endian key.
pub const HEADER_LEN: usize = 5;

/// Length of the checksum leading the body.
pub const CHECKSUM_LEN: usize = 2;

/// Shortest blob [`unwrap_item`] and [`rekey_item`] accept.
pub const MIN_BLOB_LEN: usize = HEADER_LEN + CHECKSUM_LEN;

/// Packed values are padded with `0xFF` to this length before checksumming.
const CHECKSUM_SPAN: usize = 33;

const KEYSTREAM_MULTIPLIER: u64 = 279_470_273;
const KEYSTREAM_MODULUS: u64 = 4_294_967_291;

/// A decoded item blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub key: i32,
    pub values: Vec<Option<u64>>,
}

/// Packs `values` and obfuscates them under `key`.
pub fn wrap_item(kind: ItemKind, values: &[Option<u64>], key: i32) -> ItemResult<Vec<u8>> {
    let packed = pack_values(kind, values)?;
    Ok(seal(kind.header_byte(), key, &packed))
}

/// Reverses [`wrap_item`].
///
/// The checksum is dropped without being verified, so a damaged body still
/// decodes to (wrong) values.
pub fn unwrap_item(blob: &[u8]) -> ItemResult<Item> {
    let opened = open(blob)?;
    let kind = ItemKind::from_header_byte(opened.header_byte);
    Ok(Item {
        kind,
        key: opened.key,
        values: unpack_values(kind, &opened.packed),
    })
}

/// Re-obfuscates `blob` under `key` without unpacking its values.
///
/// The header byte is kept as-is and the checksum is recomputed.
pub fn rekey_item(blob: &[u8], key: i32) -> ItemResult<Vec<u8>> {
    let opened = open(blob)?;
    Ok(seal(opened.header_byte, key, &opened.packed))
}

/// Reads the key out of a blob header.
pub fn blob_key(blob: &[u8]) -> ItemResult<i32> {
    match blob {
        [_, a, b, c, d, ..] => Ok(i32::from_be_bytes([*a, *b, *c, *d])),
        _ => Err(ItemError::Truncated {
            needed: HEADER_LEN,
            available: blob.len(),
        }),
    }
}

struct Opened {
    header_byte: u8,
    key: i32,
    packed: Vec<u8>,
}

fn open(blob: &[u8]) -> ItemResult<Opened> {
    if blob.len() < MIN_BLOB_LEN {
        return Err(ItemError::Truncated {
            needed: MIN_BLOB_LEN,
            available: blob.len(),
        });
    }
    let key = blob_key(blob)?;
    let mut body = blob[HEADER_LEN..].to_vec();
    xor_keystream(&mut body, key >> 5);
    let steps = rotation(key, body.len());
    body.rotate_right(steps);
    body.drain(..CHECKSUM_LEN);
    Ok(Opened {
        header_byte: blob[0],
        key,
        packed: body,
    })
}

fn seal(header_byte: u8, key: i32, packed: &[u8]) -> Vec<u8> {
    let mut header = [0u8; HEADER_LEN];
    header[0] = header_byte;
    header[1..].copy_from_slice(&key.to_be_bytes());

    let mut body = Vec::with_capacity(CHECKSUM_LEN + packed.len());
    body.extend_from_slice(&checksum(&header, packed).to_be_bytes());
    body.extend_from_slice(packed);
    let steps = rotation(key, body.len());
    body.rotate_left(steps);
    xor_keystream(&mut body, key >> 5);

    let mut blob = Vec::with_capacity(HEADER_LEN + body.len());
    blob.extend_from_slice(&header);
    blob.extend_from_slice(&body);
    blob
}

/// XOR-folded CRC32 of `header | FF FF | packed | FF padding`.
fn checksum(header: &[u8; HEADER_LEN], packed: &[u8]) -> u16 {
    let padding = [0xFFu8; CHECKSUM_SPAN];
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(header);
    hasher.update(&[0xFF, 0xFF]);
    hasher.update(packed);
    hasher.update(&padding[..CHECKSUM_SPAN.saturating_sub(packed.len())]);
    let crc = hasher.finalize();
    ((crc >> 16) ^ crc) as u16
}

#[allow(clippy::cast_sign_loss)]
const fn key_bits(key: i32) -> u32 {
    key as u32
}

fn rotation(key: i32, len: usize) -> usize {
    (key_bits(key) & 31) as usize % len
}

/// XORs `data` with a multiplicative keystream seeded by `seed`.
///
/// The state advances before each byte; the byte is XORed with its low eight bits.
pub fn xor_keystream(data: &mut [u8], seed: i32) {
    let mut state = u64::from(key_bits(seed));
    for byte in data {
        state = state * KEYSTREAM_MULTIPLIER % KEYSTREAM_MODULUS;
        *byte ^= state as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::VALUE_COUNT;

    fn sample_values(kind: ItemKind) -> Vec<Option<u64>> {
        kind.widths()
            .iter()
            .enumerate()
            .map(|(i, &w)| Some((i as u64 * 1_234_567) & ((1 << w) - 1)))
            .collect()
    }

    #[test]
    fn wrap_unwrap_boundary_keys() {
        for kind in [ItemKind::Item, ItemKind::Weapon] {
            let values = sample_values(kind);
            for key in [0, 1, i32::MIN, i32::MAX] {
                let blob = wrap_item(kind, &values, key).unwrap();
                assert_eq!(blob[0], kind.header_byte());
                let item = unwrap_item(&blob).unwrap();
                assert_eq!(
                    item,
                    Item {
                        kind,
                        key,
                        values: values.clone()
                    }
                );
            }
        }
    }

    #[test]
    fn rekey_changes_key_only() {
        let values = sample_values(ItemKind::Item);
        let blob = wrap_item(ItemKind::Item, &values, 111).unwrap();
        let rekeyed = rekey_item(&blob, 222).unwrap();
        let item = unwrap_item(&rekeyed).unwrap();
        assert_eq!(item.kind, ItemKind::Item);
        assert_eq!(item.key, 222);
        assert_eq!(item.values, values);
        assert_eq!(rekeyed, wrap_item(ItemKind::Item, &values, 222).unwrap());
    }

    #[test]
    fn rekey_is_idempotent() {
        let blob = wrap_item(ItemKind::Weapon, &sample_values(ItemKind::Weapon), -9).unwrap();
        let once = rekey_item(&blob, 5).unwrap();
        let twice = rekey_item(&once, 5).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn key_zero_leaves_body_unrotated() {
        let blob = wrap_item(ItemKind::Item, &[Some(0x42)], 0).unwrap();
        // Seed 0 keeps the keystream at zero, so the body is plain.
        assert_eq!(&blob[..HEADER_LEN], &[0x07, 0, 0, 0, 0]);
        assert_eq!(blob[HEADER_LEN + CHECKSUM_LEN], 0x42);
        assert_eq!(blob_key(&blob).unwrap(), 0);
    }

    #[test]
    fn partial_item_roundtrip() {
        let mut values = sample_values(ItemKind::Weapon);
        for value in &mut values[9..] {
            *value = None;
        }
        let blob = wrap_item(ItemKind::Weapon, &values, 0x1234_5678).unwrap();
        let item = unwrap_item(&blob).unwrap();
        assert_eq!(item.values, values);
        assert_eq!(item.values.len(), VALUE_COUNT);
    }

    #[test]
    fn short_blob_is_truncated() {
        let err = unwrap_item(&[0x07, 0, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            ItemError::Truncated {
                needed: MIN_BLOB_LEN,
                available: 6
            }
        );
        assert!(rekey_item(&[], 1).is_err());
        assert!(blob_key(&[0x87, 1]).is_err());
    }

    #[test]
    fn checksum_is_not_verified() {
        let mut blob = wrap_item(ItemKind::Item, &sample_values(ItemKind::Item), 0).unwrap();
        blob[HEADER_LEN] ^= 0xFF;
        assert!(unwrap_item(&blob).is_ok());
    }

    #[test]
    fn keystream_is_involution() {
        let mut data = *b"hello, sanctuary";
        xor_keystream(&mut data, -12345);
        assert_ne!(&data, b"hello, sanctuary");
        xor_keystream(&mut data, -12345);
        assert_eq!(&data, b"hello, sanctuary");
    }
}
