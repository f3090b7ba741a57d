//! Packing item values into their fixed-width, low-bit-first layout.

use crate::error::{ItemError, ItemResult};
use crate::layout::{ItemKind, VALUE_COUNT};

/// Packs `values` low-bit-first using the widths of `kind`.
///
/// Packing stops at the first `None`; every later value must also be
/// `None`. Unused bits of the final byte are set to one.
pub fn pack_values(kind: ItemKind, values: &[Option<u64>]) -> ItemResult<Vec<u8>> {
    if values.len() > VALUE_COUNT {
        return Err(ItemError::TooManyValues {
            count: values.len(),
            max: VALUE_COUNT,
        });
    }

    let mut out = vec![0u8; kind.total_bits().div_ceil(8)];
    let mut bit = 0usize;
    let mut ended = false;

    for (index, (value, &width)) in values.iter().zip(kind.widths()).enumerate() {
        let Some(value) = *value else {
            ended = true;
            continue;
        };
        if ended {
            return Err(ItemError::ValueAfterAbsent { index });
        }
        if value >> width != 0 {
            return Err(ItemError::ValueOutOfRange {
                index,
                value,
                bits: width,
            });
        }
        for k in 0..usize::from(width) {
            if (value >> k) & 1 != 0 {
                let pos = bit + k;
                out[pos >> 3] |= 1 << (pos & 7);
            }
        }
        bit += usize::from(width);
    }

    if bit & 7 != 0 {
        out[bit >> 3] |= 0xFF << (bit & 7);
    }
    out.truncate(bit.div_ceil(8));
    Ok(out)
}

/// Unpacks up to [`VALUE_COUNT`] values using the widths of `kind`.
///
/// The first value that does not fit in the remaining bits, and every
/// value after it, is `None`. The result always has [`VALUE_COUNT`] entries.
#[must_use]
pub fn unpack_values(kind: ItemKind, bytes: &[u8]) -> Vec<Option<u64>> {
    let end = bytes.len() * 8;
    let mut bit = 0usize;
    let mut values = Vec::with_capacity(VALUE_COUNT);

    for &width in kind.widths() {
        let width = usize::from(width);
        if bit + width > end {
            break;
        }
        let mut value = 0u64;
        for k in 0..width {
            let pos = bit + k;
            if (bytes[pos >> 3] >> (pos & 7)) & 1 != 0 {
                value |= 1 << k;
            }
        }
        values.push(Some(value));
        bit += width;
    }

    values.resize(VALUE_COUNT, None);
    values
}
