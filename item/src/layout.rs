//! Fixed item layouts.
//!
//! Every item is a run of up to [`VALUE_COUNT`] unsigned values. Their bit
//! widths depend only on whether the item is a weapon.

use serde::{Deserialize, Serialize};

/// Number of values in a complete item.
pub const VALUE_COUNT: usize = 17;

/// Index of the first part value.
pub const FIRST_PART: usize = 6;

/// Bit widths for non-weapon items.
pub const ITEM_WIDTHS: [u8; VALUE_COUNT] = [
    8, 17, 20, 11, 7, 7, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16, 16,
];

/// Bit widths for weapons.
pub const WEAPON_WIDTHS: [u8; VALUE_COUNT] = [
    8, 13, 20, 11, 7, 7, 17, 17, 17, 17, 17, 17, 17, 17, 17, 17, 17,
];

/// Low bits that hold the asset index of type, balance and manufacturer,
/// for non-weapon items.
pub const ITEM_HEADER_ASSET_BITS: [u8; 3] = [8, 10, 7];

/// Same as [`ITEM_HEADER_ASSET_BITS`] for weapons.
pub const WEAPON_HEADER_ASSET_BITS: [u8; 3] = [6, 10, 7];

/// Version tag in the low seven bits of a blob's first byte.
pub const VERSION_TAG: u8 = 7;

const WEAPON_FLAG: u8 = 0x80;

/// Item or weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Item,
    Weapon,
}

impl ItemKind {
    #[must_use]
    pub const fn from_weapon_flag(is_weapon: bool) -> Self {
        if is_weapon {
            Self::Weapon
        } else {
            Self::Item
        }
    }

    /// Reads the kind from a blob's first byte.
    #[must_use]
    pub const fn from_header_byte(byte: u8) -> Self {
        Self::from_weapon_flag(byte & WEAPON_FLAG != 0)
    }

    #[must_use]
    pub const fn is_weapon(self) -> bool {
        matches!(self, Self::Weapon)
    }

    /// First byte of a blob of this kind.
    #[must_use]
    pub const fn header_byte(self) -> u8 {
        if self.is_weapon() {
            WEAPON_FLAG | VERSION_TAG
        } else {
            VERSION_TAG
        }
    }

    #[must_use]
    pub const fn widths(self) -> &'static [u8; VALUE_COUNT] {
        match self {
            Self::Item => &ITEM_WIDTHS,
            Self::Weapon => &WEAPON_WIDTHS,
        }
    }

    #[must_use]
    pub const fn header_asset_bits(self) -> &'static [u8; 3] {
        match self {
            Self::Item => &ITEM_HEADER_ASSET_BITS,
            Self::Weapon => &WEAPON_HEADER_ASSET_BITS,
        }
    }

    /// Low bits that hold the asset index of a part value.
    #[must_use]
    pub const fn part_asset_bits(self) -> u8 {
        match self {
            Self::Item => 10,
            Self::Weapon => 11,
        }
    }

    /// Total bits of a complete item.
    #[must_use]
    pub fn total_bits(self) -> usize {
        self.widths().iter().map(|&w| usize::from(w)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_byte_roundtrip() {
        assert_eq!(ItemKind::Item.header_byte(), 0x07);
        assert_eq!(ItemKind::Weapon.header_byte(), 0x87);
        assert_eq!(ItemKind::from_header_byte(0x87), ItemKind::Weapon);
        assert_eq!(ItemKind::from_header_byte(0x07), ItemKind::Item);
    }

    #[test]
    fn complete_items_fit_in_32_bytes() {
        assert_eq!(ItemKind::Item.total_bits(), 246);
        assert_eq!(ItemKind::Weapon.total_bits(), 253);
    }

    #[test]
    fn part_bits_follow_weapon_flag() {
        assert_eq!(ItemKind::Item.part_asset_bits(), 10);
        assert_eq!(ItemKind::Weapon.part_asset_bits(), 11);
    }
}
