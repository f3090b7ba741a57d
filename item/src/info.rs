//! Semantic view of an item blob.

use serde::{Deserialize, Serialize};

use crate::blob::{unwrap_item, wrap_item};
use crate::error::{ItemError, ItemResult};
use crate::layout::{ItemKind, FIRST_PART};

/// A value split into an asset library and an index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub lib: u64,
    pub asset: u64,
}

impl AssetRef {
    /// Splits `value` at `asset_bits`: the low bits are the asset.
    #[must_use]
    pub const fn split(value: u64, asset_bits: u8) -> Self {
        Self {
            lib: value >> asset_bits,
            asset: value & ((1 << asset_bits) - 1),
        }
    }

    /// Reverses [`split`](Self::split). `index` names the value in errors.
    pub fn join(self, asset_bits: u8, index: usize) -> ItemResult<u64> {
        if self.asset >> asset_bits != 0 {
            return Err(ItemError::ValueOutOfRange {
                index,
                value: self.asset,
                bits: asset_bits,
            });
        }
        let lib = self
            .lib
            .checked_mul(1 << asset_bits)
            .ok_or(ItemError::ValueOutOfRange {
                index,
                value: self.lib,
                bits: 64 - asset_bits,
            })?;
        Ok(lib | self.asset)
    }
}

/// Decoded item fields.
///
/// `parts` holds one entry per part slot actually present in the blob,
/// with `None` for slots the blob ran out of bits for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    #[serde(with = "weapon_flag")]
    pub is_weapon: bool,
    pub key: i32,
    pub set: u64,
    #[serde(rename = "type")]
    pub item_type: AssetRef,
    pub balance: AssetRef,
    pub manufacturer: AssetRef,
    pub level: [u64; 2],
    pub parts: Vec<Option<AssetRef>>,
}

impl ItemInfo {
    /// Builds the view from unpacked values.
    ///
    /// The first six values are required.
    pub fn from_values(kind: ItemKind, key: i32, values: &[Option<u64>]) -> ItemResult<Self> {
        let required = |index: usize| {
            values
                .get(index)
                .copied()
                .flatten()
                .ok_or(ItemError::MissingValue { index })
        };
        let header_bits = kind.header_asset_bits();
        let part_bits = kind.part_asset_bits();

        Ok(Self {
            is_weapon: kind.is_weapon(),
            key,
            set: required(0)?,
            item_type: AssetRef::split(required(1)?, header_bits[0]),
            balance: AssetRef::split(required(2)?, header_bits[1]),
            manufacturer: AssetRef::split(required(3)?, header_bits[2]),
            level: [required(4)?, required(5)?],
            parts: values
                .iter()
                .skip(FIRST_PART)
                .map(|value| value.map(|v| AssetRef::split(v, part_bits)))
                .collect(),
        })
    }

    /// Unwraps and decodes an item blob.
    pub fn from_blob(blob: &[u8]) -> ItemResult<Self> {
        let item = unwrap_item(blob)?;
        Self::from_values(item.kind, item.key, &item.values)
    }

    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        ItemKind::from_weapon_flag(self.is_weapon)
    }

    /// Flattens the view back into values.
    pub fn to_values(&self) -> ItemResult<Vec<Option<u64>>> {
        let kind = self.kind();
        let header_bits = kind.header_asset_bits();
        let part_bits = kind.part_asset_bits();

        let mut values = vec![
            Some(self.set),
            Some(self.item_type.join(header_bits[0], 1)?),
            Some(self.balance.join(header_bits[1], 2)?),
            Some(self.manufacturer.join(header_bits[2], 3)?),
            Some(self.level[0]),
            Some(self.level[1]),
        ];
        for (offset, part) in self.parts.iter().enumerate() {
            let value = part
                .map(|part| part.join(part_bits, FIRST_PART + offset))
                .transpose()?;
            values.push(value);
        }
        Ok(values)
    }

    /// Packs and wraps the view under its own key.
    pub fn to_blob(&self) -> ItemResult<Vec<u8>> {
        wrap_item(self.kind(), &self.to_values()?, self.key)
    }
}

/// The weapon flag travels as `0` or `1`.
mod weapon_flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*flag))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!(
                "weapon flag must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weapon_values() -> Vec<Option<u64>> {
        vec![
            Some(5),
            Some((3 << 6) | 17),
            Some((200 << 10) | 513),
            Some((2 << 7) | 9),
            Some(50),
            Some(50),
            Some((4 << 11) | 1000),
            Some(0),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        ]
    }

    #[test]
    fn splits_header_and_parts() {
        let info = ItemInfo::from_values(ItemKind::Weapon, -7, &weapon_values()).unwrap();
        assert!(info.is_weapon);
        assert_eq!(info.set, 5);
        assert_eq!(info.item_type, AssetRef { lib: 3, asset: 17 });
        assert_eq!(info.balance, AssetRef { lib: 200, asset: 513 });
        assert_eq!(info.manufacturer, AssetRef { lib: 2, asset: 9 });
        assert_eq!(info.level, [50, 50]);
        assert_eq!(info.parts.len(), 11);
        assert_eq!(info.parts[0], Some(AssetRef { lib: 4, asset: 1000 }));
        assert_eq!(info.parts[1], Some(AssetRef { lib: 0, asset: 0 }));
        assert_eq!(info.parts[2], None);
        assert_eq!(info.to_values().unwrap(), weapon_values());
    }

    #[test]
    fn blob_roundtrip() {
        let info = ItemInfo::from_values(ItemKind::Weapon, 42, &weapon_values()).unwrap();
        let blob = info.to_blob().unwrap();
        assert_eq!(ItemInfo::from_blob(&blob).unwrap(), info);
    }

    #[test]
    fn json_shape() {
        let info = ItemInfo::from_values(ItemKind::Weapon, 0, &weapon_values()).unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["is_weapon"], json!(1));
        assert_eq!(value["type"], json!({"lib": 3, "asset": 17}));
        assert_eq!(value["parts"][2], json!(null));
        let back: ItemInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn rejects_bad_weapon_flag() {
        let info = ItemInfo::from_values(ItemKind::Item, 0, &[Some(0); 6]).unwrap();
        let mut value = serde_json::to_value(&info).unwrap();
        value["is_weapon"] = json!(2);
        assert!(serde_json::from_value::<ItemInfo>(value).is_err());
    }

    #[test]
    fn missing_header_value() {
        let err = ItemInfo::from_values(ItemKind::Item, 0, &[Some(1), Some(2), None]).unwrap_err();
        assert_eq!(err, ItemError::MissingValue { index: 2 });
    }

    #[test]
    fn oversized_asset_is_rejected() {
        let mut info = ItemInfo::from_values(ItemKind::Item, 0, &[Some(0); 6]).unwrap();
        info.manufacturer.asset = 1 << 7;
        let err = info.to_values().unwrap_err();
        assert!(matches!(err, ItemError::ValueOutOfRange { index: 3, .. }));
    }
}
