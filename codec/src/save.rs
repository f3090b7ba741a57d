//! Save-level operations: whole files in and out, item transfer, JSON.

use item::{
    format_trade_code, parse_trade_codes, rekey_item, ItemKind, KeySource, TradeSection,
};
use schema::{apply_structure, remove_structure, BytesRepr};
use serde_json::Value;
use tracing::debug;
use wire::{read_field_bag, write_field_bag, FieldBag, WireValue};

use crate::compress::Compressor;
use crate::container::{unwrap_container, wrap_container};
use crate::error::{CodecError, CodecResult};
use crate::limits::ContainerLimits;
use crate::save_schema::save_schema;

/// Player record field holding bank entries.
pub const BANK_FIELD: u32 = 41;

/// Player record field holding backpack items.
pub const ITEMS_FIELD: u32 = 53;

/// Player record field holding weapons.
pub const WEAPONS_FIELD: u32 = 54;

/// Inventory entry field holding the item blob.
const ENTRY_BLOB_FIELD: u32 = 1;

const SECTIONS: [(u32, TradeSection); 3] = [
    (BANK_FIELD, TradeSection::Bank),
    (ITEMS_FIELD, TradeSection::Items),
    (WEAPONS_FIELD, TradeSection::Weapons),
];

/// Reads a save file into its player record.
pub fn decode_save<C: Compressor + ?Sized>(
    raw: &[u8],
    compressor: &C,
    limits: &ContainerLimits,
) -> CodecResult<FieldBag> {
    let plaintext = unwrap_container(raw, compressor, limits)?;
    Ok(read_field_bag(&plaintext)?)
}

/// Writes a player record as a save file.
pub fn encode_save<C: Compressor + ?Sized>(bag: &FieldBag, compressor: &C) -> CodecResult<Vec<u8>> {
    wrap_container(&write_field_bag(bag)?, compressor)
}

/// Item blob of one inventory entry.
fn entry_blob(field: u32, entry: &WireValue) -> CodecResult<Vec<u8>> {
    let parsed;
    let bag = match entry {
        WireValue::Message(bag) => bag,
        WireValue::Bytes(bytes) => {
            parsed = read_field_bag(bytes)?;
            &parsed
        }
        _ => {
            return Err(CodecError::MalformedEntry {
                field,
                reason: "entry is not a message",
            })
        }
    };
    bag.first(ENTRY_BLOB_FIELD)
        .and_then(WireValue::as_bytes)
        .map(<[u8]>::to_vec)
        .ok_or(CodecError::MalformedEntry {
            field,
            reason: "entry has no item blob",
        })
}

/// Lists every bank, backpack and weapon item as trade codes.
///
/// Each present inventory gets a `; <Section>` line followed by one code
/// per entry. Codes are re-keyed to `0` so equal items export equally.
pub fn export_items(bag: &FieldBag) -> CodecResult<String> {
    let mut out = String::new();
    for (field, section) in SECTIONS {
        let Some(entries) = bag.get(field) else {
            continue;
        };
        out.push_str("; ");
        out.push_str(section.label());
        out.push('\n');
        for entry in entries {
            let blob = rekey_item(&entry_blob(field, entry)?, 0)?;
            debug!(field, len = blob.len(), "exporting item");
            out.push_str(&format_trade_code(&blob));
            out.push('\n');
        }
    }
    Ok(out)
}

/// Inventory entry wrapping `blob` for the section it is imported into.
fn inventory_entry(section: TradeSection, blob: Vec<u8>) -> (u32, FieldBag) {
    let weapon = blob
        .first()
        .is_some_and(|&byte| ItemKind::from_header_byte(byte).is_weapon());
    let mut entry = FieldBag::new();
    entry.push(ENTRY_BLOB_FIELD, WireValue::Bytes(blob));
    match (section, weapon) {
        (TradeSection::Bank, _) => (BANK_FIELD, entry),
        (_, false) => {
            entry.push(2, WireValue::Varint(1));
            entry.push(3, WireValue::Varint(0));
            entry.push(4, WireValue::Varint(1));
            (ITEMS_FIELD, entry)
        }
        (_, true) => {
            entry.push(2, WireValue::Varint(0));
            entry.push(3, WireValue::Varint(1));
            (ITEMS_FIELD, entry)
        }
    }
}

/// Appends every trade code in `text` to the player record.
///
/// Codes under `; Bank` go to the bank; everything else goes to the
/// backpack, with the entry flags set by the blob's header. Each imported
/// blob gets a fresh key from `keys`. Returns the number imported.
pub fn import_items<K: KeySource + ?Sized>(
    bag: &mut FieldBag,
    text: &str,
    keys: &mut K,
) -> CodecResult<usize> {
    let codes = parse_trade_codes(text);
    let count = codes.len();
    for code in codes {
        let key = keys.next_key();
        let blob = rekey_item(&code.blob, key)?;
        let (field, entry) = inventory_entry(code.section, blob);
        debug!(field, key, section = code.section.label(), "importing item");
        bag.push(field, WireValue::Bytes(write_field_bag(&entry)?));
    }
    Ok(count)
}

/// Unparsed JSON dump of a player record.
///
/// Length-delimited values are Latin-1 strings, so the dump reads
/// naturally where the record holds text.
#[must_use]
pub fn bag_to_json(bag: &FieldBag) -> Value {
    schema::bag_to_json(bag, BytesRepr::Latin1)
}

/// Reads an unparsed JSON dump.
pub fn bag_from_json(value: &Value) -> CodecResult<FieldBag> {
    Ok(schema::bag_from_json(value)?)
}

/// Player record mapped through the save schema.
pub fn record_to_json(bag: &FieldBag) -> CodecResult<Value> {
    Ok(Value::Object(apply_structure(bag, &save_schema()?)?))
}

/// Reads either a parsed record or an unparsed dump.
///
/// A dump is recognized by its field-number key `"1"`.
pub fn record_from_json(value: &Value) -> CodecResult<FieldBag> {
    let Some(record) = value.as_object() else {
        return Err(schema::SchemaError::invalid_value("a JSON object").into());
    };
    if record.contains_key("1") {
        return bag_from_json(value);
    }
    Ok(remove_structure(record, &save_schema()?.invert()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::Stored;
    use item::wrap_item;
    use serde_json::json;

    struct FixedKey(i32);

    impl KeySource for FixedKey {
        fn next_key(&mut self) -> i32 {
            self.0
        }
    }

    fn sample_blob(kind: ItemKind, key: i32) -> Vec<u8> {
        let values = [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)];
        wrap_item(kind, &values, key).unwrap()
    }

    fn entry(blob: Vec<u8>) -> WireValue {
        let bag: FieldBag = [(1, WireValue::Bytes(blob))].into_iter().collect();
        WireValue::Bytes(write_field_bag(&bag).unwrap())
    }

    #[test]
    fn save_roundtrip_with_stored_container() {
        let bag: FieldBag = [
            (1, WireValue::Bytes(b"Soldier".to_vec())),
            (2, WireValue::Varint(50)),
        ]
        .into_iter()
        .collect();
        let raw = encode_save(&bag, &Stored).unwrap();
        let back = decode_save(&raw, &Stored, &ContainerLimits::for_testing()).unwrap();
        assert_eq!(back, bag);
    }

    #[test]
    fn export_rekeys_to_zero() {
        let mut bag = FieldBag::new();
        bag.push(ITEMS_FIELD, entry(sample_blob(ItemKind::Item, 4242)));
        let text = export_items(&bag).unwrap();
        let zeroed = rekey_item(&sample_blob(ItemKind::Item, 4242), 0).unwrap();
        assert_eq!(text, format!("; Items\n{}\n", format_trade_code(&zeroed)));
    }

    #[test]
    fn export_skips_absent_sections() {
        assert_eq!(export_items(&FieldBag::new()).unwrap(), "");
    }

    #[test]
    fn export_rejects_entry_without_blob() {
        let mut bag = FieldBag::new();
        bag.push(BANK_FIELD, WireValue::Varint(3));
        assert!(matches!(
            export_items(&bag),
            Err(CodecError::MalformedEntry { field: 41, .. })
        ));
    }

    fn imported_entry(bag: &FieldBag, field: u32, index: usize) -> FieldBag {
        let bytes = bag.get(field).and_then(|entries| entries[index].as_bytes()).unwrap();
        read_field_bag(bytes).unwrap()
    }

    #[test]
    fn import_routes_by_section_and_kind() {
        let item = format_trade_code(&sample_blob(ItemKind::Item, 1));
        let weapon = format_trade_code(&sample_blob(ItemKind::Weapon, 2));
        let text = format!("{item}\n; Weapons\n{weapon}\n; Bank\n{weapon}\nBL2(not base64!)\n");

        let mut bag = FieldBag::new();
        let count = import_items(&mut bag, &text, &mut FixedKey(77)).unwrap();
        assert_eq!(count, 3);
        assert_eq!(bag.get(ITEMS_FIELD).map(<[_]>::len), Some(2));
        assert!(bag.get(WEAPONS_FIELD).is_none());
        assert_eq!(bag.get(BANK_FIELD).map(<[_]>::len), Some(1));

        let stored = imported_entry(&bag, ITEMS_FIELD, 0);
        assert_eq!(stored.first(2), Some(&WireValue::Varint(1)));
        assert_eq!(stored.first(3), Some(&WireValue::Varint(0)));
        assert_eq!(stored.first(4), Some(&WireValue::Varint(1)));
        let blob = stored.first(1).and_then(WireValue::as_bytes).unwrap();
        assert_eq!(item::blob_key(blob).unwrap(), 77);

        let weapon_entry = imported_entry(&bag, ITEMS_FIELD, 1);
        assert_eq!(weapon_entry.first(2), Some(&WireValue::Varint(0)));
        assert_eq!(weapon_entry.first(3), Some(&WireValue::Varint(1)));
        assert!(weapon_entry.first(4).is_none());

        assert_eq!(imported_entry(&bag, BANK_FIELD, 0).len(), 1);
    }

    #[test]
    fn imported_weapon_lands_in_backpack_list() {
        let blob = wrap_item(ItemKind::Weapon, &[Some(1); 7], 9).unwrap();
        let mut bag = FieldBag::new();
        import_items(&mut bag, &format_trade_code(&blob), &mut FixedKey(9)).unwrap();
        assert_eq!(bag.get(ITEMS_FIELD).map(<[_]>::len), Some(1));
        assert!(bag.get(WEAPONS_FIELD).is_none());
        let entry = imported_entry(&bag, ITEMS_FIELD, 0);
        assert_eq!(entry.first(1).and_then(WireValue::as_bytes), Some(blob.as_slice()));
    }

    #[test]
    fn dump_uses_latin1_strings() {
        let bag: FieldBag = [(1, WireValue::Bytes(vec![b'h', 0xE9]))].into_iter().collect();
        let value = bag_to_json(&bag);
        assert_eq!(value, json!({"1": [[2, "h\u{e9}"]]}));
        assert_eq!(record_from_json(&value).unwrap(), bag);
    }

    #[test]
    fn record_maps_known_fields() {
        let bag: FieldBag = [(2, WireValue::Varint(47)), (99, WireValue::Varint(5))]
            .into_iter()
            .collect();
        let value = record_to_json(&bag).unwrap();
        assert_eq!(value["level"], json!(47));
        assert!(value.get(schema::RAW_KEY).is_some());
        assert_eq!(record_from_json(&value).unwrap(), bag);
    }

    #[test]
    fn record_from_json_rejects_non_objects() {
        assert!(record_from_json(&json!([1, 2])).is_err());
    }
}
