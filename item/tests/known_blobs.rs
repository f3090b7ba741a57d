use item::{
    format_trade_code, parse_trade_code, rekey_item, unpack_values, unwrap_item, wrap_item,
    ItemInfo, ItemKind,
};

fn hex(text: &str) -> Vec<u8> {
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).unwrap())
        .collect()
}

fn sample_values(kind: ItemKind) -> Vec<Option<u64>> {
    kind.widths()
        .iter()
        .enumerate()
        .map(|(i, &w)| Some((i as u64 * 1_234_567) & ((1 << w) - 1)))
        .collect()
}

const ITEM_KEY_111: &str =
    "070000006f4df114a51fddf1cf5fab043181ee3172b38c4a430caf2e992a9945fdb846b4bdd1";
const WEAPON_KEY_NEG: &str =
    "87f8a432eb9d9d0e110af454c1d6bbce10f06fd4ef4ffad90272005f97dc12942578c84c58e95b";
const WEAPON_KEY_0: &str =
    "87000000004cb10087d6a1b52ac719a91c8ced8e43eb57b15198e69b540eb6c989ed4e8f0487f6";

#[test]
fn item_blob_matches_game_bytes() {
    let blob = wrap_item(ItemKind::Item, &sample_values(ItemKind::Item), 111).unwrap();
    assert_eq!(blob, hex(ITEM_KEY_111));
    assert_eq!(
        format_trade_code(&blob),
        "BL2(BwAAAG9N8RSlH93xz1+rBDGB7jFys4xKQwyvLpkqmUX9uEa0vdE=)"
    );
}

#[test]
fn weapon_blob_with_negative_key() {
    let values = sample_values(ItemKind::Weapon);
    let blob = wrap_item(ItemKind::Weapon, &values, -123_456_789).unwrap();
    assert_eq!(blob, hex(WEAPON_KEY_NEG));

    let item = unwrap_item(&hex(WEAPON_KEY_NEG)).unwrap();
    assert_eq!(item.kind, ItemKind::Weapon);
    assert_eq!(item.key, -123_456_789);
    assert_eq!(item.values, values);
}

// Three weapon values, 41 bits, padded with ones to six bytes.
const SHORT_WEAPON_PACKED: &str = "a534d29b57ff";
const SHORT_WEAPON_KEY_4242: &str = "870000109209b089035aa643e6";

#[test]
fn short_weapon_blob_stops_at_first_misfit() {
    let values = [Some(0xA5), Some(0x1234), Some(0xA_BCDE)];
    let blob = wrap_item(ItemKind::Weapon, &values, 4242).unwrap();
    assert_eq!(blob, hex(SHORT_WEAPON_KEY_4242));
    assert_eq!(format_trade_code(&blob), "BL2(hwAAEJIJsIkDWqZD5g==)");

    // The 11-bit value 3 needs bits 41..52 of 48. The 7 padding bits
    // left would hold value 4, but decoding ends at value 3, so the
    // padding never reads back as 0x7F.
    let unpacked = unpack_values(ItemKind::Weapon, &hex(SHORT_WEAPON_PACKED));
    assert_eq!(&unpacked[..3], &values);
    assert!(unpacked[3..].iter().all(Option::is_none));

    let item = unwrap_item(&blob).unwrap();
    assert_eq!(item.key, 4242);
    assert_eq!(item.values, unpacked);
}

#[test]
fn export_rekey_to_zero() {
    let rekeyed = rekey_item(&hex(WEAPON_KEY_NEG), 0).unwrap();
    assert_eq!(rekeyed, hex(WEAPON_KEY_0));
    assert_eq!(
        parse_trade_code("BL2(hwAAAABMsQCH1qG1KscZqRyM7Y5D61exUZjmm1QOtsmJ7U6PBIf2)"),
        Some(rekeyed)
    );
}

#[test]
fn info_view_of_known_blob() {
    let info = ItemInfo::from_blob(&hex(ITEM_KEY_111)).unwrap();
    assert!(!info.is_weapon);
    assert_eq!(info.key, 111);
    assert_eq!(info.set, 0);
    // 54919 split at 8 asset bits.
    assert_eq!((info.item_type.lib, info.item_type.asset), (214, 135));
    assert_eq!(info.level, [28, 35]);
    assert_eq!(info.parts.len(), 11);
    assert_eq!(info.to_blob().unwrap(), hex(ITEM_KEY_111));
}
