use proptest::prelude::*;
use schema::{apply_structure, remove_structure, Record, Schema, SchemaError};
use serde_json::{json, Value};
use wire::{read_field_bag, write_field_bag, FieldBag, WireType, WireValue};

fn player_schema() -> Schema {
    let skill = Schema::builder()
        .rename(1, "name")
        .rename(2, "level")
        .build()
        .unwrap();
    Schema::builder()
        .rename(1, "class")
        .rename(2, "level")
        .scalar(3, "wearing", true)
        .packed(6, "currency", true, WireType::Varint)
        .nested(8, "skills", true, skill)
        .build()
        .unwrap()
}

fn skill_bytes(name: &[u8], level: u64) -> Vec<u8> {
    let bag: FieldBag = [
        (1, WireValue::Bytes(name.to_vec())),
        (2, WireValue::Varint(level)),
    ]
    .into_iter()
    .collect();
    write_field_bag(&bag).unwrap()
}

/// Re-reads a bag so that nested messages compare as their encoded bytes.
fn normalize(bag: &FieldBag) -> FieldBag {
    read_field_bag(&write_field_bag(bag).unwrap()).unwrap()
}

#[test]
fn level_is_renamed() {
    let bag = read_field_bag(&[0x10, 0x2F]).unwrap();
    let record = apply_structure(&bag, &player_schema()).unwrap();
    assert_eq!(Value::Object(record), json!({"level": 47}));
}

#[test]
fn nested_skills_map_and_restore() {
    let bag: FieldBag = [
        (1, WireValue::Bytes(b"GD_Siren".to_vec())),
        (8, WireValue::Bytes(skill_bytes(b"Phaselock", 5))),
        (8, WireValue::Bytes(skill_bytes(b"Ward", 0))),
    ]
    .into_iter()
    .collect();
    let schema = player_schema();

    let record = apply_structure(&bag, &schema).unwrap();
    assert_eq!(
        Value::Object(record.clone()),
        json!({
            "class": "GD_Siren",
            "skills": [
                {"name": "Phaselock", "level": 5},
                {"name": "Ward", "level": 0}
            ]
        })
    );

    let restored = remove_structure(&record, &schema.invert().unwrap()).unwrap();
    assert_eq!(normalize(&restored), bag);
}

#[test]
fn unknown_key_fails_restore() {
    let schema = player_schema();
    let record: Record = json!({"level": 50, "lvl": 1})
        .as_object()
        .unwrap()
        .clone();
    let err = remove_structure(&record, &schema.invert().unwrap()).unwrap_err();
    assert_eq!(
        err,
        SchemaError::UnknownKey {
            key: "lvl".to_owned()
        }
    );
}

#[test]
fn nested_unknown_key_is_located() {
    let schema = player_schema();
    let record: Record = json!({"skills": [{"name": "Ward", "rank": 1}]})
        .as_object()
        .unwrap()
        .clone();
    let err = remove_structure(&record, &schema.invert().unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownKey { ref key } if key == "rank"));
}

fn arb_bag() -> impl Strategy<Value = FieldBag> {
    (
        prop::option::of(prop::collection::vec(any::<u8>(), 0..16)),
        prop::option::of(any::<u64>()),
        prop::collection::vec(any::<u64>(), 0..4),
        prop::collection::vec(0u64..1_000_000, 0..6),
        prop::collection::vec((prop::collection::vec(any::<u8>(), 0..8), any::<u64>()), 0..3),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..8), 0..3),
    )
        .prop_map(|(class, level, wearing, currency, skills, unknown)| {
            let mut bag = FieldBag::new();
            if let Some(class) = class {
                bag.push(1, WireValue::Bytes(class));
            }
            if let Some(level) = level {
                bag.push(2, WireValue::Varint(level));
            }
            for item in wearing {
                bag.push(3, WireValue::Varint(item));
            }
            if !currency.is_empty() {
                let body = wire::write_packed(WireType::Varint, &currency).unwrap();
                bag.push(6, WireValue::Bytes(body));
            }
            for (name, level) in skills {
                bag.push(8, WireValue::Bytes(skill_bytes(&name, level)));
            }
            for bytes in unknown {
                bag.push(40, WireValue::Bytes(bytes));
            }
            bag
        })
}

proptest! {
    #[test]
    fn apply_then_remove_restores_bag(bag in arb_bag()) {
        let schema = player_schema();
        let inverted = schema.invert().unwrap();

        let record = apply_structure(&bag, &schema).unwrap();
        let text = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&text).unwrap();

        let restored = remove_structure(&parsed, &inverted).unwrap();
        prop_assert_eq!(normalize(&restored), bag);
    }
}
