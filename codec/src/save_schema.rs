//! Structure of the player record.

use item::ItemInfo;
use schema::{
    bytes_from_json, bytes_to_json, BytesRepr, FieldCodec, Schema, SchemaError, SchemaResult,
};
use serde_json::{Map, Value};
use wire::{read_packed, write_packed, WireType, WireValue};

/// Names of the black market upgrade counters, in stored order.
pub const BLACK_MARKET_KEYS: [&str; 9] = [
    "rifle", "pistol", "launcher", "shotgun", "smg", "sniper", "grenade", "backpack", "bank",
];

/// Length-delimited value as an array of byte values.
pub const BYTES: FieldCodec = FieldCodec::new("bytes", decode_bytes, encode_bytes);

/// Fixed32 value as a 32-bit float.
///
/// NaN and infinities have no JSON number form and fail to decode.
pub const FLOAT: FieldCodec = FieldCodec::new("float", decode_float, encode_float);

/// Packed varints as an object keyed by [`BLACK_MARKET_KEYS`].
pub const BLACK_MARKET: FieldCodec =
    FieldCodec::new("black_market", decode_black_market, encode_black_market);

/// Item blob as an [`ItemInfo`] object.
pub const ITEM_INFO: FieldCodec = FieldCodec::new("item_info", decode_item_info, encode_item_info);

fn codec_error(codec: &'static str, message: impl Into<String>) -> SchemaError {
    SchemaError::Codec {
        codec,
        message: message.into(),
    }
}

fn length_delimited(value: &WireValue) -> SchemaResult<&[u8]> {
    value
        .as_bytes()
        .ok_or_else(|| SchemaError::invalid_value("a length-delimited value"))
}

fn decode_bytes(value: &WireValue) -> SchemaResult<Value> {
    Ok(bytes_to_json(length_delimited(value)?, BytesRepr::Array))
}

fn encode_bytes(value: &Value) -> SchemaResult<WireValue> {
    bytes_from_json(value).map(WireValue::Bytes)
}

fn decode_float(value: &WireValue) -> SchemaResult<Value> {
    let WireValue::Fixed32(bits) = value else {
        return Err(SchemaError::invalid_value("a fixed32 value"));
    };
    let float = f32::from_bits(*bits);
    if !float.is_finite() {
        return Err(codec_error("float", format!("non-finite value {float}")));
    }
    Ok(Value::from(f64::from(float)))
}

fn encode_float(value: &Value) -> SchemaResult<WireValue> {
    let float = value
        .as_f64()
        .ok_or_else(|| SchemaError::invalid_value("a number"))?;
    Ok(WireValue::Fixed32((float as f32).to_bits()))
}

fn decode_black_market(value: &WireValue) -> SchemaResult<Value> {
    let counts = read_packed(length_delimited(value)?, WireType::Varint)?;
    if counts.len() > BLACK_MARKET_KEYS.len() {
        return Err(codec_error(
            "black_market",
            format!("{} counters, at most {} known", counts.len(), BLACK_MARKET_KEYS.len()),
        ));
    }
    let map: Map<String, Value> = BLACK_MARKET_KEYS
        .iter()
        .zip(counts)
        .map(|(key, count)| ((*key).to_owned(), Value::from(count)))
        .collect();
    Ok(Value::Object(map))
}

fn encode_black_market(value: &Value) -> SchemaResult<WireValue> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::invalid_value("an object of counters"))?;
    let mut counts = Vec::with_capacity(map.len());
    for key in BLACK_MARKET_KEYS {
        let Some(count) = map.get(key) else { break };
        counts.push(
            count
                .as_u64()
                .ok_or_else(|| SchemaError::invalid_value("a non-negative integer"))?,
        );
    }
    if counts.len() != map.len() {
        return Err(codec_error(
            "black_market",
            "counters must be a leading run of the known keys",
        ));
    }
    Ok(WireValue::Bytes(write_packed(WireType::Varint, &counts)?))
}

fn decode_item_info(value: &WireValue) -> SchemaResult<Value> {
    let info = ItemInfo::from_blob(length_delimited(value)?)
        .map_err(|err| codec_error("item_info", err.to_string()))?;
    serde_json::to_value(info).map_err(|err| codec_error("item_info", err.to_string()))
}

fn encode_item_info(value: &Value) -> SchemaResult<WireValue> {
    let info: ItemInfo = serde_json::from_value(value.clone())
        .map_err(|err| codec_error("item_info", err.to_string()))?;
    info.to_blob()
        .map(WireValue::Bytes)
        .map_err(|err| codec_error("item_info", err.to_string()))
}

fn color() -> SchemaResult<Schema> {
    Schema::builder()
        .rename(1, "a")
        .rename(2, "r")
        .rename(3, "g")
        .rename(4, "b")
        .build()
}

fn inventory_entry(extra: [(u32, &str); 3]) -> SchemaResult<Schema> {
    extra
        .into_iter()
        .fold(
            Schema::builder().codec(1, "data", false, ITEM_INFO),
            |builder, (field, key)| builder.rename(field, key),
        )
        .build()
}

/// The player record.
///
/// Covers the fields whose meaning is known; everything else survives
/// under the raw bucket.
pub fn save_schema() -> SchemaResult<Schema> {
    let skills = Schema::builder()
        .rename(1, "name")
        .rename(2, "level")
        .rename(3, "unknown3")
        .rename(4, "unknown4")
        .build()?;
    let resources = Schema::builder()
        .rename(1, "resource")
        .rename(2, "pool")
        .codec(3, "amount", false, FLOAT)
        .rename(4, "level")
        .build()?;
    let sizes = Schema::builder()
        .rename(1, "inventory")
        .rename(2, "weapon_slots")
        .rename(3, "weapon_slots_shown")
        .build()?;
    let mission_data = Schema::builder()
        .rename(1, "name")
        .rename(2, "status")
        .rename(3, "is_from_dlc")
        .rename(4, "dlc_id")
        .codec(5, "unknown5", false, BYTES)
        .rename(6, "unknown6")
        .codec(7, "unknown7", false, BYTES)
        .rename(8, "unknown8")
        .rename(9, "unknown9")
        .rename(10, "unknown10")
        .rename(11, "level")
        .build()?;
    let missions = Schema::builder()
        .rename(1, "playthrough")
        .rename(2, "active")
        .nested(3, "data", true, mission_data)
        .build()?;
    let appearance = Schema::builder()
        .rename(1, "name")
        .nested(2, "color1", false, color()?)
        .nested(3, "color2", false, color()?)
        .nested(4, "color3", false, color()?)
        .build()?;
    let game_stages = Schema::builder()
        .rename(1, "name")
        .rename(2, "level")
        .rename(3, "is_from_dlc")
        .rename(4, "dlc_id")
        .rename(5, "playthrough")
        .build()?;
    let areas = Schema::builder()
        .rename(1, "name")
        .rename(2, "unknown2")
        .build()?;
    let id = Schema::builder()
        .packed(1, "a", false, WireType::Fixed32)
        .packed(2, "b", false, WireType::Fixed32)
        .packed(3, "c", false, WireType::Fixed32)
        .packed(4, "d", false, WireType::Fixed32)
        .build()?;
    let challenges = Schema::builder()
        .rename(1, "name")
        .rename(2, "is_from_dlc")
        .rename(3, "dlc_id")
        .build()?;
    let bank = Schema::builder()
        .codec(1, "data", false, ITEM_INFO)
        .build()?;
    let lockouts = Schema::builder()
        .rename(1, "name")
        .rename(2, "time")
        .rename(3, "is_from_dlc")
        .rename(4, "dlc_id")
        .build()?;
    let items = inventory_entry([(2, "unknown2"), (3, "is_equipped"), (4, "star")])?;
    let weapons = inventory_entry([(2, "slot"), (3, "star"), (4, "unknown4")])?;

    Schema::builder()
        .rename(1, "class")
        .rename(2, "level")
        .rename(3, "experience")
        .rename(4, "skill_points")
        .packed(6, "currency", true, WireType::Varint)
        .rename(7, "playthroughs_completed")
        .nested(8, "skills", true, skills)
        .nested(11, "resources", true, resources)
        .nested(13, "sizes", false, sizes)
        .codec(15, "stats", false, BYTES)
        .scalar(16, "active_fast_travel", true)
        .rename(17, "last_fast_travel")
        .nested(18, "missions", true, missions)
        .nested(19, "appearance", false, appearance)
        .rename(20, "save_game_id")
        .rename(21, "mission_number")
        .codec(23, "unlocks", false, BYTES)
        .codec(24, "unlock_notifications", false, BYTES)
        .rename(25, "time_played")
        .rename(26, "save_timestamp")
        .nested(29, "game_stages", true, game_stages)
        .nested(30, "areas", true, areas)
        .nested(34, "id", false, id)
        .scalar(35, "wearing", true)
        .codec(36, "black_market", false, BLACK_MARKET)
        .rename(37, "active_mission")
        .nested(38, "challenges", true, challenges)
        .nested(41, "bank", true, bank)
        .nested(43, "lockouts", true, lockouts)
        .scalar(46, "explored_areas", true)
        .rename(49, "active_playthrough")
        .nested(53, "items", true, items)
        .nested(54, "weapons", true, weapons)
        .rename(55, "stats_bonuses_disabled")
        .rename(56, "bank_size")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_builds_and_inverts() {
        let schema = save_schema().unwrap();
        assert_eq!(schema.get(2).unwrap().key(), "level");
        assert!(schema.get(53).unwrap().is_repeated());
        let inverted = schema.invert().unwrap();
        assert_eq!(inverted.get("bank_size").unwrap().field, 56);
    }

    #[test]
    fn bytes_codec_uses_arrays() {
        let value = decode_bytes(&WireValue::Bytes(vec![1, 200])).unwrap();
        assert_eq!(value, json!([1, 200]));
        assert_eq!(encode_bytes(&value).unwrap(), WireValue::Bytes(vec![1, 200]));
    }

    #[test]
    fn float_codec_roundtrip() {
        let wire = WireValue::Fixed32(1.5f32.to_bits());
        let value = decode_float(&wire).unwrap();
        assert_eq!(value, json!(1.5));
        assert_eq!(encode_float(&value).unwrap(), wire);

        let odd = WireValue::Fixed32(0.1f32.to_bits());
        assert_eq!(encode_float(&decode_float(&odd).unwrap()).unwrap(), odd);
        assert!(decode_float(&WireValue::Fixed32(f32::NAN.to_bits())).is_err());
        assert!(decode_float(&WireValue::Varint(1)).is_err());
    }

    #[test]
    fn black_market_names_counters() {
        let wire = WireValue::Bytes(vec![1, 2, 3]);
        let value = decode_black_market(&wire).unwrap();
        assert_eq!(value, json!({"rifle": 1, "pistol": 2, "launcher": 3}));
        assert_eq!(encode_black_market(&value).unwrap(), wire);
    }

    #[test]
    fn black_market_rejects_gaps() {
        let err = encode_black_market(&json!({"rifle": 1, "smg": 2})).unwrap_err();
        assert!(matches!(err, SchemaError::Codec { codec: "black_market", .. }));
        let err = encode_black_market(&json!({"rifle": 1, "lasers": 2})).unwrap_err();
        assert!(matches!(err, SchemaError::Codec { .. }));
    }

    #[test]
    fn item_info_codec_roundtrip() {
        let values = [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)];
        let blob = item::wrap_item(item::ItemKind::Item, &values, 99).unwrap();
        let wire = WireValue::Bytes(blob);
        let value = decode_item_info(&wire).unwrap();
        assert_eq!(value["key"], json!(99));
        assert_eq!(value["parts"][0], json!({"lib": 0, "asset": 7}));
        assert_eq!(encode_item_info(&value).unwrap(), wire);
    }
}
