//! Conversions between wire values and JSON values.
//!
//! Length-delimited values have two textual forms. Fields reached through a
//! schema node, and whole unparsed dumps, carry them as Latin-1 strings so
//! that names stay readable. The reserved raw bucket carries them as arrays
//! of byte values, which survive any text round trip untouched.

use serde_json::{Map, Value};
use wire::{FieldBag, WireType, WireValue};

use crate::error::{SchemaError, SchemaResult};

/// How length-delimited values are rendered in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesRepr {
    /// One character per byte, code points `U+0000..=U+00FF`.
    Latin1,
    /// An array of integers `0..=255`.
    Array,
}

/// Decodes bytes as Latin-1 text.
#[must_use]
pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encodes Latin-1 text back into bytes.
pub fn latin1_encode(text: &str) -> SchemaResult<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| SchemaError::invalid_value("a Latin-1 string"))
        })
        .collect()
}

/// Renders a wire value as JSON.
#[must_use]
pub fn wire_to_json(value: &WireValue, repr: BytesRepr) -> Value {
    match value {
        WireValue::Varint(v) | WireValue::Fixed64(v) => Value::from(*v),
        WireValue::Fixed32(v) => Value::from(*v),
        WireValue::Bytes(bytes) => bytes_to_json(bytes, repr),
        WireValue::Message(bag) => bag_to_json(bag, repr),
        WireValue::Packed(_, values) => Value::from(values.clone()),
    }
}

/// Renders bytes as JSON.
#[must_use]
pub fn bytes_to_json(bytes: &[u8], repr: BytesRepr) -> Value {
    match repr {
        BytesRepr::Latin1 => Value::String(latin1_decode(bytes)),
        BytesRepr::Array => Value::from(bytes.to_vec()),
    }
}

/// Reads bytes back from either JSON form.
pub fn bytes_from_json(value: &Value) -> SchemaResult<Vec<u8>> {
    match value {
        Value::String(text) => latin1_encode(text),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| SchemaError::invalid_value("a byte value"))
            })
            .collect(),
        _ => Err(SchemaError::invalid_value("a string or byte array")),
    }
}

/// Re-encodes a schema-mapped scalar whose wire type was not recorded.
///
/// Strings become length-delimited, non-negative integers become varints.
pub fn guess_wire_value(value: &Value) -> SchemaResult<WireValue> {
    match value {
        Value::String(text) => Ok(WireValue::Bytes(latin1_encode(text)?)),
        Value::Number(n) => n
            .as_u64()
            .map(WireValue::Varint)
            .ok_or_else(|| SchemaError::invalid_value("a non-negative integer")),
        _ => Err(SchemaError::invalid_value("a string or integer")),
    }
}

/// Renders one field's values as `[[wire_type, value], ...]`.
#[must_use]
pub fn field_to_json(values: &[WireValue], repr: BytesRepr) -> Value {
    Value::Array(
        values
            .iter()
            .map(|value| {
                Value::Array(vec![
                    Value::from(value.wire_type().raw()),
                    wire_to_json(value, repr),
                ])
            })
            .collect(),
    )
}

/// Parses `[[wire_type, value], ...]` back into wire values.
///
/// A JSON object under any wire type is a nested message. An array under a
/// wire type other than 2 is a packed sequence of that type.
pub fn field_from_json(value: &Value) -> SchemaResult<Vec<WireValue>> {
    let pairs = value
        .as_array()
        .ok_or_else(|| SchemaError::invalid_value("a list of [wire_type, value] pairs"))?;
    pairs.iter().map(pair_from_json).collect()
}

fn pair_from_json(pair: &Value) -> SchemaResult<WireValue> {
    let (raw_type, value) = match pair.as_array().map(Vec::as_slice) {
        Some([raw_type, value]) => (raw_type, value),
        _ => return Err(SchemaError::invalid_value("a [wire_type, value] pair")),
    };
    let raw_type = raw_type
        .as_u64()
        .and_then(|raw| u8::try_from(raw).ok())
        .ok_or_else(|| SchemaError::invalid_value("an integer wire type"))?;
    let wire_type = WireType::from_raw(raw_type)?;

    if value.is_object() {
        return Ok(WireValue::Message(bag_from_json(value)?));
    }
    match (wire_type, value) {
        (WireType::LengthDelimited, _) => Ok(WireValue::Bytes(bytes_from_json(value)?)),
        (_, Value::Array(items)) => {
            let values = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .ok_or_else(|| SchemaError::invalid_value("a non-negative integer"))
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            Ok(WireValue::Packed(wire_type, values))
        }
        (_, Value::Number(n)) => {
            let n = n
                .as_u64()
                .ok_or_else(|| SchemaError::invalid_value("a non-negative integer"))?;
            Ok(WireValue::from_u64(wire_type, n)?)
        }
        _ => Err(SchemaError::invalid_value("an integer or list of integers")),
    }
}

/// Renders a whole field bag as `{"<field>": [[wire_type, value], ...]}`.
#[must_use]
pub fn bag_to_json(bag: &FieldBag, repr: BytesRepr) -> Value {
    let mut map = Map::new();
    for (field, values) in bag.iter() {
        map.insert(field.to_string(), field_to_json(values, repr));
    }
    Value::Object(map)
}

/// Parses a field bag rendered by [`bag_to_json`] in either bytes form.
pub fn bag_from_json(value: &Value) -> SchemaResult<FieldBag> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::invalid_value("an object keyed by field number"))?;
    let mut bag = FieldBag::new();
    for (key, values) in map {
        let field = key.parse::<u32>().map_err(|_| SchemaError::InvalidValue {
            key: Some(key.clone()),
            expected: "a field number",
        })?;
        let values = field_from_json(values).map_err(|err| err.at_key(key))?;
        bag.insert(field, values);
    }
    Ok(bag)
}
