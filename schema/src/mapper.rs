//! Applying and removing a schema: field bag to semantic record and back.

use serde_json::{Map, Value};
use wire::{read_field_bag, read_packed, FieldBag, WireValue};

use crate::error::{SchemaError, SchemaResult};
use crate::invert::{InvertedKind, InvertedSchema};
use crate::json::{field_from_json, field_to_json, guess_wire_value, wire_to_json, BytesRepr};
use crate::schema::{Schema, SchemaNode};
use crate::RAW_KEY;

/// A semantic record: key to scalar, sequence or nested record.
pub type Record = Map<String, Value>;

/// Maps every field of `bag` through `schema`.
///
/// Fields the schema does not name are kept verbatim under [`RAW_KEY`],
/// keyed by field number, with length-delimited values as byte arrays.
pub fn apply_structure(bag: &FieldBag, schema: &Schema) -> SchemaResult<Record> {
    let mut record = Record::new();
    let mut raw = Map::new();

    for (field, values) in bag.iter() {
        let Some(node) = schema.get(field) else {
            raw.insert(field.to_string(), field_to_json(values, BytesRepr::Array));
            continue;
        };
        let key = node.key();
        let value = apply_node(node, values).map_err(|err| err.at_key(key))?;
        record.insert(key.to_owned(), value);
    }

    if !raw.is_empty() {
        record.insert(RAW_KEY.to_owned(), Value::Object(raw));
    }
    Ok(record)
}

fn apply_node(node: &SchemaNode, values: &[WireValue]) -> SchemaResult<Value> {
    let first = values
        .first()
        .ok_or_else(|| SchemaError::invalid_value("at least one value"))?;

    match node {
        SchemaNode::Rename { .. } => Ok(wire_to_json(first, BytesRepr::Latin1)),
        SchemaNode::Scalar { repeated, .. } => collect(*repeated, values, |value| {
            Ok(wire_to_json(value, BytesRepr::Latin1))
        }),
        SchemaNode::Packed {
            repeated: true,
            wire_type,
            ..
        } => {
            let body = first
                .as_bytes()
                .ok_or_else(|| SchemaError::invalid_value("a packed length-delimited value"))?;
            Ok(Value::from(read_packed(body, *wire_type)?))
        }
        SchemaNode::Packed {
            repeated: false, ..
        } => Ok(wire_to_json(first, BytesRepr::Latin1)),
        SchemaNode::Codec {
            repeated, codec, ..
        } => collect(*repeated, values, codec.decode),
        SchemaNode::Nested {
            repeated, schema, ..
        } => collect(*repeated, values, |value| {
            let body = value
                .as_bytes()
                .ok_or_else(|| SchemaError::invalid_value("a length-delimited message"))?;
            let child = read_field_bag(body)?;
            apply_structure(&child, schema).map(Value::Object)
        }),
    }
}

fn collect<F>(repeated: bool, values: &[WireValue], mut convert: F) -> SchemaResult<Value>
where
    F: FnMut(&WireValue) -> SchemaResult<Value>,
{
    if repeated {
        values
            .iter()
            .map(&mut convert)
            .collect::<SchemaResult<Vec<_>>>()
            .map(Value::Array)
    } else {
        convert(&values[0])
    }
}

/// Exact inverse of [`apply_structure`].
///
/// Any key that is neither mapped by `inverted` nor [`RAW_KEY`] is an
/// [`UnknownKey`](SchemaError::UnknownKey) error.
pub fn remove_structure(record: &Record, inverted: &InvertedSchema) -> SchemaResult<FieldBag> {
    let mut bag = FieldBag::new();

    if let Some(raw) = record.get(RAW_KEY) {
        let raw = raw.as_object().ok_or(SchemaError::InvalidValue {
            key: Some(RAW_KEY.to_owned()),
            expected: "an object keyed by field number",
        })?;
        for (key, values) in raw {
            let field = key.parse::<u32>().map_err(|_| SchemaError::InvalidValue {
                key: Some(key.clone()),
                expected: "a field number",
            })?;
            bag.insert(field, field_from_json(values).map_err(|err| err.at_key(key))?);
        }
    }

    for (key, value) in record {
        if key == RAW_KEY {
            continue;
        }
        let entry = inverted
            .get(key)
            .ok_or_else(|| SchemaError::UnknownKey { key: key.clone() })?;
        let values = remove_node(&entry.kind, value).map_err(|err| err.at_key(key))?;
        bag.insert(entry.field, values);
    }
    Ok(bag)
}

fn remove_node(kind: &InvertedKind, value: &Value) -> SchemaResult<Vec<WireValue>> {
    match kind {
        InvertedKind::Rename => Ok(vec![guess_wire_value(value)?]),
        InvertedKind::Scalar { repeated } => spread(*repeated, value, guess_wire_value),
        InvertedKind::Packed {
            repeated: true,
            wire_type,
        } => {
            let items = value
                .as_array()
                .ok_or_else(|| SchemaError::invalid_value("a list of integers"))?;
            let values = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .ok_or_else(|| SchemaError::invalid_value("a non-negative integer"))
                })
                .collect::<SchemaResult<Vec<_>>>()?;
            Ok(vec![WireValue::Packed(*wire_type, values)])
        }
        InvertedKind::Packed {
            repeated: false,
            wire_type,
        } => {
            let n = value
                .as_u64()
                .ok_or_else(|| SchemaError::invalid_value("a non-negative integer"))?;
            Ok(vec![WireValue::from_u64(*wire_type, n)?])
        }
        InvertedKind::Codec { repeated, codec } => spread(*repeated, value, codec.encode),
        InvertedKind::Nested { repeated, schema } => spread(*repeated, value, |item| {
            let child = item
                .as_object()
                .ok_or_else(|| SchemaError::invalid_value("an object"))?;
            remove_structure(child, schema).map(WireValue::Message)
        }),
    }
}

fn spread<F>(repeated: bool, value: &Value, convert: F) -> SchemaResult<Vec<WireValue>>
where
    F: FnMut(&Value) -> SchemaResult<WireValue>,
{
    if repeated {
        value
            .as_array()
            .ok_or_else(|| SchemaError::invalid_value("a list"))?
            .iter()
            .map(convert)
            .collect()
    } else {
        let mut convert = convert;
        Ok(vec![convert(value)?])
    }
}
