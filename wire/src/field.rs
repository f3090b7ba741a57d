//! Wire types, field values and the field bag reader/writer.

use std::collections::BTreeMap;

use crate::error::{WireError, WireResult};
use crate::varint::{encode_varint, ByteReader};

/// Protobuf-style wire types understood by the save format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Parses a wire type from the low three bits of a field key.
    pub const fn from_raw(raw: u8) -> WireResult<Self> {
        match raw {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            _ => Err(WireError::UnsupportedWireType { wire_type: raw }),
        }
    }

    #[must_use]
    pub const fn raw(self) -> u8 {
        self as u8
    }
}

/// A single decoded field value.
///
/// The reader only ever produces the four primitive variants. `Message` and
/// `Packed` exist for the writer: a nested bag is serialized and emitted as
/// length-delimited, and a packed sequence is emitted as the concatenation of
/// its primitive encodings under wire type 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Varint(u64),
    Fixed64(u64),
    Bytes(Vec<u8>),
    Fixed32(u32),
    Message(FieldBag),
    Packed(WireType, Vec<u64>),
}

impl WireValue {
    /// The wire type this value is emitted with.
    #[must_use]
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::Fixed32(_) => WireType::Fixed32,
            Self::Bytes(_) | Self::Message(_) | Self::Packed(..) => WireType::LengthDelimited,
        }
    }

    /// Returns the integer payload of a varint or fixed-width value.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Varint(v) | Self::Fixed64(v) => Some(*v),
            Self::Fixed32(v) => Some(*v as u64),
            _ => None,
        }
    }

    /// Returns the raw bytes of a length-delimited value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Builds a primitive value of the given wire type from an integer.
    pub fn from_u64(wire_type: WireType, value: u64) -> WireResult<Self> {
        match wire_type {
            WireType::Varint => Ok(Self::Varint(value)),
            WireType::Fixed64 => Ok(Self::Fixed64(value)),
            WireType::Fixed32 => u32::try_from(value)
                .map(Self::Fixed32)
                .map_err(|_| WireError::ValueOutOfRange {
                    value,
                    wire_type: wire_type.raw(),
                }),
            WireType::LengthDelimited => Err(WireError::InvalidPackedWireType {
                wire_type: wire_type.raw(),
            }),
        }
    }
}

/// Decoded field table: field number to the ordered values seen for it.
///
/// Order within a field number is preserved. Field numbers themselves are
/// kept sorted, which is also the order the writer emits them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBag {
    fields: BTreeMap<u32, Vec<WireValue>>,
}

impl FieldBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: u32) -> bool {
        self.fields.contains_key(&field)
    }

    #[must_use]
    pub fn get(&self, field: u32) -> Option<&[WireValue]> {
        self.fields.get(&field).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, field: u32) -> Option<&mut Vec<WireValue>> {
        self.fields.get_mut(&field)
    }

    /// Returns the first value recorded for `field`.
    #[must_use]
    pub fn first(&self, field: u32) -> Option<&WireValue> {
        self.fields.get(&field).and_then(|values| values.first())
    }

    /// Appends a value to the end of `field`'s list.
    pub fn push(&mut self, field: u32, value: WireValue) {
        self.fields.entry(field).or_default().push(value);
    }

    /// Replaces every value of `field`.
    pub fn insert(&mut self, field: u32, values: Vec<WireValue>) -> Option<Vec<WireValue>> {
        self.fields.insert(field, values)
    }

    pub fn remove(&mut self, field: u32) -> Option<Vec<WireValue>> {
        self.fields.remove(&field)
    }

    /// Iterates fields in ascending field-number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[WireValue])> {
        self.fields
            .iter()
            .map(|(field, values)| (*field, values.as_slice()))
    }
}

impl FromIterator<(u32, WireValue)> for FieldBag {
    fn from_iter<I: IntoIterator<Item = (u32, WireValue)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (field, value) in iter {
            bag.push(field, value);
        }
        bag
    }
}

/// Reads a field bag from a flat buffer until the input is exhausted.
pub fn read_field_bag(bytes: &[u8]) -> WireResult<FieldBag> {
    let mut reader = ByteReader::new(bytes);
    let mut bag = FieldBag::new();
    while !reader.is_empty() {
        let key = reader.read_varint()?;
        let field = u32::try_from(key >> 3)
            .map_err(|_| WireError::InvalidFieldNumber { value: key >> 3 })?;
        let wire_type = WireType::from_raw((key & 7) as u8)?;
        let value = read_value(&mut reader, wire_type)?;
        bag.push(field, value);
    }
    Ok(bag)
}

/// Reads a single primitive value of `wire_type`.
pub fn read_value(reader: &mut ByteReader<'_>, wire_type: WireType) -> WireResult<WireValue> {
    let value = match wire_type {
        WireType::Varint => WireValue::Varint(reader.read_varint()?),
        WireType::Fixed64 => WireValue::Fixed64(reader.read_fixed64()?),
        WireType::LengthDelimited => {
            let len = reader.read_varint()?;
            let len = usize::try_from(len).map_err(|_| WireError::Truncated {
                needed: usize::MAX,
                available: reader.remaining(),
            })?;
            WireValue::Bytes(reader.read_bytes(len)?.to_vec())
        }
        WireType::Fixed32 => WireValue::Fixed32(reader.read_fixed32()?),
    };
    Ok(value)
}

/// Serializes a field bag, field numbers ascending.
pub fn write_field_bag(bag: &FieldBag) -> WireResult<Vec<u8>> {
    let mut out = Vec::new();
    write_field_bag_into(bag, &mut out)?;
    Ok(out)
}

fn write_field_bag_into(bag: &FieldBag, out: &mut Vec<u8>) -> WireResult<()> {
    for (field, values) in bag.iter() {
        for value in values {
            let key = (u64::from(field) << 3) | u64::from(value.wire_type().raw());
            encode_varint(key, out);
            write_value(value, out)?;
        }
    }
    Ok(())
}

/// Appends the encoding of one value (without its key).
pub fn write_value(value: &WireValue, out: &mut Vec<u8>) -> WireResult<()> {
    match value {
        WireValue::Varint(v) => encode_varint(*v, out),
        WireValue::Fixed64(v) => out.extend_from_slice(&v.to_le_bytes()),
        WireValue::Fixed32(v) => out.extend_from_slice(&v.to_le_bytes()),
        WireValue::Bytes(bytes) => write_length_delimited(bytes, out),
        WireValue::Message(bag) => {
            let body = write_field_bag(bag)?;
            write_length_delimited(&body, out);
        }
        WireValue::Packed(wire_type, values) => {
            let body = write_packed(*wire_type, values)?;
            write_length_delimited(&body, out);
        }
    }
    Ok(())
}

fn write_length_delimited(bytes: &[u8], out: &mut Vec<u8>) {
    encode_varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

/// Reads a length-delimited body as a sequence of primitives of `wire_type`.
pub fn read_packed(bytes: &[u8], wire_type: WireType) -> WireResult<Vec<u64>> {
    if wire_type == WireType::LengthDelimited {
        return Err(WireError::InvalidPackedWireType {
            wire_type: wire_type.raw(),
        });
    }
    let mut reader = ByteReader::new(bytes);
    let mut values = Vec::new();
    while !reader.is_empty() {
        let value = read_value(&mut reader, wire_type)?;
        // Only primitive variants come back for non-delimited wire types.
        if let Some(v) = value.as_u64() {
            values.push(v);
        }
    }
    Ok(values)
}

/// Concatenates the primitive encodings of `values` without keys.
pub fn write_packed(wire_type: WireType, values: &[u64]) -> WireResult<Vec<u8>> {
    let mut out = Vec::new();
    for value in values {
        write_value(&WireValue::from_u64(wire_type, *value)?, &mut out)?;
    }
    Ok(out)
}
