//! Schema definitions and validation.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde_json::Value;
use wire::{WireType, WireValue};

use crate::error::{SchemaError, SchemaResult};
use crate::RAW_KEY;

/// Decodes a raw wire value into its semantic form.
pub type DecodeFn = fn(&WireValue) -> SchemaResult<Value>;

/// Encodes a semantic value back into a wire value.
pub type EncodeFn = fn(&Value) -> SchemaResult<WireValue>;

/// A named, bidirectional transform between a wire value and a semantic value.
///
/// `decode` and `encode` must be inverses on every value the save format
/// actually carries for the field.
#[derive(Clone, Copy)]
pub struct FieldCodec {
    pub name: &'static str,
    pub decode: DecodeFn,
    pub encode: EncodeFn,
}

impl FieldCodec {
    #[must_use]
    pub const fn new(name: &'static str, decode: DecodeFn, encode: EncodeFn) -> Self {
        Self {
            name,
            decode,
            encode,
        }
    }
}

impl fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FieldCodec").field(&self.name).finish()
    }
}

/// How one field number of a field bag maps onto a semantic key.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Single scalar, first occurrence only, value taken as-is.
    Rename { key: String },

    /// Raw decoded values, collected into a sequence if `repeated`.
    Scalar { key: String, repeated: bool },

    /// Length-delimited body holding primitives of `wire_type` back to back.
    ///
    /// When not `repeated` the field is a single primitive of `wire_type`.
    Packed {
        key: String,
        repeated: bool,
        wire_type: WireType,
    },

    /// Values passed through a [`FieldCodec`].
    Codec {
        key: String,
        repeated: bool,
        codec: FieldCodec,
    },

    /// Length-delimited body that is itself a field bag mapped by `schema`.
    Nested {
        key: String,
        repeated: bool,
        schema: Schema,
    },
}

impl SchemaNode {
    /// The semantic key this node produces.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Rename { key }
            | Self::Scalar { key, .. }
            | Self::Packed { key, .. }
            | Self::Codec { key, .. }
            | Self::Nested { key, .. } => key,
        }
    }

    /// Returns `true` if the semantic value is a sequence.
    #[must_use]
    pub const fn is_repeated(&self) -> bool {
        match self {
            Self::Rename { .. } => false,
            Self::Scalar { repeated, .. }
            | Self::Packed { repeated, .. }
            | Self::Codec { repeated, .. }
            | Self::Nested { repeated, .. } => *repeated,
        }
    }
}

/// One level of a structure mapping: field number to node.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: BTreeMap<u32, SchemaNode>,
}

impl Schema {
    /// Creates a schema from `(field number, node)` pairs after validation.
    pub fn new(fields: Vec<(u32, SchemaNode)>) -> SchemaResult<Self> {
        let mut map = BTreeMap::new();
        for (field, node) in fields {
            if map.insert(field, node).is_some() {
                return Err(SchemaError::DuplicateField { field });
            }
        }
        let schema = Self { fields: map };
        schema.validate()?;
        Ok(schema)
    }

    /// Creates a schema level without validating it.
    #[cfg(test)]
    pub(crate) fn new_unchecked(fields: Vec<(u32, SchemaNode)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Creates a schema builder.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    #[must_use]
    pub fn get(&self, field: u32) -> Option<&SchemaNode> {
        self.fields.get(&field)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &SchemaNode)> {
        self.fields.iter().map(|(field, node)| (*field, node))
    }

    /// Validates that this level maps field numbers to keys one-to-one.
    ///
    /// Nested schemas are validated when they are built.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut keys = HashSet::new();
        for node in self.fields.values() {
            let key = node.key();
            if key == RAW_KEY {
                return Err(SchemaError::ReservedKey {
                    key: key.to_owned(),
                });
            }
            if !keys.insert(key) {
                return Err(SchemaError::DuplicateKey {
                    key: key.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Builder for `Schema`.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<(u32, SchemaNode)>,
}

impl SchemaBuilder {
    /// Maps `field` to `key`, first value only.
    #[must_use]
    pub fn rename(self, field: u32, key: &str) -> Self {
        self.node(
            field,
            SchemaNode::Rename {
                key: key.to_owned(),
            },
        )
    }

    /// Maps `field` to `key`, passing raw values through.
    #[must_use]
    pub fn scalar(self, field: u32, key: &str, repeated: bool) -> Self {
        self.node(
            field,
            SchemaNode::Scalar {
                key: key.to_owned(),
                repeated,
            },
        )
    }

    /// Maps `field` to `key` as packed primitives of `wire_type`.
    #[must_use]
    pub fn packed(self, field: u32, key: &str, repeated: bool, wire_type: WireType) -> Self {
        self.node(
            field,
            SchemaNode::Packed {
                key: key.to_owned(),
                repeated,
                wire_type,
            },
        )
    }

    /// Maps `field` to `key` through `codec`.
    #[must_use]
    pub fn codec(self, field: u32, key: &str, repeated: bool, codec: FieldCodec) -> Self {
        self.node(
            field,
            SchemaNode::Codec {
                key: key.to_owned(),
                repeated,
                codec,
            },
        )
    }

    /// Maps `field` to `key` as a nested field bag described by `schema`.
    #[must_use]
    pub fn nested(self, field: u32, key: &str, repeated: bool, schema: Schema) -> Self {
        self.node(
            field,
            SchemaNode::Nested {
                key: key.to_owned(),
                repeated,
                schema,
            },
        )
    }

    /// Adds an arbitrary node.
    #[must_use]
    pub fn node(mut self, field: u32, node: SchemaNode) -> Self {
        self.fields.push((field, node));
        self
    }

    /// Builds the schema after validation.
    pub fn build(self) -> SchemaResult<Schema> {
        Schema::new(self.fields)
    }
}
