//! Inverted schemas: semantic key to field number, for re-encoding.

use std::collections::BTreeMap;

use wire::WireType;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{FieldCodec, Schema, SchemaNode};

/// A schema level keyed by semantic key.
#[derive(Debug, Clone, Default)]
pub struct InvertedSchema {
    entries: BTreeMap<String, InvertedField>,
}

/// Where a semantic key goes back to on the wire.
#[derive(Debug, Clone)]
pub struct InvertedField {
    pub field: u32,
    pub kind: InvertedKind,
}

/// Direction-swapped [`SchemaNode`].
#[derive(Debug, Clone)]
pub enum InvertedKind {
    Rename,
    Scalar {
        repeated: bool,
    },
    Packed {
        repeated: bool,
        wire_type: WireType,
    },
    Codec {
        repeated: bool,
        codec: FieldCodec,
    },
    Nested {
        repeated: bool,
        schema: InvertedSchema,
    },
}

impl InvertedSchema {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InvertedField> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Schema {
    /// Swaps the mapping direction, recursing into nested schemas.
    ///
    /// Fails if two nodes of one level share a semantic key.
    pub fn invert(&self) -> SchemaResult<InvertedSchema> {
        let mut entries = BTreeMap::new();
        for (field, node) in self.iter() {
            let kind = match node {
                SchemaNode::Rename { .. } => InvertedKind::Rename,
                SchemaNode::Scalar { repeated, .. } => InvertedKind::Scalar {
                    repeated: *repeated,
                },
                SchemaNode::Packed {
                    repeated,
                    wire_type,
                    ..
                } => InvertedKind::Packed {
                    repeated: *repeated,
                    wire_type: *wire_type,
                },
                SchemaNode::Codec {
                    repeated, codec, ..
                } => InvertedKind::Codec {
                    repeated: *repeated,
                    codec: *codec,
                },
                SchemaNode::Nested {
                    repeated, schema, ..
                } => InvertedKind::Nested {
                    repeated: *repeated,
                    schema: schema.invert()?,
                },
            };
            let key = node.key().to_owned();
            if entries.contains_key(&key) {
                return Err(SchemaError::DuplicateKey { key });
            }
            entries.insert(key, InvertedField { field, kind });
        }
        Ok(InvertedSchema { entries })
    }
}
