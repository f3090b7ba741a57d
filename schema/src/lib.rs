//! Declarative structure mapping for the WSG save codec.
//!
//! A [`Schema`] gives the anonymous field numbers of a [`wire::FieldBag`]
//! semantic names, and says how each field's raw value turns into a JSON
//! value:
//! - rename a scalar
//! - pass raw values through, optionally as a list
//! - unpack a packed primitive sequence
//! - run a [`FieldCodec`]
//! - recurse into a nested field bag
//!
//! [`apply_structure`] maps a bag into a [`Record`]; [`remove_structure`]
//! with the [`Schema::invert`]ed schema maps it back.
//!
//! # Design Principles
//!
//! - **Bijective schemas** - Field numbers and keys map one-to-one at each level.
//! - **Nothing dropped** - Unmapped fields survive under [`RAW_KEY`].
//! - **Strict on the way back** - Unknown keys are an error, not ignored.

mod error;
mod invert;
mod json;
mod mapper;
mod schema;

pub use error::{SchemaError, SchemaResult};
pub use invert::{InvertedField, InvertedKind, InvertedSchema};
pub use json::{
    bag_from_json, bag_to_json, bytes_from_json, bytes_to_json, field_from_json, field_to_json,
    guess_wire_value, latin1_decode, latin1_encode, wire_to_json, BytesRepr,
};
pub use mapper::{apply_structure, remove_structure, Record};
pub use schema::{DecodeFn, EncodeFn, FieldCodec, Schema, SchemaBuilder, SchemaNode};

/// Record key holding fields the schema does not map.
pub const RAW_KEY: &str = "_raw";
