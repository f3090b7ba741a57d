//! Protobuf-style wire codec for the WSG save codec.
//!
//! The decompressed player record of a save is a protobuf message without a
//! published schema. This crate reads it into a [`FieldBag`] (field number to
//! ordered values) and writes it back, handling varints, the four wire types
//! the format uses, and packed primitive sequences.
//!
//! # Design Principles
//!
//! - **Schema-free** - Nothing here knows what a field means; naming lives in `schema`.
//! - **Bounded decoding** - Every read is checked against the buffer length.
//! - **Deterministic output** - Fields are written in ascending field-number order.

mod error;
mod field;
mod varint;

pub use error::{WireError, WireResult};
pub use field::{
    read_field_bag, read_packed, read_value, write_field_bag, write_packed, write_value, FieldBag,
    WireType, WireValue,
};
pub use varint::{decode_varint, encode_varint, varint_len, ByteReader, VARINT_MAX_BYTES};
