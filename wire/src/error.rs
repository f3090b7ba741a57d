//! Error types for wire format operations.

use std::fmt;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while reading or writing protobuf-style fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// A field key carried a wire type other than 0, 1, 2 or 5.
    UnsupportedWireType { wire_type: u8 },

    /// A read ran past the end of the buffer.
    Truncated { needed: usize, available: usize },

    /// A varint carried more than 64 bits of payload.
    VarintOverflow,

    /// A field key decoded to a field number that does not fit in `u32`.
    InvalidFieldNumber { value: u64 },

    /// Packed sequences can only hold varint and fixed-width primitives.
    InvalidPackedWireType { wire_type: u8 },

    /// A value does not fit the fixed width of its wire type.
    ValueOutOfRange { value: u64, wire_type: u8 },

    /// A length-delimited value is longer than a `u64` length prefix can describe.
    LengthOverflow { length: usize },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedWireType { wire_type } => {
                write!(f, "unsupported wire type {wire_type}")
            }
            Self::Truncated { needed, available } => {
                write!(f, "truncated input: need {needed} bytes, have {available}")
            }
            Self::VarintOverflow => write!(f, "varint overflows 64 bits"),
            Self::InvalidFieldNumber { value } => {
                write!(f, "invalid field number {value}")
            }
            Self::InvalidPackedWireType { wire_type } => {
                write!(f, "wire type {wire_type} cannot be packed")
            }
            Self::ValueOutOfRange { value, wire_type } => {
                write!(f, "value {value} does not fit wire type {wire_type}")
            }
            Self::LengthOverflow { length } => write!(f, "length overflow: {length}"),
        }
    }
}

impl std::error::Error for WireError {}
