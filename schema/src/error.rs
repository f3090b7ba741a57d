//! Schema configuration and mapping errors.

use std::fmt;

use wire::WireError;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building a schema or mapping through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two nodes in one schema level share a field number.
    DuplicateField { field: u32 },

    /// Two nodes in one schema level map to the same semantic key.
    DuplicateKey { key: String },

    /// A node uses the key reserved for unmapped raw fields.
    ReservedKey { key: String },

    /// A record carries a key the schema has no mapping for.
    UnknownKey { key: String },

    /// A value does not have the shape its node or codec expects.
    InvalidValue {
        key: Option<String>,
        expected: &'static str,
    },

    /// A field codec failed for a reason of its own.
    Codec {
        codec: &'static str,
        message: String,
    },

    /// Wire-level error while reading or writing a nested field bag.
    Wire(WireError),
}

impl SchemaError {
    /// Creates an [`InvalidValue`](Self::InvalidValue) error not yet tied to a key.
    #[must_use]
    pub const fn invalid_value(expected: &'static str) -> Self {
        Self::InvalidValue {
            key: None,
            expected,
        }
    }

    /// Attaches `key` to an [`InvalidValue`](Self::InvalidValue) error that lacks one.
    #[must_use]
    pub fn at_key(self, key: &str) -> Self {
        match self {
            Self::InvalidValue {
                key: None,
                expected,
            } => Self::InvalidValue {
                key: Some(key.to_owned()),
                expected,
            },
            other => other,
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateField { field } => write!(f, "duplicate field number {field}"),
            Self::DuplicateKey { key } => write!(f, "duplicate semantic key {key:?}"),
            Self::ReservedKey { key } => write!(f, "semantic key {key:?} is reserved"),
            Self::UnknownKey { key } => write!(f, "unknown key {key:?} in data"),
            Self::InvalidValue {
                key: Some(key),
                expected,
            } => write!(f, "invalid value for {key:?}: expected {expected}"),
            Self::InvalidValue {
                key: None,
                expected,
            } => write!(f, "invalid value: expected {expected}"),
            Self::Codec { codec, message } => write!(f, "{codec} codec: {message}"),
            Self::Wire(err) => write!(f, "wire error: {err}"),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for SchemaError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}
