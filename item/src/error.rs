//! Error types for item operations.

use std::fmt;

/// Result type for item operations.
pub type ItemResult<T> = Result<T, ItemError>;

/// Errors that can occur while packing or obfuscating item blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// Blob shorter than its fixed header and checksum.
    Truncated { needed: usize, available: usize },

    /// Value does not fit its fixed-width slot.
    ValueOutOfRange { index: usize, value: u64, bits: u8 },

    /// More values than the width table has slots.
    TooManyValues { count: usize, max: usize },

    /// A value the item view requires was absent.
    MissingValue { index: usize },

    /// Present value following an absent one.
    ValueAfterAbsent { index: usize },
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "item blob needs {needed} bytes, only {available} available")
            }
            Self::ValueOutOfRange { index, value, bits } => {
                write!(f, "item value {index} ({value}) does not fit in {bits} bits")
            }
            Self::TooManyValues { count, max } => {
                write!(f, "{count} item values given, at most {max} allowed")
            }
            Self::MissingValue { index } => write!(f, "item value {index} is absent"),
            Self::ValueAfterAbsent { index } => {
                write!(f, "item value {index} follows an absent value")
            }
        }
    }
}

impl std::error::Error for ItemError {}
