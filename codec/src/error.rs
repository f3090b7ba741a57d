//! Error types for codec operations.

use std::fmt;

use bitstream::BitError;
use item::ItemError;
use schema::SchemaError;
use wire::WireError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while framing, compressing or mapping a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Wire format error.
    Wire(WireError),

    /// Bitstream error.
    Bitstream(BitError),

    /// Structure mapping error.
    Schema(SchemaError),

    /// Item blob error.
    Item(ItemError),

    /// Input ended before a fixed-size part.
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },

    /// Leading SHA-1 digest does not match the payload.
    IntegrityMismatch,

    /// Header tag is not `WSG`.
    BadTag { found: [u8; 3] },

    /// Header version is neither 2 nor its byte-swapped form.
    UnsupportedVersion { found: u32 },

    /// CRC32 of the decoded plaintext does not match the header.
    ChecksumMismatch { expected: u32, found: u32 },

    /// Serialized Huffman tree nests deeper than any 256-symbol tree.
    InvalidTree { depth: usize },

    /// Byte to encode has no code in the tree.
    UnknownSymbol { byte: u8 },

    /// Compressor failure or malformed compressed frame.
    Compression { message: String },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// A save entry does not have the expected shape.
    MalformedEntry { field: u32, reason: &'static str },

    /// A save modification could not be parsed.
    InvalidChange { change: String, reason: &'static str },
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    DecompressedBytes,
    PlaintextBytes,
    ContainerBytes,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(e) => write!(f, "wire error: {e}"),
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::Item(e) => write!(f, "item error: {e}"),
            Self::Truncated {
                what,
                needed,
                available,
            } => {
                write!(f, "truncated {what}: need {needed} bytes, have {available}")
            }
            Self::IntegrityMismatch => write!(f, "save digest does not match its contents"),
            Self::BadTag { found } => write!(f, "bad container tag {found:02X?}"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported container version 0x{found:08X}")
            }
            Self::ChecksumMismatch { expected, found } => {
                write!(
                    f,
                    "plaintext crc32 mismatch: expected 0x{expected:08X}, found 0x{found:08X}"
                )
            }
            Self::InvalidTree { depth } => {
                write!(f, "huffman tree deeper than {depth} levels")
            }
            Self::UnknownSymbol { byte } => {
                write!(f, "byte 0x{byte:02X} has no huffman code")
            }
            Self::Compression { message } => write!(f, "compression error: {message}"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::MalformedEntry { field, reason } => {
                write!(f, "malformed entry in field {field}: {reason}")
            }
            Self::InvalidChange { change, reason } => {
                write!(f, "invalid change {change:?}: {reason}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DecompressedBytes => "decompressed bytes",
            Self::PlaintextBytes => "plaintext bytes",
            Self::ContainerBytes => "container bytes",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(e) => Some(e),
            Self::Bitstream(e) => Some(e),
            Self::Schema(e) => Some(e),
            Self::Item(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

impl From<BitError> for CodecError {
    fn from(err: BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<SchemaError> for CodecError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<ItemError> for CodecError {
    fn from(err: ItemError) -> Self {
        Self::Item(err)
    }
}
