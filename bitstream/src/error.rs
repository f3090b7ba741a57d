use std::fmt;

/// Result of a bit cursor operation.
pub type BitResult<T> = Result<T, BitError>;

/// Why a bit cursor or sink refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitError {
    /// A read wanted more bits than the buffer has left.
    ///
    /// This is how a truncated Huffman payload or tree surfaces.
    Exhausted {
        /// Bit offset of the failed read.
        at: usize,
        wanted: usize,
        left: usize,
    },

    /// A multi-bit read or write wider than a `u64`.
    TooWide { width: u32 },
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exhausted { at, wanted, left } => write!(
                f,
                "bit stream exhausted at bit {at}: wanted {wanted}, {left} left"
            ),
            Self::TooWide { width } => write!(f, "{width}-bit field does not fit in 64 bits"),
        }
    }
}

impl std::error::Error for BitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_names_the_offset() {
        let err = BitError::Exhausted {
            at: 1043,
            wanted: 8,
            left: 5,
        };
        assert_eq!(
            err.to_string(),
            "bit stream exhausted at bit 1043: wanted 8, 5 left"
        );
    }

    #[test]
    fn too_wide_message() {
        assert_eq!(
            BitError::TooWide { width: 65 }.to_string(),
            "65-bit field does not fit in 64 bits"
        );
    }
}
