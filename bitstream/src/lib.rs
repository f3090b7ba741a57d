//! Bit cursor and bit sink for the Huffman layer of WSG saves.
//!
//! A save's payload is a depth-first Huffman tree followed by the codes of
//! every plaintext byte, packed MSB-first with no alignment between them.
//! [`BitReader`] and [`BitWriter`] are the only sub-byte access in the
//! workspace; every layer above works on whole bytes.
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! // Internal node, then the leaves 'W' and 'G'.
//! let mut writer = BitWriter::new();
//! writer.write_bit(false);
//! for leaf in [b'W', b'G'] {
//!     writer.write_bit(true);
//!     writer.write_byte(leaf);
//! }
//! let bytes = writer.finish();
//! assert_eq!(bytes.len(), 3);
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(!reader.read_bit()?);
//! assert!(reader.read_bit()?);
//! assert_eq!(reader.read_byte()?, b'W');
//! # Ok::<(), bitstream::BitError>(())
//! ```

mod error;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use reader::BitReader;
pub use writer::BitWriter;
