//! The save file container.
//!
//! ```text
//! sha1(rest): 20 | decompressed length: u32 be | LZO stream
//! ```
//!
//! decompressing to
//!
//! ```text
//! length: u32 be | "WSG" | version: u32 | crc32: u32 | plaintext length: u32
//! | huffman tree | huffman codes | 00 00 00 00
//! ```
//!
//! where `length` counts everything after itself. Version 2 read big-endian
//! means version, crc32 and plaintext length are big-endian; read as
//! `0x02000000` they are little-endian, which is what the game writes.

use bitstream::{BitReader, BitWriter};
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::compress::{Compressor, FRAME_MARKER};
use crate::error::{CodecError, CodecResult, LimitKind};
use crate::huffman::HuffmanTree;
use crate::limits::ContainerLimits;

/// Header tag.
pub const TAG: [u8; 3] = *b"WSG";

/// The only container version.
pub const VERSION: u32 = 2;

/// Length of the leading SHA-1 digest.
pub const DIGEST_LEN: usize = 20;

/// Length of the decompressed header.
pub const HEADER_LEN: usize = 19;

const SWAPPED_VERSION: u32 = VERSION.swap_bytes();
const LENGTH_FIELD_LEN: usize = 4;
const TRAILER: [u8; 4] = [0; 4];

/// Byte order of the version, crc32 and plaintext length fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }

    fn write_u32(self, value: u32, out: &mut Vec<u8>) {
        match self {
            Self::Big => out.extend_from_slice(&value.to_be_bytes()),
            Self::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

/// Decompressed container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Bytes following the length field.
    pub length: u32,
    pub byte_order: ByteOrder,
    pub crc32: u32,
    pub plaintext_len: u32,
}

impl ContainerHeader {
    /// Parses the header at the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> CodecResult<Self> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(CodecError::Truncated {
                what: "container header",
                needed: HEADER_LEN,
                available: bytes.len(),
            });
        };
        let word = |at: usize| [header[at], header[at + 1], header[at + 2], header[at + 3]];

        let length = u32::from_be_bytes(word(0));
        let tag = [header[4], header[5], header[6]];
        if tag != TAG {
            return Err(CodecError::BadTag { found: tag });
        }
        let byte_order = match u32::from_be_bytes(word(7)) {
            VERSION => ByteOrder::Big,
            SWAPPED_VERSION => ByteOrder::Little,
            found => return Err(CodecError::UnsupportedVersion { found }),
        };

        Ok(Self {
            length,
            byte_order,
            crc32: byte_order.read_u32(word(11)),
            plaintext_len: byte_order.read_u32(word(15)),
        })
    }

    /// Appends the encoded header to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.length.to_be_bytes());
        out.extend_from_slice(&TAG);
        self.byte_order.write_u32(VERSION, out);
        self.byte_order.write_u32(self.crc32, out);
        self.byte_order.write_u32(self.plaintext_len, out);
    }
}

/// Checks the digest and decompresses the container body.
fn open<C: Compressor + ?Sized>(
    raw: &[u8],
    compressor: &C,
    limits: &ContainerLimits,
) -> CodecResult<Vec<u8>> {
    if raw.len() < DIGEST_LEN + LENGTH_FIELD_LEN {
        return Err(CodecError::Truncated {
            what: "save file",
            needed: DIGEST_LEN + LENGTH_FIELD_LEN,
            available: raw.len(),
        });
    }
    let (digest, payload) = raw.split_at(DIGEST_LEN);
    if Sha1::digest(payload).as_slice() != digest {
        return Err(CodecError::IntegrityMismatch);
    }

    let declared = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    if declared > limits.max_decompressed_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::DecompressedBytes,
            limit: limits.max_decompressed_bytes,
            actual: declared,
        });
    }

    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push(FRAME_MARKER);
    frame.extend_from_slice(payload);
    compressor.decompress(&frame)
}

/// Reads the header of a save without decoding its payload.
pub fn inspect_container<C: Compressor + ?Sized>(
    raw: &[u8],
    compressor: &C,
    limits: &ContainerLimits,
) -> CodecResult<ContainerHeader> {
    ContainerHeader::parse(&open(raw, compressor, limits)?)
}

/// Recovers the plaintext player record from a save file.
pub fn unwrap_container<C: Compressor + ?Sized>(
    raw: &[u8],
    compressor: &C,
    limits: &ContainerLimits,
) -> CodecResult<Vec<u8>> {
    let body = open(raw, compressor, limits)?;
    let header = ContainerHeader::parse(&body)?;
    debug!(
        length = header.length,
        byte_order = ?header.byte_order,
        crc32 = header.crc32,
        plaintext_len = header.plaintext_len,
        "container header"
    );

    let actual = body.len() - LENGTH_FIELD_LEN;
    if header.length as usize != actual {
        warn!(
            declared = header.length,
            actual, "container length field does not match body"
        );
    }

    let plaintext_len = header.plaintext_len as usize;
    if plaintext_len > limits.max_plaintext_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::PlaintextBytes,
            limit: limits.max_plaintext_bytes,
            actual: plaintext_len,
        });
    }

    let mut reader = BitReader::new(&body[HEADER_LEN..]);
    let tree = HuffmanTree::read(&mut reader)?;
    let plaintext = tree.decode(&mut reader, plaintext_len)?;

    let found = crc32fast::hash(&plaintext);
    if found != header.crc32 {
        return Err(CodecError::ChecksumMismatch {
            expected: header.crc32,
            found,
        });
    }
    Ok(plaintext)
}

/// Builds a save file around `plaintext`, laid out the way the game writes it.
pub fn wrap_container<C: Compressor + ?Sized>(
    plaintext: &[u8],
    compressor: &C,
) -> CodecResult<Vec<u8>> {
    let plaintext_len = container_u32(plaintext.len())?;
    let tree = HuffmanTree::build(plaintext);
    let mut writer = BitWriter::with_capacity(plaintext.len());
    tree.write(&mut writer);
    tree.encode(plaintext, &mut writer)?;
    let mut coded = writer.finish();
    coded.extend_from_slice(&TRAILER);

    let header = ContainerHeader {
        length: container_u32(coded.len() + HEADER_LEN - LENGTH_FIELD_LEN)?,
        byte_order: ByteOrder::Little,
        crc32: crc32fast::hash(plaintext),
        plaintext_len,
    };
    debug!(
        plaintext_len,
        coded_len = coded.len(),
        leaves = tree.leaf_count(),
        "wrapping container"
    );

    let mut body = Vec::with_capacity(HEADER_LEN + coded.len());
    header.write(&mut body);
    body.extend_from_slice(&coded);

    let frame = compressor.compress(&body)?;
    let payload = frame.get(1..).unwrap_or_default();
    let mut raw = Vec::with_capacity(DIGEST_LEN + payload.len());
    raw.extend_from_slice(&Sha1::digest(payload));
    raw.extend_from_slice(payload);
    Ok(raw)
}

fn container_u32(len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::ContainerBytes,
        limit: u32::MAX as usize,
        actual: len,
    })
}
