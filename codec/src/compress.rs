//! Compression of the container body.
//!
//! Compressors produce a frame: `0xF0 | uncompressed length: u32 be | stream`.
//! The container stores the frame without its marker byte.

use crate::error::{CodecError, CodecResult, LimitKind};

/// First byte of every compressed frame.
pub const FRAME_MARKER: u8 = 0xF0;

/// Marker plus declared length.
pub const FRAME_HEADER_LEN: usize = 5;

/// A byte-stream compressor with the frame layout above.
pub trait Compressor {
    /// Compresses `data` into a frame.
    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>>;

    /// Decompresses a frame.
    fn decompress(&self, frame: &[u8]) -> CodecResult<Vec<u8>>;
}

/// Builds a frame around an already compressed `stream`.
pub fn frame(uncompressed_len: usize, stream: &[u8]) -> CodecResult<Vec<u8>> {
    let len = u32::try_from(uncompressed_len).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::ContainerBytes,
        limit: u32::MAX as usize,
        actual: uncompressed_len,
    })?;
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + stream.len());
    out.push(FRAME_MARKER);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(stream);
    Ok(out)
}

/// Splits a frame into its declared uncompressed length and stream.
pub fn unframe(frame: &[u8]) -> CodecResult<(usize, &[u8])> {
    match frame {
        [FRAME_MARKER, a, b, c, d, stream @ ..] => {
            Ok((u32::from_be_bytes([*a, *b, *c, *d]) as usize, stream))
        }
        [marker, ..] if *marker != FRAME_MARKER => Err(CodecError::Compression {
            message: format!("unexpected frame marker 0x{marker:02X}"),
        }),
        _ => Err(CodecError::Truncated {
            what: "compressed frame header",
            needed: FRAME_HEADER_LEN,
            available: frame.len(),
        }),
    }
}

/// Frames data without compressing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stored;

impl Compressor for Stored {
    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        frame(data.len(), data)
    }

    fn decompress(&self, frame: &[u8]) -> CodecResult<Vec<u8>> {
        let (len, stream) = unframe(frame)?;
        if stream.len() != len {
            return Err(CodecError::Compression {
                message: format!("stored frame declares {len} bytes, holds {}", stream.len()),
            });
        }
        Ok(stream.to_vec())
    }
}

/// LZO1X, the compressor the game itself uses.
#[cfg(feature = "lzo")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Lzo;

#[cfg(feature = "lzo")]
impl Compressor for Lzo {
    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let stream = minilzo::compress(data).map_err(|err| CodecError::Compression {
            message: format!("lzo compress failed: {err:?}"),
        })?;
        frame(data.len(), &stream)
    }

    fn decompress(&self, frame: &[u8]) -> CodecResult<Vec<u8>> {
        let (len, stream) = unframe(frame)?;
        let out = minilzo::decompress(stream, len).map_err(|err| CodecError::Compression {
            message: format!("lzo decompress failed: {err:?}"),
        })?;
        if out.len() != len {
            return Err(CodecError::Compression {
                message: format!("lzo frame declares {len} bytes, produced {}", out.len()),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_frame_layout() {
        let framed = Stored.compress(b"abc").unwrap();
        assert_eq!(framed, vec![0xF0, 0, 0, 0, 3, b'a', b'b', b'c']);
        assert_eq!(Stored.decompress(&framed).unwrap(), b"abc");
    }

    #[test]
    fn stored_rejects_length_mismatch() {
        let err = Stored.decompress(&[0xF0, 0, 0, 0, 4, 1, 2]).unwrap_err();
        assert!(matches!(err, CodecError::Compression { .. }));
    }

    #[test]
    fn unframe_rejects_bad_marker() {
        let err = unframe(&[0x00, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::Compression { .. }));
    }

    #[test]
    fn unframe_rejects_short_header() {
        let err = unframe(&[0xF0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { needed: 5, .. }));
        assert!(unframe(&[]).is_err());
    }

    #[cfg(feature = "lzo")]
    #[test]
    fn lzo_roundtrip() {
        let data: Vec<u8> = b"WSG".iter().copied().cycle().take(4096).collect();
        let framed = Lzo.compress(&data).unwrap();
        assert_eq!(framed[0], FRAME_MARKER);
        assert_eq!(&framed[1..5], &4096u32.to_be_bytes());
        assert!(framed.len() < data.len());
        assert_eq!(Lzo.decompress(&framed).unwrap(), data);
    }
}
