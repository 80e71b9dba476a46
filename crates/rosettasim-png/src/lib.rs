#![forbid(unsafe_code)]

//! Minimal PNG writer for 8-bit RGBA frames.
//!
//! Produces the smallest valid file shape: signature, `IHDR`, a single `IDAT` holding every row
//! with filter type 0, then `IEND`. The chunk builders return fully formed bytes so callers can
//! decide where they go; [`write_image`] is the file-backed convenience used by the screenshot
//! tool.

use std::io::{self, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use thiserror::Error;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

const BIT_DEPTH_8: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
const FILTER_NONE: u8 = 0;
const BYTES_PER_PIXEL: usize = 4;

/// Chunk lengths are u32 on the wire but the format caps them at 2^31 - 1.
const MAX_CHUNK_LEN: usize = i32::MAX as usize;

pub type Result<T> = std::result::Result<T, EncodeError>;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("{width}x{height} image is too large to address in memory")]
    DimensionsOverflow { width: u32, height: u32 },

    #[error("rgba buffer is {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("chunk data of {len} bytes exceeds the PNG limit")]
    ChunkTooLarge { len: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Narrow seam between the capture pipeline and the container format.
pub trait RasterEncoder {
    /// Encode a top-left-origin, tightly packed RGBA8 frame into a complete file image.
    fn encode_rgba(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PngEncoder {
    level: u32,
}

impl PngEncoder {
    pub const MAX_LEVEL: u32 = 9;

    /// `level` is the zlib level, clamped to 0..=9.
    pub fn with_level(level: u32) -> Self {
        Self {
            level: level.min(Self::MAX_LEVEL),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for PngEncoder {
    fn default() -> Self {
        Self::with_level(Self::MAX_LEVEL)
    }
}

impl RasterEncoder for PngEncoder {
    fn encode_rgba(&self, width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
        let row_bytes = check_dimensions(width, height, rgba.len())?;

        let idat = compress_scanlines(rgba, row_bytes, Compression::new(self.level))?;

        let mut out = Vec::with_capacity(PNG_SIGNATURE.len() + 3 * 12 + 13 + idat.len());
        out.extend_from_slice(&PNG_SIGNATURE);
        out.extend_from_slice(&chunk(b"IHDR", &ihdr_data(width, height))?);
        out.extend_from_slice(&chunk(b"IDAT", &idat)?);
        out.extend_from_slice(&chunk(b"IEND", &[])?);
        Ok(out)
    }
}

/// Encode with [`PngEncoder::default`] (maximum compression).
pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    PngEncoder::default().encode_rgba(width, height, rgba)
}

/// Encode and write to `path`, replacing any existing file.
///
/// The whole file is encoded in memory first, so validation failures never touch `path`.
pub fn write_image(path: impl AsRef<Path>, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
    write_image_with(&PngEncoder::default(), path, width, height, rgba)
}

pub fn write_image_with(
    encoder: &dyn RasterEncoder,
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<()> {
    let bytes = encoder.encode_rgba(width, height, rgba)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Build one chunk: `len (BE u32) | tag | data | crc32(tag | data) (BE u32)`.
pub fn chunk(tag: &[u8; 4], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() > MAX_CHUNK_LEN {
        return Err(EncodeError::ChunkTooLarge { len: data.len() });
    }
    let len = data.len() as u32;

    let mut crc = crc32fast::Hasher::new();
    crc.update(tag);
    crc.update(data);

    let mut out = Vec::with_capacity(12 + data.len());
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);
    out.extend_from_slice(&crc.finalize().to_be_bytes());
    Ok(out)
}

fn ihdr_data(width: u32, height: u32) -> [u8; 13] {
    let mut out = [0u8; 13];
    out[0..4].copy_from_slice(&width.to_be_bytes());
    out[4..8].copy_from_slice(&height.to_be_bytes());
    out[8] = BIT_DEPTH_8;
    out[9] = COLOR_TYPE_RGBA;
    // compression method, filter method, interlace method: all 0
    out
}

fn check_dimensions(width: u32, height: u32, actual: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyImage { width, height });
    }
    let expected = (width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .and_then(|row| row.checked_mul(height as usize))
        .ok_or(EncodeError::DimensionsOverflow { width, height })?;
    if actual != expected {
        return Err(EncodeError::PayloadLength { expected, actual });
    }
    Ok(width as usize * BYTES_PER_PIXEL)
}

/// Prefix every row with filter byte 0 and zlib-compress the result.
fn compress_scanlines(rgba: &[u8], row_bytes: usize, level: Compression) -> io::Result<Vec<u8>> {
    let mut z = ZlibEncoder::new(Vec::new(), level);
    for row in rgba.chunks_exact(row_bytes) {
        z.write_all(&[FILTER_NONE])?;
        z.write_all(row)?;
    }
    z.finish()
}
