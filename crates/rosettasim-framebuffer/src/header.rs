//! The 64-byte header at offset 0 of the shared framebuffer.

use std::io::Cursor;

use bitflags::bitflags;

use crate::error::{FramebufferError, Result};
use crate::io::ReadLeExt;
use crate::layout::{
    self, header_offset, BYTES_PER_PIXEL, FB_FORMAT_BGRA, FB_MAGIC, FB_VERSION, HEADER_SIZE,
};

bitflags! {
    /// Status bits published by the bridge in the header `flags` word.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FramebufferFlags: u32 {
        const FRAME_READY = 0x01;
        const APP_RUNNING = 0x02;
        /// The bridge is in the middle of writing pixels; a read now is likely torn.
        const RENDERING = 0x04;
    }
}

/// Decoded framebuffer header.
///
/// Decoding is field-by-field rather than a cast so that a producer built against a different
/// layout fails the magic check instead of yielding shifted values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferHeader {
    pub magic: u32,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    /// Bytes per row as advertised by the producer. Pixel extraction assumes `width * 4`; see
    /// [`crate::ReadOptions::strict_stride`].
    pub stride: u32,
    pub pixel_format: u32,
    pub frame_counter: u64,
    pub timestamp_ns: u64,
    pub flags: u32,
    pub fps_target: u32,
}

impl FramebufferHeader {
    /// Header for a tightly packed BGRA frame of the current protocol version.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            magic: FB_MAGIC,
            version: FB_VERSION,
            width,
            height,
            stride: width.saturating_mul(BYTES_PER_PIXEL as u32),
            pixel_format: FB_FORMAT_BGRA,
            frame_counter: 0,
            timestamp_ns: 0,
            flags: 0,
            fps_target: 0,
        }
    }

    /// Decode a header, rejecting anything whose magic is not [`FB_MAGIC`].
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut r = Cursor::new(&bytes[..]);

        let magic = r.read_u32_le()?;
        if magic != FB_MAGIC {
            return Err(FramebufferError::BadMagic {
                actual: magic,
                expected: FB_MAGIC,
            });
        }

        let version = r.read_u32_le()?;
        let width = r.read_u32_le()?;
        let height = r.read_u32_le()?;
        let stride = r.read_u32_le()?;
        let pixel_format = r.read_u32_le()?;
        debug_assert_eq!(r.position() as usize, header_offset::FRAME_COUNTER);
        let frame_counter = r.read_u64_le()?;
        let timestamp_ns = r.read_u64_le()?;
        let flags = r.read_u32_le()?;
        let fps_target = r.read_u32_le()?;
        debug_assert_eq!(r.position() as usize, header_offset::RESERVED);

        Ok(Self {
            magic,
            version,
            width,
            height,
            stride,
            pixel_format,
            frame_counter,
            timestamp_ns,
            flags,
            fps_target,
        })
    }

    /// Encode in the producer's layout. Reserved words are written as zero.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        put_u32(&mut out, header_offset::MAGIC, self.magic);
        put_u32(&mut out, header_offset::VERSION, self.version);
        put_u32(&mut out, header_offset::WIDTH, self.width);
        put_u32(&mut out, header_offset::HEIGHT, self.height);
        put_u32(&mut out, header_offset::STRIDE, self.stride);
        put_u32(&mut out, header_offset::FORMAT, self.pixel_format);
        put_u64(&mut out, header_offset::FRAME_COUNTER, self.frame_counter);
        put_u64(&mut out, header_offset::TIMESTAMP_NS, self.timestamp_ns);
        put_u32(&mut out, header_offset::FLAGS, self.flags);
        put_u32(&mut out, header_offset::FPS_TARGET, self.fps_target);
        out
    }

    /// Known flag bits; unknown bits are kept.
    pub fn flags(&self) -> FramebufferFlags {
        FramebufferFlags::from_bits_retain(self.flags)
    }

    /// Row length in bytes when rows are tightly packed (`width * 4`).
    pub fn packed_row_bytes(&self) -> u64 {
        u64::from(self.width) * BYTES_PER_PIXEL as u64
    }

    pub fn stride_is_packed(&self) -> bool {
        u64::from(self.stride) == self.packed_row_bytes()
    }

    pub fn pixel_payload_len(&self) -> Result<u64> {
        layout::pixel_payload_len(self.width, self.height).ok_or(
            FramebufferError::DimensionsOverflow {
                width: self.width,
                height: self.height,
            },
        )
    }

    pub fn required_file_len(&self) -> Result<u64> {
        layout::required_file_len(self.width, self.height).ok_or(
            FramebufferError::DimensionsOverflow {
                width: self.width,
                height: self.height,
            },
        )
    }
}

fn put_u32(buf: &mut [u8], offset: usize, val: u32) {
    buf[offset..offset + 4].copy_from_slice(&val.to_le_bytes());
}

fn put_u64(buf: &mut [u8], offset: usize, val: u64) {
    buf[offset..offset + 8].copy_from_slice(&val.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_fields_at_fixed_offsets() {
        let mut raw = [0u8; HEADER_SIZE];
        raw[0..4].copy_from_slice(b"RSIM");
        raw[4..8].copy_from_slice(&3u32.to_le_bytes());
        raw[8..12].copy_from_slice(&750u32.to_le_bytes());
        raw[12..16].copy_from_slice(&1334u32.to_le_bytes());
        raw[16..20].copy_from_slice(&3000u32.to_le_bytes());
        raw[20..24].copy_from_slice(b"ARGB");
        raw[24..32].copy_from_slice(&0x0123_4567_89AB_CDEFu64.to_le_bytes());
        raw[32..40].copy_from_slice(&42u64.to_le_bytes());
        raw[40..44].copy_from_slice(&0x05u32.to_le_bytes());
        raw[44..48].copy_from_slice(&60u32.to_le_bytes());
        raw[48..64].fill(0xEE);

        let hdr = FramebufferHeader::decode(&raw).unwrap();
        assert_eq!(hdr.magic, FB_MAGIC);
        assert_eq!(hdr.version, 3);
        assert_eq!((hdr.width, hdr.height, hdr.stride), (750, 1334, 3000));
        assert_eq!(hdr.pixel_format, FB_FORMAT_BGRA);
        assert_eq!(hdr.frame_counter, 0x0123_4567_89AB_CDEF);
        assert_eq!(hdr.timestamp_ns, 42);
        assert_eq!(hdr.fps_target, 60);
        assert_eq!(
            hdr.flags(),
            FramebufferFlags::FRAME_READY | FramebufferFlags::RENDERING
        );
        assert!(hdr.stride_is_packed());
    }

    #[test]
    fn decode_rejects_wrong_magic_and_reports_it() {
        let mut raw = FramebufferHeader::new(2, 2).to_bytes();
        raw[0..4].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());

        match FramebufferHeader::decode(&raw) {
            Err(FramebufferError::BadMagic { actual, expected }) => {
                assert_eq!(actual, 0xDEAD_BEEF);
                assert_eq!(expected, FB_MAGIC);
            }
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn encode_then_decode_preserves_every_field() {
        let hdr = FramebufferHeader {
            frame_counter: 99,
            timestamp_ns: 123_456,
            flags: 0x8000_0002,
            fps_target: 30,
            stride: 4096,
            ..FramebufferHeader::new(640, 480)
        };
        let decoded = FramebufferHeader::decode(&hdr.to_bytes()).unwrap();
        assert_eq!(decoded, hdr);
        assert!(decoded.flags().contains(FramebufferFlags::APP_RUNNING));
        assert_eq!(decoded.flags().bits(), 0x8000_0002);
        assert!(!decoded.stride_is_packed());
    }

    #[test]
    fn payload_len_reports_overflow() {
        let hdr = FramebufferHeader::new(u32::MAX, u32::MAX);
        assert!(matches!(
            hdr.pixel_payload_len(),
            Err(FramebufferError::DimensionsOverflow { .. })
        ));
    }
}
