//! Host-to-bridge input region that sits between the header and the pixels.
//!
//! Capturing a frame never needs to look inside this block; only its size matters. Decoding is
//! offered for diagnostics (`--info`).

use std::io::Cursor;

use crate::error::Result;
use crate::io::ReadLeExt;
use crate::layout::{INPUT_REGION_SIZE, INPUT_RESERVED_SIZE, TOUCH_RING_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    None,
    Began,
    Moved,
    Ended,
    Cancelled,
    Unknown(u32),
}

impl From<u32> for TouchPhase {
    fn from(raw: u32) -> Self {
        match raw {
            0 => TouchPhase::None,
            1 => TouchPhase::Began,
            2 => TouchPhase::Moved,
            3 => TouchPhase::Ended,
            4 => TouchPhase::Cancelled,
            other => TouchPhase::Unknown(other),
        }
    }
}

/// One 32-byte slot of the touch ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Position in points.
    pub x: f32,
    pub y: f32,
    pub touch_id: u32,
    pub timestamp: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub key_code: u32,
    pub key_flags: u32,
    pub key_char: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InputRegion {
    /// Total number of touch events ever written by the host.
    pub touch_write_index: u64,
    pub touch_ring: [TouchEvent; TOUCH_RING_SIZE],
    pub keys: KeyState,
}

impl InputRegion {
    pub fn decode(bytes: &[u8; INPUT_REGION_SIZE]) -> Result<Self> {
        let mut r = Cursor::new(&bytes[..]);

        let touch_write_index = r.read_u64_le()?;
        let mut touch_ring = [TouchEvent {
            phase: TouchPhase::None,
            x: 0.0,
            y: 0.0,
            touch_id: 0,
            timestamp: 0,
        }; TOUCH_RING_SIZE];
        for slot in touch_ring.iter_mut() {
            slot.phase = TouchPhase::from(r.read_u32_le()?);
            slot.x = r.read_f32_le()?;
            slot.y = r.read_f32_le()?;
            slot.touch_id = r.read_u32_le()?;
            slot.timestamp = r.read_u64_le()?;
            r.skip_bytes(8)?; // pad
        }

        let keys = KeyState {
            key_code: r.read_u32_le()?,
            key_flags: r.read_u32_le()?,
            key_char: r.read_u32_le()?,
        };
        r.skip_bytes(INPUT_RESERVED_SIZE)?;
        debug_assert_eq!(r.position() as usize, INPUT_REGION_SIZE);

        Ok(Self {
            touch_write_index,
            touch_ring,
            keys,
        })
    }

    /// Up to `count` most recently written touch events, newest first.
    ///
    /// The host writes slot `write_index % 16` before bumping the index, so the newest event lives
    /// at `write_index - 1`.
    pub fn recent_touches(&self, count: usize) -> Vec<TouchEvent> {
        let available = self
            .touch_write_index
            .min(TOUCH_RING_SIZE as u64)
            .min(count as u64);
        (1..=available)
            .map(|back| {
                let idx = self.touch_write_index.wrapping_sub(back) % TOUCH_RING_SIZE as u64;
                self.touch_ring[idx as usize]
            })
            .collect()
    }
}
