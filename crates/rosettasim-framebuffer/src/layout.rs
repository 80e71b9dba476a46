//! Byte layout of the shared framebuffer file (protocol version 3).
//!
//! ```text
//! offset 0     header        64 bytes
//! offset 64    input region  552 bytes (touch ring + key block)
//! offset 616   pixels        width * height * 4 bytes, BGRA, bottom-up rows
//! ```
//!
//! Every offset here is shared by convention with the simulator-side bridge. Nothing in the file
//! itself describes the input region size, so a change on either side silently shifts the pixel
//! payload. Bump [`FB_VERSION`] together with any of these constants.

/// `RSIM` read as a little-endian `u32`.
pub const FB_MAGIC: u32 = 0x4D49_5352;
pub const FB_VERSION: u32 = 3;
/// `BGRA` read as a little-endian `u32`.
pub const FB_FORMAT_BGRA: u32 = 0x4247_5241;

pub const DEFAULT_FRAMEBUFFER_PATH: &str = "/tmp/rosettasim_framebuffer";
pub const DEFAULT_GPU_FRAMEBUFFER_PATH: &str = "/tmp/rosettasim_framebuffer_gpu";

pub const BYTES_PER_PIXEL: usize = 4;

pub const HEADER_SIZE: usize = 64;

pub mod header_offset {
    //! Byte offsets of the header fields.

    pub const MAGIC: usize = 0;
    pub const VERSION: usize = 4;
    pub const WIDTH: usize = 8;
    pub const HEIGHT: usize = 12;
    pub const STRIDE: usize = 16;
    pub const FORMAT: usize = 20;
    pub const FRAME_COUNTER: usize = 24;
    pub const TIMESTAMP_NS: usize = 32;
    pub const FLAGS: usize = 40;
    pub const FPS_TARGET: usize = 44;
    pub const RESERVED: usize = 48;
}

pub const TOUCH_RING_SIZE: usize = 16;
pub const TOUCH_EVENT_SIZE: usize = 32;
pub const KEY_BLOCK_SIZE: usize = 12;
pub const INPUT_RESERVED_SIZE: usize = 20;

/// `write_index (u64) + touch ring + key block + reserved`.
pub const INPUT_REGION_SIZE: usize =
    8 + TOUCH_RING_SIZE * TOUCH_EVENT_SIZE + KEY_BLOCK_SIZE + INPUT_RESERVED_SIZE;

pub const PIXEL_OFFSET: usize = HEADER_SIZE + INPUT_REGION_SIZE;

const _: () = assert!(header_offset::RESERVED + 16 == HEADER_SIZE);
const _: () = assert!(INPUT_REGION_SIZE == 552);
const _: () = assert!(PIXEL_OFFSET == 616);

/// Number of payload bytes implied by the header dimensions, or `None` on overflow.
pub fn pixel_payload_len(width: u32, height: u32) -> Option<u64> {
    u64::from(width)
        .checked_mul(u64::from(height))?
        .checked_mul(BYTES_PER_PIXEL as u64)
}

/// Minimum file length needed to hold a `width` x `height` frame.
pub fn required_file_len(width: u32, height: u32) -> Option<u64> {
    pixel_payload_len(width, height)?.checked_add(PIXEL_OFFSET as u64)
}
