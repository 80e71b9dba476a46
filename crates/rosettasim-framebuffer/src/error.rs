use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FramebufferError>;

#[derive(Debug, Error)]
pub enum FramebufferError {
    #[error("{} not found (is the simulator running?)", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("bad framebuffer magic 0x{actual:08x} (expected 0x{expected:08x})")]
    BadMagic { actual: u32, expected: u32 },

    #[error("framebuffer file too small ({actual} < {required} bytes)")]
    TooSmall { actual: u64, required: u64 },

    #[error("row stride {stride} does not match tightly packed rows ({expected} bytes)")]
    StrideMismatch { stride: u32, expected: u64 },

    #[error("framebuffer dimensions {width}x{height} overflow the address space")]
    DimensionsOverflow { width: u32, height: u32 },

    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    PayloadLength { expected: usize, actual: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
