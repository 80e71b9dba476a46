//! Best-effort, lock-free snapshots of the shared framebuffer file.
//!
//! The simulator bridge keeps rewriting the file while we read it and there is no protocol for
//! pausing it. A snapshot can therefore mix rows from two consecutive frames (tearing). Callers
//! that need a clean frame should check [`FramebufferFlags::RENDERING`] on the returned header and
//! retry on their own schedule; this module never retries.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{FramebufferError, Result};
use crate::header::{FramebufferFlags, FramebufferHeader};
use crate::input::InputRegion;
use crate::layout::{FB_FORMAT_BGRA, FB_VERSION, HEADER_SIZE, INPUT_REGION_SIZE, PIXEL_OFFSET};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Reject headers whose `stride` is not `width * 4`.
    ///
    /// The bridge has always written tightly packed rows and nothing defines how padded rows
    /// would be laid out, so padding is never guessed at. With this unset the payload is read as
    /// tightly packed and a warning is logged.
    pub strict_stride: bool,
}

/// A single copied-out frame. The source file is closed by the time this is returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramebufferSnapshot {
    pub header: FramebufferHeader,
    /// `width * height * 4` bytes of BGRA, bottom row first.
    pub pixels: Vec<u8>,
}

impl FramebufferSnapshot {
    pub fn width(&self) -> u32 {
        self.header.width
    }

    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn frame_counter(&self) -> u64 {
        self.header.frame_counter
    }

    /// Whether the producer flagged a render in progress when the header was read.
    pub fn possibly_torn(&self) -> bool {
        self.header.flags().contains(FramebufferFlags::RENDERING)
    }
}

pub fn read_framebuffer(path: impl AsRef<Path>) -> Result<FramebufferSnapshot> {
    read_framebuffer_with(path, &ReadOptions::default())
}

pub fn read_framebuffer_with(
    path: impl AsRef<Path>,
    opts: &ReadOptions,
) -> Result<FramebufferSnapshot> {
    let path = path.as_ref();
    let (mut file, file_len) = open_source(path)?;
    let header = read_header(&mut file, file_len)?;
    check_header(&header, opts)?;

    let required = header.required_file_len()?;
    if file_len < required {
        return Err(FramebufferError::TooSmall {
            actual: file_len,
            required,
        });
    }

    let payload_len = usize::try_from(header.pixel_payload_len()?).map_err(|_| {
        FramebufferError::DimensionsOverflow {
            width: header.width,
            height: header.height,
        }
    })?;

    tracing::debug!(
        path = %path.display(),
        file_len,
        pixel_offset = PIXEL_OFFSET,
        payload_len,
        "copying framebuffer payload"
    );

    file.seek(SeekFrom::Start(PIXEL_OFFSET as u64))?;
    let mut pixels = vec![0u8; payload_len];
    read_exact_or_too_small(&mut file, &mut pixels, required)?;
    drop(file);

    let snapshot = FramebufferSnapshot { header, pixels };
    if snapshot.possibly_torn() {
        tracing::warn!(
            frame = snapshot.frame_counter(),
            "producer was rendering during capture; frame may be torn"
        );
    }
    Ok(snapshot)
}

/// Read the header and the input region without touching the pixel payload.
pub fn read_input_region(path: impl AsRef<Path>) -> Result<(FramebufferHeader, InputRegion)> {
    let (mut file, file_len) = open_source(path.as_ref())?;
    let header = read_header(&mut file, file_len)?;

    let required = PIXEL_OFFSET as u64;
    if file_len < required {
        return Err(FramebufferError::TooSmall {
            actual: file_len,
            required,
        });
    }
    let mut raw = [0u8; INPUT_REGION_SIZE];
    read_exact_or_too_small(&mut file, &mut raw, required)?;
    Ok((header, InputRegion::decode(&raw)?))
}

fn open_source(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => FramebufferError::SourceNotFound {
            path: path.to_path_buf(),
        },
        _ => FramebufferError::Io(err),
    })?;
    let file_len = file.metadata()?.len();
    Ok((file, file_len))
}

fn read_header(file: &mut File, file_len: u64) -> Result<FramebufferHeader> {
    let required = HEADER_SIZE as u64;
    if file_len < required {
        return Err(FramebufferError::TooSmall {
            actual: file_len,
            required,
        });
    }
    let mut raw = [0u8; HEADER_SIZE];
    read_exact_or_too_small(file, &mut raw, required)?;
    let header = FramebufferHeader::decode(&raw)?;

    tracing::debug!(
        version = header.version,
        width = header.width,
        height = header.height,
        stride = header.stride,
        format = %format!("0x{:08x}", header.pixel_format),
        frame = header.frame_counter,
        flags = ?header.flags(),
        "decoded framebuffer header"
    );
    Ok(header)
}

fn check_header(header: &FramebufferHeader, opts: &ReadOptions) -> Result<()> {
    if header.version != FB_VERSION {
        tracing::warn!(
            version = header.version,
            expected = FB_VERSION,
            "unexpected framebuffer version; input region size may differ"
        );
    }
    if header.pixel_format != FB_FORMAT_BGRA {
        tracing::warn!(
            format = %format!("0x{:08x}", header.pixel_format),
            "unexpected pixel format; treating payload as BGRA"
        );
    }
    if !header.stride_is_packed() {
        if opts.strict_stride {
            return Err(FramebufferError::StrideMismatch {
                stride: header.stride,
                expected: header.packed_row_bytes(),
            });
        }
        tracing::warn!(
            stride = header.stride,
            packed = header.packed_row_bytes(),
            "header stride differs from width * 4; reading rows as tightly packed"
        );
    }
    Ok(())
}

/// `read_exact`, except that running out of file is reported as [`FramebufferError::TooSmall`].
///
/// The file can shrink between `stat` and the read when the producer recreates it.
fn read_exact_or_too_small(file: &mut File, buf: &mut [u8], required: u64) -> Result<()> {
    match file.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
            let actual = file.metadata().map(|m| m.len()).unwrap_or(0);
            Err(FramebufferError::TooSmall { actual, required })
        }
        Err(err) => Err(err.into()),
    }
}
