#![forbid(unsafe_code)]

//! Reader for the RosettaSim shared framebuffer file.
//!
//! The simulator bridge maps `/tmp/rosettasim_framebuffer` shared and keeps rendering into it; the
//! host side writes touch and key events into the same file. This crate decodes the fixed layout
//! described in [`layout`] and copies out single frames. It never writes to the file.

mod error;
mod header;
mod input;
mod io;
pub mod layout;
mod pixels;
mod reader;

pub use error::{FramebufferError, Result};
pub use header::{FramebufferFlags, FramebufferHeader};
pub use input::{InputRegion, KeyState, TouchEvent, TouchPhase};
pub use pixels::{flip_rows, swap_red_blue_in_place, to_top_left_rgba};
pub use reader::{
    read_framebuffer, read_framebuffer_with, read_input_region, FramebufferSnapshot, ReadOptions,
};
