use std::fmt::Write as _;
use std::path::Path;

use rosettasim_framebuffer::{FramebufferHeader, InputRegion, TouchPhase};
use serde::Serialize;

const RECENT_TOUCHES: usize = 4;

/// Result of a successful capture, printed as text or JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
    pub framebuffer: String,
    pub output: String,
    pub width: u32,
    pub height: u32,
    pub version: u32,
    pub frame_counter: u64,
    pub output_bytes: u64,
    pub possibly_torn: bool,
}

impl CaptureSummary {
    pub fn new(
        framebuffer: &Path,
        output: &Path,
        header: &FramebufferHeader,
        output_bytes: u64,
        possibly_torn: bool,
    ) -> Self {
        Self {
            framebuffer: framebuffer.display().to_string(),
            output: output.display().to_string(),
            width: header.width,
            height: header.height,
            version: header.version,
            frame_counter: header.frame_counter,
            output_bytes,
            possibly_torn,
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "Framebuffer: {}x{}, version {}, frame #{}\nSaved: {} ({} bytes)",
            self.width, self.height, self.version, self.frame_counter, self.output, self.output_bytes
        )
    }
}

pub fn info_text(path: &Path, header: &FramebufferHeader, input: &InputRegion) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source:        {}", path.display());
    let _ = writeln!(
        out,
        "Header:        {}x{} stride={} format=0x{:08x} version {}",
        header.width, header.height, header.stride, header.pixel_format, header.version
    );
    let _ = writeln!(
        out,
        "Frame:         #{} at {} ns (target {} fps)",
        header.frame_counter, header.timestamp_ns, header.fps_target
    );
    let _ = writeln!(out, "Flags:         {:?}", header.flags());
    let _ = writeln!(out, "Touch events:  {} written", input.touch_write_index);
    for touch in input.recent_touches(RECENT_TOUCHES) {
        let _ = writeln!(
            out,
            "  {:<10} ({:.1}, {:.1}) id={} t={}",
            phase_name(touch.phase),
            touch.x,
            touch.y,
            touch.touch_id,
            touch.timestamp
        );
    }
    let _ = write!(
        out,
        "Keys:          code={} flags=0x{:x} char={}",
        input.keys.key_code, input.keys.key_flags, input.keys.key_char
    );
    out
}

fn phase_name(phase: TouchPhase) -> String {
    match phase {
        TouchPhase::None => "none".into(),
        TouchPhase::Began => "began".into(),
        TouchPhase::Moved => "moved".into(),
        TouchPhase::Ended => "ended".into(),
        TouchPhase::Cancelled => "cancelled".into(),
        TouchPhase::Unknown(raw) => format!("phase({raw})"),
    }
}
