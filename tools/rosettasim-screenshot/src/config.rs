use std::path::PathBuf;

use rosettasim_framebuffer::layout::{DEFAULT_FRAMEBUFFER_PATH, DEFAULT_GPU_FRAMEBUFFER_PATH};
use rosettasim_framebuffer::ReadOptions;

use crate::Args;

pub const FB_PATH_ENV: &str = "ROSETTASIM_FB_PATH";
pub const OUTPUT_PATH_ENV: &str = "ROSETTASIM_SCREENSHOT_PATH";
pub const DEFAULT_OUTPUT_PATH: &str = "/tmp/rosettasim_screenshot.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub framebuffer: PathBuf,
    pub output: PathBuf,
    pub read: ReadOptions,
    pub compression_level: u32,
    pub report: ReportFormat,
    /// Print header and input state instead of capturing.
    pub info_only: bool,
}

impl CaptureConfig {
    /// Flags win over the environment, which wins over the built-in paths. Empty environment
    /// values are treated as unset.
    pub fn resolve(args: &Args, env: impl Fn(&str) -> Option<String>) -> Self {
        let env_path = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let framebuffer = if let Some(path) = &args.framebuffer {
            path.clone()
        } else if args.gpu {
            PathBuf::from(DEFAULT_GPU_FRAMEBUFFER_PATH)
        } else {
            env_path(FB_PATH_ENV).unwrap_or_else(|| PathBuf::from(DEFAULT_FRAMEBUFFER_PATH))
        };

        let output = args
            .output
            .clone()
            .or_else(|| env_path(OUTPUT_PATH_ENV))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

        Self {
            framebuffer,
            output,
            read: ReadOptions {
                strict_stride: args.strict_stride,
            },
            compression_level: args.compression_level,
            report: if args.json {
                ReportFormat::Json
            } else {
                ReportFormat::Text
            },
            info_only: args.info,
        }
    }
}
