#![forbid(unsafe_code)]

mod config;
mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rosettasim_framebuffer::{read_framebuffer_with, read_input_region, to_top_left_rgba};
use rosettasim_png::{write_image_with, PngEncoder};
use tracing_subscriber::EnvFilter;

use crate::config::{CaptureConfig, ReportFormat};
use crate::report::CaptureSummary;

#[derive(Debug, Parser)]
#[command(
    name = "rosettasim-screenshot",
    about = "Save the current RosettaSim shared framebuffer as a PNG.",
    long_about = "Save the current RosettaSim shared framebuffer as a PNG.\n\n\
        The framebuffer is read without coordinating with the simulator, so a capture taken \
        mid-render can show parts of two frames."
)]
pub struct Args {
    /// Output PNG path [env: ROSETTASIM_SCREENSHOT_PATH] [default: /tmp/rosettasim_screenshot.png]
    output: Option<PathBuf>,

    /// Shared framebuffer file [env: ROSETTASIM_FB_PATH] [default: /tmp/rosettasim_framebuffer]
    #[arg(long, value_name = "PATH")]
    framebuffer: Option<PathBuf>,

    /// Read the GPU-composited framebuffer (/tmp/rosettasim_framebuffer_gpu)
    #[arg(long, conflicts_with = "framebuffer")]
    gpu: bool,

    /// Fail if the header stride is not width * 4 instead of assuming packed rows
    #[arg(long)]
    strict_stride: bool,

    /// zlib compression level for the PNG data (0-9)
    #[arg(long, value_name = "LEVEL", default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=9))]
    compression_level: u32,

    /// Print the capture summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the header and input region state without writing an image
    #[arg(long, conflicts_with = "json")]
    info: bool,

    /// Log decoding details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = CaptureConfig::resolve(&args, |key| std::env::var(key).ok());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &CaptureConfig) -> Result<()> {
    if config.info_only {
        let (header, input) = read_input_region(&config.framebuffer)?;
        println!("{}", report::info_text(&config.framebuffer, &header, &input));
        return Ok(());
    }

    let snapshot = read_framebuffer_with(&config.framebuffer, &config.read)?;
    let possibly_torn = snapshot.possibly_torn();
    let header = snapshot.header;
    let rgba = to_top_left_rgba(&snapshot.pixels, header.width, header.height)?;
    drop(snapshot);

    let encoder = PngEncoder::with_level(config.compression_level);
    write_image_with(
        &encoder,
        &config.output,
        header.width,
        header.height,
        &rgba,
    )
    .with_context(|| format!("failed to write {}", config.output.display()))?;

    let output_bytes = std::fs::metadata(&config.output)
        .with_context(|| format!("failed to stat {}", config.output.display()))?
        .len();
    tracing::debug!(output = %config.output.display(), output_bytes, "screenshot written");

    let summary = CaptureSummary::new(
        &config.framebuffer,
        &config.output,
        &header,
        output_bytes,
        possibly_torn,
    );
    match config.report {
        ReportFormat::Text => println!("{}", summary.to_text()),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string(&summary).context("serialize summary")?
        ),
    }
    Ok(())
}
