//! CLI argument definitions

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::rotate::Interpolation;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    /// Usage errors; clap already exits with this code when parsing fails
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
    pub const OUTPUT_EXISTS: i32 = 4;
    pub const PROCESSING_ERROR: i32 = 5;
    pub const CONFIG_ERROR: i32 = 6;
}

/// Straighten a scanned page and crop away the black scanner border
#[derive(Debug, Parser)]
#[command(name = "bwcrop", author, version, about, long_about = None)]
pub struct Cli {
    /// Scanned image to process
    pub input: PathBuf,

    /// Output file [default: <input stem>-cropped.tiff in the working directory]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Minimum luminance (0-256) of a content pixel [default: 75]
    #[arg(long, value_name = "0-256")]
    pub luminance_threshold: Option<u32>,

    /// Share (percent) of content pixels that ends an edge scan [default: 33]
    #[arg(long, value_name = "PERCENT")]
    pub percentage_threshold: Option<u32>,

    /// Sweep half-width in degrees [default: 1.0]
    #[arg(long, value_name = "DEGREES")]
    pub window: Option<f64>,

    /// Sweep step in degrees [default: 0.01]
    #[arg(long, value_name = "DEGREES")]
    pub step: Option<f64>,

    /// Rotation sampling [default: bilinear]
    #[arg(long, value_enum)]
    pub interpolation: Option<Interpolation>,

    /// Print the execution plan without processing
    #[arg(long)]
    pub dry_run: bool,

    /// Write every evaluated angle as JSON
    #[arg(long, value_name = "PATH")]
    pub trace_json: Option<PathBuf>,

    /// Show a progress bar instead of the per-angle table
    #[arg(long)]
    pub progress: bool,

    /// Suppress all normal output
    #[arg(short, long, conflicts_with = "progress")]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Search settings given explicitly on the command line
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            luminance_threshold: self.luminance_threshold,
            percentage_threshold: self.percentage_threshold,
            window_degrees: self.window,
            step_degrees: self.step,
            interpolation: self.interpolation,
        }
    }

    /// Default `tracing` filter directive for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
