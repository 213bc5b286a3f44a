//! bwcrop - automatic deskew and black-border crop for scanned pages
//!
//! A scanned page usually sits slightly rotated on a black scanner lid. This
//! crate sweeps a narrow range of rotation angles, measures how much black
//! border each rotation leaves along the four edges, rotates the page by the
//! best angle and crops the border away.
//!
//! # Modules
//!
//! - [`border`]: edge scanning ([`BorderScanner`])
//! - [`search`]: brute-force angle sweep ([`AngleSearch`])
//! - [`rotate`]: rotation primitive with an expanding canvas
//! - [`crop`]: crop rectangle and crop primitive
//! - [`pipeline`]: file-to-file processing
//! - [`config`]: TOML configuration and CLI merging
//! - [`progress`]: stage names and sweep reporters
//! - [`cli`]: command-line arguments and exit codes
//!
//! # Example
//!
//! ```rust,no_run
//! use bwcrop::{CropPipeline, NoopProgress, PipelineConfig};
//! use std::path::Path;
//!
//! let pipeline = CropPipeline::new(PipelineConfig::default());
//! let input = Path::new("scan.tiff");
//! let output = pipeline.default_output_path(input);
//! let result = pipeline.process(input, &output, &NoopProgress).unwrap();
//!
//! println!("Rotated by {} and cropped to {}", result.outcome.best.angle, result.crop_rect);
//! ```

pub mod border;
pub mod cli;
pub mod config;
pub mod crop;
pub mod pipeline;
pub mod progress;
pub mod rotate;
pub mod search;

#[cfg(test)]
mod test_support;

// Border scanning
pub use border::{
    luminance, AxisOrder, BorderScanner, Edge, Rgba16Image, ScanConfig, ScanResult, Thresholds,
};

// Angle search
pub use search::{
    Angle, AngleResult, AngleSearch, AngleSweep, BestResult, NoopProgress, SearchError,
    SearchOptions, SearchOptionsBuilder, SearchOutcome, SearchProgress,
};

// Rotation and crop
pub use crop::{CropError, CropRect};
pub use rotate::{CanvasRotator, Interpolation, Rotator};

// Pipeline
pub use pipeline::{CropPipeline, PipelineConfig, PipelineError, PipelineResult};

// Config and CLI
pub use cli::{exit_codes, Cli};
pub use config::{CliOverrides, Config, ConfigError};

// Progress
pub use progress::{BarReporter, OutputMode, ProcessingStage, TableReporter};
