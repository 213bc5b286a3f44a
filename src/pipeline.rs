//! Deskew-and-crop pipeline
//!
//! Wires the angle search to file I/O:
//!
//! ```text
//! check paths -> decode -> angle search -> rotate (best) -> crop -> encode
//! ```
//!
//! Every failure is terminal for the run; nothing is retried.

use image::{ColorType, DynamicImage, ImageError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cli::exit_codes;
use crate::config::{DEFAULT_OUTPUT_EXTENSION, DEFAULT_OUTPUT_SUFFIX};
use crate::crop::{self, CropError, CropRect};
use crate::progress::ProcessingStage;
use crate::rotate::{CanvasRotator, Rotator};
use crate::search::{AngleSearch, SearchError, SearchOptions, SearchOutcome, SearchProgress};

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Given path is a directory: {0}")]
    InputIsDirectory(PathBuf),

    #[error("Unable to open image file {path}: {source}")]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to decode image file {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    #[error("Angle search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Crop failed: {0}")]
    Crop(#[from] CropError),

    #[error("Failed to save image {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}

impl PipelineError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::InputNotFound(_)
            | PipelineError::InputIsDirectory(_)
            | PipelineError::InputUnreadable { .. } => exit_codes::INPUT_NOT_FOUND,
            PipelineError::OutputExists(_) => exit_codes::OUTPUT_EXISTS,
            PipelineError::Decode { .. }
            | PipelineError::Search(_)
            | PipelineError::Crop(_)
            | PipelineError::Encode { .. } => exit_codes::PROCESSING_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub search: SearchOptions,
    /// Appended to the input file stem
    pub output_suffix: String,
    /// Output file extension, which also selects the encoder
    pub output_extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: SearchOutcome,
    /// Crop rectangle on the rotated canvas
    pub crop_rect: CropRect,
    pub original_size: (u32, u32),
    pub cropped_size: (u32, u32),
    pub elapsed_seconds: f64,
}

/// Deskew-and-crop pipeline
pub struct CropPipeline {
    config: PipelineConfig,
}

impl CropPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Default output path: `<stem><suffix>.<extension>` in the working
    /// directory
    pub fn default_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        PathBuf::from(format!(
            "{}{}.{}",
            stem, self.config.output_suffix, self.config.output_extension
        ))
    }

    /// Fail unless `input` is an existing regular file
    pub fn check_input(input: &Path) -> Result<()> {
        let metadata = std::fs::metadata(input).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PipelineError::InputNotFound(input.to_path_buf())
            } else {
                PipelineError::InputUnreadable {
                    path: input.to_path_buf(),
                    source,
                }
            }
        })?;

        if metadata.is_dir() {
            return Err(PipelineError::InputIsDirectory(input.to_path_buf()));
        }
        Ok(())
    }

    /// Fail if `output` would be overwritten
    pub fn check_output(output: &Path) -> Result<()> {
        if output.exists() {
            return Err(PipelineError::OutputExists(output.to_path_buf()));
        }
        Ok(())
    }

    /// Decode an input file
    pub fn load(input: &Path) -> Result<DynamicImage> {
        image::open(input).map_err(|err| match err {
            ImageError::IoError(source) => PipelineError::InputUnreadable {
                path: input.to_path_buf(),
                source,
            },
            source => PipelineError::Decode {
                path: input.to_path_buf(),
                source,
            },
        })
    }

    /// Run the whole pipeline for one file
    #[instrument(skip_all, fields(input = %input.display(), output = %output.display()))]
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        progress: &dyn SearchProgress,
    ) -> Result<PipelineResult> {
        let start = Instant::now();

        Self::check_input(input)?;
        Self::check_output(output)?;

        info!(stage = %ProcessingStage::Loading, "Decoding input");
        let decoded = Self::load(input)?;
        let color = decoded.color();
        let original = decoded.to_rgba16();
        drop(decoded);
        let original_size = original.dimensions();
        debug!(?color, width = original_size.0, height = original_size.1, "Decoded");

        info!(stage = %ProcessingStage::Searching, "Searching for best angle");
        let rotator = CanvasRotator::new(self.config.search.interpolation);
        let search = AngleSearch::with_rotator(self.config.search.clone(), rotator);
        let outcome = search.search(&original, progress)?;

        info!(stage = %ProcessingStage::Rotating, angle = %outcome.best.angle, "Rotating original");
        let rotated = rotator.rotate(&original, outcome.best.angle);

        let crop_rect = outcome.crop_rect();
        info!(stage = %ProcessingStage::Cropping, rect = %crop_rect, "Cropping");
        let cropped = crop::crop(&rotated, crop_rect)?;
        let cropped_size = cropped.dimensions();

        info!(stage = %ProcessingStage::Saving, "Encoding output");
        let encoded = restore_color(DynamicImage::ImageRgba16(cropped), color);
        encoded.save(output).map_err(|source| PipelineError::Encode {
            path: output.to_path_buf(),
            source,
        })?;

        let elapsed_seconds = start.elapsed().as_secs_f64();
        info!(stage = %ProcessingStage::Completed, elapsed_seconds, "Done");

        Ok(PipelineResult {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            outcome,
            crop_rect,
            original_size,
            cropped_size,
            elapsed_seconds,
        })
    }
}

/// Convert the working 16-bit RGBA image back to the input's pixel format
pub fn restore_color(image: DynamicImage, color: ColorType) -> DynamicImage {
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(image.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(image.to_rgba32f()),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::NoopProgress;
    use crate::test_support::bordered;
    use image::{GenericImageView, Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_bordered_rgb(path: &Path, size: u32, border: u32) {
        let page = RgbImage::from_fn(size, size, |x, y| {
            let inside = x >= border && y >= border && x < size - border && y < size - border;
            if inside {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        page.save(path).unwrap();
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            search: SearchOptions::builder().window_degrees(0.0).build(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_output_path() {
        let pipeline = CropPipeline::new(PipelineConfig::default());
        let output = pipeline.default_output_path(Path::new("/scans/page_001.tif"));
        assert_eq!(output, PathBuf::from("page_001-cropped.tiff"));
    }

    #[test]
    fn test_custom_output_naming() {
        let pipeline = CropPipeline::new(PipelineConfig {
            output_suffix: "_deskew".to_string(),
            output_extension: "png".to_string(),
            ..Default::default()
        });
        let output = pipeline.default_output_path(Path::new("scan.tiff"));
        assert_eq!(output, PathBuf::from("scan_deskew.png"));
    }

    // TC-PIP-001: Missing input
    #[test]
    fn test_input_not_found() {
        let result = CropPipeline::check_input(Path::new("/nonexistent/scan.tiff"));
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
        assert_eq!(err.exit_code(), exit_codes::INPUT_NOT_FOUND);
    }

    #[test]
    fn test_input_is_directory() {
        let dir = tempdir().unwrap();
        let result = CropPipeline::check_input(dir.path());
        assert!(matches!(result, Err(PipelineError::InputIsDirectory(_))));
    }

    // TC-PIP-002: Existing output is never overwritten
    #[test]
    fn test_output_exists() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.png");
        let output = dir.path().join("scan-cropped.png");
        write_bordered_rgb(&input, 40, 4);
        std::fs::write(&output, b"keep me").unwrap();

        let pipeline = CropPipeline::new(fast_config());
        let err = pipeline.process(&input, &output, &NoopProgress).unwrap_err();

        assert!(matches!(err, PipelineError::OutputExists(_)));
        assert_eq!(err.exit_code(), exit_codes::OUTPUT_EXISTS);
        assert_eq!(std::fs::read(&output).unwrap(), b"keep me");
    }

    #[test]
    fn test_decode_failure() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("broken.png");
        std::fs::write(&input, b"not a png").unwrap();

        let err = CropPipeline::load(&input).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert_eq!(err.exit_code(), exit_codes::PROCESSING_ERROR);
    }

    // TC-PIP-003: End-to-end crop of an aligned page
    #[test]
    fn test_process_crops_border() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.png");
        let output = dir.path().join("scan-cropped.png");
        write_bordered_rgb(&input, 100, 10);

        let pipeline = CropPipeline::new(fast_config());
        let result = pipeline.process(&input, &output, &NoopProgress).unwrap();

        assert_eq!(result.outcome.trace.len(), 1);
        assert_eq!(
            result.crop_rect,
            CropRect {
                left: 10,
                top: 10,
                right: 90,
                bottom: 90
            }
        );
        assert_eq!(result.original_size, (100, 100));
        assert_eq!(result.cropped_size, (80, 80));

        let saved = image::open(&output).unwrap();
        assert_eq!(saved.dimensions(), (80, 80));
        assert_eq!(saved.color(), ColorType::Rgb8);
        assert_eq!(saved.to_rgb8().get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    // TC-PIP-004: A page with no bright content is kept whole
    #[test]
    fn test_dark_page_saves_full_image() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("dark.png");
        let output = dir.path().join("dark-cropped.png");
        RgbImage::from_pixel(40, 30, Rgb([20, 20, 20]))
            .save(&input)
            .unwrap();

        let pipeline = CropPipeline::new(fast_config());
        let result = pipeline.process(&input, &output, &NoopProgress).unwrap();

        assert!(result.outcome.best.scans.iter().all(|scan| !scan.matched));
        assert_eq!(
            result.crop_rect,
            CropRect {
                left: 0,
                top: 0,
                right: 40,
                bottom: 30
            }
        );
        assert_eq!(result.cropped_size, (40, 30));
        assert_eq!(image::open(&output).unwrap().dimensions(), (40, 30));
    }

    #[test]
    fn test_encode_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scan.png");
        let output = dir.path().join("missing_dir").join("out.png");
        write_bordered_rgb(&input, 40, 4);

        let pipeline = CropPipeline::new(fast_config());
        let err = pipeline.process(&input, &output, &NoopProgress).unwrap_err();

        assert!(matches!(err, PipelineError::Encode { .. }));
        assert_eq!(err.exit_code(), exit_codes::PROCESSING_ERROR);
    }

    #[test]
    fn test_restore_color_types() {
        let working = DynamicImage::ImageRgba16(bordered(8, 8, 1));

        assert_eq!(restore_color(working.clone(), ColorType::L8).color(), ColorType::L8);
        assert_eq!(restore_color(working.clone(), ColorType::Rgb8).color(), ColorType::Rgb8);
        assert_eq!(restore_color(working.clone(), ColorType::L16).color(), ColorType::L16);
        assert_eq!(restore_color(working, ColorType::Rgba16).color(), ColorType::Rgba16);
    }

    #[test]
    fn test_error_display_messages() {
        let err = PipelineError::InputNotFound(PathBuf::from("/scan.tiff"));
        assert!(err.to_string().contains("does not exist"));

        let err = PipelineError::OutputExists(PathBuf::from("out.tiff"));
        assert!(err.to_string().contains("already exists"));

        let err: PipelineError = SearchError::EmptyImage { width: 0, height: 0 }.into();
        assert!(err.to_string().contains("Angle search"));
    }
}
