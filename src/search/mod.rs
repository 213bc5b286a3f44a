//! Angle Search module
//!
//! Brute-force search for the rotation that leaves the least scanner border.
//!
//! # Algorithm
//!
//! 1. Sweep angles downward from `+window` through 0° into `360 - window`
//! 2. Rotate the original page by each angle (black fill)
//! 3. Scan all four edges of the rotated page with [`BorderScanner`]
//! 4. Sum the four edge match percentages into a border cost
//! 5. Keep the angle with the lowest cost; ties keep the earlier angle
//!
//! # Example
//!
//! ```rust,no_run
//! use bwcrop::search::{AngleSearch, NoopProgress, SearchOptions};
//!
//! let page = image::open("scan.tiff").unwrap().to_rgba16();
//! let search = AngleSearch::new(SearchOptions::default());
//! let outcome = search.search(&page, &NoopProgress).unwrap();
//!
//! println!("Best angle: {} (cost {})", outcome.best.angle, outcome.best.total);
//! ```

mod angle;

pub use angle::{Angle, AngleSweep, FULL_TURN, MAX_WINDOW};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::border::{
    BorderScanner, Edge, Rgba16Image, ScanConfig, ScanResult, Thresholds,
    DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_PERCENTAGE_THRESHOLD, MAX_LUMINANCE,
};
use crate::crop::CropRect;
use crate::rotate::{CanvasRotator, Interpolation, Rotator};

// ============================================================
// Constants
// ============================================================

/// Default sweep half-width in degrees
pub const DEFAULT_WINDOW_DEGREES: f64 = 1.0;

/// Default sweep step in degrees
pub const DEFAULT_STEP_DEGREES: f64 = 0.01;

/// Half-width for badly skewed scans
const WIDE_WINDOW_DEGREES: f64 = 3.0;

/// Step for quick previews
const COARSE_STEP_DEGREES: f64 = 0.1;

/// Smallest representable step
const MIN_STEP_DEGREES: f64 = 0.01;

/// Largest window that still leaves the sweep
const MAX_WINDOW_DEGREES: f64 = MAX_WINDOW as f64 / 100.0;

// ============================================================
// Errors
// ============================================================

/// Angle search error types
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Image has no pixels to scan ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Rotation by {angle} produced an empty image")]
    EmptyRotation { angle: Angle },
}

pub type Result<T> = std::result::Result<T, SearchError>;

// ============================================================
// Options
// ============================================================

/// Angle search options
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Minimum luminance (0-256) for a pixel to count as content
    pub luminance_threshold: u32,
    /// Minimum share (0-100) of content pixels that ends an edge scan
    pub percentage_threshold: u32,
    /// Sweep half-width in degrees
    pub window_degrees: f64,
    /// Sweep step in degrees
    pub step_degrees: f64,
    /// Sampling used by the rotation primitive
    pub interpolation: Interpolation,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            luminance_threshold: DEFAULT_LUMINANCE_THRESHOLD,
            percentage_threshold: DEFAULT_PERCENTAGE_THRESHOLD,
            window_degrees: DEFAULT_WINDOW_DEGREES,
            step_degrees: DEFAULT_STEP_DEGREES,
            interpolation: Interpolation::default(),
        }
    }
}

impl SearchOptions {
    /// Create a new options builder
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }

    /// Create options for pages skewed by up to 3 degrees
    pub fn wide() -> Self {
        Self {
            window_degrees: WIDE_WINDOW_DEGREES,
            ..Default::default()
        }
    }

    /// Create options for a fast, 0.1 degree sweep
    pub fn coarse() -> Self {
        Self {
            step_degrees: COARSE_STEP_DEGREES,
            interpolation: Interpolation::Nearest,
            ..Default::default()
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            luminance: self.luminance_threshold,
            percentage: self.percentage_threshold,
        }
    }

    /// Angles this search will evaluate, in order
    pub fn sweep(&self) -> AngleSweep {
        let window = (self.window_degrees.clamp(0.0, MAX_WINDOW_DEGREES) * 100.0).round() as u32;
        let step = (self.step_degrees.max(MIN_STEP_DEGREES) * 100.0).round() as u32;
        AngleSweep::new(window, step)
    }
}

/// Builder for SearchOptions
#[derive(Debug, Default)]
pub struct SearchOptionsBuilder {
    options: SearchOptions,
}

impl SearchOptionsBuilder {
    /// Set luminance threshold (0-256)
    #[must_use]
    pub fn luminance_threshold(mut self, threshold: u32) -> Self {
        self.options.luminance_threshold = threshold.min(MAX_LUMINANCE);
        self
    }

    /// Set percentage threshold
    ///
    /// Values above 100 are kept; they make every edge scan run to the
    /// opposite side.
    #[must_use]
    pub fn percentage_threshold(mut self, threshold: u32) -> Self {
        self.options.percentage_threshold = threshold;
        self
    }

    /// Set sweep half-width in degrees
    #[must_use]
    pub fn window_degrees(mut self, degrees: f64) -> Self {
        self.options.window_degrees = degrees.abs().min(MAX_WINDOW_DEGREES);
        self
    }

    /// Set sweep step in degrees (at least 0.01)
    #[must_use]
    pub fn step_degrees(mut self, degrees: f64) -> Self {
        self.options.step_degrees = degrees.abs().max(MIN_STEP_DEGREES);
        self
    }

    #[must_use]
    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.options.interpolation = interpolation;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> SearchOptions {
        self.options
    }
}

// ============================================================
// Results
// ============================================================

/// Border measurement of the page rotated by one angle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AngleResult {
    pub angle: Angle,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
    /// Sum of the four edge match percentages (lower is better)
    pub total: u32,
    /// Size of the rotated canvas the edges refer to
    pub canvas: (u32, u32),
    /// Raw scans in top, right, bottom, left order
    pub scans: [ScanResult; 4],
}

impl AngleResult {
    /// Content rectangle on the rotated canvas, each axis ordered
    pub fn crop_rect(&self) -> CropRect {
        CropRect {
            left: self.left,
            top: self.top,
            right: self.right,
            bottom: self.bottom,
        }
        .normalized()
    }
}

/// Running minimum over evaluated angles
#[derive(Debug, Clone, Default)]
pub struct BestResult {
    best: Option<AngleResult>,
}

impl BestResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a result; returns true if it became the new best.
    ///
    /// The first result is always taken; later ones only on a strictly lower
    /// total.
    pub fn observe(&mut self, result: &AngleResult) -> bool {
        let better = self
            .best
            .as_ref()
            .map_or(true, |best| result.total < best.total);
        if better {
            self.best = Some(result.clone());
        }
        better
    }

    pub fn get(&self) -> Option<&AngleResult> {
        self.best.as_ref()
    }

    pub fn total(&self) -> Option<u32> {
        self.best.as_ref().map(|best| best.total)
    }

    pub fn into_inner(self) -> Option<AngleResult> {
        self.best
    }
}

/// Search output: the winner plus every evaluated angle in order
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub best: AngleResult,
    pub trace: Vec<AngleResult>,
}

impl SearchOutcome {
    pub fn crop_rect(&self) -> CropRect {
        self.best.crop_rect()
    }
}

// ============================================================
// Progress
// ============================================================

/// Observer for sweep progress
pub trait SearchProgress {
    /// Called once before the first angle
    fn on_sweep_start(&self, _angle_count: usize) {}

    /// Called after each angle is measured
    fn on_angle(&self, _result: &AngleResult) {}

    /// Called once with the winner
    fn on_sweep_complete(&self, _best: &AngleResult) {}
}

/// Progress observer that ignores everything
pub struct NoopProgress;

impl SearchProgress for NoopProgress {}

// ============================================================
// Search
// ============================================================

/// Exhaustive angle search over a rotation primitive
pub struct AngleSearch<R = CanvasRotator> {
    options: SearchOptions,
    rotator: R,
}

impl AngleSearch<CanvasRotator> {
    /// Search with the default `imageproc` rotator
    pub fn new(options: SearchOptions) -> Self {
        let rotator = CanvasRotator::new(options.interpolation);
        Self { options, rotator }
    }
}

impl<R: Rotator> AngleSearch<R> {
    /// Search with a custom rotation primitive
    pub fn with_rotator(options: SearchOptions, rotator: R) -> Self {
        Self { options, rotator }
    }

    /// Scan the four edges of an already rotated page
    pub fn measure(rotated: &Rgba16Image, angle: Angle, thresholds: Thresholds) -> AngleResult {
        let (width, height) = rotated.dimensions();
        let edges = Edge::all();
        let configs = edges.map(|edge| ScanConfig::for_edge(edge, width, height, thresholds));
        let scans = configs.map(|config| BorderScanner::scan(rotated, &config));
        let [top, right, bottom, left] =
            [0, 1, 2, 3].map(|i| edges[i].boundary(&scans[i], &configs[i]));

        AngleResult {
            angle,
            top,
            right,
            bottom,
            left,
            total: scans.iter().map(|scan| scan.percentage).sum(),
            canvas: (width, height),
            scans,
        }
    }

    /// Rotate the original page by `angle` and measure its border
    pub fn evaluate(&self, image: &Rgba16Image, angle: Angle) -> Result<AngleResult> {
        let rotated = self.rotator.rotate(image, angle);
        if rotated.width() == 0 || rotated.height() == 0 {
            return Err(SearchError::EmptyRotation { angle });
        }
        Ok(Self::measure(&rotated, angle, self.options.thresholds()))
    }

    /// Run the full sweep
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn search(
        &self,
        image: &Rgba16Image,
        progress: &dyn SearchProgress,
    ) -> Result<SearchOutcome> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SearchError::EmptyImage { width, height });
        }

        let sweep = self.options.sweep();
        let angle_count = sweep.clone().count();
        debug!(angle_count, "Starting angle sweep");
        progress.on_sweep_start(angle_count);

        let mut best = BestResult::new();
        let mut evaluated = Vec::with_capacity(angle_count);

        for angle in sweep {
            let result = self.evaluate(image, angle)?;
            trace!(
                angle = %result.angle,
                total = result.total,
                top = result.top,
                right = result.right,
                bottom = result.bottom,
                left = result.left,
                "Measured angle"
            );
            progress.on_angle(&result);
            if best.observe(&result) {
                debug!(angle = %result.angle, total = result.total, "New best angle");
            }
            evaluated.push(result);
        }

        // The sweep always yields its starting angle
        let best = best.into_inner().ok_or(SearchError::EmptyImage { width, height })?;

        info!(angle = %best.angle, total = best.total, "Angle sweep complete");
        progress.on_sweep_complete(&best);

        Ok(SearchOutcome {
            best,
            trace: evaluated,
        })
    }
}
