//! Border scanner core types
//!
//! Contains the typed scan configuration and the per-edge scan result.

use image::{ImageBuffer, Rgba};
use serde::Serialize;

// ============================================================
// Constants
// ============================================================

/// Default luminance threshold (0-256 scale)
pub const DEFAULT_LUMINANCE_THRESHOLD: u32 = 75;

/// Default percentage threshold (0-100)
pub const DEFAULT_PERCENTAGE_THRESHOLD: u32 = 33;

/// Highest luminance a 16-bit white pixel can produce after normalization
pub const MAX_LUMINANCE: u32 = 256;

/// 16-bit RGBA raster the scanner reads from
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

// ============================================================
// Core Data Structures
// ============================================================

/// Which image axis the primary scan coordinate walks along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisOrder {
    /// Primary coordinate is x, secondary is y (column scan)
    PrimaryX,
    /// Primary coordinate is y, secondary is x (row scan)
    PrimaryY,
}

impl AxisOrder {
    /// Resolve a (primary, secondary) pair into (x, y)
    #[inline]
    pub fn to_xy(self, primary: i64, secondary: i64) -> (i64, i64) {
        match self {
            AxisOrder::PrimaryX => (primary, secondary),
            AxisOrder::PrimaryY => (secondary, primary),
        }
    }
}

/// Image edge scanned inward by one border scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// All edges in reporting order
    pub fn all() -> [Edge; 4] {
        [Edge::Top, Edge::Right, Edge::Bottom, Edge::Left]
    }

    /// Whether the scan for this edge walks back toward the origin
    pub fn is_far(self) -> bool {
        matches!(self, Edge::Right | Edge::Bottom)
    }

    /// Convert a scan result into a crop-rectangle coordinate.
    ///
    /// Far edges become exclusive bounds, so a matched row or column is
    /// reported one past its index, but never past the line the scan
    /// started on (the canvas dimension).
    pub fn boundary(self, scan: &ScanResult, config: &ScanConfig) -> u32 {
        let position = if self.is_far() && scan.matched {
            (scan.position + 1).min(config.primary_start)
        } else {
            scan.position
        };
        position.max(0) as u32
    }
}

/// Luminance and percentage thresholds shared by the four edge scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimum luminance (0-256) for a pixel to count as content
    pub luminance: u32,
    /// Minimum share (0-100) of content pixels for a line to be the boundary
    pub percentage: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            luminance: DEFAULT_LUMINANCE_THRESHOLD,
            percentage: DEFAULT_PERCENTAGE_THRESHOLD,
        }
    }
}

/// One directional sweep over the image
///
/// Both ranges are inclusive of their stop value. Steps must be non-zero and
/// point from start toward stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub primary_start: i64,
    pub primary_stop: i64,
    pub primary_step: i64,
    pub secondary_start: i64,
    pub secondary_stop: i64,
    pub secondary_step: i64,
    pub axis_order: AxisOrder,
    pub luminance_threshold: u32,
    pub percentage_threshold: u32,
}

impl ScanConfig {
    /// Build the scan for one edge of a `width` x `height` image
    pub fn for_edge(edge: Edge, width: u32, height: u32, thresholds: Thresholds) -> Self {
        let (w, h) = (i64::from(width), i64::from(height));
        let (primary_start, primary_stop, primary_step, secondary_stop, axis_order) = match edge {
            Edge::Top => (0, h, 1, w, AxisOrder::PrimaryY),
            Edge::Left => (0, w, 1, h, AxisOrder::PrimaryX),
            Edge::Bottom => (h, 0, -1, w, AxisOrder::PrimaryY),
            Edge::Right => (w, 0, -1, h, AxisOrder::PrimaryX),
        };

        Self {
            primary_start,
            primary_stop,
            primary_step,
            secondary_start: 0,
            secondary_stop,
            secondary_step: 1,
            axis_order,
            luminance_threshold: thresholds.luminance,
            percentage_threshold: thresholds.percentage,
        }
    }

    /// Whether the primary coordinate has reached its terminal boundary
    #[inline]
    pub fn primary_exhausted(&self, pos: i64) -> bool {
        if self.primary_step > 0 {
            pos >= self.primary_stop
        } else {
            pos <= self.primary_stop
        }
    }

    /// Whether a secondary coordinate is still inside its range
    #[inline]
    pub fn secondary_in_range(&self, pos: i64) -> bool {
        if self.secondary_step > 0 {
            pos <= self.secondary_stop
        } else {
            pos >= self.secondary_stop
        }
    }
}

/// Outcome of one border scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Primary coordinate where the scan stopped
    pub position: i64,
    /// Match percentage of the last scanned line
    pub percentage: u32,
    /// Whether the percentage threshold was met (false = ran to the stop edge)
    pub matched: bool,
}
