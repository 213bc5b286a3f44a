//! Border Detection module
//!
//! Finds where the black scanner border ends on each side of an image.
//!
//! # Algorithm
//!
//! 1. Walk the primary axis inward from one edge, one row or column at a time
//! 2. Count pixels on that line whose luminance meets the luminance threshold
//! 3. Stop at the first line whose bright share meets the percentage threshold,
//!    or at the opposite edge if none does
//!
//! # Example
//!
//! ```rust
//! use bwcrop::border::{BorderScanner, Edge, Rgba16Image, ScanConfig, Thresholds};
//! use image::Rgba;
//!
//! let page = Rgba16Image::from_pixel(40, 30, Rgba([u16::MAX; 4]));
//! let config = ScanConfig::for_edge(Edge::Top, 40, 30, Thresholds::default());
//! let result = BorderScanner::scan(&page, &config);
//! assert_eq!(result.position, 0);
//! assert!(result.matched);
//! ```

mod scanner;
mod types;

pub use scanner::{luminance, BorderScanner};
pub use types::{
    AxisOrder, Edge, Rgba16Image, ScanConfig, ScanResult, Thresholds,
    DEFAULT_LUMINANCE_THRESHOLD, DEFAULT_PERCENTAGE_THRESHOLD, MAX_LUMINANCE,
};
