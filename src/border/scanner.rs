//! Line-by-line border scan

use image::Rgba;

use super::types::{Rgba16Image, ScanConfig, ScanResult};

/// Rec. 709 luma weights
const RED_WEIGHT: f64 = 0.2126;
const GREEN_WEIGHT: f64 = 0.7152;
const BLUE_WEIGHT: f64 = 0.0722;

/// Divisor bringing 16-bit weighted sums onto the 8-bit scale
const SAMPLE_SCALE: f64 = 256.0;

/// Luminance of a 16-bit pixel on the 0-256 scale (alpha ignored)
#[inline]
pub fn luminance(pixel: &Rgba<u16>) -> u32 {
    let [r, g, b, _] = pixel.0;
    let weighted =
        RED_WEIGHT * f64::from(r) + GREEN_WEIGHT * f64::from(g) + BLUE_WEIGHT * f64::from(b);
    (weighted / SAMPLE_SCALE).round() as u32
}

/// Pure border scanner; holds no state between calls
pub struct BorderScanner;

impl BorderScanner {
    /// Walk the primary axis until a line's share of bright pixels meets the
    /// percentage threshold, or the primary range is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if either step is zero or `secondary_stop` is zero.
    pub fn scan(image: &Rgba16Image, config: &ScanConfig) -> ScanResult {
        assert!(
            config.primary_step != 0 && config.secondary_step != 0,
            "scan steps must be non-zero"
        );
        assert!(config.secondary_stop != 0, "secondary range must not end at 0");

        let mut pos1 = config.primary_start;
        loop {
            let exceed = Self::count_bright(image, config, pos1);
            let percentage = (exceed * 100 / config.secondary_stop) as u32;

            if percentage >= config.percentage_threshold {
                return ScanResult {
                    position: pos1,
                    percentage,
                    matched: true,
                };
            }

            if config.primary_exhausted(pos1) {
                return ScanResult {
                    position: pos1,
                    percentage,
                    matched: false,
                };
            }

            pos1 += config.primary_step;
        }
    }

    /// Count pixels on one line at or above the luminance threshold
    fn count_bright(image: &Rgba16Image, config: &ScanConfig, pos1: i64) -> i64 {
        let mut exceed = 0;
        let mut pos2 = config.secondary_start;
        while config.secondary_in_range(pos2) {
            let (x, y) = config.axis_order.to_xy(pos1, pos2);
            if Self::sample(image, x, y) >= config.luminance_threshold {
                exceed += 1;
            }
            pos2 += config.secondary_step;
        }
        exceed
    }

    /// Luminance at (x, y); anything outside the raster reads as black
    #[inline]
    fn sample(image: &Rgba16Image, x: i64, y: i64) -> u32 {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return 0;
        };
        image.get_pixel_checked(x, y).map_or(0, luminance)
    }
}
