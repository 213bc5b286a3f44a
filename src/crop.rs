//! Crop primitive
//!
//! Cuts the detected content rectangle out of the rotated page.

use image::imageops;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::border::Rgba16Image;

/// Crop error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CropError {
    #[error("Crop region {0} is empty")]
    EmptyRegion(CropRect),
}

/// Content rectangle; `right` and `bottom` are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Same area with each axis ordered low to high
    ///
    /// Edge scans that never meet their threshold end on the opposite side,
    /// which inverts the rectangle; ordering turns that into the full span.
    #[must_use]
    pub fn normalized(&self) -> CropRect {
        CropRect {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    /// Restrict the rectangle to a `width` x `height` canvas
    #[must_use]
    pub fn clamp_to(&self, width: u32, height: u32) -> CropRect {
        CropRect {
            left: self.left.min(width),
            top: self.top.min(height),
            right: self.right.min(width),
            bottom: self.bottom.min(height),
        }
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Copy `rect` out of `image`, normalized and clamped to the image bounds
pub fn crop(image: &Rgba16Image, rect: CropRect) -> Result<Rgba16Image, CropError> {
    let clamped = rect.normalized().clamp_to(image.width(), image.height());
    if clamped.is_empty() {
        return Err(CropError::EmptyRegion(rect));
    }

    Ok(imageops::crop_imm(
        image,
        clamped.left,
        clamped.top,
        clamped.width(),
        clamped.height(),
    )
    .to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bordered, solid, BLACK, WHITE};

    #[test]
    fn test_rect_dimensions() {
        let rect = CropRect {
            left: 10,
            top: 20,
            right: 90,
            bottom: 70,
        };
        assert_eq!(rect.width(), 80);
        assert_eq!(rect.height(), 50);
        assert!(!rect.is_empty());
    }

    #[test]
    fn test_inverted_rect_is_empty() {
        let rect = CropRect {
            left: 50,
            top: 0,
            right: 10,
            bottom: 30,
        };
        assert_eq!(rect.width(), 0);
        assert!(rect.is_empty());

        let ordered = rect.normalized();
        assert_eq!((ordered.left, ordered.right), (10, 50));
        assert_eq!(ordered.width(), 40);
    }

    // TC-CRP-001: Unmatched scans invert the rectangle; crop takes the full span
    #[test]
    fn test_crop_inverted_rect_takes_full_canvas() {
        let page = solid(40, 30, BLACK);
        let rect = CropRect {
            left: 40,
            top: 30,
            right: 0,
            bottom: 0,
        };

        let cropped = crop(&page, rect).unwrap();
        assert_eq!(cropped.dimensions(), (40, 30));
    }

    #[test]
    fn test_crop_removes_border() {
        let page = bordered(100, 100, 10);
        let rect = CropRect {
            left: 10,
            top: 10,
            right: 90,
            bottom: 90,
        };

        let cropped = crop(&page, rect).unwrap();
        assert_eq!(cropped.dimensions(), (80, 80));
        assert!(cropped.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let page = bordered(40, 30, 2);
        let rect = CropRect {
            left: 0,
            top: 0,
            right: 400,
            bottom: 300,
        };

        let cropped = crop(&page, rect).unwrap();
        assert_eq!(cropped.dimensions(), (40, 30));
    }

    #[test]
    fn test_crop_empty_region_error() {
        let page = bordered(40, 30, 2);
        let rect = CropRect {
            left: 20,
            top: 5,
            right: 20,
            bottom: 25,
        };

        assert_eq!(crop(&page, rect), Err(CropError::EmptyRegion(rect)));
    }

    #[test]
    fn test_display() {
        let rect = CropRect {
            left: 1,
            top: 2,
            right: 3,
            bottom: 4,
        };
        assert_eq!(rect.to_string(), "(1, 2)-(3, 4)");
        assert!(CropError::EmptyRegion(rect).to_string().contains("empty"));
    }
}
