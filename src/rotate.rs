//! Rotation primitive
//!
//! Rotates a page counter-clockwise about its center onto a canvas grown to
//! fit the rotated corners. Uncovered area is filled with opaque black so the
//! border scanner sees it as border.

use clap::ValueEnum;
use image::{imageops, Rgba};
use imageproc::geometric_transformations::{self, warp_into, Projection};
use serde::{Deserialize, Serialize};

use crate::border::Rgba16Image;
use crate::search::Angle;

/// Opaque black fill for uncovered canvas
pub const FILL_BLACK: Rgba<u16> = Rgba([0, 0, 0, u16::MAX]);

/// Fractional overhang above which the rotated canvas gains a pixel
const CANVAS_ROUNDING_SLACK: f64 = 0.1;

/// Rotates a page by a sweep angle
pub trait Rotator {
    /// Rotate `image` counter-clockwise by `angle`, never mutating the input
    fn rotate(&self, image: &Rgba16Image, angle: Angle) -> Rgba16Image;
}

/// Sampling used when a rotated pixel falls between source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest neighbor (fastest)
    Nearest,
    /// Bilinear
    #[default]
    Bilinear,
    /// Bicubic (slowest)
    Bicubic,
}

impl Interpolation {
    fn to_imageproc(self) -> geometric_transformations::Interpolation {
        match self {
            Interpolation::Nearest => geometric_transformations::Interpolation::Nearest,
            Interpolation::Bilinear => geometric_transformations::Interpolation::Bilinear,
            Interpolation::Bicubic => geometric_transformations::Interpolation::Bicubic,
        }
    }

    /// Lowercase name, as accepted in config files
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
        }
    }
}

/// `imageproc`-backed rotator with an expanding canvas
#[derive(Debug, Clone, Copy)]
pub struct CanvasRotator {
    pub interpolation: Interpolation,
    pub fill: Rgba<u16>,
}

impl Default for CanvasRotator {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::default(),
            fill: FILL_BLACK,
        }
    }
}

impl CanvasRotator {
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            interpolation,
            ..Default::default()
        }
    }
}

impl Rotator for CanvasRotator {
    fn rotate(&self, image: &Rgba16Image, angle: Angle) -> Rgba16Image {
        // Quarter turns are exact; imageops rotations run clockwise
        match angle.hundredths() {
            0 => return image.clone(),
            9_000 => return imageops::rotate270(image),
            18_000 => return imageops::rotate180(image),
            27_000 => return imageops::rotate90(image),
            _ => {}
        }

        let (width, height) = image.dimensions();
        let (out_w, out_h) = rotated_size(width, height, angle.degrees());
        let mut out = Rgba16Image::from_pixel(out_w, out_h, self.fill);
        if out_w == 0 || out_h == 0 {
            return out;
        }

        let src_center = (width as f32 / 2.0 - 0.5, height as f32 / 2.0 - 0.5);
        let dst_center = (out_w as f32 / 2.0 - 0.5, out_h as f32 / 2.0 - 0.5);
        let theta = -(angle.degrees().to_radians() as f32);
        let projection = Projection::translate(dst_center.0, dst_center.1)
            * Projection::rotate(theta)
            * Projection::translate(-src_center.0, -src_center.1);

        warp_into(
            image,
            &projection,
            self.interpolation.to_imageproc(),
            self.fill,
            &mut out,
        );
        out
    }
}

/// Canvas size that holds a `width` x `height` page rotated by `degrees`
pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let (sin, cos) = degrees.to_radians().sin_cos();
    let rotate = |x: f64, y: f64| (x * cos - y * sin, x * sin + y * cos);

    let (w, h) = (f64::from(width - 1), f64::from(height - 1));
    let corners = [(0.0, 0.0), rotate(w, 0.0), rotate(w, h), rotate(0.0, h)];

    let span = |values: [f64; 4]| {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut size = max - min + 1.0;
        if size - size.floor() > CANVAS_ROUNDING_SLACK {
            size += 1.0;
        }
        size as u32
    };

    (
        span(corners.map(|(x, _)| x)),
        span(corners.map(|(_, y)| y)),
    )
}
