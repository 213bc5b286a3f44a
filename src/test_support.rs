//! Synthetic scan fixtures shared by unit tests

use image::Rgba;

use crate::border::Rgba16Image;

pub const WHITE: Rgba<u16> = Rgba([u16::MAX, u16::MAX, u16::MAX, u16::MAX]);
pub const BLACK: Rgba<u16> = Rgba([0, 0, 0, u16::MAX]);

/// White page with a uniform black border `border` pixels wide
pub fn bordered(width: u32, height: u32, border: u32) -> Rgba16Image {
    Rgba16Image::from_fn(width, height, |x, y| {
        let inside = x >= border
            && y >= border
            && x < width.saturating_sub(border)
            && y < height.saturating_sub(border);
        if inside {
            WHITE
        } else {
            BLACK
        }
    })
}

/// Solid-color page
pub fn solid(width: u32, height: u32, color: Rgba<u16>) -> Rgba16Image {
    Rgba16Image::from_pixel(width, height, color)
}
