// SPDX-License-Identifier: GPL-3.0-only

//! Image primitives shared by every pipeline stage
//!
//! An [`Image`] is an immutable RGBA buffer of normalized `f32` samples
//! (straight alpha) positioned at an integer [`Extent`]. Cloning is cheap:
//! the pixel storage is reference counted, which also lets caches be checked
//! for identity with [`Image::ptr_eq`].
//!
//! Most stages preserve the extent. Blurs and bloom can grow it by their
//! kernel reach, the same way an unbounded filter graph would; the frame
//! compositor crops the result back to the input extent.

pub mod blend;
pub mod kernels;

use crate::constants::LUMA_WEIGHTS;
use image::{ImageBuffer, Luma, Rgba, Rgba32FImage, RgbaImage};
use rayon::prelude::*;
use std::sync::Arc;

/// Single-channel `f32` buffer used for blend masks (1.0 = keep sharp)
pub type Mask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Rectangular bounds of an image in pipeline space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Extent anchored at the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Grow the extent by `by` pixels on every side
    pub fn outset(&self, by: u32) -> Self {
        Self::new(
            self.x - by as i32,
            self.y - by as i32,
            self.width + 2 * by,
            self.height + 2 * by,
        )
    }

    /// Overlapping region of two extents, `None` when they do not touch
    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Extent::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Centre point in pipeline coordinates
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

/// Immutable RGBA image with a position in pipeline space
#[derive(Clone)]
pub struct Image {
    pixels: Arc<Rgba32FImage>,
    origin: (i32, i32),
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image({:?})", self.extent())
    }
}

impl Image {
    /// Wrap a buffer anchored at the origin
    pub fn new(pixels: Rgba32FImage) -> Self {
        Self::with_origin(pixels, 0, 0)
    }

    pub fn with_origin(pixels: Rgba32FImage, x: i32, y: i32) -> Self {
        Self {
            pixels: Arc::new(pixels),
            origin: (x, y),
        }
    }

    /// Image of a single colour covering `extent`
    pub fn solid(extent: Extent, color: [f32; 4]) -> Self {
        let pixels = Rgba32FImage::from_pixel(extent.width, extent.height, Rgba(color));
        Self::with_origin(pixels, extent.x, extent.y)
    }

    /// Convert an 8-bit RGBA image into normalized samples
    pub fn from_rgba8(source: &RgbaImage) -> Self {
        let data: Vec<f32> = source.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self::new(buffer_from_raw(source.width(), source.height(), data))
    }

    /// Quantize back to 8-bit RGBA
    pub fn to_rgba8(&self) -> RgbaImage {
        let data: Vec<u8> = self
            .pixels
            .as_raw()
            .iter()
            .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect();
        RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }

    pub fn extent(&self) -> Extent {
        Extent::new(
            self.origin.0,
            self.origin.1,
            self.pixels.width(),
            self.pixels.height(),
        )
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.extent().is_empty()
    }

    /// Underlying sample buffer (local coordinates)
    pub fn pixels(&self) -> &Rgba32FImage {
        &self.pixels
    }

    /// True when both images share the same pixel storage
    pub fn ptr_eq(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels) && self.origin == other.origin
    }

    /// Sample at pipeline coordinates, `None` outside the extent
    pub fn pixel_at(&self, x: i32, y: i32) -> Option<[f32; 4]> {
        let lx = x - self.origin.0;
        let ly = y - self.origin.1;
        if lx < 0 || ly < 0 || lx >= self.width() as i32 || ly >= self.height() as i32 {
            return None;
        }
        Some(self.pixels.get_pixel(lx as u32, ly as u32).0)
    }

    /// Same pixels, new position
    pub fn translated_to(&self, x: i32, y: i32) -> Image {
        Self {
            pixels: Arc::clone(&self.pixels),
            origin: (x, y),
        }
    }

    /// Apply a colour transform to every pixel, alpha untouched
    pub fn map_rgb<F>(&self, f: F) -> Image
    where
        F: Fn([f32; 3]) -> [f32; 3] + Sync,
    {
        self.map_pixels(|_, _, px| {
            let [r, g, b] = f([px[0], px[1], px[2]]);
            [r, g, b, px[3]]
        })
    }

    /// Apply a per-pixel transform that also receives local coordinates
    pub fn map_pixels<F>(&self, f: F) -> Image
    where
        F: Fn(u32, u32, [f32; 4]) -> [f32; 4] + Sync,
    {
        let pixels = map_rows(&self.pixels, f);
        Self::with_origin(pixels, self.origin.0, self.origin.1)
    }

    /// Re-window the image to exactly `target`
    ///
    /// Pixels of `target` outside the current extent come out transparent.
    pub fn cropped(&self, target: Extent) -> Image {
        if target == self.extent() {
            return self.clone();
        }

        let mut out = Rgba32FImage::new(target.width, target.height);
        if let Some(overlap) = self.extent().intersection(&target) {
            let src_x = (overlap.x - self.origin.0) as u32;
            let src_y = (overlap.y - self.origin.1) as u32;
            let dst_x = (overlap.x - target.x) as u32;
            let dst_y = (overlap.y - target.y) as u32;
            for row in 0..overlap.height {
                for col in 0..overlap.width {
                    let px = *self.pixels.get_pixel(src_x + col, src_y + row);
                    out.put_pixel(dst_x + col, dst_y + row, px);
                }
            }
        }

        Self::with_origin(out, target.x, target.y)
    }

    /// Mean and standard deviation of Rec.601 luma
    pub fn luma_stats(&self) -> (f32, f32) {
        let count = (self.width() as usize * self.height() as usize).max(1) as f64;
        let (sum, sum_sq) = self
            .pixels
            .pixels()
            .map(|p| luma([p[0], p[1], p[2]]) as f64)
            .fold((0.0f64, 0.0f64), |(s, sq), l| (s + l, sq + l * l));
        let mean = sum / count;
        let variance = (sum_sq / count - mean * mean).max(0.0);
        (mean as f32, variance.sqrt() as f32)
    }
}

/// Rec.601 luma of a linear RGB triple
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

/// Hermite interpolation between two edges
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Build an `Rgba32FImage` from a buffer whose length is known to match
pub(crate) fn buffer_from_raw(width: u32, height: u32, data: Vec<f32>) -> Rgba32FImage {
    Rgba32FImage::from_raw(width, height, data).unwrap_or_else(|| Rgba32FImage::new(width, height))
}

/// Row-parallel per-pixel transform
pub(crate) fn map_rows<F>(source: &Rgba32FImage, f: F) -> Rgba32FImage
where
    F: Fn(u32, u32, [f32; 4]) -> [f32; 4] + Sync,
{
    let (width, height) = source.dimensions();
    let stride = width as usize * 4;
    let input = source.as_raw();
    let mut output = vec![0.0f32; input.len()];

    if stride > 0 && height > 0 {
        output
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row_out)| {
                let row_in = &input[y * stride..(y + 1) * stride];
                for x in 0..width as usize {
                    let i = x * 4;
                    let px = [row_in[i], row_in[i + 1], row_in[i + 2], row_in[i + 3]];
                    row_out[i..i + 4].copy_from_slice(&f(x as u32, y as u32, px));
                }
            });
    }

    buffer_from_raw(width, height, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_intersection() {
        let a = Extent::new(0, 0, 100, 100);
        let b = Extent::new(50, -10, 100, 30);
        assert_eq!(a.intersection(&b), Some(Extent::new(50, 0, 50, 20)));
        assert_eq!(a.intersection(&Extent::new(200, 200, 5, 5)), None);
    }

    #[test]
    fn test_outset_is_symmetric() {
        let e = Extent::from_size(10, 20).outset(3);
        assert_eq!(e, Extent::new(-3, -3, 16, 26));
        assert_eq!(e.center(), (5.0, 10.0));
    }

    #[test]
    fn test_cropped_pads_with_transparent() {
        let image = Image::solid(Extent::from_size(4, 4), [1.0, 0.0, 0.0, 1.0]);
        let cropped = image.cropped(Extent::new(2, 2, 4, 4));
        assert_eq!(cropped.extent(), Extent::new(2, 2, 4, 4));
        assert_eq!(cropped.pixel_at(3, 3), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(cropped.pixel_at(5, 5), Some([0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_cropped_same_extent_shares_storage() {
        let image = Image::solid(Extent::from_size(4, 4), [0.5; 4]);
        assert!(image.cropped(image.extent()).ptr_eq(&image));
    }

    #[test]
    fn test_rgba8_round_trip_keeps_values() {
        let source = RgbaImage::from_pixel(3, 2, Rgba([10, 128, 250, 255]));
        let image = Image::from_rgba8(&source);
        assert_eq!(image.to_rgba8(), source);
    }

    #[test]
    fn test_luma_stats_of_flat_image() {
        let image = Image::solid(Extent::from_size(8, 8), [0.5, 0.5, 0.5, 1.0]);
        let (mean, std) = image.luma_stats();
        assert!((mean - 0.5).abs() < 1e-5);
        assert!(std < 1e-4);
    }
}
