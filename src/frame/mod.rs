// SPDX-License-Identifier: GPL-3.0-only

//! Frame source types
//!
//! Everything the camera side hands to the pipeline: raw pixel buffers,
//! which camera produced them, how they are oriented, plus the user's focus
//! point and the optional subject mask from segmentation.

mod orientation;

pub use orientation::CaptureOrientation;

use crate::errors::PipelineError;
use crate::imaging::{Image, Mask, buffer_from_raw};
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Byte layout of a 32-bit pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// R G B A byte order
    #[default]
    RGBA,
    /// B G R A byte order (native camera output on most phones)
    BGRA,
}

impl PixelFormat {
    /// Byte offsets of R, G, B and A within a pixel
    fn channel_offsets(&self) -> [usize; 4] {
        match self {
            PixelFormat::RGBA => [0, 1, 2, 3],
            PixelFormat::BGRA => [2, 1, 0, 3],
        }
    }
}

/// Raw 8-bit frame from the camera
///
/// Rows may be padded: `stride` is the distance in bytes between rows.
#[derive(Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PixelBuffer({}x{}, stride {}, {:?}, {} bytes)",
            self.width,
            self.height,
            self.stride,
            self.format,
            self.data.len()
        )
    }
}

impl PixelBuffer {
    /// Wrap frame bytes after checking the layout
    pub fn new(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> Result<Self, PipelineError> {
        let data = data.into();
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidBuffer(format!(
                "empty frame {}x{}",
                width, height
            )));
        }
        let row_bytes = width as usize * 4;
        if stride < row_bytes {
            return Err(PipelineError::InvalidBuffer(format!(
                "stride {} shorter than row of {} bytes",
                stride, row_bytes
            )));
        }
        let needed = stride * (height as usize - 1) + row_bytes;
        if data.len() < needed {
            return Err(PipelineError::InvalidBuffer(format!(
                "expected at least {} bytes, got {}",
                needed,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// Tightly packed RGBA buffer from an 8-bit image
    pub fn from_rgba8(image: &image::RgbaImage) -> Result<Self, PipelineError> {
        let (width, height) = image.dimensions();
        Self::new(
            width,
            height,
            width as usize * 4,
            PixelFormat::RGBA,
            image.as_raw().as_slice(),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Repack as straight RGBA 8-bit, dropping row padding
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let [r, g, b, a] = self.format.channel_offsets();
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for row in self.data.chunks(self.stride).take(self.height as usize) {
            for px in row[..self.width as usize * 4].chunks_exact(4) {
                out.extend_from_slice(&[px[r], px[g], px[b], px[a]]);
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, out)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Normalized image, oriented for display
    pub fn to_image(&self, orientation: CaptureOrientation) -> Image {
        let [r, g, b, a] = self.format.channel_offsets();
        let mut samples = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for row in self.data.chunks(self.stride).take(self.height as usize) {
            for px in row[..self.width as usize * 4].chunks_exact(4) {
                samples.extend_from_slice(&[
                    px[r] as f32 / 255.0,
                    px[g] as f32 / 255.0,
                    px[b] as f32 / 255.0,
                    px[a] as f32 / 255.0,
                ]);
            }
        }
        let pixels = buffer_from_raw(self.width, self.height, samples);
        Image::new(orientation.apply(&pixels))
    }
}

/// Physical camera the frame came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraPosition {
    #[default]
    Back,
    Front,
}

impl std::fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraPosition::Back => write!(f, "back"),
            CameraPosition::Front => write!(f, "front"),
        }
    }
}

/// One frame delivered by the camera
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub buffer: PixelBuffer,
    pub position: CameraPosition,
    /// Explicit orientation; derived from `position` when `None`
    pub orientation: Option<CaptureOrientation>,
    pub captured_at: Instant,
}

impl FrameInput {
    pub fn new(buffer: PixelBuffer, position: CameraPosition) -> Self {
        Self {
            buffer,
            position,
            orientation: None,
            captured_at: Instant::now(),
        }
    }

    pub fn with_orientation(mut self, orientation: CaptureOrientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Orientation to apply, falling back to the camera position policy
    pub fn resolved_orientation(&self, mirror_front: bool) -> CaptureOrientation {
        self.orientation
            .unwrap_or_else(|| CaptureOrientation::for_position(self.position, mirror_front))
    }
}

/// Normalized focus location, origin at the top-left of the oriented frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    x: f32,
    y: f32,
}

impl FocusPoint {
    /// Clamp both coordinates into [0, 1]; non-finite values become 0.5
    pub fn new(x: f32, y: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            x: clamp(x),
            y: clamp(y),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    /// Parse `"x,y"`
    pub fn parse(text: &str) -> Option<Self> {
        let (x, y) = text.split_once(',')?;
        let x = x.trim().parse::<f32>().ok()?;
        let y = y.trim().parse::<f32>().ok()?;
        Some(Self::new(x, y))
    }
}

impl Default for FocusPoint {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

/// Person/subject matte from segmentation (1.0 = subject)
///
/// Produced in the orientation of the raw buffer it was computed from.
#[derive(Debug, Clone)]
pub struct SubjectMask {
    mask: Arc<Mask>,
}

impl SubjectMask {
    pub fn new(mask: Mask) -> Self {
        Self {
            mask: Arc::new(mask),
        }
    }

    /// Build from an 8-bit grayscale matte
    pub fn from_luma8(matte: &image::GrayImage) -> Self {
        let (w, h) = matte.dimensions();
        let samples = matte.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        Self::new(Mask::from_raw(w, h, samples).unwrap_or_else(|| Mask::new(w, h)))
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    /// Re-lay out like the frame it was computed from
    pub fn oriented(&self, orientation: CaptureOrientation) -> SubjectMask {
        if orientation == CaptureOrientation::Up {
            return self.clone();
        }
        Self::new(orientation.apply(self.mask.as_ref()))
    }

    /// Resample bilinearly to `width` x `height`
    pub fn scaled_to(&self, width: u32, height: u32) -> Mask {
        if self.mask.dimensions() == (width, height) {
            return self.mask.as_ref().clone();
        }
        imageops::resize(self.mask.as_ref(), width, height, FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    #[test]
    fn test_pixel_buffer_rejects_short_data() {
        let err = PixelBuffer::new(4, 4, 16, PixelFormat::RGBA, vec![0u8; 40]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidBuffer(_)));
    }

    #[test]
    fn test_pixel_buffer_rejects_small_stride() {
        assert!(PixelBuffer::new(4, 1, 8, PixelFormat::RGBA, vec![0u8; 16]).is_err());
    }

    #[test]
    fn test_bgra_with_padding_converts_to_rgba() {
        // 2x2 BGRA, stride 12 (4 bytes of padding per row)
        let mut data = vec![0u8; 24];
        data[0..4].copy_from_slice(&[10, 20, 30, 255]);
        data[12..16].copy_from_slice(&[1, 2, 3, 255]);
        let buffer = PixelBuffer::new(2, 2, 12, PixelFormat::BGRA, data).unwrap();
        let rgba = buffer.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([30, 20, 10, 255]));
        assert_eq!(rgba.get_pixel(0, 1), &Rgba([3, 2, 1, 255]));
    }

    #[test]
    fn test_to_image_applies_orientation() {
        let mut source = RgbaImage::new(2, 1);
        source.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let buffer = PixelBuffer::from_rgba8(&source).unwrap();
        let image = buffer.to_image(CaptureOrientation::UpMirrored);
        assert_eq!(image.pixel_at(1, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(image.pixel_at(0, 0), Some([0.0, 0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_focus_point_is_clamped() {
        let p = FocusPoint::new(-0.5, 3.0);
        assert_eq!((p.x(), p.y()), (0.0, 1.0));
        let p = FocusPoint::new(f32::NAN, 0.25);
        assert_eq!((p.x(), p.y()), (0.5, 0.25));
        assert_eq!(FocusPoint::parse("0.2, 0.8"), Some(FocusPoint::new(0.2, 0.8)));
        assert_eq!(FocusPoint::parse("nope"), None);
    }

    #[test]
    fn test_subject_mask_fitted_to_frame() {
        let mask = SubjectMask::new(Mask::from_pixel(10, 20, Luma([1.0])));
        let oriented = mask.oriented(CaptureOrientation::Right);
        assert_eq!(oriented.dimensions(), (20, 10));
        let fitted = oriented.scaled_to(40, 20);
        assert_eq!(fitted.dimensions(), (40, 20));
        assert!(fitted.pixels().all(|p| (p[0] - 1.0).abs() < 1e-3));
    }
}
