// SPDX-License-Identifier: MPL-2.0

//! Still capture
//!
//! A still is the last fully composited preview frame, so what the user saw
//! is what gets saved. Before the first frame has been composited the raw
//! camera buffer is returned instead.

use crate::errors::CaptureError;
use crate::frame::PixelBuffer;
use crate::imaging::Image;
use crate::storage::{self, OutputFormat};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a capture request
#[derive(Debug, Clone)]
pub enum CaptureOutput {
    /// The last composited frame, effects included
    Composited(Image),
    /// Unprocessed camera data
    RawStill(PixelBuffer),
}

impl CaptureOutput {
    /// Pick the best still available
    pub fn resolve(
        composited: Option<&Image>,
        raw: Option<&PixelBuffer>,
    ) -> Result<Self, CaptureError> {
        if let Some(image) = composited {
            debug!(extent = ?image.extent(), "Capturing last composited frame");
            return Ok(CaptureOutput::Composited(image.clone()));
        }
        if let Some(buffer) = raw {
            debug!(
                width = buffer.width(),
                height = buffer.height(),
                "No composited frame yet, capturing raw still"
            );
            return Ok(CaptureOutput::RawStill(buffer.clone()));
        }
        Err(CaptureError::NoFrameAvailable)
    }

    pub fn is_composited(&self) -> bool {
        matches!(self, CaptureOutput::Composited(_))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            CaptureOutput::Composited(image) => (image.width(), image.height()),
            CaptureOutput::RawStill(buffer) => (buffer.width(), buffer.height()),
        }
    }

    pub fn to_rgba8(&self) -> RgbaImage {
        match self {
            CaptureOutput::Composited(image) => image.to_rgba8(),
            CaptureOutput::RawStill(buffer) => buffer.to_rgba8(),
        }
    }

    /// Encode and write the still into `dir`
    pub fn save(&self, dir: &Path, format: OutputFormat) -> Result<PathBuf, CaptureError> {
        let path = storage::save_image(&self.to_rgba8(), dir, format)?;
        info!(path = %path.display(), composited = self.is_composited(), "Still saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Extent;

    #[test]
    fn test_prefers_composited() {
        let image = Image::solid(Extent::from_size(3, 2), [1.0; 4]);
        let raw = PixelBuffer::from_rgba8(&RgbaImage::new(5, 5)).unwrap();
        let out = CaptureOutput::resolve(Some(&image), Some(&raw)).unwrap();
        assert!(out.is_composited());
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn test_falls_back_to_raw() {
        let raw = PixelBuffer::from_rgba8(&RgbaImage::new(5, 4)).unwrap();
        let out = CaptureOutput::resolve(None, Some(&raw)).unwrap();
        assert!(!out.is_composited());
        assert_eq!(out.dimensions(), (5, 4));
    }

    #[test]
    fn test_nothing_available() {
        let err = CaptureOutput::resolve(None, None).unwrap_err();
        assert_eq!(err, CaptureError::NoFrameAvailable);
    }
}
