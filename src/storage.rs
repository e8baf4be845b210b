// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for captured stills

use crate::errors::CaptureError;
use chrono::Local;
use image::RgbaImage;
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JPEG quality used for stills (0-100)
pub const JPEG_QUALITY: u8 = 92;

/// Still file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Guess from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

/// Default directory for stills: `~/Pictures/retro-camera`
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("retro-camera")
}

/// Timestamped file name such as `IMG_20240831_120000.jpg`
pub fn still_file_name(format: OutputFormat) -> String {
    format!(
        "IMG_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write `image` into `dir` under a timestamped name, creating `dir`
pub fn save_image(
    image: &RgbaImage,
    dir: &Path,
    format: OutputFormat,
) -> Result<PathBuf, CaptureError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(still_file_name(format));
    write_image(image, &path, format)?;
    Ok(path)
}

/// Write `image` to exactly `path`
pub fn write_image(image: &RgbaImage, path: &Path, format: OutputFormat) -> Result<(), CaptureError> {
    debug!(path = %path.display(), ?format, width = image.width(), height = image.height(), "Encoding still");
    match format {
        OutputFormat::Jpeg => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| CaptureError::EncodingFailed(e.to_string()))
        }
        OutputFormat::Png => image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| CaptureError::EncodingFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_file_name_pattern() {
        let name = still_file_name(OutputFormat::Png);
        assert!(name.starts_with("IMG_"));
        assert!(name.ends_with(".png"));
        // IMG_ + 8 date digits + _ + 6 time digits + .png
        assert_eq!(name.len(), 4 + 8 + 1 + 6 + 4);
    }

    #[test]
    fn test_save_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("stills");
        let image = RgbaImage::from_pixel(8, 6, Rgba([200, 100, 50, 255]));

        let jpeg = save_image(&image, &dir, OutputFormat::Jpeg).unwrap();
        let decoded = image::open(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));

        let png = dir.join("exact.png");
        write_image(&image, &png, OutputFormat::Png).unwrap();
        assert_eq!(image::open(&png).unwrap().to_rgba8(), image);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPEG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("gif"), None);
    }
}
