// SPDX-License-Identifier: GPL-3.0-only

use super::CameraPosition;
use image::imageops;
use image::{ImageBuffer, Pixel};
use serde::{Deserialize, Serialize};

/// How raw buffer data maps onto the displayed frame (EXIF semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CaptureOrientation {
    /// Displayed as stored
    #[default]
    Up,
    /// Mirrored horizontally
    UpMirrored,
    /// Rotated 180°
    Down,
    /// Mirrored vertically
    DownMirrored,
    /// Needs a 90° counter-clockwise turn
    Left,
    /// Transposed
    LeftMirrored,
    /// Needs a 90° clockwise turn
    Right,
    /// Transversed
    RightMirrored,
}

impl CaptureOrientation {
    /// Default orientation for a camera: front frames are mirrored so the
    /// preview behaves like a mirror
    pub fn for_position(position: CameraPosition, mirror_front: bool) -> Self {
        match position {
            CameraPosition::Front if mirror_front => CaptureOrientation::UpMirrored,
            _ => CaptureOrientation::Up,
        }
    }

    /// Check if the orientation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(
            self,
            CaptureOrientation::Left
                | CaptureOrientation::LeftMirrored
                | CaptureOrientation::Right
                | CaptureOrientation::RightMirrored
        )
    }

    /// Re-lay out a buffer for display
    pub fn apply<P>(&self, buffer: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>>
    where
        P: Pixel + 'static,
    {
        match self {
            CaptureOrientation::Up => buffer.clone(),
            CaptureOrientation::UpMirrored => imageops::flip_horizontal(buffer),
            CaptureOrientation::Down => imageops::rotate180(buffer),
            CaptureOrientation::DownMirrored => imageops::flip_vertical(buffer),
            CaptureOrientation::Left => imageops::rotate270(buffer),
            CaptureOrientation::LeftMirrored => {
                imageops::flip_horizontal(&imageops::rotate90(buffer))
            }
            CaptureOrientation::Right => imageops::rotate90(buffer),
            CaptureOrientation::RightMirrored => {
                imageops::flip_horizontal(&imageops::rotate270(buffer))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn marked() -> GrayImage {
        // 3x2 with a single bright pixel at (0, 0)
        let mut img = GrayImage::new(3, 2);
        img.put_pixel(0, 0, Luma([255]));
        img
    }

    fn bright_at(img: &GrayImage) -> (u32, u32) {
        img.enumerate_pixels()
            .find(|(_, _, p)| p[0] == 255)
            .map(|(x, y, _)| (x, y))
            .unwrap()
    }

    #[test]
    fn test_front_camera_is_mirrored() {
        assert_eq!(
            CaptureOrientation::for_position(CameraPosition::Front, true),
            CaptureOrientation::UpMirrored
        );
        assert_eq!(
            CaptureOrientation::for_position(CameraPosition::Front, false),
            CaptureOrientation::Up
        );
        assert_eq!(
            CaptureOrientation::for_position(CameraPosition::Back, true),
            CaptureOrientation::Up
        );
    }

    #[test]
    fn test_orientations_move_corner() {
        let img = marked();
        assert_eq!(bright_at(&CaptureOrientation::Up.apply(&img)), (0, 0));
        assert_eq!(bright_at(&CaptureOrientation::UpMirrored.apply(&img)), (2, 0));
        assert_eq!(bright_at(&CaptureOrientation::Down.apply(&img)), (2, 1));
        assert_eq!(bright_at(&CaptureOrientation::DownMirrored.apply(&img)), (0, 1));
        // Quarter turns produce 2x3 buffers
        assert_eq!(bright_at(&CaptureOrientation::Right.apply(&img)), (1, 0));
        assert_eq!(bright_at(&CaptureOrientation::Left.apply(&img)), (0, 2));
        assert_eq!(bright_at(&CaptureOrientation::LeftMirrored.apply(&img)), (0, 0));
        assert_eq!(bright_at(&CaptureOrientation::RightMirrored.apply(&img)), (1, 2));
    }

    #[test]
    fn test_quarter_turns_swap_dimensions() {
        let img = marked();
        for orientation in [CaptureOrientation::Left, CaptureOrientation::RightMirrored] {
            assert!(orientation.swaps_dimensions());
            assert_eq!(orientation.apply(&img).dimensions(), (2, 3));
        }
    }
}
