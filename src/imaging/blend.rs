// SPDX-License-Identifier: GPL-3.0-only

//! Blend modes used by the effect compositors
//!
//! All blends keep the extent of the base image. The other operand is
//! sampled in pipeline coordinates and treated as transparent where it does
//! not cover the base.

use super::{Image, Mask};
use image::RgbaImage;

const TRANSPARENT: [f32; 4] = [0.0; 4];

/// Screen a single channel: 1 - (1 - a)(1 - b)
#[inline]
pub fn screen(a: f32, b: f32) -> f32 {
    1.0 - (1.0 - a) * (1.0 - b)
}

/// Screen `top` (premultiplied) over `base`
pub fn screen_blend(top: &Image, base: &Image) -> Image {
    let origin = base.extent();
    base.map_pixels(|x, y, px| {
        let t = top
            .pixel_at(origin.x + x as i32, origin.y + y as i32)
            .unwrap_or(TRANSPARENT);
        [
            screen(t[0], px[0]),
            screen(t[1], px[1]),
            screen(t[2], px[2]),
            px[3],
        ]
    })
}

/// Cross-dissolve from `from` towards `to` by `t` in [0, 1]
///
/// Where `to` does not cover `from`, the `from` pixel is kept.
pub fn dissolve(from: &Image, to: &Image, t: f32) -> Image {
    let t = t.clamp(0.0, 1.0);
    let origin = from.extent();
    from.map_pixels(|x, y, px| {
        let target = to
            .pixel_at(origin.x + x as i32, origin.y + y as i32)
            .unwrap_or(px);
        let mut out = [0.0; 4];
        for c in 0..4 {
            out[c] = px[c] + (target[c] - px[c]) * t;
        }
        out
    })
}

/// `sharp · m + blurred · (1 − m)` with a per-pixel mask over `sharp`
///
/// The mask must match the dimensions of `sharp`; a mismatched mask leaves
/// `sharp` untouched.
pub fn blend_with_mask(sharp: &Image, blurred: &Image, mask: &Mask) -> Image {
    if mask.dimensions() != (sharp.width(), sharp.height()) {
        return sharp.clone();
    }
    let origin = sharp.extent();
    sharp.map_pixels(|x, y, px| {
        let m = mask.get_pixel(x, y)[0].clamp(0.0, 1.0);
        let soft = blurred
            .pixel_at(origin.x + x as i32, origin.y + y as i32)
            .unwrap_or(px);
        let mut out = [0.0; 4];
        for c in 0..4 {
            out[c] = px[c] * m + soft[c] * (1.0 - m);
        }
        out
    })
}

/// Source-over composite of an 8-bit straight-alpha overlay
///
/// `at` is the overlay's top-left corner in the base's local coordinates;
/// overlay pixels outside the base are clipped.
pub fn source_over(base: &Image, overlay: &RgbaImage, at: (i32, i32)) -> Image {
    let (ow, oh) = overlay.dimensions();
    base.map_pixels(|x, y, px| {
        let ox = x as i64 - at.0 as i64;
        let oy = y as i64 - at.1 as i64;
        if ox < 0 || oy < 0 || ox >= ow as i64 || oy >= oh as i64 {
            return px;
        }
        let o = overlay.get_pixel(ox as u32, oy as u32);
        let oa = o[3] as f32 / 255.0;
        if oa <= 0.0 {
            return px;
        }
        let ba = px[3];
        let out_a = oa + ba * (1.0 - oa);
        let mut out = [0.0, 0.0, 0.0, out_a];
        for c in 0..3 {
            let oc = o[c] as f32 / 255.0;
            out[c] = (oc * oa + px[c] * ba * (1.0 - oa)) / out_a;
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Extent;
    use image::{Luma, Rgba};

    #[test]
    fn test_screen_never_darkens() {
        assert_eq!(screen(0.0, 0.4), 0.4);
        assert_eq!(screen(1.0, 0.4), 1.0);
        assert!(screen(0.3, 0.4) > 0.4);
    }

    #[test]
    fn test_screen_blend_ignores_uncovered_area() {
        let base = Image::solid(Extent::from_size(4, 4), [0.5, 0.5, 0.5, 1.0]);
        let top = Image::solid(Extent::new(2, 0, 2, 4), [0.5, 0.5, 0.5, 1.0]);
        let out = screen_blend(&top, &base);
        assert_eq!(out.extent(), base.extent());
        assert_eq!(out.pixel_at(0, 0), Some([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(out.pixel_at(3, 0), Some([0.75, 0.75, 0.75, 1.0]));
    }

    #[test]
    fn test_dissolve_endpoints() {
        let a = Image::solid(Extent::from_size(2, 2), [0.0, 0.0, 0.0, 1.0]);
        let b = Image::solid(Extent::from_size(2, 2), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(dissolve(&a, &b, 0.0).pixel_at(1, 1), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(dissolve(&a, &b, 1.0).pixel_at(1, 1), Some([1.0, 1.0, 1.0, 1.0]));
        assert_eq!(dissolve(&a, &b, 0.25).pixel_at(0, 0), Some([0.25, 0.25, 0.25, 1.0]));
    }

    #[test]
    fn test_mask_selects_between_inputs() {
        let sharp = Image::solid(Extent::from_size(2, 1), [1.0, 0.0, 0.0, 1.0]);
        let blurred = Image::solid(Extent::from_size(2, 1), [0.0, 0.0, 1.0, 1.0]);
        let mut mask = Mask::new(2, 1);
        mask.put_pixel(0, 0, Luma([1.0]));
        mask.put_pixel(1, 0, Luma([0.0]));
        let out = blend_with_mask(&sharp, &blurred, &mask);
        assert_eq!(out.pixel_at(0, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(out.pixel_at(1, 0), Some([0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_source_over_places_and_clips() {
        let base = Image::solid(Extent::from_size(3, 1), [0.2, 0.2, 0.2, 1.0]);
        let mut overlay = RgbaImage::new(2, 1);
        overlay.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        overlay.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        let out = source_over(&base, &overlay, (2, 0));
        assert_eq!(out.pixel_at(0, 0), Some([0.2, 0.2, 0.2, 1.0]));
        assert_eq!(out.pixel_at(2, 0), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(out.extent(), base.extent());
    }
}
