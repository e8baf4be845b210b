// SPDX-License-Identifier: GPL-3.0-only

//! Depth-of-field blur
//!
//! Two ordered fallback chains drive this engine:
//!
//! - **Kernels**: bokeh (disc with bright ring) first, gaussian otherwise.
//!   Bokeh can be switched off in the configuration and is skipped when its
//!   kernel would be larger than the frame.
//! - **Masks** (selective mode): the most recent subject mask from
//!   segmentation, otherwise a radial falloff around the focus point.
//!
//! The engine never waits for a mask; whatever is available is used.

use crate::constants::BlurMode;
use crate::constants::blur::{
    FULL_BOKEH_RADIUS, FULL_GAUSSIAN_RADIUS, FULL_RING, MASK_INNER_FRACTION, MASK_OUTER_FRACTION,
    SELECTIVE_BOKEH_RADIUS, SELECTIVE_GAUSSIAN_RADIUS, SELECTIVE_RING,
};
use crate::frame::{FocusPoint, SubjectMask};
use crate::imaging::blend::blend_with_mask;
use crate::imaging::kernels::{disc_blur, gaussian_blur};
use crate::imaging::{Image, Mask};
use tracing::{debug, trace};

/// Blur kernels in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurStrategy {
    Bokeh,
    Gaussian,
}

/// Mask sources in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStrategy {
    Subject,
    Radial,
}

/// Bokeh kernel shape
#[derive(Debug, Clone, Copy, PartialEq)]
struct BokehShape {
    radius: f32,
    ring_amount: f32,
    ring_size: f32,
    softness: f32,
}

impl BokehShape {
    fn for_mode(mode: BlurMode, intensity: f32) -> Self {
        let (base, (ring_amount, ring_size, softness)) = match mode {
            BlurMode::Full => (FULL_BOKEH_RADIUS, FULL_RING),
            BlurMode::Selective => (SELECTIVE_BOKEH_RADIUS, SELECTIVE_RING),
        };
        Self {
            radius: base * intensity,
            ring_amount,
            ring_size,
            softness,
        }
    }
}

fn gaussian_radius(mode: BlurMode, intensity: f32) -> f32 {
    match mode {
        BlurMode::Full => FULL_GAUSSIAN_RADIUS * intensity,
        BlurMode::Selective => SELECTIVE_GAUSSIAN_RADIUS * intensity,
    }
}

/// Selective / full-frame blur engine
#[derive(Debug, Clone)]
pub struct BlurEngine {
    strategies: Vec<BlurStrategy>,
    mask_strategies: Vec<MaskStrategy>,
    focus_radius_scale: f32,
}

impl Default for BlurEngine {
    fn default() -> Self {
        Self::new(true, 1.0)
    }
}

impl BlurEngine {
    /// Create an engine; `focus_radius_scale` widens or narrows the radial mask
    pub fn new(bokeh_enabled: bool, focus_radius_scale: f32) -> Self {
        let mut strategies = Vec::with_capacity(2);
        if bokeh_enabled {
            strategies.push(BlurStrategy::Bokeh);
        }
        strategies.push(BlurStrategy::Gaussian);

        let focus_radius_scale = if focus_radius_scale.is_finite() && focus_radius_scale > 0.0 {
            focus_radius_scale
        } else {
            1.0
        };

        Self {
            strategies,
            mask_strategies: vec![MaskStrategy::Subject, MaskStrategy::Radial],
            focus_radius_scale,
        }
    }

    pub fn strategies(&self) -> &[BlurStrategy] {
        &self.strategies
    }

    pub fn mask_strategies(&self) -> &[MaskStrategy] {
        &self.mask_strategies
    }

    /// Blurred copy of `image`, extent grown by the kernel reach
    ///
    /// Returns `None` when intensity is not positive or no kernel produced
    /// output.
    pub fn blurred_copy(&self, image: &Image, intensity: f32, mode: BlurMode) -> Option<Image> {
        if intensity.is_nan() || intensity <= 0.0 || image.is_empty() {
            return None;
        }
        let intensity = intensity.min(1.0);

        self.strategies.iter().find_map(|strategy| match strategy {
            BlurStrategy::Bokeh => {
                let shape = BokehShape::for_mode(mode, intensity);
                if 2.0 * shape.radius > image.extent().min_dimension() as f32 {
                    debug!(
                        radius = shape.radius,
                        extent = ?image.extent(),
                        "Bokeh kernel larger than frame, falling back"
                    );
                    return None;
                }
                let disc = disc_blur(image, shape.radius, shape.ring_amount, shape.ring_size, true)?;
                gaussian_blur(&disc, shape.softness, true)
            }
            BlurStrategy::Gaussian => gaussian_blur(image, gaussian_radius(mode, intensity), true),
        })
    }

    /// Blur according to `mode`
    ///
    /// Full mode returns the blurred copy with its grown extent. Selective
    /// mode keeps the input extent and blends the sharp input back in where
    /// the mask is white.
    pub fn apply(
        &self,
        image: &Image,
        intensity: f32,
        mode: BlurMode,
        focus: FocusPoint,
        subject: Option<&SubjectMask>,
    ) -> Image {
        let Some(blurred) = self.blurred_copy(image, intensity, mode) else {
            return image.clone();
        };

        match mode {
            BlurMode::Full => blurred,
            BlurMode::Selective => {
                let blurred = blurred.cropped(image.extent());
                let mask = self.mask_for(image.width(), image.height(), focus, subject);
                trace!(intensity, ?focus, has_subject = subject.is_some(), "Selective blur");
                blend_with_mask(image, &blurred, &mask)
            }
        }
    }

    /// First available mask for a `width` x `height` frame
    pub fn mask_for(
        &self,
        width: u32,
        height: u32,
        focus: FocusPoint,
        subject: Option<&SubjectMask>,
    ) -> Mask {
        self.mask_strategies
            .iter()
            .find_map(|strategy| match strategy {
                MaskStrategy::Subject => subject.map(|mask| mask.scaled_to(width, height)),
                MaskStrategy::Radial => Some(radial_mask(
                    width,
                    height,
                    focus,
                    self.focus_radius_scale,
                )),
            })
            .unwrap_or_else(|| radial_mask(width, height, focus, self.focus_radius_scale))
    }
}

/// Radial keep-sharp mask around `focus`
///
/// 1.0 within `0.15 · min(w, h) · scale` of the focus point, 0.0 beyond
/// `0.5 · max(w, h) · scale`, linear in between.
pub fn radial_mask(width: u32, height: u32, focus: FocusPoint, scale: f32) -> Mask {
    let fx = focus.x() * width as f32;
    let fy = focus.y() * height as f32;
    let inner = MASK_INNER_FRACTION * width.min(height) as f32 * scale;
    let outer = MASK_OUTER_FRACTION * width.max(height) as f32 * scale;
    let span = outer - inner;

    Mask::from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - fx;
        let dy = y as f32 + 0.5 - fy;
        let d = (dx * dx + dy * dy).sqrt();
        let m = if d <= inner {
            1.0
        } else if d >= outer || span <= 0.0 {
            0.0
        } else {
            1.0 - (d - inner) / span
        };
        image::Luma([m])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, Rgba32FImage};

    fn stripes(size: u32) -> Image {
        Image::new(Rgba32FImage::from_fn(size, size, |x, _| {
            let v = if (x / 2) % 2 == 0 { 1.0 } else { 0.0 };
            Rgba([v, v, v, 1.0])
        }))
    }

    #[test]
    fn test_disabled_bokeh_leaves_gaussian_only() {
        let engine = BlurEngine::new(false, 1.0);
        assert_eq!(engine.strategies(), &[BlurStrategy::Gaussian]);
        assert_eq!(
            BlurEngine::default().strategies(),
            &[BlurStrategy::Bokeh, BlurStrategy::Gaussian]
        );
    }

    #[test]
    fn test_full_mode_grows_extent() {
        let image = stripes(120);
        let out = BlurEngine::default().apply(
            &image,
            0.5,
            BlurMode::Full,
            FocusPoint::default(),
            None,
        );
        assert!(out.extent().width > image.extent().width);
        assert_eq!(out.extent().intersection(&image.extent()), Some(image.extent()));
    }

    #[test]
    fn test_oversized_bokeh_falls_back_to_gaussian() {
        // 30 px bokeh radius cannot fit a 40 px frame; gaussian reach is 45 px
        let image = stripes(40);
        let out = BlurEngine::default()
            .blurred_copy(&image, 1.0, BlurMode::Full)
            .unwrap();
        assert_eq!(out.extent(), image.extent().outset(45));
    }

    #[test]
    fn test_zero_intensity_is_noop() {
        let image = stripes(32);
        let out = BlurEngine::default().apply(
            &image,
            0.0,
            BlurMode::Selective,
            FocusPoint::default(),
            None,
        );
        assert!(out.ptr_eq(&image));
    }

    #[test]
    fn test_white_mask_keeps_sharp() {
        let image = stripes(64);
        let white = SubjectMask::new(Mask::from_pixel(16, 16, Luma([1.0])));
        let out = BlurEngine::default().apply(
            &image,
            1.0,
            BlurMode::Selective,
            FocusPoint::default(),
            Some(&white),
        );
        assert_eq!(out.extent(), image.extent());
        for (a, b) in out.pixels().pixels().zip(image.pixels().pixels()) {
            assert!((a[0] - b[0]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_black_mask_gives_blurred_copy() {
        let image = stripes(64);
        let engine = BlurEngine::default();
        let black = SubjectMask::new(Mask::from_pixel(64, 64, Luma([0.0])));
        let out = engine.apply(
            &image,
            0.5,
            BlurMode::Selective,
            FocusPoint::default(),
            Some(&black),
        );
        let expected = engine
            .blurred_copy(&image, 0.5, BlurMode::Selective)
            .unwrap()
            .cropped(image.extent());
        for (a, b) in out.pixels().pixels().zip(expected.pixels().pixels()) {
            assert!((a[0] - b[0]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_radial_mask_bounds() {
        let mask = radial_mask(200, 200, FocusPoint::default(), 1.0);
        // inside 15% of 200 = 30 px from the centre
        assert_eq!(mask.get_pixel(100, 100)[0], 1.0);
        assert_eq!(mask.get_pixel(125, 100)[0], 1.0);
        // beyond 50% of 200 = 100 px
        assert_eq!(mask.get_pixel(0, 0)[0], 0.0);
        assert_eq!(mask.get_pixel(199, 199)[0], 0.0);
        // linear in between
        let mid = mask.get_pixel(165, 100)[0];
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_subject_mask_preferred_over_radial() {
        let engine = BlurEngine::default();
        let subject = SubjectMask::new(Mask::from_pixel(10, 10, Luma([0.25])));
        let mask = engine.mask_for(50, 40, FocusPoint::default(), Some(&subject));
        assert_eq!(mask.dimensions(), (50, 40));
        assert!((mask.get_pixel(25, 20)[0] - 0.25).abs() < 1e-4);

        let radial = engine.mask_for(50, 40, FocusPoint::default(), None);
        assert_eq!(radial.get_pixel(25, 20)[0], 1.0);
    }
}
