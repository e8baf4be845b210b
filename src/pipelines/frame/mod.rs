// SPDX-License-Identifier: GPL-3.0-only

//! Frame compositor
//!
//! Runs the per-frame chain on one oriented frame:
//!
//! ```text
//! orient → grade(look) → blur → light leak → grain → stamp → extent guard
//! ```
//!
//! Spatial stages (bloom inside a look, full-frame blur) may grow the image
//! past the frame. Each is cropped back to the frame extent before the next
//! stage, and the final output always has exactly the extent captured after
//! orientation.

mod params;
mod state;

pub use params::EffectParams;
pub use state::EffectState;

use crate::config::Config;
use crate::constants::EffectKind;
use crate::constants::light_leak::REFRESH_INTERVAL;
use crate::constants::overlay::DEFAULT_FORMAT;
use crate::effects::overlay::date_text;
use crate::effects::{BlurEngine, OverlayStamper, grain, light_leak};
use crate::filters::{grade, lookup};
use crate::frame::{FrameInput, SubjectMask};
use crate::imaging::Image;
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::trace;

/// Stateless per-frame compositor; all mutable data lives in [`EffectState`]
#[derive(Debug, Clone)]
pub struct FramePipeline {
    blur: BlurEngine,
    stamper: OverlayStamper,
    mirror_front: bool,
    light_leak_refresh: Duration,
    stamp_format: String,
}

impl Default for FramePipeline {
    fn default() -> Self {
        Self {
            blur: BlurEngine::default(),
            stamper: OverlayStamper::default(),
            mirror_front: true,
            light_leak_refresh: REFRESH_INTERVAL,
            stamp_format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl FramePipeline {
    pub fn from_config(config: &Config) -> Self {
        Self {
            blur: BlurEngine::new(config.bokeh_enabled, config.focus_radius_scale),
            stamper: OverlayStamper::new(config.decorative_font),
            mirror_front: config.mirror_front_camera,
            light_leak_refresh: config.light_leak_refresh(),
            stamp_format: config.stamp_format.clone(),
        }
    }

    pub fn light_leak_refresh(&self) -> Duration {
        self.light_leak_refresh
    }

    /// Orient a camera frame and composite it
    pub fn composite(
        &self,
        frame: &FrameInput,
        params: &EffectParams,
        state: &mut EffectState,
        now: Instant,
    ) -> Image {
        let orientation = frame.resolved_orientation(self.mirror_front);
        let image = frame.buffer.to_image(orientation);
        // Masks come back in buffer layout, re-lay them out like the frame
        let subject = state
            .last_person_mask
            .as_ref()
            .map(|mask| mask.oriented(orientation));
        trace!(
            position = %frame.position,
            ?orientation,
            width = image.width(),
            height = image.height(),
            "Compositing frame"
        );
        self.composite_oriented(&image, subject.as_ref(), params, state, now)
    }

    /// Composite an already oriented image
    ///
    /// The output has the extent of `image` and is stored as the last
    /// composited frame.
    pub fn composite_oriented(
        &self,
        image: &Image,
        subject: Option<&SubjectMask>,
        params: &EffectParams,
        state: &mut EffectState,
        now: Instant,
    ) -> Image {
        let extent = image.extent();
        state.last_focus_point = Some(params.focus);

        // Bloom may grow the graded image; masks are laid out on the frame
        let graded = grade::apply_look(image, lookup(params.look)).cropped(extent);

        let blurred = if params.is_enabled(EffectKind::Blur) {
            self.blur.apply(
                &graded,
                params.intensity(EffectKind::Blur),
                params.blur_mode,
                params.focus,
                subject,
            )
        } else {
            graded
        };
        let framed = blurred.cropped(extent);

        let leaked = light_leak::apply(
            &framed,
            params.intensity(EffectKind::LightLeak),
            &mut state.cached_light_leak,
            now,
            self.light_leak_refresh,
            &mut state.rng,
        );

        let grained = grain::apply(&leaked, params.intensity(EffectKind::Grain), &mut state.rng);

        let stamped = if params.overlay_enabled {
            let text = match &params.stamp_text {
                Some(text) => text.clone(),
                None => date_text(&self.stamp_format, &Local::now()),
            };
            self.stamper.stamp(&grained, &text)
        } else {
            grained
        };

        let output = stamped.cropped(extent);
        state.last_composited_frame = Some(output.clone());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BlurMode;
    use crate::filters::LookId;
    use crate::frame::{CameraPosition, CaptureOrientation, PixelBuffer};
    use crate::imaging::{Extent, Mask};
    use image::{Luma, Rgba, Rgba32FImage, RgbaImage};

    fn gray(width: u32, height: u32) -> Image {
        Image::solid(Extent::from_size(width, height), [0.5, 0.5, 0.5, 1.0])
    }

    #[test]
    fn test_every_look_keeps_extent() {
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(1);
        let image = gray(48, 32);
        for &look in LookId::ALL.iter() {
            let mut params = EffectParams::default();
            params.look = look;
            let out = pipeline.composite_oriented(&image, None, &params, &mut state, Instant::now());
            assert_eq!(out.extent(), image.extent(), "{}", look);
        }
    }

    #[test]
    fn test_full_blur_is_cropped_back() {
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(2);
        let image = gray(64, 64);
        let mut params = EffectParams::default();
        params.look = LookId::Noctilux50;
        params.blur_mode = BlurMode::Full;
        let params = params.with_intensity(EffectKind::Blur, 1.0);
        let out = pipeline.composite_oriented(&image, None, &params, &mut state, Instant::now());
        assert_eq!(out.extent(), image.extent());
    }

    #[test]
    fn test_result_is_remembered() {
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(3);
        let params = EffectParams::default().with_intensity(EffectKind::Grain, 0.4);
        let out = pipeline.composite_oriented(&gray(16, 16), None, &params, &mut state, Instant::now());
        assert!(state.last_composited_frame.as_ref().unwrap().ptr_eq(&out));
        assert_eq!(state.last_focus_point, Some(params.focus));
    }

    #[test]
    fn test_front_camera_is_mirrored() {
        let mut source = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        source.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let buffer = PixelBuffer::from_rgba8(&source).unwrap();
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(4);
        let params = EffectParams::default();

        let front = FrameInput::new(buffer.clone(), CameraPosition::Front);
        let out = pipeline.composite(&front, &params, &mut state, Instant::now());
        assert!(out.pixel_at(3, 0).unwrap()[0] > 0.9);

        let back = FrameInput::new(buffer, CameraPosition::Back);
        let out = pipeline.composite(&back, &params, &mut state, Instant::now());
        assert!(out.pixel_at(0, 0).unwrap()[0] > 0.9);
    }

    #[test]
    fn test_rotated_frame_swaps_extent() {
        let buffer = PixelBuffer::from_rgba8(&RgbaImage::new(8, 4)).unwrap();
        let frame = FrameInput::new(buffer, CameraPosition::Back)
            .with_orientation(CaptureOrientation::Right);
        let mut state = EffectState::with_seed(5);
        let out = FramePipeline::default().composite(
            &frame,
            &EffectParams::default(),
            &mut state,
            Instant::now(),
        );
        assert_eq!(out.extent(), Extent::from_size(4, 8));
    }

    #[test]
    fn test_stamp_text_is_drawn() {
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(6);
        let image = Image::solid(Extent::from_size(120, 80), [0.0, 0.0, 0.0, 1.0]);
        let mut params = EffectParams::default();
        params.overlay_enabled = true;
        params.stamp_text = Some("8".into());
        let out = pipeline.composite_oriented(&image, None, &params, &mut state, Instant::now());
        let (mean, _) = out.luma_stats();
        assert!(mean > 0.0);
        assert_eq!(out.pixel_at(0, 0), Some([0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_subject_mask_aligned_under_bloom() {
        let pipeline = FramePipeline::default();
        let mut state = EffectState::with_seed(7);
        let image = Image::new(Rgba32FImage::from_fn(200, 200, |x, _| {
            let v = if (x / 2) % 2 == 0 { 0.8 } else { 0.1 };
            Rgba([v, v, v, 1.0])
        }));
        // Left quarter is subject
        let subject = SubjectMask::new(Mask::from_fn(200, 200, |x, _| {
            Luma([if x < 50 { 1.0 } else { 0.0 }])
        }));
        let mut params = EffectParams::default();
        params.look = LookId::Noctilux50;
        params.blur_mode = BlurMode::Selective;
        let params = params.with_intensity(EffectKind::Blur, 1.0);

        let out =
            pipeline.composite_oriented(&image, Some(&subject), &params, &mut state, Instant::now());
        let sharp = grade::apply_look(&image, lookup(LookId::Noctilux50)).cropped(image.extent());

        assert_eq!(out.extent(), image.extent());
        for y in 20..180 {
            for x in 36..48 {
                let a = out.pixel_at(x, y).unwrap();
                let b = sharp.pixel_at(x, y).unwrap();
                assert!((a[0] - b[0]).abs() < 1e-4, "({}, {})", x, y);
            }
        }
    }
}
