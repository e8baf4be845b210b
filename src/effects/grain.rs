// SPDX-License-Identifier: GPL-3.0-only

//! Film grain synthesizer
//!
//! A fresh noise field is drawn for every frame, so grain moves like real
//! film. The field is generated below frame resolution and upscaled, which
//! gives grains a little more than a pixel of size.

use crate::constants::grain::{NOISE_BRIGHTNESS, NOISE_CONTRAST, NOISE_SCALE, SOFTEN_RADIUS};
use crate::filters::adjustment::color_controls;
use crate::imaging::blend::{dissolve, screen_blend};
use crate::imaging::kernels::gaussian_blur;
use crate::imaging::{Image, buffer_from_raw};
use image::imageops::{self, FilterType};
use rand::Rng;
use tracing::trace;

/// Grain noise covering `width` x `height`
///
/// Uniform RGB noise is desaturated and pushed dark, leaving sparse bright
/// specks, then softened slightly.
pub fn noise_field<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Option<Image> {
    if width == 0 || height == 0 {
        return None;
    }
    let small_w = ((width as f32 / NOISE_SCALE).ceil() as u32).max(1);
    let small_h = ((height as f32 / NOISE_SCALE).ceil() as u32).max(1);

    let samples: Vec<f32> = (0..small_w as usize * small_h as usize)
        .flat_map(|_| {
            let r: f32 = rng.random();
            let g: f32 = rng.random();
            let b: f32 = rng.random();
            [r, g, b, 1.0]
        })
        .collect();
    let small = buffer_from_raw(small_w, small_h, samples);
    let scaled = imageops::resize(&small, width, height, FilterType::Triangle);

    let shaped = Image::new(scaled)
        .map_rgb(|rgb| color_controls(rgb, NOISE_BRIGHTNESS, NOISE_CONTRAST, 0.0));
    gaussian_blur(&shaped, SOFTEN_RADIUS, false)
}

/// Screen grain over `image` and dissolve towards it by `intensity`
///
/// Intensity at or below zero returns the input itself.
pub fn apply<R: Rng + ?Sized>(image: &Image, intensity: f32, rng: &mut R) -> Image {
    if intensity.is_nan() || intensity <= 0.0 || image.is_empty() {
        return image.clone();
    }

    let Some(noise) = noise_field(image.width(), image.height(), rng) else {
        return image.clone();
    };
    let extent = image.extent();
    let noise = noise.translated_to(extent.x, extent.y);

    trace!(intensity, ?extent, "Applying grain");
    let grained = screen_blend(&noise, image);
    dissolve(image, &grained, intensity.min(1.0))
}
