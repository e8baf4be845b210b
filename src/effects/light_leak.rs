// SPDX-License-Identifier: GPL-3.0-only

//! Light-leak compositor
//!
//! A leak is a soft warm glow bleeding in from one edge of the frame. It is
//! expensive to build and should not flicker, so one leak is cached and
//! reused until it is older than the refresh interval or the frame size
//! changes.

use crate::constants::light_leak::{INTENSITY_DAMPING, RADIUS_FRACTION, SOFTEN_RADIUS, WARM_COLORS};
use crate::imaging::blend::{dissolve, screen_blend};
use crate::imaging::kernels::gaussian_blur;
use crate::imaging::{Extent, Image};
use image::Rgba32FImage;
use image::imageops::{self, FilterType};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::time::{Duration, Instant};
use tracing::debug;

/// Gradients are rendered at 1/RENDER_SCALE resolution and upscaled
const RENDER_SCALE: u32 = 4;

/// Where the leak enters the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeakAnchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    TopCenter,
    BottomCenter,
}

impl LeakAnchor {
    pub const ALL: [LeakAnchor; 6] = [
        LeakAnchor::TopLeft,
        LeakAnchor::TopRight,
        LeakAnchor::BottomLeft,
        LeakAnchor::BottomRight,
        LeakAnchor::TopCenter,
        LeakAnchor::BottomCenter,
    ];

    /// Anchor position relative to the top-left of a `width` x `height` frame
    pub fn position(&self, width: f32, height: f32) -> (f32, f32) {
        match self {
            LeakAnchor::TopLeft => (0.0, 0.0),
            LeakAnchor::TopRight => (width, 0.0),
            LeakAnchor::BottomLeft => (0.0, height),
            LeakAnchor::BottomRight => (width, height),
            LeakAnchor::TopCenter => (width / 2.0, 0.0),
            LeakAnchor::BottomCenter => (width / 2.0, height),
        }
    }
}

/// A generated leak and the key it was generated for
#[derive(Debug, Clone)]
pub struct LightLeak {
    image: Image,
    anchor: LeakAnchor,
    color: [f32; 3],
    extent: Extent,
    generated_at: Instant,
}

impl LightLeak {
    /// Draw a random anchor and colour and render the leak over `extent`
    pub fn generate<R: Rng + ?Sized>(extent: Extent, now: Instant, rng: &mut R) -> Option<Self> {
        if extent.is_empty() {
            return None;
        }
        let anchor = *LeakAnchor::ALL.choose(rng)?;
        let color = *WARM_COLORS.choose(rng)?;
        let image = render(extent, anchor, color)?;
        Some(Self {
            image,
            anchor,
            color,
            extent,
            generated_at: now,
        })
    }

    /// Premultiplied leak image covering exactly the extent it was made for
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn anchor(&self) -> LeakAnchor {
        self.anchor
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn generated_at(&self) -> Instant {
        self.generated_at
    }

    /// True once the leak has lived for `refresh` or longer
    pub fn is_stale(&self, now: Instant, refresh: Duration) -> bool {
        now.saturating_duration_since(self.generated_at) >= refresh
    }
}

/// Radial gradient from the anchor colour to transparent, softened
fn render(extent: Extent, anchor: LeakAnchor, color: [f32; 3]) -> Option<Image> {
    let scale = if extent.min_dimension() >= RENDER_SCALE * 16 {
        RENDER_SCALE
    } else {
        1
    };
    let w = extent.width.div_ceil(scale);
    let h = extent.height.div_ceil(scale);
    let (ax, ay) = anchor.position(w as f32, h as f32);
    let radius = RADIUS_FRACTION * w.max(h) as f32;

    let gradient = Rgba32FImage::from_fn(w, h, |x, y| {
        let dx = x as f32 + 0.5 - ax;
        let dy = y as f32 + 0.5 - ay;
        let a = (1.0 - (dx * dx + dy * dy).sqrt() / radius).clamp(0.0, 1.0);
        image::Rgba([color[0] * a, color[1] * a, color[2] * a, a])
    });
    let softened = gaussian_blur(&Image::new(gradient), SOFTEN_RADIUS / scale as f32, false)?;

    let pixels = if scale == 1 {
        softened.pixels().clone()
    } else {
        imageops::resize(softened.pixels(), extent.width, extent.height, FilterType::Triangle)
    };
    Some(Image::with_origin(pixels, extent.x, extent.y))
}

/// Screen the cached leak over `image` at `intensity`
///
/// Zero intensity drops the cache so the next non-zero call starts with a
/// new leak.
pub fn apply<R: Rng + ?Sized>(
    image: &Image,
    intensity: f32,
    cache: &mut Option<LightLeak>,
    now: Instant,
    refresh: Duration,
    rng: &mut R,
) -> Image {
    if intensity.is_nan() || intensity <= 0.0 {
        *cache = None;
        return image.clone();
    }

    let extent = image.extent();
    let needs_refresh = match cache.as_ref() {
        None => true,
        Some(leak) => leak.extent != extent || leak.is_stale(now, refresh),
    };
    if needs_refresh {
        *cache = LightLeak::generate(extent, now, rng);
        if let Some(leak) = cache.as_ref() {
            debug!(anchor = ?leak.anchor, color = ?leak.color, ?extent, "Generated light leak");
        }
    }

    let Some(leak) = cache.as_ref() else {
        return image.clone();
    };
    let leaked = screen_blend(&leak.image, image);
    dissolve(image, &leaked, intensity.min(1.0) * INTENSITY_DAMPING)
}
