// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline-wide constants
//!
//! Tuning numbers for the effects live here as named constants. Their values
//! are product choices rather than invariants; tests only rely on the
//! relationships between them.

use serde::{Deserialize, Serialize};

/// Auxiliary effects whose intensity is controlled independently of the look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Film grain (screen-blended luminance noise)
    Grain,
    /// Warm light leak from a random edge anchor
    LightLeak,
    /// Depth-of-field blur (full frame or selective)
    Blur,
}

impl EffectKind {
    /// All effect kinds for UI iteration
    pub const ALL: [EffectKind; 3] = [EffectKind::Grain, EffectKind::LightLeak, EffectKind::Blur];

    /// Get display name for the effect
    pub fn display_name(&self) -> &'static str {
        match self {
            EffectKind::Grain => "Grain",
            EffectKind::LightLeak => "Light Leak",
            EffectKind::Blur => "Blur",
        }
    }
}

/// How the blur effect is composited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlurMode {
    /// Sharp subject over a blurred background
    #[default]
    Selective,
    /// Whole frame blurred
    Full,
}

impl BlurMode {
    /// All modes for UI iteration
    pub const ALL: [BlurMode; 2] = [BlurMode::Selective, BlurMode::Full];

    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            BlurMode::Selective => "Selective",
            BlurMode::Full => "Full",
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "selective" | "portrait" => Some(BlurMode::Selective),
            "full" | "full-frame" => Some(BlurMode::Full),
            _ => None,
        }
    }
}

/// Rec.601 luma weights shared by every luminance calculation
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Neutral white point used by the temperature presets (Kelvin)
pub const NEUTRAL_KELVIN: f32 = 6500.0;

/// Grain synthesizer tuning
pub mod grain {
    /// Noise is generated at 1/NOISE_SCALE resolution and upscaled
    pub const NOISE_SCALE: f32 = 1.5;
    /// Brightness applied to the desaturated noise field
    pub const NOISE_BRIGHTNESS: f32 = -0.5;
    /// Contrast applied to the desaturated noise field
    pub const NOISE_CONTRAST: f32 = 1.5;
    /// Softening blur radius for the noise (pixels)
    pub const SOFTEN_RADIUS: f32 = 0.5;
}

/// Light-leak compositor tuning
pub mod light_leak {
    use std::time::Duration;

    /// Age after which a cached leak is regenerated
    pub const REFRESH_INTERVAL: Duration = Duration::from_secs(5);
    /// Damping applied to the user intensity before the cross-dissolve
    pub const INTENSITY_DAMPING: f32 = 0.6;
    /// Gradient radius as a fraction of the larger frame dimension
    pub const RADIUS_FRACTION: f32 = 0.7;
    /// Blur radius used to soften the gradient (pixels)
    pub const SOFTEN_RADIUS: f32 = 20.0;
    /// Warm palette the leak colour is drawn from (linear RGB)
    pub const WARM_COLORS: [[f32; 3]; 5] = [
        [1.0, 0.55, 0.15],
        [1.0, 0.35, 0.25],
        [1.0, 0.78, 0.35],
        [0.95, 0.30, 0.45],
        [1.0, 0.88, 0.55],
    ];
}

/// Selective blur engine tuning
pub mod blur {
    /// Bokeh radius at full intensity in full-frame mode (pixels)
    pub const FULL_BOKEH_RADIUS: f32 = 30.0;
    /// Gaussian fallback radius at full intensity in full-frame mode
    pub const FULL_GAUSSIAN_RADIUS: f32 = 15.0;
    /// Bokeh radius at full intensity in selective mode
    pub const SELECTIVE_BOKEH_RADIUS: f32 = 35.0;
    /// Gaussian fallback radius at full intensity in selective mode
    pub const SELECTIVE_GAUSSIAN_RADIUS: f32 = 17.5;
    /// Ring emphasis, ring width (fraction of radius) and softness for full-frame bokeh
    pub const FULL_RING: (f32, f32, f32) = (0.2, 0.1, 1.0);
    /// Ring emphasis, ring width and softness for selective bokeh
    pub const SELECTIVE_RING: (f32, f32, f32) = (0.4, 0.15, 1.5);
    /// Radial mask sharp radius as a fraction of the smaller dimension
    pub const MASK_INNER_FRACTION: f32 = 0.15;
    /// Radial mask fully-blurred radius as a fraction of the larger dimension
    pub const MASK_OUTER_FRACTION: f32 = 0.5;
}

/// Date stamp overlay layout
pub mod overlay {
    /// Glyph cell height in pixels
    pub const GLYPH_HEIGHT: u32 = 24;
    /// Distance from the right and bottom edges
    pub const MARGIN: u32 = 20;
    /// Horizontal gap between glyph cells
    pub const GLYPH_SPACING: u32 = 4;
    /// Classic date-back orange (sRGB 8-bit)
    pub const STAMP_COLOR: [u8; 4] = [255, 140, 26, 235];
    /// Default chrono format for the stamp text
    pub const DEFAULT_FORMAT: &str = "'%y %m %d";
}
