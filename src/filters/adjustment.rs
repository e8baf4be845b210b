// SPDX-License-Identifier: GPL-3.0-only

//! Color adjustments
//!
//! Each [`Adjustment`] is a pure function of its input image. Values are
//! normalized RGB with straight alpha; unless noted, alpha is left alone and
//! results are clamped to [0, 1]. `apply` returns `None` when the step cannot
//! produce an image (empty input, non-finite parameters, degenerate
//! geometry) and the grade engine passes the input through instead.

use crate::imaging::kernels::gaussian_blur;
use crate::imaging::{Image, luma, smoothstep};

/// Classic sepia tone matrix
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Green gain per unit of tint difference
const TINT_SCALE: f32 = 0.004;

/// Blur radius used by noise reduction's sharpening pass
const NOISE_REDUCTION_SHARPEN_RADIUS: f32 = 1.0;

/// One step of a look's grade
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Brightness offset, contrast around mid-gray, saturation around luma
    ColorControls {
        brightness: f32,
        contrast: f32,
        saturation: f32,
    },
    Sepia {
        intensity: f32,
    },
    /// Darken towards the corners; `radius` is in half-diagonals
    Vignette {
        intensity: f32,
        radius: f32,
    },
    /// Re-balance from a source white point (Kelvin, tint) to a target one
    TemperatureTint {
        source_kelvin: f32,
        source_tint: f32,
        target_kelvin: f32,
        target_tint: f32,
    },
    /// Rows for R, G and B, each applied to (R, G, B, A)
    ColorMatrix {
        rows: [[f32; 4]; 3],
    },
    Gamma {
        power: f32,
    },
    /// `highlight_amount` 1.0 and `shadow_amount` 0.0 leave the image as is
    HighlightShadow {
        highlight_amount: f32,
        shadow_amount: f32,
    },
    Vibrance {
        amount: f32,
    },
    NoiseReduction {
        level: f32,
        sharpness: f32,
    },
    /// Luminance unsharp mask
    Sharpen {
        sharpness: f32,
        radius: f32,
    },
    /// Soft glow; grows the extent by the blur reach
    Bloom {
        intensity: f32,
        radius: f32,
    },
    ExposureEV {
        ev: f32,
    },
}

impl Adjustment {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Adjustment::ColorControls { .. } => "color-controls",
            Adjustment::Sepia { .. } => "sepia",
            Adjustment::Vignette { .. } => "vignette",
            Adjustment::TemperatureTint { .. } => "temperature-tint",
            Adjustment::ColorMatrix { .. } => "color-matrix",
            Adjustment::Gamma { .. } => "gamma",
            Adjustment::HighlightShadow { .. } => "highlight-shadow",
            Adjustment::Vibrance { .. } => "vibrance",
            Adjustment::NoiseReduction { .. } => "noise-reduction",
            Adjustment::Sharpen { .. } => "sharpen",
            Adjustment::Bloom { .. } => "bloom",
            Adjustment::ExposureEV { .. } => "exposure",
        }
    }

    fn parameters_finite(&self) -> bool {
        let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());
        match self {
            Adjustment::ColorControls {
                brightness,
                contrast,
                saturation,
            } => finite(&[*brightness, *contrast, *saturation]),
            Adjustment::Sepia { intensity } => finite(&[*intensity]),
            Adjustment::Vignette { intensity, radius } => finite(&[*intensity, *radius]),
            Adjustment::TemperatureTint {
                source_kelvin,
                source_tint,
                target_kelvin,
                target_tint,
            } => finite(&[*source_kelvin, *source_tint, *target_kelvin, *target_tint]),
            Adjustment::ColorMatrix { rows } => rows.iter().all(|row| finite(row)),
            Adjustment::Gamma { power } => finite(&[*power]),
            Adjustment::HighlightShadow {
                highlight_amount,
                shadow_amount,
            } => finite(&[*highlight_amount, *shadow_amount]),
            Adjustment::Vibrance { amount } => finite(&[*amount]),
            Adjustment::NoiseReduction { level, sharpness } => finite(&[*level, *sharpness]),
            Adjustment::Sharpen { sharpness, radius } => finite(&[*sharpness, *radius]),
            Adjustment::Bloom { intensity, radius } => finite(&[*intensity, *radius]),
            Adjustment::ExposureEV { ev } => finite(&[*ev]),
        }
    }

    /// Run the step, `None` if it produced no output
    pub fn apply(&self, image: &Image) -> Option<Image> {
        if image.is_empty() || !self.parameters_finite() {
            return None;
        }

        match *self {
            Adjustment::ColorControls {
                brightness,
                contrast,
                saturation,
            } => Some(image.map_rgb(|rgb| color_controls(rgb, brightness, contrast, saturation))),

            Adjustment::Sepia { intensity } => {
                let t = intensity.clamp(0.0, 1.0);
                Some(image.map_rgb(|rgb| {
                    let toned = multiply3(&SEPIA, rgb);
                    clamp3([
                        rgb[0] + (toned[0] - rgb[0]) * t,
                        rgb[1] + (toned[1] - rgb[1]) * t,
                        rgb[2] + (toned[2] - rgb[2]) * t,
                    ])
                }))
            }

            Adjustment::Vignette { intensity, radius } => vignette(image, intensity, radius),

            Adjustment::TemperatureTint {
                source_kelvin,
                source_tint,
                target_kelvin,
                target_tint,
            } => {
                let gains =
                    white_balance_gains(source_kelvin, source_tint, target_kelvin, target_tint)?;
                Some(image.map_rgb(|rgb| {
                    clamp3([rgb[0] * gains[0], rgb[1] * gains[1], rgb[2] * gains[2]])
                }))
            }

            Adjustment::ColorMatrix { rows } => Some(image.map_pixels(|_, _, px| {
                let dot = |row: &[f32; 4]| {
                    (row[0] * px[0] + row[1] * px[1] + row[2] * px[2] + row[3] * px[3])
                        .clamp(0.0, 1.0)
                };
                [dot(&rows[0]), dot(&rows[1]), dot(&rows[2]), px[3]]
            })),

            Adjustment::Gamma { power } => {
                if power <= 0.0 {
                    return None;
                }
                Some(image.map_rgb(|rgb| {
                    clamp3([
                        rgb[0].max(0.0).powf(power),
                        rgb[1].max(0.0).powf(power),
                        rgb[2].max(0.0).powf(power),
                    ])
                }))
            }

            Adjustment::HighlightShadow {
                highlight_amount,
                shadow_amount,
            } => Some(image.map_rgb(|rgb| highlight_shadow(rgb, highlight_amount, shadow_amount))),

            Adjustment::Vibrance { amount } => Some(image.map_rgb(|rgb| {
                let sat = saturation_of(rgb);
                let boost = 1.0 + amount * (1.0 - sat);
                scale_around_luma(rgb, boost)
            })),

            Adjustment::NoiseReduction { level, sharpness } => {
                let smoothed = denoise(image, level.max(0.0));
                luma_unsharp(&smoothed, sharpness, NOISE_REDUCTION_SHARPEN_RADIUS)
            }

            Adjustment::Sharpen { sharpness, radius } => luma_unsharp(image, sharpness, radius),

            Adjustment::Bloom { intensity, radius } => bloom(image, intensity, radius),

            Adjustment::ExposureEV { ev } => {
                let gain = 2f32.powf(ev);
                Some(image.map_rgb(|rgb| clamp3([rgb[0] * gain, rgb[1] * gain, rgb[2] * gain])))
            }
        }
    }
}

/// Brightness, then contrast around 0.5, then saturation around Rec.601 luma
pub fn color_controls(rgb: [f32; 3], brightness: f32, contrast: f32, saturation: f32) -> [f32; 3] {
    let mut out = [0.0; 3];
    for c in 0..3 {
        out[c] = ((rgb[c] + brightness) - 0.5) * contrast + 0.5;
    }
    scale_around_luma(out, saturation)
}

/// HSV-style saturation: (max - min) / max
pub fn saturation_of(rgb: [f32; 3]) -> f32 {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    if max <= f32::EPSILON {
        0.0
    } else {
        ((max - min) / max).clamp(0.0, 1.0)
    }
}

/// Approximate RGB of a black body at `kelvin` (normalized)
pub fn kelvin_to_rgb(kelvin: f32) -> [f32; 3] {
    let t = kelvin.clamp(1000.0, 40000.0) / 100.0;

    let r = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };
    let g = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_16 * (t - 60.0).powf(-0.075_514_85)
    };
    let b = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    [
        (r / 255.0).clamp(0.0, 1.0),
        (g / 255.0).clamp(0.0, 1.0),
        (b / 255.0).clamp(0.0, 1.0),
    ]
}

/// Per-channel gains moving the source white point onto the target one
///
/// Gains are normalized to unit luma so the shift changes hue, not exposure.
pub fn white_balance_gains(
    source_kelvin: f32,
    source_tint: f32,
    target_kelvin: f32,
    target_tint: f32,
) -> Option<[f32; 3]> {
    if source_kelvin <= 0.0 || target_kelvin <= 0.0 {
        return None;
    }
    let source = kelvin_to_rgb(source_kelvin);
    let target = kelvin_to_rgb(target_kelvin);

    let mut gains = [0.0; 3];
    for c in 0..3 {
        gains[c] = target[c].max(1e-3) / source[c].max(1e-3);
    }
    gains[1] *= (1.0 + (target_tint - source_tint) * TINT_SCALE).max(0.0);

    let norm = luma(gains);
    if norm <= f32::EPSILON {
        return None;
    }
    Some([gains[0] / norm, gains[1] / norm, gains[2] / norm])
}

fn vignette(image: &Image, intensity: f32, radius: f32) -> Option<Image> {
    if radius <= 0.0 {
        return None;
    }
    let (w, h) = (image.width() as f32, image.height() as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let half_diagonal = (cx * cx + cy * cy).sqrt();
    if half_diagonal <= 0.0 {
        return None;
    }

    Some(image.map_pixels(|x, y, px| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let d = (dx * dx + dy * dy).sqrt() / half_diagonal;
        let falloff = (d / radius).powi(2).min(1.0);
        let factor = (1.0 - intensity * falloff).max(0.0);
        [
            (px[0] * factor).clamp(0.0, 1.0),
            (px[1] * factor).clamp(0.0, 1.0),
            (px[2] * factor).clamp(0.0, 1.0),
            px[3],
        ]
    }))
}

fn highlight_shadow(rgb: [f32; 3], highlight_amount: f32, shadow_amount: f32) -> [f32; 3] {
    let l = luma(rgb);
    if l <= 1e-6 {
        return rgb;
    }
    let shadows = 1.0 - smoothstep(0.0, 0.6, l);
    let highlights = smoothstep(0.4, 1.0, l);
    let lifted = l + shadow_amount * shadows * l * (1.0 - l);
    let target = lifted - (1.0 - highlight_amount) * highlights * lifted * (1.0 - l);
    let scale = target / l;
    clamp3([rgb[0] * scale, rgb[1] * scale, rgb[2] * scale])
}

/// 3x3 mean where the neighbourhood is quiet enough to be noise
fn denoise(image: &Image, level: f32) -> Image {
    let src = image.pixels();
    let (w, h) = (src.width() as i64, src.height() as i64);
    image.map_pixels(|x, y, px| {
        let mut sum = [0.0f32; 3];
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let sx = (x as i64 + dx).clamp(0, w - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, h - 1) as u32;
                let p = src.get_pixel(sx, sy);
                sum[0] += p[0];
                sum[1] += p[1];
                sum[2] += p[2];
            }
        }
        let mean = [sum[0] / 9.0, sum[1] / 9.0, sum[2] / 9.0];
        if (luma([px[0], px[1], px[2]]) - luma(mean)).abs() < level {
            [mean[0], mean[1], mean[2], px[3]]
        } else {
            px
        }
    })
}

/// Add `amount` times the luma detail above a gaussian of `sigma`
fn luma_unsharp(image: &Image, amount: f32, sigma: f32) -> Option<Image> {
    if amount == 0.0 {
        return Some(image.clone());
    }
    let blurred = gaussian_blur(image, sigma, false)?;
    let soft = blurred.pixels();
    Some(image.map_pixels(|x, y, px| {
        let b = soft.get_pixel(x, y);
        let detail = luma([px[0], px[1], px[2]]) - luma([b[0], b[1], b[2]]);
        let lift = amount * detail;
        [
            (px[0] + lift).clamp(0.0, 1.0),
            (px[1] + lift).clamp(0.0, 1.0),
            (px[2] + lift).clamp(0.0, 1.0),
            px[3],
        ]
    }))
}

fn bloom(image: &Image, intensity: f32, radius: f32) -> Option<Image> {
    if radius < 0.0 {
        return None;
    }
    let glow = gaussian_blur(image, radius, true)?;
    let origin = glow.extent();
    Some(glow.map_pixels(|x, y, g| {
        let s = image
            .pixel_at(origin.x + x as i32, origin.y + y as i32)
            .unwrap_or([0.0; 4]);
        [
            (s[0] + intensity * g[0]).clamp(0.0, 1.0),
            (s[1] + intensity * g[1]).clamp(0.0, 1.0),
            (s[2] + intensity * g[2]).clamp(0.0, 1.0),
            (s[3] + intensity * g[3]).clamp(0.0, 1.0),
        ]
    }))
}

fn scale_around_luma(rgb: [f32; 3], factor: f32) -> [f32; 3] {
    let l = luma(rgb);
    clamp3([
        l + (rgb[0] - l) * factor,
        l + (rgb[1] - l) * factor,
        l + (rgb[2] - l) * factor,
    ])
}

fn multiply3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

#[inline]
fn clamp3(rgb: [f32; 3]) -> [f32; 3] {
    [
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
    ]
}
