// SPDX-License-Identifier: GPL-3.0-only

//! Convolution kernels
//!
//! Both kernels sample the source clamped to its edges. With `grow` set the
//! output extent is enlarged by the kernel reach, mirroring how an unbounded
//! blur spreads past the original bounds; otherwise the extent is kept.
//! Kernels return `None` for empty images or non-finite parameters so the
//! caller can fall back to the unblurred input.

use super::{Image, buffer_from_raw};
use rayon::prelude::*;

/// Separable gaussian blur with standard deviation `sigma` pixels
pub fn gaussian_blur(image: &Image, sigma: f32, grow: bool) -> Option<Image> {
    if image.is_empty() || !sigma.is_finite() {
        return None;
    }
    if sigma <= 0.0 {
        return Some(image.clone());
    }

    let half = (3.0 * sigma).ceil().max(1.0) as usize;
    let weights = gaussian_weights(sigma, half);
    let pad = if grow { half } else { 0 };

    let src = image.pixels();
    let (w, h) = (src.width() as usize, src.height() as usize);
    let out_w = w + 2 * pad;
    let out_h = h + 2 * pad;
    let input = src.as_raw();

    // Horizontal pass: out_w x h
    let mut horizontal = vec![0.0f32; out_w * h * 4];
    horizontal
        .par_chunks_mut(out_w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let row_in = &input[y * w * 4..(y + 1) * w * 4];
            for ox in 0..out_w {
                let center = ox as isize - pad as isize;
                let mut acc = [0.0f32; 4];
                for (k, weight) in weights.iter().enumerate() {
                    let sx = clamp_index(center + k as isize - half as isize, w);
                    for c in 0..4 {
                        acc[c] += weight * row_in[sx * 4 + c];
                    }
                }
                row[ox * 4..ox * 4 + 4].copy_from_slice(&acc);
            }
        });

    // Vertical pass: out_w x out_h
    let mut output = vec![0.0f32; out_w * out_h * 4];
    output
        .par_chunks_mut(out_w * 4)
        .enumerate()
        .for_each(|(oy, row)| {
            let center = oy as isize - pad as isize;
            for (k, weight) in weights.iter().enumerate() {
                let sy = clamp_index(center + k as isize - half as isize, h);
                let row_in = &horizontal[sy * out_w * 4..(sy + 1) * out_w * 4];
                for (dst, src) in row.iter_mut().zip(row_in) {
                    *dst += weight * src;
                }
            }
        });

    let extent = image.extent();
    Some(Image::with_origin(
        buffer_from_raw(out_w as u32, out_h as u32, output),
        extent.x - pad as i32,
        extent.y - pad as i32,
    ))
}

/// Disc ("bokeh") blur with optional ring emphasis
///
/// The kernel is a filled disc of `radius` pixels; `ring_amount` adds extra
/// weight to the outer band whose width is `ring_size × radius`. Spans of the
/// disc are summed from per-row prefix sums, so the cost grows with the
/// radius rather than its square.
pub fn disc_blur(
    image: &Image,
    radius: f32,
    ring_amount: f32,
    ring_size: f32,
    grow: bool,
) -> Option<Image> {
    if image.is_empty() || !radius.is_finite() || !ring_amount.is_finite() || !ring_size.is_finite()
    {
        return None;
    }
    if radius < 0.5 {
        return Some(image.clone());
    }

    let reach = radius.ceil() as usize;
    let pad = if grow { reach } else { 0 };
    let inner_radius = radius * (1.0 - ring_size.clamp(0.0, 1.0));
    let ring_amount = ring_amount.max(0.0);

    let outer_spans = disc_spans(radius, reach);
    let inner_spans = disc_spans(inner_radius, reach);

    let src = image.pixels();
    let (w, h) = (src.width() as usize, src.height() as usize);
    let out_w = w + 2 * pad;
    let out_h = h + 2 * pad;

    // Prefix sums over each source row, extended by clamping on both sides
    let offset = pad + reach;
    let span_len = w + 2 * offset + 1;
    let input = src.as_raw();
    let mut prefix = vec![0.0f32; h * span_len * 4];
    prefix
        .par_chunks_mut(span_len * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let row_in = &input[y * w * 4..(y + 1) * w * 4];
            for j in 1..span_len {
                let sx = clamp_index(j as isize - 1 - offset as isize, w);
                for c in 0..4 {
                    row[j * 4 + c] = row[(j - 1) * 4 + c] + row_in[sx * 4 + c];
                }
            }
        });

    let mut output = vec![0.0f32; out_w * out_h * 4];
    output
        .par_chunks_mut(out_w * 4)
        .enumerate()
        .for_each(|(oy, row)| {
            let cy = oy as isize - pad as isize;
            for ox in 0..out_w {
                // Column of the span centre inside the extended prefix rows
                let col = ox + reach;
                let mut outer = [0.0f32; 4];
                let mut inner = [0.0f32; 4];
                let mut outer_count = 0.0f32;
                let mut inner_count = 0.0f32;

                for (i, dy) in (-(reach as isize)..=reach as isize).enumerate() {
                    let sy = clamp_index(cy + dy, h);
                    let base = sy * span_len * 4;
                    if let Some(half) = outer_spans[i] {
                        let lo = base + (col - half) * 4;
                        let hi = base + (col + half + 1) * 4;
                        for c in 0..4 {
                            outer[c] += prefix[hi + c] - prefix[lo + c];
                        }
                        outer_count += (2 * half + 1) as f32;
                    }
                    if ring_amount > 0.0
                        && let Some(half) = inner_spans[i]
                    {
                        let lo = base + (col - half) * 4;
                        let hi = base + (col + half + 1) * 4;
                        for c in 0..4 {
                            inner[c] += prefix[hi + c] - prefix[lo + c];
                        }
                        inner_count += (2 * half + 1) as f32;
                    }
                }

                let norm = (1.0 + ring_amount) * outer_count - ring_amount * inner_count;
                for c in 0..4 {
                    let value = ((1.0 + ring_amount) * outer[c] - ring_amount * inner[c]) / norm;
                    row[ox * 4 + c] = value;
                }
            }
        });

    let extent = image.extent();
    Some(Image::with_origin(
        buffer_from_raw(out_w as u32, out_h as u32, output),
        extent.x - pad as i32,
        extent.y - pad as i32,
    ))
}

/// Half-widths of the disc rows for dy in -reach..=reach
fn disc_spans(radius: f32, reach: usize) -> Vec<Option<usize>> {
    (-(reach as isize)..=reach as isize)
        .map(|dy| {
            let dy = dy as f32;
            if dy.abs() > radius {
                None
            } else {
                Some((radius * radius - dy * dy).sqrt().floor() as usize)
            }
        })
        .collect()
}

fn gaussian_weights(sigma: f32, half: usize) -> Vec<f32> {
    let denom = 2.0 * sigma * sigma;
    let raw: Vec<f32> = (0..=2 * half)
        .map(|i| {
            let d = i as f32 - half as f32;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
