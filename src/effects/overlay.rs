// SPDX-License-Identifier: GPL-3.0-only

//! Date-back style overlay stamp
//!
//! Text is drawn in orange into the bottom-right corner. The seven-segment
//! face is preferred when it can draw every character; otherwise the whole
//! string falls back to a 5x7 monospaced face of the same height. Glyphs
//! are built from filled rectangles with `imageproc`.

use crate::constants::overlay::{
    DEFAULT_FORMAT, GLYPH_HEIGHT, GLYPH_SPACING, MARGIN, STAMP_COLOR,
};
use crate::imaging::Image;
use crate::imaging::blend::source_over;
use chrono::{DateTime, TimeZone};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::fmt::Write;
use tracing::{trace, warn};

/// Segment stroke thickness
const SEGMENT: u32 = 3;
const SEVEN_SEGMENT_WIDTH: u32 = 14;
/// Size of one font dot in the monospaced face
const DOT: u32 = GLYPH_HEIGHT / 7;

/// Glyph faces in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSet {
    /// Decorative LCD-style digits
    SevenSegment,
    /// Built-in 5x7 bitmap font
    Monospace,
}

impl GlyphSet {
    /// True if every character of `text` has a glyph in this face
    pub fn covers(&self, text: &str) -> bool {
        text.chars().all(|c| match self {
            GlyphSet::SevenSegment => seven_segment_mask(c).is_some(),
            GlyphSet::Monospace => monospace_rows(c).is_some(),
        })
    }

    pub fn cell_width(&self) -> u32 {
        match self {
            GlyphSet::SevenSegment => SEVEN_SEGMENT_WIDTH,
            GlyphSet::Monospace => DOT * 5,
        }
    }

    /// Width in pixels of `text` set in this face
    pub fn text_width(&self, text: &str) -> u32 {
        let n = text.chars().count() as u32;
        if n == 0 {
            return 0;
        }
        n * self.cell_width() + (n - 1) * GLYPH_SPACING
    }

    fn draw(&self, canvas: &mut RgbaImage, c: char, x: i32, color: Rgba<u8>) {
        match self {
            GlyphSet::SevenSegment => draw_seven_segment(canvas, c, x, color),
            GlyphSet::Monospace => draw_monospace(canvas, c, x, color),
        }
    }
}

/// Draws the overlay text onto frames
#[derive(Debug, Clone)]
pub struct OverlayStamper {
    glyph_sets: Vec<GlyphSet>,
}

impl Default for OverlayStamper {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OverlayStamper {
    pub fn new(decorative_enabled: bool) -> Self {
        let mut glyph_sets = Vec::with_capacity(2);
        if decorative_enabled {
            glyph_sets.push(GlyphSet::SevenSegment);
        }
        glyph_sets.push(GlyphSet::Monospace);
        Self { glyph_sets }
    }

    pub fn glyph_sets(&self) -> &[GlyphSet] {
        &self.glyph_sets
    }

    /// Face used for `text`: the first one that covers it
    ///
    /// When none covers it the monospaced face is used and missing
    /// characters come out as blank cells.
    pub fn glyph_set_for(&self, text: &str) -> GlyphSet {
        self.glyph_sets
            .iter()
            .copied()
            .find(|set| set.covers(text))
            .unwrap_or(GlyphSet::Monospace)
    }

    /// Render `text` as an overlay the size of the text block
    pub fn render(&self, text: &str) -> Option<RgbaImage> {
        let set = self.glyph_set_for(text);
        let width = set.text_width(text);
        if width == 0 {
            return None;
        }
        let color = Rgba(STAMP_COLOR);
        let mut canvas = RgbaImage::new(width, GLYPH_HEIGHT);
        let step = (set.cell_width() + GLYPH_SPACING) as i32;
        for (i, c) in text.chars().enumerate() {
            set.draw(&mut canvas, c, i as i32 * step, color);
        }
        Some(canvas)
    }

    /// Stamp `text` into the bottom-right corner, extent unchanged
    pub fn stamp(&self, image: &Image, text: &str) -> Image {
        let Some(overlay) = self.render(text) else {
            return image.clone();
        };
        let x = image.width() as i32 - MARGIN as i32 - overlay.width() as i32;
        let y = image.height() as i32 - MARGIN as i32 - overlay.height() as i32;
        trace!(text, x, y, "Stamping overlay");
        source_over(image, &overlay, (x, y))
    }
}

/// Format `now` with a chrono pattern, falling back to the default pattern
pub fn date_text<Tz: TimeZone>(format: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut text = String::new();
    if write!(text, "{}", now.format(format)).is_ok() {
        return text;
    }
    warn!(format, "Invalid stamp format, using default");
    text.clear();
    let _ = write!(text, "{}", now.format(DEFAULT_FORMAT));
    text
}

fn fill(canvas: &mut RgbaImage, x: i32, y: i32, w: u32, h: u32, color: Rgba<u8>) {
    if w > 0 && h > 0 {
        draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(w, h), color);
    }
}

// Segment bits: a (top), b (upper right), c (lower right), d (bottom),
// e (lower left), f (upper left), g (middle)
const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Segment set for a character; punctuation is drawn separately and maps to 0
fn seven_segment_mask(c: char) -> Option<u8> {
    let mask = match c {
        '0' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
        '1' => SEG_B | SEG_C,
        '2' => SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
        '3' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
        '4' => SEG_B | SEG_C | SEG_F | SEG_G,
        '5' => SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,
        '6' => SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
        '7' => SEG_A | SEG_B | SEG_C,
        '8' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
        '9' => SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
        '-' => SEG_G,
        ' ' | ':' | '.' | '\'' | '/' => 0,
        _ => return None,
    };
    Some(mask)
}

fn draw_seven_segment(canvas: &mut RgbaImage, c: char, x: i32, color: Rgba<u8>) {
    let Some(mask) = seven_segment_mask(c) else {
        return;
    };
    let w = SEVEN_SEGMENT_WIDTH;
    let h = GLYPH_HEIGHT;
    let t = SEGMENT;
    let mid = (h - t) / 2;
    let (xi, ti, wi, hi, midi) = (x, t as i32, w as i32, h as i32, mid as i32);

    let segments = [
        (SEG_A, xi + ti, 0, w - 2 * t, t),
        (SEG_B, xi + wi - ti, ti, t, mid - t),
        (SEG_C, xi + wi - ti, midi + ti, t, h - 2 * t - mid),
        (SEG_D, xi + ti, hi - ti, w - 2 * t, t),
        (SEG_E, xi, midi + ti, t, h - 2 * t - mid),
        (SEG_F, xi, ti, t, mid - t),
        (SEG_G, xi + ti, midi, w - 2 * t, t),
    ];
    for (bit, sx, sy, sw, sh) in segments {
        if mask & bit != 0 {
            fill(canvas, sx, sy, sw, sh, color);
        }
    }

    let centre = xi + (wi - ti) / 2;
    match c {
        '.' => fill(canvas, centre, hi - ti, t, t, color),
        ':' => {
            fill(canvas, centre, hi / 3 - ti / 2, t, t, color);
            fill(canvas, centre, 2 * hi / 3 - ti / 2, t, t, color);
        }
        '\'' => fill(canvas, centre, 0, t, 2 * t, color),
        '/' => {
            let steps = (h / t) as i32;
            for i in 0..steps {
                let sx = xi + (wi - ti) * i / (steps - 1).max(1);
                let sy = hi - ti * (i + 1);
                fill(canvas, sx, sy, t, t, color);
            }
        }
        _ => {}
    }
}

/// Rows of a 5x7 glyph, bit 4 is the leftmost column
fn monospace_rows(c: char) -> Option<[u8; 7]> {
    let rows = match c.to_ascii_uppercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        ' ' => [0x00; 7],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '?' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
        _ => return None,
    };
    Some(rows)
}

fn draw_monospace(canvas: &mut RgbaImage, c: char, x: i32, color: Rgba<u8>) {
    let Some(rows) = monospace_rows(c) else {
        return;
    };
    // Bottom-align the 7 rows inside the glyph cell
    let top = (GLYPH_HEIGHT - DOT * 7) as i32;
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..5 {
            if bits & (0x10 >> col) != 0 {
                let px = x + (col * DOT) as i32;
                let py = top + row as i32 * DOT as i32;
                fill(canvas, px, py, DOT, DOT, color);
            }
        }
    }
}
