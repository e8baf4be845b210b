// SPDX-License-Identifier: GPL-3.0-only

//! User-selected effect parameters for one frame

use crate::constants::{BlurMode, EffectKind};
use crate::filters::{LookId, lookup};
use crate::frame::FocusPoint;
use serde::{Deserialize, Serialize};

/// Everything the controls can change, read by the compositor every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParams {
    pub look: LookId,
    grain: f32,
    light_leak: f32,
    blur: f32,
    pub blur_mode: BlurMode,
    pub focus: FocusPoint,
    pub overlay_enabled: bool,
    /// Fixed stamp text; the current date is stamped when `None`
    pub stamp_text: Option<String>,
}

impl Default for EffectParams {
    fn default() -> Self {
        Self::for_look(LookId::None)
    }
}

impl EffectParams {
    /// Parameters with the look's companion intensities
    pub fn for_look(look: LookId) -> Self {
        let defaults = lookup(look).defaults;
        Self {
            look,
            grain: defaults.grain,
            light_leak: defaults.light_leak,
            blur: defaults.blur,
            blur_mode: BlurMode::default(),
            focus: FocusPoint::default(),
            overlay_enabled: false,
            stamp_text: None,
        }
    }

    /// Switch look and adopt its companion intensities
    pub fn select_look(&mut self, look: LookId) {
        let defaults = lookup(look).defaults;
        self.look = look;
        self.grain = defaults.grain;
        self.light_leak = defaults.light_leak;
        self.blur = defaults.blur;
    }

    pub fn intensity(&self, kind: EffectKind) -> f32 {
        match kind {
            EffectKind::Grain => self.grain,
            EffectKind::LightLeak => self.light_leak,
            EffectKind::Blur => self.blur,
        }
    }

    /// Set an effect intensity, clamped to [0, 1]; NaN is treated as 0
    pub fn set_intensity(&mut self, kind: EffectKind, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        match kind {
            EffectKind::Grain => self.grain = value,
            EffectKind::LightLeak => self.light_leak = value,
            EffectKind::Blur => self.blur = value,
        }
    }

    pub fn with_intensity(mut self, kind: EffectKind, value: f32) -> Self {
        self.set_intensity(kind, value);
        self
    }

    pub fn is_enabled(&self, kind: EffectKind) -> bool {
        self.intensity(kind) > 0.0
    }

    /// True when the segmentation producer should be fed frames
    pub fn wants_subject_mask(&self) -> bool {
        self.blur_mode == BlurMode::Selective && self.is_enabled(EffectKind::Blur)
    }
}
