// SPDX-License-Identifier: GPL-3.0-only

//! Per-session mutable effect state

use crate::effects::LightLeak;
use crate::frame::{FocusPoint, SubjectMask};
use crate::imaging::Image;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// State carried from one frame to the next
///
/// Owned by exactly one pipeline; only the frame worker mutates it.
#[derive(Debug)]
pub struct EffectState {
    pub cached_light_leak: Option<LightLeak>,
    pub last_person_mask: Option<SubjectMask>,
    pub last_focus_point: Option<FocusPoint>,
    pub last_composited_frame: Option<Image>,
    pub rng: StdRng,
}

impl Default for EffectState {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectState {
    /// Fresh state with an OS-seeded random source
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic state for reproducible output
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            cached_light_leak: None,
            last_person_mask: None,
            last_focus_point: None,
            last_composited_frame: None,
            rng,
        }
    }

    /// Replace the subject mask; `None` keeps the previous one
    pub fn update_person_mask(&mut self, mask: Option<SubjectMask>) {
        if let Some(mask) = mask {
            self.last_person_mask = Some(mask);
        }
    }

    /// Drop every cached value (session stop or restart)
    pub fn reset(&mut self) {
        debug!("Resetting effect state");
        self.cached_light_leak = None;
        self.last_person_mask = None;
        self.last_focus_point = None;
        self.last_composited_frame = None;
    }
}
