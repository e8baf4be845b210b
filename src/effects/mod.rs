// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame effect compositors layered on top of a graded look

pub mod blur;
pub mod grain;
pub mod light_leak;
pub mod overlay;

pub use blur::BlurEngine;
pub use light_leak::LightLeak;
pub use overlay::OverlayStamper;
