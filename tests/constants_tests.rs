// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use retro_camera::constants::{blur, light_leak, overlay};
use retro_camera::{BlurMode, EffectKind};

#[test]
fn test_effect_kinds() {
    assert_eq!(EffectKind::ALL.len(), 3);
    for kind in EffectKind::ALL {
        assert!(!kind.display_name().is_empty());
    }
}

#[test]
fn test_blur_mode_names() {
    for mode in BlurMode::ALL {
        assert_eq!(BlurMode::from_name(mode.display_name()), Some(mode));
    }
    assert_eq!(BlurMode::from_name("tilt"), None);
    assert_eq!(BlurMode::default(), BlurMode::Selective);
}

#[test]
fn test_selective_blur_is_stronger() {
    // Selective mode blurs harder so the sharp subject stands out
    assert!(blur::SELECTIVE_BOKEH_RADIUS > blur::FULL_BOKEH_RADIUS);
    assert!(blur::SELECTIVE_GAUSSIAN_RADIUS > blur::FULL_GAUSSIAN_RADIUS);
    assert!(blur::MASK_INNER_FRACTION < blur::MASK_OUTER_FRACTION);
}

#[test]
fn test_light_leak_tuning() {
    assert_eq!(light_leak::REFRESH_INTERVAL.as_secs(), 5);
    assert!(light_leak::INTENSITY_DAMPING > 0.0 && light_leak::INTENSITY_DAMPING <= 1.0);
    assert_eq!(light_leak::WARM_COLORS.len(), 5);
}

#[test]
fn test_overlay_layout() {
    assert_eq!(overlay::GLYPH_HEIGHT, 24);
    assert_eq!(overlay::MARGIN, 20);
}
