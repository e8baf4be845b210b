// SPDX-License-Identifier: GPL-3.0-only

//! Color-grade engine

use super::adjustment::Adjustment;
use super::catalog::FilterLook;
use crate::imaging::Image;
use tracing::debug;

/// Run `adjustments` in order
///
/// A step that produces no output is skipped and its input carries on to
/// the next step, so the chain always yields an image.
pub fn apply(image: &Image, adjustments: &[Adjustment]) -> Image {
    adjustments
        .iter()
        .fold(image.clone(), |current, adjustment| {
            match adjustment.apply(&current) {
                Some(next) => next,
                None => {
                    debug!(
                        step = adjustment.name(),
                        extent = ?current.extent(),
                        "Adjustment produced no output, passing input through"
                    );
                    current
                }
            }
        })
}

/// Grade with a catalog look
pub fn apply_look(image: &Image, look: &FilterLook) -> Image {
    apply(image, &look.adjustments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Extent;

    #[test]
    fn test_failed_step_passes_through() {
        let image = Image::solid(Extent::from_size(4, 4), [0.5, 0.5, 0.5, 1.0]);
        let chain = [
            Adjustment::Gamma { power: f32::NAN },
            Adjustment::ExposureEV { ev: 1.0 },
        ];
        let out = apply(&image, &chain);
        assert!((out.pixel_at(0, 0).unwrap()[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_chain_returns_same_storage() {
        let image = Image::solid(Extent::from_size(4, 4), [0.2; 4]);
        assert!(apply(&image, &[]).ptr_eq(&image));
    }

    #[test]
    fn test_order_matters() {
        let image = Image::solid(Extent::from_size(2, 2), [0.5, 0.5, 0.5, 1.0]);
        let a = Adjustment::ExposureEV { ev: 1.0 };
        let b = Adjustment::ColorControls {
            brightness: -0.5,
            contrast: 1.0,
            saturation: 1.0,
        };
        let ab = apply(&image, &[a, b]).pixel_at(0, 0).unwrap()[0];
        let ba = apply(&image, &[b, a]).pixel_at(0, 0).unwrap()[0];
        assert!((ab - 0.5).abs() < 1e-5);
        assert!(ba.abs() < 1e-5);
    }
}
