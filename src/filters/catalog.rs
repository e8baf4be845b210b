// SPDX-License-Identifier: GPL-3.0-only

//! Look catalog
//!
//! Every look is a fixed, ordered list of [`Adjustment`]s plus the grain,
//! light-leak and blur intensities the UI selects alongside it. The table is
//! built once on first use and never changes afterwards.

use super::adjustment::Adjustment;
use crate::constants::NEUTRAL_KELVIN;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Catalog family of a look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookFamily {
    /// Film stock emulations
    Film,
    /// Tonal presets calibrated against Leica profiles
    Leica,
    /// Lens rendering simulations
    Lens,
}

impl LookFamily {
    pub fn display_name(&self) -> &'static str {
        match self {
            LookFamily::Film => "Film",
            LookFamily::Leica => "Leica",
            LookFamily::Lens => "Lens",
        }
    }
}

/// Identifier of every look the catalog provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LookId {
    // Film
    #[default]
    None,
    Portra400,
    Velvia50,
    TriX400,
    Gold200,
    Cinestill800T,
    Ektachrome,
    FujiSuperia,
    KodakVision3,
    IlfordHP5,
    AgfaVista,
    // Leica
    LeicaStandard,
    LeicaVivid,
    LeicaNatural,
    LeicaClassic,
    LeicaContemporary,
    LeicaEternal,
    LeicaBWNatural,
    LeicaBWHighContrast,
    GregWilliams,
    // Lens
    Summilux28,
    Summilux35,
    Noctilux50,
    ApoTelyt135,
}

impl LookId {
    /// All looks in catalog order
    pub const ALL: [LookId; 24] = [
        LookId::None,
        LookId::Portra400,
        LookId::Velvia50,
        LookId::TriX400,
        LookId::Gold200,
        LookId::Cinestill800T,
        LookId::Ektachrome,
        LookId::FujiSuperia,
        LookId::KodakVision3,
        LookId::IlfordHP5,
        LookId::AgfaVista,
        LookId::LeicaStandard,
        LookId::LeicaVivid,
        LookId::LeicaNatural,
        LookId::LeicaClassic,
        LookId::LeicaContemporary,
        LookId::LeicaEternal,
        LookId::LeicaBWNatural,
        LookId::LeicaBWHighContrast,
        LookId::GregWilliams,
        LookId::Summilux28,
        LookId::Summilux35,
        LookId::Noctilux50,
        LookId::ApoTelyt135,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            LookId::None => "None",
            LookId::Portra400 => "Portra 400",
            LookId::Velvia50 => "Velvia 50",
            LookId::TriX400 => "Tri-X 400",
            LookId::Gold200 => "Gold 200",
            LookId::Cinestill800T => "Cinestill 800T",
            LookId::Ektachrome => "Ektachrome",
            LookId::FujiSuperia => "Fuji Superia",
            LookId::KodakVision3 => "Kodak Vision3",
            LookId::IlfordHP5 => "Ilford HP5",
            LookId::AgfaVista => "Agfa Vista",
            LookId::LeicaStandard => "Leica Standard",
            LookId::LeicaVivid => "Leica Vivid",
            LookId::LeicaNatural => "Leica Natural",
            LookId::LeicaClassic => "Leica Classic",
            LookId::LeicaContemporary => "Leica Contemporary",
            LookId::LeicaEternal => "Leica Eternal",
            LookId::LeicaBWNatural => "Leica B&W Natural",
            LookId::LeicaBWHighContrast => "Leica B&W High Contrast",
            LookId::GregWilliams => "Greg Williams",
            LookId::Summilux28 => "Summilux 28mm",
            LookId::Summilux35 => "Summilux 35mm",
            LookId::Noctilux50 => "Noctilux 50mm",
            LookId::ApoTelyt135 => "APO-Telyt 135mm",
        }
    }

    /// Look up by display name, ignoring case, spaces and punctuation
    ///
    /// "Portra 400", "portra-400" and "PORTRA400" all resolve to the same look.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|id| normalize(id.name()) == wanted)
    }

    pub fn family(&self) -> LookFamily {
        match self {
            LookId::None
            | LookId::Portra400
            | LookId::Velvia50
            | LookId::TriX400
            | LookId::Gold200
            | LookId::Cinestill800T
            | LookId::Ektachrome
            | LookId::FujiSuperia
            | LookId::KodakVision3
            | LookId::IlfordHP5
            | LookId::AgfaVista => LookFamily::Film,
            LookId::LeicaStandard
            | LookId::LeicaVivid
            | LookId::LeicaNatural
            | LookId::LeicaClassic
            | LookId::LeicaContemporary
            | LookId::LeicaEternal
            | LookId::LeicaBWNatural
            | LookId::LeicaBWHighContrast
            | LookId::GregWilliams => LookFamily::Leica,
            LookId::Summilux28 | LookId::Summilux35 | LookId::Noctilux50 | LookId::ApoTelyt135 => {
                LookFamily::Lens
            }
        }
    }
}

impl std::fmt::Display for LookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '&')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Effect intensities selected together with a look
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LookDefaults {
    pub grain: f32,
    pub light_leak: f32,
    pub blur: f32,
}

/// A named, immutable grade
#[derive(Debug, Clone, PartialEq)]
pub struct FilterLook {
    pub id: LookId,
    pub family: LookFamily,
    pub adjustments: Vec<Adjustment>,
    pub defaults: LookDefaults,
}

static CATALOG: LazyLock<Vec<FilterLook>> = LazyLock::new(|| {
    LookId::ALL
        .iter()
        .map(|&id| FilterLook {
            id,
            family: id.family(),
            adjustments: adjustments_for(id),
            defaults: defaults_for(id),
        })
        .collect()
});

/// Fetch a look; every identifier is present
pub fn lookup(id: LookId) -> &'static FilterLook {
    let index = LookId::ALL.iter().position(|&candidate| candidate == id).unwrap_or(0);
    &CATALOG[index]
}

/// All looks in catalog order
pub fn all() -> &'static [FilterLook] {
    &CATALOG
}

fn color_controls(brightness: f32, contrast: f32, saturation: f32) -> Adjustment {
    Adjustment::ColorControls {
        brightness,
        contrast,
        saturation,
    }
}

fn white_balance(source_kelvin: f32, target_kelvin: f32, target_tint: f32) -> Adjustment {
    Adjustment::TemperatureTint {
        source_kelvin,
        source_tint: 0.0,
        target_kelvin,
        target_tint,
    }
}

/// White-balance shift away from the neutral white point
fn temperature(target_kelvin: f32, target_tint: f32) -> Adjustment {
    white_balance(NEUTRAL_KELVIN, target_kelvin, target_tint)
}

fn vignette(intensity: f32, radius: f32) -> Adjustment {
    Adjustment::Vignette { intensity, radius }
}

fn highlight_shadow(highlight_amount: f32, shadow_amount: f32) -> Adjustment {
    Adjustment::HighlightShadow {
        highlight_amount,
        shadow_amount,
    }
}

fn channel_gains(r: f32, g: f32, b: f32) -> Adjustment {
    Adjustment::ColorMatrix {
        rows: [[r, 0.0, 0.0, 0.0], [0.0, g, 0.0, 0.0], [0.0, 0.0, b, 0.0]],
    }
}

/// Lens preset: (vignetting, bokeh radius in px, warmth in Kelvin)
struct LensProfile {
    vignetting: f32,
    bokeh_radius: f32,
    warmth: f32,
}

impl LensProfile {
    fn adjustments(&self) -> Vec<Adjustment> {
        vec![
            temperature(NEUTRAL_KELVIN - self.warmth, 0.0),
            vignette(self.vignetting, 1.5 + self.bokeh_radius / 100.0),
            highlight_shadow(0.85, 0.15),
        ]
    }
}

const SUMMILUX_28: LensProfile = LensProfile {
    vignetting: 0.12,
    bokeh_radius: 28.0,
    warmth: 100.0,
};
const SUMMILUX_35: LensProfile = LensProfile {
    vignetting: 0.18,
    bokeh_radius: 35.0,
    warmth: 150.0,
};
const NOCTILUX_50_BOKEH: f32 = 30.0;
const APO_TELYT_135: LensProfile = LensProfile {
    vignetting: 0.08,
    bokeh_radius: 22.0,
    warmth: 50.0,
};

/// Blur intensity at which the selective bokeh radius matches the lens bokeh
const LENS_BLUR_DIVISOR: f32 = 35.0;

fn adjustments_for(id: LookId) -> Vec<Adjustment> {
    match id {
        LookId::None => Vec::new(),
        LookId::Portra400 => vec![
            color_controls(0.05, 1.05, 0.9),
            Adjustment::Sepia { intensity: 0.1 },
            vignette(0.3, 1.5),
        ],
        LookId::Velvia50 => vec![color_controls(-0.05, 1.3, 1.5), vignette(0.4, 1.3)],
        LookId::TriX400 => vec![
            color_controls(0.02, 1.2, 0.0),
            Adjustment::NoiseReduction {
                level: 0.02,
                sharpness: 1.0,
            },
            vignette(0.5, 1.2),
        ],
        LookId::Gold200 => vec![
            color_controls(0.08, 1.1, 1.2),
            white_balance(7000.0, 5500.0, 5.0),
        ],
        LookId::Cinestill800T => vec![
            color_controls(-0.02, 1.15, 1.1),
            white_balance(5000.0, 3200.0, 10.0),
            Adjustment::Bloom {
                intensity: 0.3,
                radius: 8.0,
            },
            vignette(0.35, 1.4),
        ],
        LookId::Ektachrome => vec![
            color_controls(0.0, 1.25, 1.3),
            Adjustment::Vibrance { amount: 0.5 },
        ],
        LookId::FujiSuperia => vec![
            color_controls(0.06, 1.08, 1.15),
            temperature(5800.0, 3.0),
        ],
        LookId::KodakVision3 => vec![
            color_controls(-0.03, 1.18, 0.95),
            temperature(5600.0, -5.0),
            vignette(0.25, 1.8),
        ],
        LookId::IlfordHP5 => vec![
            color_controls(-0.02, 1.3, 0.0),
            Adjustment::Sharpen {
                sharpness: 0.4,
                radius: 1.69,
            },
            vignette(0.6, 1.0),
        ],
        LookId::AgfaVista => vec![
            color_controls(0.1, 1.12, 1.25),
            temperature(6000.0, 8.0),
            Adjustment::Vibrance { amount: 0.3 },
        ],

        LookId::LeicaStandard => vec![
            color_controls(0.0, 0.95, 0.98),
            temperature(6200.0, 0.0),
            channel_gains(0.92, 0.976, 1.03),
            highlight_shadow(0.8, 0.3),
        ],
        LookId::LeicaVivid => vec![
            color_controls(0.0, 1.15, 1.08),
            temperature(6800.0, 0.0),
            channel_gains(1.08, 1.03, 0.976),
            Adjustment::Gamma { power: 2.3 / 2.2 },
            highlight_shadow(0.7, 0.1),
        ],
        LookId::LeicaNatural => vec![
            color_controls(0.0, 0.85, 0.88),
            temperature(6300.0, 0.0),
            channel_gains(0.953, 1.0, 1.016),
            Adjustment::Gamma { power: 2.0 / 2.2 },
            highlight_shadow(0.9, 0.2),
        ],
        LookId::LeicaClassic => vec![
            color_controls(0.03, 1.10, 1.05),
            temperature(5800.0, 3.0),
            Adjustment::Gamma { power: 2.4 / 2.2 },
            Adjustment::Sepia { intensity: 0.05 },
            highlight_shadow(0.7, 0.4),
            vignette(0.4, 1.6),
        ],
        LookId::LeicaContemporary => vec![
            color_controls(0.02, 1.05, 1.02),
            temperature(6400.0, 2.0),
            highlight_shadow(0.8, 0.2),
            vignette(0.2, 2.0),
        ],
        LookId::LeicaEternal => vec![
            color_controls(-0.02, 1.25, 1.15),
            temperature(6600.0, -8.0),
            Adjustment::Vibrance { amount: 0.5 },
            vignette(0.45, 1.5),
        ],
        LookId::LeicaBWNatural => vec![
            color_controls(-0.02, 1.1, 0.0),
            Adjustment::ExposureEV { ev: -0.15 },
            Adjustment::NoiseReduction {
                level: 0.02,
                sharpness: 0.8,
            },
            vignette(0.3, 1.8),
        ],
        LookId::LeicaBWHighContrast => vec![
            color_controls(-0.05, 1.35, 0.0),
            Adjustment::ExposureEV { ev: -0.45 },
            Adjustment::Sharpen {
                sharpness: 0.5,
                radius: 1.5,
            },
            vignette(0.6, 1.2),
        ],
        LookId::GregWilliams => vec![
            color_controls(-0.03, 1.40, 0.85),
            temperature(5900.0, 4.0),
            Adjustment::Sharpen {
                sharpness: 0.4,
                radius: 2.0,
            },
            highlight_shadow(0.6, 0.5),
            vignette(0.55, 1.3),
        ],

        LookId::Summilux28 => SUMMILUX_28.adjustments(),
        LookId::Summilux35 => SUMMILUX_35.adjustments(),
        LookId::Noctilux50 => vec![
            color_controls(0.02, 1.08, 1.05),
            temperature(6200.0, 3.0),
            vignette(0.25, 1.8),
            Adjustment::Bloom {
                intensity: 0.15,
                radius: 10.0,
            },
            highlight_shadow(0.9, 0.2),
        ],
        LookId::ApoTelyt135 => APO_TELYT_135.adjustments(),
    }
}

fn defaults_for(id: LookId) -> LookDefaults {
    let grain = match id {
        LookId::None => 0.0,
        LookId::Portra400 => 0.12,
        LookId::Velvia50 => 0.08,
        LookId::TriX400 => 0.25,
        LookId::Gold200 => 0.10,
        LookId::Cinestill800T => 0.30,
        LookId::Ektachrome => 0.06,
        LookId::FujiSuperia => 0.15,
        LookId::KodakVision3 => 0.18,
        LookId::IlfordHP5 => 0.35,
        LookId::AgfaVista => 0.20,
        LookId::LeicaClassic => 0.15,
        LookId::LeicaEternal => 0.20,
        LookId::GregWilliams => 0.25,
        _ => 0.0,
    };
    let light_leak = match id {
        LookId::Gold200 => 0.15,
        LookId::Cinestill800T => 0.20,
        LookId::AgfaVista => 0.10,
        LookId::Portra400 => 0.05,
        _ => 0.0,
    };
    let blur = match id {
        LookId::Summilux28 => SUMMILUX_28.bokeh_radius / LENS_BLUR_DIVISOR,
        LookId::Summilux35 => SUMMILUX_35.bokeh_radius / LENS_BLUR_DIVISOR,
        LookId::Noctilux50 => NOCTILUX_50_BOKEH / LENS_BLUR_DIVISOR,
        LookId::ApoTelyt135 => APO_TELYT_135.bokeh_radius / LENS_BLUR_DIVISOR,
        _ => 0.0,
    };
    LookDefaults {
        grain,
        light_leak,
        blur,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_identifier() {
        for id in LookId::ALL {
            assert_eq!(lookup(id).id, id);
        }
        assert_eq!(all().len(), LookId::ALL.len());
    }

    #[test]
    fn test_from_name_is_forgiving() {
        assert_eq!(LookId::from_name("Portra 400"), Some(LookId::Portra400));
        assert_eq!(LookId::from_name("portra-400"), Some(LookId::Portra400));
        assert_eq!(LookId::from_name("TRI-X 400"), Some(LookId::TriX400));
        assert_eq!(
            LookId::from_name("leica b&w high contrast"),
            Some(LookId::LeicaBWHighContrast)
        );
        assert_eq!(LookId::from_name("Kodachrome"), None);
        assert_eq!(LookId::from_name(""), None);
    }

    #[test]
    fn test_lens_profile_vignette_radius() {
        let look = lookup(LookId::Summilux28);
        assert_eq!(
            look.adjustments[1],
            Adjustment::Vignette {
                intensity: 0.12,
                radius: 1.5 + 0.28,
            }
        );
        assert!((look.defaults.blur - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_lens_warmth_shifts_from_neutral_white() {
        let look = lookup(LookId::Summilux28);
        assert_eq!(
            look.adjustments[0],
            Adjustment::TemperatureTint {
                source_kelvin: NEUTRAL_KELVIN,
                source_tint: 0.0,
                target_kelvin: NEUTRAL_KELVIN - 100.0,
                target_tint: 0.0,
            }
        );
    }

    #[test]
    fn test_none_is_empty() {
        assert!(lookup(LookId::None).adjustments.is_empty());
        assert_eq!(lookup(LookId::None).defaults, LookDefaults::default());
    }
}
