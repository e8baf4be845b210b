// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the look catalog and grade engine

use retro_camera::filters::adjustment::saturation_of;
use retro_camera::filters::catalog::{self, LookFamily};
use retro_camera::filters::grade;
use retro_camera::{Extent, Image, LookId};
use std::collections::HashSet;

fn flat(color: [f32; 3]) -> Image {
    Image::solid(Extent::from_size(40, 30), [color[0], color[1], color[2], 1.0])
}

fn mean_saturation(image: &Image) -> f32 {
    let pixels = image.pixels();
    let sum: f32 = pixels.pixels().map(|p| saturation_of([p[0], p[1], p[2]])).sum();
    sum / (pixels.width() * pixels.height()) as f32
}

#[test]
fn test_catalog_is_complete() {
    let looks = catalog::all();
    assert_eq!(looks.len(), 24);

    let ids: HashSet<LookId> = looks.iter().map(|look| look.id).collect();
    assert_eq!(ids.len(), 24);

    let count = |family| looks.iter().filter(|look| look.family == family).count();
    assert_eq!(count(LookFamily::Film), 11);
    assert_eq!(count(LookFamily::Leica), 9);
    assert_eq!(count(LookFamily::Lens), 4);

    for &id in LookId::ALL.iter() {
        assert_eq!(catalog::lookup(id).id, id);
    }
}

#[test]
fn test_names_resolve() {
    for &id in LookId::ALL.iter() {
        assert_eq!(LookId::from_name(id.name()), Some(id));
    }
    assert_eq!(LookId::from_name("portra-400"), Some(LookId::Portra400));
    assert_eq!(LookId::from_name("Kodachrome"), None);
}

#[test]
fn test_companion_defaults() {
    let grain = |id| catalog::lookup(id).defaults.grain;
    let leak = |id| catalog::lookup(id).defaults.light_leak;
    assert_eq!(grain(LookId::None), 0.0);
    assert!((grain(LookId::IlfordHP5) - 0.35).abs() < 1e-6);
    assert!((leak(LookId::Gold200) - 0.15).abs() < 1e-6);
    assert_eq!(leak(LookId::Velvia50), 0.0);
    for look in catalog::all() {
        let d = look.defaults;
        for v in [d.grain, d.light_leak, d.blur] {
            assert!((0.0..=1.0).contains(&v), "{}", look.id);
        }
        if look.family != LookFamily::Lens {
            assert_eq!(d.blur, 0.0);
        }
    }
}

#[test]
fn test_portra_brightens_mid_gray() {
    let image = flat([0.5, 0.5, 0.5]);
    let graded = grade::apply_look(&image, catalog::lookup(LookId::Portra400));
    let (before, _) = image.luma_stats();
    let (after, _) = graded.luma_stats();
    assert!(after > before, "{} <= {}", after, before);
}

#[test]
fn test_portra_desaturates_tinted_midtone() {
    let image = flat([0.6, 0.5, 0.4]);
    let graded = grade::apply_look(&image, catalog::lookup(LookId::Portra400));
    assert!(mean_saturation(&graded) < mean_saturation(&image));
}

#[test]
fn test_every_look_grades_without_panicking() {
    let image = flat([0.4, 0.5, 0.6]);
    for look in catalog::all() {
        let graded = grade::apply_look(&image, look);
        assert!(!graded.is_empty(), "{}", look.id);
        for p in graded.pixels().pixels() {
            assert!(p.0.iter().all(|v| v.is_finite()), "{}", look.id);
        }
    }
}

#[test]
fn test_monochrome_looks_drop_color() {
    let image = flat([0.7, 0.4, 0.2]);
    for id in [LookId::TriX400, LookId::IlfordHP5, LookId::LeicaBWNatural] {
        let graded = grade::apply_look(&image, catalog::lookup(id));
        assert!(mean_saturation(&graded) < 0.1, "{}", id);
    }
}
