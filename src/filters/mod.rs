// SPDX-License-Identifier: GPL-3.0-only

//! Color grading: adjustments, the grade engine and the look catalog

pub mod adjustment;
pub mod catalog;
pub mod grade;

pub use adjustment::Adjustment;
pub use catalog::{FilterLook, LookDefaults, LookFamily, LookId, lookup};
