// SPDX-License-Identifier: MPL-2.0

//! Retro Camera - real-time film-look filter pipeline
//!
//! Camera frames are graded with a catalog look and layered with grain,
//! light leaks, depth-of-field blur and a date stamp. Stills reuse the last
//! composited frame.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`imaging`]: positioned float images, kernels and blend modes
//! - [`frame`]: camera buffers, orientation, focus points and subject masks
//! - [`filters`]: adjustments, the look catalog and the grade engine
//! - [`effects`]: grain, light leak, selective blur and the overlay stamp
//! - [`pipelines`]: the frame compositor, worker thread and controls
//! - [`config`]: User configuration handling
//! - [`storage`]: Still encoding and file naming
//!
//! # Example
//!
//! ```ignore
//! use retro_camera::{EffectParams, EffectState, FramePipeline, LookId};
//!
//! let pipeline = FramePipeline::default();
//! let mut state = EffectState::new();
//! let params = EffectParams::for_look(LookId::Portra400);
//! let image = pipeline.composite(&frame, &params, &mut state, frame.captured_at);
//! ```

pub mod config;
pub mod constants;
pub mod effects;
pub mod errors;
pub mod filters;
pub mod frame;
pub mod imaging;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use constants::{BlurMode, EffectKind};
pub use errors::{AppError, AppResult, CaptureError, PipelineError};
pub use filters::{FilterLook, LookId};
pub use frame::{CameraPosition, CaptureOrientation, FocusPoint, FrameInput, PixelBuffer, SubjectMask};
pub use imaging::{Extent, Image};
pub use pipelines::{
    CaptureOutput, EffectParams, EffectState, FramePipeline, FrameWorker, PipelineControls,
    SessionState,
};
