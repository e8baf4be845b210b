// SPDX-License-Identifier: MPL-2.0

//! Live frame pipeline
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Frame Worker        │ ──▶ │ Display Sink │
//! │ (PixelBuffer)│     │  - orient            │     │  (mpsc)      │
//! │              │     │  - grade (look)      │     │              │
//! └──────────────┘     │  - blur / leak /     │     └──────────────┘
//!                      │    grain / stamp     │
//! ┌──────────────┐     │  - extent guard      │     ┌──────────────┐
//! │ Segmentation │ ──▶ │                      │ ──▶ │ Still        │
//! │ (blocking)   │     └──────────────────────┘     │ (capture)    │
//! └──────────────┘                                  └──────────────┘
//! ```
//!
//! - [`frame`]: the compositor and the per-session effect state
//! - [`worker`]: the thread that owns the state and orders all work
//! - [`controls`]: the UI-facing control surface
//! - [`segmentation`]: best-effort subject masks off the hot path
//! - [`capture`]: still capture from the last composited frame

pub mod capture;
pub mod controls;
pub mod frame;
pub mod segmentation;
pub mod worker;

pub use capture::CaptureOutput;
pub use controls::PipelineControls;
pub use frame::{EffectParams, EffectState, FramePipeline};
pub use segmentation::{MaskMailbox, SegmentationProvider, SegmentationRunner};
pub use worker::{FrameWorker, SessionState, WorkerCommand};
