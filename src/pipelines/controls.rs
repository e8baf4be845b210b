// SPDX-License-Identifier: GPL-3.0-only

//! Controls exposed to the UI
//!
//! Parameter changes go through the watch channel and take effect on the
//! next frame. Capture, restart and stop are queued behind any frames
//! already submitted.

use super::capture::CaptureOutput;
use super::frame::EffectParams;
use super::worker::WorkerCommand;
use crate::constants::{BlurMode, EffectKind};
use crate::errors::{CaptureError, PipelineError};
use crate::filters::LookId;
use crate::frame::FocusPoint;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PipelineControls {
    commands: mpsc::UnboundedSender<WorkerCommand>,
    params: Arc<watch::Sender<EffectParams>>,
}

impl PipelineControls {
    pub(super) fn new(
        commands: mpsc::UnboundedSender<WorkerCommand>,
        params: Arc<watch::Sender<EffectParams>>,
    ) -> Self {
        Self { commands, params }
    }

    /// Current parameter snapshot
    pub fn params(&self) -> EffectParams {
        self.params.borrow().clone()
    }

    /// Switch look; effect intensities reset to the look's companions
    pub fn select_look(&self, look: LookId) {
        debug!(look = %look, "Selecting look");
        self.params.send_modify(|params| params.select_look(look));
    }

    pub fn select_look_by_name(&self, name: &str) -> Result<(), PipelineError> {
        let look = LookId::from_name(name).ok_or_else(|| PipelineError::UnknownLook(name.to_string()))?;
        self.select_look(look);
        Ok(())
    }

    /// Set an effect intensity, clamped to [0, 1]
    pub fn set_intensity(&self, kind: EffectKind, value: f32) {
        self.params
            .send_modify(|params| params.set_intensity(kind, value));
    }

    pub fn set_focus_point(&self, focus: FocusPoint) {
        self.params.send_modify(|params| params.focus = focus);
    }

    pub fn set_blur_mode(&self, mode: BlurMode) {
        self.params.send_modify(|params| params.blur_mode = mode);
    }

    pub fn set_overlay_enabled(&self, enabled: bool) {
        self.params
            .send_modify(|params| params.overlay_enabled = enabled);
    }

    /// Fixed stamp text, or `None` for the current date
    pub fn set_stamp_text(&self, text: Option<String>) {
        self.params.send_modify(|params| params.stamp_text = text);
    }

    /// Ask for a still once all queued frames are composited
    pub async fn request_capture(&self) -> Result<CaptureOutput, CaptureError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(WorkerCommand::Capture(reply_tx))
            .map_err(|_| CaptureError::WorkerStopped)?;
        reply_rx.await.map_err(|_| CaptureError::WorkerStopped)?
    }

    /// Drop all cached state and keep previewing
    pub fn restart(&self) -> Result<(), PipelineError> {
        self.commands
            .send(WorkerCommand::Restart)
            .map_err(|_| PipelineError::WorkerStopped)
    }

    /// End the session; the worker resets its state and exits
    pub fn stop(&self) -> Result<(), PipelineError> {
        self.commands
            .send(WorkerCommand::Stop)
            .map_err(|_| PipelineError::WorkerStopped)
    }
}
