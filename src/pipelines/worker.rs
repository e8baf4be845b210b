// SPDX-License-Identifier: GPL-3.0-only

//! Frame worker thread
//!
//! One dedicated thread owns the [`EffectState`] and services a single
//! command queue strictly in arrival order: frames, capture requests,
//! restart and stop. Parameters are read from a watch channel at the start
//! of every frame, so the newest selection always wins and nothing queues
//! up behind a slider drag.
//!
//! Only a couple of frames may wait in the queue. When compositing falls
//! behind the sensor, new frames are refused instead of piling up, while
//! capture, restart and stop are always queued.

use super::capture::CaptureOutput;
use super::controls::PipelineControls;
use super::frame::{EffectParams, EffectState, FramePipeline};
use super::segmentation::SegmentationRunner;
use crate::errors::{CaptureError, PipelineError};
use crate::frame::{FrameInput, PixelBuffer};
use crate::imaging::Image;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

/// Frames allowed to wait in the command queue
const MAX_QUEUED_FRAMES: usize = 2;

/// Number of frames sitting in the command queue
#[derive(Debug, Clone)]
struct FrameBacklog {
    queued: Arc<AtomicUsize>,
    limit: usize,
}

impl FrameBacklog {
    fn new(limit: usize) -> Self {
        Self {
            queued: Arc::new(AtomicUsize::new(0)),
            limit,
        }
    }

    /// Claim a queue slot; false when the backlog is full
    fn try_reserve(&self) -> bool {
        self.queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .is_ok()
    }

    fn release(&self) {
        let _ = self
            .queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }

    fn len(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }
}

/// Capture session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session running
    #[default]
    Idle,
    /// Frames are being composited for display
    Previewing,
    /// A still was just captured; the next frame resumes previewing
    CapturedFrozen,
}

/// Work items for the frame worker
pub enum WorkerCommand {
    Frame(FrameInput),
    Capture(oneshot::Sender<Result<CaptureOutput, CaptureError>>),
    Restart,
    Stop,
}

impl std::fmt::Debug for WorkerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerCommand::Frame(frame) => f.debug_tuple("Frame").field(&frame.buffer).finish(),
            WorkerCommand::Capture(_) => write!(f, "Capture"),
            WorkerCommand::Restart => write!(f, "Restart"),
            WorkerCommand::Stop => write!(f, "Stop"),
        }
    }
}

/// State owned by the worker thread
struct WorkerContext {
    pipeline: FramePipeline,
    state: EffectState,
    params: watch::Receiver<EffectParams>,
    session: watch::Sender<SessionState>,
    display: mpsc::Sender<Image>,
    segmentation: Option<SegmentationRunner>,
    backlog: FrameBacklog,
    last_raw: Option<PixelBuffer>,
}

impl WorkerContext {
    fn set_session(&self, next: SessionState) {
        let previous = self.session.send_replace(next);
        if previous != next {
            debug!(?previous, ?next, "Session state changed");
        }
    }

    fn handle_frame(&mut self, frame: FrameInput) {
        let params = self.params.borrow().clone();

        if let Some(segmentation) = self.segmentation.as_mut() {
            if params.wants_subject_mask() {
                segmentation.request(&frame.buffer);
            }
            self.state.update_person_mask(segmentation.take_latest());
        }

        self.last_raw = Some(frame.buffer.clone());
        let image = self
            .pipeline
            .composite(&frame, &params, &mut self.state, frame.captured_at);
        self.set_session(SessionState::Previewing);

        if let Err(e) = self.display.try_send(image) {
            trace!(error = %e, "Display sink not ready, dropping frame");
        }
    }

    fn handle_capture(&mut self) -> Result<CaptureOutput, CaptureError> {
        let result = CaptureOutput::resolve(
            self.state.last_composited_frame.as_ref(),
            self.last_raw.as_ref(),
        );
        if result.is_ok() {
            self.set_session(SessionState::CapturedFrozen);
        }
        result
    }

    /// Drop all effect state; the raw frame survives for still fallback
    fn reset(&mut self) {
        self.state.reset();
        if let Some(segmentation) = self.segmentation.as_mut() {
            segmentation.clear();
        }
    }

    fn run(mut self, mut commands: mpsc::UnboundedReceiver<WorkerCommand>) {
        debug!("Frame worker thread started");
        while let Some(command) = commands.blocking_recv() {
            match command {
                WorkerCommand::Frame(frame) => {
                    self.backlog.release();
                    self.handle_frame(frame);
                }
                WorkerCommand::Capture(reply) => {
                    let result = self.handle_capture();
                    if let Err(e) = &result {
                        warn!(error = %e, "Capture request failed");
                    }
                    if reply.send(result).is_err() {
                        debug!("Capture requester went away");
                    }
                }
                WorkerCommand::Restart => {
                    info!("Restarting capture session");
                    self.reset();
                    self.set_session(SessionState::Previewing);
                }
                WorkerCommand::Stop => {
                    debug!("Stop command received");
                    break;
                }
            }
        }
        self.reset();
        self.last_raw = None;
        self.set_session(SessionState::Idle);
        info!("Frame worker thread exiting");
    }
}

/// Handle to the running frame worker
///
/// Dropping the handle stops the worker and waits for it.
pub struct FrameWorker {
    commands: mpsc::UnboundedSender<WorkerCommand>,
    params: Arc<watch::Sender<EffectParams>>,
    session: watch::Receiver<SessionState>,
    backlog: FrameBacklog,
    thread_handle: Option<JoinHandle<()>>,
}

impl FrameWorker {
    /// Spawn the worker thread
    ///
    /// Composited frames are offered to `display`; frames are dropped when
    /// it is full. Pass a [`SegmentationRunner`] to enable subject masks.
    pub fn start(
        pipeline: FramePipeline,
        params: EffectParams,
        display: mpsc::Sender<Image>,
        segmentation: Option<SegmentationRunner>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (params_tx, params_rx) = watch::channel(params);
        let (session_tx, session_rx) = watch::channel(SessionState::Idle);
        let backlog = FrameBacklog::new(MAX_QUEUED_FRAMES);

        let context = WorkerContext {
            pipeline,
            state: EffectState::new(),
            params: params_rx,
            session: session_tx,
            display,
            segmentation,
            backlog: backlog.clone(),
            last_raw: None,
        };

        info!(segmentation = context.segmentation.is_some(), "Starting frame worker");
        let thread_handle = thread::spawn(move || context.run(command_rx));

        Self {
            commands: command_tx,
            params: Arc::new(params_tx),
            session: session_rx,
            backlog,
            thread_handle: Some(thread_handle),
        }
    }

    /// Control surface for UI code; cheap to clone
    pub fn controls(&self) -> PipelineControls {
        PipelineControls::new(self.commands.clone(), Arc::clone(&self.params))
    }

    /// Queue a camera frame
    ///
    /// Fails with [`PipelineError::FrameDropped`] while the worker is still
    /// busy with earlier frames; the caller simply moves on to the next one.
    pub fn submit(&self, frame: FrameInput) -> Result<(), PipelineError> {
        if self.commands.is_closed() {
            return Err(PipelineError::WorkerStopped);
        }
        if !self.backlog.try_reserve() {
            trace!(queued = self.backlog.len(), "Frame worker behind, dropping frame");
            return Err(PipelineError::FrameDropped);
        }
        self.commands.send(WorkerCommand::Frame(frame)).map_err(|_| {
            self.backlog.release();
            PipelineError::WorkerStopped
        })
    }

    pub fn session_state(&self) -> SessionState {
        *self.session.borrow()
    }

    /// Watch session transitions
    pub fn subscribe_session(&self) -> watch::Receiver<SessionState> {
        self.session.clone()
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the worker and wait for the thread to finish
    pub fn stop(&mut self) {
        let _ = self.commands.send(WorkerCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            debug!("Waiting for frame worker thread to finish");
            if let Err(e) = handle.join() {
                warn!("Frame worker thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("FrameWorker dropped, stopping thread");
            self.stop();
        }
    }
}
