// SPDX-License-Identifier: GPL-3.0-only

//! Best-effort subject segmentation off the frame path
//!
//! The provider runs on the tokio blocking pool. At most one request is in
//! flight; frames that arrive meanwhile are simply not segmented. Results
//! land in a single-slot mailbox that the frame worker drains without ever
//! waiting, so the mask applied to a frame may be a few frames old.

use crate::frame::{PixelBuffer, SubjectMask};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Produces a subject matte for a raw frame
///
/// Masks are returned in the layout of the buffer they were computed from.
pub trait SegmentationProvider: Send + Sync {
    fn segment(&self, buffer: &PixelBuffer) -> Option<SubjectMask>;
}

impl<F> SegmentationProvider for F
where
    F: Fn(&PixelBuffer) -> Option<SubjectMask> + Send + Sync,
{
    fn segment(&self, buffer: &PixelBuffer) -> Option<SubjectMask> {
        self(buffer)
    }
}

/// A mask tagged with the session generation it was requested in
#[derive(Debug, Clone)]
struct Published {
    generation: u64,
    mask: SubjectMask,
}

/// Latest-value slot for subject masks
///
/// Every [`clear`](Self::clear) starts a new generation. Masks published
/// for an older generation are never handed out, so work started before a
/// restart cannot leak into the next session.
#[derive(Debug)]
pub struct MaskMailbox {
    sender: Arc<watch::Sender<Option<Published>>>,
    receiver: watch::Receiver<Option<Published>>,
    generation: u64,
}

impl Default for MaskMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskMailbox {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
            receiver,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Overwrite the slot
    pub fn publish(&self, mask: SubjectMask) {
        self.publisher().publish(mask);
    }

    /// Mask published since the last call, if any
    pub fn take(&mut self) -> Option<SubjectMask> {
        if !self.receiver.has_changed().unwrap_or(false) {
            return None;
        }
        let generation = self.generation;
        match self.receiver.borrow_and_update().as_ref() {
            Some(published) if published.generation == generation => Some(published.mask.clone()),
            Some(published) => {
                debug!(
                    stale = published.generation,
                    current = generation,
                    "Dropping mask from a previous session"
                );
                None
            }
            None => None,
        }
    }

    /// Forget anything published so far and start a new generation
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.sender.send_replace(None);
        let _ = self.receiver.borrow_and_update();
    }

    /// Publishing handle bound to the current generation
    fn publisher(&self) -> MaskPublisher {
        MaskPublisher {
            sender: Arc::clone(&self.sender),
            generation: self.generation,
        }
    }
}

/// Write end of a [`MaskMailbox`] for one generation
#[derive(Debug, Clone)]
struct MaskPublisher {
    sender: Arc<watch::Sender<Option<Published>>>,
    generation: u64,
}

impl MaskPublisher {
    fn publish(&self, mask: SubjectMask) {
        self.sender.send_replace(Some(Published {
            generation: self.generation,
            mask,
        }));
    }
}

/// Drives a [`SegmentationProvider`] on the blocking pool
pub struct SegmentationRunner {
    provider: Arc<dyn SegmentationProvider>,
    runtime: Handle,
    in_flight: Arc<AtomicBool>,
    mailbox: MaskMailbox,
}

impl std::fmt::Debug for SegmentationRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationRunner")
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SegmentationRunner {
    pub fn new(provider: Arc<dyn SegmentationProvider>, runtime: Handle) -> Self {
        Self {
            provider,
            runtime,
            in_flight: Arc::new(AtomicBool::new(false)),
            mailbox: MaskMailbox::new(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Start segmenting `buffer` unless a request is already running
    ///
    /// Returns whether a request was started.
    pub fn request(&self, buffer: &PixelBuffer) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            trace!("Segmentation busy, skipping frame");
            return false;
        }

        let provider = Arc::clone(&self.provider);
        let in_flight = Arc::clone(&self.in_flight);
        let publisher = self.mailbox.publisher();
        let buffer = buffer.clone();

        self.runtime.spawn(async move {
            let mask = tokio::task::spawn_blocking(move || provider.segment(&buffer))
                .await
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Segmentation task failed");
                    None
                });
            match mask {
                Some(mask) => {
                    debug!(
                        dimensions = ?mask.dimensions(),
                        generation = publisher.generation,
                        "Subject mask ready"
                    );
                    publisher.publish(mask);
                }
                None => trace!("Segmentation produced no mask"),
            }
            in_flight.store(false, Ordering::SeqCst);
        });
        true
    }

    /// Newest finished mask, never waits
    pub fn take_latest(&mut self) -> Option<SubjectMask> {
        self.mailbox.take()
    }

    /// Drop pending masks, including those of requests still running
    pub fn clear(&mut self) {
        self.mailbox.clear();
    }
}
