// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the frame compositor and worker

use image::{Rgba, RgbaImage};
use retro_camera::effects::BlurEngine;
use retro_camera::pipelines::{SegmentationRunner, SessionState};
use retro_camera::{
    BlurMode, CameraPosition, CaptureError, CaptureOrientation, EffectKind, EffectParams,
    EffectState, Extent, FrameInput, FramePipeline, FrameWorker, Image, LookId, PipelineError,
    PixelBuffer, SubjectMask,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

fn gradient_buffer(width: u32, height: u32) -> PixelBuffer {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 128, 255])
    });
    PixelBuffer::from_rgba8(&image).unwrap()
}

fn frame(width: u32, height: u32) -> FrameInput {
    FrameInput::new(gradient_buffer(width, height), CameraPosition::Back)
}

#[test]
fn test_all_looks_keep_extent_without_effects() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(1);
    let input = frame(64, 48).with_orientation(CaptureOrientation::Left);
    for &look in LookId::ALL.iter() {
        let mut params = EffectParams::default();
        params.look = look;
        let out = pipeline.composite(&input, &params, &mut state, Instant::now());
        assert_eq!(out.extent(), Extent::from_size(48, 64), "{}", look);
    }
}

#[test]
fn test_bloom_and_full_blur_are_clamped() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(2);
    let mut params = EffectParams::for_look(LookId::Cinestill800T);
    params.blur_mode = BlurMode::Full;
    let params = params.with_intensity(EffectKind::Blur, 0.8);
    let out = pipeline.composite(&frame(80, 60), &params, &mut state, Instant::now());
    assert_eq!(out.extent(), Extent::from_size(80, 60));
}

#[test]
fn test_grain_statistics_through_pipeline() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(3);
    let image = Image::solid(Extent::from_size(96, 64), [0.5, 0.5, 0.5, 1.0]);

    let off = EffectParams::default();
    let out = pipeline.composite_oriented(&image, None, &off, &mut state, Instant::now());
    assert_eq!(out.luma_stats(), image.luma_stats());

    let on = EffectParams::default().with_intensity(EffectKind::Grain, 0.15);
    let out = pipeline.composite_oriented(&image, None, &on, &mut state, Instant::now());
    let (mean, std) = out.luma_stats();
    assert!(std > 1e-4);
    assert!((mean - 0.5).abs() / 0.5 < 0.02);
}

#[test]
fn test_light_leak_cache_lifetime() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(4);
    let image = Image::solid(Extent::from_size(64, 64), [0.3, 0.3, 0.3, 1.0]);
    let params = EffectParams::default().with_intensity(EffectKind::LightLeak, 0.7);
    let start = Instant::now();

    pipeline.composite_oriented(&image, None, &params, &mut state, start);
    let first = state.cached_light_leak.as_ref().unwrap().image().clone();

    pipeline.composite_oriented(&image, None, &params, &mut state, start + Duration::from_secs(3));
    assert!(state.cached_light_leak.as_ref().unwrap().image().ptr_eq(&first));

    pipeline.composite_oriented(&image, None, &params, &mut state, start + Duration::from_secs(6));
    assert!(!state.cached_light_leak.as_ref().unwrap().image().ptr_eq(&first));
}

#[test]
fn test_subject_mask_keeps_subject_sharp() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(5);
    let stripes = Image::new(image::Rgba32FImage::from_fn(64, 64, |x, _| {
        let v = if (x / 2) % 2 == 0 { 1.0 } else { 0.0 };
        Rgba([v, v, v, 1.0])
    }));
    let white = SubjectMask::new(image::ImageBuffer::from_pixel(8, 8, image::Luma([1.0f32])));
    let params = EffectParams::default().with_intensity(EffectKind::Blur, 1.0);
    let out = pipeline.composite_oriented(&stripes, Some(&white), &params, &mut state, Instant::now());
    for (a, b) in out.pixels().pixels().zip(stripes.pixels().pixels()) {
        assert!((a[0] - b[0]).abs() < 1e-3);
    }
}

#[test]
fn test_radial_fallback_without_subject_mask() {
    let pipeline = FramePipeline::default();
    let mut state = EffectState::with_seed(6);
    let stripes = Image::new(image::Rgba32FImage::from_fn(200, 200, |x, _| {
        let v = if (x / 2) % 2 == 0 { 1.0 } else { 0.0 };
        Rgba([v, v, v, 1.0])
    }));
    let mut params = EffectParams::default();
    params.blur_mode = BlurMode::Selective;
    let params = params.with_intensity(EffectKind::Blur, 1.0);

    let out = pipeline.composite_oriented(&stripes, None, &params, &mut state, Instant::now());
    let blurred = BlurEngine::default()
        .blurred_copy(&stripes, 1.0, BlurMode::Selective)
        .unwrap()
        .cropped(stripes.extent());

    // Within 15% of 200 px from the centre: untouched
    for x in 80..120 {
        let a = out.pixel_at(x, 100).unwrap();
        let b = stripes.pixel_at(x, 100).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-5, "x = {}", x);
    }
    // Beyond 50% of 200 px: the blurred copy
    for (x, y) in [(0, 0), (4, 4), (8, 2), (195, 195), (199, 0), (0, 199)] {
        let a = out.pixel_at(x, y).unwrap();
        let b = blurred.pixel_at(x, y).unwrap();
        assert!((a[0] - b[0]).abs() < 1e-5, "({}, {})", x, y);
    }
    let corner = out.pixel_at(4, 4).unwrap()[0];
    assert!((corner - stripes.pixel_at(4, 4).unwrap()[0]).abs() > 0.1);
}

fn start_worker(
    params: EffectParams,
    segmentation: Option<SegmentationRunner>,
) -> (FrameWorker, mpsc::Receiver<Image>) {
    let (display_tx, display_rx) = mpsc::channel(16);
    let worker = FrameWorker::start(FramePipeline::default(), params, display_tx, segmentation);
    (worker, display_rx)
}

#[tokio::test]
async fn test_capture_without_frames_fails() {
    let (worker, _display) = start_worker(EffectParams::default(), None);
    let err = worker.controls().request_capture().await.unwrap_err();
    assert_eq!(err, CaptureError::NoFrameAvailable);
    assert_eq!(worker.session_state(), SessionState::Idle);
}

#[tokio::test]
async fn test_worker_session_lifecycle() {
    let (mut worker, mut display) = start_worker(EffectParams::default(), None);
    let controls = worker.controls();

    for _ in 0..3 {
        worker.submit(frame(32, 24)).unwrap();
        let shown = display.recv().await.unwrap();
        assert_eq!(shown.extent(), Extent::from_size(32, 24));
    }
    assert_eq!(worker.session_state(), SessionState::Previewing);

    let still = controls.request_capture().await.unwrap();
    assert!(still.is_composited());
    assert_eq!(still.dimensions(), (32, 24));
    assert_eq!(worker.session_state(), SessionState::CapturedFrozen);

    worker.submit(frame(32, 24)).unwrap();
    display.recv().await.unwrap();
    assert_eq!(worker.session_state(), SessionState::Previewing);

    // Restart drops the composited frame; the raw frame is still there
    controls.restart().unwrap();
    let still = controls.request_capture().await.unwrap();
    assert!(!still.is_composited());
    assert_eq!(still.dimensions(), (32, 24));
    assert_eq!(worker.session_state(), SessionState::CapturedFrozen);

    worker.stop();
    assert_eq!(worker.session_state(), SessionState::Idle);
    assert!(!worker.is_running());
    assert_eq!(worker.submit(frame(4, 4)), Err(PipelineError::WorkerStopped));
    assert_eq!(
        controls.request_capture().await.unwrap_err(),
        CaptureError::WorkerStopped
    );
}

#[tokio::test]
async fn test_controls_reach_the_worker() {
    let (worker, mut display) = start_worker(EffectParams::default(), None);
    let controls = worker.controls();

    controls.select_look(LookId::TriX400);
    controls.set_intensity(EffectKind::Grain, 0.0);
    assert_eq!(controls.params().look, LookId::TriX400);
    assert!(controls.select_look_by_name("Kodachrome").is_err());

    worker.submit(frame(16, 16)).unwrap();
    let shown = display.recv().await.unwrap();
    // Tri-X is monochrome
    for p in shown.pixels().pixels() {
        assert!((p[0] - p[1]).abs() < 1e-4 && (p[1] - p[2]).abs() < 1e-4);
    }
}

#[tokio::test]
async fn test_segmentation_only_runs_for_selective_blur() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let provider = move |buffer: &PixelBuffer| {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(SubjectMask::new(image::ImageBuffer::new(
            buffer.width(),
            buffer.height(),
        )))
    };
    let runner = SegmentationRunner::new(Arc::new(provider), Handle::current());

    let mut params = EffectParams::default();
    params.blur_mode = BlurMode::Full;
    let params = params.with_intensity(EffectKind::Blur, 0.3);
    let (worker, mut display) = start_worker(params, Some(runner));
    let controls = worker.controls();

    worker.submit(frame(24, 24)).unwrap();
    display.recv().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    controls.set_blur_mode(BlurMode::Selective);
    for _ in 0..20 {
        worker.submit(frame(24, 24)).unwrap();
        display.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        if calls.load(Ordering::SeqCst) > 0 {
            break;
        }
    }
    assert!(calls.load(Ordering::SeqCst) > 0);
}
