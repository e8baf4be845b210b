// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing the look catalog
//! - Compositing one image
//! - Simulating a live preview session with capture

use chrono::Local;
use clap::Args;
use retro_camera::filters::catalog;
use retro_camera::imaging::smoothstep;
use retro_camera::pipelines::SegmentationRunner;
use retro_camera::storage::{self, OutputFormat};
use retro_camera::{
    BlurMode, CameraPosition, Config, EffectKind, FocusPoint, FrameInput, FramePipeline,
    FrameWorker, EffectState, LookId, PipelineError, PixelBuffer, SubjectMask,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::warn;

/// Delay between simulated preview frames (~30 fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Source image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (default: timestamped file in the configured directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Look name (e.g. "Portra 400", "tri-x-400")
    #[arg(short, long, default_value = "None")]
    pub look: String,

    /// Grain intensity 0-1 (default: look companion)
    #[arg(long)]
    pub grain: Option<f32>,

    /// Light-leak intensity 0-1 (default: look companion)
    #[arg(long)]
    pub light_leak: Option<f32>,

    /// Blur intensity 0-1 (default: look companion)
    #[arg(long)]
    pub blur: Option<f32>,

    /// Blur mode: selective or full
    #[arg(long)]
    pub mode: Option<String>,

    /// Focus point as "x,y" in 0-1, origin top-left
    #[arg(long)]
    pub focus: Option<String>,

    /// Grayscale subject matte (white = subject)
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Stamp the date (or --stamp-text) onto the image
    #[arg(long)]
    pub stamp: bool,

    /// Fixed stamp text instead of the date
    #[arg(long)]
    pub stamp_text: Option<String>,

    /// Treat the image as a front camera frame (mirrored)
    #[arg(long)]
    pub front: bool,

    /// Seed for grain and light leaks
    #[arg(long)]
    pub seed: Option<u64>,
}

/// List all looks with their companion intensities
pub fn list_looks() -> Result<(), Box<dyn std::error::Error>> {
    println!("{:<8} {:<26} {:>6} {:>6} {:>6}", "Family", "Look", "Grain", "Leak", "Blur");
    for look in catalog::all() {
        println!(
            "{:<8} {:<26} {:>6.2} {:>6.2} {:>6.2}",
            look.family.display_name(),
            look.id.name(),
            look.defaults.grain,
            look.defaults.light_leak,
            look.defaults.blur,
        );
    }
    Ok(())
}

fn parse_look(name: &str) -> Result<LookId, PipelineError> {
    LookId::from_name(name).ok_or_else(|| PipelineError::UnknownLook(name.to_string()))
}

fn load_frame(path: &Path, front: bool) -> Result<FrameInput, Box<dyn std::error::Error>> {
    let rgba = image::open(path)?.to_rgba8();
    let buffer = PixelBuffer::from_rgba8(&rgba)?;
    let position = if front {
        CameraPosition::Front
    } else {
        CameraPosition::Back
    };
    Ok(FrameInput::new(buffer, position))
}

/// Composite one image file
pub fn apply(args: ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let look = parse_look(&args.look)?;

    let mut params = config.effect_params();
    params.select_look(look);
    for (kind, value) in [
        (EffectKind::Grain, args.grain),
        (EffectKind::LightLeak, args.light_leak),
        (EffectKind::Blur, args.blur),
    ]
    .into_iter()
    .filter_map(|(kind, value)| value.map(|v| (kind, v)))
    {
        params.set_intensity(kind, value);
    }
    if let Some(mode) = args.mode.as_deref() {
        params.blur_mode =
            BlurMode::from_name(mode).ok_or_else(|| format!("Unknown blur mode: {}", mode))?;
    }
    if let Some(focus) = args.focus.as_deref() {
        params.focus = FocusPoint::parse(focus)
            .ok_or_else(|| format!("Focus must be \"x,y\", got: {}", focus))?;
    }
    params.overlay_enabled = args.stamp || args.stamp_text.is_some();
    params.stamp_text = args.stamp_text;

    let frame = load_frame(&args.input, args.front)?;
    let mut state = args.seed.map(EffectState::with_seed).unwrap_or_default();
    if let Some(mask_path) = args.mask.as_ref() {
        let matte = image::open(mask_path)?.to_luma8();
        state.update_person_mask(Some(SubjectMask::from_luma8(&matte)));
    }

    println!("Look: {} ({})", look, look.family().display_name());
    let pipeline = FramePipeline::from_config(&config);
    let image = pipeline.composite(&frame, &params, &mut state, Instant::now());
    let rgba = image.to_rgba8();

    let path = match args.output {
        Some(path) => {
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(OutputFormat::from_extension)
                .unwrap_or(config.output_format);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            storage::write_image(&rgba, &path, format)?;
            path
        }
        None => storage::save_image(&rgba, &config.output_dir(), config.output_format)?,
    };

    println!("Saved: {} ({}x{})", path.display(), rgba.width(), rgba.height());
    Ok(())
}

/// Elliptical stand-in matte centred on the frame
fn synthetic_matte(buffer: &PixelBuffer) -> Option<SubjectMask> {
    let (w, h) = (buffer.width(), buffer.height());
    if w == 0 || h == 0 {
        return None;
    }
    let matte = image::GrayImage::from_fn(w, h, |x, y| {
        let dx = (x as f32 + 0.5) / w as f32 - 0.5;
        let dy = (y as f32 + 0.5) / h as f32 - 0.5;
        let d = ((dx / 0.3).powi(2) + (dy / 0.45).powi(2)).sqrt();
        image::Luma([((1.0 - smoothstep(0.8, 1.0, d)) * 255.0).round() as u8])
    });
    Some(SubjectMask::from_luma8(&matte))
}

/// Feed `frames` copies of an image through a live worker, then capture
pub fn preview(
    input: PathBuf,
    look: &str,
    frames: u32,
    front: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let look = parse_look(look)?;
    let frame = load_frame(&input, front)?;
    let output_dir = output.unwrap_or_else(|| config.output_dir());

    let mut params = config.effect_params();
    params.select_look(look);

    let rt = tokio::runtime::Runtime::new()?;
    let (display_tx, mut display_rx) = mpsc::channel(4);

    let segmentation = SegmentationRunner::new(Arc::new(synthetic_matte), rt.handle().clone());
    let mut worker = FrameWorker::start(
        FramePipeline::from_config(&config),
        params,
        display_tx,
        Some(segmentation),
    );
    let controls = worker.controls();

    let drain = rt.spawn(async move {
        let mut shown = 0u32;
        while display_rx.recv().await.is_some() {
            shown += 1;
        }
        shown
    });

    println!("Previewing {} frames with {}...", frames, look);
    let started = Local::now();
    let capture = rt.block_on(async {
        let mut dropped = 0u32;
        for _ in 0..frames {
            let mut next = frame.clone();
            next.captured_at = Instant::now();
            match worker.submit(next) {
                Ok(()) => {}
                Err(PipelineError::FrameDropped) => dropped += 1,
                Err(e) => return Err(Box::<dyn std::error::Error>::from(e)),
            }
            tokio::time::sleep(FRAME_INTERVAL).await;
        }
        if dropped > 0 {
            warn!(dropped, "Worker fell behind the frame rate");
        }
        controls
            .request_capture()
            .await
            .map_err(Box::<dyn std::error::Error>::from)
    })?;

    let path = capture.save(&output_dir, config.output_format)?;
    worker.stop();
    let shown = rt.block_on(drain)?;

    let elapsed = Local::now().signed_duration_since(started);
    println!(
        "Displayed {} of {} frames in {:.1}s",
        shown,
        frames,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
    println!("Captured: {}", path.display());
    Ok(())
}

/// Print the configuration file location and its effective contents
pub fn show_config(save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    match Config::default_path() {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    if save {
        let path = config.save()?;
        println!("Saved: {}", path.display());
    }
    Ok(())
}
