// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as pretty-printed JSON in the platform config directory. Missing
//! fields take their defaults, so older files keep loading as options are
//! added.

use crate::constants::light_leak::REFRESH_INTERVAL;
use crate::constants::overlay::DEFAULT_FORMAT;
use crate::constants::{BlurMode, EffectKind};
use crate::errors::{AppError, AppResult};
use crate::filters::LookId;
use crate::pipelines::EffectParams;
use crate::storage::{OutputFormat, default_output_dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Directory name under the platform config directory
pub const APP_DIR: &str = "retro-camera";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Look selected when a session starts
    pub default_look: LookId,
    /// Grain intensity override; `None` uses the look's companion value
    pub grain_intensity: Option<f32>,
    /// Light-leak intensity override
    pub light_leak_intensity: Option<f32>,
    /// Blur intensity override
    pub blur_intensity: Option<f32>,
    pub blur_mode: BlurMode,
    /// Stamp the date onto frames
    pub overlay_enabled: bool,
    /// chrono format string for the stamp
    pub stamp_format: String,
    /// Prefer the seven-segment stamp face
    pub decorative_font: bool,
    /// Allow the bokeh kernel (gaussian only when false)
    pub bokeh_enabled: bool,
    /// Scales the radial focus mask
    pub focus_radius_scale: f32,
    /// Seconds a light leak lives before a new one is drawn
    pub light_leak_refresh_secs: f32,
    /// Mirror front camera frames (selfie mode)
    pub mirror_front_camera: bool,
    /// Where stills are written; `~/Pictures/retro-camera` when unset
    pub output_dir: Option<PathBuf>,
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_look: LookId::None,
            grain_intensity: None,
            light_leak_intensity: None,
            blur_intensity: None,
            blur_mode: BlurMode::default(),
            overlay_enabled: false,
            stamp_format: DEFAULT_FORMAT.to_string(),
            decorative_font: true,
            bokeh_enabled: true,
            focus_radius_scale: 1.0,
            light_leak_refresh_secs: REFRESH_INTERVAL.as_secs_f32(),
            mirror_front_camera: true,
            output_dir: None,
            output_format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// `<config dir>/retro-camera/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location
    ///
    /// A missing or unreadable file yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config.sanitized())
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory on this platform".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write pretty JSON to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Replace out-of-range values with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.focus_radius_scale.is_finite() && self.focus_radius_scale > 0.0) {
            self.focus_radius_scale = defaults.focus_radius_scale;
        }
        if !(self.light_leak_refresh_secs.is_finite() && self.light_leak_refresh_secs > 0.0) {
            self.light_leak_refresh_secs = defaults.light_leak_refresh_secs;
        }
        if self.stamp_format.trim().is_empty() {
            self.stamp_format = defaults.stamp_format;
        }
        self
    }

    pub fn light_leak_refresh(&self) -> Duration {
        Duration::try_from_secs_f32(self.light_leak_refresh_secs).unwrap_or(REFRESH_INTERVAL)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    /// Initial parameters: the default look with any configured overrides
    pub fn effect_params(&self) -> EffectParams {
        let mut params = EffectParams::for_look(self.default_look);
        let overrides = [
            (EffectKind::Grain, self.grain_intensity),
            (EffectKind::LightLeak, self.light_leak_intensity),
            (EffectKind::Blur, self.blur_intensity),
        ];
        for (kind, value) in overrides
            .into_iter()
            .filter_map(|(kind, value)| value.map(|v| (kind, v)))
        {
            params.set_intensity(kind, value);
        }
        params.blur_mode = self.blur_mode;
        params.overlay_enabled = self.overlay_enabled;
        params
    }
}
