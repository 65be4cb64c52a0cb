//! Tunables for the window manager
//!
//! A [`WmConfig`] is built once, usually from `~/.xrwm/config.toml`, and
//! handed to [`WindowManager::new`](crate::manager::WindowManager::new).

use crate::error::{WmError, WmResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Smallest accepted transition step; smaller steps would take longer than
/// the tick counter can count
pub const MIN_TRANSITION_STEP: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WmConfig {
    /// Tick interval in milliseconds
    #[serde(default = "default_poll_rate_ms")]
    pub poll_rate_ms: u64,

    /// Progress added to a transition on every tick
    #[serde(default = "default_transition_step")]
    pub transition_step: f32,

    /// Scaling never goes to or below this factor
    #[serde(default = "default_minimal_scale_factor")]
    pub minimal_scale_factor: f32,

    /// Radius of the sphere used by `arrange_sphere`, in meters
    #[serde(default = "default_sphere_radius")]
    pub sphere_radius: f32,

    /// Push/pull speed relative to the current grab distance
    #[serde(default = "default_scroll_to_push_ratio")]
    pub scroll_to_push_ratio: f32,

    /// Analog values at or below this magnitude are ignored
    #[serde(default = "default_analog_threshold")]
    pub analog_threshold: f32,

    /// Multiplier from the analog x axis to the scale factor rate
    #[serde(default = "default_scale_speed")]
    pub scale_speed: f32,

    /// Maximum follow-head movement per tick, in meters
    #[serde(default = "default_follow_head_speed")]
    pub follow_head_speed: f32,

    /// Separation between a parent window and its children along +Z
    #[serde(default = "default_child_z_offset")]
    pub child_z_offset: f32,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            poll_rate_ms: default_poll_rate_ms(),
            transition_step: default_transition_step(),
            minimal_scale_factor: default_minimal_scale_factor(),
            sphere_radius: default_sphere_radius(),
            scroll_to_push_ratio: default_scroll_to_push_ratio(),
            analog_threshold: default_analog_threshold(),
            scale_speed: default_scale_speed(),
            follow_head_speed: default_follow_head_speed(),
            child_z_offset: default_child_z_offset(),
        }
    }
}

fn default_poll_rate_ms() -> u64 { 20 }
fn default_transition_step() -> f32 { 0.03 }
fn default_minimal_scale_factor() -> f32 { 0.01 }
fn default_sphere_radius() -> f32 { 3.0 }
fn default_scroll_to_push_ratio() -> f32 { 2.0 }
fn default_analog_threshold() -> f32 { 0.000001 }
fn default_scale_speed() -> f32 { 0.75 }
fn default_follow_head_speed() -> f32 { 0.05 }
fn default_child_z_offset() -> f32 { 0.01 }

impl WmConfig {
    /// Duration of one tick
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_rate_ms)
    }

    /// Reject values the manager cannot run with
    pub fn validate(&self) -> WmResult<()> {
        if self.poll_rate_ms == 0 {
            return Err(WmError::Config("poll_rate_ms must be positive".into()));
        }
        if !(self.transition_step >= MIN_TRANSITION_STEP) {
            return Err(WmError::Config(format!(
                "transition_step must be at least {}, got {}",
                MIN_TRANSITION_STEP, self.transition_step
            )));
        }
        if !(self.sphere_radius > 0.0) {
            return Err(WmError::Config(format!(
                "sphere_radius must be positive, got {}",
                self.sphere_radius
            )));
        }
        if !(self.follow_head_speed > 0.0) {
            return Err(WmError::Config(format!(
                "follow_head_speed must be positive, got {}",
                self.follow_head_speed
            )));
        }
        if self.minimal_scale_factor < 0.0 {
            return Err(WmError::Config(format!(
                "minimal_scale_factor must not be negative, got {}",
                self.minimal_scale_factor
            )));
        }
        Ok(())
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".xrwm").join("config.toml"))
}

/// Load configuration from file or use defaults
///
/// An explicit path must exist. Without one, `~/.xrwm/config.toml` is read
/// when present.
pub fn load_config(path: Option<PathBuf>) -> WmResult<WmConfig> {
    let path = match path {
        Some(path) => path,
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(WmConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: WmConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &WmConfig, path: &Path) -> WmResult<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
