//! Error types for the window manager core

use crate::window::WindowId;
use thiserror::Error;

/// Errors reported by window manager operations
#[derive(Error, Debug)]
pub enum WmError {
    /// Controller index outside of the tracked controller range
    #[error("Invalid controller index {index} (tracking {count} controllers)")]
    InvalidController { index: usize, count: usize },

    /// No registered window carries this handle
    #[error("Window not found: {0}")]
    WindowNotFound(WindowId),

    /// Sphere layout addressed a slot with no managed window behind it
    #[error("Layout slot {slot} has no window (managing {count} windows)")]
    LayoutSlotOutOfRange { slot: usize, count: usize },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for WmError {
    fn from(err: toml::de::Error) -> Self {
        WmError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WmError {
    fn from(err: toml::ser::Error) -> Self {
        WmError::Config(err.to_string())
    }
}

/// Result alias used across the crate
pub type WmResult<T> = std::result::Result<T, WmError>;
