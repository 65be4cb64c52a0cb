//! Routing of raw controller actions to manager operations

use super::WindowManager;
use crate::error::WmResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// State of a button action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalEvent {
    /// Whether the button is currently down
    pub state: bool,
    /// Whether `state` changed since the previous sample
    pub changed: bool,
}

impl DigitalEvent {
    pub fn pressed() -> Self {
        Self {
            state: true,
            changed: true,
        }
    }

    pub fn released() -> Self {
        Self {
            state: false,
            changed: true,
        }
    }
}

/// State of a two-axis analog action, such as a thumbstick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalogEvent {
    pub x: f32,
    pub y: f32,
}

impl WindowManager {
    /// Grab on press, release on release. Unchanged samples are ignored.
    pub fn handle_grab_action(&mut self, controller_index: usize, event: DigitalEvent) -> WmResult<()> {
        self.check_controller(controller_index)?;
        if !event.changed {
            return Ok(());
        }
        if event.state {
            self.check_grab(controller_index)
        } else {
            self.check_release(controller_index)
        }
    }

    /// While dragging, the x axis scales the window and the y axis pushes it
    /// along the ray
    pub fn handle_push_pull_scale_action(
        &mut self,
        controller_index: usize,
        event: AnalogEvent,
        dt: Duration,
    ) -> WmResult<()> {
        self.check_controller(controller_index)?;
        if self.grab[controller_index].window.is_none() {
            return Ok(());
        }

        let threshold = self.config.analog_threshold;
        if event.x.abs() > threshold {
            let factor = event.x * self.config.scale_speed;
            self.scale(controller_index, factor, dt)?;
        }
        if event.y.abs() > threshold {
            self.push_pull(controller_index, event.y, dt)?;
        }
        Ok(())
    }
}
