//! Animated transform and scale transitions
//!
//! Jobs are stepped once per tick by the host. A job interpolates the window
//! at its current progress, then advances by the configured step; the step
//! that carries the progress past 1.0 also writes the exact target and ends
//! the job.

use crate::math;
use crate::window::{Window, WindowArena, WindowId};
use glam::Mat4;
use tracing::{debug, warn};

/// One window moving from a captured source pose to a target pose
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionJob {
    window: WindowId,
    from_transform: Mat4,
    to_transform: Mat4,
    from_scale: f32,
    to_scale: f32,
    ticks: u32,
}

impl TransitionJob {
    pub fn new(
        window: WindowId,
        from_transform: Mat4,
        from_scale: f32,
        to_transform: Mat4,
        to_scale: f32,
    ) -> Self {
        Self {
            window,
            from_transform,
            to_transform,
            from_scale,
            to_scale,
            ticks: 0,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn target_transform(&self) -> Mat4 {
        self.to_transform
    }

    pub fn target_scale(&self) -> f32 {
        self.to_scale
    }

    /// Interpolation parameter used by the next step
    pub fn progress(&self, step: f32) -> f32 {
        self.ticks as f32 * step
    }

    /// Write one animation frame to the window, returning true once the
    /// target has been reached
    ///
    /// The frame at the current progress is written first. If advancing the
    /// progress takes it past 1.0, the exact target is written in the same
    /// call.
    fn advance(&mut self, window: &mut dyn Window, step: f32) -> bool {
        let progress = self.progress(step);
        window.set_transform(math::interpolate(
            &self.from_transform,
            &self.to_transform,
            progress,
        ));
        window.set_scale(self.from_scale + (self.to_scale - self.from_scale) * progress);

        self.ticks = self.ticks.saturating_add(1);
        if self.progress(step) > 1.0 {
            window.set_transform(self.to_transform);
            window.set_scale(self.to_scale);
            return true;
        }
        false
    }
}

/// Number of `step()` calls a job needs to reach its target
///
/// Returns `None` for step sizes that never converge, including steps so
/// small the tick counter would overflow.
pub fn steps_to_converge(step: f32) -> Option<u32> {
    if !(step > 0.0) {
        return None;
    }
    let estimate = (1.0 / f64::from(step)).floor() + 1.0;
    if estimate >= f64::from(u32::MAX) {
        return None;
    }

    // Settle on the f32 arithmetic the job itself uses
    let mut ticks = estimate as u32;
    while ticks > 1 && (ticks - 1) as f32 * step > 1.0 {
        ticks -= 1;
    }
    while !(ticks as f32 * step > 1.0) {
        ticks = ticks.checked_add(1)?;
    }
    Some(ticks)
}

/// Runs transition jobs, at most one per window
///
/// Scheduling a window that already has a running job replaces that job; the
/// replacement starts from wherever the window is at that moment.
#[derive(Debug)]
pub struct TransitionScheduler {
    jobs: Vec<TransitionJob>,
    step: f32,
}

impl TransitionScheduler {
    pub fn new(step: f32) -> Self {
        Self {
            jobs: Vec::new(),
            step,
        }
    }

    pub fn step_size(&self) -> f32 {
        self.step
    }

    /// Start moving `window` from its current pose towards the target
    pub fn schedule(
        &mut self,
        id: WindowId,
        window: &dyn Window,
        target_transform: Mat4,
        target_scale: f32,
    ) {
        let job = TransitionJob::new(
            id,
            window.transform(),
            window.scale(),
            target_transform,
            target_scale,
        );

        match self.jobs.iter_mut().find(|job| job.window == id) {
            Some(running) => {
                debug!(window = %id, "replacing running transition");
                *running = job;
            }
            None => {
                debug!(window = %id, "transition scheduled");
                self.jobs.push(job);
            }
        }
    }

    /// Drop the job for a window, returning whether one was running
    pub fn cancel(&mut self, id: WindowId) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.window != id);
        before != self.jobs.len()
    }

    pub fn is_running(&self, id: WindowId) -> bool {
        self.jobs.iter().any(|job| job.window == id)
    }

    pub fn job(&self, id: WindowId) -> Option<&TransitionJob> {
        self.jobs.iter().find(|job| job.window == id)
    }

    pub fn is_idle(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Advance every job by one frame
    ///
    /// Returns the windows whose transform was written. Jobs for windows
    /// missing from the arena are discarded.
    pub fn step(&mut self, arena: &mut WindowArena) -> Vec<WindowId> {
        let step = self.step;
        let mut moved = Vec::with_capacity(self.jobs.len());

        self.jobs.retain_mut(|job| {
            let Some(window) = arena.get_mut(job.window) else {
                warn!(window = %job.window, "dropping transition for missing window");
                return false;
            };
            moved.push(job.window);
            let done = job.advance(window, step);
            if done {
                debug!(window = %job.window, "transition finished");
            }
            !done
        });

        moved
    }
}
