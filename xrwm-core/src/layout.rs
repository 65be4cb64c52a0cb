//! Layouts applied to managed windows through animated transitions

use crate::error::{WmError, WmResult};
use crate::manager::WindowManager;
use crate::math;
use glam::{Mat4, Vec3};
use std::f32::consts::PI;
use tracing::{debug, error};

const THETA_START: f32 = PI / 2.0;
const THETA_END: f32 = PI - PI / 8.0;
const PHI_START: f32 = 0.0;
const PHI_END: f32 = PI;

/// Grid size for `count` windows as `(width, height)`
///
/// The height is the integer square root of `count`, the width the smallest
/// value with `width * height >= count`.
pub fn grid_dimensions(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }

    let mut height = (count as f64).sqrt() as usize;
    while (height + 1) * (height + 1) <= count {
        height += 1;
    }
    while height * height > count {
        height -= 1;
    }

    let mut width = count / height;
    while width * height < count {
        width += 1;
    }
    (width, height)
}

/// Window poses on a partial sphere around the origin, row by row
///
/// Rows walk the polar angle from the horizon downwards, columns walk the
/// azimuth over half a circle. Every pose faces the origin with +Y up.
pub fn sphere_poses(width: usize, height: usize, radius: f32) -> Vec<Mat4> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let theta_step = (THETA_END - THETA_START) / width as f32;
    let phi_step = (PHI_END - PHI_START) / height as f32;

    let mut poses = Vec::with_capacity(width * height);
    for row in 0..width {
        let theta = THETA_START + row as f32 * theta_step;
        for column in 0..height {
            let phi = PHI_START + column as f32 * phi_step;
            let position = Vec3::new(
                theta.sin() * phi.cos(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ) * radius;
            poses.push(math::look_at(position, Vec3::ZERO, Vec3::Y));
        }
    }
    poses
}

impl WindowManager {
    /// Animate every managed window back to its reset pose
    ///
    /// Returns how many transitions were scheduled.
    pub fn arrange_reset(&mut self) -> usize {
        let mut scheduled = 0;
        for id in &self.managed {
            let (Some(window), Some(reset)) = (self.arena.get(*id), self.reset.get(id)) else {
                continue;
            };
            let moved = !math::transforms_equal(&window.transform(), &reset.transform);
            let rescaled = (window.scale() - reset.scale).abs() > math::TRANSFORM_EPSILON;
            if moved || rescaled {
                self.transitions
                    .schedule(*id, window, reset.transform, reset.scale);
                scheduled += 1;
            }
        }
        debug!(scheduled, "arranged windows to reset poses");
        scheduled
    }

    /// Animate managed windows onto a sphere around the origin
    ///
    /// Windows fill the grid in registration order at their reset scale.
    /// Fails when the grid has more cells than windows; transitions scheduled
    /// for earlier cells keep running.
    pub fn arrange_sphere(&mut self) -> WmResult<()> {
        let count = self.managed.len();
        let (width, height) = grid_dimensions(count);
        let poses = sphere_poses(width, height, self.config.sphere_radius);

        for (slot, target) in poses.into_iter().enumerate() {
            let Some(id) = self.managed.get(slot).copied() else {
                error!(slot, count, "sphere layout slot has no window");
                return Err(WmError::LayoutSlotOutOfRange { slot, count });
            };
            let Some(window) = self.arena.get(id) else {
                continue;
            };
            if math::transforms_equal(&window.transform(), &target) {
                continue;
            }

            let scale = self
                .reset
                .get(&id)
                .map_or(window.scale(), |reset| reset.scale);
            self.transitions.schedule(id, window, target, scale);
        }

        debug!(count, width, height, "arranged windows on sphere");
        Ok(())
    }
}
