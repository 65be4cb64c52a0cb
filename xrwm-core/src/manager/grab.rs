use super::WindowManager;
use crate::error::WmResult;
use crate::events::{GrabEvent, WindowEvent};
use crate::math;
use crate::window::WindowId;
use glam::{Mat4, Quat, Vec3};
use std::time::Duration;
use tracing::debug;

/// Push/pull never brings a grabbed window closer than this, in meters
pub const MINIMAL_GRAB_DISTANCE: f32 = 0.01;

/// What a controller is dragging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabState {
    /// Grabbed window, if any
    pub window: Option<WindowId>,
    /// Window rotation when the grab started
    pub window_rotation: Quat,
    /// Inverse of the controller rotation when the grab started
    pub inverse_controller_rotation: Quat,
    /// Translation from the grabbed point to the window center, in
    /// window-local meters
    pub offset: Vec3,
    /// Distance along the controller ray to the grabbed point
    pub distance: f32,
}

impl Default for GrabState {
    fn default() -> Self {
        Self {
            window: None,
            window_rotation: Quat::IDENTITY,
            inverse_controller_rotation: Quat::IDENTITY,
            offset: Vec3::ZERO,
            distance: 0.0,
        }
    }
}

impl WindowManager {
    /// Trigger pressed: emit grab-start to the hovered window and start
    /// dragging it if it can be dragged
    ///
    /// Non-draggable windows such as buttons still receive grab-start.
    pub fn check_grab(&mut self, controller_index: usize) -> WmResult<()> {
        self.check_controller(controller_index)?;
        let Some(id) = self.hover[controller_index].window else {
            return Ok(());
        };

        self.drag_start(controller_index)?;
        self.emit(id, WindowEvent::GrabStart { controller_index });
        Ok(())
    }

    /// Promote the hover state of a controller to a grab
    ///
    /// Does nothing unless the hovered window is draggable and not already
    /// held by any controller.
    pub fn drag_start(&mut self, controller_index: usize) -> WmResult<()> {
        self.check_controller(controller_index)?;
        let hover = self.hover[controller_index];
        let Some(id) = hover.window else {
            return Ok(());
        };
        if !self.draggable.contains(&id) || self.is_grabbed(id) {
            return Ok(());
        }
        let Some(window) = self.arena.get(id) else {
            return Ok(());
        };

        self.grab[controller_index] = GrabState {
            window: Some(id),
            window_rotation: math::rotation(&window.transform()),
            inverse_controller_rotation: math::rotation(&hover.pose).inverse(),
            offset: Vec3::new(
                -hover.intersection_offset.x,
                -hover.intersection_offset.y,
                0.0,
            ),
            distance: hover.distance,
        };
        debug!(window = %id, controller_index, distance = hover.distance, "grab started");
        Ok(())
    }

    /// Trigger released: end the drag of this controller
    pub fn check_release(&mut self, controller_index: usize) -> WmResult<()> {
        self.check_controller(controller_index)?;
        let Some(id) = self.grab[controller_index].window else {
            return Ok(());
        };

        debug!(window = %id, controller_index, "released");
        self.emit(id, WindowEvent::Release { controller_index });
        self.grab[controller_index].window = None;
        Ok(())
    }

    /// Move the grabbed window so the grabbed point stays on the controller
    /// ray at the grab distance
    pub(crate) fn drag(&mut self, pose: &Mat4, controller_index: usize) {
        let grab = self.grab[controller_index];
        let Some(id) = grab.window else {
            return;
        };

        let (_, controller_rotation, controller_position) = pose.to_scale_rotation_translation();
        let grab_pose = Mat4::from_translation(controller_position)
            * Mat4::from_quat(controller_rotation)
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -grab.distance))
            * Mat4::from_quat(grab.inverse_controller_rotation)
            * Mat4::from_quat(grab.window_rotation);
        let transform = grab_pose * Mat4::from_translation(grab.offset);

        let Some(window) = self.arena.get_mut(id) else {
            return;
        };
        window.set_transform(transform);
        self.hover[controller_index].pose = *pose;

        self.update_children(id);
        self.emit(
            id,
            WindowEvent::Grab(GrabEvent {
                controller_index,
                pose: grab_pose,
            }),
        );
    }

    /// Grow or shrink the grabbed window by `factor` per second
    ///
    /// The result is applied only while it stays above the configured
    /// minimal scale factor. The grab offset scales along so the grabbed
    /// point stays under the controller.
    pub fn scale(&mut self, controller_index: usize, factor: f32, dt: Duration) -> WmResult<()> {
        self.check_controller(controller_index)?;
        let Some(id) = self.grab[controller_index].window else {
            return Ok(());
        };
        let Some(window) = self.arena.get_mut(id) else {
            return Ok(());
        };

        let ratio = 1.0 + factor * dt.as_secs_f32();
        let new_scale = window.scale() * ratio;
        if new_scale > self.config.minimal_scale_factor {
            window.set_scale(new_scale);
            self.grab[controller_index].offset *= ratio;
            self.update_children(id);
        }
        Ok(())
    }

    /// Move the grabbed window along the controller ray
    ///
    /// Positive amounts push away, negative ones pull closer. The change is
    /// proportional to the current distance.
    pub fn push_pull(&mut self, controller_index: usize, amount: f32, dt: Duration) -> WmResult<()> {
        self.check_controller(controller_index)?;
        let grab = &mut self.grab[controller_index];
        if grab.window.is_none() {
            return Ok(());
        }

        let delta =
            self.config.scroll_to_push_ratio * grab.distance * amount * dt.as_secs_f32();
        let distance = grab.distance + delta;
        if distance > MINIMAL_GRAB_DISTANCE {
            grab.distance = distance;
        }
        Ok(())
    }
}
