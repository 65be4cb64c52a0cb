use super::WindowManager;
use crate::events::{HoverEvent, ManagerEvent, NoHoverEvent, WindowEvent};
use crate::math;
use crate::window::WindowId;
use glam::{Mat4, Vec2, Vec3};
use tracing::debug;

/// What a controller is pointing at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverState {
    /// Hovered window, if any
    pub window: Option<WindowId>,
    /// Controller pose at the last update
    pub pose: Mat4,
    /// Distance from the controller to the intersection point
    pub distance: f32,
    /// Intersection point relative to the window center, in window-local
    /// meters
    pub intersection_offset: Vec2,
}

impl Default for HoverState {
    fn default() -> Self {
        Self {
            window: None,
            pose: Mat4::IDENTITY,
            distance: 0.0,
            intersection_offset: Vec2::ZERO,
        }
    }
}

impl WindowManager {
    /// Find the closest hoverable window hit by the controller ray
    pub(crate) fn test_hover(&mut self, pose: &Mat4, controller_index: usize) {
        let mut closest: Option<(WindowId, Vec3, f32)> = None;

        for id in &self.hoverable {
            let Some(window) = self.arena.get(*id) else {
                continue;
            };
            let Some(point) = window.intersect(pose) else {
                continue;
            };
            let distance = math::point_pose_distance(point, pose);
            // Strictly closer, so ties keep the earlier window
            if closest.map_or(true, |(_, _, best)| distance < best) {
                closest = Some((*id, point, distance));
            }
        }

        let Some((id, point, distance)) = closest else {
            if let Some(previous) = self.hover[controller_index].window.take() {
                debug!(window = %previous, controller_index, "hover ended");
                self.emit(previous, WindowEvent::HoverEnd { controller_index });
            }
            self.hover[controller_index].pose = *pose;
            self.publish(ManagerEvent::NoHover(NoHoverEvent {
                controller_index,
                pose: *pose,
            }));
            return;
        };

        let intersection_offset = self
            .arena
            .get(id)
            .map(|window| window.intersection_to_offset_meter(point))
            .unwrap_or_default();

        // New target is recorded before hover-end goes out
        let previous = self.hover[controller_index].window;
        self.hover[controller_index] = HoverState {
            window: Some(id),
            pose: *pose,
            distance,
            intersection_offset,
        };

        if previous != Some(id) {
            if let Some(previous) = previous {
                self.emit(previous, WindowEvent::HoverEnd { controller_index });
            }
            debug!(window = %id, controller_index, "hover started");
            self.emit(id, WindowEvent::HoverStart { controller_index });
        }

        self.emit(
            id,
            WindowEvent::Hover(HoverEvent {
                controller_index,
                distance,
                point,
                pose: *pose,
            }),
        );
    }
}
