//! Windows that stay in front of the user's head

use crate::math;
use crate::window::{Window, WindowId};
use glam::{Mat4, Vec3};

/// Keeps one window at a fixed distance in front of the head
///
/// Each step moves the window at most `speed` meters toward its target and
/// turns it by the same fraction, so it trails behind fast head motion
/// instead of being glued to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowHeadContainer {
    window: WindowId,
    distance: f32,
    speed: f32,
}

impl FollowHeadContainer {
    pub fn new(window: WindowId, distance: f32, speed: f32) -> Self {
        Self {
            window,
            distance,
            speed,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Distance kept between head and window, in meters
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Where the window wants to be for the given head pose
    ///
    /// Straight ahead of the head with the head's orientation, which turns the
    /// window's front toward the viewer.
    pub fn target_transform(&self, head_pose: &Mat4) -> Mat4 {
        *head_pose * Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
    }

    /// Move the window one increment toward its target
    ///
    /// Returns whether the window's transform changed.
    pub fn step(&self, head_pose: &Mat4, window: &mut dyn Window) -> bool {
        let current = window.transform();
        let target = self.target_transform(head_pose);
        if math::transforms_equal(&current, &target) {
            return false;
        }

        let from = math::translation(&current);
        let to = math::translation(&target);
        let remaining = from.distance(to);
        let fraction = if remaining <= self.speed {
            1.0
        } else {
            self.speed / remaining
        };

        let rotation = math::rotation(&current).slerp(math::rotation(&target), fraction);
        let next = Mat4::from_rotation_translation(rotation, from.lerp(to, fraction));
        window.set_transform(next);
        !math::transforms_equal(&current, &next)
    }
}
