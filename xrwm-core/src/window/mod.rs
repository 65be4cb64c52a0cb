//! Windows placed in 3D space
//!
//! A window is a flat rectangle with a world transform and a scale factor.
//! The manager only talks to windows through the [`Window`] trait; the
//! bundled [`PlaneWindow`] is a plain quad implementation of it.

pub mod arena;
pub mod plane;

pub use arena::WindowArena;
pub use plane::PlaneWindow;

use crate::events::WindowEvent;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of a registered window
///
/// Issued by the [`WindowArena`] and never reused within one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// Membership flags chosen at registration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFlags {
    /// Takes part in controller hover tests
    pub hoverable: bool,
    /// Can be grabbed and dragged by a controller
    pub draggable: bool,
    /// Can be moved by layout operations
    pub managed: bool,
    /// Destroyed together with the manager
    pub destroy_with_parent: bool,
    /// Kept at a fixed distance in front of the head
    pub follow_head: bool,
}

impl WindowFlags {
    /// No membership at all
    pub const NONE: Self = Self {
        hoverable: false,
        draggable: false,
        managed: false,
        destroy_with_parent: false,
        follow_head: false,
    };

    /// Regular application window: hoverable, draggable, managed and owned
    /// by the manager
    pub const APPLICATION: Self = Self {
        hoverable: true,
        draggable: true,
        managed: true,
        destroy_with_parent: true,
        follow_head: false,
    };

    /// Button-like window: can be pointed at and pressed but not moved
    pub const BUTTON: Self = Self {
        hoverable: true,
        draggable: false,
        managed: false,
        destroy_with_parent: true,
        follow_head: false,
    };

    pub fn hoverable(mut self) -> Self {
        self.hoverable = true;
        self
    }

    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    pub fn managed(mut self) -> Self {
        self.managed = true;
        self
    }

    pub fn destroy_with_parent(mut self) -> Self {
        self.destroy_with_parent = true;
        self
    }

    pub fn follow_head(mut self) -> Self {
        self.follow_head = true;
        self
    }
}

/// Contract every window handed to the manager must fulfil
pub trait Window {
    /// Human readable title, used for logging
    fn title(&self) -> &str;

    /// World transform of the window center
    fn transform(&self) -> Mat4;

    fn set_transform(&mut self, transform: Mat4);

    /// Scale factor applied on top of the window's natural size
    fn scale(&self) -> f32;

    fn set_scale(&mut self, scale: f32);

    /// Size of the window content in pixels
    fn size_pixels(&self) -> (u32, u32);

    /// Pixels per meter at scale 1.0
    fn ppm(&self) -> f32;

    /// Current width in meters, including the scale factor
    fn width_meters(&self) -> f32 {
        self.size_pixels().0 as f32 / self.ppm() * self.scale()
    }

    /// Current height in meters, including the scale factor
    fn height_meters(&self) -> f32 {
        self.size_pixels().1 as f32 / self.ppm() * self.scale()
    }

    /// Convert a pixel distance to meters at the current scale
    fn pixels_to_meters(&self, pixels: f32) -> f32 {
        pixels / self.ppm() * self.scale()
    }

    /// Intersect the forward ray of `pose` with the window rectangle
    ///
    /// Returns the world space intersection point when the ray hits the
    /// window within its bounds.
    fn intersect(&self, pose: &Mat4) -> Option<Vec3>;

    /// Offset of an intersection point from the window center, in meters
    /// along the window's local axes
    fn intersection_to_offset_meter(&self, point: Vec3) -> Vec2;

    /// Pixel coordinates of an intersection point, origin at the top left
    fn intersection_to_pixels(&self, point: Vec3) -> Vec2;

    /// Process pending internal input, called once per tick for hoverable
    /// windows
    fn poll_event(&mut self) {}

    /// Event sink for interaction events addressed to this window
    fn handle_event(&mut self, _event: &WindowEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId(3).to_string(), "window-3");
    }

    #[test]
    fn test_flag_builders() {
        let flags = WindowFlags::NONE.hoverable().managed();
        assert!(flags.hoverable);
        assert!(flags.managed);
        assert!(!flags.draggable);
        assert!(!flags.follow_head);

        assert_eq!(WindowFlags::default(), WindowFlags::NONE);
        assert_eq!(
            WindowFlags::BUTTON.draggable().managed(),
            WindowFlags::APPLICATION
        );
    }
}
