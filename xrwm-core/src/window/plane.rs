//! Flat quad window

use super::Window;
use crate::events::WindowEvent;
use crate::math::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Ray directions closer to parallel with the plane than this never hit
const PARALLEL_EPSILON: f32 = 1e-8;

/// A rectangular window lying in its local XY plane
///
/// The quad is centered on the origin of its transform and its front faces
/// local +Z. Its extent in meters is `pixels / ppm * scale`.
#[derive(Debug, Clone)]
pub struct PlaneWindow {
    title: String,
    transform: Mat4,
    scale: f32,
    width_pixels: u32,
    height_pixels: u32,
    ppm: f32,
    hovered_by: u32,
    grabbed_by: Option<usize>,
}

impl PlaneWindow {
    /// Create a window from its pixel size and density
    pub fn from_pixels(title: impl Into<String>, width: u32, height: u32, ppm: f32) -> Self {
        Self {
            title: title.into(),
            transform: Mat4::IDENTITY,
            scale: 1.0,
            width_pixels: width,
            height_pixels: height,
            ppm,
            hovered_by: 0,
            grabbed_by: None,
        }
    }

    /// Create a window from its size in meters
    pub fn from_meters(title: impl Into<String>, width: f32, height: f32, ppm: f32) -> Self {
        let width_pixels = (width * ppm).round() as u32;
        let height_pixels = (height * ppm).round() as u32;
        Self::from_pixels(title, width_pixels, height_pixels, ppm)
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform = Mat4::from_translation(position);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Whether any controller currently points at this window
    pub fn is_highlighted(&self) -> bool {
        self.hovered_by != 0
    }

    /// Controller currently dragging this window
    pub fn grabbed_by(&self) -> Option<usize> {
        self.grabbed_by
    }

    /// Intersection point in the window's local space
    fn local_point(&self, point: Vec3) -> Vec3 {
        self.transform.inverse().transform_point3(point)
    }
}

impl Window for PlaneWindow {
    fn title(&self) -> &str {
        &self.title
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }

    fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn scale(&self) -> f32 {
        self.scale
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn size_pixels(&self) -> (u32, u32) {
        (self.width_pixels, self.height_pixels)
    }

    fn ppm(&self) -> f32 {
        self.ppm
    }

    fn intersect(&self, pose: &Mat4) -> Option<Vec3> {
        let ray = Ray::from_pose(pose);
        let inverse = self.transform.inverse();
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);

        // Plane is local Z = 0
        if direction.z.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            return None;
        }

        let hit = origin + direction * t;
        let half_width = self.width_meters() * 0.5;
        let half_height = self.height_meters() * 0.5;
        if hit.x.abs() > half_width || hit.y.abs() > half_height {
            return None;
        }

        Some(self.transform.transform_point3(Vec3::new(hit.x, hit.y, 0.0)))
    }

    fn intersection_to_offset_meter(&self, point: Vec3) -> Vec2 {
        self.local_point(point).truncate()
    }

    fn intersection_to_pixels(&self, point: Vec3) -> Vec2 {
        let local = self.local_point(point);
        let width = self.width_meters();
        let height = self.height_meters();
        // Flip Y: pixel rows grow downwards
        Vec2::new(
            (local.x + width * 0.5) / width * self.width_pixels as f32,
            (height * 0.5 - local.y) / height * self.height_pixels as f32,
        )
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        let bit = 1u32
            .checked_shl(event.controller_index() as u32)
            .unwrap_or(0);
        match event {
            WindowEvent::HoverStart { .. } => self.hovered_by |= bit,
            WindowEvent::HoverEnd { .. } => self.hovered_by &= !bit,
            WindowEvent::GrabStart { controller_index } => {
                if self.grabbed_by.is_none() {
                    self.grabbed_by = Some(*controller_index);
                }
            }
            WindowEvent::Release { controller_index } => {
                if self.grabbed_by == Some(*controller_index) {
                    self.grabbed_by = None;
                }
            }
            WindowEvent::Hover(_) | WindowEvent::Grab(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn window_at(z: f32) -> PlaneWindow {
        // 1m x 0.5m
        PlaneWindow::from_pixels("test", 300, 150, 300.0).with_position(Vec3::new(0.0, 0.0, z))
    }

    #[test]
    fn test_size_in_meters_follows_scale() {
        let window = window_at(-2.0);
        assert_abs_diff_eq!(window.width_meters(), 1.0);
        assert_abs_diff_eq!(window.height_meters(), 0.5);

        let window = window.with_scale(2.0);
        assert_abs_diff_eq!(window.width_meters(), 2.0);
        assert_abs_diff_eq!(window.height_meters(), 1.0);
    }

    #[test]
    fn test_from_meters_rounds_to_pixels() {
        let window = PlaneWindow::from_meters("m", 0.5, 0.25, 400.0);
        assert_eq!(window.size_pixels(), (200, 100));
    }

    #[test]
    fn test_direct_hit() {
        let window = window_at(-2.0);
        let point = window.intersect(&Mat4::IDENTITY).unwrap();
        assert!(point.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-6));
    }

    #[test]
    fn test_off_center_hit_and_offset() {
        let window = window_at(-2.0);
        let pose = Mat4::from_translation(Vec3::new(0.3, -0.1, 0.0));
        let point = window.intersect(&pose).unwrap();
        let offset = window.intersection_to_offset_meter(point);
        assert_abs_diff_eq!(offset.x, 0.3, epsilon = 1e-6);
        assert_abs_diff_eq!(offset.y, -0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_miss_outside_bounds() {
        let window = window_at(-2.0);
        let pose = Mat4::from_translation(Vec3::new(0.6, 0.0, 0.0));
        assert!(window.intersect(&pose).is_none());
    }

    #[test]
    fn test_miss_behind_ray() {
        let window = window_at(2.0);
        assert!(window.intersect(&Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_miss_parallel_ray() {
        let window = window_at(-2.0);
        let pose = Mat4::from_quat(Quat::from_rotation_y(FRAC_PI_2));
        assert!(window.intersect(&pose).is_none());
    }

    #[test]
    fn test_rotated_window_hit() {
        // Window to the right of the origin, turned to face it
        let transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(-FRAC_PI_2),
            Vec3::new(2.0, 0.0, 0.0),
        );
        let window = PlaneWindow::from_pixels("side", 300, 300, 300.0).with_transform(transform);
        let pose = Mat4::from_quat(Quat::from_rotation_y(-FRAC_PI_2));
        let point = window.intersect(&pose).unwrap();
        assert!(point.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_pixel_coordinates() {
        let window = window_at(-2.0);
        let center = window.intersection_to_pixels(Vec3::new(0.0, 0.0, -2.0));
        assert_abs_diff_eq!(center.x, 150.0, epsilon = 1e-3);
        assert_abs_diff_eq!(center.y, 75.0, epsilon = 1e-3);

        let top_left = window.intersection_to_pixels(Vec3::new(-0.5, 0.25, -2.0));
        assert_abs_diff_eq!(top_left.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(top_left.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_event_sink_tracks_highlight_and_grab() {
        let mut window = window_at(-2.0);
        window.handle_event(&WindowEvent::HoverStart { controller_index: 0 });
        window.handle_event(&WindowEvent::HoverStart { controller_index: 1 });
        assert!(window.is_highlighted());
        window.handle_event(&WindowEvent::HoverEnd { controller_index: 0 });
        assert!(window.is_highlighted());
        window.handle_event(&WindowEvent::HoverEnd { controller_index: 1 });
        assert!(!window.is_highlighted());

        window.handle_event(&WindowEvent::GrabStart { controller_index: 1 });
        assert_eq!(window.grabbed_by(), Some(1));
        window.handle_event(&WindowEvent::Release { controller_index: 0 });
        assert_eq!(window.grabbed_by(), Some(1));
        window.handle_event(&WindowEvent::Release { controller_index: 1 });
        assert_eq!(window.grabbed_by(), None);
    }
}
