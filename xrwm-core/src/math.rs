//! Pose and transform helpers
//!
//! Poses are rigid `Mat4` transforms. Controllers point along their local -Z
//! axis, windows face along their local +Z axis.

use glam::{Mat4, Quat, Vec3};

/// Maximum per-element difference for two transforms to count as equal
pub const TRANSFORM_EPSILON: f32 = 1e-5;

/// A ray cast from a pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin in world space
    pub origin: Vec3,
    /// Normalized direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// The forward (-Z) ray of a pose
    pub fn from_pose(pose: &Mat4) -> Self {
        Self::new(pose.w_axis.truncate(), pose.transform_vector3(Vec3::NEG_Z))
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Translation part of a transform
pub fn translation(m: &Mat4) -> Vec3 {
    m.w_axis.truncate()
}

/// Rotation part of a transform
pub fn rotation(m: &Mat4) -> Quat {
    let (_, rotation, _) = m.to_scale_rotation_translation();
    rotation
}

/// Distance between a point and the origin of a pose
pub fn point_pose_distance(point: Vec3, pose: &Mat4) -> f32 {
    point.distance(translation(pose))
}

/// Pose at `position` whose +Z front faces `target`
///
/// A window placed with this pose is seen head-on from `target`.
pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let away = position + (position - target);
    Mat4::look_at_rh(position, away, up).inverse()
}

/// Interpolate between two affine transforms
///
/// Translation and scale are interpolated linearly, rotation spherically.
pub fn interpolate(from: &Mat4, to: &Mat4, t: f32) -> Mat4 {
    let (from_scale, from_rotation, from_translation) = from.to_scale_rotation_translation();
    let (to_scale, to_rotation, to_translation) = to.to_scale_rotation_translation();

    Mat4::from_scale_rotation_translation(
        from_scale.lerp(to_scale, t),
        from_rotation.slerp(to_rotation, t),
        from_translation.lerp(to_translation, t),
    )
}

/// Element-wise transform comparison
pub fn transforms_equal(a: &Mat4, b: &Mat4) -> bool {
    a.abs_diff_eq(*b, TRANSFORM_EPSILON)
}
