//! Head-following windows

use approx::assert_abs_diff_eq;
use glam::{Mat4, Quat, Vec2, Vec3};
use xrwm_core::math::{transforms_equal, translation};
use xrwm_core::*;

fn hud(position: Vec3) -> PlaneWindow {
    PlaneWindow::from_pixels("hud", 300, 150, 300.0).with_position(position)
}

#[test]
fn test_follows_head_at_registration_distance() {
    let mut manager = WindowManager::default();
    let head = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
    manager.update_head_pose(&head);
    let id = manager.register(
        hud(Vec3::new(0.0, 1.0, -1.2)),
        WindowFlags::NONE.hoverable().follow_head(),
    );

    // Already in place
    manager.tick();
    assert!(translation(&manager.window(id).unwrap().transform())
        .abs_diff_eq(Vec3::new(0.0, 1.0, -1.2), 1e-5));

    // Turn around; the window trails at the configured speed
    let turned = Mat4::from_rotation_translation(
        Quat::from_rotation_y(std::f32::consts::PI),
        Vec3::new(0.0, 1.0, 0.0),
    );
    manager.update_head_pose(&turned);
    let before = translation(&manager.window(id).unwrap().transform());
    manager.tick();
    let after = translation(&manager.window(id).unwrap().transform());
    assert_abs_diff_eq!(
        before.distance(after),
        manager.config().follow_head_speed,
        epsilon = 1e-5
    );

    let mut ticks = 0;
    let target = turned * Mat4::from_translation(Vec3::new(0.0, 0.0, -1.2));
    while !transforms_equal(&manager.window(id).unwrap().transform(), &target) {
        manager.tick();
        ticks += 1;
        assert!(ticks < 1000, "window never caught up with the head");
    }
    assert!(translation(&target).abs_diff_eq(Vec3::new(0.0, 1.0, 1.2), 1e-5));
}

#[test]
fn test_unregister_drops_binding() {
    let mut manager = WindowManager::default();
    let id = manager.register(hud(Vec3::new(0.0, 0.0, -1.0)), WindowFlags::NONE.follow_head());
    assert_eq!(manager.follow_head_containers().len(), 1);

    manager.unregister(id).unwrap();
    assert!(manager.follow_head_containers().is_empty());
    manager.update_head_pose(&Mat4::from_translation(Vec3::X));
    manager.tick();
}

#[test]
fn test_children_of_followed_window_move_along() {
    let mut manager = WindowManager::default();
    let parent = manager.register(hud(Vec3::new(0.0, 0.0, -1.0)), WindowFlags::NONE.follow_head());
    let child = manager.register(hud(Vec3::ZERO), WindowFlags::BUTTON);
    manager.add_child(parent, child, Vec2::new(30.0, 0.0)).unwrap();

    manager.update_head_pose(&Mat4::from_translation(Vec3::new(0.03, 0.0, 0.0)));
    manager.tick();

    let z_offset = manager.config().child_z_offset;
    let position = translation(&manager.window(child).unwrap().transform());
    assert!(position.abs_diff_eq(Vec3::new(0.13, 0.0, -1.0 + z_offset), 1e-5));
}
