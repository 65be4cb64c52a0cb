//! Hover detection across hoverable windows

use crossbeam::channel::Receiver;
use glam::{Mat4, Quat, Vec2, Vec3};
use xrwm_core::*;

fn quad_at(title: &str, position: Vec3) -> PlaneWindow {
    // 1m x 1m
    PlaneWindow::from_pixels(title, 300, 300, 300.0).with_position(position)
}

fn drain(events: &Receiver<ManagerEvent>) -> Vec<ManagerEvent> {
    events.try_iter().collect()
}

fn window_event(window: WindowId, event: WindowEvent) -> ManagerEvent {
    ManagerEvent::Window { window, event }
}

#[test]
fn test_closest_window_wins() {
    let mut manager = WindowManager::default();
    let far = manager.register(quad_at("far", Vec3::new(0.0, 0.0, -3.0)), WindowFlags::APPLICATION);
    let near = manager.register(quad_at("near", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();

    let state = manager.hover_state(0).unwrap();
    assert_eq!(state.window, Some(near));
    assert!((state.distance - 2.0).abs() < 1e-5);
    assert!(!manager.is_hovered(far));
}

#[test]
fn test_equal_distance_prefers_first_registered() {
    let mut manager = WindowManager::default();
    let first = manager.register(quad_at("first", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
    let _second = manager.register(quad_at("second", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    assert_eq!(manager.hover_state(0).unwrap().window, Some(first));
}

#[test]
fn test_non_hoverable_windows_are_ignored() {
    let mut manager = WindowManager::default();
    manager.register(
        quad_at("decoration", Vec3::new(0.0, 0.0, -1.0)),
        WindowFlags::NONE.managed(),
    );
    let events = manager.subscribe();

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    assert!(!manager.is_hovering());
    assert!(matches!(drain(&events)[..], [ManagerEvent::NoHover(_)]));
}

#[test]
fn test_hover_start_once_then_hover_every_tick() {
    let mut manager = WindowManager::default();
    let id = manager.register(quad_at("w", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
    let events = manager.subscribe();

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    manager.update_pose(&Mat4::from_translation(Vec3::new(0.1, 0.0, 0.0)), 0).unwrap();

    let events = drain(&events);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], window_event(id, WindowEvent::HoverStart { controller_index: 0 }));
    assert!(matches!(
        events[1],
        ManagerEvent::Window { event: WindowEvent::Hover(_), .. }
    ));
    match events[2] {
        ManagerEvent::Window {
            event: WindowEvent::Hover(hover),
            window,
        } => {
            assert_eq!(window, id);
            assert!(hover.point.abs_diff_eq(Vec3::new(0.1, 0.0, -2.0), 1e-5));
            assert!((hover.distance - 2.0).abs() < 1e-5);
        }
        other => panic!("expected hover event, got {:?}", other),
    }
}

#[test]
fn test_hover_change_ends_previous_first() {
    let mut manager = WindowManager::default();
    let left = manager.register(quad_at("left", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
    let right = manager.register(quad_at("right", Vec3::new(3.0, 0.0, -2.0)), WindowFlags::APPLICATION);

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    let events = manager.subscribe();
    manager.update_pose(&Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)), 0).unwrap();

    let events = drain(&events);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], window_event(left, WindowEvent::HoverEnd { controller_index: 0 }));
    assert_eq!(events[1], window_event(right, WindowEvent::HoverStart { controller_index: 0 }));
    assert_eq!(events[2].window(), Some(right));
    assert_eq!(manager.hover_state(0).unwrap().window, Some(right));
}

#[test]
fn test_miss_ends_hover_and_reports_no_hover() {
    let mut manager = WindowManager::default();
    let id = manager.register(quad_at("w", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();

    let events = manager.subscribe();
    let away = Mat4::from_quat(Quat::from_rotation_y(std::f32::consts::PI));
    manager.update_pose(&away, 0).unwrap();
    manager.update_pose(&away, 0).unwrap();

    let events = drain(&events);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], window_event(id, WindowEvent::HoverEnd { controller_index: 0 }));
    assert_eq!(
        events[1],
        ManagerEvent::NoHover(NoHoverEvent {
            controller_index: 0,
            pose: away
        })
    );
    assert!(matches!(events[2], ManagerEvent::NoHover(_)));
    assert_eq!(manager.hover_state(0).unwrap().window, None);
}

#[test]
fn test_controllers_hover_independently() {
    let mut manager = WindowManager::default();
    let id = manager.register(quad_at("w", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);

    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    manager.update_pose(&Mat4::from_translation(Vec3::new(0.2, 0.0, 0.0)), 1).unwrap();

    assert_eq!(manager.hover_state(0).unwrap().window, Some(id));
    assert_eq!(manager.hover_state(1).unwrap().window, Some(id));

    let window = manager.window(id).unwrap();
    assert_eq!(window.title(), "w");
}

#[test]
fn test_intersection_offset_recorded() {
    let mut manager = WindowManager::default();
    manager.register(quad_at("w", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);

    manager
        .update_pose(&Mat4::from_translation(Vec3::new(0.25, -0.1, 0.0)), 0)
        .unwrap();
    let offset = manager.hover_state(0).unwrap().intersection_offset;
    assert!(offset.abs_diff_eq(Vec2::new(0.25, -0.1), 1e-5));
}

#[test]
fn test_unregister_clears_hover() {
    let mut manager = WindowManager::default();
    let id = manager.register(quad_at("w", Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
    manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
    manager.update_pose(&Mat4::IDENTITY, 1).unwrap();

    let events = manager.subscribe();
    let window = manager.unregister(id).unwrap();
    assert_eq!(window.title(), "w");
    assert!(!manager.is_hovering());

    let events = drain(&events);
    assert_eq!(
        events,
        vec![
            window_event(id, WindowEvent::HoverEnd { controller_index: 0 }),
            window_event(id, WindowEvent::HoverEnd { controller_index: 1 }),
        ]
    );
}
