//! The spatial window manager state machine
//!
//! [`WindowManager`] owns every registered window and tracks, per controller,
//! which window is pointed at and which one is being dragged. The host drives
//! it from a single loop: controller and head poses go in every tick,
//! followed by [`WindowManager::tick`] to run follow-head and transition
//! steps.

mod grab;
mod hover;
mod input;

pub use grab::{GrabState, MINIMAL_GRAB_DISTANCE};
pub use hover::HoverState;
pub use input::{AnalogEvent, DigitalEvent};

use crate::config::WmConfig;
use crate::error::{WmError, WmResult};
use crate::events::{EventBus, EventReceiver, ManagerEvent, WindowEvent};
use crate::follow_head::FollowHeadContainer;
use crate::math;
use crate::transition::TransitionScheduler;
use crate::window::{Window, WindowArena, WindowFlags, WindowId};
use glam::{Mat4, Vec2, Vec3};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Number of tracked hand controllers
pub const CONTROLLER_COUNT: usize = 2;

/// Pose a window returns to on `arrange_reset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResetPose {
    pub transform: Mat4,
    pub scale: f32,
}

/// A child window pinned to a point on its parent
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChildLink {
    child: WindowId,
    /// Offset from the parent center in parent pixels
    offset: Vec2,
}

pub struct WindowManager {
    pub(crate) config: WmConfig,
    pub(crate) arena: WindowArena,

    // Membership, in registration order
    pub(crate) draggable: Vec<WindowId>,
    pub(crate) managed: Vec<WindowId>,
    pub(crate) hoverable: Vec<WindowId>,
    pub(crate) destroy_with_parent: Vec<WindowId>,

    pub(crate) reset: HashMap<WindowId, ResetPose>,
    pub(crate) hover: [HoverState; CONTROLLER_COUNT],
    pub(crate) grab: [GrabState; CONTROLLER_COUNT],
    pub(crate) transitions: TransitionScheduler,
    pub(crate) following: Vec<FollowHeadContainer>,

    children: HashMap<WindowId, Vec<ChildLink>>,
    parents: HashMap<WindowId, WindowId>,

    head_pose: Mat4,
    events: EventBus,
    pending_time: Duration,
}

impl WindowManager {
    pub fn new(config: WmConfig) -> Self {
        let transitions = TransitionScheduler::new(config.transition_step);
        Self {
            config,
            arena: WindowArena::new(),
            draggable: Vec::new(),
            managed: Vec::new(),
            hoverable: Vec::new(),
            destroy_with_parent: Vec::new(),
            reset: HashMap::new(),
            hover: [HoverState::default(); CONTROLLER_COUNT],
            grab: [GrabState::default(); CONTROLLER_COUNT],
            transitions,
            following: Vec::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
            head_pose: Mat4::IDENTITY,
            events: EventBus::new(),
            pending_time: Duration::ZERO,
        }
    }

    pub fn config(&self) -> &WmConfig {
        &self.config
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Hand a window to the manager
    ///
    /// The window's current transform and scale become its reset pose.
    pub fn register<W: Window + 'static>(&mut self, window: W, flags: WindowFlags) -> WindowId {
        let reset = ResetPose {
            transform: window.transform(),
            scale: window.scale(),
        };
        let position = math::translation(&reset.transform);
        let title = window.title().to_string();
        let id = self.arena.insert(Box::new(window));

        if flags.hoverable {
            self.hoverable.push(id);
        }
        if flags.draggable {
            self.draggable.push(id);
        }
        if flags.managed {
            self.managed.push(id);
        }
        if flags.destroy_with_parent {
            self.destroy_with_parent.push(id);
        }
        if flags.follow_head {
            let distance = position.distance(math::translation(&self.head_pose));
            self.following.push(FollowHeadContainer::new(
                id,
                distance,
                self.config.follow_head_speed,
            ));
        }
        self.reset.insert(id, reset);

        debug!(window = %id, title = %title, ?flags, "registered window");
        id
    }

    /// Take a window back from the manager
    ///
    /// Clears every hover and grab referring to it, emitting hover-end for
    /// each controller that was pointing at it.
    pub fn unregister(&mut self, id: WindowId) -> Option<Box<dyn Window>> {
        if !self.arena.contains(id) {
            warn!(window = %id, "unregister of unknown window");
            return None;
        }

        self.hoverable.retain(|w| *w != id);
        self.draggable.retain(|w| *w != id);
        self.managed.retain(|w| *w != id);
        self.destroy_with_parent.retain(|w| *w != id);
        self.following.retain(|f| f.window() != id);
        self.reset.remove(&id);
        self.transitions.cancel(id);

        if let Some(links) = self.children.remove(&id) {
            for link in links {
                self.parents.remove(&link.child);
            }
        }
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(links) = self.children.get_mut(&parent) {
                links.retain(|link| link.child != id);
            }
        }

        for controller_index in 0..CONTROLLER_COUNT {
            if self.grab[controller_index].window == Some(id) {
                self.grab[controller_index].window = None;
            }
            if self.hover[controller_index].window == Some(id) {
                self.hover[controller_index].window = None;
                self.emit(id, WindowEvent::HoverEnd { controller_index });
            }
        }

        debug!(window = %id, "unregistered window");
        self.arena.remove(id)
    }

    /// Per-tick controller input: drags the grabbed window or runs the
    /// hover test
    pub fn update_pose(&mut self, pose: &Mat4, controller_index: usize) -> WmResult<()> {
        self.check_controller(controller_index)?;
        if self.grab[controller_index].window.is_some() {
            self.drag(pose, controller_index);
        } else {
            self.test_hover(pose, controller_index);
        }
        Ok(())
    }

    pub fn update_head_pose(&mut self, pose: &Mat4) {
        self.head_pose = *pose;
    }

    pub fn head_pose(&self) -> Mat4 {
        self.head_pose
    }

    /// Make the current pose of a window its new reset pose
    pub fn save_reset_transform(&mut self, id: WindowId) -> WmResult<()> {
        let window = self.lookup(id)?;
        let reset = ResetPose {
            transform: window.transform(),
            scale: window.scale(),
        };
        self.reset.insert(id, reset);
        Ok(())
    }

    pub fn reset_pose(&self, id: WindowId) -> Option<ResetPose> {
        self.reset.get(&id).copied()
    }

    /// Move a window, carrying its children along
    pub fn set_window_transform(&mut self, id: WindowId, transform: Mat4) -> WmResult<()> {
        self.lookup_mut(id)?.set_transform(transform);
        self.update_children(id);
        Ok(())
    }

    /// Pin `child` to `parent` at an offset in parent pixels from its center
    ///
    /// A child has at most one parent; linking it again moves it.
    pub fn add_child(&mut self, parent: WindowId, child: WindowId, offset: Vec2) -> WmResult<()> {
        self.lookup(parent)?;
        self.lookup(child)?;
        if parent == child {
            warn!(window = %parent, "window cannot be its own child");
            return Ok(());
        }

        if let Some(previous) = self.parents.insert(child, parent) {
            if let Some(links) = self.children.get_mut(&previous) {
                links.retain(|link| link.child != child);
            }
        }
        self.children
            .entry(parent)
            .or_default()
            .push(ChildLink { child, offset });

        debug!(parent = %parent, child = %child, "child window attached");
        self.update_children(parent);
        Ok(())
    }

    pub fn parent_of(&self, id: WindowId) -> Option<WindowId> {
        self.parents.get(&id).copied()
    }

    pub fn children_of(&self, id: WindowId) -> Vec<WindowId> {
        self.children
            .get(&id)
            .map(|links| links.iter().map(|link| link.child).collect())
            .unwrap_or_default()
    }

    /// Re-pin all descendants of `parent` to its current transform
    pub(crate) fn update_children(&mut self, parent: WindowId) {
        let mut pending = vec![parent];
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(links) = self.children.get(&current) else {
                continue;
            };
            let Some(window) = self.arena.get(current) else {
                continue;
            };

            let transform = window.transform();
            let placed: Vec<(WindowId, Mat4)> = links
                .iter()
                .map(|link| {
                    let offset = Vec3::new(
                        window.pixels_to_meters(link.offset.x),
                        window.pixels_to_meters(link.offset.y),
                        self.config.child_z_offset,
                    );
                    (link.child, transform * Mat4::from_translation(offset))
                })
                .collect();

            for (child, child_transform) in placed {
                if let Some(window) = self.arena.get_mut(child) {
                    window.set_transform(child_transform);
                    pending.push(child);
                }
            }
        }
    }

    /// Let hoverable windows process their input, then step follow-head
    /// windows once
    pub fn poll_window_events(&mut self) {
        for id in &self.hoverable {
            if let Some(window) = self.arena.get_mut(*id) {
                window.poll_event();
            }
        }

        let head = self.head_pose;
        let mut moved = Vec::new();
        for container in &self.following {
            if let Some(window) = self.arena.get_mut(container.window()) {
                if container.step(&head, window) {
                    moved.push(container.window());
                }
            }
        }
        for id in moved {
            self.update_children(id);
        }
    }

    /// One scheduler tick: window polling, follow-head and transitions
    pub fn tick(&mut self) {
        self.poll_window_events();
        for id in self.transitions.step(&mut self.arena) {
            self.update_children(id);
        }
    }

    /// Run as many ticks as fit into the time elapsed since the last call
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let interval = self.config.poll_interval();
        if interval.is_zero() {
            warn!("poll interval is zero, not ticking");
            return 0;
        }

        self.pending_time += elapsed;
        let mut ticks = 0;
        while self.pending_time >= interval {
            self.pending_time -= interval;
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Tear the manager down
    ///
    /// Windows registered as destroyed-with-parent are dropped; the rest are
    /// handed back to the caller.
    pub fn shutdown(mut self) -> Vec<Box<dyn Window>> {
        let mut survivors = Vec::new();
        for id in self.arena.ids() {
            let owned = self.destroy_with_parent.contains(&id);
            if let Some(window) = self.arena.remove(id) {
                if !owned {
                    survivors.push(window);
                }
            }
        }
        info!(returned = survivors.len(), "window manager shut down");
        survivors
    }

    pub fn window(&self, id: WindowId) -> Option<&dyn Window> {
        self.arena.get(id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut (dyn Window + 'static)> {
        self.arena.get_mut(id)
    }

    pub fn window_count(&self) -> usize {
        self.arena.len()
    }

    /// All registered windows, in registration order
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.arena.ids()
    }

    pub fn hoverable_windows(&self) -> &[WindowId] {
        &self.hoverable
    }

    pub fn draggable_windows(&self) -> &[WindowId] {
        &self.draggable
    }

    pub fn managed_windows(&self) -> &[WindowId] {
        &self.managed
    }

    pub fn destroy_with_parent_windows(&self) -> &[WindowId] {
        &self.destroy_with_parent
    }

    pub fn follow_head_containers(&self) -> &[FollowHeadContainer] {
        &self.following
    }

    pub fn transitions(&self) -> &TransitionScheduler {
        &self.transitions
    }

    pub fn hover_state(&self, controller_index: usize) -> WmResult<&HoverState> {
        self.check_controller(controller_index)?;
        Ok(&self.hover[controller_index])
    }

    pub fn grab_state(&self, controller_index: usize) -> WmResult<&GrabState> {
        self.check_controller(controller_index)?;
        Ok(&self.grab[controller_index])
    }

    /// Whether any controller points at a window
    pub fn is_hovering(&self) -> bool {
        self.hover.iter().any(|state| state.window.is_some())
    }

    /// Whether any controller holds a window
    pub fn is_grabbing(&self) -> bool {
        self.grab.iter().any(|state| state.window.is_some())
    }

    pub fn is_hovered(&self, id: WindowId) -> bool {
        self.hover.iter().any(|state| state.window == Some(id))
    }

    pub fn is_grabbed(&self, id: WindowId) -> bool {
        self.grab.iter().any(|state| state.window == Some(id))
    }

    /// Deliver an event to the window's sink, then to subscribers
    pub(crate) fn emit(&mut self, id: WindowId, event: WindowEvent) {
        if let Some(window) = self.arena.get_mut(id) {
            window.handle_event(&event);
        }
        self.events.publish(ManagerEvent::Window { window: id, event });
    }

    pub(crate) fn publish(&mut self, event: ManagerEvent) {
        self.events.publish(event);
    }

    pub(crate) fn check_controller(&self, controller_index: usize) -> WmResult<()> {
        if controller_index < CONTROLLER_COUNT {
            Ok(())
        } else {
            warn!(controller_index, "controller index out of range");
            Err(WmError::InvalidController {
                index: controller_index,
                count: CONTROLLER_COUNT,
            })
        }
    }

    fn lookup(&self, id: WindowId) -> WmResult<&dyn Window> {
        self.arena.get(id).ok_or_else(|| {
            warn!(window = %id, "unknown window");
            WmError::WindowNotFound(id)
        })
    }

    fn lookup_mut(&mut self, id: WindowId) -> WmResult<&mut (dyn Window + 'static)> {
        self.arena.get_mut(id).ok_or_else(|| {
            warn!(window = %id, "unknown window");
            WmError::WindowNotFound(id)
        })
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(WmConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::PlaneWindow;

    fn quad(position: Vec3) -> PlaneWindow {
        PlaneWindow::from_pixels("quad", 300, 300, 300.0).with_position(position)
    }

    #[test]
    fn test_register_membership() {
        let mut manager = WindowManager::default();
        let app = manager.register(quad(Vec3::ZERO), WindowFlags::APPLICATION);
        let button = manager.register(quad(Vec3::X), WindowFlags::BUTTON);

        assert_eq!(manager.hoverable_windows(), &[app, button]);
        assert_eq!(manager.draggable_windows(), &[app]);
        assert_eq!(manager.managed_windows(), &[app]);
        assert_eq!(manager.destroy_with_parent_windows(), &[app, button]);
        assert_eq!(
            manager.reset_pose(button).unwrap().transform,
            Mat4::from_translation(Vec3::X)
        );
    }

    #[test]
    fn test_follow_head_distance_from_head_pose() {
        let mut manager = WindowManager::default();
        manager.update_head_pose(&Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));
        let id = manager.register(
            quad(Vec3::new(0.0, 1.0, -1.2)),
            WindowFlags::NONE.follow_head(),
        );

        let container = &manager.follow_head_containers()[0];
        assert_eq!(container.window(), id);
        assert!((container.distance() - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_controller() {
        let mut manager = WindowManager::default();
        let err = manager.update_pose(&Mat4::IDENTITY, 2).unwrap_err();
        assert!(matches!(err, WmError::InvalidController { index: 2, count: 2 }));
        assert!(manager.hover_state(5).is_err());
    }

    #[test]
    fn test_unknown_window_errors() {
        let mut manager = WindowManager::default();
        let id = manager.register(quad(Vec3::ZERO), WindowFlags::APPLICATION);
        manager.unregister(id);

        assert!(matches!(
            manager.save_reset_transform(id),
            Err(WmError::WindowNotFound(_))
        ));
        assert!(manager.unregister(id).is_none());
    }

    #[test]
    fn test_children_follow_parent() {
        let mut manager = WindowManager::default();
        let parent = manager.register(quad(Vec3::new(0.0, 0.0, -2.0)), WindowFlags::APPLICATION);
        let child = manager.register(quad(Vec3::ZERO), WindowFlags::BUTTON);
        // 150 px at 300 ppm is half a meter
        manager.add_child(parent, child, Vec2::new(150.0, 0.0)).unwrap();

        let expected = Vec3::new(0.5, 0.0, -2.0 + manager.config().child_z_offset);
        let position = math::translation(&manager.window(child).unwrap().transform());
        assert!(position.abs_diff_eq(expected, 1e-6));

        manager
            .set_window_transform(parent, Mat4::from_translation(Vec3::new(1.0, 1.0, -2.0)))
            .unwrap();
        let position = math::translation(&manager.window(child).unwrap().transform());
        assert!(position.abs_diff_eq(expected + Vec3::new(1.0, 1.0, 0.0), 1e-6));
        assert_eq!(manager.parent_of(child), Some(parent));
        assert_eq!(manager.children_of(parent), vec![child]);
    }

    #[test]
    fn test_child_cycle_terminates() {
        let mut manager = WindowManager::default();
        let a = manager.register(quad(Vec3::ZERO), WindowFlags::APPLICATION);
        let b = manager.register(quad(Vec3::X), WindowFlags::APPLICATION);
        manager.add_child(a, b, Vec2::ZERO).unwrap();
        manager.add_child(b, a, Vec2::ZERO).unwrap();
        manager
            .set_window_transform(a, Mat4::from_translation(Vec3::Y))
            .unwrap();
    }

    #[test]
    fn test_unregister_detaches_children() {
        let mut manager = WindowManager::default();
        let parent = manager.register(quad(Vec3::ZERO), WindowFlags::APPLICATION);
        let child = manager.register(quad(Vec3::X), WindowFlags::BUTTON);
        manager.add_child(parent, child, Vec2::ZERO).unwrap();

        manager.unregister(parent).unwrap();
        assert_eq!(manager.parent_of(child), None);
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let mut manager = WindowManager::default();
        assert_eq!(manager.advance(Duration::from_millis(50)), 2);
        assert_eq!(manager.advance(Duration::from_millis(10)), 1);
        assert_eq!(manager.advance(Duration::from_millis(19)), 0);
    }

    #[test]
    fn test_shutdown_returns_unowned_windows() {
        let mut manager = WindowManager::default();
        manager.register(quad(Vec3::ZERO), WindowFlags::APPLICATION);
        manager.register(
            PlaneWindow::from_pixels("external", 10, 10, 100.0),
            WindowFlags::NONE.hoverable(),
        );

        let survivors = manager.shutdown();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title(), "external");
    }
}
