//! Interaction events
//!
//! Every event is delivered to the affected window's
//! [`Window::handle_event`](crate::window::Window::handle_event) sink and then
//! broadcast to subscribers as a [`ManagerEvent`] over an unbounded
//! `crossbeam` channel.

use crate::window::WindowId;
use crossbeam::channel::{self, Receiver, Sender};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Payload of a per-tick hover event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverEvent {
    pub controller_index: usize,
    /// Distance from the controller to the intersection point
    pub distance: f32,
    /// Intersection point in world space
    pub point: Vec3,
    /// Controller pose that produced the hit
    pub pose: Mat4,
}

/// Payload of a per-tick drag event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrabEvent {
    pub controller_index: usize,
    /// Pose of the grab point, before the offset to the window center
    pub pose: Mat4,
}

/// A controller ray that hit no hoverable window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoHoverEvent {
    pub controller_index: usize,
    pub pose: Mat4,
}

/// Events addressed to a single window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowEvent {
    HoverStart { controller_index: usize },
    Hover(HoverEvent),
    HoverEnd { controller_index: usize },
    GrabStart { controller_index: usize },
    Grab(GrabEvent),
    Release { controller_index: usize },
}

impl WindowEvent {
    /// Controller that caused the event
    pub fn controller_index(&self) -> usize {
        match self {
            WindowEvent::HoverStart { controller_index }
            | WindowEvent::HoverEnd { controller_index }
            | WindowEvent::GrabStart { controller_index }
            | WindowEvent::Release { controller_index } => *controller_index,
            WindowEvent::Hover(hover) => hover.controller_index,
            WindowEvent::Grab(grab) => grab.controller_index,
        }
    }
}

/// Events broadcast by the window manager
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ManagerEvent {
    Window { window: WindowId, event: WindowEvent },
    NoHover(NoHoverEvent),
}

impl ManagerEvent {
    /// Window the event refers to, if any
    pub fn window(&self) -> Option<WindowId> {
        match self {
            ManagerEvent::Window { window, .. } => Some(*window),
            ManagerEvent::NoHover(_) => None,
        }
    }
}

/// Receiving end of a subscription
pub type EventReceiver = Receiver<ManagerEvent>;

/// Fan-out of manager events to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<ManagerEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription
    ///
    /// The receiver only sees events published after this call. Dropping it
    /// unsubscribes.
    pub fn subscribe(&mut self) -> EventReceiver {
        let (sender, receiver) = channel::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Send an event to every live subscriber, pruning closed ones
    pub fn publish(&mut self, event: ManagerEvent) {
        self.subscribers
            .retain(|sender| sender.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
