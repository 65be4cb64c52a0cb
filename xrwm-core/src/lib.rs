//! xrwm core: a spatial window manager for XR
//!
//! Flat windows float in 3D space and are manipulated with tracked
//! controllers:
//!
//! - pointing at a window hovers it
//! - pressing the trigger grabs it, and moving the controller drags it while
//!   the grabbed point stays on the controller ray
//! - the thumbstick scales the grabbed window and pushes it along the ray
//! - managed windows can be animated back to their registration pose or
//!   spread over a sphere around the user
//!
//! The crate renders nothing. Hosts feed poses in, call
//! [`WindowManager::tick`] on their poll cadence and consume
//! [`ManagerEvent`]s from [`WindowManager::subscribe`].
//!
//! ```
//! use glam::{Mat4, Vec3};
//! use xrwm_core::{PlaneWindow, WindowFlags, WindowManager, WmConfig};
//!
//! let mut manager = WindowManager::new(WmConfig::default());
//! let window = PlaneWindow::from_pixels("terminal", 600, 300, 300.0)
//!     .with_position(Vec3::new(0.0, 0.0, -2.0));
//! let id = manager.register(window, WindowFlags::APPLICATION);
//!
//! manager.update_pose(&Mat4::IDENTITY, 0).unwrap();
//! assert_eq!(manager.hover_state(0).unwrap().window, Some(id));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod follow_head;
pub mod layout;
pub mod manager;
pub mod math;
pub mod transition;
pub mod window;

pub use config::{load_config, save_config, WmConfig, MIN_TRANSITION_STEP};
pub use error::{WmError, WmResult};
pub use events::{
    EventBus, EventReceiver, GrabEvent, HoverEvent, ManagerEvent, NoHoverEvent, WindowEvent,
};
pub use follow_head::FollowHeadContainer;
pub use layout::{grid_dimensions, sphere_poses};
pub use manager::{
    AnalogEvent, DigitalEvent, GrabState, HoverState, ResetPose, WindowManager, CONTROLLER_COUNT,
    MINIMAL_GRAB_DISTANCE,
};
pub use transition::{steps_to_converge, TransitionJob, TransitionScheduler};
pub use window::{PlaneWindow, Window, WindowArena, WindowFlags, WindowId};
