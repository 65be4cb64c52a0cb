//! Headless replay of the demo scene
//!
//! Builds a grid of windows with one child and one head-tracked window, then
//! plays scripted controller input on the poll cadence: hover, grab, drag,
//! scale, push, release, followed by the sphere and reset layouts.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec2, Vec3};
use serde::Serialize;
use tracing::info;
use xrwm_core::math::translation;
use xrwm_core::{
    AnalogEvent, DigitalEvent, EventReceiver, ManagerEvent, PlaneWindow, Window, WindowEvent,
    WindowFlags, WindowId, WindowManager, WmConfig,
};

/// Pixels per meter of every demo window
const PPM: f32 = 300.0;

/// Depth of the window grid
const GRID_DEPTH: f32 = -3.0;

/// Upper bound on ticks spent waiting for a layout to settle
const MAX_SETTLE_TICKS: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct SceneOptions {
    pub columns: usize,
    pub rows: usize,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self { columns: 6, rows: 5 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowReport {
    pub id: WindowId,
    pub title: String,
    pub position: [f32; 3],
    pub scale: f32,
}

/// Events observed during one phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub hover_start: usize,
    pub hover: usize,
    pub hover_end: usize,
    pub grab_start: usize,
    pub grab: usize,
    pub release: usize,
    pub no_hover: usize,
}

impl EventCounts {
    fn record(&mut self, event: &ManagerEvent) {
        match event {
            ManagerEvent::NoHover(_) => self.no_hover += 1,
            ManagerEvent::Window { event, .. } => match event {
                WindowEvent::HoverStart { .. } => self.hover_start += 1,
                WindowEvent::Hover(_) => self.hover += 1,
                WindowEvent::HoverEnd { .. } => self.hover_end += 1,
                WindowEvent::GrabStart { .. } => self.grab_start += 1,
                WindowEvent::Grab(_) => self.grab += 1,
                WindowEvent::Release { .. } => self.release += 1,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: String,
    pub ticks: u32,
    pub events: EventCounts,
    pub windows: Vec<WindowReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub phases: Vec<PhaseReport>,
}

/// The demo scene wired to a manager
pub struct Scene {
    pub manager: WindowManager,
    pub grid: Vec<WindowId>,
    events: EventReceiver,
}

/// Register the demo windows
pub fn build_scene(config: WmConfig, options: SceneOptions) -> Result<Scene> {
    let mut manager = WindowManager::new(config);
    let events = manager.subscribe();
    manager.update_head_pose(&Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)));

    let mut grid = Vec::with_capacity(options.columns * options.rows);
    let mut y = 0.0;
    for row in 0..options.rows {
        let mut x = 0.0;
        let mut row_height: f32 = 0.0;
        for column in 0..options.columns {
            let window = PlaneWindow::from_pixels(format!("window {}.{}", row, column), 300, 200, PPM);
            x += window.width_meters();
            row_height = row_height.max(window.height_meters());
            let window = window.with_position(Vec3::new(x, y, GRID_DEPTH));
            grid.push(manager.register(window, WindowFlags::APPLICATION));
        }
        y += row_height;
    }

    if let Some(&parent) = grid.first() {
        let child = manager.register(
            PlaneWindow::from_pixels("child", 80, 80, PPM),
            WindowFlags::BUTTON,
        );
        manager
            .add_child(parent, child, Vec2::new(25.0, 25.0))
            .context("attaching child window")?;
    }

    manager.register(
        PlaneWindow::from_pixels("head tracked", 300, 200, PPM)
            .with_position(Vec3::new(0.0, 1.0, -1.2)),
        WindowFlags::NONE
            .hoverable()
            .destroy_with_parent()
            .follow_head(),
    );

    info!(
        windows = manager.window_count(),
        managed = manager.managed_windows().len(),
        "demo scene ready"
    );

    Ok(Scene {
        manager,
        grid,
        events,
    })
}

impl Scene {
    /// Feed one controller pose and run one tick
    fn step(&mut self, pose: &Mat4) -> Result<()> {
        self.manager.update_pose(pose, 0)?;
        let interval = self.manager.config().poll_interval();
        self.manager.advance(interval);
        Ok(())
    }

    /// Tick until every transition has finished
    fn settle(&mut self) -> Result<u32> {
        let mut ticks = 0;
        while !self.manager.transitions().is_idle() {
            self.manager.tick();
            ticks += 1;
            if ticks > MAX_SETTLE_TICKS {
                bail!("layout did not settle after {} ticks", MAX_SETTLE_TICKS);
            }
        }
        Ok(ticks)
    }

    /// Count and discard everything emitted since the last report
    fn drain_events(&self) -> EventCounts {
        let mut counts = EventCounts::default();
        for event in self.events.try_iter() {
            counts.record(&event);
        }
        counts
    }

    fn report(&self, phase: &str, ticks: u32) -> PhaseReport {
        let windows = self
            .manager
            .window_ids()
            .into_iter()
            .filter_map(|id| {
                let window = self.manager.window(id)?;
                Some(WindowReport {
                    id,
                    title: window.title().to_string(),
                    position: translation(&window.transform()).to_array(),
                    scale: window.scale(),
                })
            })
            .collect();

        PhaseReport {
            phase: phase.to_string(),
            ticks,
            events: self.drain_events(),
            windows,
        }
    }

    /// Point at the first grid window, then grab it, drag it, scale it,
    /// push it away and let go
    fn interact(&mut self) -> Result<PhaseReport> {
        let Some(&target) = self.grid.first() else {
            return Ok(self.report("interact", 0));
        };
        let center = self
            .manager
            .window(target)
            .map(|window| translation(&window.transform()))
            .context("demo window disappeared")?;
        // Aim at the lower left part, clear of the child window
        let aim = Vec3::new(center.x - 0.3, center.y - 0.2, 0.0);
        let dt = self.manager.config().poll_interval();
        let mut ticks = 0;

        for _ in 0..5 {
            self.step(&Mat4::from_translation(aim))?;
            ticks += 1;
        }

        self.manager.handle_grab_action(0, DigitalEvent::pressed())?;
        for i in 0..50 {
            let t = i as f32 / 50.0;
            let pose = Mat4::from_rotation_translation(
                Quat::from_rotation_y(0.4 * t),
                aim + Vec3::new(0.0, 0.5 * t, 0.0),
            );
            self.step(&pose)?;
            ticks += 1;
        }

        let held = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.4),
            aim + Vec3::new(0.0, 0.5, 0.0),
        );
        for _ in 0..20 {
            self.manager
                .handle_push_pull_scale_action(0, AnalogEvent { x: 0.5, y: 0.0 }, dt)?;
            self.step(&held)?;
            ticks += 1;
        }
        for _ in 0..10 {
            self.manager
                .handle_push_pull_scale_action(0, AnalogEvent { x: 0.0, y: 0.3 }, dt)?;
            self.step(&held)?;
            ticks += 1;
        }

        self.manager.handle_grab_action(0, DigitalEvent::released())?;
        Ok(self.report("interact", ticks))
    }

    fn arrange_sphere(&mut self) -> Result<PhaseReport> {
        self.manager
            .arrange_sphere()
            .context("arranging windows on the sphere")?;
        let ticks = self.settle()?;
        Ok(self.report("sphere", ticks))
    }

    fn arrange_reset(&mut self) -> Result<PhaseReport> {
        let scheduled = self.manager.arrange_reset();
        info!(scheduled, "resetting window layout");
        let ticks = self.settle()?;
        Ok(self.report("reset", ticks))
    }
}

/// Run the full scripted session
pub fn run(config: WmConfig, options: SceneOptions) -> Result<SimulationReport> {
    let mut scene = build_scene(config, options)?;
    let mut phases = vec![scene.report("initial", 0)];
    phases.push(scene.interact()?);
    phases.push(scene.arrange_sphere()?);
    phases.push(scene.arrange_reset()?);

    let returned = scene.manager.shutdown();
    info!(returned = returned.len(), "simulation finished");
    Ok(SimulationReport { phases })
}

/// Print a report as aligned text
pub fn print_report(report: &SimulationReport) {
    for phase in &report.phases {
        println!("== {} ({} ticks) ==", phase.phase, phase.ticks);
        let e = &phase.events;
        println!(
            "events: hover-start {} hover {} hover-end {} grab-start {} grab {} release {} no-hover {}",
            e.hover_start, e.hover, e.hover_end, e.grab_start, e.grab, e.release, e.no_hover
        );
        for window in &phase.windows {
            let [x, y, z] = window.position;
            println!(
                "  {:<10} {:<14} ({:>7.3}, {:>7.3}, {:>7.3}) scale {:.3}",
                window.id.to_string(),
                window.title,
                x,
                y,
                z,
                window.scale
            );
        }
    }
}
