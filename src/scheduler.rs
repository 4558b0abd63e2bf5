use std::sync::mpsc;
use std::time::Duration;

use crate::config::Config;
use crate::driver::AutoDriver;
use crate::error::{Result, SimError};
use crate::grid::{Grid, Viewport};
use crate::host::{HostEnvironment, HostEvent, Visibility};
use crate::input::{Pointer, PointerState};
use crate::renderer::{Compositor, Palette};
use crate::solver::Simulation;

/// Frames between debug-level flow statistics.
const STATS_INTERVAL: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Paused: events were drained but no frame was produced.
    Skipped,
}

/// Everything released by `dispose`.
struct Engine {
    sim: Simulation,
    pointer: Pointer,
    driver: AutoDriver,
    compositor: Compositor,
}

/// Owns the simulation and runs one frame per `tick`. Host events queue up
/// on a channel and are applied only between frames.
pub struct Scheduler<H: HostEnvironment> {
    host: H,
    events: mpsc::Receiver<HostEvent>,
    engine: Option<Engine>,
    running: bool,
    paused_by_visibility: bool,
    last_tick: Option<Duration>,
}

impl<H: HostEnvironment> Scheduler<H> {
    /// Build every buffer for the host's current viewport. Fails without
    /// subscribing to the host if the configuration or allocation is bad.
    pub fn new(config: &Config, mut host: H) -> Result<Self> {
        config.validate()?;
        let viewport = host.viewport();
        let palette = Palette::from_colors(&config.palette)?;
        let sim = Simulation::new(config.simulation.clone(), viewport)?;
        let pointer = Pointer::new(viewport, Duration::from_millis(config.pointer.idle_timeout_ms));
        let driver = AutoDriver::new(config.auto.clone());
        let compositor = Compositor::new(palette, viewport)?;

        let (tx, rx) = mpsc::channel();
        host.subscribe(tx);

        let grid = sim.grid();
        log::info!(
            "scheduler ready: viewport {}x{}, grid {}x{}",
            viewport.width,
            viewport.height,
            grid.width,
            grid.height
        );
        Ok(Self {
            host,
            events: rx,
            engine: Some(Engine { sim, pointer, driver, compositor }),
            running: false,
            paused_by_visibility: false,
            last_tick: None,
        })
    }

    pub fn start(&mut self) -> Result<()> {
        if self.engine.is_none() {
            return Err(SimError::Disposed);
        }
        if !self.running {
            log::info!("scheduler started");
        }
        self.running = true;
        self.paused_by_visibility = false;
        self.last_tick = None;
        Ok(())
    }

    /// Stop producing frames. Field contents are kept for the next `start`.
    pub fn pause(&mut self) {
        if self.running {
            log::info!("scheduler paused");
        }
        self.running = false;
        self.paused_by_visibility = false;
    }

    /// Rebuild the grid for a new viewport. On error nothing changes.
    pub fn resize(&mut self, viewport: Viewport) -> Result<Grid> {
        let engine = self.engine.as_mut().ok_or(SimError::Disposed)?;
        let previous = engine.compositor.viewport();
        engine.compositor.resize(viewport)?;
        let grid = match engine.sim.resize(viewport) {
            Ok(grid) => grid,
            Err(e) => {
                if let Err(undo) = engine.compositor.resize(previous) {
                    log::error!("could not restore the {}x{} image: {undo}", previous.width, previous.height);
                }
                return Err(e);
            }
        };
        engine.pointer.set_viewport(viewport);
        log::info!(
            "resized to {}x{}, grid {}x{}",
            viewport.width,
            viewport.height,
            grid.width,
            grid.height
        );
        Ok(grid)
    }

    /// Release every buffer and detach from the host. Not reversible.
    pub fn dispose(&mut self) {
        if self.engine.take().is_some() {
            self.host.unsubscribe();
            self.running = false;
            self.paused_by_visibility = false;
            log::info!("scheduler disposed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_disposed(&self) -> bool {
        self.engine.is_none()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.engine.as_ref().map(|e| &e.sim)
    }

    pub fn driver(&self) -> Option<&AutoDriver> {
        self.engine.as_ref().map(|e| &e.driver)
    }

    pub fn pointer(&self) -> Option<&PointerState> {
        self.engine.as_ref().map(|e| e.pointer.state())
    }

    pub fn set_auto_enabled(&mut self, enabled: bool) {
        if let Some(engine) = self.engine.as_mut() {
            engine.driver.set_enabled(enabled);
        }
    }

    /// One frame boundary at time `now`: apply queued host events, then, if
    /// running, advance the driver, pointer and solver and present a frame.
    pub fn tick(&mut self, now: Duration) -> Result<FrameOutcome> {
        if self.engine.is_none() {
            return Err(SimError::Disposed);
        }
        let pending: Vec<HostEvent> = self.events.try_iter().collect();
        for event in pending {
            self.apply(event, now);
        }
        if !self.running {
            return Ok(FrameOutcome::Skipped);
        }

        let elapsed = self.last_tick.map_or(Duration::ZERO, |t| now.saturating_sub(t));
        self.last_tick = Some(now);

        let Self { host, engine, .. } = self;
        let engine = engine.as_mut().ok_or(SimError::Disposed)?;
        engine.driver.update(now, elapsed, &mut engine.pointer);
        engine.pointer.update(now);
        engine.sim.step(engine.pointer.state())?;
        let frame = engine.compositor.compose(engine.sim.velocity());
        host.present(&frame)?;

        if engine.sim.frames() % STATS_INTERVAL == 0 {
            log::debug!("{}", engine.sim.stats());
        }
        Ok(FrameOutcome::Rendered)
    }

    fn apply(&mut self, event: HostEvent, now: Duration) {
        match event {
            HostEvent::Resized(viewport) => {
                if viewport.is_degenerate() {
                    log::warn!(
                        "ignoring resize to {}x{}; keeping current grid",
                        viewport.width,
                        viewport.height
                    );
                } else if let Err(e) = self.resize(viewport) {
                    log::warn!("resize failed: {e}; keeping current grid");
                }
            }
            HostEvent::Visibility(Visibility::Hidden) => {
                if self.running {
                    log::info!("surface hidden, pausing");
                    self.running = false;
                    self.paused_by_visibility = true;
                }
            }
            HostEvent::Visibility(Visibility::Visible) => {
                if self.paused_by_visibility {
                    log::info!("surface visible, resuming");
                    self.running = true;
                    self.paused_by_visibility = false;
                    self.last_tick = None;
                }
            }
            HostEvent::Pointer(pointer_event) => {
                if let Some(engine) = self.engine.as_mut() {
                    if engine.pointer.handle(pointer_event, now) {
                        engine.driver.force_stop();
                    }
                }
            }
        }
    }
}
