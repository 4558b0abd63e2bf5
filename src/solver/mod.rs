mod boundary;
mod core;
pub mod diagnostics;
mod params;
pub mod pass;

// Re-export public API
pub use boundary::EdgePolicy;
pub use self::core::{advect, apply_force, divergence, poisson_step, subtract_gradient, viscous_step, ForceImpulse};
pub use params::SimulationParams;

use crate::error::Result;
use crate::grid::{Field, FieldBuffers, Grid, Vec2, Viewport};
use crate::input::PointerState;
use pass::Pass;

/// Incompressible 2-D flow on a collocated grid, advanced one frame at a time.
pub struct Simulation {
    params: SimulationParams,
    edges: EdgePolicy,
    buffers: FieldBuffers,
    plan: Vec<Pass>,
    frames: u64,
}

impl Simulation {
    pub fn new(params: SimulationParams, viewport: Viewport) -> Result<Self> {
        params.validate()?;
        let grid = Grid::from_viewport(viewport, params.resolution)?;
        let buffers = FieldBuffers::allocate(grid)?;
        log::debug!("allocated {}x{} simulation grid", grid.width, grid.height);
        Ok(Self {
            edges: EdgePolicy::from_reflection(params.boundary_reflection),
            params,
            buffers,
            plan: Vec::new(),
            frames: 0,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn grid(&self) -> Grid {
        self.buffers.grid
    }

    pub fn edges(&self) -> EdgePolicy {
        self.edges
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Reallocate every buffer for a new viewport. Field contents are reset,
    /// not resampled. On error the current grid and buffers stay active.
    pub fn resize(&mut self, viewport: Viewport) -> Result<Grid> {
        let grid = Grid::from_viewport(viewport, self.params.resolution)?;
        self.buffers = FieldBuffers::allocate(grid)?;
        Ok(grid)
    }

    pub fn velocity(&self) -> &Field<Vec2> {
        self.buffers.velocity.front()
    }

    /// Direct access to the current velocity, e.g. to seed a test flow.
    pub fn velocity_mut(&mut self) -> &mut Field<Vec2> {
        self.buffers.velocity.front_mut()
    }

    pub fn pressure(&self) -> &Field<f32> {
        self.buffers.pressure.front()
    }

    pub fn divergence(&self) -> &Field<f32> {
        &self.buffers.divergence
    }

    /// Turn pointer state into a force splat, or `None` while the pointer is
    /// inactive.
    pub fn impulse_for(&self, pointer: &PointerState) -> Option<ForceImpulse> {
        if !pointer.active {
            return None;
        }
        let grid = self.grid();
        let (w, h) = (grid.width as f32, grid.height as f32);
        let scale = self.params.force_scale;
        let radius = self.params.cursor_radius;

        // Keep the splat at least one radius (plus two cells) away from walls.
        let clamp_axis = |coord: f32, cells: f32| -> f32 {
            let margin = (radius + 2.0) * 2.0 / cells;
            let (lo, hi) = (-1.0 + margin, 1.0 - margin);
            if lo > hi { 0.0 } else { coord.clamp(lo, hi) }
        };
        let cx = clamp_axis(pointer.coords[0], w);
        let cy = clamp_axis(pointer.coords[1], h);

        Some(ForceImpulse {
            force: [pointer.diff[0] / 2.0 * scale, pointer.diff[1] / 2.0 * scale],
            center: [(cx + 1.0) * 0.5 * w, (cy + 1.0) * 0.5 * h],
            radius,
        })
    }

    /// Advance one frame: advect, force, diffuse, divergence, pressure,
    /// projection.
    pub fn step(&mut self, pointer: &PointerState) -> Result<()> {
        let impulse = self.impulse_for(pointer);
        self.step_with(impulse)
    }

    pub fn step_with(&mut self, impulse: Option<ForceImpulse>) -> Result<()> {
        let mut plan = std::mem::take(&mut self.plan);
        pass::build_frame(&mut plan, &self.params, impulse);
        let result = plan.iter().try_for_each(|p| pass::run(p, &mut self.buffers, self.edges));
        self.plan = plan;
        result?;
        self.frames += 1;
        Ok(())
    }

    pub fn stats(&self) -> diagnostics::FrameStats {
        let velocity = self.velocity();
        diagnostics::FrameStats {
            frame: self.frames,
            mean_abs_divergence: diagnostics::mean_abs_divergence(velocity, self.edges),
            kinetic_energy: diagnostics::kinetic_energy(velocity),
            max_speed: diagnostics::max_speed(velocity),
        }
    }

    /// Run a single pass outside the frame sequence.
    pub fn run_pass(&mut self, pass: &Pass) -> Result<()> {
        pass::run(pass, &mut self.buffers, self.edges)
    }
}
