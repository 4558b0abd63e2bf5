use serde::Deserialize;

use crate::error::{Result, SimError};

/// Solver parameters. Fixed for the lifetime of a simulation; changing any of
/// them means building a new `Simulation`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationParams {
    /// Multiplier from pointer displacement to injected velocity.
    pub force_scale: f32,
    /// Radius of the force splat, in grid cells.
    pub cursor_radius: f32,
    pub viscosity_enabled: bool,
    pub viscosity: f32,
    pub viscous_iterations: usize,
    pub pressure_iterations: usize,
    pub dt: f32,
    /// Grid cells per viewport pixel, in (0, 1].
    pub resolution: f32,
    /// Reflect the wall-normal velocity component at domain edges.
    pub boundary_reflection: bool,
    /// Advection multiplier; 1.0 is lossless.
    pub dissipation: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            force_scale: 20.0,
            cursor_radius: 100.0,
            viscosity_enabled: false,
            viscosity: 30.0,
            viscous_iterations: 32,
            pressure_iterations: 32,
            dt: 0.014,
            resolution: 0.5,
            boundary_reflection: false,
            dissipation: 1.0,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::invalid("dt", format!("{} must be positive", self.dt)));
        }
        if !(self.resolution > 0.0 && self.resolution <= 1.0) {
            return Err(SimError::invalid(
                "resolution",
                format!("{} is outside (0, 1]", self.resolution),
            ));
        }
        if !(self.cursor_radius.is_finite() && self.cursor_radius > 0.0) {
            return Err(SimError::invalid(
                "cursor_radius",
                format!("{} must be positive", self.cursor_radius),
            ));
        }
        if !(self.force_scale.is_finite() && self.force_scale >= 0.0) {
            return Err(SimError::invalid(
                "force_scale",
                format!("{} must be non-negative", self.force_scale),
            ));
        }
        if self.viscosity_enabled && !(self.viscosity.is_finite() && self.viscosity > 0.0) {
            return Err(SimError::invalid(
                "viscosity",
                format!("{} must be positive when viscosity is enabled", self.viscosity),
            ));
        }
        if !(0.0..=1.0).contains(&self.dissipation) {
            return Err(SimError::invalid(
                "dissipation",
                format!("{} is outside [0, 1]", self.dissipation),
            ));
        }
        Ok(())
    }

    /// Jacobi coefficients of the implicit diffusion solve: `(alpha, beta)`.
    pub fn viscous_coefficients(&self) -> (f32, f32) {
        let alpha = 1.0 / (self.dt * self.viscosity);
        (alpha, 4.0 + alpha)
    }

    pub(crate) fn runs_viscous(&self) -> bool {
        self.viscosity_enabled && self.viscous_iterations > 0
    }
}
