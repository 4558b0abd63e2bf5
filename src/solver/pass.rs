//! Pass descriptors and the single runner that executes them.
//!
//! A pass is a kernel tag plus its buffer bindings. Writing to a ping-pong
//! pair always targets the back buffer and swaps afterwards.

use crate::error::{Result, SimError};
use crate::grid::FieldBuffers;
use super::boundary::EdgePolicy;
use super::core::{self, ForceImpulse};

/// Where a vector input is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorInput {
    /// Front of the velocity pair.
    Velocity,
    /// Front of the viscous estimate pair.
    ViscousEstimate,
}

/// Buffer a pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Velocity,
    ViscousEstimate,
    Pressure,
    Divergence,
}

impl Target {
    fn name(self) -> &'static str {
        match self {
            Target::Velocity => "velocity",
            Target::ViscousEstimate => "viscous",
            Target::Pressure => "pressure",
            Target::Divergence => "divergence",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    Advect { dt: f32, dissipation: f32 },
    Force(ForceImpulse),
    /// The right-hand side is always the front of the velocity pair.
    Viscous { estimate: VectorInput, alpha: f32, beta: f32 },
    Divergence,
    /// Reads the front of the pressure pair, which still holds the previous
    /// frame's solution on the first round.
    Poisson,
    Project,
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Advect { .. } => "advect",
            Kernel::Force(_) => "force",
            Kernel::Viscous { .. } => "viscous",
            Kernel::Divergence => "divergence",
            Kernel::Poisson => "poisson",
            Kernel::Project => "project",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pass {
    pub kernel: Kernel,
    pub target: Target,
}

impl Pass {
    pub const fn new(kernel: Kernel, target: Target) -> Self {
        Self { kernel, target }
    }
}

/// Execute one pass against the buffers.
pub fn run(pass: &Pass, buffers: &mut FieldBuffers, edges: EdgePolicy) -> Result<()> {
    let FieldBuffers { velocity, viscous, pressure, divergence, .. } = buffers;

    match (pass.kernel, pass.target) {
        (Kernel::Advect { dt, dissipation }, Target::Velocity) => {
            let (front, back) = velocity.read_write();
            core::advect(front, front, back, dt, dissipation, edges);
            velocity.swap();
        }
        (Kernel::Force(impulse), Target::Velocity) => {
            let (front, back) = velocity.read_write();
            core::apply_force(front, back, &impulse);
            velocity.swap();
        }
        (Kernel::Viscous { estimate, alpha, beta }, Target::Velocity) => {
            let (rhs, out) = velocity.read_write();
            let estimate = match estimate {
                VectorInput::Velocity => &*rhs,
                VectorInput::ViscousEstimate => viscous.front(),
            };
            core::viscous_step(estimate, rhs, out, alpha, beta, edges);
            velocity.swap();
        }
        (Kernel::Viscous { estimate, alpha, beta }, Target::ViscousEstimate) => {
            let rhs = velocity.front();
            match estimate {
                VectorInput::Velocity => {
                    core::viscous_step(rhs, rhs, viscous.back_mut(), alpha, beta, edges);
                }
                VectorInput::ViscousEstimate => {
                    let (prev, out) = viscous.read_write();
                    core::viscous_step(prev, rhs, out, alpha, beta, edges);
                }
            }
            viscous.swap();
        }
        (Kernel::Divergence, Target::Divergence) => {
            core::divergence(velocity.front(), divergence, edges);
        }
        (Kernel::Poisson, Target::Pressure) => {
            let (prev, out) = pressure.read_write();
            core::poisson_step(prev, divergence, out, edges);
            pressure.swap();
        }
        (Kernel::Project, Target::Velocity) => {
            let (front, back) = velocity.read_write();
            core::subtract_gradient(pressure.front(), front, back, edges);
            velocity.swap();
        }
        (kernel, target) => {
            return Err(SimError::Binding { kernel: kernel.name(), target: target.name() });
        }
    }
    Ok(())
}

/// Rebuild `plan` with the passes of one frame, in execution order.
pub fn build_frame(
    plan: &mut Vec<Pass>,
    params: &super::SimulationParams,
    impulse: Option<ForceImpulse>,
) {
    plan.clear();
    plan.push(Pass::new(
        Kernel::Advect { dt: params.dt, dissipation: params.dissipation },
        Target::Velocity,
    ));

    if let Some(impulse) = impulse {
        plan.push(Pass::new(Kernel::Force(impulse), Target::Velocity));
    }

    if params.runs_viscous() {
        let (alpha, beta) = params.viscous_coefficients();
        let n = params.viscous_iterations;
        for k in 0..n {
            let estimate = if k == 0 { VectorInput::Velocity } else { VectorInput::ViscousEstimate };
            let target = if k + 1 == n { Target::Velocity } else { Target::ViscousEstimate };
            plan.push(Pass::new(Kernel::Viscous { estimate, alpha, beta }, target));
        }
    }

    plan.push(Pass::new(Kernel::Divergence, Target::Divergence));

    for _ in 0..params.pressure_iterations {
        plan.push(Pass::new(Kernel::Poisson, Target::Pressure));
    }

    plan.push(Pass::new(Kernel::Project, Target::Velocity));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::solver::SimulationParams;

    fn buffers() -> FieldBuffers {
        FieldBuffers::allocate(Grid { width: 16, height: 12 }).unwrap()
    }

    fn kinds(plan: &[Pass]) -> Vec<&'static str> {
        plan.iter().map(|p| p.kernel.name()).collect()
    }

    #[test]
    fn test_frame_order_without_force_or_viscosity() {
        let params = SimulationParams { pressure_iterations: 2, ..Default::default() };
        let mut plan = Vec::new();
        build_frame(&mut plan, &params, None);
        assert_eq!(kinds(&plan), ["advect", "divergence", "poisson", "poisson", "project"]);
        assert!(plan[2..4].iter().all(|p| p.target == Target::Pressure));
    }

    #[test]
    fn test_frame_order_full() {
        let params = SimulationParams {
            viscosity_enabled: true,
            viscous_iterations: 3,
            pressure_iterations: 1,
            ..Default::default()
        };
        let impulse = ForceImpulse { force: [1.0, 0.0], center: [8.0, 6.0], radius: 2.0 };
        let mut plan = Vec::new();
        build_frame(&mut plan, &params, Some(impulse));
        assert_eq!(
            kinds(&plan),
            ["advect", "force", "viscous", "viscous", "viscous", "divergence", "poisson", "project"]
        );
        let targets: Vec<Target> = plan[2..5].iter().map(|p| p.target).collect();
        assert_eq!(targets, [Target::ViscousEstimate, Target::ViscousEstimate, Target::Velocity]);
        assert!(matches!(plan[2].kernel, Kernel::Viscous { estimate: VectorInput::Velocity, .. }));
        assert!(matches!(plan[4].kernel, Kernel::Viscous { estimate: VectorInput::ViscousEstimate, .. }));
    }

    #[test]
    fn test_single_viscous_iteration_writes_velocity() {
        let params = SimulationParams {
            viscosity_enabled: true,
            viscous_iterations: 1,
            pressure_iterations: 0,
            ..Default::default()
        };
        let mut plan = Vec::new();
        build_frame(&mut plan, &params, None);
        assert_eq!(kinds(&plan), ["advect", "viscous", "divergence", "project"]);
        assert_eq!(plan[1].target, Target::Velocity);
    }

    #[test]
    fn test_runner_rejects_mismatched_binding() {
        let mut b = buffers();
        let pass = Pass::new(Kernel::Divergence, Target::Velocity);
        let err = run(&pass, &mut b, EdgePolicy::Clamp).unwrap_err();
        assert_eq!(err, SimError::Binding { kernel: "divergence", target: "velocity" });
    }

    #[test]
    fn test_velocity_passes_swap_front() {
        let mut b = buffers();
        let before = b.velocity.front_index();
        run(
            &Pass::new(Kernel::Advect { dt: 0.1, dissipation: 1.0 }, Target::Velocity),
            &mut b,
            EdgePolicy::Clamp,
        )
        .unwrap();
        assert_ne!(b.velocity.front_index(), before);
    }

    #[test]
    fn test_poisson_starts_from_previous_pressure() {
        let mut b = buffers();
        b.pressure.front_mut().data.fill(3.0);

        // Zero divergence: a constant estimate is already a solution.
        run(&Pass::new(Kernel::Poisson, Target::Pressure), &mut b, EdgePolicy::Clamp).unwrap();

        assert!(b.pressure.front().data.iter().all(|p| *p == 3.0), "previous pressure was discarded");
    }

    #[test]
    fn test_advect_pass_uses_edge_policy() {
        let mut b = buffers();
        b.velocity.front_mut().data.fill([20.0, 0.0]);
        let pass = Pass::new(Kernel::Advect { dt: 0.1, dissipation: 1.0 }, Target::Velocity);
        run(&pass, &mut b, EdgePolicy::Reflect).unwrap();
        assert_eq!(b.velocity.front().get(0, 6), [-20.0, 0.0]);
        assert_eq!(b.velocity.front().get(8, 6), [20.0, 0.0]);
    }

    #[test]
    fn test_divergence_pass_does_not_swap() {
        let mut b = buffers();
        let before = b.velocity.front_index();
        run(&Pass::new(Kernel::Divergence, Target::Divergence), &mut b, EdgePolicy::Clamp).unwrap();
        assert_eq!(b.velocity.front_index(), before);
    }

    #[test]
    fn test_viscous_chain_keeps_rhs_intact() {
        let mut b = buffers();
        b.velocity.front_mut().set(8, 6, [10.0, 0.0]);
        let rhs_before = b.velocity.front().clone();

        let (alpha, beta) = (0.5, 4.5);
        let first = Pass::new(
            Kernel::Viscous { estimate: VectorInput::Velocity, alpha, beta },
            Target::ViscousEstimate,
        );
        let middle = Pass::new(
            Kernel::Viscous { estimate: VectorInput::ViscousEstimate, alpha, beta },
            Target::ViscousEstimate,
        );
        run(&first, &mut b, EdgePolicy::Clamp).unwrap();
        run(&middle, &mut b, EdgePolicy::Clamp).unwrap();
        assert_eq!(b.velocity.front(), &rhs_before, "rhs must not change mid-solve");

        let last = Pass::new(
            Kernel::Viscous { estimate: VectorInput::ViscousEstimate, alpha, beta },
            Target::Velocity,
        );
        run(&last, &mut b, EdgePolicy::Clamp).unwrap();
        let center = b.velocity.front().get(8, 6)[0];
        assert!(center > 0.0 && center < 10.0, "diffused center = {center}");
        assert!(b.velocity.front().get(9, 6)[0] > 0.0);
    }
}
