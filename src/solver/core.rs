//! Numerical kernels. Each one reads its inputs and writes a distinct output
//! buffer; none of them touches a buffer it also reads.

use crate::grid::{idx, Field, Texel, Vec2};
use super::boundary::EdgePolicy;

/// `exp(-FALLOFF)` is the raw Gaussian weight at the cursor radius.
const FALLOFF: f32 = 4.0;

/// Localized velocity impulse, in grid-cell units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceImpulse {
    /// Velocity added at the center, in cells per unit time.
    pub force: Vec2,
    /// Center in continuous cell coordinates (cell `i` spans `[i, i+1)`).
    pub center: Vec2,
    /// Support radius in cells; weight is exactly zero beyond it.
    pub radius: f32,
}

impl ForceImpulse {
    /// Gaussian-like weight shifted so it reaches zero at the radius.
    #[inline(always)]
    pub fn weight(&self, x: f32, y: f32) -> f32 {
        let dx = (x - self.center[0]) / self.radius;
        let dy = (y - self.center[1]) / self.radius;
        let d2 = dx * dx + dy * dy;
        if d2 >= 1.0 {
            return 0.0;
        }
        let floor = (-FALLOFF).exp();
        ((-FALLOFF * d2).exp() - floor) / (1.0 - floor)
    }
}

/// Semi-Lagrangian advection: `out(x) = dissipation * source(x - dt * v(x))`.
/// Back-traces that leave the domain sample through `edges`.
pub fn advect<T: Texel>(
    velocity: &Field<Vec2>,
    source: &Field<T>,
    out: &mut Field<T>,
    dt: f32,
    dissipation: f32,
    edges: EdgePolicy,
) {
    let w = out.width;
    for j in 0..out.height {
        for i in 0..w {
            let v = velocity.get(i, j);
            let x = i as f32 - dt * v[0];
            let y = j as f32 - dt * v[1];
            out.data[idx(i, j, w)] = edges.sample(source, x, y).scale(dissipation);
        }
    }
}

/// Add the impulse on top of the incoming velocity.
pub fn apply_force(velocity: &Field<Vec2>, out: &mut Field<Vec2>, impulse: &ForceImpulse) {
    out.data.copy_from_slice(&velocity.data);

    // Only the bounding box of the splat can receive a nonzero weight.
    let r = impulse.radius;
    let x_lo = (impulse.center[0] - r).floor().max(0.0) as usize;
    let y_lo = (impulse.center[1] - r).floor().max(0.0) as usize;
    let x_hi = ((impulse.center[0] + r).ceil().max(0.0) as usize).min(out.width);
    let y_hi = ((impulse.center[1] + r).ceil().max(0.0) as usize).min(out.height);

    let w = out.width;
    for j in y_lo..y_hi {
        for i in x_lo..x_hi {
            let s = impulse.weight(i as f32 + 0.5, j as f32 + 0.5);
            if s > 0.0 {
                let cell = &mut out.data[idx(i, j, w)];
                cell[0] += impulse.force[0] * s;
                cell[1] += impulse.force[1] * s;
            }
        }
    }
}

/// One Jacobi round of the implicit diffusion solve
/// `(alpha + 4) v - sum(neighbors) = alpha * v0`.
pub fn viscous_step(
    estimate: &Field<Vec2>,
    rhs: &Field<Vec2>,
    out: &mut Field<Vec2>,
    alpha: f32,
    beta: f32,
    edges: EdgePolicy,
) {
    let w = out.width;
    let inv_beta = 1.0 / beta;
    for j in 0..out.height as isize {
        for i in 0..w as isize {
            let l = edges.vector(estimate, i - 1, j);
            let r = edges.vector(estimate, i + 1, j);
            let t = edges.vector(estimate, i, j + 1);
            let b = edges.vector(estimate, i, j - 1);
            let c = rhs.get(i as usize, j as usize);
            out.data[idx(i as usize, j as usize, w)] = [
                (l[0] + r[0] + t[0] + b[0] + alpha * c[0]) * inv_beta,
                (l[1] + r[1] + t[1] + b[1] + alpha * c[1]) * inv_beta,
            ];
        }
    }
}

/// Central-difference divergence.
pub fn divergence(velocity: &Field<Vec2>, out: &mut Field<f32>, edges: EdgePolicy) {
    let w = out.width;
    for j in 0..out.height as isize {
        for i in 0..w as isize {
            let l = edges.vector(velocity, i - 1, j);
            let r = edges.vector(velocity, i + 1, j);
            let t = edges.vector(velocity, i, j + 1);
            let b = edges.vector(velocity, i, j - 1);
            out.data[idx(i as usize, j as usize, w)] = 0.5 * (r[0] - l[0] + t[1] - b[1]);
        }
    }
}

/// One Jacobi round of `laplacian(p) = div`, starting from estimate `p`.
pub fn poisson_step(p: &Field<f32>, divergence: &Field<f32>, out: &mut Field<f32>, edges: EdgePolicy) {
    let w = out.width;
    for j in 0..out.height as isize {
        for i in 0..w as isize {
            let sum = edges.scalar(p, i - 1, j)
                + edges.scalar(p, i + 1, j)
                + edges.scalar(p, i, j + 1)
                + edges.scalar(p, i, j - 1);
            let ii = idx(i as usize, j as usize, w);
            out.data[ii] = 0.25 * (sum - divergence.data[ii]);
        }
    }
}

/// Subtract the central-difference pressure gradient.
pub fn subtract_gradient(
    pressure: &Field<f32>,
    velocity: &Field<Vec2>,
    out: &mut Field<Vec2>,
    edges: EdgePolicy,
) {
    let w = out.width;
    for j in 0..out.height as isize {
        for i in 0..w as isize {
            let pl = edges.scalar(pressure, i - 1, j);
            let pr = edges.scalar(pressure, i + 1, j);
            let pt = edges.scalar(pressure, i, j + 1);
            let pb = edges.scalar(pressure, i, j - 1);
            let ii = idx(i as usize, j as usize, w);
            let v = velocity.data[ii];
            out.data[ii] = [v[0] - 0.5 * (pr - pl), v[1] - 0.5 * (pt - pb)];
        }
    }
}
