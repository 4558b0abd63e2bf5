use crate::grid::{Field, Vec2};
use super::boundary::EdgePolicy;

/// Snapshot of the flow statistics after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    pub mean_abs_divergence: f64,
    pub kinetic_energy: f64,
    pub max_speed: f32,
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frame {}: |div| {:.3e}, KE {:.3e}, max speed {:.3}",
            self.frame, self.mean_abs_divergence, self.kinetic_energy, self.max_speed
        )
    }
}

/// Mean of `|div v|` over every cell, central differences.
pub fn mean_abs_divergence(velocity: &Field<Vec2>, edges: EdgePolicy) -> f64 {
    let mut sum = 0.0;
    for j in 0..velocity.height as isize {
        for i in 0..velocity.width as isize {
            let l = edges.vector(velocity, i - 1, j);
            let r = edges.vector(velocity, i + 1, j);
            let t = edges.vector(velocity, i, j + 1);
            let b = edges.vector(velocity, i, j - 1);
            sum += (0.5 * (r[0] - l[0] + t[1] - b[1])).abs() as f64;
        }
    }
    let count = velocity.data.len();
    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Volume-averaged kinetic energy: `KE = 0.5 * <vx² + vy²>`.
pub fn kinetic_energy(velocity: &Field<Vec2>) -> f64 {
    let count = velocity.data.len();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = velocity
        .data
        .iter()
        .map(|v| (v[0] as f64).powi(2) + (v[1] as f64).powi(2))
        .sum();
    0.5 * sum / count as f64
}

pub fn max_speed(velocity: &Field<Vec2>) -> f32 {
    velocity
        .data
        .iter()
        .map(|v| (v[0] * v[0] + v[1] * v[1]).sqrt())
        .fold(0.0_f32, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn field(f: impl FnMut(usize, usize) -> Vec2) -> Field<Vec2> {
        let mut v = Field::zeroed(Grid { width: 10, height: 8 }, "test").unwrap();
        v.fill_with(f);
        v
    }

    #[test]
    fn test_kinetic_energy_zero() {
        let v = field(|_, _| [0.0, 0.0]);
        assert_eq!(kinetic_energy(&v), 0.0);
        assert_eq!(max_speed(&v), 0.0);
    }

    #[test]
    fn test_kinetic_energy_uniform_flow() {
        let v = field(|_, _| [1.0, 0.0]);
        assert!((kinetic_energy(&v) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_max_speed() {
        let v = field(|i, j| if (i, j) == (3, 4) { [3.0, 4.0] } else { [0.1, 0.0] });
        assert!((max_speed(&v) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_flow_has_no_interior_divergence() {
        let v = field(|_, _| [2.0, -1.0]);
        assert_eq!(mean_abs_divergence(&v, EdgePolicy::Clamp), 0.0);
        // Reflection turns the walls into sinks and sources.
        assert!(mean_abs_divergence(&v, EdgePolicy::Reflect) > 0.0);
    }
}
