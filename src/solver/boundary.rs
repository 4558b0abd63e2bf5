use crate::grid::{Field, Texel, Vec2};

/// How neighbor fetches behave past the domain edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Out-of-range samples return the nearest edge cell (zero gradient).
    Clamp,
    /// Like `Clamp`, but the velocity component normal to the crossed wall
    /// is negated, modelling a solid no-penetration boundary.
    Reflect,
}

impl EdgePolicy {
    pub fn from_reflection(reflect: bool) -> Self {
        if reflect { EdgePolicy::Reflect } else { EdgePolicy::Clamp }
    }

    /// Fetch a velocity at integer offset coordinates.
    #[inline(always)]
    pub fn vector(self, f: &Field<Vec2>, x: isize, y: isize) -> Vec2 {
        let cx = x.clamp(0, f.width as isize - 1);
        let cy = y.clamp(0, f.height as isize - 1);
        let mut v = f.get(cx as usize, cy as usize);
        if self == EdgePolicy::Reflect {
            if cx != x {
                v[0] = -v[0];
            }
            if cy != y {
                v[1] = -v[1];
            }
        }
        v
    }

    /// Bilinear sample at continuous cell coordinates. Under `Reflect`, a
    /// point past a wall returns the mirrored edge value.
    #[inline(always)]
    pub fn sample<T: Texel>(self, f: &Field<T>, x: f32, y: f32) -> T {
        let value = f.sample(x, y);
        if self == EdgePolicy::Clamp {
            return value;
        }
        let max_x = (f.width - 1) as f32;
        let max_y = (f.height - 1) as f32;
        value.mirror(x < 0.0 || x > max_x, y < 0.0 || y > max_y)
    }

    /// Fetch a scalar at integer offset coordinates. Scalars always clamp.
    #[inline(always)]
    pub fn scalar(self, f: &Field<f32>, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, f.width as isize - 1);
        let cy = y.clamp(0, f.height as isize - 1);
        f.get(cx as usize, cy as usize)
    }
}
