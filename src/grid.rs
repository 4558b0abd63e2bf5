use crate::error::{Result, SimError};

/// Two-channel texel: `(vx, vy)` in grid cells per unit time.
pub type Vec2 = [f32; 2];

/// Size of the host drawing surface in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Simulation lattice dimensions derived from the viewport and resolution scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    /// `W,H = round(viewport * scale)`, never below one cell.
    pub fn from_viewport(viewport: Viewport, scale: f32) -> Result<Self> {
        if viewport.is_degenerate() {
            return Err(SimError::DegenerateViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(SimError::invalid("resolution", format!("{scale} is outside (0, 1]")));
        }
        let width = ((viewport.width as f32 * scale).round() as usize).max(1);
        let height = ((viewport.height as f32 * scale).round() as usize).max(1);
        Ok(Self { width, height })
    }

    /// Texel size in normalized texture units: `(1/W, 1/H)`.
    pub fn cell_size(&self) -> (f32, f32) {
        (1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Cell count, or `None` if it does not fit in `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }
}

/// Value stored per cell. Implemented for scalar and 2-vector fields so
/// advection can transport either.
pub trait Texel: Copy + Default + PartialEq + std::fmt::Debug {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn scale(self, k: f32) -> Self;
    /// Value seen through a solid wall crossed along x and/or y.
    fn mirror(self, flip_x: bool, flip_y: bool) -> Self;
}

impl Texel for f32 {
    #[inline(always)]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a * (1.0 - t) + b * t
    }

    #[inline(always)]
    fn scale(self, k: f32) -> Self {
        self * k
    }

    #[inline(always)]
    fn mirror(self, _flip_x: bool, _flip_y: bool) -> Self {
        self
    }
}

impl Texel for Vec2 {
    #[inline(always)]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        [a[0] * (1.0 - t) + b[0] * t, a[1] * (1.0 - t) + b[1] * t]
    }

    #[inline(always)]
    fn scale(self, k: f32) -> Self {
        [self[0] * k, self[1] * k]
    }

    #[inline(always)]
    fn mirror(self, flip_x: bool, flip_y: bool) -> Self {
        [
            if flip_x { -self[0] } else { self[0] },
            if flip_y { -self[1] } else { self[1] },
        ]
    }
}

/// Row-major buffer over the grid; row 0 is the bottom of the domain.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    pub width: usize,
    pub height: usize,
    pub data: Vec<T>,
}

#[inline(always)]
pub const fn idx(x: usize, y: usize, width: usize) -> usize {
    y * width + x
}

impl<T: Texel> Field<T> {
    /// Allocate a zeroed field, surfacing allocation failure as an error.
    pub fn zeroed(grid: Grid, buffer: &'static str) -> Result<Self> {
        let cells = grid.cells().ok_or(SimError::Allocation { buffer, cells: usize::MAX })?;
        let mut data = Vec::new();
        data.try_reserve_exact(cells)
            .map_err(|_| SimError::Allocation { buffer, cells })?;
        data.resize(cells, T::default());
        Ok(Self { width: grid.width, height: grid.height, data })
    }

    pub fn grid(&self) -> Grid {
        Grid { width: self.width, height: self.height }
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[idx(x, y, self.width)]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = idx(x, y, self.width);
        self.data[i] = value;
    }

    /// Fill every cell from a function of its coordinates.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> T) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.data[idx(x, y, self.width)] = f(x, y);
            }
        }
    }

    /// Bilinear sample at continuous cell coordinates, clamped to the edge.
    /// Cell `(i, j)` has its center at `(i, j)`.
    pub fn sample(&self, x: f32, y: f32) -> T {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let s = x - x0 as f32;
        let t = y - y0 as f32;
        let bottom = T::lerp(self.get(x0, y0), self.get(x1, y0), s);
        let top = T::lerp(self.get(x0, y1), self.get(x1, y1), s);
        T::lerp(bottom, top, t)
    }
}

/// Two buffers of which one is read (`front`) while the other is written.
/// Swapping flips an index; no data is moved.
#[derive(Clone, Debug)]
pub struct PingPong<T> {
    fields: [Field<T>; 2],
    front: usize,
}

impl<T: Texel> PingPong<T> {
    pub fn zeroed(grid: Grid, buffer: &'static str) -> Result<Self> {
        Ok(Self {
            fields: [Field::zeroed(grid, buffer)?, Field::zeroed(grid, buffer)?],
            front: 0,
        })
    }

    pub fn front(&self) -> &Field<T> {
        &self.fields[self.front]
    }

    pub fn front_mut(&mut self) -> &mut Field<T> {
        &mut self.fields[self.front]
    }

    pub fn back_mut(&mut self) -> &mut Field<T> {
        &mut self.fields[1 - self.front]
    }

    /// Borrow the front for reading and the back for writing at once.
    pub fn read_write(&mut self) -> (&Field<T>, &mut Field<T>) {
        let (a, b) = self.fields.split_at_mut(1);
        if self.front == 0 { (&a[0], &mut b[0]) } else { (&b[0], &mut a[0]) }
    }

    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    pub fn front_index(&self) -> usize {
        self.front
    }
}

/// Every buffer the solver owns for one grid.
#[derive(Clone, Debug)]
pub struct FieldBuffers {
    pub grid: Grid,
    pub velocity: PingPong<Vec2>,
    /// Jacobi estimates of the viscous solve; the post-force velocity stays
    /// untouched in `velocity.front()` while these alternate.
    pub viscous: PingPong<Vec2>,
    pub pressure: PingPong<f32>,
    pub divergence: Field<f32>,
}

impl FieldBuffers {
    pub fn allocate(grid: Grid) -> Result<Self> {
        Ok(Self {
            grid,
            velocity: PingPong::zeroed(grid, "velocity")?,
            viscous: PingPong::zeroed(grid, "viscous")?,
            pressure: PingPong::zeroed(grid, "pressure")?,
            divergence: Field::zeroed(grid, "divergence")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rounds_viewport() {
        let grid = Grid::from_viewport(Viewport::new(800, 600), 0.5).unwrap();
        assert_eq!(grid, Grid { width: 400, height: 300 });

        let grid = Grid::from_viewport(Viewport::new(801, 3), 0.5).unwrap();
        // 400.5 rounds away from zero, 1.5 likewise
        assert_eq!(grid, Grid { width: 401, height: 2 });
    }

    #[test]
    fn test_grid_never_below_one_cell() {
        let grid = Grid::from_viewport(Viewport::new(1, 1), 0.1).unwrap();
        assert_eq!(grid, Grid { width: 1, height: 1 });
    }

    #[test]
    fn test_grid_rejects_degenerate_viewport() {
        let err = Grid::from_viewport(Viewport::new(0, 600), 0.5).unwrap_err();
        assert_eq!(err, SimError::DegenerateViewport { width: 0, height: 600 });
    }

    #[test]
    fn test_grid_rejects_bad_scale() {
        assert!(Grid::from_viewport(Viewport::new(10, 10), 0.0).is_err());
        assert!(Grid::from_viewport(Viewport::new(10, 10), 1.5).is_err());
        assert!(Grid::from_viewport(Viewport::new(10, 10), f32::NAN).is_err());
        assert!(Grid::from_viewport(Viewport::new(10, 10), 1.0).is_ok());
    }

    #[test]
    fn test_cell_size() {
        let grid = Grid { width: 400, height: 300 };
        let (sx, sy) = grid.cell_size();
        assert!((sx - 1.0 / 400.0).abs() < 1e-9);
        assert!((sy - 1.0 / 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_ping_pong_swap_flips_index_only() {
        let grid = Grid { width: 4, height: 3 };
        let mut pair: PingPong<f32> = PingPong::zeroed(grid, "test").unwrap();
        {
            let (front, back) = pair.read_write();
            assert_eq!(front.data.len(), 12);
            back.data.fill(2.0);
        }
        assert_eq!(pair.front().data[0], 0.0);
        pair.swap();
        assert_eq!(pair.front_index(), 1);
        assert_eq!(pair.front().data[0], 2.0);
        pair.swap();
        assert_eq!(pair.front().data[0], 0.0);
    }

    #[test]
    fn test_sample_exact_at_cell_centers() {
        let grid = Grid { width: 5, height: 4 };
        let mut f: Field<f32> = Field::zeroed(grid, "test").unwrap();
        f.fill_with(|x, y| (x * 10 + y) as f32);
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(f.sample(x as f32, y as f32), f.get(x, y));
            }
        }
    }

    #[test]
    fn test_sample_interpolates_and_clamps() {
        let grid = Grid { width: 3, height: 1 };
        let mut f: Field<f32> = Field::zeroed(grid, "test").unwrap();
        f.data.copy_from_slice(&[0.0, 1.0, 3.0]);
        assert!((f.sample(0.5, 0.0) - 0.5).abs() < 1e-6);
        assert!((f.sample(1.5, 0.0) - 2.0).abs() < 1e-6);
        assert_eq!(f.sample(-4.0, 0.0), 0.0, "left edge should clamp");
        assert_eq!(f.sample(9.0, 7.0), 3.0, "right edge should clamp");
    }

    #[test]
    fn test_oversized_grid_is_an_allocation_error() {
        let grid = Grid { width: usize::MAX, height: 2 };
        assert_eq!(grid.cells(), None);
        let err = Field::<f32>::zeroed(grid, "velocity").unwrap_err();
        assert!(matches!(err, SimError::Allocation { buffer: "velocity", .. }), "{err:?}");

        let grid = Grid { width: usize::MAX / 8, height: 1 };
        let err = Field::<Vec2>::zeroed(grid, "velocity").unwrap_err();
        assert!(matches!(err, SimError::Allocation { .. }), "{err:?}");
    }

    #[test]
    fn test_mirror_flips_vectors_only() {
        assert_eq!([1.0_f32, 2.0].mirror(true, false), [-1.0, 2.0]);
        assert_eq!([1.0_f32, 2.0].mirror(false, true), [1.0, -2.0]);
        assert_eq!(3.0_f32.mirror(true, true), 3.0);
    }

    #[test]
    fn test_buffers_allocate_zeroed() {
        let grid = Grid { width: 8, height: 6 };
        let buffers = FieldBuffers::allocate(grid).unwrap();
        assert_eq!(buffers.velocity.front().data.len(), 48);
        assert_eq!(buffers.pressure.front().data.len(), 48);
        assert_eq!(buffers.divergence.data.len(), 48);
        assert!(buffers.velocity.front().data.iter().all(|v| *v == [0.0, 0.0]));
    }
}
