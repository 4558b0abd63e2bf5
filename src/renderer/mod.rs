mod palette;

// Re-export public API
pub use palette::{parse_hex, Palette, Rgba, PALETTE_SIZE};

use crate::error::{Result, SimError};
use crate::grid::{Field, Vec2, Viewport};

/// One composited RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub rgba: &'a [u8],
    pub width: usize,
    pub height: usize,
}

/// Maps velocity magnitude through the palette and blends over the
/// background, upscaled to the viewport.
#[derive(Debug, Clone)]
pub struct Compositor {
    palette: Palette,
    viewport: Viewport,
    rgba: Vec<u8>,
}

#[inline]
fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `bg * (1 - t) + color * t`, channel-wise.
#[inline]
fn blend(bg: Rgba, color: Rgba, t: f32) -> Rgba {
    [
        bg[0] * (1.0 - t) + color[0] * t,
        bg[1] * (1.0 - t) + color[1] * t,
        bg[2] * (1.0 - t) + color[2] * t,
        bg[3] * (1.0 - t) + color[3] * t,
    ]
}

impl Compositor {
    pub fn new(palette: Palette, viewport: Viewport) -> Result<Self> {
        let mut compositor = Self { palette, viewport, rgba: Vec::new() };
        compositor.resize(viewport)?;
        Ok(compositor)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Reallocate the RGBA buffer. On error the previous buffer is kept.
    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        let cells = viewport.width.checked_mul(viewport.height);
        let total = cells
            .and_then(|c| c.checked_mul(4))
            .ok_or(SimError::Allocation { buffer: "image", cells: cells.unwrap_or(usize::MAX) })?;
        let mut rgba = Vec::new();
        rgba.try_reserve_exact(total)
            .map_err(|_| SimError::Allocation { buffer: "image", cells: total / 4 })?;
        rgba.resize(total, 0);
        self.rgba = rgba;
        self.viewport = viewport;
        Ok(())
    }

    /// Color for one velocity sample.
    pub fn shade(&self, v: Vec2) -> [u8; 4] {
        let speed = (v[0] * v[0] + v[1] * v[1]).sqrt();
        let t = if speed.is_finite() { speed.clamp(0.0, 1.0) } else { 0.0 };
        let out = blend(self.palette.background(), self.palette.lookup(t), t);
        [to_u8(out[0]), to_u8(out[1]), to_u8(out[2]), to_u8(out[3])]
    }

    /// Render the velocity field over the whole viewport. Texture row 0 is
    /// the bottom of the domain, so image rows are flipped.
    pub fn compose(&mut self, velocity: &Field<Vec2>) -> Frame<'_> {
        let Viewport { width, height } = self.viewport;
        let (gw, gh) = (velocity.width as f32, velocity.height as f32);
        for py in 0..height {
            let v = 1.0 - (py as f32 + 0.5) / height as f32;
            let sy = v * gh - 0.5;
            for px in 0..width {
                let u = (px as f32 + 0.5) / width as f32;
                let sx = u * gw - 0.5;
                let rgba = self.shade(velocity.sample(sx, sy));
                let off = (py * width + px) * 4;
                self.rgba[off..off + 4].copy_from_slice(&rgba);
            }
        }
        Frame { rgba: &self.rgba, width, height }
    }
}
