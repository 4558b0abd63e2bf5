use crate::error::{Result, SimError};

/// Texels in the lookup table, matching a 256x1 gradient texture.
pub const PALETTE_SIZE: usize = 256;

/// RGBA in [0, 1].
pub type Rgba = [f32; 4];

/// Named gradients usable in place of explicit colors.
const PRESETS: [(&str, [&str; 5]); 3] = [
    // navy -> blue -> purple -> pink -> orange
    ("tokyo-night", ["#1a1b26", "#7aa2f7", "#bb9af7", "#f7768e", "#ff9e64"]),
    // void -> indigo -> violet -> magenta -> plasma gold
    ("solar-wind", ["#050514", "#141450", "#501eb4", "#dc50a0", "#ffdc78"]),
    // void -> teal -> cyan -> near white -> mint
    ("arctic-ice", ["#080a19", "#0a3c5a", "#1eb4c8", "#c8f0fa", "#78ffc8"]),
];

/// 1-D color lookup table indexed by a scalar in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    lut: Vec<Rgba>,
    background: Rgba,
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(color: &str) -> Result<Rgba> {
    let invalid = || SimError::InvalidColor(color.to_string());
    let hex = color.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map(|v| v as f32 / 255.0);
    let rgba = match hex.len() {
        3 => {
            let mut out = [1.0; 4];
            for (k, c) in hex.chars().enumerate() {
                let pair = format!("{c}{c}");
                out[k] = channel(&pair).map_err(|_| invalid())?;
            }
            out
        }
        6 | 8 => {
            let mut out = [1.0; 4];
            for k in 0..hex.len() / 2 {
                out[k] = channel(&hex[2 * k..2 * k + 2]).map_err(|_| invalid())?;
            }
            out
        }
        _ => return Err(invalid()),
    };
    Ok(rgba)
}

impl Palette {
    /// Evenly spaced stops, linearly interpolated into the table. The first
    /// stop doubles as the background color.
    pub fn from_stops(stops: &[Rgba]) -> Result<Self> {
        let Some(&first) = stops.first() else {
            return Err(SimError::EmptyPalette);
        };
        let segments = stops.len() - 1;
        let lut = (0..PALETTE_SIZE)
            .map(|i| {
                if segments == 0 {
                    return first;
                }
                let t = i as f32 / (PALETTE_SIZE - 1) as f32;
                let seg = t * segments as f32;
                let k = (seg as usize).min(segments - 1);
                let s = seg - k as f32;
                let (a, b) = (stops[k], stops[k + 1]);
                [
                    a[0] + s * (b[0] - a[0]),
                    a[1] + s * (b[1] - a[1]),
                    a[2] + s * (b[2] - a[2]),
                    a[3] + s * (b[3] - a[3]),
                ]
            })
            .collect();
        Ok(Self { lut, background: first })
    }

    /// Build from config entries: hex colors, or a single preset name.
    pub fn from_colors<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        if let [single] = colors {
            if let Some((_, stops)) = PRESETS.iter().find(|(name, _)| *name == single.as_ref()) {
                return Self::from_colors(stops);
            }
        }
        let stops = colors
            .iter()
            .map(|c| parse_hex(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_stops(&stops)
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Linear-filtered lookup, `t` clamped to [0, 1].
    pub fn lookup(&self, t: f32) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (PALETTE_SIZE - 1) as f32;
        let i = (pos as usize).min(PALETTE_SIZE - 2);
        let s = pos - i as f32;
        let (a, b) = (self.lut[i], self.lut[i + 1]);
        [
            a[0] + s * (b[0] - a[0]),
            a[1] + s * (b[1] - a[1]),
            a[2] + s * (b[2] - a[2]),
            a[3] + s * (b[3] - a[3]),
        ]
    }
}
