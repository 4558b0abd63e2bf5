use std::time::Duration;

use crate::grid::{Vec2, Viewport};

/// Raw pointer/touch event in device pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Down,
    Up,
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,
}

/// Pointer as seen by the force pass. Coordinates are grid-normalized:
/// x in [-1, 1] left to right, y in [-1, 1] bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub coords: Vec2,
    pub prev_coords: Vec2,
    /// `coords - prev_coords` as of the last `update`.
    pub diff: Vec2,
    pub active: bool,
    /// Time of the last real (non-synthetic) interaction.
    pub last_interaction: Duration,
    /// Time of the last motion, real or synthetic.
    pub last_motion: Duration,
}

/// Translates device events into `PointerState`. The only place that
/// touches raw input.
#[derive(Debug, Clone)]
pub struct Pointer {
    state: PointerState,
    viewport: Viewport,
    idle_timeout: Duration,
}

impl Pointer {
    pub fn new(viewport: Viewport, idle_timeout: Duration) -> Self {
        Self { state: PointerState::default(), viewport, idle_timeout }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Device pixels to grid-normalized coordinates, clamped to the domain.
    pub fn to_normalized(&self, x: f32, y: f32) -> Vec2 {
        let w = self.viewport.width.max(1) as f32;
        let h = self.viewport.height.max(1) as f32;
        let nx = x / w * 2.0 - 1.0;
        let ny = -(y / h * 2.0 - 1.0);
        let sanitize = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        [sanitize(nx), sanitize(ny)]
    }

    /// Apply one host event. Returns true when the event counts as a real
    /// user interaction.
    pub fn handle(&mut self, event: PointerEvent, now: Duration) -> bool {
        match event {
            PointerEvent::Move { x, y } | PointerEvent::TouchMove { x, y } => {
                self.state.coords = self.to_normalized(x, y);
                self.touch(now);
                true
            }
            PointerEvent::TouchStart { x, y } => {
                // A new contact point must not read as a jump from the old one.
                let coords = self.to_normalized(x, y);
                self.state.coords = coords;
                self.state.prev_coords = coords;
                self.touch(now);
                true
            }
            PointerEvent::Down => {
                self.touch(now);
                true
            }
            PointerEvent::Up | PointerEvent::TouchEnd => {
                self.state.active = false;
                false
            }
        }
    }

    /// Synthetic motion from the autonomous driver. Does not count as a user
    /// interaction.
    pub fn drive(&mut self, coords: Vec2, now: Duration) {
        self.state.coords = [coords[0].clamp(-1.0, 1.0), coords[1].clamp(-1.0, 1.0)];
        self.state.active = true;
        self.state.last_motion = now;
    }

    /// Per-frame update: compute the drag vector and expire idle pointers.
    pub fn update(&mut self, now: Duration) {
        let s = &mut self.state;
        s.diff = [s.coords[0] - s.prev_coords[0], s.coords[1] - s.prev_coords[1]];
        s.prev_coords = s.coords;
        if s.active && now.saturating_sub(s.last_motion) > self.idle_timeout {
            s.active = false;
        }
    }

    fn touch(&mut self, now: Duration) {
        self.state.active = true;
        self.state.last_interaction = now;
        self.state.last_motion = now;
    }
}
