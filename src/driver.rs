use std::time::Duration;

use serde::Deserialize;

use crate::grid::Vec2;
use crate::input::Pointer;
use crate::rng::Xor128;

/// Distance (normalized units) at which the current target counts as reached.
const ARRIVAL_EPSILON: f32 = 0.02;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoDriverConfig {
    pub enabled: bool,
    /// Cruise speed in normalized units per second.
    pub speed: f32,
    pub resume_delay_ms: u64,
    /// Accepted for compatibility; no ramping curve is applied.
    pub ramp_duration_ms: u64,
    pub seed: u32,
}

impl Default for AutoDriverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 0.5,
            resume_delay_ms: 5000,
            ramp_duration_ms: 5000,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverState {
    /// The user interacted recently; the driver stays out of the way.
    IdleManual,
    /// Synthesizing pointer motion toward `target`.
    Cruising { target: Vec2 },
}

/// Moves the pointer on its own once the user has been idle long enough.
#[derive(Debug, Clone)]
pub struct AutoDriver {
    config: AutoDriverConfig,
    state: DriverState,
    rng: Xor128,
}

impl AutoDriver {
    pub fn new(config: AutoDriverConfig) -> Self {
        let rng = Xor128::new(config.seed);
        Self { config, state: DriverState::IdleManual, rng }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_cruising(&self) -> bool {
        matches!(self.state, DriverState::Cruising { .. })
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.state = DriverState::IdleManual;
        }
    }

    /// A real user event arrived: hand control back immediately.
    pub fn force_stop(&mut self) {
        if self.is_cruising() {
            log::debug!("auto driver: user took over");
        }
        self.state = DriverState::IdleManual;
    }

    /// Advance by `elapsed` of wall time at time `now`.
    pub fn update(&mut self, now: Duration, elapsed: Duration, pointer: &mut Pointer) {
        if !self.config.enabled {
            return;
        }
        let idle = now.saturating_sub(pointer.state().last_interaction);
        if idle < Duration::from_millis(self.config.resume_delay_ms) {
            self.state = DriverState::IdleManual;
            return;
        }

        let target = match self.state {
            DriverState::Cruising { target } => target,
            DriverState::IdleManual => {
                log::debug!("auto driver: cruising after {:?} idle", idle);
                self.next_target()
            }
        };

        let pos = pointer.state().coords;
        let dx = target[0] - pos[0];
        let dy = target[1] - pos[1];
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < ARRIVAL_EPSILON {
            let target = self.next_target();
            self.state = DriverState::Cruising { target };
            pointer.drive(pos, now);
            return;
        }

        let step = self.config.speed * elapsed.as_secs_f32();
        let next = if step >= dist {
            target
        } else {
            [pos[0] + dx / dist * step, pos[1] + dy / dist * step]
        };
        self.state = DriverState::Cruising { target };
        pointer.drive(next, now);
    }

    fn next_target(&mut self) -> Vec2 {
        [self.rng.next_signed(), self.rng.next_signed()]
    }
}
