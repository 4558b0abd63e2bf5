use std::path::Path;

use serde::Deserialize;

use crate::driver::AutoDriverConfig;
use crate::error::{ConfigError, SimError};
use crate::renderer::Palette;
use crate::solver::SimulationParams;

pub const CONFIG_FILE: &str = "liquid-ether.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationParams,
    pub pointer: PointerConfig,
    pub auto: AutoDriverConfig,
    /// Hex colors from slow to fast flow, or one preset name.
    pub palette: Vec<String>,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PointerConfig {
    /// Motionless time after which the pointer stops injecting force.
    pub idle_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
    /// Frames rendered by a headless run.
    pub frames: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationParams::default(),
            pointer: PointerConfig::default(),
            auto: AutoDriverConfig::default(),
            palette: vec!["#000000".to_string(), "#ffffff".to_string()],
            display: DisplayConfig::default(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self { idle_timeout_ms: 2000 }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            target_fps: 60,
            frames: 600,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), SimError> {
        self.simulation.validate()?;
        if !(self.auto.speed.is_finite() && self.auto.speed >= 0.0) {
            return Err(SimError::invalid(
                "auto.speed",
                format!("{} must be non-negative", self.auto.speed),
            ));
        }
        if self.display.target_fps == 0 {
            return Err(SimError::invalid("display.target_fps", "must be at least 1"));
        }
        Palette::from_colors(&self.palette)?;
        Ok(())
    }
}

/// Strict load: any I/O, parse or validation problem is an error.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let shown = path.display().to_string();
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: shown.clone(), source })?;
    let cfg: Config = serde_yaml::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path: shown, source })?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `liquid-ether.yaml` from the working directory, falling back to
/// defaults when it is missing or unusable.
pub fn load() -> Config {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => {
            log::info!("loaded {CONFIG_FILE}");
            cfg
        }
        Err(e) => {
            log::warn!("{e}; using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.simulation, SimulationParams::default());
        assert_eq!(cfg.pointer.idle_timeout_ms, 2000);
        assert!(!cfg.auto.enabled);
        assert_eq!(cfg.auto.speed, 0.5);
        assert_eq!(cfg.auto.resume_delay_ms, 5000);
        assert_eq!(cfg.auto.ramp_duration_ms, 5000);
        assert_eq!(cfg.palette, vec!["#000000", "#ffffff"]);
        assert_eq!(cfg.display.width, 800);
        assert_eq!(cfg.display.height, 600);
        assert_eq!(cfg.display.target_fps, 60);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = "simulation:\n  force_scale: 5.0\nauto:\n  enabled: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.simulation.force_scale, 5.0);
        assert_eq!(cfg.simulation.cursor_radius, 100.0); // default
        assert!(cfg.auto.enabled);
        assert_eq!(cfg.auto.speed, 0.5); // default
        assert_eq!(cfg.display.width, 800); // default
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r##"
simulation:
  force_scale: 10.0
  cursor_radius: 40.0
  viscosity_enabled: true
  viscosity: 12.0
  viscous_iterations: 16
  pressure_iterations: 24
  dt: 0.02
  resolution: 0.25
  boundary_reflection: true
  dissipation: 0.98
pointer:
  idle_timeout_ms: 1500
auto:
  enabled: true
  speed: 0.8
  resume_delay_ms: 3000
  ramp_duration_ms: 1000
  seed: 9
palette: ["#5227FF", "#FF9FFC", "#B19EEF"]
display:
  width: 1024
  height: 768
  target_fps: 30
  frames: 120
"##;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.simulation.cursor_radius, 40.0);
        assert!(cfg.simulation.viscosity_enabled);
        assert_eq!(cfg.simulation.viscous_iterations, 16);
        assert_eq!(cfg.simulation.pressure_iterations, 24);
        assert!(cfg.simulation.boundary_reflection);
        assert_eq!(cfg.simulation.dissipation, 0.98);
        assert_eq!(cfg.pointer.idle_timeout_ms, 1500);
        assert_eq!(cfg.auto.seed, 9);
        assert_eq!(cfg.palette.len(), 3);
        assert_eq!(cfg.display.frames, 120);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_validate_rejects_empty_palette() {
        let cfg = Config { palette: Vec::new(), ..Default::default() };
        assert_eq!(cfg.validate(), Err(SimError::EmptyPalette));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.simulation.dt = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.auto.speed = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.palette = vec!["red".to_string()];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = load_from(Path::new("/nonexistent/liquid-ether.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    }

    #[test]
    fn test_load_from_invalid_file() {
        let path = std::env::temp_dir().join(format!("liquid-ether-{}.yaml", std::process::id()));
        std::fs::write(&path, "simulation:\n  resolution: 2.0\n").unwrap();
        let err = load_from(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Invalid(SimError::InvalidParameter { name: "resolution", .. })), "{err}");
    }
}
