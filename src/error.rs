use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("degenerate viewport {width}x{height}")]
    DegenerateViewport { width: usize, height: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("palette has no colors")]
    EmptyPalette,

    #[error("invalid palette color {0:?}")]
    InvalidColor(String),

    #[error("failed to allocate {cells} cells for the {buffer} buffer")]
    Allocation { buffer: &'static str, cells: usize },

    #[error("{kernel} pass cannot write to the {target} buffer")]
    Binding { kernel: &'static str, target: &'static str },

    #[error("scheduler has been disposed")]
    Disposed,

    #[error("host surface error: {0}")]
    Host(String),
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter { name, reason: reason.into() }
    }
}

/// Errors raised while loading `liquid-ether.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Invalid(#[from] SimError),
}
