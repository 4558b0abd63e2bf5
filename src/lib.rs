//! Real-time 2-D viscous fluid simulation rendered as an animated color
//! field: a stable-fluids solver on a collocated grid, pointer and
//! autonomous forcing, and a frame scheduler that hosts can drive.

pub mod config;
pub mod driver;
pub mod error;
pub mod grid;
pub mod host;
pub mod input;
pub mod renderer;
pub mod rng;
pub mod scheduler;
pub mod solver;
