//! Flappy - A Flappy Bird clone
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pipes, collisions, scoring)
//! - `driver`: Fixed-step/interval driving of the simulation
//! - `renderer`: WebGPU rendering pipeline
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation and input preferences

pub mod driver;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::{FixedStep, Session};
pub use settings::{DriverKind, Settings, is_flap_key};
pub use tuning::{Preset, Tuning, TuningError};

/// Game loop constants
pub mod consts {
    /// Simulation advances in whole reference ticks; one tick = one unit of `dt`
    pub const TICK_DT: f32 = 1.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame (seconds) the accumulator will accept, e.g. after a tab switch
    pub const MAX_FRAME_SECS: f32 = 0.1;
}
