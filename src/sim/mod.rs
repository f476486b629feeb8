//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time measured in ticks, never wall clock
//! - Seeded RNG only
//! - Stable iteration order (by pipe ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, check_collision};
pub use snapshot::{PipeView, Snapshot};
pub use state::{Bird, CrashCause, GameEvent, GamePhase, GameState, PipePair};
pub use tick::{TickInput, jump, reset, spawn_pipe, spawn_pipe_with_top, start_round, tick};
