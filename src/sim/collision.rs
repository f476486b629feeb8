//! Collision detection
//!
//! Axis-aligned boxes only. Checks are discrete, once per tick, so a bird
//! moving faster than a pipe is thick can pass through it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{CrashCause, GameState};

/// Axis-aligned bounding box (y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Strict overlap on x: touching edges do not count
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x && self.min.x < other.max.x
    }

    /// Strict overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.max.y > other.min.y && self.min.y < other.max.y
    }
}

/// Check the bird against the field bounds and every pipe.
///
/// Returns the first thing hit: floor, then ceiling, then pipes in spawn order.
pub fn check_collision(state: &GameState) -> Option<CrashCause> {
    let tuning = &state.tuning;
    let bird = state.bird.hitbox(tuning.bird_size);

    if bird.max.y > tuning.field_height {
        return Some(CrashCause::Floor);
    }
    if bird.min.y < 0.0 {
        return Some(CrashCause::Ceiling);
    }

    for pipe in &state.pipes {
        let top = pipe.top_rect(tuning);
        if !bird.overlaps_x(&top) {
            continue;
        }
        if bird.overlaps(&top) {
            return Some(CrashCause::TopPipe { id: pipe.id });
        }
        if bird.overlaps(&pipe.bottom_rect(tuning)) {
            return Some(CrashCause::BottomPipe { id: pipe.id });
        }
    }

    None
}
