//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in [`GameState`]; the struct is
//! serializable, RNG included, so a round can be replayed from a snapshot.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first flap
    Idle,
    /// Active gameplay
    Playing,
    /// Bird crashed; the next flap restarts
    GameOver,
}

/// What ended a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    Floor,
    Ceiling,
    TopPipe { id: u32 },
    BottomPipe { id: u32 },
}

/// Things that happened during a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    Flapped,
    PipeSpawned { id: u32 },
    Scored { pipe_id: u32, score: u32 },
    Crashed { cause: CrashCause, score: u32 },
}

/// The player's bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Top-left corner of the hitbox; x never changes during a round
    pub pos: Vec2,
    /// Vertical velocity (positive = falling)
    pub vel: f32,
    /// Tilt in degrees, derived from flaps and falling speed
    pub rotation: f32,
}

impl Bird {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.bird_x, tuning.bird_start_y()),
            vel: 0.0,
            rotation: 0.0,
        }
    }

    pub fn hitbox(&self, size: f32) -> Aabb {
        Aabb::new(self.pos, self.pos + Vec2::splat(size))
    }

    /// Apply gravity and integrate position (semi-implicit Euler)
    pub fn integrate(&mut self, gravity: f32, dt: f32) {
        self.vel += gravity * dt;
        self.pos.y += self.vel * dt;
    }

    /// Tilt nose-down once clearly falling
    pub fn update_rotation(&mut self, tuning: &Tuning, dt: f32) {
        if self.vel > tuning.gravity * 2.0 {
            self.rotation = (self.rotation + tuning.rotation_speed * dt).min(tuning.max_rotation);
        }
    }

    pub fn flap(&mut self, tuning: &Tuning) {
        self.vel = tuning.jump_impulse;
        self.rotation = tuning.min_rotation;
    }
}

/// A top/bottom obstacle pair with a passable gap between them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipePair {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Height of the top segment
    pub top: f32,
    /// Height of the bottom segment
    pub bottom: f32,
    /// Already counted toward the score
    pub passed: bool,
}

impl PipePair {
    /// Build a pair whose bottom segment fills the rest of the field
    pub fn new(id: u32, x: f32, top: f32, tuning: &Tuning) -> Self {
        Self {
            id,
            x,
            top,
            bottom: tuning.field_height - top - tuning.pipe_gap,
            passed: false,
        }
    }

    /// Right (trailing) edge
    #[inline]
    pub fn right(&self, width: f32) -> f32 {
        self.x + width
    }

    /// y where the bottom segment begins
    #[inline]
    pub fn bottom_y(&self, field_height: f32) -> f32 {
        field_height - self.bottom
    }

    pub fn top_rect(&self, tuning: &Tuning) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, 0.0),
            Vec2::new(self.right(tuning.pipe_width), self.top),
        )
    }

    pub fn bottom_rect(&self, tuning: &Tuning) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.bottom_y(tuning.field_height)),
            Vec2::new(self.right(tuning.pipe_width), tuning.field_height),
        )
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Pipe height RNG
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Pipes passed this round
    pub score: u32,
    /// Ticks simulated while playing, across rounds
    pub time_ticks: u64,
    /// Ticks since the last spawn
    pub spawn_timer: f32,
    pub bird: Bird,
    /// Active pipes (ascending id, which is also ascending x)
    pub pipes: Vec<PipePair>,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next pipe ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game with the given seed and tuning
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            bird: Bird::new(&tuning),
            tuning,
            phase: GamePhase::Idle,
            score: 0,
            time_ticks: 0,
            spawn_timer: 0.0,
            pipes: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new pipe ID
    pub fn next_pipe_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Put the bird back at its start point and clear the field
    pub fn reset_field(&mut self) {
        self.bird = Bird::new(&self.tuning);
        self.pipes.clear();
        self.score = 0;
        self.spawn_timer = 0.0;
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
