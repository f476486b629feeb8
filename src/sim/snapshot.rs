//! Read-only view of the simulation for drawing and HUD updates

use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};

/// One pipe pair as the renderer needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeView {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    /// Height of the top segment (spans y in [0, top))
    pub top: f32,
    /// Where the bottom segment starts
    pub bottom_y: f32,
    /// Height of the bottom segment
    pub bottom: f32,
}

/// Everything a frame needs, copied out of [`GameState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub field_width: f32,
    pub field_height: f32,
    pub bird_x: f32,
    pub bird_y: f32,
    pub bird_size: f32,
    pub bird_rotation: f32,
    pub pipes: Vec<PipeView>,
    pub score: u32,
    pub phase: GamePhase,
}

impl From<&GameState> for Snapshot {
    fn from(state: &GameState) -> Self {
        let tuning = &state.tuning;
        Self {
            field_width: tuning.field_width,
            field_height: tuning.field_height,
            bird_x: state.bird.pos.x,
            bird_y: state.bird.pos.y,
            bird_size: tuning.bird_size,
            bird_rotation: state.bird.rotation,
            pipes: state
                .pipes
                .iter()
                .map(|p| PipeView {
                    id: p.id,
                    x: p.x,
                    width: tuning.pipe_width,
                    top: p.top,
                    bottom_y: p.bottom_y(tuning.field_height),
                    bottom: p.bottom,
                })
                .collect(),
            score: state.score,
            phase: state.phase,
        }
    }
}
