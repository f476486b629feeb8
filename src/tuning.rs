//! Data-driven game balance
//!
//! Every physics and geometry constant the simulation reads lives in
//! [`Tuning`]. Two presets reproduce the two classic front-ends: the
//! interval-driven DOM game and the frame-driven canvas game.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("pipe gap {gap} leaves no room for two {min_segment}px segments in a {height}px field")]
    GapTooLarge {
        gap: f32,
        min_segment: f32,
        height: f32,
    },
    #[error("jump impulse must be negative (upward), got {0}")]
    JumpNotUpward(f32),
    #[error("bird ({size}px at x={x}) does not fit a {width}x{height} field")]
    BirdOutOfField {
        size: f32,
        x: f32,
        width: f32,
        height: f32,
    },
    #[error("despawn margin must not be negative, got {0}")]
    NegativeDespawnMargin(f32),
}

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// 800x600 DOM game on a 20ms interval
    #[default]
    Classic,
    /// 400x600 canvas game on animation frames
    Canvas,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Canvas => "Canvas",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "dom" => Some(Preset::Classic),
            "canvas" => Some(Preset::Canvas),
            _ => None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        match self {
            Preset::Classic => Tuning::classic(),
            Preset::Canvas => Tuning::canvas(),
        }
    }
}

/// Physics and geometry constants.
///
/// Distances are pixels, velocities are pixels per tick, accelerations are
/// pixels per tick², angles are degrees. The y axis points down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,

    /// Fixed left edge of the bird
    pub bird_x: f32,
    /// Bird top edge at round start; vertically centred when unset
    pub start_y: Option<f32>,
    /// Side of the bird's square hitbox
    pub bird_size: f32,

    pub gravity: f32,
    /// Velocity set by a flap (negative = up)
    pub jump_impulse: f32,
    /// Velocity at round start
    pub start_impulse: f32,

    pub max_rotation: f32,
    pub min_rotation: f32,
    /// Nose-down rotation per tick while falling
    pub rotation_speed: f32,

    pub pipe_width: f32,
    pub pipe_gap: f32,
    /// Leftward scroll per tick
    pub pipe_speed: f32,
    /// Ticks between pipe spawns
    pub spawn_interval: f32,
    /// Shortest allowed top or bottom segment
    pub min_segment: f32,
    /// How far past the left edge a pipe travels before removal
    pub despawn_margin: f32,

    /// Reference ticks per second (driver rate)
    pub tick_hz: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::classic()
    }
}

impl Tuning {
    pub fn classic() -> Self {
        Self {
            field_width: 800.0,
            field_height: 600.0,
            bird_x: 100.0,
            start_y: None,
            bird_size: 40.0,
            gravity: 2.0,
            jump_impulse: -35.0,
            start_impulse: -17.5,
            max_rotation: 25.0,
            min_rotation: -20.0,
            rotation_speed: 5.0,
            pipe_width: 80.0,
            pipe_gap: 150.0,
            pipe_speed: 3.0,
            // 1500ms at 50 Hz
            spawn_interval: 75.0,
            min_segment: 50.0,
            despawn_margin: 50.0,
            tick_hz: 50.0,
        }
    }

    pub fn canvas() -> Self {
        Self {
            field_width: 400.0,
            field_height: 600.0,
            bird_x: 80.0,
            start_y: Some(300.0),
            bird_size: 20.0,
            gravity: 0.6,
            jump_impulse: -10.0,
            start_impulse: 0.0,
            max_rotation: 25.0,
            min_rotation: -20.0,
            rotation_speed: 5.0,
            pipe_width: 50.0,
            pipe_gap: 150.0,
            pipe_speed: 2.0,
            spawn_interval: 90.0,
            min_segment: 50.0,
            despawn_margin: 0.0,
            tick_hz: 60.0,
        }
    }

    /// Parse and validate a JSON tuning file; missing fields take classic values
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Bird top edge at round start
    pub fn bird_start_y(&self) -> f32 {
        self.start_y
            .unwrap_or(self.field_height / 2.0 - self.bird_size / 2.0)
    }

    /// Largest top segment a spawn may draw
    pub fn max_top_segment(&self) -> f32 {
        self.field_height - self.pipe_gap - self.min_segment
    }

    /// Seconds per reference tick
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_hz
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("field_width", self.field_width),
            ("field_height", self.field_height),
            ("bird_size", self.bird_size),
            ("gravity", self.gravity),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("pipe_speed", self.pipe_speed),
            ("spawn_interval", self.spawn_interval),
            ("tick_hz", self.tick_hz),
        ];
        for (field, value) in positive {
            // NaN fails this too
            if !(value > 0.0) {
                return Err(TuningError::NonPositive { field, value });
            }
        }

        if self.min_segment < 0.0 || self.max_top_segment() < self.min_segment {
            return Err(TuningError::GapTooLarge {
                gap: self.pipe_gap,
                min_segment: self.min_segment,
                height: self.field_height,
            });
        }

        if self.jump_impulse >= 0.0 {
            return Err(TuningError::JumpNotUpward(self.jump_impulse));
        }

        // Pipes must stay alive until their trailing edge passes the bird
        if !(self.despawn_margin >= 0.0) {
            return Err(TuningError::NegativeDespawnMargin(self.despawn_margin));
        }

        let start_y = self.bird_start_y();
        if self.bird_x < 0.0
            || self.bird_x + self.bird_size > self.field_width
            || self.bird_size >= self.field_height
            || !(start_y >= 0.0 && start_y + self.bird_size <= self.field_height)
        {
            return Err(TuningError::BirdOutOfField {
                size: self.bird_size,
                x: self.bird_x,
                width: self.field_width,
                height: self.field_height,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(Tuning::classic().validate().is_ok());
        assert!(Tuning::canvas().validate().is_ok());
    }

    #[test]
    fn test_classic_start_position() {
        // 600 / 2 - 40 / 2
        assert_eq!(Tuning::classic().bird_start_y(), 280.0);
        // Canvas game puts the bird's top edge on the centre line
        assert_eq!(Tuning::canvas().bird_start_y(), 300.0);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!(Preset::from_str("CANVAS"), Some(Preset::Canvas));
        assert_eq!(Preset::from_str("dom"), Some(Preset::Classic));
        assert_eq!(Preset::from_str("webgl"), None);
        assert_eq!(Preset::Canvas.tuning(), Tuning::canvas());
    }

    #[test]
    fn test_from_json_partial_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 1.5, "pipe_gap": 180 }"#).unwrap();
        assert_eq!(tuning.gravity, 1.5);
        assert_eq!(tuning.pipe_gap, 180.0);
        assert_eq!(tuning.field_width, 800.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_gap() {
        let tuning = Tuning {
            pipe_gap: 550.0,
            ..Tuning::classic()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::GapTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_downward_jump() {
        let tuning = Tuning {
            jump_impulse: 5.0,
            ..Tuning::canvas()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::JumpNotUpward(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_dimensions() {
        let tuning = Tuning {
            field_height: -600.0,
            ..Tuning::classic()
        };
        match tuning.validate() {
            Err(TuningError::NonPositive { field, .. }) => assert_eq!(field, "field_height"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bird_outside_field() {
        let tuning = Tuning {
            bird_x: 790.0,
            ..Tuning::classic()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::BirdOutOfField { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_despawn_margin() {
        let tuning = Tuning {
            despawn_margin: -150.0,
            ..Tuning::classic()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NegativeDespawnMargin(m)) if m == -150.0
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "despawn_margin": -1 }"#),
            Err(TuningError::NegativeDespawnMargin(_))
        ));
    }

    #[test]
    fn test_validate_rejects_start_below_floor() {
        let tuning = Tuning {
            start_y: Some(590.0),
            ..Tuning::canvas()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::BirdOutOfField { .. })
        ));
    }
}
