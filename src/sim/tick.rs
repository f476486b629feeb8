//! Simulation tick
//!
//! Core game loop that advances simulation deterministically. The clock that
//! calls [`tick`] is not known here: `dt` is measured in reference ticks, so a
//! fixed-interval timer passes 1.0 and anything else passes its own ratio.

use rand::Rng;

use super::collision::check_collision;
use super::state::{GameEvent, GamePhase, GameState, PipePair};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap / start / restart (click, tap, key)
    pub flap: bool,
    /// Demo mode - the autopilot flies the bird
    pub autopilot: bool,
}

/// Advance the game state by `dt` ticks
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let flap = input.flap || (input.autopilot && autopilot_wants_flap(state));
    if flap {
        jump(state);
    }

    // Idle and GameOver are frozen until the next flap
    if state.phase != GamePhase::Playing {
        return;
    }

    let tuning = &state.tuning;

    state.bird.integrate(tuning.gravity, dt);
    state.bird.update_rotation(tuning, dt);

    for pipe in &mut state.pipes {
        pipe.x -= tuning.pipe_speed * dt;
    }

    // Remove offscreen pipes
    let left_bound = -tuning.despawn_margin;
    let width = tuning.pipe_width;
    state.pipes.retain(|p| p.right(width) > left_bound);

    if let Some(cause) = check_collision(state) {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::Crashed {
            cause,
            score: state.score,
        });
        return;
    }

    // Score each pair once its trailing edge is behind the bird
    let bird_x = state.bird.pos.x;
    for pipe in &mut state.pipes {
        if !pipe.passed && pipe.right(width) < bird_x {
            pipe.passed = true;
            state.score += 1;
            state.events.push(GameEvent::Scored {
                pipe_id: pipe.id,
                score: state.score,
            });
        }
    }

    state.spawn_timer += dt;
    if state.spawn_timer >= state.tuning.spawn_interval {
        state.spawn_timer -= state.tuning.spawn_interval;
        spawn_pipe(state);
    }

    state.time_ticks += 1;
}

/// Flap while playing; otherwise start a fresh round
pub fn jump(state: &mut GameState) {
    match state.phase {
        GamePhase::Playing => {
            state.bird.flap(&state.tuning);
            state.events.push(GameEvent::Flapped);
        }
        GamePhase::Idle | GamePhase::GameOver => start_round(state),
    }
}

/// Reset the field and begin playing
pub fn start_round(state: &mut GameState) {
    state.reset_field();
    let tuning = &state.tuning;
    state.bird.vel = tuning.start_impulse;
    if tuning.start_impulse < 0.0 {
        state.bird.rotation = tuning.min_rotation;
    }
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::RoundStarted);
}

/// Return to the idle screen with an empty field
pub fn reset(state: &mut GameState) {
    state.reset_field();
    state.phase = GamePhase::Idle;
}

/// Spawn a pipe pair at the right edge with a random gap height
pub fn spawn_pipe(state: &mut GameState) -> u32 {
    let min = state.tuning.min_segment;
    let max = state.tuning.max_top_segment();
    let top = if max > min {
        state.rng.random_range(min..=max)
    } else {
        min
    };
    spawn_pipe_with_top(state, top)
}

/// Spawn a pipe pair at the right edge with a fixed top segment
pub fn spawn_pipe_with_top(state: &mut GameState, top: f32) -> u32 {
    let id = state.next_pipe_id();
    let pipe = PipePair::new(id, state.tuning.field_width, top, &state.tuning);
    state.pipes.push(pipe);
    state.events.push(GameEvent::PipeSpawned { id });
    id
}

/// Demo AI: keep the bird's bottom edge above a line in the lower part of
/// the next gap, flapping only once it has stopped rising.
fn autopilot_wants_flap(state: &GameState) -> bool {
    if state.phase != GamePhase::Playing {
        return state.phase == GamePhase::Idle;
    }

    let tuning = &state.tuning;
    let bird = &state.bird;

    let target = state
        .pipes
        .iter()
        .find(|p| p.right(tuning.pipe_width) >= bird.pos.x)
        .map(|p| p.bottom_y(tuning.field_height) - tuning.pipe_gap * 0.25)
        .unwrap_or(tuning.field_height * 0.6);

    bird.vel >= 0.0 && bird.pos.y + tuning.bird_size > target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CrashCause;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const FLAP: TickInput = TickInput {
        flap: true,
        autopilot: false,
    };

    fn idle() -> TickInput {
        TickInput::default()
    }

    /// Playing state with the bird at rest at its start height
    fn playing(tuning: Tuning) -> GameState {
        let mut state = GameState::new(12345, tuning);
        start_round(&mut state);
        state.bird.vel = 0.0;
        state.bird.rotation = 0.0;
        state.events.clear();
        state
    }

    #[test]
    fn test_tick_idle_to_playing() {
        let mut state = GameState::new(12345, Tuning::classic());
        assert_eq!(state.phase, GamePhase::Idle);

        // Ticking without input stays idle and frozen
        let y = state.bird.pos.y;
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.bird.pos.y, y);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &FLAP, 1.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.drain_events()[0], GameEvent::RoundStarted);
    }

    #[test]
    fn test_round_start_hop() {
        let mut state = GameState::new(1, Tuning::classic());
        jump(&mut state);
        assert_eq!(state.bird.vel, -17.5);
        assert_eq!(state.bird.rotation, -20.0);

        let mut state = GameState::new(1, Tuning::canvas());
        jump(&mut state);
        assert_eq!(state.bird.vel, 0.0);
        assert_eq!(state.bird.rotation, 0.0);
    }

    #[test]
    fn test_free_fall_five_ticks() {
        let mut state = playing(Tuning::classic());
        assert_eq!(state.bird.pos.y, 280.0);

        for _ in 0..5 {
            tick(&mut state, &idle(), 1.0);
        }
        assert_eq!(state.bird.vel, 10.0);
        assert_eq!(state.bird.pos.y, 280.0 + 2.0 + 4.0 + 6.0 + 8.0 + 10.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_velocity_grows_by_gravity_each_tick() {
        let mut state = playing(Tuning::canvas());
        for _ in 0..20 {
            let before = state.bird.vel;
            tick(&mut state, &idle(), 1.0);
            assert!((state.bird.vel - before - 0.6).abs() < 1e-4);
        }
    }

    #[test]
    fn test_jump_sets_impulse_regardless_of_velocity() {
        for prior in [-50.0, -10.0, 0.0, 7.5, 40.0] {
            let mut state = playing(Tuning::classic());
            state.bird.vel = prior;
            jump(&mut state);
            assert_eq!(state.bird.vel, -35.0);
            assert_eq!(state.bird.rotation, -20.0);
        }
    }

    #[test]
    fn test_flap_applies_before_gravity() {
        let mut state = playing(Tuning::classic());
        tick(&mut state, &FLAP, 1.0);
        assert_eq!(state.bird.vel, -33.0);
        assert_eq!(state.bird.pos.y, 280.0 - 33.0);
        assert_eq!(state.drain_events(), vec![GameEvent::Flapped]);
    }

    #[test]
    fn test_rotation_tilts_down_while_falling() {
        let mut state = playing(Tuning::classic());
        for _ in 0..10 {
            tick(&mut state, &idle(), 1.0);
        }
        // First two ticks are not yet "falling" (vel <= 2g)
        assert_eq!(state.bird.rotation, 25.0);

        let mut state = playing(Tuning::classic());
        tick(&mut state, &idle(), 1.0);
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.bird.rotation, 0.0);
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.bird.rotation, 5.0);
    }

    #[test]
    fn test_spawn_geometry() {
        let mut state = playing(Tuning::classic());
        let id = spawn_pipe_with_top(&mut state, 200.0);
        let pipe = state.pipes.iter().find(|p| p.id == id).unwrap();
        assert_eq!(pipe.bottom, 250.0);
        assert_eq!(pipe.top + state.tuning.pipe_gap + pipe.bottom, 600.0);
        assert_eq!(pipe.x, 800.0);
        assert!(!pipe.passed);
    }

    #[test]
    fn test_spawn_on_interval() {
        let mut state = playing(Tuning::canvas());
        // Keep the bird afloat while pipes arrive
        for i in 0..90 {
            let input = TickInput {
                flap: state.bird.pos.y > 300.0,
                ..Default::default()
            };
            tick(&mut state, &input, 1.0);
            if i < 89 {
                assert!(state.pipes.is_empty(), "spawned early at tick {i}");
            }
        }
        assert_eq!(state.pipes.len(), 1);
        assert_eq!(state.pipes[0].x, 400.0);
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_pipes_scroll_and_despawn() {
        let mut state = playing(Tuning::canvas());
        spawn_pipe_with_top(&mut state, 200.0);
        state.pipes[0].x = -48.0;
        state.pipes[0].passed = true;

        state.bird.vel = -0.6; // hover
        tick(&mut state, &idle(), 1.0);
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_score_once_per_pipe() {
        let mut state = playing(Tuning::classic());
        // Gap [200, 350) holds the bird at [280, 320)
        spawn_pipe_with_top(&mut state, 200.0);
        // Trailing edge at 101: one tick (speed 3) moves it to 98 < 100
        state.pipes[0].x = 21.0;

        state.bird.vel = -2.0; // hover for one tick
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.score, 1);
        assert!(state.pipes[0].passed);

        for _ in 0..3 {
            state.bird.vel = -2.0;
            tick(&mut state, &idle(), 1.0);
        }
        assert_eq!(state.score, 1);

        let scored: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Scored { .. }))
            .collect();
        assert_eq!(scored, vec![GameEvent::Scored { pipe_id: 1, score: 1 }]);
    }

    #[test]
    fn test_ceiling_ends_round_same_tick() {
        let mut state = playing(Tuning::classic());
        state.bird.pos.y = 5.0;
        state.bird.vel = -10.0;
        tick(&mut state, &idle(), 1.0);
        assert!(state.bird.pos.y < 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Crashed {
                cause: CrashCause::Ceiling,
                score: 0
            }]
        );
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut state = playing(Tuning::classic());
        spawn_pipe_with_top(&mut state, 200.0);
        state.bird.pos.y = 590.0;
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.phase, GamePhase::GameOver);

        let y = state.bird.pos.y;
        let vel = state.bird.vel;
        let pipe_x = state.pipes[0].x;
        let ticks = state.time_ticks;
        for _ in 0..10 {
            tick(&mut state, &idle(), 1.0);
        }
        assert_eq!(state.bird.pos.y, y);
        assert_eq!(state.bird.vel, vel);
        assert_eq!(state.pipes[0].x, pipe_x);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = playing(Tuning::classic());
        spawn_pipe_with_top(&mut state, 200.0);
        state.score = 4;
        state.phase = GamePhase::GameOver;

        jump(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert!(state.pipes.is_empty());
        assert_eq!(state.bird.pos.y, 280.0);
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_pipe_scores_before_despawn() {
        let mut state = playing(Tuning::canvas());
        let id = spawn_pipe_with_top(&mut state, 200.0);
        state.pipes[0].x = 150.0;

        // Hover inside the gap until the pipe is gone
        for _ in 0..120 {
            state.bird.vel = -state.tuning.gravity;
            tick(&mut state, &idle(), 1.0);
            if state.pipes.iter().all(|p| p.id != id) {
                break;
            }
        }
        assert!(state.pipes.iter().all(|p| p.id != id));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.drain_events().contains(&GameEvent::Scored {
            pipe_id: id,
            score: 1
        }));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut state = playing(Tuning::canvas());
        spawn_pipe(&mut state);
        reset(&mut state);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_pipe_collision_ends_round() {
        let mut state = playing(Tuning::classic());
        spawn_pipe_with_top(&mut state, 400.0);
        // Pipe moves from 143 to 140 - still no overlap with bird [100, 140)
        state.pipes[0].x = 143.0;
        state.bird.vel = -2.0;
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.phase, GamePhase::Playing);

        // Next tick it reaches 137 and the bird is above the gap
        state.bird.vel = -2.0;
        tick(&mut state, &idle(), 1.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(matches!(
            state.drain_events().last(),
            Some(GameEvent::Crashed {
                cause: CrashCause::TopPipe { id: 1 },
                ..
            })
        ));
    }

    #[test]
    fn test_fractional_dt_integrates() {
        let mut state = playing(Tuning::classic());
        tick(&mut state, &idle(), 0.5);
        assert_eq!(state.bird.vel, 1.0);
        assert_eq!(state.bird.pos.y, 280.5);
    }

    #[test]
    fn test_autopilot_starts_and_flaps() {
        let mut state = GameState::new(5, Tuning::canvas());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1.0);
        assert_eq!(state.phase, GamePhase::Playing);

        let mut flapped = false;
        for _ in 0..120 {
            tick(&mut state, &input, 1.0);
            flapped |= state
                .drain_events()
                .iter()
                .any(|e| *e == GameEvent::Flapped);
            if !state.is_playing() {
                break;
            }
        }
        assert!(flapped);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Tuning::canvas());
        let mut state2 = GameState::new(99999, Tuning::canvas());

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state1, &input, 1.0);
            tick(&mut state2, &input, 1.0);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.pipes.len(), state2.pipes.len());
        for (a, b) in state1.pipes.iter().zip(&state2.pipes) {
            assert_eq!(a.top, b.top);
        }
        assert_eq!(state1.bird.pos.y, state2.bird.pos.y);
    }

    #[test]
    fn test_serialized_state_resumes_identically() {
        let mut state = playing(Tuning::canvas());
        for _ in 0..3 {
            spawn_pipe(&mut state);
        }
        let json = serde_json::to_string(&state).unwrap();
        let mut restored: GameState = serde_json::from_str(&json).unwrap();

        let a = spawn_pipe(&mut state);
        let b = spawn_pipe(&mut restored);
        assert_eq!(a, b);
        assert_eq!(state.pipes.last().unwrap().top, restored.pipes.last().unwrap().top);
    }

    proptest! {
        #[test]
        fn prop_spawned_pipes_fill_field(seed in any::<u64>(), canvas in any::<bool>()) {
            let tuning = if canvas { Tuning::canvas() } else { Tuning::classic() };
            let mut state = GameState::new(seed, tuning);
            for _ in 0..16 {
                spawn_pipe(&mut state);
            }
            let t = &state.tuning;
            for pipe in &state.pipes {
                prop_assert!(pipe.top >= t.min_segment);
                prop_assert!(pipe.bottom >= t.min_segment - 1e-3);
                prop_assert!((pipe.top + t.pipe_gap + pipe.bottom - t.field_height).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_score_never_exceeds_pipes_passed(seed in any::<u64>(), flaps in prop::collection::vec(any::<bool>(), 1..400)) {
            let mut state = GameState::new(seed, Tuning::canvas());
            let mut last_score = 0;
            for flap in flaps {
                let input = TickInput { flap, autopilot: false };
                let was_playing = state.is_playing();
                tick(&mut state, &input, 1.0);
                if was_playing && state.is_playing() {
                    prop_assert!(state.score >= last_score);
                    prop_assert!(state.score - last_score <= 1);
                }
                let passed = state.pipes.iter().filter(|p| p.passed).count() as u32;
                prop_assert!(passed <= state.score);
                last_score = state.score;
            }
        }
    }
}
