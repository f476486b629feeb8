//! Simulation driving
//!
//! The simulation only knows ticks. A [`Session`] turns whatever clock the
//! platform offers into ticks: an animation-frame callback hands it elapsed
//! seconds ([`Session::frame`]), an interval timer calls [`Session::interval`]
//! once per period. Stopping a session makes every later call a no-op, so a
//! callback that fires after teardown cannot mutate the game.

use crate::consts::{MAX_FRAME_SECS, MAX_SUBSTEPS, TICK_DT};
use crate::sim::{GameEvent, GameState, Snapshot, TickInput, tick};
use crate::tuning::Tuning;

/// Fixed timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    accumulator: f32,
    step_secs: f32,
    max_substeps: u32,
}

impl FixedStep {
    pub fn new(step_secs: f32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            step_secs,
            max_substeps,
        }
    }

    /// Feed elapsed wall time; returns how many steps to run now
    pub fn advance(&mut self, frame_secs: f32) -> u32 {
        self.accumulator += frame_secs.clamp(0.0, MAX_FRAME_SECS);

        let mut substeps = 0;
        while self.accumulator >= self.step_secs && substeps < self.max_substeps {
            self.accumulator -= self.step_secs;
            substeps += 1;
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// A running game: state, latched input, and clock
#[derive(Debug)]
pub struct Session {
    state: GameState,
    input: TickInput,
    clock: FixedStep,
    running: bool,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let clock = FixedStep::new(tuning.tick_secs(), MAX_SUBSTEPS);
        Self {
            state: GameState::new(seed, tuning),
            input: TickInput::default(),
            clock,
            running: true,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Latch a flap for the next tick
    pub fn press(&mut self) {
        if self.running {
            self.input.flap = true;
        }
    }

    pub fn autopilot(&self) -> bool {
        self.input.autopilot
    }

    pub fn set_autopilot(&mut self, on: bool) {
        if self.running {
            self.input.autopilot = on;
            log::info!("Autopilot: {}", on);
        }
    }

    /// Animation-frame driver: run as many fixed ticks as `frame_secs` covers
    pub fn frame(&mut self, frame_secs: f32) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        for _ in 0..self.clock.advance(frame_secs) {
            self.step();
        }
        self.drain()
    }

    /// Interval driver: exactly one tick
    pub fn interval(&mut self) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        self.step();
        self.drain()
    }

    /// Stop for good; later calls do nothing
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.input = TickInput::default();
            self.clock.reset();
            log::info!("Session stopped at tick {}", self.state.time_ticks);
        }
    }

    fn step(&mut self) {
        tick(&mut self.state, &self.input, TICK_DT);
        // Clear one-shot inputs after processing
        self.input.flap = false;
    }

    fn drain(&mut self) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            log_event(event);
        }
        events
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::RoundStarted => log::info!("Round started"),
        GameEvent::Crashed { cause, score } => {
            log::info!("Crashed ({:?}), final score {}", cause, score)
        }
        GameEvent::Scored { pipe_id, score } => {
            log::debug!("Passed pipe {}, score {}", pipe_id, score)
        }
        GameEvent::PipeSpawned { id } => log::debug!("Spawned pipe {}", id),
        GameEvent::Flapped => log::trace!("Flap"),
    }
}
