//! Human-play mode.
//!
//! A single bird driven by edge-triggered input. It shares the pipe, floor
//! and collision types with the AI mode but integrates velocity per tick
//! instead of the displacement formula, spawns pipes on a wall-clock
//! interval (the first one on the first flying tick) and scores when the
//! bird leaves a pipe's right edge.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::agent::Agent;
use super::obstacle::Obstacle;
use super::params::{Config, HumanParams, SimulationParams};
use super::shape::Shapes;

/// Where a human game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first flap.
    Ready,
    /// In play.
    Flying,
    /// Crashed. The bird still drops to the ground.
    GameOver,
}

/// State of a human-play session.
#[derive(Debug, Clone)]
pub struct HumanGame {
    params: HumanParams,
    world: SimulationParams,
    shapes: Shapes,
    bird: Agent,
    pipes: Vec<Obstacle>,
    ground_scroll: f64,
    score: u32,
    phase: Phase,
    passing: bool,
    held: bool,
    last_pipe_ms: u64,
}

impl HumanGame {
    /// Creates a game in the [`Phase::Ready`] state.
    pub fn new(config: &Config, now_ms: u64) -> Self {
        let world = config.simulation.clone();
        let params = config.human.clone();
        Self {
            shapes: Shapes::from_params(&world),
            bird: Self::start_bird(&params, &world),
            pipes: Vec::new(),
            ground_scroll: 0.0,
            score: 0,
            phase: Phase::Ready,
            passing: false,
            held: false,
            last_pipe_ms: now_ms.saturating_sub(params.pipe_interval_ms + 1),
            params,
            world,
        }
    }

    fn start_bird(params: &HumanParams, world: &SimulationParams) -> Agent {
        Agent::new(params.bird_x, (world.playfield_height / 2.0).trunc())
    }

    /// Feeds the current state of the flap button.
    ///
    /// Only the press edge flaps; holding the button does nothing more.
    pub fn input(&mut self, pressed: bool) {
        let edge = pressed && !self.held;
        self.held = pressed;

        if edge && self.phase != Phase::GameOver {
            self.bird.flap(self.params.flap_velocity);
            if self.phase == Phase::Ready {
                debug!("human game started");
            }
            self.phase = Phase::Flying;
        }
    }

    /// Advances one tick. `now_ms` is the wall clock used for pipe spawning.
    pub fn update<R: Rng>(&mut self, now_ms: u64, rng: &mut R) {
        let ground = self.params.ground_y;

        if self.phase != Phase::Ready {
            self.bird.glide(self.params.gravity, self.params.max_fall_speed);
            if self.bird_bottom() < ground {
                self.bird.y += self.bird.velocity.trunc();
            }
        }

        self.bird.tilt = match self.phase {
            Phase::GameOver => -90.0,
            _ => -2.0 * self.bird.velocity,
        };

        self.track_score();

        if self.phase == Phase::Flying
            && (self.bird.y < 0.0
                || self.pipes.iter().any(|p| p.collides(&self.bird, &self.shapes)))
        {
            debug!(score = self.score, "human game over");
            self.phase = Phase::GameOver;
        }
        if self.bird_bottom() >= ground && self.phase == Phase::Flying {
            debug!(score = self.score, "human game over on the ground");
            self.phase = Phase::GameOver;
        }

        if self.phase == Phase::Flying {
            if now_ms.saturating_sub(self.last_pipe_ms) > self.params.pipe_interval_ms {
                self.spawn_pipe(rng);
                self.last_pipe_ms = now_ms;
            }

            self.ground_scroll -= self.params.scroll_speed;
            if self.ground_scroll.abs() > self.params.ground_period {
                self.ground_scroll = 0.0;
            }

            for pipe in &mut self.pipes {
                pipe.advance(self.params.scroll_speed);
            }
            let cull_x = self.params.pipe_cull_x;
            self.pipes.retain(|p| p.x >= cull_x);
        }
    }

    /// Starts over: clears pipes, resets the bird and the score.
    pub fn restart(&mut self, now_ms: u64) {
        self.pipes.clear();
        self.bird = Self::start_bird(&self.params, &self.world);
        self.score = 0;
        self.passing = false;
        self.ground_scroll = 0.0;
        self.last_pipe_ms = now_ms.saturating_sub(self.params.pipe_interval_ms + 1);
        self.phase = Phase::Ready;
    }

    fn track_score(&mut self) {
        let Some(first) = self.pipes.first() else {
            return;
        };
        let pipe_right = first.x + self.world.pipe_width;
        let bird_right = self.bird.x + self.world.agent_width;

        if !self.passing && self.bird.x > first.x && bird_right < pipe_right {
            self.passing = true;
        }
        if self.passing && self.bird.x > pipe_right {
            self.score += 1;
            self.passing = false;
            trace!(score = self.score, "pipe passed");
        }
    }

    fn spawn_pipe<R: Rng>(&mut self, rng: &mut R) {
        let offset = self.params.gap_offset;
        let center = (self.world.playfield_height / 2.0).trunc()
            + f64::from(rng.random_range(-offset..=offset));
        self.pipes.push(Obstacle::centered(
            self.world.playfield_width,
            center,
            self.params.pipe_gap,
            self.world.pipe_height,
        ));
        trace!(center, "pipe spawned");
    }

    fn bird_bottom(&self) -> f64 {
        self.bird.y + self.world.agent_height
    }

    /// The player's bird.
    pub fn bird(&self) -> &Agent {
        &self.bird
    }

    /// Live pipes, oldest first.
    pub fn pipes(&self) -> &[Obstacle] {
        &self.pipes
    }

    /// Pipes passed.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Horizontal offset of the ground texture, in `(-ground_period, 0]`.
    pub fn ground_scroll(&self) -> f64 {
        self.ground_scroll
    }

    /// Human-mode constants.
    pub fn params(&self) -> &HumanParams {
        &self.params
    }

    /// Playfield and sprite dimensions.
    pub fn world(&self) -> &SimulationParams {
        &self.world
    }
}
