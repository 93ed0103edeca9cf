//! Bird kinematics.
//!
//! The AI mode uses a quadratic displacement model measured from the last
//! jump; the human mode drives the same state with a per-tick velocity
//! integration ([`Agent::glide`]). Tilt is a cosmetic proxy derived from the
//! motion, not simulated angular physics.

use serde::{Deserialize, Serialize};

use super::params::SimulationParams;

/// A simulated bird.
///
/// Only the vertical position changes; the horizontal position is fixed for
/// the agent's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Horizontal position of the bounding box's left edge.
    pub x: f64,
    /// Vertical position of the bounding box's top edge.
    pub y: f64,
    /// Vertical velocity (negative is upward).
    pub velocity: f64,
    /// Tilt in degrees, positive is nose-up.
    pub tilt: f64,
    /// Ticks elapsed since the last jump.
    pub tick_count: u32,
    /// Vertical position at the last jump.
    pub jump_height: f64,
    alive: bool,
}

impl Agent {
    /// Creates an agent at rest.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            velocity: 0.0,
            tilt: 0.0,
            tick_count: 0,
            jump_height: y,
            alive: true,
        }
    }

    /// Jumps: resets the displacement clock with an upward velocity.
    pub fn jump(&mut self, params: &SimulationParams) {
        self.velocity = params.jump_velocity;
        self.tick_count = 0;
        self.jump_height = self.y;
    }

    /// Advances one tick and returns the applied displacement.
    pub fn advance(&mut self, params: &SimulationParams) -> f64 {
        self.tick_count += 1;
        let t = f64::from(self.tick_count);

        let mut displacement = self.velocity * t + 0.5 * params.gravity * t * t;
        if displacement.abs() > params.terminal_displacement {
            displacement = params.terminal_displacement.copysign(displacement);
        }
        if displacement < 0.0 {
            displacement -= params.rise_bias;
        }

        self.y += displacement;

        if displacement < 0.0 || self.y < self.jump_height + params.tilt_hold_distance {
            self.tilt = self.tilt.max(params.max_rotation);
        } else {
            self.tilt = (self.tilt - params.rotation_velocity).max(params.min_rotation);
        }

        displacement
    }

    /// Human-mode gravity step: accelerates downward up to `max_fall_speed`.
    pub fn glide(&mut self, gravity: f64, max_fall_speed: f64) {
        self.velocity = (self.velocity + gravity).min(max_fall_speed);
    }

    /// Human-mode flap: sets the velocity directly.
    pub fn flap(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Checks if the agent is still in play.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Removes the agent from play.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// True when the agent left the playfield through the top or the floor.
    pub fn out_of_bounds(&self, floor_y: f64, height: f64) -> bool {
        self.y < 0.0 || self.y + height >= floor_y
    }

    /// Origin of the agent's occupied region.
    pub fn origin(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}
