//! Configuration for both play modes and the evolution engine.
//!
//! The configuration is a human-readable JSON file with three sections. Every
//! field has a default matching the reference game constants, so a file only
//! needs to name what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::brain::Activation;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON for [`Config`].
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is present but unusable.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Complete configuration: one section per mode plus the evolution engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AI-mode world constants consumed by the generation evaluator.
    pub simulation: SimulationParams,
    /// Evolution engine tunables (opaque to the evaluator).
    pub evolution: EvolutionParams,
    /// Human-play mode constants.
    pub human: HumanParams,
}

/// World constants of the AI mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Logical ticks per second.
    pub tick_rate: u32,
    /// Playfield width.
    pub playfield_width: f64,
    /// Playfield height.
    pub playfield_height: f64,
    /// Vertical position of the ground line; agents reaching it are removed.
    pub floor_y: f64,
    /// Width of one ground tile.
    pub floor_tile_width: f64,
    /// Horizontal distance everything scrolls per tick.
    pub scroll_speed: f64,
    /// Horizontal position of every agent.
    pub agent_x: f64,
    /// Initial vertical position of every agent.
    pub agent_y: f64,
    /// Width of the bird shape.
    pub agent_width: f64,
    /// Height of the bird shape.
    pub agent_height: f64,
    /// Velocity set by a jump (negative is upward).
    pub jump_velocity: f64,
    /// Gravity coefficient of the displacement formula.
    pub gravity: f64,
    /// Largest displacement magnitude per tick.
    pub terminal_displacement: f64,
    /// Extra upward displacement applied while rising.
    pub rise_bias: f64,
    /// Tilt while rising, in degrees.
    pub max_rotation: f64,
    /// Tilt decay per tick while falling, in degrees.
    pub rotation_velocity: f64,
    /// Lowest tilt, in degrees.
    pub min_rotation: f64,
    /// Distance below the jump height within which the tilt stays pinned up.
    pub tilt_hold_distance: f64,
    /// Width of a pipe piece.
    pub pipe_width: f64,
    /// Height of a pipe piece.
    pub pipe_height: f64,
    /// Vertical gap between the top and bottom pieces.
    pub pipe_gap: f64,
    /// Lowest gap top edge (inclusive).
    pub gap_min: i32,
    /// Highest gap top edge (exclusive).
    pub gap_max: i32,
    /// Horizontal position of newly spawned pipes.
    pub spawn_x: f64,
    /// A new pipe is spawned once the last one scrolls below this position.
    pub spawn_threshold: f64,
    /// Fitness awarded to each agent for surviving a tick.
    pub survival_reward: f64,
    /// Fitness removed from an agent that hits a pipe.
    pub collision_penalty: f64,
    /// Fitness awarded to every survivor when a pipe is passed.
    pub pass_bonus: f64,
    /// Controller outputs above this value trigger a jump.
    pub jump_threshold: f64,
    /// Stop a generation once its score reaches this value.
    pub score_limit: Option<u32>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            playfield_width: 764.0,
            playfield_height: 836.0,
            floor_y: 730.0,
            floor_tile_width: 336.0,
            scroll_speed: 5.0,
            agent_x: 230.0,
            agent_y: 350.0,
            agent_width: 34.0,
            agent_height: 24.0,
            jump_velocity: -10.5,
            gravity: 3.0,
            terminal_displacement: 16.0,
            rise_bias: 2.0,
            max_rotation: 25.0,
            rotation_velocity: 20.0,
            min_rotation: -90.0,
            tilt_hold_distance: 50.0,
            pipe_width: 52.0,
            pipe_height: 320.0,
            pipe_gap: 170.0,
            gap_min: 50,
            gap_max: 450,
            spawn_x: 700.0,
            spawn_threshold: 400.0,
            survival_reward: 0.1,
            collision_penalty: 1.0,
            pass_bonus: 5.0,
            jump_threshold: 0.5,
            score_limit: Some(200),
        }
    }
}

/// Shape of the neural network pilots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkParams {
    /// Number of inputs (the observation has three values).
    pub num_inputs: usize,
    /// Hidden layer sizes, empty for a direct input-output network.
    pub hidden_layers: Vec<usize>,
    /// Number of outputs; only the first one is read.
    pub num_outputs: usize,
    /// Activation applied after every layer.
    pub activation: Activation,
    /// Initial weights are drawn uniformly from `[-weight_scale, weight_scale]`.
    pub weight_scale: f32,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            num_inputs: 3,
            hidden_layers: Vec::new(),
            num_outputs: 1,
            activation: Activation::Tanh,
            weight_scale: 1.0,
        }
    }
}

impl NetworkParams {
    /// Full layer dimensions from input to output.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(self.num_inputs);
        sizes.extend_from_slice(&self.hidden_layers);
        sizes.push(self.num_outputs);
        sizes
    }
}

/// Evolution engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionParams {
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Upper bound on generations per run.
    pub max_generations: u32,
    /// A run stops once the best fitness reaches this value.
    pub fitness_threshold: f64,
    /// Number of best genomes copied unchanged into the next generation.
    pub elitism: usize,
    /// Fraction of the population eligible as parents.
    pub survival_threshold: f64,
    /// Probability that a child is bred by crossover instead of cloning.
    pub crossover_rate: f64,
    /// Probability that an individual weight is perturbed.
    pub weight_mutate_rate: f64,
    /// Lower bound of the log-uniform mutation power.
    pub mutation_power_min: f32,
    /// Upper bound of the log-uniform mutation power.
    pub mutation_power_max: f32,
    /// Generations without improvement before non-elites are reseeded.
    pub max_stagnation: u32,
    /// Seed for the run; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Shape of each pilot's network.
    pub network: NetworkParams,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            max_generations: 50,
            fitness_threshold: 100.0,
            elitism: 2,
            survival_threshold: 0.2,
            crossover_rate: 0.5,
            weight_mutate_rate: 0.8,
            mutation_power_min: 0.002,
            mutation_power_max: 0.5,
            max_stagnation: 15,
            seed: None,
            network: NetworkParams::default(),
        }
    }
}

/// Constants of the human-play mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanParams {
    /// Logical ticks per second.
    pub tick_rate: u32,
    /// Horizontal start position of the bird.
    pub bird_x: f64,
    /// Horizontal distance everything scrolls per tick.
    pub scroll_speed: f64,
    /// Vertical gap between pipe pieces.
    pub pipe_gap: f64,
    /// Milliseconds between pipe spawns.
    pub pipe_interval_ms: u64,
    /// Largest random offset of the gap center from mid-screen.
    pub gap_offset: i32,
    /// Pipes left of this position are removed.
    pub pipe_cull_x: f64,
    /// Vertical position of the ground line.
    pub ground_y: f64,
    /// The ground scroll offset wraps after this distance.
    pub ground_period: f64,
    /// Velocity gained per tick.
    pub gravity: f64,
    /// Largest downward velocity.
    pub max_fall_speed: f64,
    /// Velocity set by a flap (negative is upward).
    pub flap_velocity: f64,
}

impl Default for HumanParams {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            bird_x: 100.0,
            scroll_speed: 4.0,
            pipe_gap: 150.0,
            pipe_interval_ms: 1200,
            gap_offset: 100,
            pipe_cull_x: -100.0,
            ground_y: 668.0,
            ground_period: 35.0,
            gravity: 0.5,
            max_fall_speed: 8.0,
            flap_velocity: -10.0,
        }
    }
}

impl Config {
    /// Loads and validates a configuration from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        let evo = &self.evolution;

        ensure(sim.tick_rate > 0, "simulation.tick_rate", "must be positive")?;
        ensure(
            sim.gap_min < sim.gap_max,
            "simulation.gap_min",
            format!("must be below gap_max ({})", sim.gap_max),
        )?;
        ensure(sim.pipe_gap > 0.0, "simulation.pipe_gap", "must be positive")?;
        ensure(sim.pipe_width > 0.0, "simulation.pipe_width", "must be positive")?;
        ensure(
            sim.terminal_displacement > 0.0,
            "simulation.terminal_displacement",
            "must be positive",
        )?;
        ensure(
            sim.agent_width > 0.0 && sim.agent_height > 0.0,
            "simulation.agent_width",
            "agent size must be positive",
        )?;
        ensure(
            sim.floor_y > sim.agent_height,
            "simulation.floor_y",
            "must leave room for an agent",
        )?;
        ensure(
            sim.floor_tile_width > 0.0,
            "simulation.floor_tile_width",
            "must be positive",
        )?;

        ensure(
            evo.population_size > 0,
            "evolution.population_size",
            "must be positive",
        )?;
        ensure(
            evo.elitism <= evo.population_size,
            "evolution.elitism",
            "cannot exceed population_size",
        )?;
        ensure(
            evo.survival_threshold > 0.0 && evo.survival_threshold <= 1.0,
            "evolution.survival_threshold",
            "must be in (0, 1]",
        )?;
        ensure(
            (0.0..=1.0).contains(&evo.crossover_rate),
            "evolution.crossover_rate",
            "must be in [0, 1]",
        )?;
        ensure(
            (0.0..=1.0).contains(&evo.weight_mutate_rate),
            "evolution.weight_mutate_rate",
            "must be in [0, 1]",
        )?;
        ensure(
            evo.mutation_power_min > 0.0 && evo.mutation_power_min < evo.mutation_power_max,
            "evolution.mutation_power_min",
            "must be positive and below mutation_power_max",
        )?;
        ensure(
            evo.network.num_inputs == 3,
            "evolution.network.num_inputs",
            "the observation has exactly 3 values",
        )?;
        ensure(
            evo.network.num_outputs >= 1,
            "evolution.network.num_outputs",
            "must be at least 1",
        )?;
        ensure(
            evo.network.hidden_layers.iter().all(|&n| n > 0),
            "evolution.network.hidden_layers",
            "layers cannot be empty",
        )?;
        ensure(
            evo.network.weight_scale >= 0.0,
            "evolution.network.weight_scale",
            "cannot be negative",
        )?;

        ensure(self.human.tick_rate > 0, "human.tick_rate", "must be positive")?;
        ensure(
            self.human.gap_offset >= 0,
            "human.gap_offset",
            "cannot be negative",
        )?;
        ensure(
            self.human.ground_period > 0.0,
            "human.ground_period",
            "must be positive",
        )?;

        Ok(())
    }
}

fn ensure(
    condition: bool,
    field: &'static str,
    reason: impl Into<String>,
) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.into(),
        })
    }
}
