//! # Flappy Evo - Neuro-evolution for a side-scrolling avoidance game
//!
//! A "flappy bird" clone with two play modes: a human-controlled mode and an
//! automated mode where a population of neural network pilots is evolved to
//! fly through a field of paired-gap pipes.
//!
//! ## Features
//!
//! - Deterministic, frame-stepped generation evaluator (injectable RNG)
//! - Exact shape collision between birds and pipes
//! - Feed-forward neural network pilots (MLP)
//! - Genetic algorithm evolution (elitism, crossover, mutation, stagnation reseeding)
//! - Human-play mode sharing the same obstacle and floor types
//! - Real-time visualization with egui/macroquad, headless trainer binary
//!
//! ## Core Modules
//!
//! - [`simulation::generation`] - The per-generation evaluation loop
//! - [`simulation::agent`] - Bird kinematics
//! - [`simulation::obstacle`] - Pipe placement and collision
//! - [`simulation::evolution`] - Population and reproduction
//! - [`simulation::params`] - Configuration file

/// Core simulation logic and data structures.
pub mod simulation {
    /// Bird kinematics shared by both play modes.
    pub mod agent;
    /// Neural network implementation for agent pilots.
    pub mod brain;
    /// Population management, reproduction and genomes.
    pub mod evolution;
    /// Scrolling ground strip.
    pub mod floor;
    /// The generation evaluator (core control loop).
    pub mod generation;
    /// Human-play game state machine.
    pub mod human;
    /// Paired-gap pipes.
    pub mod obstacle;
    /// Configuration loaded from a JSON file.
    pub mod params;
    /// Occupied regions used for collision tests.
    pub mod shape;
    /// Per-generation fitness reports.
    pub mod stats;
}
