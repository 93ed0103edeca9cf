//! Neural network implementation for agent pilots.
//!
//! A brain is a stack of fully connected layers. It supports the genetic
//! operators the evolution engine needs (mutation and weighted crossover) and
//! becomes a [`Controller`] once paired with an activation function.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generation::{Controller, Observation};
use super::params::NetworkParams;

pub mod mlp;

pub use mlp::Mlp;

/// Activation applied after every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Hyperbolic tangent.
    #[default]
    Tanh,
    /// Logistic sigmoid.
    Sigmoid,
    /// Rectified linear unit.
    Relu,
}

impl Activation {
    /// Applies the activation to a single value.
    #[inline]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Tanh => x.tanh(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::Relu => x.max(0.0),
        }
    }
}

/// Feed-forward network, ordered from input to output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain {
    /// Ordered layers from input to output.
    pub layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a brain with random weights for the given layer dimensions.
    pub fn new_random<R: Rng>(layer_sizes: &[usize], scale: f32, rng: &mut R) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], scale, rng))
            .collect();

        Self { layers }
    }

    /// Runs a forward pass through every layer.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>, activation: Activation) -> Array1<f32> {
        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output, activation);
        }
        output
    }

    /// Mutates all parameters in the brain.
    pub fn mutate<R: Rng>(&mut self, rate: f64, power: f32, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(rate, power, rng);
        }
    }

    /// Creates a new brain by weighted averaging two parent brains.
    /// `weight1` is the weight of `parent1`, `parent2` gets `1.0 - weight1`.
    /// Parents of different shapes yield a clone of `parent1`.
    pub fn crossover_weighted(parent1: &Brain, parent2: &Brain, weight1: f32) -> Self {
        let same_shape = parent1.layers.len() == parent2.layers.len()
            && parent1
                .layers
                .iter()
                .zip(&parent2.layers)
                .all(|(a, b)| a.weights.dim() == b.weights.dim());
        if !same_shape {
            return parent1.clone();
        }

        let layers = parent1
            .layers
            .iter()
            .zip(&parent2.layers)
            .map(|(layer1, layer2)| Mlp::crossover_weighted(layer1, layer2, weight1))
            .collect();
        Self { layers }
    }

    /// Calculates the Euclidean distance between two brains of the same shape.
    pub fn distance(brain1: &Brain, brain2: &Brain) -> f32 {
        let mut sum_sq = 0.0;
        for (layer1, layer2) in brain1.layers.iter().zip(&brain2.layers) {
            for (w1, w2) in layer1.weights.iter().zip(layer2.weights.iter()) {
                sum_sq += (w1 - w2).powi(2);
            }
            for (b1, b2) in layer1.biases.iter().zip(layer2.biases.iter()) {
                sum_sq += (b1 - b2).powi(2);
            }
        }
        sum_sq.sqrt()
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }
}

/// A brain wired up as a decision collaborator.
#[derive(Debug, Clone)]
pub struct NeuralController {
    brain: Brain,
    activation: Activation,
}

impl NeuralController {
    /// Pairs a brain with the activation from the network parameters.
    pub fn new(brain: &Brain, network: &NetworkParams) -> Self {
        Self {
            brain: brain.clone(),
            activation: network.activation,
        }
    }

    /// The wrapped brain.
    pub fn brain(&self) -> &Brain {
        &self.brain
    }

    /// Activation applied after every layer.
    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Controller for NeuralController {
    fn activate(&self, observation: &Observation) -> f64 {
        let inputs = Array1::from_iter(observation.to_array().map(|v| v as f32));
        let output = self.brain.think(&inputs, self.activation);
        output.first().copied().map_or(0.0, f64::from)
    }
}
