//! Multi-layer perceptron implementation.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Activation;

/// A single fully connected layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Creates a layer with weights and biases drawn from `[-scale, scale]`.
    pub fn new_random<R: Rng>(input_size: usize, output_size: usize, scale: f32, rng: &mut R) -> Self {
        Self {
            weights: Array2::from_shape_fn((output_size, input_size), |_| {
                rng.random_range(-scale..=scale)
            }),
            biases: Array1::from_shape_fn(output_size, |_| rng.random_range(-scale..=scale)),
        }
    }

    /// Number of inputs the layer expects.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Performs a forward pass followed by the activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>, activation: Activation) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;
        output.mapv_inplace(|x| activation.apply(x));
        output
    }

    /// Perturbs each weight and bias with probability `rate` by uniform
    /// noise in `[-power, power]`.
    pub fn mutate<R: Rng>(&mut self, rate: f64, power: f32, rng: &mut R) {
        let mut perturb = |value: &mut f32| {
            if rng.random_bool(rate) {
                *value += rng.random_range(-power..=power);
            }
        };
        self.weights.iter_mut().for_each(&mut perturb);
        self.biases.iter_mut().for_each(&mut perturb);
    }

    /// Creates a new layer by weighted averaging two parent layers.
    pub fn crossover_weighted(parent1: &Mlp, parent2: &Mlp, weight1: f32) -> Self {
        let weight2 = 1.0 - weight1;
        Self {
            weights: &parent1.weights * weight1 + &parent2.weights * weight2,
            biases: &parent1.biases * weight1 + &parent2.biases * weight2,
        }
    }
}
