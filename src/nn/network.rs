//! Network topology, flat value storage and the forward pass

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Activation;
use crate::error::{SimError, SimResult};

/// Number of weights implied by a shape: Σ shape[i]·shape[i+1]
pub fn weight_count(shape: &[usize]) -> usize {
    shape.windows(2).map(|w| w[0] * w[1]).sum()
}

/// Number of biases implied by a shape (input layer included)
pub fn bias_count(shape: &[usize]) -> usize {
    shape.iter().sum()
}

/// Number of biases read during inference (input layer excluded)
pub fn used_bias_count(shape: &[usize]) -> usize {
    shape.iter().skip(1).sum()
}

/// Persisted network values
///
/// The input layer carries bias entries even though inference never reads
/// them, so stored documents keep one bias per node. Documents that omit
/// the input-layer entries are accepted as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkValues {
    pub shape: Vec<usize>,
    pub weights: Vec<f64>,
    pub bias: Vec<f64>,
}

impl NetworkValues {
    /// All-zero values for a shape
    pub fn zeroed(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            weights: vec![0.0; weight_count(shape)],
            bias: vec![0.0; bias_count(shape)],
        }
    }

    /// Check that the array lengths match what the shape implies
    pub fn validate(&self) -> SimResult<()> {
        validate_shape(&self.shape)?;
        let expected = weight_count(&self.shape);
        if self.weights.len() != expected {
            return Err(SimError::ValueCountMismatch {
                what: "weights",
                expected,
                found: self.weights.len(),
            });
        }
        let expected = bias_count(&self.shape);
        if self.bias.len() != expected && self.bias.len() != used_bias_count(&self.shape) {
            return Err(SimError::ValueCountMismatch {
                what: "bias",
                expected,
                found: self.bias.len(),
            });
        }
        Ok(())
    }
}

/// Bias with one entry per node, zero-filling a missing input layer
fn full_bias(shape: &[usize], bias: Vec<f64>) -> Vec<f64> {
    if bias.len() == bias_count(shape) {
        return bias;
    }
    let mut full = vec![0.0; shape[0]];
    full.extend(bias);
    full
}

fn validate_shape(shape: &[usize]) -> SimResult<()> {
    if shape.len() < 2 {
        return Err(SimError::InvalidShape(format!(
            "{shape:?} needs at least an input and an output layer"
        )));
    }
    if shape.contains(&0) {
        return Err(SimError::InvalidShape(format!("{shape:?} has an empty layer")));
    }
    Ok(())
}

/// Fixed-topology feed-forward network
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    shape: Vec<usize>,
    weights: Vec<f64>,
    bias: Vec<f64>,
    activation: Activation,
}

impl NeuralNetwork {
    /// Create a zero-valued network with the given layer sizes
    pub fn new(shape: &[usize]) -> SimResult<Self> {
        validate_shape(shape)?;
        Ok(Self {
            shape: shape.to_vec(),
            weights: vec![0.0; weight_count(shape)],
            bias: vec![0.0; bias_count(shape)],
            activation: Activation::default(),
        })
    }

    /// Build a network straight from stored values
    pub fn from_values(values: NetworkValues) -> SimResult<Self> {
        let mut network = Self::new(&values.shape)?;
        network.load_values(values)?;
        Ok(network)
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Number of nodes in each layer, index 0 is the input layer
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn input_size(&self) -> usize {
        self.shape[0]
    }

    pub fn output_size(&self) -> usize {
        self.shape[self.shape.len() - 1]
    }

    /// Snapshot the current values for storage
    pub fn package_values(&self) -> NetworkValues {
        NetworkValues {
            shape: self.shape.clone(),
            weights: self.weights.clone(),
            bias: self.bias.clone(),
        }
    }

    /// Replace weights and bias. Nothing changes unless the values fit.
    pub fn load_values(&mut self, values: NetworkValues) -> SimResult<()> {
        if values.shape != self.shape {
            return Err(SimError::ShapeMismatch {
                expected: self.shape.clone(),
                found: values.shape,
            });
        }
        values.validate()?;
        self.bias = full_bias(&self.shape, values.bias);
        self.weights = values.weights;
        Ok(())
    }

    /// Fill weights uniformly in [-1, 1] and zero the bias
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        for w in &mut self.weights {
            *w = rng.random_range(-1.0..=1.0);
        }
        self.bias.fill(0.0);
    }

    /// Index of the weight from node `from` in `layer` to node `to` in `layer + 1`
    fn weight_index(&self, layer: usize, from: usize, to: usize) -> usize {
        weight_count(&self.shape[..=layer]) + from * self.shape[layer + 1] + to
    }

    /// Index of the bias of `node` in `layer`
    fn bias_index(&self, layer: usize, node: usize) -> usize {
        bias_count(&self.shape[..layer]) + node
    }

    /// Run a forward pass and return the output layer
    pub fn calculate(&self, input: &[f64]) -> SimResult<Vec<f64>> {
        if input.len() != self.input_size() {
            return Err(SimError::InputSizeMismatch {
                expected: self.input_size(),
                found: input.len(),
            });
        }

        let mut previous = input.to_vec();
        for layer in 1..self.shape.len() {
            let outputs = (0..self.shape[layer])
                .map(|node| {
                    let sum: f64 = previous
                        .iter()
                        .enumerate()
                        .map(|(from, value)| value * self.weights[self.weight_index(layer - 1, from, node)])
                        .sum();
                    self.activation
                        .apply(sum, self.bias[self.bias_index(layer, node)])
                })
                .collect();
            previous = outputs;
        }
        Ok(previous)
    }
}
