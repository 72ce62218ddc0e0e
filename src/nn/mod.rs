//! Feed-forward neural network inference
//!
//! Networks have a fixed topology (the shape) and flat weight/bias arrays.
//! Only inference is performed here; values arrive pre-trained.

pub mod activation;
pub mod network;

pub use activation::{Activation, sigmoid};
pub use network::{NetworkValues, NeuralNetwork, bias_count, weight_count};
