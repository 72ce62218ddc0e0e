//! Node activation functions

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Activation applied to `sum + bias` at every non-input node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    /// Logistic sigmoid 1/(1+e^-x)
    #[default]
    Sigmoid,
    /// Cheap sigmoid approximation 0.5·(x/(1+|x|)+1)
    SigmoidEstimate,
    /// Step: 1 when x ≥ 0
    Binary,
    Linear,
}

impl Activation {
    #[inline]
    pub fn apply(self, sum: f64, bias: f64) -> f64 {
        let x = sum + bias;
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::SigmoidEstimate => 0.5 * (x / (1.0 + x.abs()) + 1.0),
            Activation::Binary => {
                if x >= 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Linear => x,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Activation::Sigmoid => "sigmoid",
            Activation::SigmoidEstimate => "sigmoid-estimate",
            Activation::Binary => "binary",
            Activation::Linear => "linear",
        }
    }
}

impl FromStr for Activation {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sigmoid" | "sig" => Ok(Activation::Sigmoid),
            "sigmoid-estimate" | "sig-est" => Ok(Activation::SigmoidEstimate),
            "binary" | "bin" => Ok(Activation::Binary),
            "linear" | "lin" => Ok(Activation::Linear),
            _ => Err(SimError::UnknownActivation(s.to_string())),
        }
    }
}

/// Logistic sigmoid
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_midpoint() {
        assert_eq!(Activation::Sigmoid.apply(0.0, 0.0), 0.5);
        assert_eq!(Activation::SigmoidEstimate.apply(0.0, 0.0), 0.5);
    }

    #[test]
    fn test_bias_shifts_input() {
        assert_eq!(Activation::Binary.apply(-1.0, 0.5), 0.0);
        assert_eq!(Activation::Binary.apply(-1.0, 1.0), 1.0);
        assert_eq!(Activation::Linear.apply(2.0, -0.5), 1.5);
        assert!((Activation::Sigmoid.apply(1.0, 1.0) - sigmoid(2.0)).abs() < 1e-15);
    }

    #[test]
    fn test_estimate_stays_in_unit_range() {
        for x in [-1e6, -3.0, -0.1, 0.1, 3.0, 1e6] {
            let y = Activation::SigmoidEstimate.apply(x, 0.0);
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for a in [
            Activation::Sigmoid,
            Activation::SigmoidEstimate,
            Activation::Binary,
            Activation::Linear,
        ] {
            assert_eq!(a.as_str().parse::<Activation>().unwrap(), a);
            let json = serde_json::to_string(&a).unwrap();
            assert_eq!(json, format!("\"{}\"", a.as_str()));
        }
        assert_eq!("SIG-EST".parse::<Activation>().unwrap(), Activation::SigmoidEstimate);
        assert!(matches!(
            "relu".parse::<Activation>(),
            Err(SimError::UnknownActivation(name)) if name == "relu"
        ));
    }
}
