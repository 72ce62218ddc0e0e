//! Decision layer: turning sonar sweeps into moves

use super::bot::{Bot, Brain, PathRecorder};
use super::sonar::SonarConfig;
use super::stage::Stage;
use super::state::{DataPoint, MoveType};
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::nn::NeuralNetwork;

/// Map a sonar distance onto (0, 2), crossing 1 at the intercept
#[inline]
pub fn squash_distance(distance: f64) -> f64 {
    2.0 / (1.0 + (-(distance - SQUASH_INTERCEPT) / SQUASH_SCALE).exp())
}

/// Brain backed by a feed-forward network with one output per move
#[derive(Debug, Clone)]
pub struct NetworkBrain {
    network: NeuralNetwork,
}

impl NetworkBrain {
    /// Wrap a network whose output layer has one node per move primitive
    pub fn new(network: NeuralNetwork) -> SimResult<Self> {
        if network.output_size() != MoveType::COUNT {
            return Err(SimError::IncompatibleNetwork(format!(
                "output layer has {} nodes, expected {}",
                network.output_size(),
                MoveType::COUNT
            )));
        }
        Ok(Self { network })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    /// Sort by angle and squash distances into network inputs
    pub fn inputs(sweep: &[DataPoint]) -> Vec<f64> {
        let mut sorted = sweep.to_vec();
        sorted.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        sorted.iter().map(|d| squash_distance(d.distance)).collect()
    }
}

impl Brain for NetworkBrain {
    fn kind(&self) -> &'static str {
        "network"
    }

    fn choose_move(&self, sweep: &[DataPoint]) -> SimResult<MoveType> {
        let outputs = self.network.calculate(&Self::inputs(sweep))?;

        // Strict comparison: the earliest move wins ties
        let mut best = 0;
        for (i, value) in outputs.iter().enumerate().take(MoveType::COUNT).skip(1) {
            if *value > outputs[best] {
                best = i;
            }
        }
        MoveType::from_index(best)
    }
}

/// The kinds of bot the trial loop can field
#[derive(Debug, Clone)]
pub enum AgentKind {
    /// No decision making, drives forward forever
    Blind,
    /// Moves chosen by a network after every sweep
    Network(NeuralNetwork),
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Blind => "blind",
            AgentKind::Network(_) => "network",
        }
    }

    /// Build a bot at the stage's spawn point
    pub fn build(
        &self,
        stage: &Stage,
        sonar: SonarConfig,
        recorder: Option<Box<dyn PathRecorder>>,
    ) -> SimResult<Bot> {
        let mut bot = Bot::with_config(stage, Default::default(), sonar);
        if let AgentKind::Network(network) = self {
            if network.input_size() != sonar.cast_count {
                return Err(SimError::IncompatibleNetwork(format!(
                    "input layer has {} nodes but the sonar takes {} samples",
                    network.input_size(),
                    sonar.cast_count
                )));
            }
            bot = bot.with_brain(Box::new(NetworkBrain::new(network.clone())?));
        }
        if let Some(recorder) = recorder {
            bot = bot.with_recorder(recorder);
        }
        Ok(bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::NetworkValues;

    fn sweep(distances: &[f64]) -> Vec<DataPoint> {
        distances
            .iter()
            .enumerate()
            .map(|(i, d)| DataPoint::new(i as f64, *d))
            .collect()
    }

    /// 2 inputs → 4 outputs, only `winner` gets a positive bias
    fn biased_network(winner: usize) -> NeuralNetwork {
        let mut values = NetworkValues::zeroed(&[2, 4]);
        values.bias[2 + winner] = 1.0;
        NeuralNetwork::from_values(values).unwrap()
    }

    #[test]
    fn test_squash_distance() {
        assert!((squash_distance(SQUASH_INTERCEPT) - 1.0).abs() < 1e-12);
        assert!(squash_distance(0.0) < 1.0);
        assert!(squash_distance(100.0) > 1.9);
        assert!(squash_distance(100.0) < 2.0);
    }

    #[test]
    fn test_inputs_sorted_by_angle() {
        let data = vec![
            DataPoint::new(0.5, 100.0),
            DataPoint::new(-0.5, 0.0),
            DataPoint::new(0.0, 20.0),
        ];
        let inputs = NetworkBrain::inputs(&data);
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0], squash_distance(0.0));
        assert_eq!(inputs[1], 1.0);
        assert_eq!(inputs[2], squash_distance(100.0));
    }

    #[test]
    fn test_choose_move_picks_largest_output() {
        for (i, expected) in MoveType::ALL.iter().enumerate() {
            let brain = NetworkBrain::new(biased_network(i)).unwrap();
            assert_eq!(brain.choose_move(&sweep(&[10.0, 50.0])).unwrap(), *expected);
        }
    }

    #[test]
    fn test_ties_go_to_forward() {
        let brain = NetworkBrain::new(NeuralNetwork::new(&[2, 4]).unwrap()).unwrap();
        assert_eq!(brain.choose_move(&sweep(&[10.0, 50.0])).unwrap(), MoveType::Forward);
    }

    #[test]
    fn test_rejects_wrong_output_width() {
        let err = NetworkBrain::new(NeuralNetwork::new(&[2, 3]).unwrap()).unwrap_err();
        assert!(matches!(err, SimError::IncompatibleNetwork(_)));
    }

    #[test]
    fn test_sweep_size_must_match_inputs() {
        let brain = NetworkBrain::new(NeuralNetwork::new(&[2, 4]).unwrap()).unwrap();
        let err = brain.choose_move(&sweep(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, SimError::InputSizeMismatch { .. }));
    }

    #[test]
    fn test_build_checks_sonar_width() {
        let stage = Stage::new(100, 100);
        let kind = AgentKind::Network(NeuralNetwork::new(&[5, 4]).unwrap());
        assert!(matches!(
            kind.build(&stage, SonarConfig::default(), None),
            Err(SimError::IncompatibleNetwork(_))
        ));

        let kind = AgentKind::Network(NeuralNetwork::new(&[SONAR_CAST_COUNT, 4]).unwrap());
        let bot = kind.build(&stage, SonarConfig::default(), None).unwrap();
        assert_eq!(bot.brain_kind(), "network");
        assert_eq!(AgentKind::Blind.build(&stage, SonarConfig::default(), None).unwrap().brain_kind(), "none");
    }
}
