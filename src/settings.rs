//! Stage, trial and network settings
//!
//! Persisted as JSON next to the network values document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::nn::Activation;
use crate::sim::Stage;

/// Terrain generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub width: u32,
    pub height: u32,
    /// Noise octaves (1 - 16)
    pub octaves: u32,
    /// Noise frequency across the stage (0.1 - 64)
    pub frequency: f64,
    /// Noise level above which a point collides (0.0 - 1.0)
    pub threshold: f64,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1500,
            octaves: STAGE_OCTAVES,
            frequency: STAGE_FREQUENCY,
            threshold: STAGE_THRESHOLD,
        }
    }
}

/// Trial loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialSettings {
    pub first_seed: u32,
    /// Number of consecutive seeds to run
    pub stage_count: u32,
    /// Bot steps before a trial times out
    pub max_steps: u64,
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self {
            first_seed: 0,
            stage_count: STAGE_COUNT,
            max_steps: MAX_STEPS,
        }
    }
}

/// Where the bot's network values live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub values_path: PathBuf,
    /// Document key of the values
    pub id: String,
    pub shape: Vec<usize>,
    pub activation: Activation,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            values_path: PathBuf::from("data/network/base.json"),
            id: "nn".to_string(),
            shape: vec![SONAR_CAST_COUNT, 4],
            activation: Activation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub stage: StageSettings,
    pub trials: TrialSettings,
    pub network: NetworkSettings,
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file
    pub fn try_load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| SimError::storage(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| SimError::storage(path, e))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Stage configured from these settings (clamps apply)
    pub fn build_stage(&self) -> Stage {
        let mut stage = Stage::new(self.stage.width, self.stage.height);
        stage.set_octaves(self.stage.octaves);
        stage.set_frequency(self.stage.frequency);
        stage.set_threshold(self.stage.threshold);
        stage
    }

    /// Seeds covered by the trial settings
    pub fn seeds(&self) -> std::ops::Range<u32> {
        let first = self.trials.first_seed;
        first..first.saturating_add(self.trials.stage_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sonar-bot-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.stage.octaves, 2);
        assert_eq!(settings.stage.threshold, 0.55);
        assert_eq!(settings.trials.max_steps, 150_000);
        assert_eq!(settings.network.shape, vec![18, 4]);
        assert_eq!(settings.seeds(), 0..1000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "stage": { "threshold": 0.7 }, "trials": { "first_seed": 5 } }"#)
                .unwrap();
        assert_eq!(settings.stage.threshold, 0.7);
        assert_eq!(settings.stage.width, 1500);
        assert_eq!(settings.trials.first_seed, 5);
        assert_eq!(settings.network.id, "nn");
        assert_eq!(settings.network.activation, Activation::Sigmoid);
    }

    #[test]
    fn test_activation_by_name() {
        let settings: Settings =
            serde_json::from_str(r#"{ "network": { "activation": "sigmoid-estimate" } }"#).unwrap();
        assert_eq!(settings.network.activation, Activation::SigmoidEstimate);
        assert!(serde_json::from_str::<Settings>(r#"{ "network": { "activation": "relu" } }"#).is_err());
    }

    #[test]
    fn test_build_stage_clamps() {
        let mut settings = Settings::default();
        settings.stage.octaves = 40;
        settings.stage.frequency = 0.0;
        settings.stage.threshold = 2.0;
        let stage = settings.build_stage();
        assert_eq!(stage.octaves(), 16);
        assert_eq!(stage.frequency(), 0.1);
        assert_eq!(stage.threshold(), 1.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("settings.json");
        let mut settings = Settings::default();
        settings.trials.stage_count = 3;
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = scratch_path("does-not-exist.json");
        assert!(matches!(
            Settings::try_load(&path),
            Err(SimError::StorageUnavailable { .. })
        ));
        assert_eq!(Settings::load(&path), Settings::default());
    }
}
