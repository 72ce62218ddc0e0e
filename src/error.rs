//! Error types shared by the simulation, inference and storage layers

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading weights or stepping a bot
#[derive(Error, Debug)]
pub enum SimError {
    /// Loaded values were built for a different topology
    #[error("shape of new values {found:?} does not match the network shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Flat weight/bias array disagrees with the length its shape implies
    #[error("expected {expected} {what} for this shape, found {found}")]
    ValueCountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Shapes need at least two non-empty layers
    #[error("invalid network shape: {0}")]
    InvalidShape(String),

    #[error("network expects {expected} inputs, got {found}")]
    InputSizeMismatch { expected: usize, found: usize },

    /// Sonar buffer read in the middle of a sweep
    #[error("sensor data not ready: sweep is not at an extreme")]
    SensorNotReady,

    /// Decision index outside the four move primitives
    #[error("invalid move type index {0}")]
    InvalidMoveType(usize),

    #[error("unknown activation {0:?}")]
    UnknownActivation(String),

    /// Network cannot drive a bot with this sonar
    #[error("incompatible network: {0}")]
    IncompatibleNetwork(String),

    #[error("cannot access {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no network values stored under id {0:?}")]
    UnknownNetwork(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Wrap an io error with the path that produced it
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source,
        }
    }
}
