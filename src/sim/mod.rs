//! Deterministic simulation module
//!
//! Everything a trial needs lives here. This module must be pure and deterministic:
//! - Fixed step time (the sonar's gap) only
//! - Seeded noise only
//! - Bounded searches, no recursion on the call stack
//! - No rendering or platform dependencies

pub mod agent;
pub mod bot;
pub mod noise_field;
pub mod runner;
pub mod sonar;
pub mod stage;
pub mod state;

pub use agent::{AgentKind, NetworkBrain, squash_distance};
pub use bot::{Bot, BotConfig, Brain, PathRecorder, PathTrace};
pub use noise_field::NoiseField;
pub use runner::{SimulationRunner, survey};
pub use sonar::{Sonar, SonarConfig};
pub use stage::{NavigationConfig, Stage};
pub use state::{DataPoint, MoveType, Position, TrialOutcome, TrialReport};
