//! Sonar Bot - a sensor-guided bot escaping procedurally generated stages
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, sonar, kinematics, trial loop)
//! - `nn`: Fixed-topology feed-forward inference
//! - `persistence`: JSON document of stored network values
//! - `settings`: Data-driven stage and trial configuration
//! - `scoreboard`: Trial outcome bookkeeping

pub mod error;
pub mod nn;
pub mod persistence;
pub mod scoreboard;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use scoreboard::Scoreboard;
pub use settings::Settings;

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    use std::f64::consts::PI;

    /// Stage noise defaults
    pub const STAGE_OCTAVES: u32 = 2;
    pub const STAGE_FREQUENCY: f64 = 6.0;
    pub const STAGE_THRESHOLD: f64 = 0.55;
    pub const MIN_OCTAVES: u32 = 1;
    pub const MAX_OCTAVES: u32 = 16;
    pub const MIN_FREQUENCY: f64 = 0.1;
    pub const MAX_FREQUENCY: f64 = 64.0;

    /// Navigability search
    pub const TRACE_DISTANCE: f64 = 50.0; // Length of each ray
    pub const NAV_CAST_COUNT: usize = 32; // Rays per cast
    pub const COLLISION_POINTS: usize = 20; // Probes per ray
    pub const MAX_CAST_ITERATIONS: usize = 10_000; // Casts before timeout

    /// Sonar
    pub const SONAR_CAST_COUNT: usize = 18;
    pub const SONAR_FOV: f64 = PI;
    pub const SONAR_MAX_DIST: f64 = 100.0;
    pub const SONAR_RESOLUTION: f64 = 1.0;
    /// Sweep speed (rad/s)
    pub const SONAR_ROTS: f64 = PI / 2.0;

    /// Bot kinematics
    pub const TURN_RADIUS: f64 = 15.0;
    pub const FORWARD_FACTOR: f64 = 1.0;
    pub const BACKWARD_FACTOR: f64 = -0.6;
    pub const TURN_FACTOR: f64 = 0.4;

    /// Sonar distance squashing for network input
    pub const SQUASH_INTERCEPT: f64 = 20.0;
    pub const SQUASH_SCALE: f64 = 15.0;

    /// Trial loop
    pub const MAX_STEPS: u64 = 150_000;
    pub const STAGE_COUNT: u32 = 1000;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::TAU;
    let wrapped = angle - TAU * (angle / TAU).floor();
    // floor() rounding can land exactly on TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Vector of length `distance` pointing along `bearing`
#[inline]
pub fn from_bearing(distance: f64, bearing: f64) -> DVec2 {
    DVec2::new(distance * bearing.cos(), distance * bearing.sin())
}
