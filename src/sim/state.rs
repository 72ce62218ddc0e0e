//! Core simulation types
//!
//! Plain data shared between the stage, sonar, bot and trial loop.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::wrap_angle;

/// A point and heading in stage space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub pos: DVec2,
    /// Heading in radians, kept in [0, 2π)
    pub rotation: f64,
}

impl Position {
    pub fn new(pos: DVec2, rotation: f64) -> Self {
        Self {
            pos,
            rotation: wrap_angle(rotation),
        }
    }
}

/// Discrete move primitives a bot can apply each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveType {
    #[default]
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveType {
    pub const COUNT: usize = 4;

    pub const ALL: [MoveType; Self::COUNT] = [
        MoveType::Forward,
        MoveType::Backward,
        MoveType::Left,
        MoveType::Right,
    ];

    /// Map a decision index back onto a primitive
    pub fn from_index(index: usize) -> SimResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SimError::InvalidMoveType(index))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveType::Forward => "forward",
            MoveType::Backward => "backward",
            MoveType::Left => "left",
            MoveType::Right => "right",
        }
    }
}

/// One sonar sample: offset from the carrier's heading and measured range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub angle: f64,
    pub distance: f64,
}

impl DataPoint {
    pub fn new(angle: f64, distance: f64) -> Self {
        Self { angle, distance }
    }
}

/// How a trial ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialOutcome {
    /// Bot left the stage
    Escaped,
    /// Bot drove into a collision area
    Collided,
    /// Step budget ran out
    Timeout,
    /// Stage failed the navigability check, bot never ran
    Impossible,
}

impl TrialOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrialOutcome::Escaped => "escaped",
            TrialOutcome::Collided => "collided",
            TrialOutcome::Timeout => "timed out",
            TrialOutcome::Impossible => "impossible",
        }
    }
}

/// Result of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialReport {
    pub seed: u32,
    pub outcome: TrialOutcome,
    /// Bot steps taken before the outcome
    pub steps: u64,
    /// Where the bot ended up
    pub final_position: Position,
}
