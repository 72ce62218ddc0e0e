//! Trial bookkeeping
//!
//! Tallies outcomes across a run and keeps the fastest escapes.

use serde::{Deserialize, Serialize};

use crate::sim::{TrialOutcome, TrialReport};

/// Maximum number of escapes to keep
pub const MAX_ESCAPES: usize = 10;

/// A single escape on the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapeEntry {
    pub seed: u32,
    /// Steps the bot needed to leave the stage
    pub steps: u64,
}

/// Outcome counts for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub escaped: u32,
    pub collided: u32,
    pub timed_out: u32,
    pub impossible: u32,
}

impl OutcomeTally {
    /// Trials where the bot actually ran
    pub fn attempted(&self) -> u32 {
        self.escaped + self.collided + self.timed_out
    }

    pub fn total(&self) -> u32 {
        self.attempted() + self.impossible
    }

    /// Escapes over attempted trials
    pub fn escape_rate(&self) -> f64 {
        match self.attempted() {
            0 => 0.0,
            n => self.escaped as f64 / n as f64,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub tally: OutcomeTally,
    /// Fastest escapes, fewest steps first
    pub escapes: Vec<EscapeEntry>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an escape in `steps` would make the board
    pub fn qualifies(&self, steps: u64) -> bool {
        if self.escapes.len() < MAX_ESCAPES {
            return true;
        }
        self.escapes.last().map(|e| steps < e.steps).unwrap_or(true)
    }

    /// Count a report; returns the escape rank (1-indexed) if it made the board
    pub fn record(&mut self, report: &TrialReport) -> Option<usize> {
        match report.outcome {
            TrialOutcome::Escaped => self.tally.escaped += 1,
            TrialOutcome::Collided => {
                self.tally.collided += 1;
                return None;
            }
            TrialOutcome::Timeout => {
                self.tally.timed_out += 1;
                return None;
            }
            TrialOutcome::Impossible => {
                self.tally.impossible += 1;
                return None;
            }
        }

        if !self.qualifies(report.steps) {
            return None;
        }
        let entry = EscapeEntry {
            seed: report.seed,
            steps: report.steps,
        };

        // Sorted ascending by steps, ties keep arrival order
        let pos = self.escapes.iter().position(|e| report.steps < e.steps);
        let rank = match pos {
            Some(i) => {
                self.escapes.insert(i, entry);
                i + 1
            }
            None => {
                self.escapes.push(entry);
                self.escapes.len()
            }
        };
        self.escapes.truncate(MAX_ESCAPES);
        Some(rank)
    }

    pub fn fastest(&self) -> Option<&EscapeEntry> {
        self.escapes.first()
    }
}
