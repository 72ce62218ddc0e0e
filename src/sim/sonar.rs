//! Rotating range sensor
//!
//! The sonar sweeps back and forth across its field of view, one angular
//! step per call to [`Sonar::step`]. Each step marches a ray from the
//! carrier until it hits a collision area or runs out of range, and writes
//! the sample into a circular buffer. Once a sweep reaches either extreme
//! the buffer holds `cast_count` fresh samples.

use serde::{Deserialize, Serialize};

use super::stage::Stage;
use super::state::{DataPoint, Position};
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::from_bearing;

/// Sonar geometry and timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SonarConfig {
    /// Angular steps per sweep
    pub cast_count: usize,
    /// Field of view (radians), centred on the carrier's heading
    pub fov: f64,
    pub max_dist: f64,
    /// Distance between probes along a ray
    pub cast_resolution: f64,
    /// Sweep speed (rad/s)
    pub rots: f64,
}

impl Default for SonarConfig {
    fn default() -> Self {
        Self {
            cast_count: SONAR_CAST_COUNT,
            fov: SONAR_FOV,
            max_dist: SONAR_MAX_DIST,
            cast_resolution: SONAR_RESOLUTION,
            rots: SONAR_ROTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sonar {
    config: SonarConfig,
    sweep_step: usize,
    bounce: bool,
    write_index: usize,
    data: Vec<DataPoint>,
}

impl Default for Sonar {
    fn default() -> Self {
        Self::new(SonarConfig::default())
    }
}

impl Sonar {
    pub fn new(config: SonarConfig) -> Self {
        let config = SonarConfig {
            cast_count: config.cast_count.max(1),
            cast_resolution: config.cast_resolution.max(f64::EPSILON),
            ..config
        };
        Self {
            config,
            sweep_step: 0,
            bounce: false,
            write_index: 0,
            data: vec![DataPoint::default(); config.cast_count],
        }
    }

    pub fn config(&self) -> &SonarConfig {
        &self.config
    }

    pub fn cast_count(&self) -> usize {
        self.config.cast_count
    }

    pub fn fov(&self) -> f64 {
        self.config.fov
    }

    /// Maximum distance that can be measured
    pub fn range(&self) -> f64 {
        self.config.max_dist
    }

    pub fn sweep_step(&self) -> usize {
        self.sweep_step
    }

    /// Current offset from the carrier's heading
    pub fn rotation(&self) -> f64 {
        let c = &self.config;
        (self.sweep_step as f64 * c.fov) / c.cast_count as f64 - c.fov / 2.0
    }

    /// Carrier position with the sweep offset applied to its heading
    pub fn position(&self, carrier: &Position) -> Position {
        Position::new(carrier.pos, carrier.rotation + self.rotation())
    }

    /// Range reading along the current beam
    pub fn distance(&self, carrier: &Position, stage: &Stage) -> f64 {
        let beam = self.position(carrier);
        let c = &self.config;
        let mut probe = 0usize;
        loop {
            let probe_dist = probe as f64 * c.cast_resolution;
            if probe_dist >= c.max_dist {
                return c.max_dist;
            }
            if stage.collision(beam.pos + from_bearing(probe_dist, beam.rotation)) {
                return probe_dist;
            }
            probe += 1;
        }
    }

    /// True at either sweep extreme, when the buffer holds a full sweep
    pub fn at_end(&self) -> bool {
        self.sweep_step == 0 || self.sweep_step == self.config.cast_count
    }

    /// Simulated seconds covered by one step
    pub fn gap(&self) -> f64 {
        let c = &self.config;
        c.fov / (c.rots * c.cast_count as f64)
    }

    /// The last full sweep
    pub fn data(&self) -> SimResult<&[DataPoint]> {
        if !self.at_end() {
            return Err(SimError::SensorNotReady);
        }
        Ok(&self.data)
    }

    /// Advance one angular step and record a sample
    pub fn step(&mut self, carrier: &Position, stage: &Stage) {
        if self.bounce {
            self.sweep_step -= 1;
        } else {
            self.sweep_step += 1;
        }
        if self.sweep_step == 0 {
            self.bounce = false;
        } else if self.sweep_step == self.config.cast_count {
            self.bounce = true;
        }

        self.data[self.write_index] = DataPoint::new(self.rotation(), self.distance(carrier, stage));
        self.write_index = (self.write_index + 1) % self.config.cast_count;
    }

    /// Back to the start of a sweep with an empty buffer
    pub fn reset(&mut self) {
        self.sweep_step = 0;
        self.bounce = false;
        self.write_index = 0;
        self.data.fill(DataPoint::default());
    }
}
