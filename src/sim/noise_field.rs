//! Seeded fractal noise over the plane

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::consts::*;

/// Multi-octave Perlin noise remapped into [0, 1]
///
/// Each octave doubles the frequency and halves the amplitude. The sum is
/// divided by the total amplitude so the range does not depend on the
/// octave count.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u32,
    octaves: u32,
    frequency: f64,
    perlin: Perlin,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(0)
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            octaves: STAGE_OCTAVES,
            frequency: STAGE_FREQUENCY,
            perlin: Perlin::new(seed),
        }
    }

    /// Rebuild the permutation table for a new seed
    pub fn generate(&mut self, seed: u32) {
        self.seed = seed;
        self.perlin = Perlin::new(seed);
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Clamped to [1, 16]
    pub fn set_octaves(&mut self, octaves: u32) {
        self.octaves = octaves.clamp(MIN_OCTAVES, MAX_OCTAVES);
    }

    /// Clamped to [0.1, 64]
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY);
    }

    /// Sample at a point given in unit coordinates (0..1 spans the stage)
    pub fn sample(&self, unit: DVec2) -> f64 {
        let mut p = unit * self.frequency;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        let mut sum = 0.0;
        for _ in 0..self.octaves {
            sum += self.perlin.get([p.x, p.y]) * amplitude;
            total += amplitude;
            p *= 2.0;
            amplitude *= 0.5;
        }
        (sum / total * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_field() {
        let a = NoiseField::new(12345);
        let b = NoiseField::new(12345);
        for i in 0..50 {
            let p = DVec2::new(i as f64 * 0.037, i as f64 * 0.051);
            assert_eq!(a.sample(p), b.sample(p));
        }
    }

    #[test]
    fn test_generate_changes_field() {
        let mut field = NoiseField::new(1);
        let points: Vec<DVec2> = (0..50)
            .map(|i| DVec2::new(i as f64 * 0.037 + 0.01, i as f64 * 0.051 + 0.02))
            .collect();
        let before: Vec<f64> = points.iter().map(|p| field.sample(*p)).collect();
        field.generate(2);
        assert_eq!(field.seed(), 2);
        let after: Vec<f64> = points.iter().map(|p| field.sample(*p)).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_parameter_clamps() {
        let mut field = NoiseField::default();
        field.set_octaves(0);
        assert_eq!(field.octaves(), 1);
        field.set_octaves(99);
        assert_eq!(field.octaves(), 16);
        field.set_frequency(0.0);
        assert_eq!(field.frequency(), 0.1);
        field.set_frequency(1000.0);
        assert_eq!(field.frequency(), 64.0);
    }

    proptest! {
        #[test]
        fn prop_sample_in_unit_range(
            seed in any::<u32>(),
            octaves in 1u32..=16,
            x in -2.0f64..2.0,
            y in -2.0f64..2.0,
        ) {
            let mut field = NoiseField::new(seed);
            field.set_octaves(octaves);
            let v = field.sample(DVec2::new(x, y));
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }
}
