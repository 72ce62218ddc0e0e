//! Noise-based stage: collision areas, bounds and navigability
//!
//! A point collides when the noise value there exceeds the threshold.
//! Everything outside the window is free space, so reaching the edge
//! counts as an escape.

use glam::{DVec2, UVec2};
use serde::{Deserialize, Serialize};

use super::noise_field::NoiseField;
use crate::consts::*;
use crate::from_bearing;

/// Parameters of the bounded ray search used by [`Stage::navigable`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Length of each ray
    pub trace_distance: f64,
    /// Rays cast around a full circle from every point
    pub cast_count: usize,
    /// Probes per ray
    pub collision_points: usize,
    /// Casts before the search gives up
    pub max_cast_iterations: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            trace_distance: TRACE_DISTANCE,
            cast_count: NAV_CAST_COUNT,
            collision_points: COLLISION_POINTS,
            max_cast_iterations: MAX_CAST_ITERATIONS,
        }
    }
}

/// One pending cast of the depth-first search
struct Cast {
    origin: DVec2,
    /// Ray index that led here, None at the spawn point
    parent: Option<usize>,
    /// Next relative ray to try
    next_ray: usize,
}

/// Why a ray stopped
enum RayEnd {
    Collided,
    Escaped,
    Open(DVec2),
}

/// How a navigability search finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchEnd {
    Escaped,
    Enclosed,
    OutOfBudget,
}

/// Absolute ray for relative ray `i` of a cast, None when it is skipped
///
/// Rays are taken in order starting from the incoming direction. With a
/// parent, the relative ray at `cast_count / 2` points back the way the
/// search came and is skipped when that index is even.
fn ray_for(parent: Option<usize>, i: usize, cast_count: usize) -> Option<usize> {
    if parent.is_some() && i == cast_count / 2 && i % 2 == 0 {
        return None;
    }
    Some((i + parent.unwrap_or(0)) % cast_count)
}

/// A generated environment with collision areas
#[derive(Debug, Clone)]
pub struct Stage {
    window: UVec2,
    spawn_point: UVec2,
    threshold: f64,
    noise: NoiseField,
    navigation: NavigationConfig,
}

impl Stage {
    pub fn new(width: u32, height: u32) -> Self {
        let window = UVec2::new(width.max(1), height.max(1));
        Self {
            window,
            spawn_point: window / 2,
            threshold: STAGE_THRESHOLD,
            noise: NoiseField::default(),
            navigation: NavigationConfig::default(),
        }
    }

    pub fn with_navigation(mut self, navigation: NavigationConfig) -> Self {
        self.navigation = NavigationConfig {
            cast_count: navigation.cast_count.max(1),
            collision_points: navigation.collision_points.max(1),
            ..navigation
        };
        self
    }

    /// Regenerate the noise field for a new seed
    pub fn generate(&mut self, seed: u32) {
        self.noise.generate(seed);
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Clamped to [0, 1]
    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn octaves(&self) -> u32 {
        self.noise.octaves()
    }

    pub fn set_octaves(&mut self, octaves: u32) {
        self.noise.set_octaves(octaves);
    }

    pub fn frequency(&self) -> f64 {
        self.noise.frequency()
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.noise.set_frequency(frequency);
    }

    pub fn navigation(&self) -> &NavigationConfig {
        &self.navigation
    }

    /// Stage centre
    pub fn spawn_point(&self) -> UVec2 {
        self.spawn_point
    }

    pub fn window_size(&self) -> UVec2 {
        self.window
    }

    /// Noise amplitude at a point in stage coordinates
    pub fn value(&self, pos: DVec2) -> f64 {
        self.noise.sample(pos / self.window.as_dvec2())
    }

    /// True inside [0, width) × [0, height)
    pub fn in_bounds(&self, pos: DVec2) -> bool {
        pos.x >= 0.0
            && pos.y >= 0.0
            && pos.x < self.window.x as f64
            && pos.y < self.window.y as f64
    }

    /// True when the point lies inside a collision area
    pub fn collision(&self, pos: DVec2) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        self.value(pos) > self.threshold
    }

    /// Whether an obstacle-free path leads from the spawn point to the edge
    ///
    /// Depth-first ray search with a global cast budget. Running out of
    /// budget counts as not navigable.
    pub fn navigable(&self) -> bool {
        matches!(self.search(), SearchEnd::Escaped)
    }

    fn search(&self) -> SearchEnd {
        let spawn = self.spawn_point.as_dvec2();
        if self.collision(spawn) {
            return SearchEnd::Enclosed;
        }

        let nav = &self.navigation;
        let mut casts = 0usize;
        let mut stack = Vec::new();

        if !self.enter_cast(&mut casts) {
            return SearchEnd::OutOfBudget;
        }
        stack.push(Cast {
            origin: spawn,
            parent: None,
            next_ray: 0,
        });

        while let Some(cast) = stack.last_mut() {
            if cast.next_ray >= nav.cast_count {
                stack.pop();
                continue;
            }
            let i = cast.next_ray;
            cast.next_ray += 1;

            let Some(ray_index) = ray_for(cast.parent, i, nav.cast_count) else {
                continue;
            };
            match self.trace_ray(cast.origin, ray_index) {
                RayEnd::Escaped => return SearchEnd::Escaped,
                RayEnd::Collided => {}
                RayEnd::Open(end) => {
                    if !self.enter_cast(&mut casts) {
                        log::debug!(
                            "Navigability search for seed {} ran out of budget",
                            self.seed()
                        );
                        return SearchEnd::OutOfBudget;
                    }
                    stack.push(Cast {
                        origin: end,
                        parent: Some(ray_index),
                        next_ray: 0,
                    });
                }
            }
        }
        SearchEnd::Enclosed
    }

    /// Count a cast against the budget; false once it is exhausted
    fn enter_cast(&self, casts: &mut usize) -> bool {
        if *casts > self.navigation.max_cast_iterations {
            return false;
        }
        *casts += 1;
        true
    }

    fn trace_ray(&self, origin: DVec2, ray_index: usize) -> RayEnd {
        let nav = &self.navigation;
        let bearing = std::f64::consts::TAU * ray_index as f64 / nav.cast_count as f64;
        let step = from_bearing(nav.trace_distance / nav.collision_points as f64, bearing);

        let mut probe = origin;
        for _ in 0..nav.collision_points {
            probe += step;
            if !self.in_bounds(probe) {
                return RayEnd::Escaped;
            }
            if self.collision(probe) {
                return RayEnd::Collided;
            }
        }
        RayEnd::Open(probe)
    }
}
