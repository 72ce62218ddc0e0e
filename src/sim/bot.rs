//! Bot kinematics
//!
//! A bot carries a sonar and applies one move primitive per step, with the
//! sonar's step gap as elapsed time. Move selection and path recording are
//! optional capabilities plugged in at construction.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::sonar::{Sonar, SonarConfig};
use super::stage::Stage;
use super::state::{DataPoint, MoveType, Position};
use crate::consts::*;
use crate::error::SimResult;
use crate::wrap_angle;

/// Picks the next move from a completed sonar sweep
pub trait Brain {
    fn kind(&self) -> &'static str;

    fn choose_move(&self, sweep: &[DataPoint]) -> SimResult<MoveType>;
}

/// Receives the bot's position after each in-bounds step
pub trait PathRecorder {
    fn record(&mut self, position: &Position);

    fn clear(&mut self);

    /// Points recorded since the last clear, oldest first
    fn points(&self) -> &[DVec2];
}

/// Records visited points in order
#[derive(Debug, Clone, Default)]
pub struct PathTrace {
    points: Vec<DVec2>,
}

impl PathTrace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathRecorder for PathTrace {
    fn record(&mut self, position: &Position) {
        self.points.push(position.pos);
    }

    fn clear(&mut self) {
        self.points.clear();
    }

    fn points(&self) -> &[DVec2] {
        &self.points
    }
}

/// Kinematic constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub turn_radius: f64,
    pub forward_factor: f64,
    pub backward_factor: f64,
    /// Arc speed while turning
    pub turn_factor: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            turn_radius: TURN_RADIUS,
            forward_factor: FORWARD_FACTOR,
            backward_factor: BACKWARD_FACTOR,
            turn_factor: TURN_FACTOR,
        }
    }
}

/// Point on the turning circle for a heading
fn helix(angle: f64, radius: f64) -> DVec2 {
    DVec2::new(radius * angle.sin(), radius * angle.cos())
}

pub struct Bot {
    position: Position,
    config: BotConfig,
    sonar: Sonar,
    current_move: MoveType,
    brain: Option<Box<dyn Brain>>,
    recorder: Option<Box<dyn PathRecorder>>,
}

impl Bot {
    /// A bot at the stage's spawn point facing along +x
    pub fn new(stage: &Stage) -> Self {
        Self::with_config(stage, BotConfig::default(), SonarConfig::default())
    }

    pub fn with_config(stage: &Stage, config: BotConfig, sonar: SonarConfig) -> Self {
        Self {
            position: Position::new(stage.spawn_point().as_dvec2(), 0.0),
            config,
            sonar: Sonar::new(sonar),
            current_move: MoveType::Forward,
            brain: None,
            recorder: None,
        }
    }

    pub fn with_brain(mut self, brain: Box<dyn Brain>) -> Self {
        self.brain = Some(brain);
        self
    }

    pub fn with_recorder(mut self, recorder: Box<dyn PathRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Teleport, keeping the rotation in [0, 2π)
    pub fn set_position(&mut self, position: Position) {
        self.position = Position::new(position.pos, position.rotation);
    }

    pub fn sonar(&self) -> &Sonar {
        &self.sonar
    }

    pub fn current_move(&self) -> MoveType {
        self.current_move
    }

    pub fn set_move(&mut self, next: MoveType) {
        self.current_move = next;
    }

    pub fn recorder(&self) -> Option<&dyn PathRecorder> {
        self.recorder.as_deref()
    }

    pub fn brain_kind(&self) -> &'static str {
        self.brain.as_ref().map(|b| b.kind()).unwrap_or("none")
    }

    /// Back to spawn with a fresh sweep and path
    pub fn reset(&mut self, stage: &Stage) {
        self.position = Position::new(stage.spawn_point().as_dvec2(), 0.0);
        self.current_move = MoveType::Forward;
        self.sonar.reset();
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.clear();
        }
    }

    /// Apply the current move for `dt` seconds
    pub fn apply_move(&mut self, dt: f64) {
        let c = self.config;
        match self.current_move {
            MoveType::Forward => self.translate(c.forward_factor * dt),
            MoveType::Backward => self.translate(c.backward_factor * dt),
            MoveType::Left => self.turn(-1.0, dt),
            MoveType::Right => self.turn(1.0, dt),
        }
    }

    fn translate(&mut self, distance: f64) {
        let r = self.position.rotation;
        self.position.pos += DVec2::new(r.cos(), r.sin()) * distance;
    }

    /// Move along the turning circle; `side` is -1 for left, +1 for right
    fn turn(&mut self, side: f64, dt: f64) {
        let radius = self.config.turn_radius;
        let angle_change = dt * self.config.turn_factor / radius;
        let old = self.position.rotation;
        let new = old + side * angle_change;

        // Left turns mirror the circle about the x axis
        let delta = helix(side * new, radius) - helix(side * old, radius);
        self.position.pos += DVec2::new(delta.x, -side * delta.y);
        self.position.rotation = wrap_angle(new);
    }

    /// Decide (at sweep ends), move by one sonar gap, then advance the sonar
    pub fn step(&mut self, stage: &Stage) -> SimResult<()> {
        if let Some(brain) = self.brain.as_ref() {
            if self.sonar.at_end() {
                self.current_move = brain.choose_move(self.sonar.data()?)?;
            }
        }

        self.apply_move(self.sonar.gap());
        self.sonar.step(&self.position, stage);

        if let Some(recorder) = self.recorder.as_mut() {
            if stage.in_bounds(self.position.pos) {
                recorder.record(&self.position);
            }
        }
        Ok(())
    }

    pub fn in_bounds(&self, stage: &Stage) -> bool {
        stage.in_bounds(self.position.pos)
    }

    pub fn collided(&self, stage: &Stage) -> bool {
        stage.collision(self.position.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn open_stage() -> Stage {
        let mut stage = Stage::new(400, 400);
        stage.set_threshold(1.0);
        stage
    }

    /// Quarter-turn duration for the default turn radius and speed
    fn quarter_turn_dt() -> f64 {
        FRAC_PI_2 * TURN_RADIUS / TURN_FACTOR
    }

    #[test]
    fn test_spawns_at_centre() {
        let stage = open_stage();
        let bot = Bot::new(&stage);
        assert_eq!(bot.position().pos, DVec2::new(200.0, 200.0));
        assert_eq!(bot.position().rotation, 0.0);
        assert_eq!(bot.current_move(), MoveType::Forward);
        assert_eq!(bot.brain_kind(), "none");
    }

    #[test]
    fn test_backward_is_scaled_reverse() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage);
        bot.set_move(MoveType::Backward);
        bot.apply_move(10.0);
        assert!((bot.position().pos.x - 194.0).abs() < 1e-9);
        assert!((bot.position().pos.y - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_quarter_turn() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage);
        bot.set_move(MoveType::Right);
        bot.apply_move(quarter_turn_dt());
        let p = bot.position();
        assert!((p.rotation - FRAC_PI_2).abs() < 1e-9);
        assert!((p.pos.x - 215.0).abs() < 1e-9);
        assert!((p.pos.y - 215.0).abs() < 1e-9);
    }

    #[test]
    fn test_left_quarter_turn_wraps() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage);
        bot.set_move(MoveType::Left);
        bot.apply_move(quarter_turn_dt());
        let p = bot.position();
        assert!((p.rotation - 3.0 * FRAC_PI_2).abs() < 1e-9);
        assert!((p.pos.x - 215.0).abs() < 1e-9);
        assert!((p.pos.y - 185.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_moves_one_gap() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage);
        let gap = bot.sonar().gap();
        bot.step(&stage).unwrap();
        assert!((bot.position().pos.x - (200.0 + gap)).abs() < 1e-12);
        assert_eq!(bot.sonar().sweep_step(), 1);
    }

    #[test]
    fn test_collision_and_bounds_follow_stage() {
        let mut solid = Stage::new(400, 400);
        solid.set_threshold(0.0);
        let mut bot = Bot::new(&solid);
        assert!(bot.collided(&solid));
        assert!(bot.in_bounds(&solid));

        bot.set_position(Position::new(DVec2::new(-1.0, 5.0), 0.0));
        assert!(!bot.in_bounds(&solid));
        assert!(!bot.collided(&solid));
    }

    struct AlwaysLeft;

    impl Brain for AlwaysLeft {
        fn kind(&self) -> &'static str {
            "always-left"
        }

        fn choose_move(&self, _sweep: &[DataPoint]) -> SimResult<MoveType> {
            Ok(MoveType::Left)
        }
    }

    #[test]
    fn test_brain_decides_at_sweep_end() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage).with_brain(Box::new(AlwaysLeft));
        assert_eq!(bot.brain_kind(), "always-left");
        bot.step(&stage).unwrap();
        assert_eq!(bot.current_move(), MoveType::Left);

        // Mid-sweep overrides hold until the next extreme
        bot.set_move(MoveType::Backward);
        for _ in 1..bot.sonar().cast_count() {
            bot.step(&stage).unwrap();
            assert_eq!(bot.current_move(), MoveType::Backward);
        }
        bot.step(&stage).unwrap();
        assert_eq!(bot.current_move(), MoveType::Left);
    }

    #[test]
    fn test_recorder_traces_and_resets() {
        let stage = open_stage();
        let mut bot = Bot::new(&stage).with_recorder(Box::new(PathTrace::new()));
        assert!(Bot::new(&stage).recorder().is_none());
        for _ in 0..10 {
            bot.step(&stage).unwrap();
        }
        let points = bot.recorder().unwrap().points();
        assert_eq!(points.len(), 10);
        assert_eq!(points[9], bot.position().pos);
        assert!(points.windows(2).all(|w| w[1].x > w[0].x));

        bot.set_move(MoveType::Right);
        bot.reset(&stage);
        assert!(bot.recorder().unwrap().points().is_empty());
        assert_eq!(bot.position().pos, DVec2::new(200.0, 200.0));
        assert_eq!(bot.current_move(), MoveType::Forward);
        assert_eq!(bot.sonar().sweep_step(), 0);
    }

    #[test]
    fn test_path_trace_keeps_order() {
        let mut trace = PathTrace::new();
        trace.record(&Position::new(DVec2::new(1.0, 2.0), 0.0));
        trace.record(&Position::new(DVec2::new(3.0, 4.0), 0.0));
        assert_eq!(trace.points(), &[DVec2::new(1.0, 2.0), DVec2::new(3.0, 4.0)]);
        trace.clear();
        assert!(trace.points().is_empty());
    }

    proptest! {
        #[test]
        fn prop_forward_from_zero_heading(dts in prop::collection::vec(0.001f64..5.0, 1..50)) {
            let stage = open_stage();
            let mut bot = Bot::new(&stage);
            let mut last_x = bot.position().pos.x;
            for dt in dts {
                bot.apply_move(dt);
                let p = bot.position();
                prop_assert!(p.pos.x > last_x);
                prop_assert!((p.pos.y - 200.0).abs() < 1e-9);
                last_x = p.pos.x;
            }
        }

        #[test]
        fn prop_turns_keep_rotation_wrapped(
            moves in prop::collection::vec((0usize..4, 0.01f64..200.0), 1..40),
        ) {
            let stage = open_stage();
            let mut bot = Bot::new(&stage);
            for (m, dt) in moves {
                bot.set_move(MoveType::from_index(m).unwrap());
                bot.apply_move(dt);
                let r = bot.position().rotation;
                prop_assert!((0.0..TAU).contains(&r));
            }
        }
    }
}
