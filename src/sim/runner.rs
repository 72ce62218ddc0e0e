//! Trial loop
//!
//! Each trial regenerates the stage for a seed, rejects stages that cannot
//! be escaped, then steps the bot until it collides, leaves the stage or
//! exhausts the step budget.

use std::ops::Range;

use super::agent::AgentKind;
use super::bot::{Bot, PathRecorder};
use super::sonar::SonarConfig;
use super::stage::Stage;
use super::state::{TrialOutcome, TrialReport};
use crate::error::SimResult;
use crate::settings::Settings;

pub struct SimulationRunner {
    stage: Stage,
    kind: AgentKind,
    bot: Bot,
    max_steps: u64,
}

impl SimulationRunner {
    pub fn new(stage: Stage, kind: AgentKind, max_steps: u64) -> SimResult<Self> {
        let bot = kind.build(&stage, SonarConfig::default(), None)?;
        Ok(Self {
            stage,
            kind,
            bot,
            max_steps,
        })
    }

    /// Stage and step budget taken from settings
    pub fn from_settings(settings: &Settings, kind: AgentKind) -> SimResult<Self> {
        Self::new(settings.build_stage(), kind, settings.trials.max_steps)
    }

    /// Attach a path recorder to the bot
    pub fn with_recorder(self, recorder: Box<dyn PathRecorder>) -> Self {
        Self {
            bot: self.bot.with_recorder(recorder),
            ..self
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    pub fn max_steps(&self) -> u64 {
        self.max_steps
    }

    /// Run one trial on the stage generated from `seed`
    ///
    /// The bot starts from spawn every time and is left where the trial
    /// ended, so its recorded path can be read afterwards.
    pub fn run_trial(&mut self, seed: u32) -> SimResult<TrialReport> {
        self.stage.generate(seed);
        self.bot.reset(&self.stage);

        if !self.stage.navigable() {
            log::info!("Seed {}: stage impossible", seed);
            return Ok(TrialReport {
                seed,
                outcome: TrialOutcome::Impossible,
                steps: 0,
                final_position: self.bot.position(),
            });
        }

        let mut steps = 0u64;
        let outcome = loop {
            if self.bot.collided(&self.stage) {
                break TrialOutcome::Collided;
            }
            if !self.bot.in_bounds(&self.stage) {
                break TrialOutcome::Escaped;
            }
            if steps >= self.max_steps {
                break TrialOutcome::Timeout;
            }
            if let Err(e) = self.bot.step(&self.stage) {
                log::warn!("Seed {}: trial aborted after {} steps: {}", seed, steps, e);
                self.bot.reset(&self.stage);
                return Err(e);
            }
            steps += 1;
        };

        let report = TrialReport {
            seed,
            outcome,
            steps,
            final_position: self.bot.position(),
        };
        log::info!(
            "Seed {}: bot {} after {} steps at ({:.1}, {:.1})",
            seed,
            outcome.as_str(),
            steps,
            report.final_position.pos.x,
            report.final_position.pos.y
        );

        Ok(report)
    }

    /// Run consecutive seeds, stopping at the first hard error
    pub fn run(&mut self, seeds: Range<u32>) -> SimResult<Vec<TrialReport>> {
        seeds.map(|seed| self.run_trial(seed)).collect()
    }
}

/// Navigability of each seed's stage, without running a bot
pub fn survey(stage: &mut Stage, seeds: Range<u32>) -> Vec<(u32, bool)> {
    seeds
        .map(|seed| {
            stage.generate(seed);
            (seed, stage.navigable())
        })
        .collect()
}
