//! Play session
//!
//! Owns the current level and moves between levels. Restarting is a reload of
//! the level's source followed by a fresh phase, never a jump back into a
//! running tick.

use serde::{Deserialize, Serialize};

use super::cave::CaveParams;
use super::level::Level;
use super::levels::{level_count, load_level};
use super::tick::{TickInput, TickOutcome, step};
use crate::audio::AudioSink;
use crate::error::SimError;
use crate::settings::SimConfig;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Playing,
    Dead,
    Completed,
    TimedOut,
    Quit,
}

/// Where the current level came from (and how to rebuild it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelSource {
    Builtin(u32),
    Cave { seed: u64, params: CaveParams },
}

impl LevelSource {
    fn load(&self, config: &SimConfig) -> Result<Level, SimError> {
        match self {
            LevelSource::Builtin(id) => load_level(*id, config.clone()),
            LevelSource::Cave { seed, params } => Level::generated(*seed, params, config.clone()),
        }
    }

    fn next(&self) -> LevelSource {
        match self {
            LevelSource::Builtin(id) => {
                let count = level_count().max(1) as u32;
                LevelSource::Builtin((id + 1) % count)
            }
            LevelSource::Cave { seed, params } => LevelSource::Cave {
                seed: seed.wrapping_add(1),
                params: params.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub struct Session {
    level: Level,
    source: LevelSource,
    phase: SessionPhase,
    /// Score banked from completed levels
    total_score: u64,
    config: SimConfig,
}

impl Session {
    /// Start on a built-in level
    pub fn new(level_id: u32, config: SimConfig) -> Result<Self, SimError> {
        Self::from_source(LevelSource::Builtin(level_id), config)
    }

    /// Start on a generated cave
    pub fn cave(seed: u64, params: CaveParams, config: SimConfig) -> Result<Self, SimError> {
        Self::from_source(LevelSource::Cave { seed, params }, config)
    }

    fn from_source(source: LevelSource, config: SimConfig) -> Result<Self, SimError> {
        let level = source.load(&config)?;
        Ok(Self {
            level,
            source,
            phase: SessionPhase::Playing,
            total_score: 0,
            config,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn source(&self) -> &LevelSource {
        &self.source
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Banked score plus whatever the current level has earned
    pub fn total_score(&self) -> u64 {
        if self.phase == SessionPhase::Completed {
            self.total_score
        } else {
            self.total_score + self.level.score
        }
    }

    /// Feed one frame of input
    pub fn update(
        &mut self,
        input: &TickInput,
        dt: f32,
        audio: &mut dyn AudioSink,
    ) -> Result<SessionPhase, SimError> {
        if self.phase == SessionPhase::Quit {
            return Ok(SessionPhase::Quit);
        }
        if input.quit {
            self.level.loops.stop(audio);
            self.phase = SessionPhase::Quit;
            log::info!("Session quit with {} points", self.total_score());
            return Ok(self.phase);
        }
        if input.reset {
            self.restart(audio)?;
            return Ok(self.phase);
        }

        let outcome = step(&mut self.level, input, dt, audio)?;
        if self.phase == SessionPhase::Playing {
            self.phase = match outcome {
                TickOutcome::Continue => SessionPhase::Playing,
                TickOutcome::PlayerDied => SessionPhase::Dead,
                TickOutcome::OutOfTime => SessionPhase::TimedOut,
                TickOutcome::LevelCompleted => {
                    self.total_score += self.level.score;
                    SessionPhase::Completed
                }
            };
        }
        Ok(self.phase)
    }

    /// Reload the current level from scratch; its score is forfeited
    pub fn restart(&mut self, audio: &mut dyn AudioSink) -> Result<(), SimError> {
        self.level.loops.stop(audio);
        self.level = self.source.load(&self.config)?;
        self.phase = SessionPhase::Playing;
        log::info!("Restarted level '{}'", self.level.params.name);
        Ok(())
    }

    /// Move on to the next level (built-in table wraps around)
    pub fn advance(&mut self, audio: &mut dyn AudioSink) -> Result<(), SimError> {
        self.level.loops.stop(audio);
        let next = self.source.next();
        self.level = next.load(&self.config)?;
        self.source = next;
        self.phase = SessionPhase::Playing;
        log::info!(
            "Advanced to level '{}' with {} points banked",
            self.level.params.name,
            self.total_score
        );
        Ok(())
    }
}
