//! Simulation tick
//!
//! Runs the sub-systems in a fixed order, each gated by its own interval:
//! player, flood, enemies, physics, then expired explosions are cleared.

use serde::{Deserialize, Serialize};

use super::enemy::move_enemies;
use super::explosion::resolve_explosions;
use super::flood::{FloodEvent, flood_active, flood_step};
use super::grid::Dir;
use super::level::{EnemyKind, Level, LevelStatus};
use super::physics::physics_step;
use super::player::{PlayerEvent, move_player};
use crate::audio::{AudioSink, SoundId};
use crate::consts::TIMEOUT_WARNING_SECS;
use crate::error::SimError;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Dig/collect the tile in the held direction without moving
    pub pickup: bool,
    /// Restart the level (handled by [`super::Session`])
    pub reset: bool,
    /// Leave the game (handled by [`super::Session`])
    pub quit: bool,
}

impl TickInput {
    /// Input holding a single direction
    pub fn held(dir: Dir) -> Self {
        let mut input = Self::default();
        match dir {
            Dir::Up => input.up = true,
            Dir::Down => input.down = true,
            Dir::Left => input.left = true,
            Dir::Right => input.right = true,
        }
        input
    }

    /// The one direction held; up beats down beats left beats right
    pub fn direction(&self) -> Option<Dir> {
        if self.up {
            Some(Dir::Up)
        } else if self.down {
            Some(Dir::Down)
        } else if self.left {
            Some(Dir::Left)
        } else if self.right {
            Some(Dir::Right)
        } else {
            None
        }
    }
}

/// What the caller should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Continue,
    PlayerDied,
    LevelCompleted,
    OutOfTime,
}

/// Advance the level by `dt` seconds of wall-clock time.
///
/// Terminal outcomes are reported once, on the tick they happen. The world
/// keeps running afterwards (explosions settle, enemies patrol) but the player
/// and countdown are frozen. Reset and quit requests are left to the session;
/// a tick carrying one does nothing.
pub fn step(
    level: &mut Level,
    input: &TickInput,
    dt: f32,
    audio: &mut dyn AudioSink,
) -> Result<TickOutcome, SimError> {
    if input.reset || input.quit {
        return Ok(TickOutcome::Continue);
    }
    if level.status == LevelStatus::Completed {
        return Ok(TickOutcome::Continue);
    }
    if !level.started {
        level.started = true;
        audio.play_once(SoundId::Cover);
    }

    let elapsed = level.clock.advance(dt);
    let playing = level.status == LevelStatus::Playing;

    if playing && move_player(level, input, audio) == PlayerEvent::Exited {
        level.status = LevelStatus::Completed;
        level.loops.stop(audio);
        return Ok(TickOutcome::LevelCompleted);
    }

    if level.clock.due(&mut level.timers.last_flood, level.config.flood_interval)
        && let FloodEvent::Converted(n) = flood_step(level)
    {
        log::info!("Water turned into {} diamonds", n);
    }

    if level.clock.due(&mut level.timers.last_enemy, level.config.enemy_interval) {
        move_enemies(level, EnemyKind::Firefly, audio)?;
        move_enemies(level, EnemyKind::Butterfly, audio)?;
    }

    if level.clock.due(&mut level.timers.last_drop, level.config.drop_interval) {
        physics_step(level, audio)?;
    }

    resolve_explosions(level);

    let flood_on = flood_active(level);
    let wall_on = level.magic_wall.is_active();
    level.loops.sync(flood_on, wall_on, audio);

    let mut outcome = TickOutcome::Continue;
    if playing {
        if !level.player.alive {
            level.status = LevelStatus::Dead;
            outcome = TickOutcome::PlayerDied;
            log::info!("Player died at ({}, {})", level.player.pos.x, level.player.pos.y);
        } else if countdown(level, elapsed, audio) {
            level.status = LevelStatus::TimedOut;
            outcome = TickOutcome::OutOfTime;
            log::info!("Level '{}' ran out of time", level.params.name);
        }
    }

    if level.config.verify_invariants {
        level.check_invariants()?;
    }
    Ok(outcome)
}

/// Run the level clock down; plays the warning beeps for the final seconds.
/// Returns true when time is up.
fn countdown(level: &mut Level, elapsed_us: u64, audio: &mut dyn AudioSink) -> bool {
    let before = level.time_left_us;
    level.time_left_us = before.saturating_sub(elapsed_us);

    let whole = |us: u64| us.div_ceil(1_000_000);
    let (was, now) = (whole(before), whole(level.time_left_us));
    if now < was && (1..=TIMEOUT_WARNING_SECS as u64).contains(&now) {
        audio.play_once(SoundId::Timeout(now as u8));
    }
    level.time_left_us == 0
}
