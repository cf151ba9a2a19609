//! Read-only frame for renderers
//!
//! A [`FrameView`] borrows the level; it exposes what a host needs to draw a
//! frame without handing out the registries.

use serde::{Deserialize, Serialize};

use super::explosion::{Area, ExplosionCause};
use super::grid::{Pos, Tile};
use super::level::{Level, Player};

/// Explosion as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionView {
    pub area: Area,
    pub cause: ExplosionCause,
    /// 0 at ignition, 1 when it clears
    pub progress: f32,
}

/// Slide marker as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LockView {
    pub pos: Pos,
    /// How far the slide has played out (0..1)
    pub progress: f32,
}

/// Heads-up display numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub level_name: String,
    pub score: u64,
    pub collected: u32,
    pub required: u32,
    pub time_remaining: f32,
    pub exit_unlocked: bool,
}

pub struct FrameView<'a> {
    level: &'a Level,
}

impl<'a> FrameView<'a> {
    pub fn width(&self) -> usize {
        self.level.width()
    }

    pub fn height(&self) -> usize {
        self.level.height()
    }

    /// Tile rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &'a [Tile]> + use<'a> {
        let level = self.level;
        level.grid.rows()
    }

    /// Tile at `pos`; out-of-bounds reads as steel wall
    pub fn tile(&self, pos: Pos) -> Tile {
        self.level.grid.get(pos).unwrap_or(Tile::SteelWall)
    }

    pub fn explosions(&self) -> impl Iterator<Item = ExplosionView> + use<'a> {
        let level = self.level;
        let now = level.clock.now();
        level.explosions.active().map(move |e| ExplosionView {
            area: e.area,
            cause: e.cause,
            progress: e.progress(now),
        })
    }

    pub fn magic_wall_active(&self) -> bool {
        self.level.magic_wall.is_active()
    }

    pub fn locks(&self) -> impl Iterator<Item = LockView> + use<'a> {
        let level = self.level;
        let total = level.config.lock_ticks.max(1) as f32;
        level.locks.active().map(move |l| LockView {
            pos: l.pos,
            progress: 1.0 - l.ticks_left as f32 / total,
        })
    }

    pub fn player(&self) -> Player {
        self.level.player()
    }

    pub fn hud(&self) -> Hud {
        Hud {
            level_name: self.level.params.name.clone(),
            score: self.level.score,
            collected: self.level.diamonds_collected,
            required: self.level.min_diamonds,
            time_remaining: self.level.time_remaining(),
            exit_unlocked: self.level.exit_unlocked,
        }
    }

    pub fn to_ascii(&self) -> String {
        self.level.to_ascii()
    }
}

impl Level {
    pub fn view(&self) -> FrameView<'_> {
        FrameView { level: self }
    }
}
