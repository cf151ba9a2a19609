//! Level state and template loading
//!
//! A [`Level`] owns the grid and every registry mirrored against it. Anything
//! that changes a rock, diamond, enemy or water tile goes through the helpers
//! here so both sides move together.

use std::collections::HashSet;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::clock::SimClock;
use super::explosion::ExplosionPool;
use super::grid::{Dir, Grid, Pos, Tile};
use super::physics::{LockPool, MagicWall};
use super::registry::{Boulder, Enemy, Registry};
use crate::audio::LoopTracker;
use crate::consts::*;
use crate::error::SimError;
use crate::settings::SimConfig;

/// Rock or diamond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoulderKind {
    Rock,
    Diamond,
}

impl BoulderKind {
    pub fn tile(self) -> Tile {
        match self {
            BoulderKind::Rock => Tile::Rock,
            BoulderKind::Diamond => Tile::Diamond,
        }
    }

    /// What a magic wall turns this into
    pub fn morphed(self) -> Self {
        match self {
            BoulderKind::Rock => BoulderKind::Diamond,
            BoulderKind::Diamond => BoulderKind::Rock,
        }
    }
}

/// Firefly or butterfly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Firefly,
    Butterfly,
}

impl EnemyKind {
    pub fn tile(self) -> Tile {
        match self {
            EnemyKind::Firefly => Tile::Firefly,
            EnemyKind::Butterfly => Tile::Butterfly,
        }
    }

    /// Heading when spawned from a template
    pub fn initial_dir(self) -> Dir {
        match self {
            EnemyKind::Firefly => Dir::Left,
            EnemyKind::Butterfly => Dir::Down,
        }
    }
}

/// Per-level configuration supplied with the template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    pub name: String,
    /// Countdown in seconds
    pub time: f32,
    pub score_per_diamond: u32,
    /// Score per diamond once the exit is open
    pub bonus_score_per_diamond: u32,
    /// Diamonds needed to open the exit; derived from the template when unset
    pub min_diamonds: Option<u32>,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            name: String::from("Untitled"),
            time: LEVEL_TIME,
            score_per_diamond: SCORE_PER_DIAMOND,
            bonus_score_per_diamond: BONUS_SCORE_PER_DIAMOND,
            min_diamonds: None,
        }
    }
}

/// Where the level stands as far as the caller is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStatus {
    Playing,
    Dead,
    Completed,
    TimedOut,
}

/// The player avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Pos,
    pub alive: bool,
}

/// A push in progress: direction held and since when
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushAttempt {
    pub dir: Dir,
    pub since_us: u64,
}

/// Last-run timestamps per sub-system (simulation microseconds)
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pub last_move: Option<u64>,
    pub last_drop: u64,
    pub last_enemy: u64,
    pub last_flood: u64,
}

/// Design-limit events (pool exhaustion) seen during the level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub dropped_locks: u32,
    pub dropped_explosions: u32,
    pub physics_ticks: u64,
}

/// Complete level state
#[derive(Debug, Clone)]
pub struct Level {
    pub(crate) grid: Grid,
    pub(crate) rocks: Registry<Boulder>,
    pub(crate) diamonds: Registry<Boulder>,
    pub(crate) fireflies: Registry<Enemy>,
    pub(crate) butterflies: Registry<Enemy>,
    /// Water cells in the order they appeared
    pub(crate) water: Vec<Pos>,
    /// Water has turned into diamonds and never spreads again
    pub(crate) flood_done: bool,
    pub(crate) magic_wall: MagicWall,
    pub(crate) locks: LockPool,
    pub(crate) explosions: ExplosionPool,
    pub(crate) exits: Vec<Pos>,
    pub(crate) player: Player,

    pub params: LevelParams,
    pub config: SimConfig,
    pub score: u64,
    pub score_per_diamond: u32,
    pub diamonds_collected: u32,
    pub min_diamonds: u32,
    pub exit_unlocked: bool,
    pub status: LevelStatus,

    pub(crate) clock: SimClock,
    pub(crate) time_left_us: u64,
    pub(crate) timers: Timers,
    pub(crate) push: Option<PushAttempt>,
    pub(crate) diamond_sound_cursor: u8,
    pub(crate) loops: LoopTracker,
    pub(crate) started: bool,
    pub stats: LevelStats,
}

impl Level {
    /// Parse a newline-separated template. Blank lines are skipped.
    pub fn from_template(
        template: &str,
        params: LevelParams,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        let rows: Vec<&str> = template
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        Self::from_rows(&rows, params, config)
    }

    /// Build a level from template rows (one character per tile)
    pub fn from_rows(rows: &[&str], params: LevelParams, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(SimError::EmptyTemplate);
        }

        let mut grid = Grid::new(width, height, Tile::Empty);
        let mut player: Option<(usize, usize)> = None;

        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(SimError::RaggedTemplate {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let tile = Tile::from_char(ch).ok_or(SimError::UnknownTile { ch, x, y })?;
                let pos = IVec2::new(x as i32, y as i32);
                if grid.is_border(pos)
                    && !matches!(tile, Tile::Wall | Tile::SteelWall | Tile::ExitLocked | Tile::ExitOpen)
                {
                    return Err(SimError::OpenBorder { x, y });
                }
                if tile == Tile::Player {
                    if let Some(first) = player {
                        return Err(SimError::MultiplePlayers {
                            first,
                            second: (x, y),
                        });
                    }
                    player = Some((x, y));
                }
                grid.set_tile(pos, tile);
            }
        }
        let (px, py) = player.ok_or(SimError::MissingPlayer)?;

        let mut level = Self::empty(grid, params, config);
        level.player = Player {
            pos: IVec2::new(px as i32, py as i32),
            alive: true,
        };
        level.seed_registries();

        let derived = (level.diamonds.len() as u32 + level.butterflies.len() as u32 * 9) / 6;
        level.min_diamonds = level.params.min_diamonds.unwrap_or(derived);
        if level.min_diamonds == 0 {
            level.unlock_exits();
        }

        log::info!(
            "Loaded level '{}' ({}x{}): {} rocks, {} diamonds, {} fireflies, {} butterflies, {} water, need {}",
            level.params.name,
            width,
            height,
            level.rocks.len(),
            level.diamonds.len(),
            level.fireflies.len(),
            level.butterflies.len(),
            level.water.len(),
            level.min_diamonds
        );
        Ok(level)
    }

    fn empty(grid: Grid, params: LevelParams, config: SimConfig) -> Self {
        let area = grid.width() * grid.height();
        let time_left_us = SimClock::secs_to_micros(params.time);
        Self {
            rocks: Registry::with_capacity(area / 8),
            diamonds: Registry::with_capacity(area / 8),
            fireflies: Registry::default(),
            butterflies: Registry::default(),
            water: Vec::new(),
            flood_done: false,
            magic_wall: MagicWall::default(),
            locks: LockPool::new(config.lock_pool),
            explosions: ExplosionPool::new(config.explosion_pool),
            exits: Vec::new(),
            player: Player {
                pos: IVec2::ZERO,
                alive: false,
            },
            score: 0,
            score_per_diamond: params.score_per_diamond,
            diamonds_collected: 0,
            min_diamonds: 0,
            exit_unlocked: false,
            status: LevelStatus::Playing,
            clock: SimClock::default(),
            time_left_us,
            timers: Timers::default(),
            push: None,
            diamond_sound_cursor: 0,
            loops: LoopTracker::default(),
            started: false,
            stats: LevelStats::default(),
            grid,
            params,
            config,
        }
    }

    /// Scan the grid once and register every special tile
    fn seed_registries(&mut self) {
        let cells: Vec<(Pos, Tile)> = self.grid.cells().collect();
        for (pos, tile) in cells {
            match tile {
                Tile::Rock => self.rocks.push(Boulder::at(pos)),
                Tile::Diamond => self.diamonds.push(Boulder::at(pos)),
                Tile::Firefly => self.fireflies.push(Enemy {
                    pos,
                    dir: EnemyKind::Firefly.initial_dir(),
                }),
                Tile::Butterfly => self.butterflies.push(Enemy {
                    pos,
                    dir: EnemyKind::Butterfly.initial_dir(),
                }),
                Tile::Water => self.water.push(pos),
                Tile::MagicWall => self.magic_wall.bricks.push(pos),
                Tile::ExitLocked | Tile::ExitOpen => self.exits.push(pos),
                _ => {}
            }
        }
    }

    // === Queries ===

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.grid.tile_at(pos)
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.grid.in_bounds(pos)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn boulders(&self, kind: BoulderKind) -> &Registry<Boulder> {
        match kind {
            BoulderKind::Rock => &self.rocks,
            BoulderKind::Diamond => &self.diamonds,
        }
    }

    pub(crate) fn boulders_mut(&mut self, kind: BoulderKind) -> &mut Registry<Boulder> {
        match kind {
            BoulderKind::Rock => &mut self.rocks,
            BoulderKind::Diamond => &mut self.diamonds,
        }
    }

    pub fn enemies(&self, kind: EnemyKind) -> &Registry<Enemy> {
        match kind {
            EnemyKind::Firefly => &self.fireflies,
            EnemyKind::Butterfly => &self.butterflies,
        }
    }

    pub(crate) fn enemies_mut(&mut self, kind: EnemyKind) -> &mut Registry<Enemy> {
        match kind {
            EnemyKind::Firefly => &mut self.fireflies,
            EnemyKind::Butterfly => &mut self.butterflies,
        }
    }

    pub fn water(&self) -> &[Pos] {
        &self.water
    }

    pub fn flood_done(&self) -> bool {
        self.flood_done
    }

    pub fn exits(&self) -> &[Pos] {
        &self.exits
    }

    pub fn magic_wall(&self) -> &MagicWall {
        &self.magic_wall
    }

    /// Simulation time since level start (seconds)
    pub fn elapsed(&self) -> f64 {
        self.clock.secs()
    }

    /// Countdown left (seconds)
    pub fn time_remaining(&self) -> f32 {
        self.time_left_us as f32 / 1_000_000.0
    }

    /// Whether a rock or diamond at `pos` dropped on its last physics pass
    pub fn is_falling_at(&self, pos: Pos) -> bool {
        [&self.rocks, &self.diamonds]
            .iter()
            .any(|reg| reg.find(pos).and_then(|i| reg.get(i)).is_some_and(|b| b.falling))
    }

    // === Invariant-preserving mutation ===

    /// Place a registered object (or plain tile) at `pos`
    pub(crate) fn spawn(&mut self, pos: Pos, tile: Tile) {
        match tile {
            Tile::Rock => self.rocks.push(Boulder::at(pos)),
            Tile::Diamond => self.diamonds.push(Boulder::at(pos)),
            Tile::Firefly => self.fireflies.push(Enemy {
                pos,
                dir: EnemyKind::Firefly.initial_dir(),
            }),
            Tile::Butterfly => self.butterflies.push(Enemy {
                pos,
                dir: EnemyKind::Butterfly.initial_dir(),
            }),
            Tile::Water => self.water.push(pos),
            _ => {}
        }
        self.grid.set_tile(pos, tile);
    }

    /// Drop whatever registry entry backs the tile at `pos`, then retag it
    pub(crate) fn replace(&mut self, pos: Pos, tile: Tile) {
        match self.grid.tile_at(pos) {
            Tile::Rock => {
                self.rocks.remove_at(pos);
            }
            Tile::Diamond => {
                self.diamonds.remove_at(pos);
            }
            Tile::Firefly => {
                self.fireflies.remove_at(pos);
            }
            Tile::Butterfly => {
                self.butterflies.remove_at(pos);
            }
            Tile::Water => self.water.retain(|w| *w != pos),
            Tile::MagicWall => self.magic_wall.bricks.retain(|b| *b != pos),
            Tile::Lock => self.locks.release(pos),
            _ => {}
        }
        self.grid.set_tile(pos, tile);
    }

    /// Flip every exit to open (one-way)
    pub(crate) fn unlock_exits(&mut self) {
        if self.exit_unlocked {
            return;
        }
        self.exit_unlocked = true;
        self.score_per_diamond = self.params.bonus_score_per_diamond;
        for &pos in &self.exits {
            if self.grid.tile_at(pos) == Tile::ExitLocked {
                self.grid.set_tile(pos, Tile::ExitOpen);
            }
        }
        log::info!("Exit unlocked after {} diamonds", self.diamonds_collected);
    }

    // === Invariants ===

    /// Verify that grid tags and registries agree one-to-one
    pub fn check_invariants(&self) -> Result<(), SimError> {
        fn check<'a>(
            grid: &Grid,
            tile: Tile,
            positions: impl Iterator<Item = &'a Pos>,
            what: &str,
        ) -> Result<(), SimError> {
            let mut seen = HashSet::new();
            for pos in positions {
                if !seen.insert(*pos) {
                    return Err(SimError::Invariant(format!(
                        "{} registered twice at ({}, {})",
                        what, pos.x, pos.y
                    )));
                }
                match grid.get(*pos) {
                    Some(t) if t == tile => {}
                    found => {
                        return Err(SimError::Invariant(format!(
                            "{} registered at ({}, {}) but tile is {:?}",
                            what, pos.x, pos.y, found
                        )));
                    }
                }
            }
            let tagged = grid.count(tile);
            if tagged != seen.len() {
                return Err(SimError::Invariant(format!(
                    "{} {:?} tiles but {} registered",
                    tagged,
                    tile,
                    seen.len()
                )));
            }
            Ok(())
        }

        check(&self.grid, Tile::Rock, self.rocks.iter().map(|b| &b.pos), "rock")?;
        check(&self.grid, Tile::Diamond, self.diamonds.iter().map(|b| &b.pos), "diamond")?;
        check(&self.grid, Tile::Firefly, self.fireflies.iter().map(|e| &e.pos), "firefly")?;
        check(&self.grid, Tile::Butterfly, self.butterflies.iter().map(|e| &e.pos), "butterfly")?;
        check(&self.grid, Tile::Water, self.water.iter(), "water")?;
        check(&self.grid, Tile::Lock, self.locks.positions(), "lock")?;

        let players = self.grid.count(Tile::Player);
        if self.player.alive {
            if players != 1 || self.grid.tile_at(self.player.pos) != Tile::Player {
                return Err(SimError::Invariant(format!(
                    "player at ({}, {}) but {} player tiles",
                    self.player.pos.x, self.player.pos.y, players
                )));
            }
        } else if players != 0 {
            return Err(SimError::Invariant("dead player still on the grid".into()));
        }
        Ok(())
    }

    /// ASCII dump, one row per line
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in self.grid.rows() {
            out.extend(row.iter().map(|t| t.to_char()));
            out.push('\n');
        }
        out
    }
}
