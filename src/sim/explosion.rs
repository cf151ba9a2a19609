//! Explosions
//!
//! A 3x3 blast, pulled in from the level border, that wipes out everything
//! destructible under it for a short while and then leaves either empty space
//! or (for butterflies) a block of fresh diamonds.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::clock::SimClock;
use super::grid::{Pos, Tile};
use super::level::{EnemyKind, Level};
use crate::audio::{AudioSink, SoundId};
use crate::error::{Pool, SimError};

/// What blew up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionCause {
    Firefly,
    Butterfly,
    Player,
}

impl From<EnemyKind> for ExplosionCause {
    fn from(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Firefly => ExplosionCause::Firefly,
            EnemyKind::Butterfly => ExplosionCause::Butterfly,
        }
    }
}

impl ExplosionCause {
    /// Tile left behind when the blast clears
    pub fn residue(self) -> Tile {
        match self {
            ExplosionCause::Butterfly => Tile::Diamond,
            _ => Tile::Empty,
        }
    }
}

/// Inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub min: Pos,
    pub max: Pos,
}

impl Area {
    /// 3x3 around `center`, never touching the outer ring of a `width` x `height` grid
    pub fn around(center: Pos, width: usize, height: usize) -> Self {
        let inner_max = IVec2::new(width as i32 - 2, height as i32 - 2);
        Self {
            min: (center - IVec2::ONE).max(IVec2::ONE),
            max: (center + IVec2::ONE).min(inner_max),
        }
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }

    /// Row-major cells
    pub fn cells(&self) -> impl Iterator<Item = Pos> + use<> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
    }
}

/// A running explosion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosion {
    pub cause: ExplosionCause,
    pub area: Area,
    pub started_us: u64,
    pub duration_us: u64,
}

impl Explosion {
    #[inline]
    pub fn expired(&self, now_us: u64) -> bool {
        now_us.saturating_sub(self.started_us) >= self.duration_us
    }

    /// 0 at ignition, 1 when it clears
    pub fn progress(&self, now_us: u64) -> f32 {
        if self.duration_us == 0 {
            return 1.0;
        }
        (now_us.saturating_sub(self.started_us) as f32 / self.duration_us as f32).min(1.0)
    }
}

/// Fixed pool of explosion slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionPool {
    slots: Vec<Option<Explosion>>,
}

impl ExplosionPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Put into the first free slot; hands the explosion back when full
    pub fn insert(&mut self, explosion: Explosion) -> Result<(), Explosion> {
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(explosion);
                Ok(())
            }
            None => Err(explosion),
        }
    }

    /// Remove the explosion that started first
    pub fn take_oldest(&mut self) -> Option<Explosion> {
        let slot = self
            .slots
            .iter_mut()
            .filter(|s| s.is_some())
            .min_by_key(|s| s.map(|e| e.started_us))?;
        slot.take()
    }

    /// Remove every explosion whose time is up
    pub fn take_expired(&mut self, now_us: u64) -> Vec<Explosion> {
        self.slots
            .iter_mut()
            .filter(|s| s.is_some_and(|e| e.expired(now_us)))
            .filter_map(Option::take)
            .collect()
    }

    pub fn active(&self) -> impl Iterator<Item = &Explosion> {
        self.slots.iter().flatten()
    }

    /// Whether any running explosion covers `pos`
    pub fn covers(&self, pos: Pos) -> bool {
        self.active().any(|e| e.area.contains(pos))
    }
}

/// Set off an explosion at `center`. Returns true if the player was caught in it.
pub fn explode(
    level: &mut Level,
    center: Pos,
    cause: ExplosionCause,
    audio: &mut dyn AudioSink,
) -> Result<bool, SimError> {
    if level.explosions.is_full() {
        if level.config.strict_pools {
            return Err(SimError::PoolExhausted {
                pool: Pool::Explosions,
            });
        }
        level.stats.dropped_explosions += 1;
        log::warn!(
            "Explosion pool full ({} slots), clearing oldest early",
            level.explosions.capacity()
        );
        if let Some(oldest) = level.explosions.take_oldest() {
            clear_area(level, &oldest);
        }
    }

    let explosion = Explosion {
        cause,
        area: Area::around(center, level.width(), level.height()),
        started_us: level.clock.now(),
        duration_us: SimClock::secs_to_micros(level.config.explosion_duration_for(cause)),
    };

    let mut caught_player = false;
    for pos in explosion.area.cells() {
        let tile = level.grid.tile_at(pos);
        if tile.is_indestructible() {
            continue;
        }
        if tile == Tile::Player {
            level.player.alive = false;
            caught_player = true;
        }
        level.replace(pos, Tile::Ignore);
    }

    if level.explosions.insert(explosion).is_err() {
        // A slot was freed above unless the pool has no slots at all
        return Err(SimError::PoolExhausted {
            pool: Pool::Explosions,
        });
    }
    audio.play_once(SoundId::Explosion);
    log::debug!(
        "{:?} explosion at ({}, {}){}",
        cause,
        center.x,
        center.y,
        if caught_player { ", player caught" } else { "" }
    );
    Ok(caught_player)
}

/// Clear every explosion whose time is up. Returns how many cleared.
pub fn resolve_explosions(level: &mut Level) -> usize {
    let expired = level.explosions.take_expired(level.clock.now());
    for explosion in &expired {
        clear_area(level, explosion);
    }
    expired.len()
}

/// Turn the blast's cells into its residue, leaving cells another running
/// explosion still covers alone
fn clear_area(level: &mut Level, explosion: &Explosion) {
    let residue = explosion.cause.residue();
    for pos in explosion.area.cells() {
        if level.grid.tile_at(pos) != Tile::Ignore || level.explosions.covers(pos) {
            continue;
        }
        level.spawn(pos, residue);
    }
}
