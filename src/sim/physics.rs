//! Gravity for rocks and diamonds
//!
//! One physics pass walks a registry and, per object, tries in order: pass
//! through an active magic wall, crush whatever is below, fall, slide off a
//! rounded surface. Objects that do none of these come to rest.

use serde::{Deserialize, Serialize};

use super::explosion::{ExplosionCause, explode};
use super::grid::{Dir, Pos, Tile};
use super::level::{BoulderKind, Level};
use super::registry::Boulder;
use crate::audio::{AudioSink, SoundId};
use crate::consts::DIAMOND_LAND_VARIANTS;
use crate::error::{Pool, SimError};
use crate::sim::clock::SimClock;

/// Magic wall lifecycle; it runs once per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MagicWallState {
    #[default]
    Dormant,
    Active { since_us: u64 },
    /// Ran its course; behaves as plain wall from now on
    Expired,
}

/// The level's magic wall bricks and their shared state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MagicWall {
    pub bricks: Vec<Pos>,
    pub state: MagicWallState,
}

impl MagicWall {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, MagicWallState::Active { .. })
    }

    /// Switch on if still dormant. Returns true on the transition.
    pub fn activate(&mut self, now_us: u64) -> bool {
        if self.state == MagicWallState::Dormant && !self.bricks.is_empty() {
            self.state = MagicWallState::Active { since_us: now_us };
            true
        } else {
            false
        }
    }

    /// Expire once the active window has passed. Returns true on the transition.
    pub fn update(&mut self, now_us: u64, duration: f32) -> bool {
        if let MagicWallState::Active { since_us } = self.state
            && now_us.saturating_sub(since_us) >= SimClock::secs_to_micros(duration)
        {
            self.state = MagicWallState::Expired;
            return true;
        }
        false
    }

    /// Fraction of the active window used up (0 when not active)
    pub fn progress(&self, now_us: u64, duration: f32) -> f32 {
        match self.state {
            MagicWallState::Active { since_us } => {
                let total = SimClock::secs_to_micros(duration).max(1);
                (now_us.saturating_sub(since_us) as f32 / total as f32).min(1.0)
            }
            MagicWallState::Expired => 1.0,
            MagicWallState::Dormant => 0.0,
        }
    }
}

/// A slide marker slot; `ticks_left == 0` means free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub pos: Pos,
    pub ticks_left: u8,
}

/// Fixed pool of slide markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockPool {
    slots: Vec<Lock>,
}

impl LockPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![
                Lock {
                    pos: Pos::ZERO,
                    ticks_left: 0
                };
                capacity
            ],
        }
    }

    /// Claim the first free slot
    pub fn allocate(&mut self, pos: Pos, ticks: u8) -> bool {
        match self.slots.iter_mut().find(|l| l.ticks_left == 0) {
            Some(slot) => {
                *slot = Lock {
                    pos,
                    ticks_left: ticks,
                };
                true
            }
            None => false,
        }
    }

    /// Free the marker at `pos` (its tile is being overwritten)
    pub fn release(&mut self, pos: Pos) {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|l| l.ticks_left > 0 && l.pos == pos)
        {
            slot.ticks_left = 0;
        }
    }

    /// Count every marker down one physics tick; returns the ones that ran out
    pub fn tick(&mut self) -> Vec<Pos> {
        let mut expired = Vec::new();
        for slot in self.slots.iter_mut().filter(|l| l.ticks_left > 0) {
            slot.ticks_left -= 1;
            if slot.ticks_left == 0 {
                expired.push(slot.pos);
            }
        }
        expired
    }

    pub fn active(&self) -> impl Iterator<Item = &Lock> {
        self.slots.iter().filter(|l| l.ticks_left > 0)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Pos> {
        self.active().map(|l| &l.pos)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Objects that came out of the magic wall this tick. They join their new
/// registry once both gravity passes are done, so nothing moves twice.
pub type Morphs = Vec<(BoulderKind, Boulder)>;

/// One full physics tick: age slide markers, age the magic wall, then drop
/// rocks and diamonds. Returns true if the player was crushed.
pub fn physics_step(level: &mut Level, audio: &mut dyn AudioSink) -> Result<bool, SimError> {
    for pos in level.locks.tick() {
        if level.grid.tile_at(pos) == Tile::Lock {
            level.grid.set_tile(pos, Tile::Empty);
        }
    }

    let now = level.clock.now();
    if level.magic_wall.update(now, level.config.magic_wall_duration) {
        log::debug!("Magic wall expired");
    }

    let mut morphs = Morphs::new();
    let rocks = drop_objects(level, BoulderKind::Rock, &mut morphs, audio)?;
    let diamonds = drop_objects(level, BoulderKind::Diamond, &mut morphs, audio)?;
    for (kind, boulder) in morphs {
        // a blast later in the tick may already have taken it
        if level.grid.tile_at(boulder.pos) == kind.tile() {
            level.boulders_mut(kind).push(boulder);
        }
    }
    level.stats.physics_ticks += 1;
    Ok(rocks || diamonds)
}

/// Gravity pass over one registry. Plays at most one landing sound for the
/// whole pass. Returns true if a falling object hit the player.
///
/// The pass walks a snapshot of positions taken up front. Explosions
/// swap-remove entries mid-pass, so walking indices would skip objects.
pub fn drop_objects(
    level: &mut Level,
    kind: BoulderKind,
    morphs: &mut Morphs,
    audio: &mut dyn AudioSink,
) -> Result<bool, SimError> {
    let down = Dir::Down.delta();
    let mut landed = false;
    let mut player_killed = false;

    let order = level.boulders(kind).positions();
    for start in order {
        // gone if an earlier blast in this pass took it
        let Some(i) = level.boulders(kind).find(start) else {
            continue;
        };
        let Some(&obj) = level.boulders(kind).get(i) else {
            continue;
        };
        let pos = obj.pos;
        let below = pos + down;
        let below_tile = level.grid.tile_at(below);

        // Magic wall
        if below_tile == Tile::MagicWall && obj.falling {
            if level.magic_wall.activate(level.clock.now()) {
                log::debug!("Magic wall activated at ({}, {})", below.x, below.y);
            }
            if level.magic_wall.is_active() {
                let exit = below + down;
                if level.grid.tile_at(exit).is_empty() {
                    let morphed = kind.morphed();
                    level.boulders_mut(kind).swap_remove(i);
                    level.grid.set_tile(pos, Tile::Empty);
                    level.grid.set_tile(exit, morphed.tile());
                    morphs.push((
                        morphed,
                        Boulder {
                            pos: exit,
                            falling: true,
                        },
                    ));
                    continue;
                }
                if kind == BoulderKind::Rock {
                    level.boulders_mut(kind).swap_remove(i);
                    level.grid.set_tile(pos, Tile::Empty);
                    continue;
                }
            }
        }

        // Crush
        let cause = match below_tile {
            Tile::Firefly => Some(ExplosionCause::Firefly),
            Tile::Butterfly => Some(ExplosionCause::Butterfly),
            Tile::Player if obj.falling => Some(ExplosionCause::Player),
            _ => None,
        };
        if let Some(cause) = cause {
            if explode(level, below, cause, audio)? {
                player_killed = true;
            }
            continue;
        }

        // Fall
        if below_tile.is_empty() {
            level.grid.set_tile(pos, Tile::Empty);
            level.grid.set_tile(below, kind.tile());
            if let Some(entry) = level.boulders_mut(kind).get_mut(i) {
                entry.pos = below;
                entry.falling = true;
            }
            if lands_on(level, below + down) {
                landed = true;
            }
            continue;
        }

        // Slide
        let slid = !obj.falling && below_tile.is_rounded() && try_slide(level, kind, i)?;
        if !slid && let Some(entry) = level.boulders_mut(kind).get_mut(i) {
            entry.falling = false;
        }
    }

    if landed {
        match kind {
            BoulderKind::Rock => audio.play_once(SoundId::RockLand),
            BoulderKind::Diamond => {
                let variant = level.diamond_sound_cursor;
                level.diamond_sound_cursor = (variant + 1) % DIAMOND_LAND_VARIANTS;
                audio.play_once(SoundId::DiamondLand(variant));
            }
        }
    }
    Ok(player_killed)
}

/// Whether an object that just dropped above `under` has come to rest
fn lands_on(level: &Level, under: Pos) -> bool {
    match level.grid.tile_at(under) {
        Tile::Empty => false,
        Tile::MagicWall if level.magic_wall.is_active() => false,
        Tile::Rock | Tile::Diamond => !level.is_falling_at(under),
        _ => true,
    }
}

/// Roll the object at registry index `i` off whatever it rests on, left first
fn try_slide(level: &mut Level, kind: BoulderKind, i: usize) -> Result<bool, SimError> {
    let Some(&obj) = level.boulders(kind).get(i) else {
        return Ok(false);
    };
    let pos = obj.pos;
    let above = level.grid.tile_at(pos + Dir::Up.delta());
    if matches!(above, Tile::Rock | Tile::Diamond | Tile::Lock) {
        return Ok(false);
    }

    for side in [Dir::Left, Dir::Right] {
        let lateral = pos + side.delta();
        if !level.grid.tile_at(lateral).is_empty()
            || !level.grid.tile_at(lateral + Dir::Down.delta()).is_empty()
        {
            continue;
        }

        if level.locks.allocate(pos, level.config.lock_ticks) {
            level.grid.set_tile(pos, Tile::Lock);
        } else {
            if level.config.strict_pools {
                return Err(SimError::PoolExhausted { pool: Pool::Locks });
            }
            level.stats.dropped_locks += 1;
            log::warn!(
                "Slide lock pool full ({} slots), dropping marker at ({}, {})",
                level.locks.capacity(),
                pos.x,
                pos.y
            );
            level.grid.set_tile(pos, Tile::Empty);
        }
        level.grid.set_tile(lateral, kind.tile());
        if let Some(entry) = level.boulders_mut(kind).get_mut(i) {
            entry.pos = lateral;
            entry.falling = false;
        }
        return Ok(true);
    }
    Ok(false)
}
