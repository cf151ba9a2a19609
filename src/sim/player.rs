//! Player movement, digging, collecting and pushing

use super::grid::{Dir, Pos, Tile};
use super::level::{Level, PushAttempt};
use super::tick::TickInput;
use crate::audio::{AudioSink, SoundId};
use crate::sim::clock::SimClock;

/// Result of a player update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Idle,
    Moved(Pos),
    /// Dug or collected the adjacent tile without moving
    PickedUp(Pos),
    Pushed { rock: Pos },
    /// Stepped onto the open exit
    Exited,
}

/// Whether the player may step onto `tile`
#[inline]
pub fn can_move(tile: Tile) -> bool {
    matches!(tile, Tile::Empty | Tile::Earth | Tile::Diamond | Tile::ExitOpen)
}

pub fn move_player(level: &mut Level, input: &TickInput, audio: &mut dyn AudioSink) -> PlayerEvent {
    if !level.player.alive {
        return PlayerEvent::Idle;
    }
    let Some(dir) = input.direction() else {
        level.push = None;
        return PlayerEvent::Idle;
    };
    if level.push.is_some_and(|p| p.dir != dir) {
        level.push = None;
    }

    let now = level.clock.now();
    let interval = SimClock::secs_to_micros(level.config.move_interval);
    if level
        .timers
        .last_move
        .is_some_and(|last| level.clock.since(last) < interval)
    {
        return PlayerEvent::Idle;
    }

    let from = level.player.pos;
    let to = from + dir.delta();
    let target = level.grid.tile_at(to);

    if input.pickup && level.config.pickup_modifier {
        level.push = None;
        return match target {
            Tile::Earth => {
                level.grid.set_tile(to, Tile::Empty);
                audio.play_once(SoundId::WalkEarth);
                level.timers.last_move = Some(now);
                PlayerEvent::PickedUp(to)
            }
            Tile::Diamond => {
                collect_diamond(level, to, audio);
                level.grid.set_tile(to, Tile::Empty);
                level.timers.last_move = Some(now);
                PlayerEvent::PickedUp(to)
            }
            _ => PlayerEvent::Idle,
        };
    }

    match target {
        Tile::Empty => {
            audio.play_once(SoundId::WalkEmpty);
            step_to(level, to, now);
            PlayerEvent::Moved(to)
        }
        Tile::Earth => {
            audio.play_once(SoundId::WalkEarth);
            step_to(level, to, now);
            PlayerEvent::Moved(to)
        }
        Tile::Diamond => {
            collect_diamond(level, to, audio);
            step_to(level, to, now);
            PlayerEvent::Moved(to)
        }
        Tile::ExitOpen => {
            step_to(level, to, now);
            audio.play_once(SoundId::Finished);
            log::info!(
                "Level '{}' completed with {} points",
                level.params.name,
                level.score
            );
            PlayerEvent::Exited
        }
        Tile::Rock if dir.is_horizontal() => try_push(level, dir, to, now),
        _ => {
            level.push = None;
            PlayerEvent::Idle
        }
    }
}

/// Move the avatar; the tile it leaves becomes empty
fn step_to(level: &mut Level, to: Pos, now: u64) {
    level.grid.set_tile(level.player.pos, Tile::Empty);
    level.grid.set_tile(to, Tile::Player);
    level.player.pos = to;
    level.timers.last_move = Some(now);
    level.push = None;
}

/// A rock gives way only after the direction was held for the dwell time
fn try_push(level: &mut Level, dir: Dir, rock: Pos, now: u64) -> PlayerEvent {
    let beyond = rock + dir.delta();
    if !level.grid.tile_at(beyond).is_empty() || level.is_falling_at(rock) {
        level.push = None;
        return PlayerEvent::Idle;
    }

    let dwell = SimClock::secs_to_micros(level.config.push_dwell);
    match level.push {
        Some(attempt) if attempt.dir == dir && level.clock.since(attempt.since_us) >= dwell => {
            if let Some(i) = level.rocks.find(rock)
                && let Some(entry) = level.rocks.get_mut(i)
            {
                entry.pos = beyond;
                entry.falling = false;
            }
            level.grid.set_tile(beyond, Tile::Rock);
            level.grid.set_tile(rock, Tile::Empty);
            step_to(level, rock, now);
            PlayerEvent::Pushed { rock: beyond }
        }
        Some(attempt) if attempt.dir == dir => PlayerEvent::Idle,
        _ => {
            level.push = Some(PushAttempt { dir, since_us: now });
            PlayerEvent::Idle
        }
    }
}

/// Take the diamond at `pos` off the board and score it. The tile is left for
/// the caller to overwrite.
fn collect_diamond(level: &mut Level, pos: Pos, audio: &mut dyn AudioSink) {
    level.diamonds.remove_at(pos);
    level.diamonds_collected += 1;
    level.score += level.score_per_diamond as u64;
    audio.play_once(SoundId::DiamondCollect);

    if !level.exit_unlocked && level.diamonds_collected >= level.min_diamonds {
        level.unlock_exits();
        audio.play_once(SoundId::Crack);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundLog;
    use crate::settings::SimConfig;
    use crate::sim::level::LevelParams;
    use glam::IVec2;

    fn level_with(rows: &[&str], params: LevelParams) -> Level {
        Level::from_rows(rows, params, SimConfig::default()).unwrap()
    }

    fn level(rows: &[&str]) -> Level {
        level_with(rows, LevelParams::default())
    }

    fn held(dir: Dir) -> TickInput {
        TickInput::held(dir)
    }

    #[test]
    fn test_moves_and_digs() {
        let mut lvl = level(&["WWWWW", "WX. W", "WWWWW"]);
        let mut log = SoundLog::new();
        assert_eq!(
            move_player(&mut lvl, &held(Dir::Right), &mut log),
            PlayerEvent::Moved(IVec2::new(2, 1))
        );
        assert_eq!(log.count(SoundId::WalkEarth), 1);
        assert_eq!(lvl.tile_at(IVec2::new(1, 1)), Tile::Empty);
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_move_interval_gates_steps() {
        let mut lvl = level(&["WWWWWW", "WX   W", "WWWWWW"]);
        let mut log = SoundLog::new();
        let right = held(Dir::Right);
        move_player(&mut lvl, &right, &mut log);
        lvl.clock.advance(0.05);
        assert_eq!(move_player(&mut lvl, &right, &mut log), PlayerEvent::Idle);
        lvl.clock.advance(0.05);
        assert_eq!(
            move_player(&mut lvl, &right, &mut log),
            PlayerEvent::Moved(IVec2::new(3, 1))
        );
    }

    #[test]
    fn test_blocked_by_wall_rock_vertical_and_locked_exit() {
        let mut lvl = level(&["WWWWW", "WXP W", "W r W", "WWWWW"]);
        let mut log = SoundLog::new();
        assert_eq!(move_player(&mut lvl, &held(Dir::Right), &mut log), PlayerEvent::Idle);
        assert_eq!(move_player(&mut lvl, &held(Dir::Up), &mut log), PlayerEvent::Idle);
        assert_eq!(lvl.player.pos, IVec2::new(1, 1));
    }

    #[test]
    fn test_exit_unlocks_on_nth_diamond_only() {
        let params = LevelParams {
            min_diamonds: Some(2),
            score_per_diamond: 10,
            bonus_score_per_diamond: 15,
            ..Default::default()
        };
        let mut lvl = level_with(&["WWWWWWW", "WXdddPW", "WWWWWWW"], params);
        let mut log = SoundLog::new();
        let right = held(Dir::Right);

        move_player(&mut lvl, &right, &mut log);
        assert_eq!(lvl.diamonds_collected, 1);
        assert!(!lvl.exit_unlocked);
        assert_eq!(lvl.tile_at(IVec2::new(5, 1)), Tile::ExitLocked);

        lvl.clock.advance(0.1);
        move_player(&mut lvl, &right, &mut log);
        assert!(lvl.exit_unlocked);
        assert_eq!(lvl.tile_at(IVec2::new(5, 1)), Tile::ExitOpen);
        assert_eq!(lvl.score, 20);
        assert_eq!(log.count(SoundId::Crack), 1);

        lvl.clock.advance(0.1);
        move_player(&mut lvl, &right, &mut log);
        assert_eq!(lvl.score, 35);
        assert!(lvl.exit_unlocked);
        assert_eq!(log.count(SoundId::Crack), 1);

        lvl.clock.advance(0.1);
        assert_eq!(move_player(&mut lvl, &right, &mut log), PlayerEvent::Exited);
        assert_eq!(log.count(SoundId::Finished), 1);
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_push_needs_dwell() {
        let mut lvl = level(&["WWWWWW", "WXr  W", "WWWWWW"]);
        let mut log = SoundLog::new();
        let right = held(Dir::Right);

        // 0.4s of pushing: nothing moves
        for _ in 0..5 {
            assert_eq!(move_player(&mut lvl, &right, &mut log), PlayerEvent::Idle);
            lvl.clock.advance(0.1);
        }
        assert_eq!(lvl.rocks.get(0).unwrap().pos, IVec2::new(2, 1));

        // 0.5s reached: rock and player move together, once
        assert_eq!(
            move_player(&mut lvl, &right, &mut log),
            PlayerEvent::Pushed {
                rock: IVec2::new(3, 1)
            }
        );
        assert_eq!(lvl.player.pos, IVec2::new(2, 1));
        lvl.clock.advance(0.1);
        assert_eq!(move_player(&mut lvl, &right, &mut log), PlayerEvent::Idle);
        assert_eq!(lvl.rocks.get(0).unwrap().pos, IVec2::new(3, 1));
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_releasing_resets_push_dwell() {
        let mut lvl = level(&["WWWWWW", "WXr  W", "WWWWWW"]);
        let mut log = SoundLog::new();
        let right = held(Dir::Right);
        for _ in 0..4 {
            move_player(&mut lvl, &right, &mut log);
            lvl.clock.advance(0.1);
        }
        move_player(&mut lvl, &TickInput::default(), &mut log);
        assert!(lvl.push.is_none());
        for _ in 0..3 {
            lvl.clock.advance(0.1);
            assert_eq!(move_player(&mut lvl, &right, &mut log), PlayerEvent::Idle);
        }
        assert_eq!(lvl.rocks.get(0).unwrap().pos, IVec2::new(2, 1));
    }

    #[test]
    fn test_pickup_without_moving() {
        let mut lvl = level(&["WWWWW", "WXd.W", "WWWWW"]);
        let mut log = SoundLog::new();
        let grab = TickInput {
            pickup: true,
            ..held(Dir::Right)
        };
        assert_eq!(
            move_player(&mut lvl, &grab, &mut log),
            PlayerEvent::PickedUp(IVec2::new(2, 1))
        );
        assert_eq!(lvl.player.pos, IVec2::new(1, 1));
        assert_eq!(lvl.diamonds_collected, 1);
        assert_eq!(lvl.tile_at(IVec2::new(2, 1)), Tile::Empty);
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_pickup_disabled_moves_instead() {
        let config = SimConfig {
            pickup_modifier: false,
            ..Default::default()
        };
        let mut lvl =
            Level::from_rows(&["WWWWW", "WX. W", "WWWWW"], LevelParams::default(), config).unwrap();
        let grab = TickInput {
            pickup: true,
            ..held(Dir::Right)
        };
        assert_eq!(
            move_player(&mut lvl, &grab, &mut SoundLog::new()),
            PlayerEvent::Moved(IVec2::new(2, 1))
        );
    }

    #[test]
    fn test_can_move() {
        assert!(can_move(Tile::Empty));
        assert!(can_move(Tile::Earth));
        assert!(can_move(Tile::Diamond));
        assert!(can_move(Tile::ExitOpen));
        assert!(!can_move(Tile::ExitLocked));
        assert!(!can_move(Tile::Lock));
        assert!(!can_move(Tile::Ignore));
        assert!(!can_move(Tile::Rock));
    }
}
