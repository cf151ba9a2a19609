//! Enemy patrols
//!
//! Both enemy kinds hug the wall on their right: turn right when the wall
//! they were following ends, otherwise go straight, otherwise turn left in
//! place.

use super::explosion::{ExplosionCause, explode};
use super::grid::{Pos, Tile};
use super::level::{EnemyKind, Level};
use crate::audio::AudioSink;
use crate::error::SimError;

#[inline]
fn enterable(tile: Tile) -> bool {
    tile.is_open_for_enemy() || tile == Tile::Player
}

/// One patrol pass over every enemy of `kind`. Returns true if an enemy
/// walked into the player. The pass always finishes, walking a snapshot of
/// positions so a blast mid-pass cannot make it skip anyone.
pub fn move_enemies(
    level: &mut Level,
    kind: EnemyKind,
    audio: &mut dyn AudioSink,
) -> Result<bool, SimError> {
    let mut player_killed = false;

    let order = level.enemies(kind).positions();
    for start in order {
        let Some(i) = level.enemies(kind).find(start) else {
            continue;
        };
        let Some(&enemy) = level.enemies(kind).get(i) else {
            continue;
        };
        let pos = enemy.pos;
        // vacate first: later enemies in this pass see the cell as empty
        level.grid.set_tile(pos, Tile::Empty);

        let right = enemy.dir.turn_right();
        let right_pos = pos + right.delta();
        let behind_right = right_pos - enemy.dir.delta();
        let forward = pos + enemy.dir.delta();

        let (dir, target): (_, Option<Pos>) = if enterable(level.grid.tile_at(right_pos))
            && !level.grid.tile_at(behind_right).is_empty()
        {
            (right, Some(right_pos))
        } else if enterable(level.grid.tile_at(forward)) {
            (enemy.dir, Some(forward))
        } else {
            (enemy.dir.turn_left(), None)
        };

        match target {
            Some(to) if level.grid.tile_at(to) == Tile::Player => {
                // back on its tile so the blast unregisters it
                level.grid.set_tile(pos, kind.tile());
                if explode(level, to, ExplosionCause::from(kind), audio)? {
                    player_killed = true;
                }
            }
            Some(to) => {
                level.grid.set_tile(to, kind.tile());
                if let Some(entry) = level.enemies_mut(kind).get_mut(i) {
                    entry.pos = to;
                    entry.dir = dir;
                }
            }
            None => {
                level.grid.set_tile(pos, kind.tile());
                if let Some(entry) = level.enemies_mut(kind).get_mut(i) {
                    entry.dir = dir;
                }
            }
        }
    }
    Ok(player_killed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SoundLog;
    use crate::settings::SimConfig;
    use crate::sim::grid::Dir;
    use crate::sim::level::LevelParams;
    use glam::IVec2;

    fn level(rows: &[&str]) -> Level {
        Level::from_rows(rows, LevelParams::default(), SimConfig::default()).unwrap()
    }

    fn firefly(level: &Level) -> (IVec2, Dir) {
        let e = level.fireflies.get(0).unwrap();
        (e.pos, e.dir)
    }

    #[test]
    fn test_goes_straight_in_open_space() {
        let mut lvl = level(&[
            "WWWWWWW", //
            "WX    W", //
            "W     W", //
            "W   q W", //
            "W     W", //
            "WWWWWWW",
        ]);
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        // starts heading left; behind-right (5,2) is empty so no right turn
        assert_eq!(firefly(&lvl), (IVec2::new(3, 3), Dir::Left));
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_turns_left_when_boxed_in_ahead() {
        let mut lvl = level(&[
            "WWWWW", //
            "WX  W", //
            "W.q W", //
            "W...W", //
            "WWWWW",
        ]);
        // forward (1,2) is earth: enemies may enter earth
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert_eq!(firefly(&lvl), (IVec2::new(1, 2), Dir::Left));

        let mut lvl = level(&[
            "WWWWW", //
            "WX  W", //
            "WrqwW", //
            "WwwwW", //
            "WWWWW",
        ]);
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        // right of Left is Up: (2,1) open but behind-right (3,1) empty -> no turn;
        // forward is a rock -> turn left in place
        assert_eq!(firefly(&lvl), (IVec2::new(2, 2), Dir::Down));
        assert_eq!(lvl.tile_at(IVec2::new(2, 2)), Tile::Firefly);
    }

    #[test]
    fn test_turns_right_around_corner() {
        let mut lvl = level(&[
            "WWWWWW", //
            "WX   W", //
            "W  wwW", //
            "W  q W", //
            "W    W", //
            "WWWWWW",
        ]);
        // heading left along a wall on its right (above). Right of Left is Up.
        // (3,2) is wall so no turn; move forward to (2,3)
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert_eq!(firefly(&lvl), (IVec2::new(2, 3), Dir::Left));
        // now (2,2) is open and behind-right (3,2) is wall: turn up
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert_eq!(firefly(&lvl), (IVec2::new(2, 2), Dir::Up));
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_walking_into_player_explodes() {
        let mut lvl = level(&[
            "WWWWWWW", //
            "W     W", //
            "W  Xq W", //
            "W     W", //
            "WWWWWWW",
        ]);
        let mut log = SoundLog::new();
        let killed = move_enemies(&mut lvl, EnemyKind::Firefly, &mut log).unwrap();
        assert!(killed);
        assert!(!lvl.player.alive);
        assert!(lvl.fireflies.is_empty());
        assert_eq!(lvl.explosions.active().count(), 1);
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_pass_finishes_after_kill() {
        let mut lvl = level(&[
            "WWWWWWWWWW", //
            "W        W", //
            "W Xq   q W", //
            "W        W", //
            "WWWWWWWWWW",
        ]);
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert_eq!(lvl.fireflies.len(), 1);
        assert_eq!(lvl.fireflies.get(0).unwrap().pos, IVec2::new(6, 2));
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_butterfly_kill_leaves_diamonds_later() {
        let mut lvl = level(&[
            "WWWWWWW", //
            "W     W", //
            "W     W", //
            "W  X  W", //
            "W  B  W", //
            "W     W", //
            "WWWWWWW",
        ]);
        // butterflies start heading down; put the player in front by turning it
        lvl.butterflies.get_mut(0).unwrap().dir = Dir::Up;
        let killed = move_enemies(&mut lvl, EnemyKind::Butterfly, &mut SoundLog::new()).unwrap();
        assert!(killed);
        let ex = lvl.explosions.active().next().copied().unwrap();
        assert_eq!(ex.cause, ExplosionCause::Butterfly);
    }

    #[test]
    fn test_blast_does_not_skip_later_enemies() {
        let mut lvl = level(&[
            "WWWWWWWWW", //
            "W  q    W", //
            "W  Xq   W", //
            "W       W", //
            "W     q W", //
            "W       W", //
            "WWWWWWWWW",
        ]);
        // the first firefly steps to (2,1), the second walks into the player
        // and the blast takes the first one out of the registry
        let killed = move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert!(killed);
        assert_eq!(lvl.fireflies.len(), 1);
        assert_eq!(firefly(&lvl), (IVec2::new(5, 4), Dir::Left));
        lvl.check_invariants().unwrap();
    }

    #[test]
    fn test_vacated_cell_changes_later_turn() {
        let rows = [
            "WWWWWWW", //
            "W    wW", //
            "W   q W", //
            "W  q  W", //
            "WX    W", //
            "WWWWWWW",
        ];
        let mut lvl = level(&rows);
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        // first one turns up along the brick and leaves (4,2) empty, so the
        // second sees nothing behind-right and keeps going left
        let moved: Vec<_> = lvl.fireflies.iter().map(|e| (e.pos, e.dir)).collect();
        assert_eq!(
            moved,
            vec![(IVec2::new(4, 1), Dir::Up), (IVec2::new(2, 3), Dir::Left)]
        );

        // with a brick in place of the first one the second turns right
        let mut walled = rows;
        walled[2] = "W   w W";
        let mut lvl = level(&walled);
        move_enemies(&mut lvl, EnemyKind::Firefly, &mut SoundLog::new()).unwrap();
        assert_eq!(firefly(&lvl), (IVec2::new(3, 2), Dir::Up));
        lvl.check_invariants().unwrap();
    }
}
