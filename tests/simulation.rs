//! End-to-end scenarios driven through the public API

use glam::IVec2;
use rockfall::audio::{SoundEvent, SoundLog};
use rockfall::sim::{BoulderKind, Level, LevelParams, Tile, TickInput, TickOutcome, step};
use rockfall::{SimConfig, SoundId};

fn level(rows: &[&str]) -> Level {
    level_with(rows, LevelParams::default())
}

fn level_with(rows: &[&str], params: LevelParams) -> Level {
    Level::from_rows(rows, params, SimConfig::default()).expect("valid template")
}

fn rocks(level: &Level) -> Vec<IVec2> {
    level.boulders(BoulderKind::Rock).iter().map(|b| b.pos).collect()
}

#[test]
fn test_rock_falls_two_cells_and_lands_once() {
    let mut lvl = level(&["WWW", "WXW", "WrW", "W W", "W W", "WWW"]);
    let mut log = SoundLog::new();
    let dt = lvl.config.drop_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(rocks(&lvl), vec![IVec2::new(1, 3)]);
    assert_eq!(log.count(SoundId::RockLand), 0);

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(rocks(&lvl), vec![IVec2::new(1, 4)]);
    assert_eq!(log.count(SoundId::RockLand), 1);

    // Resting rock stays put and stays quiet
    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(rocks(&lvl), vec![IVec2::new(1, 4)]);
    assert_eq!(log.count(SoundId::RockLand), 1);
}

#[test]
fn test_slide_prefers_left() {
    let mut lvl = level(&[
        "WWWWWWW",
        "W     W",
        "W  r  W",
        "W  r  W",
        "WwwwwwW",
        "WX    W",
        "WWWWWWW",
    ]);
    let mut log = SoundLog::new();
    let dt = lvl.config.drop_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(lvl.tile_at(IVec2::new(2, 2)), Tile::Rock);
    assert_eq!(lvl.tile_at(IVec2::new(3, 2)), Tile::Lock);
    assert_eq!(lvl.tile_at(IVec2::new(4, 2)), Tile::Empty);

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(lvl.tile_at(IVec2::new(2, 3)), Tile::Rock);
    lvl.check_invariants().unwrap();
}

#[test]
fn test_slide_goes_right_when_left_is_blocked() {
    let mut lvl = level(&[
        "WWWWWWW",
        "W     W",
        "W  r  W",
        "W .r  W",
        "WwwwwwW",
        "WX    W",
        "WWWWWWW",
    ]);
    let mut log = SoundLog::new();
    let dt = lvl.config.drop_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(lvl.tile_at(IVec2::new(4, 2)), Tile::Rock);
    assert_eq!(lvl.tile_at(IVec2::new(3, 2)), Tile::Lock);
}

#[test]
fn test_magic_wall_turns_rock_into_diamond() {
    let mut lvl = level(&[
        "WWWWW", //
        "W r W", //
        "W   W", //
        "WMMMW", //
        "W   W", //
        "W   W", //
        "WX..W", //
        "WWWWW",
    ]);
    let mut log = SoundLog::new();
    let dt = lvl.config.drop_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert!(lvl.is_falling_at(IVec2::new(2, 2)));
    assert!(!lvl.magic_wall().is_active());

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert!(lvl.magic_wall().is_active());
    assert!(rocks(&lvl).is_empty());
    let diamonds: Vec<_> = lvl
        .boulders(BoulderKind::Diamond)
        .iter()
        .map(|b| b.pos)
        .collect();
    assert_eq!(diamonds.len(), 1);
    assert_eq!(diamonds[0], IVec2::new(2, 4));
    assert_eq!(lvl.tile_at(IVec2::new(2, 2)), Tile::Empty);
    assert!(log.events.contains(&SoundEvent::Looped(SoundId::MagicWallLoop)));
    lvl.check_invariants().unwrap();
}

#[test]
fn test_sealed_water_turns_into_diamonds() {
    let mut lvl = level(&["WWWWW", "WaawW", "WwwwW", "WX  W", "WWWWW"]);
    let mut log = SoundLog::new();
    let dt = lvl.config.flood_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert!(lvl.water().is_empty());
    assert!(lvl.flood_done());
    assert_eq!(lvl.boulders(BoulderKind::Diamond).len(), 2);
    assert_eq!(lvl.tile_at(IVec2::new(1, 1)), Tile::Diamond);
    assert_eq!(lvl.tile_at(IVec2::new(2, 1)), Tile::Diamond);

    for _ in 0..4 {
        step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    }
    assert_eq!(lvl.boulders(BoulderKind::Diamond).len(), 2);
    assert!(lvl.water().is_empty());
}

#[test]
fn test_water_spreads_into_earth() {
    let mut lvl = level(&["WWWWW", "Wa..W", "WwwwW", "WX  W", "WWWWW"]);
    let mut log = SoundLog::new();
    let dt = lvl.config.flood_interval;

    step(&mut lvl, &TickInput::default(), dt, &mut log).unwrap();
    assert_eq!(lvl.water().len(), 2);
    assert_eq!(lvl.tile_at(IVec2::new(2, 1)), Tile::Water);
    assert!(log.events.contains(&SoundEvent::Looped(SoundId::FloodLoop)));
}

#[test]
fn test_exit_unlocks_on_quota() {
    let params = LevelParams {
        min_diamonds: Some(2),
        ..Default::default()
    };
    let mut lvl = level_with(&["WWWWWWW", "WXdddPW", "WWWWWWW"], params);
    let mut log = SoundLog::new();
    let right = TickInput::held(rockfall::sim::Dir::Right);
    let dt = lvl.config.move_interval;
    let exit = IVec2::new(5, 1);

    step(&mut lvl, &right, dt, &mut log).unwrap();
    assert_eq!(lvl.diamonds_collected, 1);
    assert_eq!(lvl.tile_at(exit), Tile::ExitLocked);
    assert!(!lvl.exit_unlocked);

    step(&mut lvl, &right, dt, &mut log).unwrap();
    assert_eq!(lvl.diamonds_collected, 2);
    assert_eq!(lvl.tile_at(exit), Tile::ExitOpen);
    assert_eq!(log.count(SoundId::Crack), 1);

    step(&mut lvl, &right, dt, &mut log).unwrap();
    assert_eq!(lvl.diamonds_collected, 3);
    assert_eq!(lvl.tile_at(exit), Tile::ExitOpen);
    assert_eq!(log.count(SoundId::Crack), 1);
    // Two at the base rate, one at the bonus rate
    assert_eq!(lvl.score, 10 + 10 + 15);

    assert_eq!(
        step(&mut lvl, &right, dt, &mut log).unwrap(),
        TickOutcome::LevelCompleted
    );
    assert_eq!(log.count(SoundId::Finished), 1);
}

#[test]
fn test_locked_exit_blocks_the_player() {
    let params = LevelParams {
        min_diamonds: Some(5),
        ..Default::default()
    };
    let mut lvl = level_with(&["WWWWW", "WX PW", "WWWWW"], params);
    let mut log = SoundLog::new();
    let right = TickInput::held(rockfall::sim::Dir::Right);
    let dt = lvl.config.move_interval;

    for _ in 0..4 {
        assert_eq!(step(&mut lvl, &right, dt, &mut log).unwrap(), TickOutcome::Continue);
    }
    assert_eq!(lvl.player().pos, IVec2::new(2, 1));
}

#[test]
fn test_push_needs_dwell() {
    let mut lvl = level(&["WWWWWW", "WXr  W", "WWWWWW"]);
    let mut log = SoundLog::new();
    let right = TickInput::held(rockfall::sim::Dir::Right);

    // 0.5 s of holding only reaches the dwell threshold on the sixth step
    for _ in 0..5 {
        step(&mut lvl, &right, 0.1, &mut log).unwrap();
        assert_eq!(rocks(&lvl), vec![IVec2::new(2, 1)]);
        assert_eq!(lvl.player().pos, IVec2::new(1, 1));
    }
    step(&mut lvl, &right, 0.1, &mut log).unwrap();
    assert_eq!(rocks(&lvl), vec![IVec2::new(3, 1)]);
    assert_eq!(lvl.player().pos, IVec2::new(2, 1));

    // The dwell starts over for the next push
    step(&mut lvl, &right, 0.1, &mut log).unwrap();
    assert_eq!(rocks(&lvl), vec![IVec2::new(3, 1)]);
    lvl.check_invariants().unwrap();
}

#[test]
fn test_releasing_resets_push() {
    let mut lvl = level(&["WWWWWW", "WXr  W", "WWWWWW"]);
    let mut log = SoundLog::new();
    let right = TickInput::held(rockfall::sim::Dir::Right);

    for _ in 0..4 {
        step(&mut lvl, &right, 0.1, &mut log).unwrap();
    }
    step(&mut lvl, &TickInput::default(), 0.1, &mut log).unwrap();
    for _ in 0..4 {
        step(&mut lvl, &right, 0.1, &mut log).unwrap();
    }
    assert_eq!(rocks(&lvl), vec![IVec2::new(2, 1)]);
}

#[test]
fn test_butterfly_leaves_diamonds() {
    let mut lvl = level(&[
        "WWWWWWW", //
        "W  r  W", //
        "W     W", //
        "W wBw W", //
        "WwwwwwW", //
        "WX    W", //
        "WWWWWWW",
    ]);
    let mut log = SoundLog::new();

    // The butterfly is boxed in and only turns; the rock drops onto it
    let mut blown = false;
    for _ in 0..40 {
        step(&mut lvl, &TickInput::default(), 0.05, &mut log).unwrap();
        if log.count(SoundId::Explosion) > 0 {
            blown = true;
            break;
        }
    }
    assert!(blown);
    for _ in 0..20 {
        step(&mut lvl, &TickInput::default(), 0.1, &mut log).unwrap();
    }
    assert!(lvl.enemies(rockfall::sim::EnemyKind::Butterfly).is_empty());
    assert_eq!(lvl.boulders(BoulderKind::Diamond).len(), 9);
    assert!(lvl.player().alive);
    lvl.check_invariants().unwrap();
}

#[test]
fn test_time_runs_out_with_warnings() {
    let params = LevelParams {
        time: 10.0,
        ..Default::default()
    };
    let mut lvl = level_with(&["WWWW", "WX W", "WWWW"], params);
    let mut log = SoundLog::new();
    let mut outcome = TickOutcome::Continue;
    for _ in 0..11 {
        outcome = step(&mut lvl, &TickInput::default(), 1.0, &mut log).unwrap();
        if outcome != TickOutcome::Continue {
            break;
        }
    }
    assert_eq!(outcome, TickOutcome::OutOfTime);
    assert_eq!(log.count_where(|s| matches!(s, SoundId::Timeout(_))), 9);
    assert_eq!(log.count(SoundId::Timeout(1)), 1);
}
