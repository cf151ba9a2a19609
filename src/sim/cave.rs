//! Seeded procedural caves
//!
//! Same seed and parameters always yield the same template, so generated caves
//! can be shared by seed alone.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{Level, LevelParams};
use crate::consts::*;
use crate::error::SimError;
use crate::settings::SimConfig;

/// Generator knobs. Fill weights are percentages; whatever is left over
/// becomes earth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveParams {
    pub width: usize,
    pub height: usize,
    pub empty: u32,
    pub rock: u32,
    pub diamond: u32,
    pub wall: u32,
    pub firefly: u32,
    pub butterfly: u32,
    /// Level time in seconds
    pub time: f32,
    pub min_diamonds: Option<u32>,
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            width: LEVEL_WIDTH,
            height: LEVEL_HEIGHT,
            empty: 12,
            rock: 14,
            diamond: 6,
            wall: 6,
            firefly: 1,
            butterfly: 1,
            time: LEVEL_TIME,
            min_diamonds: None,
        }
    }
}

impl CaveParams {
    fn pick(&self, roll: u32) -> char {
        let table = [
            (self.empty, ' '),
            (self.rock, 'r'),
            (self.diamond, 'd'),
            (self.wall, 'w'),
            (self.firefly, 'q'),
            (self.butterfly, 'B'),
        ];
        let mut acc = 0;
        for (weight, ch) in table {
            acc += weight;
            if roll < acc {
                return ch;
            }
        }
        '.'
    }
}

/// Produce a cave template: steel border, random interior, one player start and
/// a locked exit in the right-hand wall.
pub fn generate(seed: u64, params: &CaveParams) -> String {
    let mut rng = Pcg32::seed_from_u64(seed);
    let width = params.width.max(3);
    let height = params.height.max(3);

    let mut cells = vec![vec!['W'; width]; height];
    for row in cells.iter_mut().take(height - 1).skip(1) {
        for cell in row.iter_mut().take(width - 1).skip(1) {
            *cell = params.pick(rng.random_range(0..100));
        }
    }

    let px = rng.random_range(1..width - 1);
    let py = rng.random_range(1..height - 1);
    // Nothing hostile or heavy right next to the start
    for y in py.saturating_sub(1).max(1)..=(py + 1).min(height - 2) {
        for x in px.saturating_sub(1).max(1)..=(px + 1).min(width - 2) {
            if matches!(cells[y][x], 'q' | 'B' | 'r' | 'd') {
                cells[y][x] = '.';
            }
        }
    }
    cells[py][px] = 'X';

    let ey = rng.random_range(1..height - 1);
    cells[ey][width - 1] = 'P';
    if cells[ey][width - 2] != 'X' {
        cells[ey][width - 2] = '.';
    }

    let mut out = String::with_capacity((width + 1) * height);
    for row in cells {
        out.extend(row);
        out.push('\n');
    }
    out
}

impl Level {
    /// Build a playable level from a seeded cave
    pub fn generated(seed: u64, params: &CaveParams, config: SimConfig) -> Result<Self, SimError> {
        log::debug!("Generating cave for seed {}", seed);
        let template = generate(seed, params);
        let level_params = LevelParams {
            name: format!("Cave {:016x}", seed),
            time: params.time,
            min_diamonds: params.min_diamonds,
            ..Default::default()
        };
        Level::from_template(&template, level_params, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Tile;

    #[test]
    fn test_same_seed_same_cave() {
        let params = CaveParams::default();
        assert_eq!(generate(42, &params), generate(42, &params));
        assert_ne!(generate(42, &params), generate(43, &params));
    }

    #[test]
    fn test_generated_caves_load() {
        let params = CaveParams::default();
        for seed in 0..32 {
            let level = Level::generated(seed, &params, SimConfig::default()).unwrap();
            assert_eq!(level.width(), LEVEL_WIDTH);
            assert_eq!(level.height(), LEVEL_HEIGHT);
            assert_eq!(level.exits().len(), 1);
            level.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_start_is_safe() {
        let params = CaveParams {
            rock: 60,
            firefly: 20,
            ..Default::default()
        };
        let level = Level::generated(7, &params, SimConfig::default()).unwrap();
        let start = level.player().pos;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let tile = level.tile_at(start + glam::IVec2::new(dx, dy));
                assert!(!tile.is_enemy());
                assert!(!tile.is_boulder());
            }
        }
    }

    #[test]
    fn test_tiny_cave() {
        let params = CaveParams {
            width: 3,
            height: 3,
            ..Default::default()
        };
        let level = Level::generated(1, &params, SimConfig::default()).unwrap();
        assert_eq!(level.tile_at(glam::IVec2::new(1, 1)), Tile::Player);
        assert_eq!(level.tile_at(glam::IVec2::new(2, 1)), Tile::ExitLocked);
    }
}
