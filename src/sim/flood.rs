//! Spreading water
//!
//! Water grows by a single cell per flood tick, taken from the oldest cell
//! that still has room. Once nothing can grow, the whole body turns into
//! diamonds and the level never floods again.

use super::grid::{Dir, Pos, Tile};
use super::level::Level;

/// What a flood tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodEvent {
    /// No water, or it already converted
    Idle,
    /// One new water cell
    Grew(Pos),
    /// Boxed in: this many cells became diamonds
    Converted(usize),
}

/// Water is present and still able to change
pub fn flood_active(level: &Level) -> bool {
    !level.flood_done && !level.water.is_empty()
}

pub fn flood_step(level: &mut Level) -> FloodEvent {
    if !flood_active(level) {
        return FloodEvent::Idle;
    }

    let target = level.water.iter().find_map(|&cell| {
        Dir::ALL
            .iter()
            .map(|d| cell + d.delta())
            .find(|&n| level.grid.tile_at(n).is_floodable())
    });

    if let Some(pos) = target {
        level.spawn(pos, Tile::Water);
        return FloodEvent::Grew(pos);
    }

    let cells = std::mem::take(&mut level.water);
    for &pos in &cells {
        level.spawn(pos, Tile::Diamond);
    }
    level.flood_done = true;
    log::debug!("Flood boxed in, {} cells turned to diamonds", cells.len());
    FloodEvent::Converted(cells.len())
}
