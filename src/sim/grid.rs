//! Tile grid and coordinate primitives
//!
//! Positions are `IVec2` with `x` as column and `y` as row; `+y` points down.
//! The grid is bordered by walls by level convention, so interior code never
//! reads outside it. Doing so is a bug and panics.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Grid coordinate (x = column, y = row, +y is down)
pub type Pos = IVec2;

/// One cell of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    /// Soft diggable earth
    Earth,
    /// Brick wall (destructible by explosions)
    Wall,
    /// Indestructible wall
    SteelWall,
    Rock,
    Diamond,
    Player,
    /// Patrol enemy, leaves empty space when destroyed
    Firefly,
    /// Patrol enemy, leaves diamonds when destroyed
    Butterfly,
    /// Vacated tile of a sliding object, cleared after a couple of physics ticks
    Lock,
    MagicWall,
    Water,
    ExitLocked,
    ExitOpen,
    /// Covered by a running explosion
    Ignore,
}

impl Tile {
    /// Parse a level template character
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            ' ' => Tile::Empty,
            '.' => Tile::Earth,
            'w' => Tile::Wall,
            'W' => Tile::SteelWall,
            'r' => Tile::Rock,
            'd' => Tile::Diamond,
            'X' => Tile::Player,
            'q' => Tile::Firefly,
            'B' => Tile::Butterfly,
            'M' => Tile::MagicWall,
            'a' => Tile::Water,
            'P' => Tile::ExitLocked,
            'E' => Tile::ExitOpen,
            _ => return None,
        })
    }

    /// Character used for ASCII dumps (templates use the same alphabet)
    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Earth => '.',
            Tile::Wall => 'w',
            Tile::SteelWall => 'W',
            Tile::Rock => 'r',
            Tile::Diamond => 'd',
            Tile::Player => 'X',
            Tile::Firefly => 'q',
            Tile::Butterfly => 'B',
            Tile::Lock => '/',
            Tile::MagicWall => 'M',
            Tile::Water => 'a',
            Tile::ExitLocked => 'P',
            Tile::ExitOpen => 'E',
            Tile::Ignore => '*',
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Tile::Empty
    }

    /// Rock or diamond
    #[inline]
    pub fn is_boulder(self) -> bool {
        matches!(self, Tile::Rock | Tile::Diamond)
    }

    #[inline]
    pub fn is_enemy(self) -> bool {
        matches!(self, Tile::Firefly | Tile::Butterfly)
    }

    /// Surfaces a resting rock or diamond rolls off
    #[inline]
    pub fn is_rounded(self) -> bool {
        matches!(self, Tile::Rock | Tile::Diamond | Tile::Wall | Tile::SteelWall)
    }

    /// Cells an enemy may patrol into
    #[inline]
    pub fn is_open_for_enemy(self) -> bool {
        matches!(self, Tile::Empty | Tile::Earth)
    }

    /// Cells water may spread into
    #[inline]
    pub fn is_floodable(self) -> bool {
        matches!(self, Tile::Empty | Tile::Earth)
    }

    /// Survives explosions
    #[inline]
    pub fn is_indestructible(self) -> bool {
        matches!(self, Tile::SteelWall | Tile::ExitLocked | Tile::ExitOpen)
    }
}

/// The four axis-aligned directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Right,
    Down,
    Left,
}

impl Dir {
    /// Clockwise order starting at Up
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

    #[inline]
    pub fn delta(self) -> Pos {
        match self {
            Dir::Up => IVec2::NEG_Y,
            Dir::Right => IVec2::X,
            Dir::Down => IVec2::Y,
            Dir::Left => IVec2::NEG_X,
        }
    }

    #[inline]
    pub fn turn_right(self) -> Dir {
        match self {
            Dir::Up => Dir::Right,
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Up,
        }
    }

    #[inline]
    pub fn turn_left(self) -> Dir {
        match self {
            Dir::Up => Dir::Left,
            Dir::Left => Dir::Down,
            Dir::Down => Dir::Right,
            Dir::Right => Dir::Up,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Dir::Left | Dir::Right)
    }
}

/// Fixed-size tile array, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![fill; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// True for cells on the outer ring
    #[inline]
    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x as usize == self.width - 1 || pos.y as usize == self.height - 1
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        assert!(
            self.in_bounds(pos),
            "grid access out of bounds: ({}, {}) in {}x{}",
            pos.x,
            pos.y,
            self.width,
            self.height
        );
        pos.y as usize * self.width + pos.x as usize
    }

    #[inline]
    pub fn tile_at(&self, pos: Pos) -> Tile {
        self.tiles[self.index(pos)]
    }

    /// Bounds-checked lookup for callers that may legitimately look outside
    #[inline]
    pub fn get(&self, pos: Pos) -> Option<Tile> {
        self.in_bounds(pos).then(|| self.tiles[pos.y as usize * self.width + pos.x as usize])
    }

    #[inline]
    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        let i = self.index(pos);
        self.tiles[i] = tile;
    }

    /// Rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width)
    }

    /// Every cell with its position, row-major
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (IVec2::new((i % width) as i32, (i / width) as i32), *t))
    }

    /// Number of cells holding `tile`
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }
}
