//! Built-in level table
//!
//! Templates are fixed 40x22 character grids; see [`Tile::from_char`] for the
//! alphabet.
//!
//! [`Tile::from_char`]: super::grid::Tile::from_char

use super::level::{Level, LevelParams};
use crate::error::SimError;
use crate::settings::SimConfig;

/// A static level: template plus its parameters
pub struct LevelDef {
    pub name: &'static str,
    pub time: f32,
    /// `None` derives the requirement from diamonds and butterflies
    pub min_diamonds: Option<u32>,
    pub score_per_diamond: u32,
    pub bonus_score_per_diamond: u32,
    pub rows: &'static [&'static str],
}

impl LevelDef {
    pub fn params(&self) -> LevelParams {
        LevelParams {
            name: self.name.to_string(),
            time: self.time,
            score_per_diamond: self.score_per_diamond,
            bonus_score_per_diamond: self.bonus_score_per_diamond,
            min_diamonds: self.min_diamonds,
        }
    }
}

pub static LEVELS: &[LevelDef] = &[
    LevelDef {
        name: "Intro",
        time: 150.0,
        min_diamonds: Some(6),
        score_per_diamond: 10,
        bonus_score_per_diamond: 15,
        rows: &[
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
            "W...... ..d.r .....r.r....... ....r....W",
            "W.rXr...... .........rd..r.... ....r...W",
            "W.......... ..r.....r.r..r........r.r..W",
            "Wr.rr.........r......r..r....r...r.....W",
            "Wr. r......... r..r........r......r.rr.W",
            "W... ..r........r.....r.r...r....r.r...W",
            "Wwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwww...r..W",
            "W r.........r.r..r...d....r.....r...r.rW",
            "W..r.....r......... .r....r......r..r..W",
            "W.d.....r..r..r..r.......r..r.....r....W",
            "W...r..r...r........r...r..r.......r...W",
            "Wr.......d.....r.r....r..r......r...r..W",
            "W...r.r...........r.....r.r..r.....r...W",
            "W.r. .r...wwwwwwwwwwwwwwwwwwwwwwwwwwwwwW",
            "W..r.r........r.....r.r..r...r...r...r.W",
            "W...rr...r..r....r...r.r..r......r....rW",
            "W.......r....r.......r.r..r.......d.r..W",
            "Wr.r....r...r..r....r..r......r.r......W",
            "W....r.....r..r.. r..r...........r.r...W",
            "W...d....r...r....r.r....r.....r...r..PW",
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
        ],
    },
    LevelDef {
        name: "Butterfly Rooms",
        time: 150.0,
        min_diamonds: None,
        score_per_diamond: 20,
        bonus_score_per_diamond: 50,
        rows: &[
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
            "W.......r..........r.........r.........W",
            "W.X.....r......r........d.....r........W",
            "W........................r.............W",
            "W..wwwwwww.....  q  .....wwwwwwww......W",
            "W..w     w.....     .....w      w......W",
            "W..w  B  w.....     .....w  B   w......W",
            "W..w     w..... r   .....w      w......W",
            "W..wwwwwww.....rrr  .....wwwwwwww......W",
            "W.................................r....W",
            "W.r........d.......r......d...........rW",
            "W......r............................r..W",
            "W..wwwwwww.....     .....wwwwwwww......W",
            "W..w     w.....  q  .....w      w......W",
            "W..w  B  w.....     .....w  B   w......W",
            "W..w     w.....     .....w      w......W",
            "W..wwwwwww.....     .....wwwwwwww......W",
            "W.........r......r..........r..........W",
            "W...r.........d.........r..........r...W",
            "W.......r..........r.......r...........W",
            "W...............r.........r...........PW",
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
        ],
    },
    LevelDef {
        name: "Enchanted Wall",
        time: 120.0,
        min_diamonds: Some(8),
        score_per_diamond: 10,
        bonus_score_per_diamond: 20,
        rows: &[
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
            "W.X..r.r..d..r....r.r...r..d...r..r...rW",
            "W...r.r...r....r..r.r....r.r....r.r....W",
            "WrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrW",
            "W......................................W",
            "W......................................W",
            "W......................................W",
            "WMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMMW",
            "W                                      W",
            "W                                      W",
            "W....................................a.W",
            "W......................................W",
            "W...d.......r...........d.......r......W",
            "W.......r........d........r........r...W",
            "Www.wwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwwW",
            "W   q   .....r......r.......d.....r....W",
            "W .....  ...........d.........r........W",
            "W..r.........r......r...d........r.....W",
            "W......r.........d........r........r...W",
            "W...d......r.........r...d......r......W",
            "W........r......r.......r.......r.....PW",
            "WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW",
        ],
    },
];

/// Number of built-in levels
pub fn level_count() -> usize {
    LEVELS.len()
}

/// Build a fresh level from the built-in table
pub fn load_level(id: u32, config: SimConfig) -> Result<Level, SimError> {
    let def = LEVELS
        .get(id as usize)
        .ok_or(SimError::UnknownLevel(id))?;
    Level::from_rows(def.rows, def.params(), config)
}
