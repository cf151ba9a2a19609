//! Error taxonomy
//!
//! Gameplay outcomes (death, completion, timeout) are not errors; they travel
//! as [`crate::sim::TickOutcome`]. What lands here is either a bad level
//! template, a bad configuration, or a broken grid/registry invariant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed-size pools that can run out of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pool {
    Explosions,
    Locks,
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pool::Explosions => f.write_str("explosion"),
            Pool::Locks => f.write_str("slide lock"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("level template is empty")]
    EmptyTemplate,
    #[error("template row {row} has {actual} tiles, expected {expected}")]
    RaggedTemplate {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile character {ch:?} at ({x}, {y})")]
    UnknownTile { ch: char, x: usize, y: usize },
    #[error("level template has no player start")]
    MissingPlayer,
    #[error("level template has a second player start at ({}, {}) (first at ({}, {}))", second.0, second.1, first.0, first.1)]
    MultiplePlayers {
        first: (usize, usize),
        second: (usize, usize),
    },
    #[error("border tile at ({x}, {y}) is not a wall")]
    OpenBorder { x: usize, y: usize },
    #[error("no level with id {0}")]
    UnknownLevel(u32),
    #[error("{pool} pool exhausted")]
    PoolExhausted { pool: Pool },
    /// Grid and registries disagree; the level can no longer be trusted.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
    #[error("could not parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
