//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied time steps only (no wall clock reads)
//! - Seeded RNG only (cave generation)
//! - Stable iteration order (registry insertion order)
//! - No rendering, audio device or platform dependencies

pub mod cave;
pub mod clock;
pub mod enemy;
pub mod explosion;
pub mod flood;
pub mod grid;
pub mod level;
pub mod levels;
pub mod physics;
pub mod player;
pub mod registry;
pub mod session;
pub mod tick;
pub mod view;

pub use cave::{CaveParams, generate};
pub use clock::SimClock;
pub use explosion::{Area, Explosion, ExplosionCause};
pub use grid::{Dir, Grid, Pos, Tile};
pub use level::{BoulderKind, EnemyKind, Level, LevelParams, LevelStats, LevelStatus, Player};
pub use levels::{LEVELS, LevelDef, level_count, load_level};
pub use physics::{MagicWall, MagicWallState};
pub use registry::{Boulder, Enemy, Registry};
pub use session::{LevelSource, Session, SessionPhase};
pub use tick::{TickInput, TickOutcome, step};
pub use view::{ExplosionView, FrameView, Hud, LockView};
