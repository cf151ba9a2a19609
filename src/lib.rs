//! Rockfall - simulation core of a boulder-digging puzzle game
//!
//! Core modules:
//! - `sim`: Deterministic tile simulation (physics, enemies, explosions, flood, player)
//! - `audio`: Sound event identifiers and the sink trait the simulation calls into
//! - `settings`: Data-driven timing and pool tuning
//! - `error`: Error taxonomy for template loading and invariant checks
//!
//! Rendering, audio playback and keyboard polling live outside this crate. They
//! consume [`sim::FrameView`] and implement [`audio::AudioSink`].

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, NullAudio, SoundId, SoundLog};
pub use error::{Pool, SimError};
pub use settings::SimConfig;

/// Game configuration constants
pub mod consts {
    /// Width of the built-in levels (tiles)
    pub const LEVEL_WIDTH: usize = 40;
    /// Height of the built-in levels (tiles)
    pub const LEVEL_HEIGHT: usize = 22;

    /// Frame step used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Minimum seconds between two player moves
    pub const MOVE_INTERVAL: f32 = 0.1;
    /// Seconds between physics (drop) passes
    pub const DROP_INTERVAL: f32 = 0.15;
    /// Seconds between enemy passes
    pub const ENEMY_INTERVAL: f32 = 0.15;
    /// Seconds between flood growth attempts
    pub const FLOOD_INTERVAL: f32 = 1.25;
    /// How long a rock must be pushed before it gives way
    pub const PUSH_DWELL: f32 = 0.5;

    /// Explosion lifetime for fireflies and the player
    pub const EXPLOSION_DURATION: f32 = 0.27;
    /// Explosion lifetime for butterflies (longer: they leave diamonds)
    pub const BUTTERFLY_EXPLOSION_DURATION: f32 = 0.47;
    /// How long a magic wall stays active once triggered
    pub const MAGIC_WALL_DURATION: f32 = 30.0;

    /// Physics ticks a slide marker stays on the vacated tile
    pub const LOCK_TICKS: u8 = 2;
    /// Slide marker pool size
    pub const LOCK_POOL: usize = 10;
    /// Explosion pool size
    pub const EXPLOSION_POOL: usize = 8;

    /// Default level time (seconds)
    pub const LEVEL_TIME: f32 = 150.0;
    /// Points per diamond before the exit opens
    pub const SCORE_PER_DIAMOND: u32 = 10;
    /// Points per diamond after the exit opens
    pub const BONUS_SCORE_PER_DIAMOND: u32 = 15;
    /// Number of distinct diamond landing sounds cycled through
    pub const DIAMOND_LAND_VARIANTS: u8 = 7;
    /// Remaining seconds at which the countdown warning starts
    pub const TIMEOUT_WARNING_SECS: u32 = 9;
}
