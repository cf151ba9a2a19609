//! Sound events raised by the simulation
//!
//! The simulation never touches an audio device. It calls into an [`AudioSink`]
//! synchronously while stepping; the host decides how to mix and play.

use serde::{Deserialize, Serialize};

use crate::consts::DIAMOND_LAND_VARIANTS;

/// Sound effect identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    /// A rock came to rest
    RockLand,
    /// A diamond came to rest (variant index, round-robin)
    DiamondLand(u8),
    /// Player picked up a diamond
    DiamondCollect,
    /// Player dug through earth
    WalkEarth,
    /// Player walked through open space
    WalkEmpty,
    /// Exit unlocked
    Crack,
    /// Something blew up
    Explosion,
    /// Player reached the exit
    Finished,
    /// Level reveal at start
    Cover,
    /// Countdown warning, seconds remaining
    Timeout(u8),
    /// Ambient loop while water is spreading
    FloodLoop,
    /// Ambient loop while the magic wall is active
    MagicWallLoop,
}

impl SoundId {
    /// Asset file the host is expected to map this sound to
    pub fn asset_name(&self) -> String {
        match self {
            SoundId::RockLand => "stone.ogg".to_string(),
            SoundId::DiamondLand(n) => format!("diamond_{}.ogg", n % DIAMOND_LAND_VARIANTS + 1),
            SoundId::DiamondCollect => "diamond_collect.ogg".to_string(),
            SoundId::WalkEarth => "walk_d.ogg".to_string(),
            SoundId::WalkEmpty => "walk_e.ogg".to_string(),
            SoundId::Crack => "crack.ogg".to_string(),
            SoundId::Explosion => "exploded.ogg".to_string(),
            SoundId::Finished => "finished.ogg".to_string(),
            SoundId::Cover => "cover.ogg".to_string(),
            SoundId::Timeout(n) => format!("timeout_{}.ogg", n),
            SoundId::FloodLoop => "amoeba.ogg".to_string(),
            SoundId::MagicWallLoop => "magic_wall.ogg".to_string(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, SoundId::FloodLoop | SoundId::MagicWallLoop)
    }
}

/// Side-effect hooks the simulation calls during a step
pub trait AudioSink {
    /// Fire-and-forget sound
    fn play_once(&mut self, sound: SoundId);
    /// Start a looping sound (mixed alongside any other active loops)
    fn play_looped(&mut self, sound: SoundId);
    /// Stop every active loop
    fn stop_looped(&mut self);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_once(&mut self, _sound: SoundId) {}
    fn play_looped(&mut self, _sound: SoundId) {}
    fn stop_looped(&mut self) {}
}

/// One recorded call on an [`AudioSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEvent {
    Once(SoundId),
    Looped(SoundId),
    StopLooped,
}

/// Sink that records every call (headless runs and tests)
#[derive(Debug, Default, Clone)]
pub struct SoundLog {
    pub events: Vec<SoundEvent>,
}

impl SoundLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Number of one-shot plays of `sound`
    pub fn count(&self, sound: SoundId) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SoundEvent::Once(sound))
            .count()
    }

    /// Number of one-shot plays matching a predicate
    pub fn count_where(&self, pred: impl Fn(SoundId) -> bool) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SoundEvent::Once(s) if pred(*s)))
            .count()
    }
}

impl AudioSink for SoundLog {
    fn play_once(&mut self, sound: SoundId) {
        log::trace!("sound {:?}", sound);
        self.events.push(SoundEvent::Once(sound));
    }

    fn play_looped(&mut self, sound: SoundId) {
        self.events.push(SoundEvent::Looped(sound));
    }

    fn stop_looped(&mut self) {
        self.events.push(SoundEvent::StopLooped);
    }
}

/// Keeps the host's active loops in sync with what the level wants.
///
/// `stop_looped` on the sink clears every loop, so a change to the wanted set
/// is applied by stopping all and restarting the ones still wanted.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoopTracker {
    flood: bool,
    magic_wall: bool,
}

impl LoopTracker {
    pub fn sync(&mut self, flood: bool, magic_wall: bool, audio: &mut dyn AudioSink) {
        if self.flood == flood && self.magic_wall == magic_wall {
            return;
        }
        if self.flood || self.magic_wall {
            audio.stop_looped();
        }
        if flood {
            audio.play_looped(SoundId::FloodLoop);
        }
        if magic_wall {
            audio.play_looped(SoundId::MagicWallLoop);
        }
        self.flood = flood;
        self.magic_wall = magic_wall;
    }

    /// Silence everything (level torn down)
    pub fn stop(&mut self, audio: &mut dyn AudioSink) {
        self.sync(false, false, audio);
    }
}
