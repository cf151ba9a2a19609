//! Simulation tuning and options
//!
//! Loaded from JSON by the host (or left at defaults). Everything time-based is
//! in seconds of simulation clock, not frames.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Sub-system rates ===
    /// Minimum seconds between player moves
    pub move_interval: f32,
    /// Seconds between physics passes
    pub drop_interval: f32,
    /// Seconds between enemy passes
    pub enemy_interval: f32,
    /// Seconds between flood growth attempts
    pub flood_interval: f32,

    // === Timed effects ===
    /// Explosion lifetime for fireflies and the player
    pub explosion_duration: f32,
    /// Explosion lifetime for butterflies
    pub butterfly_explosion_duration: f32,
    /// Magic wall active window
    pub magic_wall_duration: f32,
    /// Hold time before a pushed rock moves
    pub push_dwell: f32,
    /// Physics ticks a slide marker survives
    pub lock_ticks: u8,

    // === Pools ===
    pub lock_pool: usize,
    pub explosion_pool: usize,
    /// Report pool exhaustion as an error instead of dropping the effect
    pub strict_pools: bool,

    // === Options ===
    /// Allow digging/collecting an adjacent tile without moving
    pub pickup_modifier: bool,
    /// Check the grid/registry invariant after every step
    pub verify_invariants: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            move_interval: MOVE_INTERVAL,
            drop_interval: DROP_INTERVAL,
            enemy_interval: ENEMY_INTERVAL,
            flood_interval: FLOOD_INTERVAL,

            explosion_duration: EXPLOSION_DURATION,
            butterfly_explosion_duration: BUTTERFLY_EXPLOSION_DURATION,
            magic_wall_duration: MAGIC_WALL_DURATION,
            push_dwell: PUSH_DWELL,
            lock_ticks: LOCK_TICKS,

            lock_pool: LOCK_POOL,
            explosion_pool: EXPLOSION_POOL,
            strict_pools: false,

            pickup_modifier: true,
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

impl SimConfig {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded simulation settings");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the scheduler or pools cannot work with
    pub fn validate(&self) -> Result<(), SimError> {
        let intervals = [
            self.move_interval,
            self.drop_interval,
            self.enemy_interval,
            self.flood_interval,
        ];
        if intervals.iter().any(|i| !i.is_finite() || *i <= 0.0) {
            return Err(SimError::InvalidConfig("intervals must be positive"));
        }
        if self.explosion_duration < 0.0 || self.butterfly_explosion_duration < 0.0 {
            return Err(SimError::InvalidConfig("explosion durations must not be negative"));
        }
        if self.lock_pool == 0 || self.explosion_pool == 0 {
            return Err(SimError::InvalidConfig("pools need at least one slot"));
        }
        if self.lock_ticks == 0 {
            return Err(SimError::InvalidConfig("lock_ticks must be at least 1"));
        }
        Ok(())
    }

    /// Explosion lifetime for a given cause
    pub fn explosion_duration_for(&self, cause: crate::sim::ExplosionCause) -> f32 {
        match cause {
            crate::sim::ExplosionCause::Butterfly => self.butterfly_explosion_duration,
            _ => self.explosion_duration,
        }
    }
}
