//! Game balance constants
//!
//! Every timing and combat constant the room simulation reads lives here so
//! balance passes can override them from JSON without touching the sim.

use serde::{Deserialize, Serialize};

/// Balance table consumed by the room simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Room flow ===
    /// Delay between releasing queued enemies into the arena (ms)
    pub spawn_interval_ms: u64,
    /// Award the "untouchable" telemetry flag for rooms cleared without damage
    pub track_no_damage: bool,

    // === Damage rules ===
    /// Window after a hit during which the same target ignores further damage (ms)
    pub invincibility_ms: u64,
    /// Damage reduction per point of defense
    pub mitigation_per_defense: f32,
    /// Upper bound on defense mitigation
    pub max_mitigation: f32,
    /// Minimum damage dealt by any landed hit
    pub min_damage: f32,

    // === Status effects ===
    /// Period of the global poison tick (ms)
    pub poison_tick_ms: u64,
    pub poison_damage_per_stack: f32,
    pub poison_decay_per_tick: f32,
    pub max_poison_stacks: f32,
    /// Period of ability regeneration (ms)
    pub regen_tick_ms: u64,

    // === Player attacks ===
    pub player_projectile_speed: f32,
    pub player_projectile_size: f32,
    /// Total angular spread of a multishot volley (radians)
    pub multishot_spread: f32,
    /// Knockback distance per point of weapon knockback
    pub knockback_factor: f32,

    // === Enemy behaviours ===
    pub enemy_shot_cooldown_ms: u64,
    pub enemy_shot_speed: f32,
    pub enemy_shot_size: f32,
    pub enemy_shot_damage_factor: f32,
    pub obstacle_throw_cooldown_ms: u64,
    pub obstacle_throw_speed: f32,
    pub obstacle_throw_size: f32,
    pub obstacle_throw_damage_factor: f32,
    pub boss_summon_cooldown_ms: u64,
    pub boss_summon_attempts: u32,

    // === Cosmetic ===
    /// Particles released when a queued enemy enters the arena
    pub spawn_burst_particles: u32,
    /// Hard cap on live particles
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 350,
            track_no_damage: true,

            invincibility_ms: 250,
            mitigation_per_defense: 0.02,
            max_mitigation: 0.75,
            min_damage: 1.0,

            poison_tick_ms: 1000,
            poison_damage_per_stack: 0.5,
            poison_decay_per_tick: 0.5,
            max_poison_stacks: 10.0,
            regen_tick_ms: 1000,

            player_projectile_speed: 8.0,
            player_projectile_size: 12.0,
            multishot_spread: 0.3,
            knockback_factor: 0.5,

            enemy_shot_cooldown_ms: 2000,
            enemy_shot_speed: 5.0,
            enemy_shot_size: 10.0,
            enemy_shot_damage_factor: 0.5,
            obstacle_throw_cooldown_ms: 3000,
            obstacle_throw_speed: 6.0,
            obstacle_throw_size: 20.0,
            obstacle_throw_damage_factor: 0.8,
            boss_summon_cooldown_ms: 8000,
            boss_summon_attempts: 20,

            spawn_burst_particles: 12,
            max_particles: 512,
        }
    }
}

impl Tuning {
    /// Parse a tuning table; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Serialize for editing
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Fraction of incoming damage removed by `defense`
    pub fn mitigation(&self, defense: f32) -> f32 {
        (defense.max(0.0) * self.mitigation_per_defense).min(self.max_mitigation)
    }

    /// Damage that lands after defense mitigation
    pub fn mitigated_damage(&self, raw: f32, defense: f32) -> f32 {
        (raw * (1.0 - self.mitigation(defense))).max(self.min_damage)
    }
}
