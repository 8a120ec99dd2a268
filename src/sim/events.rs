//! Events emitted by the simulation
//!
//! `tick` returns the events that happened during the step in the order they
//! occurred. Telemetry, audio and run bookkeeping consume them; the sim never
//! calls out to collaborators itself.

use glam::Vec2;

use super::state::{EnemyKind, PlayerSlot};

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A queued enemy entered the arena
    EnemySpawned { id: u32, kind: EnemyKind, pos: Vec2 },
    /// A player released an attack volley
    PlayerAttacked { slot: PlayerSlot, weapon: String, projectiles: u32 },
    /// A player projectile landed on an enemy
    EnemyHit { id: u32, damage: f32, by: PlayerSlot },
    /// A player lost health (contact, enemy projectile or poison)
    PlayerDamaged { slot: PlayerSlot, damage: f32 },
    PlayerDowned { slot: PlayerSlot },
    EnemyKilled {
        id: u32,
        kind: EnemyKind,
        is_boss: bool,
        killer: Option<PlayerSlot>,
        coins: u64,
    },
    /// Minions summoned by a boss
    MinionsSummoned { boss_id: u32, count: u32 },
    RoomCleared { room: u32, coins_earned: u64, no_damage: bool },
    GameOver { room: u32, coins_earned: u64 },
}

impl GameEvent {
    /// Events that end the room attempt
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::RoomCleared { .. } | GameEvent::GameOver { .. })
    }
}
