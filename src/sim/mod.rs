//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One timestamp per tick, supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod collision;
pub mod combat;
pub mod events;
pub mod projectile;
pub mod room_gen;
pub mod state;
pub mod stats;
pub mod tick;

pub use collision::{circle_rect_overlap, circles_overlap, is_position_blocked, resolve_legal_position};
pub use combat::TickBatch;
pub use events::GameEvent;
pub use room_gen::{RoomRequest, generate_room, is_boss_room};
pub use state::{
    Difficulty, Enemy, EnemyKind, Obstacle, ObstacleKind, Particle, Player, PlayerSlot, Projectile,
    ProjectileOwner, Room, RoomOutcome, RoomSession, SessionPhase,
};
pub use stats::{BaseStats, CosmeticAbility, EffectiveStats, Weapon, WeaponUpgrades};
pub use tick::{PlayerInput, TickInput, step, tick};
