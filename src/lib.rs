//! Milk Heist - a top-down room-clear arena roguelite core
//!
//! Core modules:
//! - `sim`: Deterministic room simulation (movement, combat, projectiles, room flow)
//! - `hooks`: Collaborator interfaces (telemetry, audio) and the injected room controller
//! - `run`: Run orchestration across rooms (normal, endless, reverse, co-op)
//! - `upgrade`: Weapons and power-ups offered between rooms
//! - `achievements`: Milestone and completion achievements
//! - `persistence`: Save snapshot and storage backends
//! - `tuning`: Data-driven game balance

pub mod achievements;
pub mod hooks;
pub mod persistence;
pub mod run;
pub mod run_stats;
pub mod sim;
pub mod tuning;
pub mod upgrade;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use hooks::{AudioSink, Hooks, RoomController, RunEvent, SoundEffect, TelemetrySink};
pub use run::{Run, RunConfig, RunMode, RunStatus};
pub use run_stats::GameStats;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (one tick per animation frame)
    pub const TICK_RATE_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICK_RATE_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (pixels, origin top-left)
    pub const ARENA_WIDTH: f32 = 800.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Player collision diameter
    pub const PLAYER_SIZE: f32 = 40.0;

    /// Radius around the arena centre kept free of obstacles and spawns
    pub const SPAWN_SAFE_RADIUS: f32 = 150.0;
    /// Minimum distance from arena edges for generated obstacles
    pub const EDGE_MARGIN: f32 = 60.0;

    /// Regular run length; room 15 is the final room outside endless mode
    pub const FINAL_ROOM: u32 = 15;
}

/// Arena centre, where players start every room
#[inline]
pub fn arena_center() -> Vec2 {
    Vec2::new(consts::ARENA_WIDTH / 2.0, consts::ARENA_HEIGHT / 2.0)
}

/// Clamp a circle of the given diameter so it stays fully inside the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2, size: f32) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        pos.x.clamp(half, consts::ARENA_WIDTH - half),
        pos.y.clamp(half, consts::ARENA_HEIGHT - half),
    )
}

/// Unit vector for an angle in radians
#[inline]
pub fn angle_to_dir(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
