//! Lifetime statistics
//!
//! Tracked from simulation and run events and persisted with the save data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hooks::{RunEvent, TelemetrySink};
use crate::sim::events::GameEvent;

/// Totals across every run on this profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub games_played: u32,
    pub rooms_cleared: u32,
    /// Rooms cleared without taking any damage
    pub untouched_rooms: u32,
    pub enemies_killed: u32,
    pub bosses_defeated: u32,
    pub coins_earned: u64,
    /// Deepest room reached in any run
    pub best_room: u32,
    pub has_won_once: bool,
    /// Distinct weapon ids ever equipped
    pub weapons_used: BTreeSet<String>,
    /// Rooms cleared without damage since the last hit (reset each run)
    pub no_damage_streak: u32,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one in-room event into the totals
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EnemyKilled { is_boss, .. } => {
                self.enemies_killed += 1;
                if *is_boss {
                    self.bosses_defeated += 1;
                }
            }
            GameEvent::PlayerDamaged { .. } => self.no_damage_streak = 0,
            GameEvent::RoomCleared { room, no_damage, .. } => {
                self.rooms_cleared += 1;
                if *no_damage {
                    self.untouched_rooms += 1;
                    self.no_damage_streak += 1;
                } else {
                    self.no_damage_streak = 0;
                }
                self.best_room = self.best_room.max(*room);
            }
            GameEvent::GameOver { room, .. } => {
                self.best_room = self.best_room.max(*room);
            }
            _ => {}
        }
    }

    /// Fold one run-level event into the totals
    pub fn record_run(&mut self, event: &RunEvent) {
        match event {
            RunEvent::GameStarted { .. } => {
                self.games_played += 1;
                self.no_damage_streak = 0;
            }
            RunEvent::CoinsEarned { amount } => self.coins_earned += amount,
            RunEvent::WeaponUsed { id } => {
                self.weapons_used.insert(id.clone());
            }
            RunEvent::GameCompleted { .. } => self.has_won_once = true,
            _ => {}
        }
    }
}

impl TelemetrySink for GameStats {
    fn on_event(&mut self, event: &GameEvent) {
        self.record(event);
    }

    fn on_run_event(&mut self, event: &RunEvent) {
        self.record_run(event);
    }
}
