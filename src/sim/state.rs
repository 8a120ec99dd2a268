//! Room state and core simulation types
//!
//! Everything one room attempt reads or writes lives here. A `RoomSession`
//! owns its players, enemies, projectiles and particles exclusively; the
//! systems in `ai`, `combat` and `projectile` only ever see it through `tick`.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stats::{BaseStats, CosmeticAbility, EffectiveStats, Weapon, WeaponUpgrades};
use crate::consts::*;
use crate::tuning::Tuning;

/// Difficulty selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Milk,
}

/// Coins awarded for kills and room clears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinRewards {
    pub enemy: u64,
    pub boss: u64,
    pub room: u64,
}

/// Per-difficulty scaling applied to generated enemies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyScaling {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Milk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Milk => "milk",
        }
    }

    pub fn coin_rewards(&self) -> CoinRewards {
        match self {
            Difficulty::Easy => CoinRewards { enemy: 2, boss: 8, room: 3 },
            Difficulty::Normal => CoinRewards { enemy: 5, boss: 15, room: 5 },
            Difficulty::Hard => CoinRewards { enemy: 7, boss: 20, room: 7 },
            Difficulty::Milk => CoinRewards { enemy: 10, boss: 30, room: 10 },
        }
    }

    pub fn enemy_scaling(&self) -> EnemyScaling {
        match self {
            Difficulty::Easy => EnemyScaling { health: 0.6, damage: 0.6, speed: 0.9 },
            Difficulty::Normal => EnemyScaling { health: 1.0, damage: 1.0, speed: 1.0 },
            Difficulty::Hard => EnemyScaling { health: 1.7, damage: 1.7, speed: 1.3 },
            Difficulty::Milk => EnemyScaling { health: 2.5, damage: 2.5, speed: 1.5 },
        }
    }

    /// Extra enemies per room on top of the room's base count
    pub fn enemy_count_bonus(&self) -> u32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 2,
            Difficulty::Hard => 3,
            Difficulty::Milk => 5,
        }
    }

    /// Starting stats for a fresh run
    pub fn starting_stats(&self) -> BaseStats {
        let (max_health, defense) = match self {
            Difficulty::Easy => (100.0, 5.0),
            Difficulty::Normal => (80.0, 3.0),
            Difficulty::Hard => (60.0, 1.0),
            Difficulty::Milk => (40.0, 0.0),
        };
        BaseStats {
            max_health,
            defense,
            ..BaseStats::default()
        }
    }
}

/// A player slot (index into the session's player list)
pub type PlayerSlot = usize;

/// A player and their transient combat status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub slot: PlayerSlot,
    pub pos: Vec2,
    pub health: f32,
    pub stats: BaseStats,
    pub coins: u64,
    /// Equipped cosmetic id and the ability it grants
    pub cosmetic: String,
    pub ability: Option<CosmeticAbility>,
    pub weapon: Weapon,
    pub weapon_upgrades: WeaponUpgrades,
    /// 0..=10, decays at every poison tick
    pub poison_stacks: f32,
    pub last_hit_ms: Option<u64>,
    /// Movement input is inverted while `now < confused_until_ms`
    pub confused_until_ms: u64,
    /// Total damage taken (telemetry)
    pub accumulated_damage: f32,
    #[serde(skip)]
    pub last_attack_ms: Option<u64>,
    #[serde(skip)]
    pub last_regen_ms: u64,
}

impl Player {
    pub fn new(slot: PlayerSlot, stats: BaseStats) -> Self {
        Self {
            slot,
            pos: crate::arena_center(),
            health: stats.max_health,
            stats,
            coins: 0,
            cosmetic: "default".to_string(),
            ability: None,
            weapon: Weapon::starter(),
            weapon_upgrades: WeaponUpgrades::default(),
            poison_stacks: 0.0,
            last_hit_ms: None,
            confused_until_ms: 0,
            accumulated_damage: 0.0,
            last_attack_ms: None,
            last_regen_ms: 0,
        }
    }

    /// Equip a cosmetic; health tops up by any max-health the ability grants
    pub fn with_cosmetic(mut self, id: &str, ability: Option<CosmeticAbility>) -> Self {
        self.cosmetic = id.to_string();
        self.ability = ability;
        self.health = self.effective().max_health;
        self
    }

    pub fn effective(&self) -> EffectiveStats {
        EffectiveStats::resolve(&self.stats, self.ability, &self.weapon, &self.weapon_upgrades)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_confused(&self, now_ms: u64) -> bool {
        now_ms < self.confused_until_ms
    }

    /// True while the post-hit invincibility window is running
    pub fn is_invincible(&self, now_ms: u64, window_ms: u64) -> bool {
        within_window(self.last_hit_ms, now_ms, window_ms)
    }

    /// Reset per-room transient state; the player re-enters at the arena centre
    pub fn reset_for_room(&mut self) {
        self.pos = crate::arena_center();
        self.last_hit_ms = None;
        self.last_attack_ms = None;
        self.confused_until_ms = 0;
    }
}

/// `true` if `last` happened less than `window_ms` before `now_ms`
#[inline]
pub(crate) fn within_window(last: Option<u64>, now_ms: u64, window_ms: u64) -> bool {
    matches!(last, Some(t) if now_ms.saturating_sub(t) < window_ms)
}

/// `true` if a cooldown that last fired at `last` has elapsed
#[inline]
pub(crate) fn cooldown_ready(last: Option<u64>, now_ms: u64, cooldown_ms: u64) -> bool {
    !within_window(last, now_ms, cooldown_ms)
}

/// Enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnemyKind {
    #[default]
    Normal,
    Brute,
    Shortie,
    Ranged,
    Ghost,
    Reaper,
    Vampire,
    Mutant,
    PossessedMilk,
}

/// Multipliers an archetype applies to the shared base stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindMultipliers {
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub size: f32,
}

/// Behaviour flags and special values of an archetype
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnemyTraits {
    pub can_shoot: bool,
    pub passes_obstacles: bool,
    pub throws_obstacles: bool,
    /// Non-zero inflicts a poison stack on contact
    pub poison_damage: f32,
    /// Percent of dealt contact damage healed back
    pub lifesteal_percent: f32,
    pub confusion_ms: u64,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 9] = [
        EnemyKind::Normal,
        EnemyKind::Brute,
        EnemyKind::Shortie,
        EnemyKind::Ranged,
        EnemyKind::Ghost,
        EnemyKind::Reaper,
        EnemyKind::Vampire,
        EnemyKind::Mutant,
        EnemyKind::PossessedMilk,
    ];

    /// Weighted roll table for regular enemies (normal counts twice)
    pub const ROLL_TABLE: [EnemyKind; 10] = [
        EnemyKind::Normal,
        EnemyKind::Normal,
        EnemyKind::Brute,
        EnemyKind::Shortie,
        EnemyKind::Ranged,
        EnemyKind::Ghost,
        EnemyKind::Reaper,
        EnemyKind::Vampire,
        EnemyKind::Mutant,
        EnemyKind::PossessedMilk,
    ];

    /// Archetypes a boss may summon
    pub const MINION_TABLE: [EnemyKind; 4] = [
        EnemyKind::Normal,
        EnemyKind::Shortie,
        EnemyKind::Brute,
        EnemyKind::Ranged,
    ];

    pub fn multipliers(&self) -> KindMultipliers {
        let (health, damage, speed, size) = match self {
            EnemyKind::Normal => (1.0, 1.0, 1.0, 1.0),
            EnemyKind::Brute => (2.5, 2.5, 0.4, 1.3),
            EnemyKind::Shortie => (0.5, 0.6, 1.7, 0.7),
            EnemyKind::Ranged => (0.8, 0.9, 1.3, 0.9),
            EnemyKind::Ghost => (0.7, 0.5, 0.6, 1.0),
            EnemyKind::Reaper => (1.2, 1.1, 1.0, 1.0),
            EnemyKind::Vampire => (1.5, 1.3, 1.1, 1.1),
            EnemyKind::Mutant => (5.0, 3.5, 0.7, 1.5),
            EnemyKind::PossessedMilk => (1.0, 1.5, 0.8, 0.95),
        };
        KindMultipliers { health, damage, speed, size }
    }

    pub fn traits(&self) -> EnemyTraits {
        match self {
            EnemyKind::Ranged => EnemyTraits {
                can_shoot: true,
                ..Default::default()
            },
            EnemyKind::Ghost => EnemyTraits {
                passes_obstacles: true,
                ..Default::default()
            },
            EnemyKind::Reaper => EnemyTraits {
                poison_damage: 3.0,
                ..Default::default()
            },
            EnemyKind::Vampire => EnemyTraits {
                lifesteal_percent: 50.0,
                ..Default::default()
            },
            EnemyKind::Mutant => EnemyTraits {
                throws_obstacles: true,
                poison_damage: 5.0,
                ..Default::default()
            },
            EnemyKind::PossessedMilk => EnemyTraits {
                confusion_ms: 3000,
                ..Default::default()
            },
            _ => EnemyTraits::default(),
        }
    }

    /// Display colour (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            EnemyKind::Normal => 0xef4444,
            EnemyKind::Brute => 0x8b5cf6,
            EnemyKind::Shortie => 0x06b6d4,
            EnemyKind::Ranged => 0xf97316,
            EnemyKind::Ghost => 0x94a3b8,
            EnemyKind::Reaper => 0x1e293b,
            EnemyKind::Vampire => 0x7f1d1d,
            EnemyKind::Mutant => 0x14532d,
            EnemyKind::PossessedMilk => 0xf8f8f8,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    /// Collision diameter
    pub size: f32,
    pub color: u32,
    pub is_boss: bool,
    pub name: Option<String>,
    pub traits: EnemyTraits,
    #[serde(default)]
    pub last_shot_ms: Option<u64>,
    #[serde(default)]
    pub last_throw_ms: Option<u64>,
    #[serde(default)]
    pub last_summon_ms: Option<u64>,
    #[serde(default)]
    pub last_hit_ms: Option<u64>,
    /// Player who landed the most recent hit (kill credit)
    #[serde(default)]
    pub last_hit_by: Option<PlayerSlot>,
}

impl Enemy {
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_invincible(&self, now_ms: u64, window_ms: u64) -> bool {
        within_window(self.last_hit_ms, now_ms, window_ms)
    }
}

/// Obstacle flavours (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObstacleKind {
    Crate,
    Barrel,
    Rock,
    Cheese,
    MilkCarton,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Crate,
        ObstacleKind::Barrel,
        ObstacleKind::Rock,
        ObstacleKind::Cheese,
        ObstacleKind::MilkCarton,
    ];
}

/// Static axis-aligned obstacle; `pos` is the rectangle centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player(PlayerSlot),
    Enemy,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: ProjectileOwner,
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub damage: f32,
    /// Collision diameter
    pub size: f32,
    /// Extra enemies this projectile may hit after its first
    pub piercing: u32,
    pub knockback: f32,
    /// Distinct enemies already hit
    #[serde(default)]
    pub hit_enemies: Vec<u32>,
}

impl Projectile {
    pub fn is_enemy(&self) -> bool {
        self.owner == ProjectileOwner::Enemy
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in ticks
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
    pub size: f32,
}

/// Background palette, indexed by room number
pub const ROOM_BACKGROUNDS: [u32; 6] = [0xfef3c7, 0xddd6fe, 0xfecaca, 0xbfdbfe, 0xbbf7d0, 0xfbcfe8];

/// A generated room (immutable once built)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub number: u32,
    /// Enemies in release order
    pub enemies: Vec<Enemy>,
    pub obstacles: Vec<Obstacle>,
    pub is_boss: bool,
    pub background: u32,
}

/// Phase of one room attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Queued enemies are still being released
    Spawning,
    /// Every enemy is in the arena
    Active,
    /// All enemies defeated (terminal)
    Cleared,
    /// Every player is down (terminal)
    GameOver,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Cleared | SessionPhase::GameOver)
    }
}

/// Terminal result of a room attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomOutcome {
    Cleared { coins_earned: u64, no_damage: bool },
    GameOver { coins_earned: u64 },
}

impl RoomOutcome {
    pub fn coins_earned(&self) -> u64 {
        match *self {
            RoomOutcome::Cleared { coins_earned, .. } | RoomOutcome::GameOver { coins_earned } => {
                coins_earned
            }
        }
    }
}

/// Complete state of one room attempt
#[derive(Debug, Clone)]
pub struct RoomSession {
    pub room_number: u32,
    pub is_boss_room: bool,
    pub difficulty: Difficulty,
    pub tuning: Tuning,
    pub phase: SessionPhase,
    /// Ordered player slots
    pub players: Vec<Player>,
    pub obstacles: Vec<Obstacle>,
    /// Enemies still waiting to be released
    pub spawn_queue: VecDeque<Enemy>,
    /// Enemies in the arena (sorted by id)
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub coins_earned: u64,
    pub kills: u32,
    pub took_damage: bool,
    /// At least one enemy has been in the arena
    pub had_enemies: bool,
    pub all_spawned: bool,
    /// Enemies the room started with (before any summons)
    pub queued_total: u32,
    pub outcome: Option<RoomOutcome>,
    /// Timestamp of the most recent tick
    pub now_ms: u64,
    pub time_ticks: u64,
    pub(crate) last_spawn_ms: u64,
    pub(crate) last_poison_tick_ms: u64,
    pub(crate) rng: Pcg32,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl RoomSession {
    /// Start a room attempt at `start_ms`
    pub fn new(
        room: Room,
        mut players: Vec<Player>,
        difficulty: Difficulty,
        tuning: Tuning,
        seed: u64,
        start_ms: u64,
    ) -> Self {
        for (slot, player) in players.iter_mut().enumerate() {
            player.slot = slot;
            player.reset_for_room();
            player.last_regen_ms = start_ms;
        }

        let next_enemy_id = room.enemies.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let queued_total = room.enemies.len() as u32;
        log::info!(
            "Room {} start: {} enemies queued, {} obstacles, {} player(s){}",
            room.number,
            room.enemies.len(),
            room.obstacles.len(),
            players.len(),
            if room.is_boss { " [BOSS]" } else { "" }
        );

        Self {
            room_number: room.number,
            is_boss_room: room.is_boss,
            difficulty,
            tuning,
            phase: SessionPhase::Spawning,
            players,
            obstacles: room.obstacles,
            spawn_queue: room.enemies.into(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            coins_earned: 0,
            kills: 0,
            took_damage: false,
            had_enemies: false,
            all_spawned: false,
            queued_total,
            outcome: None,
            now_ms: start_ms,
            time_ticks: 0,
            last_spawn_ms: start_ms,
            last_poison_tick_ms: start_ms,
            rng: Pcg32::seed_from_u64(seed),
            next_enemy_id,
            next_projectile_id: 1,
        }
    }

    pub fn next_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Every queued enemy has been released and none remain in the arena.
    ///
    /// A room generated without enemies clears once spawning completes.
    pub fn is_clear(&self) -> bool {
        self.all_spawned && self.enemies.is_empty() && (self.had_enemies || self.queued_total == 0)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}
