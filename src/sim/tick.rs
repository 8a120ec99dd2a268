//! Fixed timestep simulation tick
//!
//! Room session controller: advances one room attempt deterministically.
//! Within a tick the order is fixed: spawns, regen, player movement, player
//! attacks, enemy behaviours, enemy movement, contact damage, poison,
//! projectiles, then the enemy health flush, deaths (queuing lifesteal), the
//! player health flush and the terminal checks.

use glam::Vec2;

use super::ai::{enemy_actions, move_enemies, move_players, player_attacks};
use super::combat::{TickBatch, poison_tick, regen_tick, resolve_contacts, resolve_deaths};
use super::events::GameEvent;
use super::projectile::{spawn_burst, update_particles, update_projectiles};
use super::state::{Player, RoomOutcome, RoomSession, SessionPhase};

/// Input for one player slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Each component in [-1, 1]
    pub move_dir: Vec2,
    /// Attack button went down this tick.
    ///
    /// Attacks are automatic while an enemy is targetable; a press also fires
    /// when none is, aimed along `move_dir` (straight up when standing still).
    pub attack: bool,
}

impl PlayerInput {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            move_dir: Vec2::new(x, y),
            attack: false,
        }
    }

    pub fn with_attack(mut self, pressed: bool) -> Self {
        self.attack = pressed;
        self
    }
}

/// Input commands for a single tick (deterministic)
///
/// Interact presses have no meaning inside a room; between rooms they drive
/// `Run::choose_upgrade`, `Run::choose_downgrade` and `Run::begin_room`.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Monotonic timestamp sampled once for the whole tick
    pub now_ms: u64,
    /// One entry per player slot; missing slots stand still
    pub players: Vec<PlayerInput>,
}

/// Advance a room session by one tick, returning the events it produced.
///
/// Once the session reaches a terminal phase further calls are no-ops.
pub fn tick(session: &mut RoomSession, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if session.is_over() {
        return events;
    }

    session.now_ms = input.now_ms.max(session.now_ms);
    session.time_ticks += 1;

    release_spawns(session, &mut events);

    let mut batch = TickBatch::new();
    regen_tick(session, &mut batch);

    move_players(session, &input.players);
    player_attacks(session, &input.players, &mut events);

    enemy_actions(session, &mut events);
    move_enemies(session);
    resolve_contacts(session, &mut batch, &mut events);
    poison_tick(session, &mut batch, &mut events);

    update_projectiles(session, &mut batch, &mut events);

    batch.flush_enemies(session);
    resolve_deaths(session, &mut batch, &mut events);
    for slot in batch.flush(session) {
        log::debug!("Player {} down in room {}", slot, session.room_number);
        events.push(GameEvent::PlayerDowned { slot });
    }

    if !session.players.iter().any(Player::is_alive) {
        latch_game_over(session, &mut events);
    } else {
        session.had_enemies |= !session.enemies.is_empty();
        if session.is_clear() {
            latch_cleared(session, &mut events);
        }
    }

    update_particles(&mut session.particles);
    session.normalize_order();
    events
}

/// Pure form of `tick`: the previous session is left untouched
pub fn step(session: &RoomSession, input: &TickInput) -> (RoomSession, Vec<GameEvent>) {
    let mut next = session.clone();
    let events = tick(&mut next, input);
    (next, events)
}

/// Release the next queued enemy once the spawn interval has elapsed
fn release_spawns(session: &mut RoomSession, events: &mut Vec<GameEvent>) {
    if session.all_spawned {
        return;
    }
    let now = session.now_ms;
    if now.saturating_sub(session.last_spawn_ms) < session.tuning.spawn_interval_ms {
        return;
    }
    session.last_spawn_ms = now;

    if let Some(enemy) = session.spawn_queue.pop_front() {
        spawn_burst(
            &mut session.particles,
            &mut session.rng,
            enemy.pos,
            enemy.color,
            session.tuning.spawn_burst_particles,
            session.tuning.max_particles,
        );
        events.push(GameEvent::EnemySpawned {
            id: enemy.id,
            kind: enemy.kind,
            pos: enemy.pos,
        });
        session.enemies.push(enemy);
        session.had_enemies = true;
    }

    if session.spawn_queue.is_empty() {
        session.all_spawned = true;
        session.phase = SessionPhase::Active;
        log::debug!("Room {}: all enemies released", session.room_number);
    }
}

fn latch_game_over(session: &mut RoomSession, events: &mut Vec<GameEvent>) {
    debug_assert!(session.outcome.is_none(), "terminal state latched twice");
    let coins_earned = session.coins_earned;
    session.phase = SessionPhase::GameOver;
    session.outcome = Some(RoomOutcome::GameOver { coins_earned });
    log::info!(
        "Game over in room {} ({} kills, {} coins)",
        session.room_number,
        session.kills,
        coins_earned
    );
    events.push(GameEvent::GameOver {
        room: session.room_number,
        coins_earned,
    });
}

fn latch_cleared(session: &mut RoomSession, events: &mut Vec<GameEvent>) {
    debug_assert!(session.outcome.is_none(), "terminal state latched twice");
    session.coins_earned += session.difficulty.coin_rewards().room;
    let coins_earned = session.coins_earned;
    let no_damage = session.tuning.track_no_damage && !session.took_damage;
    session.phase = SessionPhase::Cleared;
    session.outcome = Some(RoomOutcome::Cleared {
        coins_earned,
        no_damage,
    });
    log::info!(
        "Room {} cleared ({} kills, {} coins{})",
        session.room_number,
        session.kills,
        coins_earned,
        if no_damage { ", untouched" } else { "" }
    );
    events.push(GameEvent::RoomCleared {
        room: session.room_number,
        coins_earned,
        no_damage,
    });
}
