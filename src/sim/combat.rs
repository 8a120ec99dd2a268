//! Damage resolution
//!
//! Every health change made during a tick goes through a single `TickBatch`.
//! Hits set their status effects (invincibility, poison, confusion, kill
//! credit) immediately, but health deltas are accumulated and applied once,
//! clamped to `[0, max_health]`. Enemy deltas are flushed first so deaths can
//! queue the killers' lifesteal before player deltas are applied.

use std::collections::BTreeMap;

use glam::Vec2;

use super::collision::{circles_overlap, resolve_legal_position};
use super::events::GameEvent;
use super::projectile::spawn_burst;
use super::state::{Enemy, Obstacle, Player, PlayerSlot, RoomSession};
use crate::consts::PLAYER_SIZE;
use crate::tuning::Tuning;

const DEATH_BURST_PARTICLES: u32 = 10;
const BLOOD_COLOR: u32 = 0xdc2626;

/// Health deltas buffered for one tick
#[derive(Debug, Default, Clone)]
pub struct TickBatch {
    players: BTreeMap<PlayerSlot, f32>,
    enemies: BTreeMap<u32, f32>,
}

impl TickBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn damage_player(&mut self, slot: PlayerSlot, amount: f32) {
        *self.players.entry(slot).or_default() -= amount;
    }

    pub fn heal_player(&mut self, slot: PlayerSlot, amount: f32) {
        *self.players.entry(slot).or_default() += amount;
    }

    pub fn damage_enemy(&mut self, id: u32, amount: f32) {
        *self.enemies.entry(id).or_default() -= amount;
    }

    pub fn heal_enemy(&mut self, id: u32, amount: f32) {
        *self.enemies.entry(id).or_default() += amount;
    }

    /// Net pending change for an enemy
    pub fn pending_enemy(&self, id: u32) -> f32 {
        self.enemies.get(&id).copied().unwrap_or(0.0)
    }

    /// Net pending change for a player
    pub fn pending_player(&self, slot: PlayerSlot) -> f32 {
        self.players.get(&slot).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.enemies.is_empty()
    }

    /// Apply and drain the buffered enemy deltas
    pub fn flush_enemies(&mut self, session: &mut RoomSession) {
        for (id, delta) in std::mem::take(&mut self.enemies) {
            if let Some(enemy) = session.enemies.iter_mut().find(|e| e.id == id) {
                enemy.health = (enemy.health + delta).clamp(0.0, enemy.max_health);
            }
        }
    }

    /// Apply every remaining buffered delta exactly once, clamped to `[0, max_health]`.
    ///
    /// Returns the slots of players who went down during this flush.
    pub fn flush(mut self, session: &mut RoomSession) -> Vec<PlayerSlot> {
        self.flush_enemies(session);
        let mut downed = Vec::new();

        for (slot, delta) in self.players {
            let Some(player) = session.players.get_mut(slot) else {
                continue;
            };
            let was_alive = player.is_alive();
            let max = player.effective().max_health;
            player.health = (player.health + delta).clamp(0.0, max);
            if was_alive && !player.is_alive() {
                downed.push(slot);
            }
        }

        downed
    }
}

/// Land a hit on a player, honouring the invincibility window and defense.
///
/// Returns the damage that landed, or `None` if the player ignored the hit.
pub fn hit_player(
    player: &mut Player,
    raw_damage: f32,
    now_ms: u64,
    tuning: &Tuning,
    batch: &mut TickBatch,
    events: &mut Vec<GameEvent>,
) -> Option<f32> {
    if !player.is_alive() || player.is_invincible(now_ms, tuning.invincibility_ms) {
        return None;
    }

    let defense = player.effective().defense;
    let damage = tuning.mitigated_damage(raw_damage, defense);
    batch.damage_player(player.slot, damage);
    player.last_hit_ms = Some(now_ms);
    player.accumulated_damage += damage;
    events.push(GameEvent::PlayerDamaged {
        slot: player.slot,
        damage,
    });
    Some(damage)
}

/// Land a hit from a player on an enemy.
///
/// Enemies carry no defense, so only the damage floor applies. The hitting
/// player becomes the enemy's kill credit.
pub fn hit_enemy(
    enemy: &mut Enemy,
    raw_damage: f32,
    by: PlayerSlot,
    now_ms: u64,
    tuning: &Tuning,
    batch: &mut TickBatch,
    events: &mut Vec<GameEvent>,
) -> Option<f32> {
    if enemy.is_invincible(now_ms, tuning.invincibility_ms) {
        return None;
    }

    let damage = tuning.mitigated_damage(raw_damage, 0.0);
    batch.damage_enemy(enemy.id, damage);
    enemy.last_hit_ms = Some(now_ms);
    enemy.last_hit_by = Some(by);
    events.push(GameEvent::EnemyHit {
        id: enemy.id,
        damage,
        by,
    });
    Some(damage)
}

/// Push an enemy away from `source` after a hit
pub fn apply_knockback(enemy: &mut Enemy, source: Vec2, knockback: f32, tuning: &Tuning, obstacles: &[Obstacle]) {
    let distance = knockback * tuning.knockback_factor;
    if distance <= 0.0 {
        return;
    }
    let dir = (enemy.pos - source).normalize_or_zero();
    let target = crate::clamp_to_arena(enemy.pos + dir * distance, enemy.size);
    enemy.pos = resolve_legal_position(
        enemy.pos,
        target,
        enemy.size,
        enemy.traits.passes_obstacles,
        obstacles,
    );
}

/// Contact damage between every living player and every touching enemy
pub fn resolve_contacts(session: &mut RoomSession, batch: &mut TickBatch, events: &mut Vec<GameEvent>) {
    let now = session.now_ms;
    let tuning = &session.tuning;

    for player in session.players.iter_mut() {
        for enemy in session.enemies.iter_mut() {
            if !player.is_alive() || player.is_invincible(now, tuning.invincibility_ms) {
                break;
            }
            if !circles_overlap(player.pos, PLAYER_SIZE, enemy.pos, enemy.size) {
                continue;
            }
            // Already doomed this tick
            if enemy.health + batch.pending_enemy(enemy.id) <= 0.0 {
                continue;
            }

            let Some(damage) = hit_player(player, enemy.damage, now, tuning, batch, events) else {
                continue;
            };
            session.took_damage = true;

            if enemy.traits.lifesteal_percent > 0.0 {
                batch.heal_enemy(enemy.id, damage * enemy.traits.lifesteal_percent / 100.0);
            }
            if enemy.traits.poison_damage > 0.0 {
                player.poison_stacks = (player.poison_stacks + 1.0).min(tuning.max_poison_stacks);
            }
            if enemy.traits.confusion_ms > 0 {
                player.confused_until_ms = now + enemy.traits.confusion_ms;
            }

            let thorns = player.effective().thorns;
            if thorns > 0.0 {
                batch.damage_enemy(enemy.id, damage * thorns / 100.0);
                enemy.last_hit_by = Some(player.slot);
            }
        }
    }
}

/// Global poison tick: every poisoned player loses `stacks * dmg` and stacks decay
pub fn poison_tick(session: &mut RoomSession, batch: &mut TickBatch, events: &mut Vec<GameEvent>) {
    let now = session.now_ms;
    if now.saturating_sub(session.last_poison_tick_ms) < session.tuning.poison_tick_ms {
        return;
    }
    session.last_poison_tick_ms = now;

    let tuning = &session.tuning;
    for player in session.players.iter_mut() {
        if !player.is_alive() || player.poison_stacks <= 0.0 {
            continue;
        }
        let damage = player.poison_stacks * tuning.poison_damage_per_stack;
        batch.damage_player(player.slot, damage);
        player.accumulated_damage += damage;
        player.poison_stacks = (player.poison_stacks - tuning.poison_decay_per_tick).max(0.0);
        session.took_damage = true;
        events.push(GameEvent::PlayerDamaged {
            slot: player.slot,
            damage,
        });
    }
}

/// Ability regeneration for living players, once per regen period
pub fn regen_tick(session: &mut RoomSession, batch: &mut TickBatch) {
    let now = session.now_ms;
    let period = session.tuning.regen_tick_ms;
    for player in session.players.iter_mut() {
        if !player.is_alive() || now.saturating_sub(player.last_regen_ms) < period {
            continue;
        }
        player.last_regen_ms = now;
        let regen = player.effective().regen;
        if regen > 0.0 {
            batch.heal_player(player.slot, regen);
        }
    }
}

/// Queue a killer's lifesteal share of max health. Returns the amount queued.
pub fn lifesteal_on_kill(player: &Player, batch: &mut TickBatch) -> f32 {
    if !player.is_alive() {
        return 0.0;
    }
    let stats = player.effective();
    let heal = stats.lifesteal / 100.0 * stats.max_health;
    if heal > 0.0 {
        batch.heal_player(player.slot, heal);
    }
    heal
}

/// Remove dead enemies exactly once, awarding coins and kill credit.
///
/// Runs after the enemy deltas are flushed; lifesteal goes into `batch`.
pub fn resolve_deaths(session: &mut RoomSession, batch: &mut TickBatch, events: &mut Vec<GameEvent>) {
    if !session.enemies.iter().any(Enemy::is_dead) {
        return;
    }

    let rewards = session.difficulty.coin_rewards();
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) =
        std::mem::take(&mut session.enemies).into_iter().partition(Enemy::is_dead);
    session.enemies = alive;

    for enemy in dead {
        let coins = if enemy.is_boss { rewards.boss } else { rewards.enemy };
        session.coins_earned += coins;
        session.kills += 1;

        if let Some(killer) = enemy.last_hit_by.and_then(|slot| session.players.get_mut(slot)) {
            killer.coins += coins;
            lifesteal_on_kill(killer, batch);
        }

        spawn_burst(
            &mut session.particles,
            &mut session.rng,
            enemy.pos,
            BLOOD_COLOR,
            DEATH_BURST_PARTICLES,
            session.tuning.max_particles,
        );

        if enemy.is_boss {
            log::info!("Boss {} defeated in room {}", enemy.id, session.room_number);
        }
        events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
            is_boss: enemy.is_boss,
            killer: enemy.last_hit_by,
            coins,
        });
    }
}
