//! Projectiles and particles
//!
//! Projectiles are spawned by player auto-attacks and enemy behaviours, advance
//! every tick, and are removed on the first of: leaving the arena, touching an
//! obstacle, or exhausting their pierce budget. Particles share the same
//! advance/expire bookkeeping but never affect gameplay.

use glam::Vec2;
use rand::Rng;

use super::collision::{circles_overlap, is_position_blocked, out_of_arena};
use super::combat::{TickBatch, apply_knockback, hit_enemy, hit_player};
use super::events::GameEvent;
use super::state::{Particle, PlayerSlot, Projectile, ProjectileOwner, RoomSession};
use crate::consts::PLAYER_SIZE;

/// Downward acceleration applied to particles (px/tick²)
pub const PARTICLE_GRAVITY: f32 = 0.2;
const BURST_LIFE_TICKS: u32 = 30;
const BURST_PARTICLE_SIZE: f32 = 6.0;
const BURST_SPEED: f32 = 4.0;
const HIT_SPARK_PARTICLES: u32 = 4;
const HIT_SPARK_COLOR: u32 = 0xfbbf24;

/// Angles for a volley of `count` projectiles fanned around `aim`
pub fn fan_angles(aim: f32, count: u32, spread: f32) -> Vec<f32> {
    let count = count.max(1);
    if count == 1 {
        return vec![aim];
    }
    let mid = (count - 1) as f32 / 2.0;
    (0..count)
        .map(|i| aim + (i as f32 - mid) * spread / count as f32)
        .collect()
}

/// Build a player projectile heading along `angle`
pub fn player_projectile(
    id: u32,
    slot: PlayerSlot,
    origin: Vec2,
    angle: f32,
    speed: f32,
    size: f32,
    damage: f32,
    piercing: u32,
    knockback: f32,
) -> Projectile {
    Projectile {
        id,
        owner: ProjectileOwner::Player(slot),
        pos: origin,
        vel: crate::angle_to_dir(angle) * speed,
        damage,
        size,
        piercing,
        knockback,
        hit_enemies: Vec::new(),
    }
}

/// Build an enemy projectile aimed at `target`
pub fn enemy_projectile(id: u32, origin: Vec2, target: Vec2, speed: f32, size: f32, damage: f32) -> Projectile {
    let dir = (target - origin).normalize_or(Vec2::X);
    Projectile {
        id,
        owner: ProjectileOwner::Enemy,
        pos: origin,
        vel: dir * speed,
        damage,
        size,
        piercing: 0,
        knockback: 0.0,
        hit_enemies: Vec::new(),
    }
}

/// Advance every projectile, resolve its hits and drop the expired ones
pub fn update_projectiles(session: &mut RoomSession, batch: &mut TickBatch, events: &mut Vec<GameEvent>) {
    let now = session.now_ms;
    let mut projectiles = std::mem::take(&mut session.projectiles);

    projectiles.retain_mut(|proj| {
        proj.pos += proj.vel;
        if out_of_arena(proj.pos) || is_position_blocked(proj.pos, proj.size, &session.obstacles) {
            return false;
        }

        match proj.owner {
            ProjectileOwner::Player(slot) => {
                for enemy in session.enemies.iter_mut() {
                    if proj.hit_enemies.contains(&enemy.id)
                        || enemy.health + batch.pending_enemy(enemy.id) <= 0.0
                        || !circles_overlap(proj.pos, proj.size, enemy.pos, enemy.size)
                    {
                        continue;
                    }

                    proj.hit_enemies.push(enemy.id);
                    if hit_enemy(enemy, proj.damage, slot, now, &session.tuning, batch, events).is_some() {
                        apply_knockback(enemy, proj.pos, proj.knockback, &session.tuning, &session.obstacles);
                        spawn_burst(
                            &mut session.particles,
                            &mut session.rng,
                            enemy.pos,
                            HIT_SPARK_COLOR,
                            HIT_SPARK_PARTICLES,
                            session.tuning.max_particles,
                        );
                    }
                    if proj.hit_enemies.len() as u32 > proj.piercing {
                        return false;
                    }
                }
                true
            }
            ProjectileOwner::Enemy => {
                let Some(player) = session
                    .players
                    .iter_mut()
                    .find(|p| p.is_alive() && circles_overlap(proj.pos, proj.size, p.pos, PLAYER_SIZE))
                else {
                    return true;
                };
                if hit_player(player, proj.damage, now, &session.tuning, batch, events).is_some() {
                    session.took_damage = true;
                }
                false
            }
        }
    });

    session.projectiles = projectiles;
}

/// Emit a radial burst of particles, respecting the particle cap
pub fn spawn_burst<R: Rng + ?Sized>(
    particles: &mut Vec<Particle>,
    rng: &mut R,
    pos: Vec2,
    color: u32,
    count: u32,
    max_particles: usize,
) {
    for _ in 0..count {
        if particles.len() >= max_particles {
            return;
        }
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = rng.random_range(0.5..BURST_SPEED);
        particles.push(Particle {
            pos,
            vel: crate::angle_to_dir(angle) * speed,
            life: BURST_LIFE_TICKS,
            max_life: BURST_LIFE_TICKS,
            color,
            size: BURST_PARTICLE_SIZE,
        });
    }
}

/// Drift, fall and age particles; drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>) {
    particles.retain_mut(|p| {
        p.pos += p.vel;
        p.vel.y += PARTICLE_GRAVITY;
        p.life = p.life.saturating_sub(1);
        p.life > 0
    });
}
