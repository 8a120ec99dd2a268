//! Movement and behaviours
//!
//! Player movement and auto-attacks run first, then enemy behaviours
//! (shooting, throwing, summoning), then enemy steering. Every position change
//! is committed through `resolve_legal_position`.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collision::{aabb_overlap, resolve_legal_position};
use super::events::GameEvent;
use super::projectile::{enemy_projectile, fan_angles, player_projectile, spawn_burst};
use super::room_gen::build_enemy;
use super::state::{Enemy, EnemyKind, Obstacle, Player, RoomSession, cooldown_ready};
use super::tick::PlayerInput;
use crate::consts::*;

/// Summoned minions appear this far from the boss
const SUMMON_MIN_DISTANCE: f32 = 80.0;
const SUMMON_MAX_DISTANCE: f32 = 120.0;
/// Footprint checked against obstacles for a summoned minion
const SUMMON_FOOTPRINT: f32 = 40.0;
/// Summon positions are kept this far inside the arena
const SUMMON_EDGE_INSET: f32 = 20.0;
const SUMMON_BURST_COLOR: u32 = 0x7c3aed;

/// Position of the living player closest to `from`
pub fn nearest_living_player(players: &[Player], from: Vec2) -> Option<Vec2> {
    players
        .iter()
        .filter(|p| p.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .partial_cmp(&b.pos.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.pos)
}

/// Position of the living enemy closest to `from`
pub fn nearest_enemy(enemies: &[Enemy], from: Vec2) -> Option<Vec2> {
    enemies
        .iter()
        .filter(|e| !e.is_dead())
        .min_by(|a, b| {
            a.pos
                .distance_squared(from)
                .partial_cmp(&b.pos.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.pos)
}

/// Move every living player by their input; confusion inverts the input
pub fn move_players(session: &mut RoomSession, inputs: &[PlayerInput]) {
    let now = session.now_ms;
    for player in session.players.iter_mut().filter(|p| p.is_alive()) {
        let Some(input) = inputs.get(player.slot) else {
            continue;
        };
        let mut dir = input.move_dir.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
        if !dir.is_finite() || dir == Vec2::ZERO {
            continue;
        }
        if player.is_confused(now) {
            dir = -dir;
        }

        let speed = player.effective().speed;
        let target = crate::clamp_to_arena(player.pos + dir * speed, PLAYER_SIZE);
        player.pos = resolve_legal_position(player.pos, target, PLAYER_SIZE, false, &session.obstacles);
    }
}

/// Aim for a pressed attack with nothing to target
fn manual_aim(move_dir: Vec2) -> f32 {
    if move_dir.is_finite() && move_dir != Vec2::ZERO {
        move_dir.y.atan2(move_dir.x)
    } else {
        -std::f32::consts::FRAC_PI_2
    }
}

/// Auto-attack: every ready player fires a volley at the closest enemy.
///
/// A pressed attack fires even without a target.
pub fn player_attacks(session: &mut RoomSession, inputs: &[PlayerInput], events: &mut Vec<GameEvent>) {
    let now = session.now_ms;
    let mut volleys = Vec::new();

    for player in session.players.iter_mut().filter(|p| p.is_alive()) {
        let stats = player.effective();
        let ready = player
            .last_attack_ms
            .is_none_or(|t| now.saturating_sub(t) as f32 >= stats.attack_cooldown_ms());
        if !ready {
            continue;
        }
        let pressed = inputs.get(player.slot).filter(|input| input.attack);
        let aim = match (nearest_enemy(&session.enemies, player.pos), pressed) {
            (Some(target), _) => {
                let to_target = target - player.pos;
                to_target.y.atan2(to_target.x)
            }
            (None, Some(input)) => manual_aim(input.move_dir),
            (None, None) => continue,
        };

        player.last_attack_ms = Some(now);
        volleys.push((player.slot, player.pos, aim, stats, player.weapon.id.clone()));
    }

    let tuning = session.tuning.clone();
    for (slot, origin, aim, stats, weapon) in volleys {
        for angle in fan_angles(aim, stats.multishot, tuning.multishot_spread) {
            let id = session.next_projectile_id();
            session.projectiles.push(player_projectile(
                id,
                slot,
                origin,
                angle,
                tuning.player_projectile_speed,
                tuning.player_projectile_size,
                stats.attack_damage,
                stats.piercing,
                stats.knockback,
            ));
        }
        events.push(GameEvent::PlayerAttacked {
            slot,
            weapon,
            projectiles: stats.multishot,
        });
    }
}

/// Enemy-specific behaviours: ranged shots, obstacle throws and boss summons
pub fn enemy_actions(session: &mut RoomSession, events: &mut Vec<GameEvent>) {
    let now = session.now_ms;
    let tuning = &session.tuning;
    let mut shots = Vec::new();
    let mut summoners = Vec::new();

    for enemy in session.enemies.iter_mut() {
        let Some(target) = nearest_living_player(&session.players, enemy.pos) else {
            continue;
        };

        if enemy.traits.can_shoot && cooldown_ready(enemy.last_shot_ms, now, tuning.enemy_shot_cooldown_ms) {
            enemy.last_shot_ms = Some(now);
            shots.push((
                enemy.pos,
                target,
                tuning.enemy_shot_speed,
                tuning.enemy_shot_size,
                enemy.damage * tuning.enemy_shot_damage_factor,
            ));
        }

        if enemy.traits.throws_obstacles
            && cooldown_ready(enemy.last_throw_ms, now, tuning.obstacle_throw_cooldown_ms)
        {
            enemy.last_throw_ms = Some(now);
            shots.push((
                enemy.pos,
                target,
                tuning.obstacle_throw_speed,
                tuning.obstacle_throw_size,
                enemy.damage * tuning.obstacle_throw_damage_factor,
            ));
        }

        if enemy.is_boss {
            // First sighting arms the timer
            if enemy.last_summon_ms.is_none() {
                enemy.last_summon_ms = Some(now);
            } else if cooldown_ready(enemy.last_summon_ms, now, tuning.boss_summon_cooldown_ms) {
                enemy.last_summon_ms = Some(now);
                summoners.push((enemy.id, enemy.pos));
            }
        }
    }

    for (origin, target, speed, size, damage) in shots {
        let id = session.next_projectile_id();
        session
            .projectiles
            .push(enemy_projectile(id, origin, target, speed, size, damage));
    }

    for (boss_id, boss_pos) in summoners {
        summon_minions(session, boss_id, boss_pos, events);
    }
}

/// Find a spot near the boss whose minion footprint is clear of obstacles
fn find_summon_position<R: Rng + ?Sized>(
    boss_pos: Vec2,
    obstacles: &[Obstacle],
    attempts: u32,
    rng: &mut R,
) -> Option<Vec2> {
    let footprint = Vec2::splat(SUMMON_FOOTPRINT);
    let min = Vec2::splat(SUMMON_EDGE_INSET);
    let max = Vec2::new(ARENA_WIDTH - SUMMON_EDGE_INSET, ARENA_HEIGHT - SUMMON_EDGE_INSET);

    for _ in 0..attempts {
        let angle = rng.random::<f32>() * TAU;
        let distance = rng.random_range(SUMMON_MIN_DISTANCE..=SUMMON_MAX_DISTANCE);
        let pos = (boss_pos + crate::angle_to_dir(angle) * distance).clamp(min, max);
        let blocked = obstacles
            .iter()
            .any(|o| aabb_overlap(pos, footprint, o.pos, Vec2::new(o.width, o.height)));
        if !blocked {
            return Some(pos);
        }
    }
    None
}

/// Spawn 1-2 minions around a boss; minions with no legal spot are skipped
fn summon_minions(session: &mut RoomSession, boss_id: u32, boss_pos: Vec2, events: &mut Vec<GameEvent>) {
    let count = session.rng.random_range(1..=2u32);
    let attempts = session.tuning.boss_summon_attempts;
    let mut summoned = 0;

    for _ in 0..count {
        let Some(&kind) = EnemyKind::MINION_TABLE.choose(&mut session.rng) else {
            continue;
        };
        let Some(pos) = find_summon_position(boss_pos, &session.obstacles, attempts, &mut session.rng) else {
            log::debug!("Boss {} found no room for a minion", boss_id);
            continue;
        };

        let id = session.next_enemy_id();
        let mut minion = build_enemy(id, kind, session.room_number, session.difficulty, false);
        minion.pos = pos;
        spawn_burst(
            &mut session.particles,
            &mut session.rng,
            pos,
            SUMMON_BURST_COLOR,
            session.tuning.spawn_burst_particles,
            session.tuning.max_particles,
        );
        events.push(GameEvent::EnemySpawned { id, kind, pos });
        session.enemies.push(minion);
        summoned += 1;
    }

    if summoned > 0 {
        events.push(GameEvent::MinionsSummoned {
            boss_id,
            count: summoned,
        });
    }
}

/// Steer every enemy toward the nearest living player, separating from the others
pub fn move_enemies(session: &mut RoomSession) {
    for i in 0..session.enemies.len() {
        let (pos, speed, size, passes) = {
            let e = &session.enemies[i];
            (e.pos, e.speed, e.size, e.traits.passes_obstacles)
        };
        // Nobody left to chase: freeze
        let Some(target) = nearest_living_player(&session.players, pos) else {
            return;
        };

        let mut next = pos + (target - pos).clamp_length_max(speed);
        for (j, other) in session.enemies.iter().enumerate() {
            if j == i {
                continue;
            }
            let min_distance = (size + other.size) / 2.0;
            let offset = next - other.pos;
            if offset.length_squared() < min_distance * min_distance {
                next = other.pos + offset.normalize_or(Vec2::X) * min_distance;
            }
        }

        let next = crate::clamp_to_arena(next, size);
        session.enemies[i].pos = resolve_legal_position(pos, next, size, passes, &session.obstacles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::is_position_blocked;
    use crate::sim::stats::{BaseStats, CosmeticAbility};
    use crate::sim::state::{Difficulty, ObstacleKind, ProjectileOwner, ROOM_BACKGROUNDS, Room};
    use crate::tuning::Tuning;

    fn session(players: usize) -> RoomSession {
        let room = Room {
            number: 5,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            is_boss: true,
            background: ROOM_BACKGROUNDS[5],
        };
        RoomSession::new(
            room,
            (0..players).map(|i| Player::new(i, BaseStats::default())).collect(),
            Difficulty::Normal,
            Tuning::default(),
            21,
            0,
        )
    }

    fn enemy(session: &mut RoomSession, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = session.next_enemy_id();
        let mut e = build_enemy(id, kind, 1, Difficulty::Normal, false);
        e.pos = pos;
        session.enemies.push(e);
        id
    }

    fn right() -> Vec<PlayerInput> {
        vec![PlayerInput::new(1.0, 0.0)]
    }

    #[test]
    fn test_confusion_inverts_then_reverts() {
        let mut session = session(1);
        session.players[0].confused_until_ms = 1000;
        let start = session.players[0].pos;

        session.now_ms = 500;
        move_players(&mut session, &right());
        assert_eq!(session.players[0].pos, start - Vec2::new(6.0, 0.0));

        session.now_ms = 1000;
        move_players(&mut session, &right());
        assert_eq!(session.players[0].pos, start);
    }

    #[test]
    fn test_player_blocked_by_obstacle_and_arena() {
        let mut session = session(1);
        session.players[0].pos = Vec2::new(781.0, 300.0);
        move_players(&mut session, &right());
        assert_eq!(session.players[0].pos.x, 780.0);

        session.obstacles.push(Obstacle {
            id: 1,
            pos: Vec2::new(450.0, 300.0),
            width: 40.0,
            height: 40.0,
            kind: ObstacleKind::Crate,
        });
        session.players[0].pos = Vec2::new(405.0, 300.0);
        move_players(&mut session, &right());
        assert_eq!(session.players[0].pos, Vec2::new(405.0, 300.0));
    }

    #[test]
    fn test_dead_players_do_not_move() {
        let mut session = session(1);
        session.players[0].health = 0.0;
        let start = session.players[0].pos;
        move_players(&mut session, &right());
        assert_eq!(session.players[0].pos, start);
    }

    #[test]
    fn test_attack_cooldown_and_multishot() {
        let mut session = session(1);
        session.players[0] = Player::new(0, BaseStats::default())
            .with_cosmetic("triple", Some(CosmeticAbility::Multishot(3)));
        enemy(&mut session, EnemyKind::Normal, Vec2::new(600.0, 300.0));

        let mut events = Vec::new();
        player_attacks(&mut session, &[], &mut events);
        assert_eq!(session.projectiles.len(), 3);
        assert!(session
            .projectiles
            .iter()
            .all(|p| p.owner == ProjectileOwner::Player(0) && p.damage == 10.0));

        // Starter weapon attacks twice a second
        session.now_ms = 499;
        player_attacks(&mut session, &[], &mut events);
        assert_eq!(session.projectiles.len(), 3);
        session.now_ms = 500;
        player_attacks(&mut session, &[], &mut events);
        assert_eq!(session.projectiles.len(), 6);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::PlayerAttacked { projectiles: 3, .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_no_attack_without_enemies() {
        let mut session = session(1);
        let mut events = Vec::new();
        player_attacks(&mut session, &[], &mut events);
        assert!(session.projectiles.is_empty());
        assert_eq!(session.players[0].last_attack_ms, None);
    }

    #[test]
    fn test_attack_press_fires_without_target() {
        let mut session = session(2);
        let inputs = vec![
            PlayerInput::new(1.0, 0.0).with_attack(true),
            PlayerInput::default().with_attack(true),
        ];
        let mut events = Vec::new();
        player_attacks(&mut session, &inputs, &mut events);
        assert_eq!(session.projectiles.len(), 2);
        let slot0 = &session.projectiles[0];
        assert_eq!(slot0.owner, ProjectileOwner::Player(0));
        assert!(slot0.vel.x > 0.0 && slot0.vel.y.abs() < 1e-4);
        // Standing still aims up
        let slot1 = &session.projectiles[1];
        assert!(slot1.vel.y < 0.0 && slot1.vel.x.abs() < 1e-4);

        // Still bound by the cooldown
        session.now_ms = 100;
        player_attacks(&mut session, &inputs, &mut events);
        assert_eq!(session.projectiles.len(), 2);

        // Released: nothing fires
        session.now_ms = 1000;
        player_attacks(&mut session, &[PlayerInput::new(1.0, 0.0)], &mut events);
        assert_eq!(session.projectiles.len(), 2);
    }

    #[test]
    fn test_enemies_chase_nearest_living_player() {
        let mut session = session(2);
        session.players[0].pos = Vec2::new(100.0, 300.0);
        session.players[1].pos = Vec2::new(700.0, 300.0);
        enemy(&mut session, EnemyKind::Normal, Vec2::new(200.0, 300.0));

        move_enemies(&mut session);
        assert_eq!(session.enemies[0].pos, Vec2::new(198.0, 300.0));

        // Nearest player down: chase the other one
        session.players[0].health = 0.0;
        move_enemies(&mut session);
        assert_eq!(session.enemies[0].pos, Vec2::new(200.0, 300.0));

        // Everyone down: freeze
        session.players[1].health = 0.0;
        move_enemies(&mut session);
        assert_eq!(session.enemies[0].pos, Vec2::new(200.0, 300.0));
    }

    #[test]
    fn test_enemies_separate() {
        let mut session = session(1);
        session.players[0].pos = Vec2::new(400.0, 300.0);
        enemy(&mut session, EnemyKind::Normal, Vec2::new(200.0, 300.0));
        enemy(&mut session, EnemyKind::Normal, Vec2::new(160.0, 300.0));
        for _ in 0..10 {
            move_enemies(&mut session);
        }
        let gap = session.enemies[0].pos.distance(session.enemies[1].pos);
        assert!(gap >= 40.0 - 1e-3, "gap {}", gap);
    }

    #[test]
    fn test_ranged_shot_cooldown() {
        let mut session = session(1);
        enemy(&mut session, EnemyKind::Ranged, Vec2::new(100.0, 100.0));
        let mut events = Vec::new();

        enemy_actions(&mut session, &mut events);
        assert_eq!(session.projectiles.len(), 1);
        let shot = &session.projectiles[0];
        assert!(shot.is_enemy());
        assert!((shot.damage - session.enemies[0].damage * 0.5).abs() < 1e-6);
        assert!((shot.vel.length() - 5.0).abs() < 1e-4);

        session.now_ms = 1999;
        enemy_actions(&mut session, &mut events);
        assert_eq!(session.projectiles.len(), 1);
        session.now_ms = 2000;
        enemy_actions(&mut session, &mut events);
        assert_eq!(session.projectiles.len(), 2);
    }

    #[test]
    fn test_mutant_throws() {
        let mut session = session(1);
        enemy(&mut session, EnemyKind::Mutant, Vec2::new(100.0, 100.0));
        let mut events = Vec::new();
        enemy_actions(&mut session, &mut events);
        let throw = &session.projectiles[0];
        assert_eq!(throw.size, 20.0);
        assert!((throw.damage - session.enemies[0].damage * 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_boss_summons_on_cooldown() {
        let mut session = session(1);
        let id = session.next_enemy_id();
        let mut boss = build_enemy(id, EnemyKind::Normal, 5, Difficulty::Normal, true);
        boss.pos = Vec2::new(200.0, 200.0);
        session.enemies.push(boss);

        let mut events = Vec::new();
        session.now_ms = 100;
        enemy_actions(&mut session, &mut events);
        assert_eq!(session.enemies.len(), 1);

        session.now_ms = 8099;
        enemy_actions(&mut session, &mut events);
        assert_eq!(session.enemies.len(), 1);

        session.now_ms = 8100;
        enemy_actions(&mut session, &mut events);
        let minions = &session.enemies[1..];
        assert!((1..=2).contains(&minions.len()));
        for minion in minions {
            assert!(!minion.is_boss);
            assert!(EnemyKind::MINION_TABLE.contains(&minion.kind));
            assert!(minion.pos.distance(Vec2::new(200.0, 200.0)) <= 120.0 + 1e-3);
            assert!(minion.id > id);
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::MinionsSummoned { boss_id, .. } if *boss_id == id)));
    }

    #[test]
    fn test_boss_summon_skipped_when_blocked() {
        let mut session = session(1);
        session.obstacles.push(Obstacle {
            id: 1,
            pos: crate::arena_center(),
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            kind: ObstacleKind::Rock,
        });
        let id = session.next_enemy_id();
        let mut boss = build_enemy(id, EnemyKind::Normal, 5, Difficulty::Normal, true);
        boss.last_summon_ms = Some(0);
        session.enemies.push(boss);
        session.now_ms = 8000;

        let mut events = Vec::new();
        enemy_actions(&mut session, &mut events);
        assert_eq!(session.enemies.len(), 1);
        assert!(events.is_empty());
        assert!(is_position_blocked(session.enemies[0].pos, 80.0, &session.obstacles));
    }
}
