//! Room generation
//!
//! Builds the obstacle layout and the ordered enemy list for a room. Placement
//! uses rejection sampling with a fixed attempt budget; when the budget runs
//! out the room simply gets fewer obstacles (or an enemy keeps its last
//! sampled position). That degradation is expected, not an error.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::collision::{aabb_overlap, circle_rect_overlap};
use super::state::{Difficulty, Enemy, EnemyKind, Obstacle, ObstacleKind, ROOM_BACKGROUNDS, Room};
use crate::consts::*;

/// Every fifth room is a boss room
pub const BOSS_ROOM_INTERVAL: u32 = 5;
pub const MAX_OBSTACLES: u32 = 8;
const OBSTACLE_ATTEMPTS: u32 = 50;
const ENEMY_SPAWN_ATTEMPTS: u32 = 100;
/// Gap kept between generated obstacles
const OBSTACLE_MARGIN: f32 = 80.0;
/// Gap kept between a spawning enemy and any obstacle
const ENEMY_SPAWN_MARGIN: f32 = 20.0;
/// Enemy stat growth per room
const ROOM_SCALING_PER_ROOM: f32 = 0.25;

/// Stats shared by every archetype before multipliers
#[derive(Debug, Clone, Copy)]
struct BaseEnemyStats {
    health: f32,
    damage: f32,
    speed: f32,
    size: f32,
}

const REGULAR_BASE: BaseEnemyStats = BaseEnemyStats {
    health: 40.0,
    damage: 10.0,
    speed: 2.0,
    size: 40.0,
};

const BOSS_BASE: BaseEnemyStats = BaseEnemyStats {
    health: 250.0,
    damage: 25.0,
    speed: 1.5,
    size: 80.0,
};

/// Inputs for generating one room
#[derive(Debug, Clone, Copy)]
pub struct RoomRequest {
    /// 1-based room number
    pub number: u32,
    pub difficulty: Difficulty,
    pub endless: bool,
    /// Co-op enemy count scaling (1.0 solo)
    pub enemy_multiplier: f32,
}

impl RoomRequest {
    pub fn solo(number: u32, difficulty: Difficulty) -> Self {
        Self {
            number,
            difficulty,
            endless: false,
            enemy_multiplier: 1.0,
        }
    }
}

pub fn is_boss_room(number: u32) -> bool {
    number % BOSS_ROOM_INTERVAL == 0
}

/// Health/damage growth factor for a room
pub fn room_scaling(number: u32) -> f32 {
    1.0 + number.saturating_sub(1) as f32 * ROOM_SCALING_PER_ROOM
}

/// Number of obstacles a room asks for (before placement failures)
pub fn obstacle_target(number: u32) -> u32 {
    let base = if is_boss_room(number) { 2 } else { 3 };
    (base + number / 4).min(MAX_OBSTACLES)
}

/// Number of regular enemies in a room (minions in a boss room)
pub fn enemy_count(request: &RoomRequest) -> u32 {
    let number = request.number;
    let base = if is_boss_room(number) {
        2 + number / 4
    } else {
        4 + number / 2
    };
    let endless_bonus = if request.endless { number / 2 } else { 0 };
    let scaled = (base + request.difficulty.enemy_count_bonus() + endless_bonus) as f32
        * request.enemy_multiplier.max(0.0);
    scaled.floor() as u32
}

/// Generate a room
pub fn generate_room<R: Rng + ?Sized>(request: &RoomRequest, rng: &mut R) -> Room {
    let request = RoomRequest {
        number: request.number.max(1),
        ..*request
    };
    let number = request.number;
    let is_boss = is_boss_room(number);

    let target = obstacle_target(number);
    let mut obstacles: Vec<Obstacle> = Vec::with_capacity(target as usize);
    for _ in 0..target {
        let id = obstacles.len() as u32 + 1;
        match place_obstacle(id, &obstacles, rng) {
            Some(obstacle) => obstacles.push(obstacle),
            None => log::debug!("Room {}: obstacle {} found no free spot", number, id),
        }
    }

    let mut enemies = Vec::new();
    let mut next_id = 1;
    if is_boss {
        enemies.push(create_enemy(next_id, number, request.difficulty, &obstacles, true, None, rng));
        next_id += 1;
    }
    for _ in 0..enemy_count(&request) {
        enemies.push(create_enemy(next_id, number, request.difficulty, &obstacles, false, None, rng));
        next_id += 1;
    }

    log::info!(
        "Room {} generated: {} obstacles (wanted {}), {} enemies{}",
        number,
        obstacles.len(),
        target,
        enemies.len(),
        if is_boss { ", boss room" } else { "" }
    );

    Room {
        number,
        enemies,
        obstacles,
        is_boss,
        background: ROOM_BACKGROUNDS[number as usize % ROOM_BACKGROUNDS.len()],
    }
}

/// Is a rectangle (centre + extents) a legal placement?
///
/// It must stay clear of the spawn-safe centre zone, keep `EDGE_MARGIN` from
/// the arena edges, and keep `margin` from every existing obstacle.
fn placement_is_valid(center: Vec2, size: Vec2, obstacles: &[Obstacle], margin: f32) -> bool {
    if circle_rect_overlap(crate::arena_center(), SPAWN_SAFE_RADIUS, center, size.x, size.y) {
        return false;
    }

    let half = size / 2.0;
    if center.x - half.x < EDGE_MARGIN || center.x + half.x > ARENA_WIDTH - EDGE_MARGIN {
        return false;
    }
    if center.y - half.y < EDGE_MARGIN || center.y + half.y > ARENA_HEIGHT - EDGE_MARGIN {
        return false;
    }

    let padded = size + Vec2::splat(margin * 2.0);
    !obstacles
        .iter()
        .any(|o| aabb_overlap(center, padded, o.pos, Vec2::new(o.width, o.height)))
}

fn place_obstacle<R: Rng + ?Sized>(id: u32, existing: &[Obstacle], rng: &mut R) -> Option<Obstacle> {
    let kind = *ObstacleKind::ALL.choose(rng)?;
    let width = rng.random_range(50.0..90.0);
    let height = rng.random_range(50.0..90.0);
    let size = Vec2::new(width, height);

    for _ in 0..OBSTACLE_ATTEMPTS {
        let center = Vec2::new(
            rng.random_range(width / 2.0..ARENA_WIDTH - width / 2.0),
            rng.random_range(height / 2.0..ARENA_HEIGHT - height / 2.0),
        );
        if placement_is_valid(center, size, existing, OBSTACLE_MARGIN) {
            return Some(Obstacle {
                id,
                pos: center,
                width,
                height,
                kind,
            });
        }
    }
    None
}

/// Pick a spawn point for an enemy of diameter `size`
///
/// Falls back to the last sampled candidate if no legal spot turns up.
fn enemy_spawn_position<R: Rng + ?Sized>(size: f32, obstacles: &[Obstacle], rng: &mut R) -> Vec2 {
    let mut candidate = crate::arena_center();
    for _ in 0..ENEMY_SPAWN_ATTEMPTS {
        candidate = Vec2::new(
            rng.random_range(size / 2.0..ARENA_WIDTH - size / 2.0),
            rng.random_range(size / 2.0..ARENA_HEIGHT - size / 2.0),
        );
        if placement_is_valid(candidate, Vec2::splat(size), obstacles, ENEMY_SPAWN_MARGIN) {
            return candidate;
        }
    }
    log::debug!("Enemy spawn fell back to unchecked position {:?}", candidate);
    candidate
}

/// Build a scaled enemy of `kind` (random when `None`) for a room
pub fn create_enemy<R: Rng + ?Sized>(
    id: u32,
    room_number: u32,
    difficulty: Difficulty,
    obstacles: &[Obstacle],
    is_boss: bool,
    kind: Option<EnemyKind>,
    rng: &mut R,
) -> Enemy {
    let kind = match (kind, is_boss) {
        (Some(kind), _) => kind,
        (None, true) => EnemyKind::Normal,
        (None, false) => EnemyKind::ROLL_TABLE[rng.random_range(0..EnemyKind::ROLL_TABLE.len())],
    };
    let mut enemy = build_enemy(id, kind, room_number, difficulty, is_boss);
    enemy.pos = enemy_spawn_position(enemy.size, obstacles, rng);
    enemy
}

/// Build an enemy's stats (position left at the arena centre)
pub fn build_enemy(
    id: u32,
    kind: EnemyKind,
    room_number: u32,
    difficulty: Difficulty,
    is_boss: bool,
) -> Enemy {
    let base = if is_boss { BOSS_BASE } else { REGULAR_BASE };
    let mult = kind.multipliers();
    let scaling = difficulty.enemy_scaling();
    let room = room_scaling(room_number);

    let health = base.health * mult.health * room * scaling.health;
    Enemy {
        id,
        kind,
        pos: crate::arena_center(),
        health,
        max_health: health,
        damage: base.damage * mult.damage * room * scaling.damage,
        speed: base.speed * mult.speed * scaling.speed,
        size: base.size * mult.size,
        color: kind.color(),
        is_boss,
        name: is_boss.then(|| format!("Boss of Room {}", room_number)),
        traits: kind.traits(),
        last_shot_ms: None,
        last_throw_ms: None,
        last_summon_ms: None,
        last_hit_ms: None,
        last_hit_by: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::is_position_blocked;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_boss_rooms() {
        assert!(!is_boss_room(1));
        assert!(is_boss_room(5));
        assert!(is_boss_room(10));
        assert!(!is_boss_room(14));
    }

    #[test]
    fn test_obstacle_target_capped() {
        assert_eq!(obstacle_target(1), 3);
        assert_eq!(obstacle_target(5), 3);
        assert_eq!(obstacle_target(8), 5);
        assert_eq!(obstacle_target(40), MAX_OBSTACLES);
    }

    #[test]
    fn test_enemy_count_scaling() {
        let solo = RoomRequest::solo(1, Difficulty::Normal);
        assert_eq!(enemy_count(&solo), 6);
        let easy = RoomRequest::solo(1, Difficulty::Easy);
        assert_eq!(enemy_count(&easy), 4);
        let coop = RoomRequest {
            enemy_multiplier: 2.5,
            ..solo
        };
        assert_eq!(enemy_count(&coop), 15);
        let endless = RoomRequest {
            number: 16,
            endless: true,
            ..solo
        };
        // 4 + 8 + 2 + 8
        assert_eq!(enemy_count(&endless), 22);
    }

    #[test]
    fn test_boss_room_five_normal_solo() {
        let mut rng = Pcg32::seed_from_u64(5);
        let room = generate_room(&RoomRequest::solo(5, Difficulty::Normal), &mut rng);
        assert!(room.is_boss);
        let bosses: Vec<_> = room.enemies.iter().filter(|e| e.is_boss).collect();
        assert_eq!(bosses.len(), 1);
        // 2 + 5/4 + 2 minions
        assert_eq!(room.enemies.len(), 1 + 5);
        assert!(room.enemies[0].is_boss);

        // Background differs only cosmetically from a regular room
        let regular = generate_room(&RoomRequest::solo(4, Difficulty::Normal), &mut rng);
        assert_ne!(room.background, regular.background);
    }

    #[test]
    fn test_room_zero_generates_as_room_one() {
        let mut rng = Pcg32::seed_from_u64(8);
        let room = generate_room(&RoomRequest::solo(0, Difficulty::Normal), &mut rng);
        assert_eq!(room.number, 1);
        assert!(!room.is_boss);
        assert!(room.enemies.iter().all(|e| !e.is_boss));
        assert_eq!(
            room.enemies.len() as u32,
            enemy_count(&RoomRequest::solo(1, Difficulty::Normal))
        );
    }

    #[test]
    fn test_room_scaling_and_difficulty() {
        let normal = build_enemy(1, EnemyKind::Normal, 1, Difficulty::Normal, false);
        assert_eq!(normal.health, 40.0);
        assert_eq!(normal.damage, 10.0);

        let later = build_enemy(1, EnemyKind::Normal, 5, Difficulty::Normal, false);
        assert_eq!(later.health, 80.0);
        // Speed does not scale with rooms
        assert_eq!(later.speed, 2.0);

        let hard = build_enemy(1, EnemyKind::Normal, 1, Difficulty::Hard, false);
        assert!((hard.health - 68.0).abs() < 1e-4);
        assert!((hard.speed - 2.6).abs() < 1e-4);

        let brute = build_enemy(1, EnemyKind::Brute, 1, Difficulty::Normal, false);
        assert_eq!(brute.health, 100.0);
        assert!((brute.speed - 0.8).abs() < 1e-6);
        assert_eq!(brute.size, 52.0);

        let boss = build_enemy(1, EnemyKind::Normal, 5, Difficulty::Normal, true);
        assert_eq!(boss.health, 500.0);
        assert_eq!(boss.size, 80.0);
        assert!(boss.name.is_some());
    }

    #[test]
    fn test_obstacles_respect_placement_rules() {
        let mut rng = Pcg32::seed_from_u64(42);
        for number in 1..=20 {
            let room = generate_room(&RoomRequest::solo(number, Difficulty::Hard), &mut rng);
            assert!(room.obstacles.len() as u32 <= obstacle_target(number));
            for (i, o) in room.obstacles.iter().enumerate() {
                assert!(o.pos.x - o.width / 2.0 >= EDGE_MARGIN);
                assert!(o.pos.x + o.width / 2.0 <= ARENA_WIDTH - EDGE_MARGIN);
                assert!(!circle_rect_overlap(
                    crate::arena_center(),
                    SPAWN_SAFE_RADIUS,
                    o.pos,
                    o.width,
                    o.height
                ));
                for other in &room.obstacles[i + 1..] {
                    assert!(!aabb_overlap(
                        o.pos,
                        Vec2::new(o.width, o.height),
                        other.pos,
                        Vec2::new(other.width, other.height)
                    ));
                }
            }
        }
    }

    #[test]
    fn test_enemies_mostly_spawn_clear_of_obstacles() {
        let mut rng = Pcg32::seed_from_u64(7);
        let room = generate_room(&RoomRequest::solo(12, Difficulty::Milk), &mut rng);
        let clear = room
            .enemies
            .iter()
            .filter(|e| !is_position_blocked(e.pos, e.size, &room.obstacles))
            .count();
        // Fallback positions are allowed but should be rare
        assert!(clear * 10 >= room.enemies.len() * 9);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let request = RoomRequest::solo(7, Difficulty::Normal);
        let a = generate_room(&request, &mut Pcg32::seed_from_u64(99));
        let b = generate_room(&request, &mut Pcg32::seed_from_u64(99));
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.kind, eb.kind);
            assert_eq!(ea.pos, eb.pos);
        }
    }
}
