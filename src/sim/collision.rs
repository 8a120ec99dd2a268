//! Collision detection for circles against axis-aligned obstacles and each other
//!
//! `resolve_legal_position` is the single source of truth for obstacle
//! collision: every mover (player, enemy, knockback) commits its position
//! through it, so the same obstacle set always yields the same result.

use glam::Vec2;

use super::state::Obstacle;

/// Circle vs axis-aligned rectangle overlap
///
/// The rectangle is given by its centre and full width/height. The circle
/// centre is clamped to the rectangle bounds and the squared distance to that
/// closest point is compared against the radius.
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect_center: Vec2, width: f32, height: f32) -> bool {
    let half = Vec2::new(width / 2.0, height / 2.0);
    let closest = center.clamp(rect_center - half, rect_center + half);
    center.distance_squared(closest) < radius * radius
}

/// Circle vs circle overlap (sizes are diameters)
#[inline]
pub fn circles_overlap(a: Vec2, size_a: f32, b: Vec2, size_b: f32) -> bool {
    let reach = (size_a + size_b) / 2.0;
    a.distance_squared(b) < reach * reach
}

/// Axis-aligned box overlap (sizes are full extents)
#[inline]
pub fn aabb_overlap(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> bool {
    let d = (a - b).abs();
    let reach = (a_size + b_size) / 2.0;
    d.x < reach.x && d.y < reach.y
}

/// Does a circle of diameter `size` at `pos` overlap any obstacle?
pub fn is_position_blocked(pos: Vec2, size: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .any(|o| circle_rect_overlap(pos, size / 2.0, o.pos, o.width, o.height))
}

/// Find the nearest legal position for a mover going from `from` to `to`
///
/// Tries the full move, then slides along each axis (target x with current y,
/// then current x with target y), and otherwise stays put. Pass-through movers
/// always get their target.
pub fn resolve_legal_position(
    from: Vec2,
    to: Vec2,
    size: f32,
    passes_obstacles: bool,
    obstacles: &[Obstacle],
) -> Vec2 {
    if passes_obstacles || !is_position_blocked(to, size, obstacles) {
        return to;
    }

    let slide_x = Vec2::new(to.x, from.y);
    if !is_position_blocked(slide_x, size, obstacles) {
        return slide_x;
    }

    let slide_y = Vec2::new(from.x, to.y);
    if !is_position_blocked(slide_y, size, obstacles) {
        return slide_y;
    }

    from
}

/// Is the point outside the arena rectangle?
#[inline]
pub fn out_of_arena(pos: Vec2) -> bool {
    use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    pos.x < 0.0 || pos.x > ARENA_WIDTH || pos.y < 0.0 || pos.y > ARENA_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;
    use proptest::prelude::*;

    fn crate_at(x: f32, y: f32, w: f32, h: f32) -> Obstacle {
        Obstacle {
            id: 1,
            pos: Vec2::new(x, y),
            width: w,
            height: h,
            kind: ObstacleKind::Crate,
        }
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Vec2::new(100.0, 100.0);
        // Centre inside
        assert!(circle_rect_overlap(Vec2::new(100.0, 100.0), 5.0, rect, 40.0, 40.0));
        // Touching the right edge from outside
        assert!(circle_rect_overlap(Vec2::new(125.0, 100.0), 6.0, rect, 40.0, 40.0));
        // Clear miss
        assert!(!circle_rect_overlap(Vec2::new(140.0, 100.0), 10.0, rect, 40.0, 40.0));
        // Near a corner: distance to corner is sqrt(50) > 7
        assert!(!circle_rect_overlap(Vec2::new(125.0, 125.0), 7.0, rect, 40.0, 40.0));
        assert!(circle_rect_overlap(Vec2::new(125.0, 125.0), 7.1, rect, 40.0, 40.0));
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 40.0, Vec2::new(39.0, 0.0), 40.0));
        assert!(!circles_overlap(Vec2::ZERO, 40.0, Vec2::new(40.0, 0.0), 40.0));
    }

    #[test]
    fn test_resolve_unblocked_move() {
        let obstacles = vec![crate_at(400.0, 100.0, 60.0, 60.0)];
        let to = Vec2::new(205.0, 300.0);
        assert_eq!(
            resolve_legal_position(Vec2::new(200.0, 300.0), to, 40.0, false, &obstacles),
            to
        );
    }

    #[test]
    fn test_resolve_wall_slide() {
        // Wall directly to the right; moving diagonally up-right slides vertically
        let obstacles = vec![crate_at(260.0, 300.0, 40.0, 400.0)];
        let from = Vec2::new(215.0, 300.0);
        let to = Vec2::new(221.0, 294.0);
        let resolved = resolve_legal_position(from, to, 40.0, false, &obstacles);
        assert_eq!(resolved, Vec2::new(215.0, 294.0));
    }

    #[test]
    fn test_resolve_stays_put_in_corner() {
        let obstacles = vec![
            crate_at(260.0, 300.0, 40.0, 400.0),
            crate_at(200.0, 240.0, 200.0, 40.0),
        ];
        let from = Vec2::new(215.0, 285.0);
        let to = Vec2::new(221.0, 279.0);
        assert_eq!(resolve_legal_position(from, to, 40.0, false, &obstacles), from);
    }

    #[test]
    fn test_pass_through_ignores_obstacles() {
        let obstacles = vec![crate_at(100.0, 100.0, 60.0, 60.0)];
        let to = Vec2::new(100.0, 100.0);
        assert_eq!(
            resolve_legal_position(Vec2::new(50.0, 50.0), to, 40.0, true, &obstacles),
            to
        );
    }

    #[test]
    fn test_out_of_arena() {
        assert!(!out_of_arena(Vec2::new(0.0, 0.0)));
        assert!(out_of_arena(Vec2::new(-0.1, 10.0)));
        assert!(out_of_arena(Vec2::new(10.0, 600.1)));
    }

    proptest! {
        #[test]
        fn prop_resolve_is_idempotent_at_rest(
            fx in 0.0f32..800.0, fy in 0.0f32..600.0,
            dx in -10.0f32..10.0, dy in -10.0f32..10.0,
        ) {
            let obstacles = vec![
                crate_at(200.0, 150.0, 80.0, 60.0),
                crate_at(600.0, 450.0, 60.0, 90.0),
            ];
            let from = Vec2::new(fx, fy);
            let resolved = resolve_legal_position(from, from + Vec2::new(dx, dy), 40.0, false, &obstacles);
            // Zero input from a resolved position changes nothing
            let again = resolve_legal_position(resolved, resolved, 40.0, false, &obstacles);
            prop_assert_eq!(again, resolved);
        }

        #[test]
        fn prop_resolve_never_enters_obstacle_from_legal_start(
            fx in 0.0f32..800.0, fy in 0.0f32..600.0,
            dx in -10.0f32..10.0, dy in -10.0f32..10.0,
        ) {
            let obstacles = vec![crate_at(400.0, 300.0, 100.0, 100.0)];
            let from = Vec2::new(fx, fy);
            prop_assume!(!is_position_blocked(from, 40.0, &obstacles));
            let resolved = resolve_legal_position(from, from + Vec2::new(dx, dy), 40.0, false, &obstacles);
            prop_assert!(!is_position_blocked(resolved, 40.0, &obstacles));
        }
    }
}
