//! Collision detection
//!
//! Two regimes:
//! - Blocking: axis-aligned box overlap against walls. A blocked move is
//!   rejected (player, projectile) or reflected (obstacle), never slid.
//! - Proximity: center-to-center distance below a fixed threshold, used for
//!   every pickup, damage and hit check.

use glam::Vec3;

use super::state::Wall;
use super::store::{EntityId, Pool};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Strict overlap: boxes that only touch do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }
}

impl Wall {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.position, self.half_extents)
    }
}

/// First wall (in insertion order) overlapping the box
pub fn blocking_wall(candidate: &Aabb, walls: &Pool<Wall>) -> Option<EntityId> {
    walls
        .iter()
        .find(|(_, wall)| wall.aabb().overlaps(candidate))
        .map(|(id, _)| id)
}

/// Whether a box at `center` would intersect any wall
#[inline]
pub fn blocked(center: Vec3, half_extents: Vec3, walls: &Pool<Wall>) -> bool {
    blocking_wall(&Aabb::from_center(center, half_extents), walls).is_some()
}

/// Proximity test between entity centers
#[inline]
pub fn within(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.distance_squared(b) < threshold * threshold
}

/// Outcome of an obstacle's wall check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleMove {
    /// Nothing in the way; commit this position
    Clear(Vec3),
    /// A wall is in the way; keep position and adopt this velocity
    Reflected(Vec3),
}

/// Flip the sign of the velocity's dominant horizontal axis
pub fn reflect_dominant_axis(velocity: Vec3) -> Vec3 {
    if velocity.x.abs() >= velocity.z.abs() {
        Vec3::new(-velocity.x, velocity.y, velocity.z)
    } else {
        Vec3::new(velocity.x, velocity.y, -velocity.z)
    }
}

/// Check an obstacle's candidate move against the walls
pub fn check_obstacle_move(
    position: Vec3,
    half_extents: Vec3,
    velocity: Vec3,
    displacement: Vec3,
    walls: &Pool<Wall>,
) -> ObstacleMove {
    let candidate = position + displacement;
    if blocked(candidate, half_extents, walls) {
        ObstacleMove::Reflected(reflect_dominant_axis(velocity))
    } else {
        ObstacleMove::Clear(candidate)
    }
}

/// First entity (in insertion order) within `threshold` of `point`
pub fn first_within<T>(
    point: Vec3,
    threshold: f32,
    pool: &Pool<T>,
    position: impl Fn(&T) -> Vec3,
) -> Option<EntityId> {
    pool.iter()
        .find(|(_, item)| within(point, position(item), threshold))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::store::{EntityState, EntityStore};
    use crate::sim::state::Player;

    fn store_with_wall(position: Vec3, rotated: bool) -> EntityStore {
        let mut store = EntityStore::new(Player::new(Vec3::ZERO));
        store.spawn(EntityState::Wall(Wall::new(position, rotated, 2.0, 1.5, 0.25)));
        store
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vec3::ZERO, Vec3::splat(0.5));
        let b = Aabb::from_center(Vec3::new(0.9, 0.0, 0.0), Vec3::splat(0.5));
        let c = Aabb::from_center(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(a.overlaps(&b));
        // Touching faces do not count
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_blocked_respects_height() {
        let store = store_with_wall(Vec3::new(3.0, 0.0, 0.0), true);
        let half = Vec3::splat(0.5);
        assert!(blocked(Vec3::new(2.5, -1.0, 0.0), half, &store.walls));
        // Jumped high enough to clear the wall top (1.5)
        assert!(!blocked(Vec3::new(2.5, 2.1, 0.0), half, &store.walls));
        assert!(!blocked(Vec3::new(0.0, -1.0, 0.0), half, &store.walls));
    }

    #[test]
    fn test_reflect_dominant_axis() {
        let v = reflect_dominant_axis(Vec3::new(0.03, 0.0, -0.01));
        assert_eq!(v, Vec3::new(-0.03, 0.0, -0.01));
        let v = reflect_dominant_axis(Vec3::new(0.01, 0.0, -0.03));
        assert_eq!(v, Vec3::new(0.01, 0.0, 0.03));
    }

    #[test]
    fn test_obstacle_move_reflects_on_wall() {
        let store = store_with_wall(Vec3::new(2.0, 0.0, 0.0), true);
        let velocity = Vec3::new(0.5, 0.0, 0.1);
        let result = check_obstacle_move(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.5),
            velocity,
            velocity,
            &store.walls,
        );
        assert_eq!(result, ObstacleMove::Reflected(Vec3::new(-0.5, 0.0, 0.1)));

        let result = check_obstacle_move(
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(0.5, 1.0, 0.5),
            velocity,
            velocity,
            &store.walls,
        );
        assert_eq!(result, ObstacleMove::Clear(Vec3::new(-2.5, 0.0, 0.1)));
    }

    #[test]
    fn test_within_is_strict() {
        assert!(within(Vec3::ZERO, Vec3::new(0.99, 0.0, 0.0), 1.0));
        assert!(!within(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_first_within_uses_insertion_order() {
        let mut store = EntityStore::new(Player::new(Vec3::ZERO));
        let far = store.spawn(EntityState::Wall(Wall::new(Vec3::new(0.5, 0.0, 0.0), false, 1.0, 1.0, 1.0)));
        store.spawn(EntityState::Wall(Wall::new(Vec3::new(0.1, 0.0, 0.0), false, 1.0, 1.0, 1.0)));
        let hit = first_within(Vec3::ZERO, 1.0, &store.walls, |w| w.position);
        assert_eq!(hit, Some(far.id));
    }
}
