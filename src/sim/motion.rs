//! Motion integration
//!
//! All speeds are per tick, so a tick moves entities by a fixed amount
//! regardless of the frame delta. The delta only drives the clock.

use glam::{Quat, Vec2, Vec3};

use super::collision::{self, ObstacleMove};
use super::state::{Obstacle, Player, Wall};
use super::store::Pool;
use crate::tuning::Tuning;

/// Apply a jump request. Only a grounded player can jump.
pub fn try_jump(player: &mut Player, tuning: &Tuning) -> bool {
    if !player.grounded {
        return false;
    }
    player.velocity_y = tuning.jump_velocity;
    player.grounded = false;
    true
}

/// Gravity and ground contact
pub fn integrate_vertical(player: &mut Player, tuning: &Tuning) {
    player.velocity_y -= tuning.gravity;
    let next_y = player.position.y + player.velocity_y;
    if next_y <= tuning.ground_level {
        player.position.y = tuning.ground_level;
        player.velocity_y = 0.0;
        player.grounded = true;
    } else {
        player.position.y = next_y;
        player.grounded = false;
    }
}

/// Camera-relative horizontal displacement for a movement intent
///
/// `intent.x` is strafe (right positive) and `intent.y` is forward.
pub fn horizontal_displacement(intent: Vec2, yaw: f32, move_speed: f32) -> Vec3 {
    // Forward is -Z in camera-local space
    let local = Vec3::new(intent.x, 0.0, -intent.y).normalize_or_zero();
    if local == Vec3::ZERO {
        return Vec3::ZERO;
    }
    Quat::from_rotation_y(yaw) * local * move_speed
}

/// Clamp a horizontal position to the square arena
pub fn clamp_to_arena(position: Vec3, half_extent: f32) -> Vec3 {
    Vec3::new(
        position.x.clamp(-half_extent, half_extent),
        position.y,
        position.z.clamp(-half_extent, half_extent),
    )
}

/// Move the player horizontally. A move into a wall is rejected in full.
///
/// Returns whether the move was committed.
pub fn move_player(player: &mut Player, displacement: Vec3, walls: &Pool<Wall>, tuning: &Tuning) -> bool {
    if displacement == Vec3::ZERO {
        return false;
    }
    player.facing = displacement.x.atan2(displacement.z);

    let candidate = player.position + displacement;
    let half = Vec3::splat(tuning.player_half_extent);
    let committed = !collision::blocked(candidate, half, walls);
    if committed {
        player.position = candidate;
    }
    player.position = clamp_to_arena(player.position, tuning.arena_half_extent);
    committed
}

/// Obstacle speed multiplier: ramps with total coins collected
pub fn speed_up_factor(coins_collected: u32, tuning: &Tuning) -> f32 {
    1.0 + coins_collected as f32 * tuning.speedup_per_coin
}

/// Advance one obstacle by a tick
///
/// A wall in the way reflects the dominant velocity axis and leaves the
/// obstacle in place. Arena bounds reflect the offending axis.
pub fn step_obstacle(obstacle: &mut Obstacle, speed_factor: f32, walls: &Pool<Wall>, half_extent: f32) {
    let displacement = obstacle.velocity * speed_factor;
    match collision::check_obstacle_move(
        obstacle.position,
        obstacle.half_extents,
        obstacle.velocity,
        displacement,
        walls,
    ) {
        ObstacleMove::Reflected(velocity) => {
            obstacle.velocity = velocity;
        }
        ObstacleMove::Clear(position) => {
            obstacle.position = position;
            if obstacle.position.x.abs() > half_extent {
                obstacle.velocity.x = -obstacle.velocity.x;
            }
            if obstacle.position.z.abs() > half_extent {
                obstacle.velocity.z = -obstacle.velocity.z;
            }
            obstacle.position = clamp_to_arena(obstacle.position, half_extent);
        }
    }
}
