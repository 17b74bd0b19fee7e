//! Arena Rush - simulation core for an arena survival game
//!
//! Core modules:
//! - `sim`: Simulation (entity store, motion, collisions, combat, levels)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio and raw input handling live outside this crate. Hosts
//! feed [`sim::TickInput`] intents into [`sim::step`] and consume the
//! returned [`sim::Snapshot`] and [`sim::GameEvent`] list.

pub mod sim;
pub mod tuning;

pub use tuning::{DamageModel, Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Nominal simulation timestep (one display refresh at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena is a square of +/- this extent on X and Z
    pub const ARENA_HALF_EXTENT: f32 = 10.0;
    /// Spawn area for coins/obstacles/walls (+/- on X and Z)
    pub const SPAWN_HALF_EXTENT: f32 = 8.0;
    /// Obstacles never spawn closer than this to the arena center
    pub const OBSTACLE_SPAWN_CLEARANCE: f32 = 3.0;
    /// Placement attempts for a single obstacle or wall
    pub const PLACEMENT_ATTEMPTS: u32 = 50;

    /// Player resting height
    pub const GROUND_LEVEL: f32 = -1.0;
    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.005;
    /// Vertical velocity applied by a jump
    pub const JUMP_VELOCITY: f32 = 0.2;
    /// Horizontal displacement per tick at full intent
    pub const MOVE_SPEED: f32 = 0.1;
    /// Player bounding half extent (cube)
    pub const PLAYER_HALF_EXTENT: f32 = 0.5;

    /// Player health
    pub const MAX_HEALTH: i32 = 10;
    /// Invincibility window granted by a special coin (ms)
    pub const INVINCIBILITY_MS: f64 = 5000.0;
    /// Minimum time between two contact-damage events (ms)
    pub const HIT_COOLDOWN_MS: f64 = 1000.0;

    /// Proximity thresholds (center-to-center distance)
    pub const COIN_PICKUP_RADIUS: f32 = 1.0;
    pub const OBSTACLE_CONTACT_RADIUS: f32 = 1.2;
    pub const PROJECTILE_OBSTACLE_RADIUS: f32 = 1.0;
    pub const PROJECTILE_PLAYER_RADIUS: f32 = 0.7;

    /// Score rewards
    pub const COIN_SCORE: u64 = 100;
    pub const OBSTACLE_SCORE: u64 = 50;

    /// Coins
    pub const INITIAL_COINS: u32 = 10;
    pub const SPECIAL_COIN_CHANCE: f64 = 0.2;
    /// Every Nth cumulative pickup spawns an extra obstacle
    pub const COINS_PER_EXTRA_OBSTACLE: u32 = 5;
    /// Coin hover height above ground
    pub const COIN_HOVER: f32 = 0.5;
    /// Obstacle speed-up per collected coin (fraction)
    pub const SPEEDUP_PER_COIN: f32 = 0.05;

    /// Level scaling
    pub const BASE_OBSTACLES: u32 = 10;
    pub const BASE_OBSTACLE_SPEED: f32 = 0.05;
    pub const SPEED_INCREASE_PER_LEVEL: f32 = 0.02;
    pub const BASE_WALLS: u32 = 5;

    /// Walls
    pub const WALL_HALF_LENGTH: f32 = 2.0;
    pub const WALL_HALF_HEIGHT: f32 = 1.5;
    pub const WALL_HALF_THICKNESS: f32 = 0.25;
    /// Random walls keep at least this distance from the arena center
    pub const WALL_CENTER_CLEARANCE: f32 = 4.0;
    /// Random walls keep at least this distance from each other
    pub const WALL_SEPARATION: f32 = 3.0;
    /// Distance of the four fixed cover walls from the spawn point
    pub const COVER_WALL_DISTANCE: f32 = 5.0;

    /// Projectiles
    pub const PROJECTILE_HALF_EXTENT: f32 = 0.2;
    pub const PLAYER_PROJECTILE_SPEED: f32 = 0.5;
    pub const PLAYER_PROJECTILE_LIFETIME: u32 = 60;
    pub const PLAYER_PROJECTILE_LIFT: f32 = 0.5;
    pub const OBSTACLE_PROJECTILE_SPEED: f32 = 0.2;
    pub const OBSTACLE_PROJECTILE_LIFETIME: u32 = 120;
    /// Per-obstacle, per-tick fire probability at level 1
    pub const OBSTACLE_FIRE_BASE_RATE: f64 = 0.001;

    /// Camera pitch limits and start value (radians)
    pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.1;
    pub const MIN_PITCH: f32 = -std::f32::consts::FRAC_PI_2 + 0.1;
    pub const INITIAL_PITCH: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    // rem_euclid can round up to TAU for tiny negative remainders
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Replace NaN/infinite values with zero
#[inline]
pub fn sanitize_f32(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Convert HSL (all components in [0, 1]) to a packed 0xRRGGBB color
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> u32 {
    let h = h.rem_euclid(1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h * 6.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let channel = |v: f32| ((v + m).clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        // 3π sits on the seam; either side is within rounding of ±π
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!(normalize_angle(3.0 * PI) < PI);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_normalize_huge_angle() {
        for angle in [1.0e10, -1.0e10, f32::MAX, f32::MIN, 1.0e-30] {
            let a = normalize_angle(angle);
            assert!((-PI..PI).contains(&a), "{angle} -> {a}");
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_f32(f32::INFINITY), 0.0);
        assert_eq!(sanitize_f32(-2.5), -2.5);
    }

    #[test]
    fn test_hsl_to_rgb() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), 0xff0000);
        assert_eq!(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), 0x00ff00);
        assert_eq!(hsl_to_rgb(0.5, 0.0, 1.0), 0xffffff);
    }
}
