//! Data-driven game balance
//!
//! [`Tuning`] mirrors every constant in [`crate::consts`]. A tuning file is
//! JSON; missing keys fall back to the compile-time defaults, so a file can
//! override just the values you care about.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How obstacle contact hurts the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageModel {
    /// Contact costs one health point, gated by the hit cooldown
    #[default]
    Health,
    /// Any unshielded contact ends the run immediately
    InstantDeath,
}

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Runtime-tunable gameplay parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Arena
    pub arena_half_extent: f32,
    pub spawn_half_extent: f32,
    pub obstacle_spawn_clearance: f32,
    pub placement_attempts: u32,

    // Player motion
    pub ground_level: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_speed: f32,
    pub player_half_extent: f32,

    // Health / damage
    pub max_health: i32,
    pub invincibility_ms: f64,
    pub hit_cooldown_ms: f64,
    pub damage_model: DamageModel,

    // Proximity thresholds
    pub coin_pickup_radius: f32,
    pub obstacle_contact_radius: f32,
    pub projectile_obstacle_radius: f32,
    pub projectile_player_radius: f32,

    // Scoring and coins
    pub coin_score: u64,
    pub obstacle_score: u64,
    pub initial_coins: u32,
    pub special_coin_chance: f64,
    pub coins_per_extra_obstacle: u32,
    pub coin_hover: f32,
    pub speedup_per_coin: f32,

    // Level scaling
    pub base_obstacles: u32,
    pub base_obstacle_speed: f32,
    pub speed_increase_per_level: f32,
    pub base_walls: u32,

    // Walls
    pub wall_half_length: f32,
    pub wall_half_height: f32,
    pub wall_half_thickness: f32,
    pub wall_center_clearance: f32,
    pub wall_separation: f32,
    pub cover_wall_distance: f32,

    // Projectiles
    pub projectile_half_extent: f32,
    pub player_projectile_speed: f32,
    pub player_projectile_lifetime: u32,
    pub player_projectile_lift: f32,
    pub obstacle_projectile_speed: f32,
    pub obstacle_projectile_lifetime: u32,
    pub obstacle_fire_base_rate: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_half_extent: ARENA_HALF_EXTENT,
            spawn_half_extent: SPAWN_HALF_EXTENT,
            obstacle_spawn_clearance: OBSTACLE_SPAWN_CLEARANCE,
            placement_attempts: PLACEMENT_ATTEMPTS,

            ground_level: GROUND_LEVEL,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            move_speed: MOVE_SPEED,
            player_half_extent: PLAYER_HALF_EXTENT,

            max_health: MAX_HEALTH,
            invincibility_ms: INVINCIBILITY_MS,
            hit_cooldown_ms: HIT_COOLDOWN_MS,
            damage_model: DamageModel::Health,

            coin_pickup_radius: COIN_PICKUP_RADIUS,
            obstacle_contact_radius: OBSTACLE_CONTACT_RADIUS,
            projectile_obstacle_radius: PROJECTILE_OBSTACLE_RADIUS,
            projectile_player_radius: PROJECTILE_PLAYER_RADIUS,

            coin_score: COIN_SCORE,
            obstacle_score: OBSTACLE_SCORE,
            initial_coins: INITIAL_COINS,
            special_coin_chance: SPECIAL_COIN_CHANCE,
            coins_per_extra_obstacle: COINS_PER_EXTRA_OBSTACLE,
            coin_hover: COIN_HOVER,
            speedup_per_coin: SPEEDUP_PER_COIN,

            base_obstacles: BASE_OBSTACLES,
            base_obstacle_speed: BASE_OBSTACLE_SPEED,
            speed_increase_per_level: SPEED_INCREASE_PER_LEVEL,
            base_walls: BASE_WALLS,

            wall_half_length: WALL_HALF_LENGTH,
            wall_half_height: WALL_HALF_HEIGHT,
            wall_half_thickness: WALL_HALF_THICKNESS,
            wall_center_clearance: WALL_CENTER_CLEARANCE,
            wall_separation: WALL_SEPARATION,
            cover_wall_distance: COVER_WALL_DISTANCE,

            projectile_half_extent: PROJECTILE_HALF_EXTENT,
            player_projectile_speed: PLAYER_PROJECTILE_SPEED,
            player_projectile_lifetime: PLAYER_PROJECTILE_LIFETIME,
            player_projectile_lift: PLAYER_PROJECTILE_LIFT,
            obstacle_projectile_speed: OBSTACLE_PROJECTILE_SPEED,
            obstacle_projectile_lifetime: OBSTACLE_PROJECTILE_LIFETIME,
            obstacle_fire_base_rate: OBSTACLE_FIRE_BASE_RATE,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a finite positive number",
                })
            }
        }
        fn probability(field: &'static str, value: f64) -> Result<(), TuningError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be within [0, 1]",
                })
            }
        }

        positive("arena_half_extent", self.arena_half_extent)?;
        positive("spawn_half_extent", self.spawn_half_extent)?;
        if self.spawn_half_extent > self.arena_half_extent {
            return Err(TuningError::Invalid {
                field: "spawn_half_extent",
                reason: "must not exceed arena_half_extent",
            });
        }
        positive("gravity", self.gravity)?;
        positive("move_speed", self.move_speed)?;
        positive("player_half_extent", self.player_half_extent)?;
        positive("projectile_half_extent", self.projectile_half_extent)?;
        positive("player_projectile_speed", self.player_projectile_speed)?;
        positive("obstacle_projectile_speed", self.obstacle_projectile_speed)?;
        probability("special_coin_chance", self.special_coin_chance)?;
        probability("obstacle_fire_base_rate", self.obstacle_fire_base_rate)?;

        if self.max_health <= 0 {
            return Err(TuningError::Invalid {
                field: "max_health",
                reason: "must be at least 1",
            });
        }
        if self.placement_attempts == 0 {
            return Err(TuningError::Invalid {
                field: "placement_attempts",
                reason: "must be at least 1",
            });
        }
        if self.coins_per_extra_obstacle == 0 {
            return Err(TuningError::Invalid {
                field: "coins_per_extra_obstacle",
                reason: "must be at least 1",
            });
        }
        if !(self.invincibility_ms >= 0.0 && self.hit_cooldown_ms >= 0.0) {
            return Err(TuningError::Invalid {
                field: "invincibility_ms",
                reason: "timers must be non-negative",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "max_health": 3, "damage_model": "instant_death" }"#)
            .expect("partial tuning should parse");
        assert_eq!(tuning.max_health, 3);
        assert_eq!(tuning.damage_model, DamageModel::InstantDeath);
        assert_eq!(tuning.gravity, GRAVITY);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json(r#"{ "gravity": -1.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "gravity", .. }));

        let err = Tuning::from_json(r#"{ "special_coin_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "special_coin_chance",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Tuning::load("/definitely/not/here.json"),
            Err(TuningError::Io(_))
        ));
    }
}
