//! Level progression
//!
//! NotStarted -> Playing -> (LevelAdvancing -> Playing)* -> GameOver
//!
//! Starting a level wipes every non-player entity and repopulates walls,
//! obstacles and coins from the level's [`LevelConfig`]. The player is kept
//! and moved back to the spawn point.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision;
use super::state::{Coin, GameEvent, GamePhase, GameState, Obstacle, ObstacleShape, Wall};
use super::store::{EntityState, Handle};
use crate::hsl_to_rgb;
use crate::tuning::Tuning;

const FLOOR_COLOR_ODD: u32 = 0x87ceeb;
const FLOOR_COLOR_EVEN: u32 = 0x800080;

/// Difficulty parameters for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub obstacle_count: u32,
    /// Maximum obstacle speed per tick
    pub obstacle_speed: f32,
    /// Random walls (the four cover walls come on top)
    pub wall_count: u32,
    /// Cosmetic 0xRRGGBB tint for obstacles
    pub obstacle_tint: u32,
    /// Cosmetic 0xRRGGBB floor/backdrop color
    pub floor_color: u32,
}

impl LevelConfig {
    pub fn for_level(level: u32, tuning: &Tuning) -> Self {
        let level = level.max(1);
        let speed_multiplier = 1.0 + (level - 1) as f32 * tuning.speed_increase_per_level;
        Self {
            level,
            obstacle_count: tuning.base_obstacles + level / 2,
            obstacle_speed: tuning.base_obstacle_speed * speed_multiplier,
            wall_count: tuning.base_walls + level / 2,
            obstacle_tint: hsl_to_rgb((level as f32 * 0.1).fract(), 0.7, 0.5),
            floor_color: if level % 2 == 0 {
                FLOOR_COLOR_EVEN
            } else {
                FLOOR_COLOR_ODD
            },
        }
    }
}

/// Player spawn point: arena origin at ground height
pub fn spawn_point(tuning: &Tuning) -> Vec3 {
    Vec3::new(0.0, tuning.ground_level, 0.0)
}

/// Height of a wall's center so it stands on the floor
fn wall_height(tuning: &Tuning) -> f32 {
    tuning.ground_level - tuning.player_half_extent + tuning.wall_half_height
}

fn random_xz(rng: &mut impl Rng, half: f32) -> (f32, f32) {
    (rng.random_range(-half..half), rng.random_range(-half..half))
}

/// Lay out the walls for a level
///
/// Four fixed cover walls surround the spawn point. Each random wall gets up
/// to `placement_attempts` tries; a candidate too close to the center or to
/// an already placed wall is rejected. A wall that never fits is skipped.
pub fn place_walls(rng: &mut impl Rng, count: u32, tuning: &Tuning) -> Vec<Wall> {
    let y = wall_height(tuning);
    let d = tuning.cover_wall_distance;
    let wall = |x: f32, z: f32, rotated: bool| {
        Wall::new(
            Vec3::new(x, y, z),
            rotated,
            tuning.wall_half_length,
            tuning.wall_half_height,
            tuning.wall_half_thickness,
        )
    };

    let mut walls = vec![
        wall(d, 0.0, true),
        wall(-d, 0.0, true),
        wall(0.0, d, false),
        wall(0.0, -d, false),
    ];

    for n in 0..count {
        let mut placed = false;
        for _ in 0..tuning.placement_attempts {
            let (x, z) = random_xz(rng, tuning.spawn_half_extent);
            let candidate = Vec3::new(x, y, z);
            if Vec3::new(x, 0.0, z).length() < tuning.wall_center_clearance {
                continue;
            }
            let crowded = walls
                .iter()
                .any(|w| w.position.distance(candidate) < tuning.wall_separation);
            if crowded {
                continue;
            }
            walls.push(wall(x, z, rng.random_bool(0.5)));
            placed = true;
            break;
        }
        if !placed {
            log::warn!("Could not place wall {} of {}", n + 1, count);
        }
    }
    walls
}

/// Spawn one obstacle away from the center and clear of walls
///
/// Falls back to the last wall-free candidate when no spot keeps the center
/// clearance. Returns `None` (and spawns nothing) if every candidate sits
/// inside a wall.
pub fn spawn_obstacle(state: &mut GameState) -> Option<Handle> {
    let tuning = &state.tuning;
    let speed = state.level_config.obstacle_speed;
    let shape = ObstacleShape::ALL[state.rng.random_range(0..ObstacleShape::ALL.len())];
    let half = shape.half_extents();

    let mut spot = None;
    for _ in 0..tuning.placement_attempts {
        let (x, z) = random_xz(&mut state.rng, tuning.spawn_half_extent);
        let center = Vec3::new(x, shape.rest_height(), z);
        if collision::blocked(center, half, &state.store.walls) {
            continue;
        }
        spot = Some((x, z));
        if (x * x + z * z).sqrt() >= tuning.obstacle_spawn_clearance {
            break;
        }
    }
    let Some((x, z)) = spot else {
        log::warn!("Could not place {:?} obstacle clear of walls", shape);
        return None;
    };

    let velocity = Vec3::new(
        (state.rng.random::<f32>() - 0.5) * speed,
        0.0,
        (state.rng.random::<f32>() - 0.5) * speed,
    );
    let obstacle = Obstacle::new(shape, x, z, velocity);
    log::debug!("Spawned {:?} obstacle at {:?}", shape, obstacle.position);
    Some(state.store.spawn(EntityState::Obstacle(obstacle)))
}

/// Spawn one coin somewhere the player can reach
pub fn spawn_coin(state: &mut GameState, is_special: bool) -> Handle {
    let tuning = &state.tuning;
    let y = tuning.ground_level + tuning.coin_hover;
    let reach = Vec3::splat(tuning.player_half_extent);

    let mut position = Vec3::new(0.0, y, 0.0);
    for _ in 0..tuning.placement_attempts {
        let (x, z) = random_xz(&mut state.rng, tuning.spawn_half_extent);
        position = Vec3::new(x, y, z);
        if !collision::blocked(position, reach, &state.store.walls) {
            break;
        }
    }
    state.store.spawn(EntityState::Coin(Coin {
        position,
        is_special,
    }))
}

/// Tear down the arena and build `level` from scratch
pub fn start_level(state: &mut GameState, level: u32) {
    let config = LevelConfig::for_level(level, &state.tuning);
    log::info!(
        "Starting level {}: {} obstacles, speed {:.3}, {} walls",
        config.level,
        config.obstacle_count,
        config.obstacle_speed,
        config.wall_count
    );

    state.stats.level = config.level;
    state.stats.obstacles_destroyed = 0;
    state.stats.health = state.stats.max_health;
    state.pending_advance = false;

    state.store.clear_level();
    let spawn = spawn_point(&state.tuning);
    state.store.player.respawn(spawn);

    for wall in place_walls(&mut state.rng, config.wall_count, &state.tuning) {
        state.store.spawn(EntityState::Wall(wall));
    }

    let obstacle_count = config.obstacle_count;
    state.level_config = config;
    let spawned = (0..obstacle_count).filter(|_| spawn_obstacle(state).is_some()).count();
    // The level is cleared by destroying what actually spawned
    state.stats.total_obstacles_this_level = spawned as u32;
    for _ in 0..state.tuning.initial_coins {
        let special = state.rng.random_bool(state.tuning.special_coin_chance);
        spawn_coin(state, special);
    }

    state.push_event(GameEvent::LevelStarted { level });
}

/// Clear the current level and build the next one
pub fn advance(state: &mut GameState) {
    state.phase = GamePhase::LevelAdvancing;
    let next = state.stats.level + 1;
    start_level(state, next);
    state.push_event(GameEvent::LevelAdvanced { level: next });
    state.phase = GamePhase::Playing;
}

/// End-of-tick win/loss evaluation
///
/// Game over takes precedence over a level advance reached in the same tick.
pub fn evaluate(state: &mut GameState) {
    if state.stats.is_game_over {
        state.pending_advance = false;
        if state.phase != GamePhase::GameOver {
            state.phase = GamePhase::GameOver;
            log::info!(
                "Game over at level {} with score {}",
                state.stats.level,
                state.stats.score
            );
            state.push_event(GameEvent::GameOver {
                score: state.stats.score,
                level: state.stats.level,
            });
        }
        return;
    }

    if state.pending_advance {
        state.pending_advance = false;
        advance(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_level_config_scaling() {
        let tuning = Tuning::default();
        let l1 = LevelConfig::for_level(1, &tuning);
        let l4 = LevelConfig::for_level(4, &tuning);
        assert_eq!(l1.obstacle_count, 10);
        assert_eq!(l4.obstacle_count, 12);
        assert_eq!(l1.wall_count, 5);
        assert_eq!(l4.wall_count, 7);
        assert!((l1.obstacle_speed - 0.05).abs() < 1e-6);
        assert!((l4.obstacle_speed - 0.05 * 1.06).abs() < 1e-6);
        assert_eq!(l1.floor_color, FLOOR_COLOR_ODD);
        assert_eq!(l4.floor_color, FLOOR_COLOR_EVEN);
        assert_ne!(l1.obstacle_tint, l4.obstacle_tint);
    }

    #[test]
    fn test_wall_placement_rules() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let walls = place_walls(&mut rng, 8, &tuning);
        assert!(walls.len() >= 4 && walls.len() <= 12);

        // Random walls keep clear of the center and of each other
        for (i, w) in walls.iter().enumerate().skip(4) {
            let flat = Vec3::new(w.position.x, 0.0, w.position.z);
            assert!(flat.length() >= tuning.wall_center_clearance);
            for other in &walls[..i] {
                assert!(other.position.distance(w.position) >= tuning.wall_separation);
            }
        }
    }

    #[test]
    fn test_spawn_point_is_clear_of_cover_walls() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut state = GameState::with_seed(9, tuning.clone());
        state.store.walls.clear();
        for wall in place_walls(&mut rng, 0, &tuning) {
            state.store.spawn(EntityState::Wall(wall));
        }
        let half = Vec3::splat(tuning.player_half_extent);
        assert!(!collision::blocked(spawn_point(&tuning), half, &state.store.walls));
    }

    #[test]
    fn test_start_level_repopulates() {
        let mut state = GameState::with_seed(21, Tuning::default());
        state.stats.health = 2;
        state.stats.obstacles_destroyed = 4;
        state.store.player.position = Vec3::new(4.0, 1.0, 4.0);

        start_level(&mut state, 3);
        assert_eq!(state.stats.level, 3);
        assert_eq!(state.stats.obstacles_destroyed, 0);
        assert_eq!(state.stats.total_obstacles_this_level, 11);
        assert_eq!(state.store.obstacles.len(), 11);
        assert_eq!(state.stats.health, state.stats.max_health);
        assert_eq!(state.store.player.position, spawn_point(&state.tuning));
        assert!(state.store.projectiles.is_empty());
        for (_, o) in state.store.obstacles.iter() {
            let flat = Vec3::new(o.position.x, 0.0, o.position.z);
            assert!(flat.length() >= state.tuning.obstacle_spawn_clearance);
        }
    }

    #[test]
    fn test_obstacle_spawn_never_inside_wall() {
        // Center clearance can never be met, so every spawn takes the fallback
        let tuning = Tuning {
            obstacle_spawn_clearance: 100.0,
            ..Tuning::default()
        };
        let mut state = GameState::with_seed(17, tuning);
        for _ in 0..20 {
            let handle = spawn_obstacle(&mut state).expect("open floor available");
            let obstacle = state.store.obstacles.get(handle.id).expect("spawned");
            assert!(!collision::blocked(
                obstacle.position,
                obstacle.half_extents,
                &state.store.walls
            ));
        }
    }

    #[test]
    fn test_obstacle_spawn_skipped_when_walled_in() {
        let mut state = GameState::with_seed(4, Tuning::default());
        state.store.clear_level();
        state.store.spawn(EntityState::Wall(Wall::new(
            Vec3::ZERO,
            false,
            20.0,
            20.0,
            20.0,
        )));
        assert!(spawn_obstacle(&mut state).is_none());
        assert!(state.store.obstacles.is_empty());
    }

    #[test]
    fn test_game_over_beats_advance() {
        let mut state = GameState::with_seed(2, Tuning::default());
        state.phase = GamePhase::Playing;
        state.stats.is_game_over = true;
        state.pending_advance = true;
        evaluate(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.stats.level, 1);
        evaluate(&mut state);
        let overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    proptest! {
        #[test]
        fn prop_advance_adds_obstacles(level in 1u32..60) {
            let tuning = Tuning::default();
            let mut state = GameState::with_seed(u64::from(level), tuning.clone());
            start_level(&mut state, level);
            advance(&mut state);
            prop_assert_eq!(state.stats.level, level + 1);
            prop_assert_eq!(
                state.stats.total_obstacles_this_level,
                tuning.base_obstacles + (level + 1) / 2
            );
            prop_assert_eq!(state.stats.obstacles_destroyed, 0);
            prop_assert_eq!(state.phase, GamePhase::Playing);
        }
    }
}
