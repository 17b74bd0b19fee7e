//! Fixed timestep simulation tick
//!
//! Order within a tick: player motion, coin pickups, obstacles (motion,
//! contact damage, firing), projectiles, then win/loss evaluation.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision;
use super::combat;
use super::level;
use super::motion;
use super::state::{GameEvent, GamePhase, GameState, ProjectileOwner, Snapshot};
use crate::consts::{MAX_PITCH, MIN_PITCH};
use crate::{normalize_angle, sanitize_f32};

/// Input intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Strafe (x, right positive) and forward (y) intent in [-1, 1]
    pub move_vector: Vec2,
    pub jump: bool,
    pub fire: bool,
    /// Camera yaw change (radians)
    pub yaw_delta: f32,
    /// Camera pitch change (radians)
    pub pitch_delta: f32,
    /// Leave the game-over screen and start again at level 1
    pub restart: bool,
}

impl TickInput {
    /// Zero out non-finite components and clamp the move vector
    pub fn sanitized(&self) -> Self {
        let finite = self.move_vector.is_finite() && self.yaw_delta.is_finite() && self.pitch_delta.is_finite();
        if !finite {
            log::warn!("Discarding non-finite input components: {:?}", self);
        }
        let move_vector = Vec2::new(sanitize_f32(self.move_vector.x), sanitize_f32(self.move_vector.y));
        Self {
            move_vector: move_vector.clamp(Vec2::splat(-1.0), Vec2::splat(1.0)),
            yaw_delta: sanitize_f32(self.yaw_delta),
            pitch_delta: sanitize_f32(self.pitch_delta),
            ..*self
        }
    }

    /// Whether the input carries any intent at all
    pub fn is_active(&self) -> bool {
        self.move_vector != Vec2::ZERO
            || self.jump
            || self.fire
            || self.yaw_delta != 0.0
            || self.pitch_delta != 0.0
            || self.restart
    }
}

/// Advance the game by one tick and hand back what the host needs
pub fn step(state: &mut GameState, input: &TickInput, dt: f32) -> (Snapshot, Vec<GameEvent>) {
    tick(state, input, dt);
    (state.snapshot(), state.drain_events())
}

/// Advance the game state by one tick
///
/// Motion is per tick; `dt` (seconds) only advances the simulation clock
/// that drives the invincibility deadline and the hit cooldown.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let input = input.sanitized();
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
    state.time_ticks += 1;
    state.clock_ms += f64::from(dt) * 1000.0;

    state.camera.yaw = normalize_angle(state.camera.yaw + input.yaw_delta);
    state.camera.pitch = (state.camera.pitch + input.pitch_delta).clamp(MIN_PITCH, MAX_PITCH);

    match state.phase {
        GamePhase::NotStarted => {
            if !input.is_active() {
                return;
            }
            log::info!("Game started (seed {})", state.seed);
            state.phase = GamePhase::Playing;
            state.stats.is_playing = true;
        }
        GamePhase::GameOver => {
            if input.restart {
                state.restart();
            }
            return;
        }
        GamePhase::Playing | GamePhase::LevelAdvancing => {}
    }

    combat::expire_invincibility(state);
    update_player(state, &input);
    if input.fire {
        combat::fire_player_projectile(state);
    }
    collect_coins(state);
    update_obstacles(state);
    update_projectiles(state);

    level::evaluate(state);
    state.store.compact();
}

fn update_player(state: &mut GameState, input: &TickInput) {
    let tuning = &state.tuning;
    let player = &mut state.store.player;
    if input.jump {
        motion::try_jump(player, tuning);
    }
    motion::integrate_vertical(player, tuning);

    let displacement = motion::horizontal_displacement(input.move_vector, state.camera.yaw, tuning.move_speed);
    motion::move_player(player, displacement, &state.store.walls, tuning);
}

fn collect_coins(state: &mut GameState) {
    let radius = state.tuning.coin_pickup_radius;
    // Replacement coins spawned here wait for the next tick
    for id in state.store.coins.ids() {
        let Some(coin) = state.store.coins.get(id) else {
            continue;
        };
        if collision::within(state.store.player.position, coin.position, radius) {
            combat::collect_coin(state, id);
        }
    }
}

fn update_obstacles(state: &mut GameState) {
    let factor = motion::speed_up_factor(state.stats.coins_collected, &state.tuning);
    let half_extent = state.tuning.arena_half_extent;
    let contact = state.tuning.obstacle_contact_radius;

    for id in state.store.obstacles.ids() {
        if state.is_frozen() {
            break;
        }
        let store = &mut state.store;
        let Some(obstacle) = store.obstacles.get_mut(id) else {
            continue;
        };
        motion::step_obstacle(obstacle, factor, &store.walls, half_extent);
        let position = obstacle.position;

        if collision::within(state.store.player.position, position, contact) {
            combat::contact_damage(state);
        }
        if combat::roll_obstacle_fire(state) {
            combat::fire_at_player(state, position);
        }
    }
}

fn update_projectiles(state: &mut GameState) {
    let half = Vec3::splat(state.tuning.projectile_half_extent);
    let obstacle_radius = state.tuning.projectile_obstacle_radius;
    let player_radius = state.tuning.projectile_player_radius;

    for id in state.store.projectiles.ids() {
        // A decided outcome (advance or game over) ends projectile processing
        if state.is_frozen() || state.pending_advance {
            break;
        }
        let Some(projectile) = state.store.projectiles.get(id) else {
            continue;
        };
        let next = projectile.next_position();
        let owner = projectile.owner;

        if collision::blocked(next, half, &state.store.walls) {
            state.store.projectiles.remove(id);
            continue;
        }

        let Some(projectile) = state.store.projectiles.get_mut(id) else {
            continue;
        };
        projectile.position = next;
        projectile.age += 1;
        if projectile.age > projectile.max_age {
            state.store.projectiles.remove(id);
            continue;
        }

        match owner {
            ProjectileOwner::Player => {
                let target = collision::first_within(next, obstacle_radius, &state.store.obstacles, |o| o.position);
                if let Some(obstacle) = target {
                    combat::destroy_obstacle(state, obstacle, id);
                }
            }
            ProjectileOwner::Obstacle => {
                if collision::within(next, state.store.player.position, player_radius) {
                    state.store.projectiles.remove(id);
                    combat::projectile_damage(state);
                }
            }
        }
    }
}
