//! Combat and scoring
//!
//! Applies the consequences of confirmed collisions to [`GameState`]:
//! score, health, invincibility, hit cooldown, and the events that go with
//! them. Detection lives in `collision`; sequencing lives in `tick`.

use glam::Vec3;
use rand::Rng;

use super::level;
use super::state::{GameEvent, GameState, HitCause, Projectile, ProjectileOwner};
use super::store::{EntityId, EntityState};
use crate::tuning::DamageModel;

fn add_score(state: &mut GameState, points: u64) {
    state.stats.score += points;
    state.push_event(GameEvent::ScoreChanged {
        score: state.stats.score,
    });
}

/// Grant (or extend) the invincibility window
pub fn grant_invincibility(state: &mut GameState) {
    let deadline = state.clock_ms + state.tuning.invincibility_ms;
    let player = &mut state.store.player;
    player.invincible_until = Some(player.invincible_until.map_or(deadline, |t| t.max(deadline)));
    if !state.stats.is_invincible {
        state.stats.is_invincible = true;
        state.push_event(GameEvent::InvincibilityChanged { active: true });
    }
}

/// Clear invincibility once its deadline has passed
pub fn expire_invincibility(state: &mut GameState) {
    let Some(deadline) = state.store.player.invincible_until else {
        return;
    };
    if state.clock_ms >= deadline {
        state.store.player.invincible_until = None;
        if state.stats.is_invincible {
            state.stats.is_invincible = false;
            state.push_event(GameEvent::InvincibilityChanged { active: false });
        }
    }
}

/// Pick up a coin: reward, replace, and occasionally add an obstacle
pub fn collect_coin(state: &mut GameState, id: EntityId) {
    let Some(coin) = state.store.coins.get(id).cloned() else {
        return;
    };
    state.store.coins.remove(id);

    if coin.is_special {
        grant_invincibility(state);
    } else {
        let points = state.tuning.coin_score;
        add_score(state, points);
    }
    state.stats.coins_collected += 1;
    state.push_event(GameEvent::CoinCollected {
        special: coin.is_special,
        position: coin.position,
    });
    log::debug!(
        "Coin collected (special: {}, total: {})",
        coin.is_special,
        state.stats.coins_collected
    );

    let special = state.rng.random_bool(state.tuning.special_coin_chance);
    level::spawn_coin(state, special);
    if state.stats.coins_collected % state.tuning.coins_per_extra_obstacle == 0 {
        level::spawn_obstacle(state);
    }
}

/// Take one point of damage (or all of it under instant death)
fn damage_player(state: &mut GameState, cause: HitCause) {
    let health = match state.tuning.damage_model {
        DamageModel::Health => state.stats.health - 1,
        DamageModel::InstantDeath => 0,
    };
    state.stats.health = health.clamp(0, state.stats.max_health);
    state.push_event(GameEvent::PlayerHit {
        health: state.stats.health,
        cause,
    });
    log::debug!("Player hit by {:?}, health {}", cause, state.stats.health);

    if state.stats.health <= 0 {
        state.stats.is_game_over = true;
    }
}

/// Obstacle contact. Gated by invincibility and the hit cooldown.
///
/// Returns whether damage was applied.
pub fn contact_damage(state: &mut GameState) -> bool {
    if state.stats.is_invincible || state.stats.is_game_over {
        return false;
    }
    let now = state.clock_ms;
    let cooldown = state.tuning.hit_cooldown_ms;
    let ready = state
        .store
        .player
        .last_hit_ms
        .is_none_or(|last| now - last >= cooldown);
    if !ready {
        return false;
    }
    state.store.player.last_hit_ms = Some(now);
    damage_player(state, HitCause::Contact);
    true
}

/// Obstacle projectile hit. Gated by invincibility only.
pub fn projectile_damage(state: &mut GameState) -> bool {
    if state.stats.is_invincible || state.stats.is_game_over {
        return false;
    }
    damage_player(state, HitCause::Projectile);
    true
}

/// A player projectile struck an obstacle: both are destroyed
pub fn destroy_obstacle(state: &mut GameState, obstacle: EntityId, projectile: EntityId) {
    state.store.projectiles.remove(projectile);
    let Some(position) = state.store.obstacles.get(obstacle).map(|o| o.position) else {
        return;
    };
    state.store.obstacles.remove(obstacle);

    let points = state.tuning.obstacle_score;
    add_score(state, points);
    state.stats.obstacles_destroyed += 1;
    state.push_event(GameEvent::ObstacleDestroyed { position });
    log::debug!(
        "Obstacle destroyed ({}/{})",
        state.stats.obstacles_destroyed,
        state.stats.total_obstacles_this_level
    );

    if state.stats.obstacles_destroyed >= state.stats.total_obstacles_this_level {
        state.pending_advance = true;
    }
}

/// Fire along the flattened camera forward from just above the player
pub fn fire_player_projectile(state: &mut GameState) {
    let origin = state.store.player.position + Vec3::Y * state.tuning.player_projectile_lift;
    let projectile = Projectile::new(
        origin,
        state.camera.forward(),
        state.tuning.player_projectile_speed,
        state.tuning.player_projectile_lifetime,
        ProjectileOwner::Player,
    );
    state.store.spawn(EntityState::Projectile(projectile));
    state.push_event(GameEvent::ProjectileFired {
        owner: ProjectileOwner::Player,
    });
}

/// Per-tick fire roll for one obstacle: p = base rate x level
pub fn roll_obstacle_fire(state: &mut GameState) -> bool {
    let p = (state.tuning.obstacle_fire_base_rate * state.stats.level as f64).clamp(0.0, 1.0);
    state.rng.random_bool(p)
}

/// Fire from an obstacle straight at the player's current position
pub fn fire_at_player(state: &mut GameState, from: Vec3) -> bool {
    let direction = (state.store.player.position - from).normalize_or_zero();
    if direction == Vec3::ZERO {
        return false;
    }
    let projectile = Projectile::new(
        from,
        direction,
        state.tuning.obstacle_projectile_speed,
        state.tuning.obstacle_projectile_lifetime,
        ProjectileOwner::Obstacle,
    );
    state.store.spawn(EntityState::Projectile(projectile));
    state.push_event(GameEvent::ProjectileFired {
        owner: ProjectileOwner::Obstacle,
    });
    true
}
