//! Game state and core simulation types
//!
//! [`GameState`] is the single simulation context: every component receives
//! it by `&mut` and nothing lives in process-wide globals.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::{self, LevelConfig};
use super::store::{EntityClass, EntityStore, Handle};
use crate::consts::INITIAL_PITCH;
use crate::tuning::Tuning;

/// Level progression phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Arena populated, waiting for the first input
    NotStarted,
    /// Active gameplay
    Playing,
    /// Transient: the level was cleared and is being rebuilt this tick
    LevelAdvancing,
    /// Health depleted; only a restart leaves this phase
    GameOver,
}

/// The player-controlled agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub velocity_y: f32,
    pub grounded: bool,
    /// Heading of the last horizontal displacement (radians, atan2(x, z))
    pub facing: f32,
    /// Simulation time (ms) at which invincibility ends
    pub invincible_until: Option<f64>,
    /// Simulation time (ms) of the last contact damage
    pub last_hit_ms: Option<f64>,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity_y: 0.0,
            grounded: true,
            facing: 0.0,
            invincible_until: None,
            last_hit_ms: None,
        }
    }

    /// Put the player back at a spawn point, at rest
    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity_y = 0.0;
        self.grounded = true;
    }
}

/// Obstacle geometry (cosmetic apart from the wall-collision box)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleShape {
    Box,
    Sphere,
    Cone,
}

impl ObstacleShape {
    pub const ALL: [ObstacleShape; 3] = [ObstacleShape::Box, ObstacleShape::Sphere, ObstacleShape::Cone];

    /// Bounding half extents of the visual footprint
    pub fn half_extents(self) -> Vec3 {
        match self {
            ObstacleShape::Box => Vec3::new(0.5, 1.0, 0.5),
            ObstacleShape::Sphere => Vec3::splat(0.7),
            ObstacleShape::Cone => Vec3::new(0.7, 1.0, 0.7),
        }
    }

    /// Resting height of the shape's center
    pub fn rest_height(self) -> f32 {
        match self {
            ObstacleShape::Cone => -1.0,
            _ => 0.0,
        }
    }
}

/// A mobile hostile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec3,
    /// Horizontal velocity per tick (y is always 0)
    pub velocity: Vec3,
    pub half_extents: Vec3,
    pub shape: ObstacleShape,
}

impl Obstacle {
    pub fn new(shape: ObstacleShape, x: f32, z: f32, velocity: Vec3) -> Self {
        Self {
            position: Vec3::new(x, shape.rest_height(), z),
            velocity: Vec3::new(velocity.x, 0.0, velocity.z),
            half_extents: shape.half_extents(),
            shape,
        }
    }
}

/// A pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub position: Vec3,
    /// Special coins grant invincibility instead of score
    pub is_special: bool,
}

/// A static wall segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub position: Vec3,
    /// Rotated 90 degrees about Y (long side along Z)
    pub rotated: bool,
    pub half_extents: Vec3,
}

impl Wall {
    pub fn new(position: Vec3, rotated: bool, half_length: f32, half_height: f32, half_thickness: f32) -> Self {
        let half_extents = if rotated {
            Vec3::new(half_thickness, half_height, half_length)
        } else {
            Vec3::new(half_length, half_height, half_thickness)
        };
        Self {
            position,
            rotated,
            half_extents,
        }
    }

    /// Rotation about Y in radians (0 or 90 degrees)
    pub fn rotation(&self) -> f32 {
        if self.rotated {
            std::f32::consts::FRAC_PI_2
        } else {
            0.0
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Obstacle,
}

/// A straight-flying shot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Distance per tick
    pub speed: f32,
    /// Ticks since spawn
    pub age: u32,
    /// Removed once age exceeds this
    pub max_age: u32,
    pub owner: ProjectileOwner,
}

impl Projectile {
    pub fn new(position: Vec3, direction: Vec3, speed: f32, max_age: u32, owner: ProjectileOwner) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            speed,
            age: 0,
            max_age,
            owner,
        }
    }

    pub fn class(&self) -> EntityClass {
        match self.owner {
            ProjectileOwner::Player => EntityClass::PlayerProjectile,
            ProjectileOwner::Obstacle => EntityClass::ObstacleProjectile,
        }
    }

    /// Position after one more tick of flight
    pub fn next_position(&self) -> Vec3 {
        self.position + self.direction * self.speed
    }
}

/// Third-person camera orientation (drives movement and aiming)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: INITIAL_PITCH,
        }
    }
}

impl Camera {
    /// Horizontal forward direction of the camera
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }
}

/// Score and progression record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub coins_collected: u32,
    pub obstacles_destroyed: u32,
    pub total_obstacles_this_level: u32,
    pub level: u32,
    pub is_playing: bool,
    pub is_game_over: bool,
    pub is_invincible: bool,
    pub health: i32,
    pub max_health: i32,
}

impl GameStats {
    pub fn new(max_health: i32) -> Self {
        Self {
            score: 0,
            coins_collected: 0,
            obstacles_destroyed: 0,
            total_obstacles_this_level: 0,
            level: 1,
            is_playing: false,
            is_game_over: false,
            is_invincible: false,
            health: max_health,
            max_health,
        }
    }
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitCause {
    Contact,
    Projectile,
}

/// Notifications for presentation collaborators (audio, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    CoinCollected { special: bool, position: Vec3 },
    ScoreChanged { score: u64 },
    InvincibilityChanged { active: bool },
    ProjectileFired { owner: ProjectileOwner },
    ObstacleDestroyed { position: Vec3 },
    PlayerHit { health: i32, cause: HitCause },
    LevelAdvanced { level: u32 },
    GameOver { score: u64, level: u32 },
}

/// Complete simulation context
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from (for logging)
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub stats: GameStats,
    pub level_config: LevelConfig,
    pub store: EntityStore,
    pub camera: Camera,
    /// Monotonic simulation clock (ms)
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    /// Set when the last obstacle of the level falls; consumed once per tick
    pub(crate) pending_advance: bool,
}

impl GameState {
    /// Create a game with an entropy seed
    pub fn new(tuning: Tuning) -> Self {
        Self::with_seed(rand::random(), tuning)
    }

    /// Create a game with a fixed seed and level 1 populated
    pub fn with_seed(seed: u64, tuning: Tuning) -> Self {
        let spawn = Vec3::new(0.0, tuning.ground_level, 0.0);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            stats: GameStats::new(tuning.max_health),
            level_config: LevelConfig::for_level(1, &tuning),
            store: EntityStore::new(Player::new(spawn)),
            camera: Camera::default(),
            clock_ms: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            pending_advance: false,
            tuning,
        };
        level::start_level(&mut state, 1);
        state
    }

    /// Whether motion/collision/combat are suspended
    pub fn is_frozen(&self) -> bool {
        self.stats.is_game_over || self.phase == GamePhase::GameOver
    }

    /// Reset to level 1 and resume play
    pub fn restart(&mut self) {
        log::info!(
            "Restarting (previous run: level {}, score {})",
            self.stats.level,
            self.stats.score
        );
        self.stats = GameStats::new(self.tuning.max_health);
        self.stats.is_playing = true;
        self.store.player.invincible_until = None;
        self.store.player.last_hit_ms = None;
        self.pending_advance = false;
        level::start_level(self, 1);
        self.phase = GamePhase::Playing;
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Full view of the simulation for rendering
    pub fn snapshot(&self) -> Snapshot {
        let mut entities = Vec::with_capacity(
            self.store.obstacles.len()
                + self.store.coins.len()
                + self.store.projectiles.len()
                + self.store.walls.len(),
        );
        for (id, o) in self.store.obstacles.iter() {
            entities.push(EntityView {
                handle: Handle {
                    class: EntityClass::Obstacle,
                    id,
                },
                position: o.position,
                detail: EntityDetail::Obstacle {
                    shape: o.shape,
                    half_extents: o.half_extents,
                },
            });
        }
        for (id, c) in self.store.coins.iter() {
            entities.push(EntityView {
                handle: Handle {
                    class: EntityClass::Coin,
                    id,
                },
                position: c.position,
                detail: EntityDetail::Coin {
                    special: c.is_special,
                },
            });
        }
        for (id, p) in self.store.projectiles.iter() {
            entities.push(EntityView {
                handle: Handle {
                    class: p.class(),
                    id,
                },
                position: p.position,
                detail: EntityDetail::Projectile {
                    direction: p.direction,
                },
            });
        }
        for (id, w) in self.store.walls.iter() {
            entities.push(EntityView {
                handle: Handle {
                    class: EntityClass::Wall,
                    id,
                },
                position: w.position,
                detail: EntityDetail::Wall {
                    rotation: w.rotation(),
                    half_extents: w.half_extents,
                },
            });
        }

        Snapshot {
            tick: self.time_ticks,
            clock_ms: self.clock_ms,
            phase: self.phase,
            stats: self.stats.clone(),
            level_config: self.level_config.clone(),
            camera: self.camera,
            player: self.store.player.clone(),
            entities,
        }
    }
}

/// Class-specific render data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityDetail {
    Obstacle { shape: ObstacleShape, half_extents: Vec3 },
    Coin { special: bool },
    Projectile { direction: Vec3 },
    Wall { rotation: f32, half_extents: Vec3 },
}

/// One non-player entity as seen by the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub handle: Handle,
    pub position: Vec3,
    pub detail: EntityDetail,
}

/// Read-only state emitted after every tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub clock_ms: f64,
    pub phase: GamePhase,
    pub stats: GameStats,
    pub level_config: LevelConfig,
    pub camera: Camera,
    pub player: Player,
    pub entities: Vec<EntityView>,
}

impl Snapshot {
    /// Number of entities of a class in this snapshot
    pub fn count(&self, class: EntityClass) -> usize {
        self.entities
            .iter()
            .filter(|e| e.handle.class == class)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_populated() {
        let state = GameState::with_seed(7, Tuning::default());
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.stats.level, 1);
        assert_eq!(state.stats.health, state.stats.max_health);
        assert_eq!(
            state.store.obstacles.len() as u32,
            state.stats.total_obstacles_this_level
        );
        assert_eq!(state.store.coins.len() as u32, state.tuning.initial_coins);
        assert!(state.store.walls.len() >= 4);
        assert_eq!(state.store.player.position.y, state.tuning.ground_level);
    }

    #[test]
    fn test_wall_rotation_swaps_extents() {
        let flat = Wall::new(Vec3::ZERO, false, 2.0, 1.5, 0.25);
        let turned = Wall::new(Vec3::ZERO, true, 2.0, 1.5, 0.25);
        assert_eq!(flat.half_extents.x, turned.half_extents.z);
        assert_eq!(flat.half_extents.z, turned.half_extents.x);
        assert_eq!(flat.rotation(), 0.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::with_seed(3, Tuning::default());
        let snapshot = state.snapshot();
        assert_eq!(
            snapshot.count(EntityClass::Obstacle),
            state.store.obstacles.len()
        );
        let json = serde_json::to_string(&snapshot).expect("snapshot serializes");
        assert!(json.contains("\"phase\":\"NotStarted\""));
    }

    #[test]
    fn test_camera_forward_at_zero_yaw() {
        let forward = Camera::default().forward();
        assert!((forward - Vec3::NEG_Z).length() < 1e-6);
    }
}
