//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and inputs the
//! simulation replays identically:
//! - Per-tick motion; the frame delta only drives the clock
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod level;
pub mod motion;
pub mod state;
pub mod store;
pub mod tick;

pub use collision::{Aabb, ObstacleMove};
pub use level::LevelConfig;
pub use state::{
    Camera, Coin, EntityDetail, EntityView, GameEvent, GamePhase, GameState, GameStats, HitCause, Obstacle,
    ObstacleShape, Player, Projectile, ProjectileOwner, Snapshot, Wall,
};
pub use store::{EntityClass, EntityId, EntityRef, EntityState, EntityStore, Handle, Pool};
pub use tick::{TickInput, step, tick};
