//! Entity storage
//!
//! Each entity class lives in its own [`Pool`]. Entities are addressed by
//! monotonically increasing [`EntityId`]s, so slot order is insertion order
//! and lookups are a binary search. Removal only marks a slot dead; dead
//! slots are compacted between ticks. Iterating by slot index while
//! removing is therefore safe: nothing shifts, nothing is visited twice.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Coin, Obstacle, Player, Projectile, ProjectileOwner, Wall};

/// Unique identifier for an entity (never reused within a run)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u32);

/// Entity class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityClass {
    Player,
    Obstacle,
    Coin,
    PlayerProjectile,
    ObstacleProjectile,
    Wall,
}

/// Opaque entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub class: EntityClass,
    pub id: EntityId,
}

/// Initial state for a spawned entity
#[derive(Debug, Clone)]
pub enum EntityState {
    Obstacle(Obstacle),
    Coin(Coin),
    Projectile(Projectile),
    Wall(Wall),
}

/// Borrowed view of any entity
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Player(&'a Player),
    Obstacle(&'a Obstacle),
    Coin(&'a Coin),
    Projectile(&'a Projectile),
    Wall(&'a Wall),
}

impl EntityRef<'_> {
    pub fn position(&self) -> Vec3 {
        match self {
            EntityRef::Player(p) => p.position,
            EntityRef::Obstacle(o) => o.position,
            EntityRef::Coin(c) => c.position,
            EntityRef::Projectile(p) => p.position,
            EntityRef::Wall(w) => w.position,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    id: EntityId,
    alive: bool,
    value: T,
}

/// Insertion-ordered collection of one entity class
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    live: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids must be inserted in ascending order
    fn insert(&mut self, id: EntityId, value: T) {
        debug_assert!(self.slots.last().is_none_or(|s| s.id < id));
        self.slots.push(Slot {
            id,
            alive: true,
            value,
        });
        self.live += 1;
    }

    fn find(&self, id: EntityId) -> Option<usize> {
        self.slots
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .filter(|&i| self.slots[i].alive)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.find(id).map(|i| &self.slots[i].value)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.find(id).map(|i| &mut self.slots[i].value)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.find(id).is_some()
    }

    /// Mark an entity dead. Removing an absent entity is a no-op.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.find(id) {
            Some(i) => {
                self.slots[i].alive = false;
                self.live -= 1;
                true
            }
            None => false,
        }
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Stable snapshot of live ids in insertion order
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots
            .iter()
            .filter(|s| s.alive)
            .map(|s| (s.id, &s.value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.slots
            .iter_mut()
            .filter(|s| s.alive)
            .map(|s| (s.id, &mut s.value))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.live = 0;
    }

    /// Drop dead slots (call between ticks)
    pub fn compact(&mut self) {
        self.slots.retain(|s| s.alive);
    }
}

/// Owns every live entity, grouped by class
#[derive(Debug, Clone)]
pub struct EntityStore {
    /// The single player entity (persists across levels)
    pub player: Player,
    pub obstacles: Pool<Obstacle>,
    pub coins: Pool<Coin>,
    /// Player- and obstacle-fired projectiles, told apart by owner
    pub projectiles: Pool<Projectile>,
    pub walls: Pool<Wall>,
    player_id: EntityId,
    next_id: u32,
}

impl EntityStore {
    pub fn new(player: Player) -> Self {
        Self {
            player,
            obstacles: Pool::new(),
            coins: Pool::new(),
            projectiles: Pool::new(),
            walls: Pool::new(),
            player_id: EntityId(0),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn player_handle(&self) -> Handle {
        Handle {
            class: EntityClass::Player,
            id: self.player_id,
        }
    }

    /// Spawn an entity and return its handle
    pub fn spawn(&mut self, state: EntityState) -> Handle {
        let id = self.next_entity_id();
        let class = match state {
            EntityState::Obstacle(obstacle) => {
                self.obstacles.insert(id, obstacle);
                EntityClass::Obstacle
            }
            EntityState::Coin(coin) => {
                self.coins.insert(id, coin);
                EntityClass::Coin
            }
            EntityState::Projectile(projectile) => {
                let class = match projectile.owner {
                    ProjectileOwner::Player => EntityClass::PlayerProjectile,
                    ProjectileOwner::Obstacle => EntityClass::ObstacleProjectile,
                };
                self.projectiles.insert(id, projectile);
                class
            }
            EntityState::Wall(wall) => {
                self.walls.insert(id, wall);
                EntityClass::Wall
            }
        };
        Handle { class, id }
    }

    /// Destroy an entity. Absent handles and the player are ignored.
    pub fn destroy(&mut self, handle: Handle) -> bool {
        match handle.class {
            EntityClass::Player => false,
            EntityClass::Obstacle => self.obstacles.remove(handle.id),
            EntityClass::Coin => self.coins.remove(handle.id),
            EntityClass::PlayerProjectile | EntityClass::ObstacleProjectile => {
                let owned = self
                    .projectiles
                    .get(handle.id)
                    .is_some_and(|p| p.class() == handle.class);
                owned && self.projectiles.remove(handle.id)
            }
            EntityClass::Wall => self.walls.remove(handle.id),
        }
    }

    /// Look up any entity by handle
    pub fn get(&self, handle: Handle) -> Option<EntityRef<'_>> {
        match handle.class {
            EntityClass::Player => {
                (handle.id == self.player_id).then_some(EntityRef::Player(&self.player))
            }
            EntityClass::Obstacle => self.obstacles.get(handle.id).map(EntityRef::Obstacle),
            EntityClass::Coin => self.coins.get(handle.id).map(EntityRef::Coin),
            EntityClass::PlayerProjectile | EntityClass::ObstacleProjectile => self
                .projectiles
                .get(handle.id)
                .filter(|p| p.class() == handle.class)
                .map(EntityRef::Projectile),
            EntityClass::Wall => self.walls.get(handle.id).map(EntityRef::Wall),
        }
    }

    /// Visit every live entity of a class in insertion order
    pub fn for_each(&self, class: EntityClass, mut f: impl FnMut(Handle, EntityRef<'_>)) {
        let handle = |id| Handle { class, id };
        match class {
            EntityClass::Player => f(self.player_handle(), EntityRef::Player(&self.player)),
            EntityClass::Obstacle => self
                .obstacles
                .iter()
                .for_each(|(id, o)| f(handle(id), EntityRef::Obstacle(o))),
            EntityClass::Coin => self
                .coins
                .iter()
                .for_each(|(id, c)| f(handle(id), EntityRef::Coin(c))),
            EntityClass::PlayerProjectile | EntityClass::ObstacleProjectile => self
                .projectiles
                .iter()
                .filter(|(_, p)| p.class() == class)
                .for_each(|(id, p)| f(handle(id), EntityRef::Projectile(p))),
            EntityClass::Wall => self
                .walls
                .iter()
                .for_each(|(id, w)| f(handle(id), EntityRef::Wall(w))),
        }
    }

    /// Remove every entity of a class. The player cannot be cleared.
    pub fn clear(&mut self, class: EntityClass) {
        match class {
            EntityClass::Player => {}
            EntityClass::Obstacle => self.obstacles.clear(),
            EntityClass::Coin => self.coins.clear(),
            EntityClass::PlayerProjectile | EntityClass::ObstacleProjectile => {
                let doomed: Vec<_> = self
                    .projectiles
                    .iter()
                    .filter(|(_, p)| p.class() == class)
                    .map(|(id, _)| id)
                    .collect();
                for id in doomed {
                    self.projectiles.remove(id);
                }
                self.projectiles.compact();
            }
            EntityClass::Wall => self.walls.clear(),
        }
    }

    /// Remove every non-player entity
    pub fn clear_level(&mut self) {
        self.obstacles.clear();
        self.coins.clear();
        self.projectiles.clear();
        self.walls.clear();
    }

    /// Drop dead slots in every pool
    pub fn compact(&mut self) {
        self.obstacles.compact();
        self.coins.compact();
        self.projectiles.compact();
        self.walls.compact();
    }
}
