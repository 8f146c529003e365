//! Closed component set for the scene world.
//!
//! Each capability has its own table keyed by `EntityId`, stored in a
//! BTreeMap for deterministic iteration order. An entity holds at most one
//! component per capability; inserting again replaces the previous value.
//!
//! # Invariants
//! - Iteration order is deterministic (BTreeMap, ascending id).
//! - Component storage is independent of entity creation order.

use playstage_common::{EntityId, TextureHandle, Transform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Renderable component: an optional cached texture plus a uniform scale.
///
/// An absent texture means "draw a placeholder colored rectangle using the
/// entity's own Transform size". Texture size and transform size are
/// independent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub texture: Option<TextureHandle>,
    pub scale: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            scale: 1.0,
        }
    }
}

impl Sprite {
    pub fn with_texture(texture: Option<TextureHandle>) -> Self {
        Self {
            texture,
            ..Self::default()
        }
    }
}

/// Movement component, consumed only by the physics system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

/// Explicit gameplay role, attached at creation time.
///
/// Systems select entities by this tag rather than inferring roles from
/// bounding-box geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Collectible,
    Hazard,
}

/// Deterministic component storage for the closed component set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentStore {
    transforms: BTreeMap<EntityId, Transform>,
    sprites: BTreeMap<EntityId, Sprite>,
    velocities: BTreeMap<EntityId, Velocity>,
    roles: BTreeMap<EntityId, Role>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Transform ---
    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.transforms.insert(entity, transform);
    }

    pub fn get_transform(&self, entity: EntityId) -> Option<&Transform> {
        self.transforms.get(&entity)
    }

    pub fn get_transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(&entity)
    }

    pub fn remove_transform(&mut self, entity: EntityId) -> Option<Transform> {
        self.transforms.remove(&entity)
    }

    pub fn transforms(&self) -> &BTreeMap<EntityId, Transform> {
        &self.transforms
    }

    // --- Sprite ---
    pub fn set_sprite(&mut self, entity: EntityId, sprite: Sprite) {
        self.sprites.insert(entity, sprite);
    }

    pub fn get_sprite(&self, entity: EntityId) -> Option<&Sprite> {
        self.sprites.get(&entity)
    }

    pub fn remove_sprite(&mut self, entity: EntityId) -> Option<Sprite> {
        self.sprites.remove(&entity)
    }

    pub fn sprites(&self) -> &BTreeMap<EntityId, Sprite> {
        &self.sprites
    }

    // --- Velocity ---
    pub fn set_velocity(&mut self, entity: EntityId, velocity: Velocity) {
        self.velocities.insert(entity, velocity);
    }

    pub fn get_velocity(&self, entity: EntityId) -> Option<&Velocity> {
        self.velocities.get(&entity)
    }

    pub fn get_velocity_mut(&mut self, entity: EntityId) -> Option<&mut Velocity> {
        self.velocities.get_mut(&entity)
    }

    pub fn remove_velocity(&mut self, entity: EntityId) -> Option<Velocity> {
        self.velocities.remove(&entity)
    }

    pub fn velocities(&self) -> &BTreeMap<EntityId, Velocity> {
        &self.velocities
    }

    // --- Role ---
    pub fn set_role(&mut self, entity: EntityId, role: Role) {
        self.roles.insert(entity, role);
    }

    pub fn get_role(&self, entity: EntityId) -> Option<&Role> {
        self.roles.get(&entity)
    }

    pub fn remove_role(&mut self, entity: EntityId) -> Option<Role> {
        self.roles.remove(&entity)
    }

    pub fn roles(&self) -> &BTreeMap<EntityId, Role> {
        &self.roles
    }

    /// Remove all components for an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.transforms.remove(&entity);
        self.sprites.remove(&entity);
        self.velocities.remove(&entity);
        self.roles.remove(&entity);
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.transforms.clear();
        self.sprites.clear();
        self.velocities.clear();
        self.roles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn set_and_get_transform() {
        let mut store = ComponentStore::new();
        let id = EntityId(1);
        store.set_transform(id, Transform::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)));
        assert_eq!(store.get_transform(id).unwrap().position, Vec2::new(1.0, 2.0));
        assert!(store.get_transform(EntityId(2)).is_none());
    }

    #[test]
    fn reattach_replaces() {
        let mut store = ComponentStore::new();
        let id = EntityId(1);
        store.set_velocity(id, Velocity::new(1.0, 0.0));
        store.set_velocity(id, Velocity::new(0.0, 2.0));
        assert_eq!(store.get_velocity(id), Some(&Velocity::new(0.0, 2.0)));
        assert_eq!(store.velocities().len(), 1);
    }

    #[test]
    fn remove_entity_clears_all_capabilities() {
        let mut store = ComponentStore::new();
        let id = EntityId(3);
        store.set_transform(id, Transform::default());
        store.set_sprite(id, Sprite::default());
        store.set_velocity(id, Velocity::default());
        store.set_role(id, Role::Player);

        store.remove_entity(id);
        assert!(store.get_transform(id).is_none());
        assert!(store.get_sprite(id).is_none());
        assert!(store.get_velocity(id).is_none());
        assert!(store.get_role(id).is_none());
    }

    #[test]
    fn deterministic_iteration_order() {
        let mut store = ComponentStore::new();
        for raw in [9u64, 2, 7, 4, 1] {
            store.set_transform(EntityId(raw), Transform::default());
        }
        let keys: Vec<u64> = store.transforms().keys().map(|id| id.0).collect();
        assert_eq!(keys, vec![1, 2, 4, 7, 9]);
    }

    #[test]
    fn sprite_default_is_placeholder() {
        let s = Sprite::default();
        assert!(s.texture.is_none());
        assert_eq!(s.scale, 1.0);
    }
}
