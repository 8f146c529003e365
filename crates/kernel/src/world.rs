use playstage_common::{EntityId, Transform};
use playstage_ecs::{ComponentStore, Role, Sprite, Velocity};
use std::collections::BTreeSet;

/// The authoritative scene state.
///
/// Owns the set of live entities and all their components. Mutations happen
/// only through explicit operations; renderers and editing tools derive
/// their views from it.
///
/// Uses ordered collections throughout so enumeration order is the id
/// order, deterministic across platforms and runs.
#[derive(Debug, Clone, Default)]
pub struct World {
    next_id: u64,
    live: BTreeSet<EntityId>,
    components: ComponentStore,
}

impl World {
    /// Create an empty world. The first entity gets id 1.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeSet::new(),
            components: ComponentStore::new(),
        }
    }

    /// Create a fresh entity with no components.
    ///
    /// Ids are strictly increasing; an id freed by `destroy` is never handed
    /// out again.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.live.insert(id);
        tracing::debug!(%id, "entity created");
        id
    }

    /// Destroy an entity and all its components.
    ///
    /// Destroying an id that is not alive is a no-op.
    pub fn destroy(&mut self, id: EntityId) {
        if self.live.remove(&id) {
            self.components.remove_entity(id);
            tracing::debug!(%id, "entity destroyed");
        }
    }

    /// Remove every entity and component, keeping the id counter so ids
    /// stay unique across the world's whole lifetime.
    pub fn reset(&mut self) {
        self.live.clear();
        self.components.clear();
        tracing::debug!("world reset");
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.live.contains(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.live.len()
    }

    /// Snapshot of all live entity ids in ascending order.
    ///
    /// The snapshot is a copy; mutating the world afterwards does not
    /// invalidate it.
    pub fn all(&self) -> Vec<EntityId> {
        self.live.iter().copied().collect()
    }

    // --- Component attachment: install-or-replace, no-op on dead ids ---

    pub fn attach_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        if !self.live.contains(&id) {
            return false;
        }
        self.components.set_transform(id, transform);
        true
    }

    pub fn attach_sprite(&mut self, id: EntityId, sprite: Sprite) -> bool {
        if !self.live.contains(&id) {
            return false;
        }
        self.components.set_sprite(id, sprite);
        true
    }

    pub fn attach_velocity(&mut self, id: EntityId, velocity: Velocity) -> bool {
        if !self.live.contains(&id) {
            return false;
        }
        self.components.set_velocity(id, velocity);
        true
    }

    pub fn attach_role(&mut self, id: EntityId, role: Role) -> bool {
        if !self.live.contains(&id) {
            return false;
        }
        self.components.set_role(id, role);
        true
    }

    // --- Component lookup: absent is a normal outcome ---

    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.components.get_transform(id)
    }

    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.components.get_transform_mut(id)
    }

    pub fn sprite(&self, id: EntityId) -> Option<&Sprite> {
        self.components.get_sprite(id)
    }

    pub fn velocity(&self, id: EntityId) -> Option<&Velocity> {
        self.components.get_velocity(id)
    }

    pub fn velocity_mut(&mut self, id: EntityId) -> Option<&mut Velocity> {
        self.components.get_velocity_mut(id)
    }

    pub fn role(&self, id: EntityId) -> Option<Role> {
        self.components.get_role(id).copied()
    }

    /// First (lowest-id) entity carrying the given role.
    pub fn find_role(&self, role: Role) -> Option<EntityId> {
        self.components
            .roles()
            .iter()
            .find(|(_, r)| **r == role)
            .map(|(id, _)| *id)
    }

    /// Read-only access to the component tables.
    pub fn components(&self) -> &ComponentStore {
        &self.components
    }
}
