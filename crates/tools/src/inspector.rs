use playstage_common::EntityId;
use playstage_ecs::Role;
use playstage_kernel::World;

/// Read-only world queries for debugging, logging, and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene state.
    pub fn summary(world: &World) -> SceneSummary {
        SceneSummary {
            entity_count: world.entity_count(),
            sprite_count: world.components().sprites().len(),
            mover_count: world.components().velocities().len(),
        }
    }

    /// Detailed info about a single entity, or `None` if it is not alive.
    pub fn inspect_entity(world: &World, id: EntityId) -> Option<EntityInfo> {
        if !world.contains(id) {
            return None;
        }
        let transform = world.transform(id).copied();
        Some(EntityInfo {
            id,
            position: transform.map(|t| [t.position.x, t.position.y]),
            size: transform.map(|t| [t.size.x, t.size.y]),
            angle: transform.map(|t| t.angle),
            role: world.role(id),
            has_sprite: world.sprite(id).is_some(),
        })
    }

    /// List all entity ids in ascending order.
    pub fn list_entities(world: &World) -> Vec<EntityId> {
        world.all()
    }

    /// The whole scene as a JSON value, for the CLI `dump` command.
    pub fn dump_json(world: &World) -> serde_json::Value {
        let entities: Vec<serde_json::Value> = world
            .all()
            .into_iter()
            .map(|id| {
                serde_json::json!({
                    "id": id.0,
                    "transform": world.transform(id),
                    "sprite": world.sprite(id),
                    "velocity": world.velocity(id),
                    "role": world.role(id),
                })
            })
            .collect();
        serde_json::json!({ "entities": entities })
    }
}

/// Summary of the scene state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub sprite_count: usize,
    pub mover_count: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} sprites={} movers={}",
            self.entity_count, self.sprite_count, self.mover_count
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: Option<[f32; 2]>,
    pub size: Option<[f32; 2]>,
    pub angle: Option<f32>,
    pub role: Option<Role>,
    pub has_sprite: bool,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)?;
        if let (Some(p), Some(s)) = (self.position, self.size) {
            write!(
                f,
                " pos=({:.1}, {:.1}) size=({:.1}, {:.1})",
                p[0], p[1], s[0], s[1]
            )?;
        }
        if let Some(role) = &self.role {
            write!(f, " role={role:?}")?;
        }
        Ok(())
    }
}
