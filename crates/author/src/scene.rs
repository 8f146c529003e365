use crate::editor::EditorSurface;
use glam::Vec2;
use playstage_assets::TextureCache;
use playstage_common::{EntityId, Transform, WorldBounds};
use playstage_ecs::{Role, Sprite, Velocity};
use playstage_kernel::World;
use rand::Rng;
use std::path::Path;

const PLAYER_SIZE: f32 = 64.0;
const COLLECTIBLE_SIZE: f32 = 32.0;
const HAZARD_SIZE: f32 = 48.0;

/// Ids of the three demo entities, in creation order.
#[derive(Debug, Clone, Copy)]
pub struct DemoRoster {
    pub player: EntityId,
    pub collectible: EntityId,
    pub hazard: EntityId,
}

/// Reset the world and spawn the demo scene: a steerable player, a
/// collectible, and a pursuing hazard.
///
/// Clears the editor selection before the reset so no stage can observe a
/// selection naming a dead id. Textures are looked up under `asset_dir`;
/// missing files degrade to placeholder rectangles.
pub fn spawn_demo_scene(
    world: &mut World,
    editor: &mut EditorSurface,
    cache: &mut TextureCache,
    asset_dir: &Path,
    bounds: WorldBounds,
    rng: &mut impl Rng,
) -> DemoRoster {
    editor.clear_selection();
    world.reset();

    let player = world.create();
    let mut player_transform =
        Transform::new(Vec2::ZERO, Vec2::new(PLAYER_SIZE, PLAYER_SIZE));
    player_transform.set_center(bounds.center());
    world.attach_transform(player, player_transform);
    world.attach_sprite(
        player,
        Sprite::with_texture(cache.load(asset_dir.join("player.png"))),
    );
    world.attach_velocity(player, Velocity::default());
    world.attach_role(player, Role::Player);

    let collectible = world.create();
    world.attach_transform(
        collectible,
        Transform::new(
            random_position(bounds, COLLECTIBLE_SIZE, rng),
            Vec2::new(COLLECTIBLE_SIZE, COLLECTIBLE_SIZE),
        ),
    );
    world.attach_sprite(
        collectible,
        Sprite::with_texture(cache.load(asset_dir.join("collectible.png"))),
    );
    world.attach_role(collectible, Role::Collectible);

    let hazard = world.create();
    world.attach_transform(
        hazard,
        Transform::new(
            random_position(bounds, HAZARD_SIZE, rng),
            Vec2::new(HAZARD_SIZE, HAZARD_SIZE),
        ),
    );
    world.attach_sprite(
        hazard,
        Sprite::with_texture(cache.load(asset_dir.join("hazard.png"))),
    );
    world.attach_role(hazard, Role::Hazard);

    tracing::info!(entities = world.entity_count(), "demo scene spawned");
    DemoRoster {
        player,
        collectible,
        hazard,
    }
}

fn random_position(bounds: WorldBounds, size: f32, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen_range(0.0..=(bounds.width - size).max(0.0)),
        rng.gen_range(0.0..=(bounds.height - size).max(0.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BOUNDS: WorldBounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };

    fn spawn(world: &mut World, editor: &mut EditorSurface) -> DemoRoster {
        let mut cache = TextureCache::new();
        let mut rng = StdRng::seed_from_u64(5);
        spawn_demo_scene(
            world,
            editor,
            &mut cache,
            Path::new("assets"),
            BOUNDS,
            &mut rng,
        )
    }

    #[test]
    fn spawns_three_tagged_entities_in_bounds() {
        let mut world = World::new();
        let mut editor = EditorSurface::new();
        let roster = spawn(&mut world, &mut editor);

        assert_eq!(world.entity_count(), 3);
        assert_eq!(world.role(roster.player), Some(Role::Player));
        assert_eq!(world.role(roster.collectible), Some(Role::Collectible));
        assert_eq!(world.role(roster.hazard), Some(Role::Hazard));

        for id in world.all() {
            let aabb = world.transform(id).unwrap().aabb();
            assert!(BOUNDS.contains_aabb(&aabb));
        }
    }

    #[test]
    fn player_is_centered_and_steerable() {
        let mut world = World::new();
        let mut editor = EditorSurface::new();
        let roster = spawn(&mut world, &mut editor);

        assert_eq!(
            world.transform(roster.player).unwrap().center(),
            BOUNDS.center()
        );
        assert!(world.velocity(roster.player).is_some());
    }

    #[test]
    fn missing_textures_degrade_to_placeholders() {
        let mut world = World::new();
        let mut editor = EditorSurface::new();
        let roster = spawn(&mut world, &mut editor);
        // No asset files exist in the test environment.
        assert!(world.sprite(roster.player).unwrap().texture.is_none());
    }

    #[test]
    fn respawn_clears_selection_and_keeps_ids_fresh() {
        let mut world = World::new();
        let mut editor = EditorSurface::new();
        let first = spawn(&mut world, &mut editor);
        editor.select(first.player);

        let second = spawn(&mut world, &mut editor);
        assert_eq!(editor.selection(), None);
        assert!(second.player > first.hazard);
        assert!(!world.contains(first.player));
    }
}
