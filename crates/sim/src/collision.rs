use playstage_common::WorldBounds;
use playstage_ecs::Role;
use playstage_kernel::World;
use rand::Rng;

/// What one collision pass did. The two outcomes stay distinguishable:
/// collecting rewards, getting struck penalizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub collected: bool,
    pub struck: bool,
}

/// Resolve player overlaps once.
///
/// Player over collectible: score +1, collectible relocated to a uniformly
/// random position whose AABB stays in bounds. Player over hazard: score
/// reset to zero, player teleported so its AABB is centered on the world
/// center. Overlap is closed-interval, so edge contact triggers both.
pub fn step(
    world: &mut World,
    bounds: WorldBounds,
    score: &mut u32,
    rng: &mut impl Rng,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    let Some(player) = world.find_role(Role::Player) else {
        return report;
    };
    let Some(player_aabb) = world.transform(player).map(|t| t.aabb()) else {
        return report;
    };

    if let Some(collectible) = world.find_role(Role::Collectible) {
        let hit = world.transform(collectible).filter(|t| player_aabb.overlaps(&t.aabb())).copied();
        if let Some(t) = hit {
            *score += 1;
            report.collected = true;
            let max_x = (bounds.width - t.size.x).max(0.0);
            let max_y = (bounds.height - t.size.y).max(0.0);
            let next = glam::Vec2::new(rng.gen_range(0.0..=max_x), rng.gen_range(0.0..=max_y));
            if let Some(t) = world.transform_mut(collectible) {
                t.position = next;
            }
            tracing::info!(score = *score, "collectible gathered");
        }
    }

    if let Some(hazard) = world.find_role(Role::Hazard) {
        let hit = world
            .transform(hazard)
            .is_some_and(|t| player_aabb.overlaps(&t.aabb()));
        if hit {
            *score = 0;
            report.struck = true;
            let center = bounds.center();
            if let Some(t) = world.transform_mut(player) {
                t.set_center(center);
            }
            tracing::info!("player struck, score reset");
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use playstage_common::Transform;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const BOUNDS: WorldBounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };

    fn tagged(world: &mut World, role: Role, pos: Vec2, size: Vec2) -> playstage_common::EntityId {
        let id = world.create();
        world.attach_transform(id, Transform::new(pos, size));
        world.attach_role(id, role);
        id
    }

    #[test]
    fn collect_increments_score_and_relocates_in_bounds() {
        let mut world = World::new();
        tagged(
            &mut world,
            Role::Player,
            Vec2::new(368.0, 268.0),
            Vec2::new(64.0, 64.0),
        );
        let collectible = tagged(
            &mut world,
            Role::Collectible,
            Vec2::new(380.0, 280.0),
            Vec2::new(32.0, 32.0),
        );

        let mut score = 0;
        let mut rng = StdRng::seed_from_u64(42);
        let report = step(&mut world, BOUNDS, &mut score, &mut rng);

        assert!(report.collected);
        assert_eq!(score, 1);
        let p = world.transform(collectible).unwrap().position;
        assert!((0.0..=768.0).contains(&p.x), "x out of range: {}", p.x);
        assert!((0.0..=568.0).contains(&p.y), "y out of range: {}", p.y);
    }

    #[test]
    fn hazard_resets_score_and_centers_player() {
        let mut world = World::new();
        let player = tagged(
            &mut world,
            Role::Player,
            Vec2::new(100.0, 100.0),
            Vec2::new(64.0, 64.0),
        );
        tagged(
            &mut world,
            Role::Hazard,
            Vec2::new(120.0, 120.0),
            Vec2::new(48.0, 48.0),
        );

        let mut score = 5;
        let mut rng = StdRng::seed_from_u64(7);
        let report = step(&mut world, BOUNDS, &mut score, &mut rng);

        assert!(report.struck);
        assert!(!report.collected);
        assert_eq!(score, 0);
        assert_eq!(
            world.transform(player).unwrap().center(),
            Vec2::new(400.0, 300.0)
        );
    }

    #[test]
    fn edge_contact_counts_as_overlap() {
        let mut world = World::new();
        tagged(
            &mut world,
            Role::Player,
            Vec2::new(0.0, 0.0),
            Vec2::new(64.0, 64.0),
        );
        // Right edge of the player exactly touches the collectible's left edge.
        tagged(
            &mut world,
            Role::Collectible,
            Vec2::new(64.0, 0.0),
            Vec2::new(32.0, 32.0),
        );

        let mut score = 0;
        let mut rng = StdRng::seed_from_u64(3);
        let report = step(&mut world, BOUNDS, &mut score, &mut rng);
        assert!(report.collected);
        assert_eq!(score, 1);
    }

    #[test]
    fn no_overlap_no_change() {
        let mut world = World::new();
        tagged(
            &mut world,
            Role::Player,
            Vec2::new(0.0, 0.0),
            Vec2::new(64.0, 64.0),
        );
        tagged(
            &mut world,
            Role::Collectible,
            Vec2::new(700.0, 500.0),
            Vec2::new(32.0, 32.0),
        );

        let mut score = 2;
        let mut rng = StdRng::seed_from_u64(9);
        let report = step(&mut world, BOUNDS, &mut score, &mut rng);
        assert_eq!(report, CollisionReport::default());
        assert_eq!(score, 2);
    }

    #[test]
    fn relocation_is_deterministic_under_a_seed() {
        let positions: Vec<Vec2> = (0..2)
            .map(|_| {
                let mut world = World::new();
                tagged(
                    &mut world,
                    Role::Player,
                    Vec2::new(100.0, 100.0),
                    Vec2::new(64.0, 64.0),
                );
                let collectible = tagged(
                    &mut world,
                    Role::Collectible,
                    Vec2::new(110.0, 110.0),
                    Vec2::new(32.0, 32.0),
                );
                let mut score = 0;
                let mut rng = StdRng::seed_from_u64(1234);
                step(&mut world, BOUNDS, &mut score, &mut rng);
                world.transform(collectible).unwrap().position
            })
            .collect();
        assert_eq!(positions[0], positions[1]);
    }
}
