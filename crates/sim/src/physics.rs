use playstage_common::WorldBounds;
use playstage_kernel::World;

/// Advance every Transform+Velocity entity by `velocity * dt`, then clamp
/// its AABB fully inside the world bounds.
///
/// The clamp runs strictly after the unclamped update: left/top edges first,
/// right/bottom last, so an out-of-range result lands exactly on the
/// boundary, never beyond it.
pub fn step(world: &mut World, bounds: WorldBounds, dt: f32) {
    for id in world.all() {
        let Some(v) = world.velocity(id).copied() else {
            continue;
        };
        let Some(t) = world.transform_mut(id) else {
            continue;
        };

        t.position.x += v.vx * dt;
        t.position.y += v.vy * dt;

        if t.position.x < 0.0 {
            t.position.x = 0.0;
        }
        if t.position.y < 0.0 {
            t.position.y = 0.0;
        }
        if t.position.x + t.size.x > bounds.width {
            t.position.x = bounds.width - t.size.x;
        }
        if t.position.y + t.size.y > bounds.height {
            t.position.y = bounds.height - t.size.y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use playstage_common::Transform;
    use playstage_ecs::Velocity;

    const BOUNDS: WorldBounds = WorldBounds {
        width: 800.0,
        height: 600.0,
    };

    fn mover(world: &mut World, pos: Vec2, size: Vec2, v: Velocity) -> playstage_common::EntityId {
        let id = world.create();
        world.attach_transform(id, Transform::new(pos, size));
        world.attach_velocity(id, v);
        id
    }

    #[test]
    fn velocity_advances_position() {
        let mut world = World::new();
        let id = mover(
            &mut world,
            Vec2::new(10.0, 20.0),
            Vec2::new(8.0, 8.0),
            Velocity::new(3.0, -2.0),
        );
        step(&mut world, BOUNDS, 2.0);
        assert_eq!(world.transform(id).unwrap().position, Vec2::new(16.0, 16.0));
    }

    #[test]
    fn overshoot_lands_exactly_on_boundary() {
        let mut world = World::new();
        let id = mover(
            &mut world,
            Vec2::new(790.0, 0.0),
            Vec2::new(8.0, 8.0),
            Velocity::new(1000.0, 0.0),
        );
        step(&mut world, BOUNDS, 1.0);
        assert_eq!(world.transform(id).unwrap().position.x, 800.0 - 8.0);
    }

    #[test]
    fn negative_overshoot_clamps_to_zero() {
        let mut world = World::new();
        let id = mover(
            &mut world,
            Vec2::new(5.0, 5.0),
            Vec2::new(8.0, 8.0),
            Velocity::new(-100.0, -100.0),
        );
        step(&mut world, BOUNDS, 1.0);
        assert_eq!(world.transform(id).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn aabb_contained_for_any_nonnegative_dt() {
        let mut world = World::new();
        let id = mover(
            &mut world,
            Vec2::new(400.0, 300.0),
            Vec2::new(16.0, 16.0),
            Velocity::new(123.0, -456.0),
        );
        for dt in [0.0, 0.016, 0.5, 3.0, 1000.0] {
            step(&mut world, BOUNDS, dt);
            let aabb = world.transform(id).unwrap().aabb();
            assert!(BOUNDS.contains_aabb(&aabb), "escaped at dt={dt}");
        }
    }

    #[test]
    fn zero_dt_is_identity_inside_bounds() {
        let mut world = World::new();
        let id = mover(
            &mut world,
            Vec2::new(100.0, 100.0),
            Vec2::new(10.0, 10.0),
            Velocity::new(50.0, 50.0),
        );
        step(&mut world, BOUNDS, 0.0);
        assert_eq!(
            world.transform(id).unwrap().position,
            Vec2::new(100.0, 100.0)
        );
    }

    #[test]
    fn entities_without_velocity_do_not_move() {
        let mut world = World::new();
        let id = world.create();
        world.attach_transform(
            id,
            Transform::new(Vec2::new(50.0, 50.0), Vec2::new(4.0, 4.0)),
        );
        step(&mut world, BOUNDS, 1.0);
        assert_eq!(world.transform(id).unwrap().position, Vec2::new(50.0, 50.0));
    }
}
