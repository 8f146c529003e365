use glam::Vec2;
use playstage_ecs::Role;
use playstage_kernel::World;

/// Pursuer speed in world units per second.
pub const PURSUIT_SPEED: f32 = 100.0;

/// Below this separation the pursuer holds still instead of normalizing a
/// near-zero direction vector.
pub const EPSILON: f32 = 1e-3;

/// Steer the hazard toward the player's AABB center at a fixed speed.
///
/// Roles come from the explicit `Role` tag. Missing either role is a no-op;
/// a separation below `EPSILON` is a no-op as well, so the step never
/// divides by zero or produces NaN.
pub fn step(world: &mut World, dt: f32) {
    let Some(player) = world.find_role(Role::Player) else {
        return;
    };
    let Some(hazard) = world.find_role(Role::Hazard) else {
        return;
    };

    let Some(target) = world.transform(player).map(|t| t.center()) else {
        return;
    };
    let Some(t) = world.transform_mut(hazard) else {
        return;
    };

    let delta: Vec2 = target - t.center();
    let dist = delta.length();
    if dist <= EPSILON {
        return;
    }
    t.position += delta / dist * PURSUIT_SPEED * dt;
}
