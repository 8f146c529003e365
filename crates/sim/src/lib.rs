//! Per-frame simulation systems.
//!
//! Each system is a pure mutator over `World` state, invoked once per
//! simulated frame in a fixed order: physics, then pursuit steering, then
//! collision resolution.
//!
//! # Invariants
//! - Physics clamps strictly after the unclamped update, so an out-of-range
//!   result lands exactly on the world boundary.
//! - Pursuit steering short-circuits below a small separation, never
//!   producing NaN.
//! - Collision uses closed-interval AABB overlap; edge contact counts.

pub mod collision;
pub mod physics;
pub mod pursuit;

pub use collision::{CollisionReport, step as collision_step};
pub use physics::step as physics_step;
pub use pursuit::{EPSILON, PURSUIT_SPEED, step as pursuit_step};

use playstage_common::WorldBounds;
use playstage_kernel::World;
use rand::Rng;

/// Run one simulated frame: physics, pursuit, collision, in that order.
pub fn run_frame(
    world: &mut World,
    bounds: WorldBounds,
    dt: f32,
    score: &mut u32,
    rng: &mut impl Rng,
) -> CollisionReport {
    physics::step(world, bounds, dt);
    pursuit::step(world, dt);
    collision::step(world, bounds, score, rng)
}
