//! Renderer bridge: draws the whole world into an arbitrary target
//! rectangle via viewport substitution.
//!
//! One routine serves both the full-window draw and a shrunk editor-panel
//! draw. Panel-specific behavior flows solely through the surface's
//! substituted viewport/scale state; the draw code itself works in world
//! coordinates only.
//!
//! # Invariants
//! - `draw_world_into` is state-neutral: viewport and scale after the call
//!   equal their values before it, on every exit path.
//! - Entity draws never read the target rectangle.
//! - A zero-area target is a no-op, never an undefined scale.

mod bridge;
mod surface;

pub use bridge::{SceneRenderer, ViewportScope};
pub use surface::{DrawSurface, RecordingSurface, SurfaceOp};
