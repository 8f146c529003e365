//! In-place editing surface.
//!
//! Pointer gestures measured in output/screen space over the last panel
//! rectangle the renderer bridge drew are mapped back into world space and
//! applied to the world: select, drag, delete.
//!
//! # Invariants
//! - The selection is always empty or names a currently-live entity.
//! - Deleting the selected entity clears the selection atomically with the
//!   destroy call.
//! - No bounds clamp is applied while dragging; clamping is exclusively the
//!   physics system's responsibility.

pub mod editor;
pub mod scene;

pub use editor::{EditorSurface, PanelView};
pub use scene::{DemoRoster, spawn_demo_scene};
