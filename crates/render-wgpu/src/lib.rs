//! wgpu backend for the draw-surface abstraction.
//!
//! Renders filled rectangles and textured quads through one instanced 2D
//! pipeline. The active viewport/scale state is applied on the CPU when a
//! draw is recorded; `present` flushes the recorded quads in order with
//! per-quad scissor clipping.
//!
//! # Invariants
//! - The surface never mutates world state.
//! - Creation is the only fatal path; a lost or outdated swapchain frame is
//!   reconfigured and skipped, never propagated.

mod shaders;
mod surface;

pub use surface::{SurfaceError, WgpuSurface};
