//! Shared vocabulary types for the playstage engine.
//!
//! # Invariants
//! - `EntityId` values are nonzero and strictly increasing per world.
//! - `Rect` overlap and containment use closed intervals; edge contact counts.

pub mod types;

pub use types::{Color, EntityId, Rect, TextureHandle, Transform, WorldBounds};
