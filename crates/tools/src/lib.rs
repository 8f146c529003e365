//! Developer tooling: read-only queries against the scene state for
//! debugging and the CLI.
//!
//! # Invariants
//! - Tools never mutate the world.

pub mod inspector;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
