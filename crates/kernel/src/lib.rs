//! Scene kernel: authoritative world state.
//!
//! # Invariants
//! - Entity ids are nonzero, strictly increasing, and never reused, even
//!   after destruction or a scene reset.
//! - All lookups on absent entities return `None`; staleness is a normal
//!   outcome, never an error.

pub mod world;

pub use world::World;
