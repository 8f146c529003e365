//! Backend-agnostic input model.
//!
//! The engine loop consumes `InputEvent`s and keeps an `InputState`; the
//! windowing layer translates its native events into this vocabulary.
//!
//! # Invariants
//! - "Is this key pressed" always has a defined answer: unbound or
//!   never-seen keys read as not-pressed, never as an error.

pub mod state;

pub use state::{InputEvent, InputState, Key, PointerButton};
