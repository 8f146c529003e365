use glam::Vec2;
use std::collections::BTreeSet;

/// Engine-level key identifiers. The windowing layer maps its native codes
/// onto these; anything unmapped simply never shows up as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Tab,
    Delete,
    Backspace,
    Escape,
    R,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A discrete input event delivered by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    PointerMoved(Vec2),
    PointerDown(PointerButton, Vec2),
    PointerUp(PointerButton, Vec2),
}

/// Persistent input state, updated by draining pending events each frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed: BTreeSet<Key>,
    buttons: BTreeSet<PointerButton>,
    pointer: Vec2,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Quit => self.quit = true,
            InputEvent::KeyDown(key) => {
                self.pressed.insert(key);
            }
            InputEvent::KeyUp(key) => {
                self.pressed.remove(&key);
            }
            InputEvent::PointerMoved(pos) => self.pointer = pos,
            InputEvent::PointerDown(button, pos) => {
                self.buttons.insert(button);
                self.pointer = pos;
            }
            InputEvent::PointerUp(button, pos) => {
                self.buttons.remove(&button);
                self.pointer = pos;
            }
        }
    }

    /// Whether `key` is currently held. Keys never seen read as released.
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_button_down(&self, button: PointerButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Last known pointer position in output/screen coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// WASD/arrow steering as a unit-per-axis vector, +Y downward.
    pub fn axis(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.is_pressed(Key::W) || self.is_pressed(Key::Up) {
            v.y -= 1.0;
        }
        if self.is_pressed(Key::S) || self.is_pressed(Key::Down) {
            v.y += 1.0;
        }
        if self.is_pressed(Key::A) || self.is_pressed(Key::Left) {
            v.x -= 1.0;
        }
        if self.is_pressed(Key::D) || self.is_pressed(Key::Right) {
            v.x += 1.0;
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_keys_read_as_released() {
        let state = InputState::new();
        assert!(!state.is_pressed(Key::W));
        assert!(!state.is_button_down(PointerButton::Primary));
        assert!(!state.quit_requested());
    }

    #[test]
    fn key_down_up_round_trip() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyDown(Key::Space));
        assert!(state.is_pressed(Key::Space));
        state.apply(&InputEvent::KeyUp(Key::Space));
        assert!(!state.is_pressed(Key::Space));
    }

    #[test]
    fn pointer_events_track_position_and_buttons() {
        let mut state = InputState::new();
        state.apply(&InputEvent::PointerDown(
            PointerButton::Primary,
            Vec2::new(100.0, 50.0),
        ));
        assert!(state.is_button_down(PointerButton::Primary));
        assert_eq!(state.pointer(), Vec2::new(100.0, 50.0));

        state.apply(&InputEvent::PointerMoved(Vec2::new(120.0, 60.0)));
        assert_eq!(state.pointer(), Vec2::new(120.0, 60.0));

        state.apply(&InputEvent::PointerUp(
            PointerButton::Primary,
            Vec2::new(120.0, 60.0),
        ));
        assert!(!state.is_button_down(PointerButton::Primary));
    }

    #[test]
    fn quit_is_sticky() {
        let mut state = InputState::new();
        state.apply(&InputEvent::Quit);
        state.apply(&InputEvent::KeyDown(Key::W));
        assert!(state.quit_requested());
    }

    #[test]
    fn axis_combines_opposing_keys() {
        let mut state = InputState::new();
        state.apply(&InputEvent::KeyDown(Key::W));
        state.apply(&InputEvent::KeyDown(Key::D));
        assert_eq!(state.axis(), Vec2::new(1.0, -1.0));

        state.apply(&InputEvent::KeyDown(Key::Left));
        assert_eq!(state.axis().x, 0.0);
    }
}
