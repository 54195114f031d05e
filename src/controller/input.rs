//! Platform-agnostic input handling
//!
//! Both hosts (DOM on wasm32, winit on native) normalize their events into
//! [`InputEvent`] carrying DOM `KeyboardEvent.key` names, and a single
//! [`InputController`] turns those into [`InputState`] transitions.

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click,
    KeyDown(String),
    KeyUp(String),
}

/// Directional intent. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

/// What the frame scheduler reads once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    pub is_animated: bool,
    pub direction: Direction,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_animation(&mut self) {
        self.is_animated = !self.is_animated;
    }
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub animate: String,
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            animate: " ".to_string(),
            up: "ArrowUp".to_string(),
            down: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
        }
    }
}

/// Applies input events to an [`InputState`].
///
/// Animation: a click flips it, the animate key forces it on while held and
/// off on release. Clicks and the key race freely; whichever came last wins.
///
/// Direction: a direction key-down replaces the current intent. Any key-up,
/// even of an unrelated key, drops the intent back to `None`.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    bindings: KeyBindings,
}

impl InputController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Keys outside the bindings map to `None` and are ignored.
    pub fn direction_from_key(&self, key: &str) -> Option<Direction> {
        let b = &self.bindings;
        if key == b.up {
            Some(Direction::Up)
        } else if key == b.down {
            Some(Direction::Down)
        } else if key == b.left {
            Some(Direction::Left)
        } else if key == b.right {
            Some(Direction::Right)
        } else {
            None
        }
    }

    pub fn is_animate_key(&self, key: &str) -> bool {
        key == self.bindings.animate
    }

    /// Keys whose browser default (scrolling) should be suppressed.
    pub fn is_bound(&self, key: &str) -> bool {
        self.is_animate_key(key) || self.direction_from_key(key).is_some()
    }

    /// Process an input event and update state
    pub fn handle(&self, state: &mut InputState, event: &InputEvent) {
        match event {
            InputEvent::Click => {
                state.toggle_animation();
                tracing::debug!(animated = state.is_animated, "click toggled animation");
            }
            InputEvent::KeyDown(key) => {
                if self.is_animate_key(key) && !state.is_animated {
                    state.is_animated = true;
                    tracing::debug!("animation on");
                }
                if let Some(direction) = self.direction_from_key(key) {
                    if state.direction != direction {
                        tracing::debug!(?direction, "direction set");
                    }
                    state.direction = direction;
                }
            }
            InputEvent::KeyUp(key) => {
                if self.is_animate_key(key) && state.is_animated {
                    state.is_animated = false;
                    tracing::debug!("animation off");
                }
                state.direction = Direction::None;
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::InputEvent;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::InputEvent;
    use winit::event::{ElementState, KeyEvent, MouseButton};
    use winit::keyboard::{Key, NamedKey};

    /// DOM-style name for a winit logical key, so one set of bindings serves both hosts.
    pub fn key_name(key: &Key) -> Option<String> {
        match key {
            Key::Named(NamedKey::ArrowUp) => Some("ArrowUp".to_string()),
            Key::Named(NamedKey::ArrowDown) => Some("ArrowDown".to_string()),
            Key::Named(NamedKey::ArrowLeft) => Some("ArrowLeft".to_string()),
            Key::Named(NamedKey::ArrowRight) => Some("ArrowRight".to_string()),
            Key::Named(NamedKey::Space) => Some(" ".to_string()),
            Key::Named(NamedKey::Escape) => Some("Escape".to_string()),
            Key::Named(NamedKey::Enter) => Some("Enter".to_string()),
            Key::Named(NamedKey::Shift) => Some("Shift".to_string()),
            Key::Named(NamedKey::Control) => Some("Control".to_string()),
            Key::Character(s) => Some(s.to_string()),
            _ => None,
        }
    }

    pub fn keyboard_event_to_input(event: &KeyEvent) -> InputEvent {
        // Unnamed keys still count as a key-up, so they get the DOM placeholder name
        let key = key_name(&event.logical_key).unwrap_or_else(|| "Unidentified".to_string());
        match event.state {
            ElementState::Pressed => InputEvent::KeyDown(key),
            ElementState::Released => InputEvent::KeyUp(key),
        }
    }

    /// A click is a completed left-button press, as in the DOM.
    pub fn mouse_input_to_input(state: ElementState, button: MouseButton) -> Option<InputEvent> {
        match (state, button) {
            (ElementState::Released, MouseButton::Left) => Some(InputEvent::Click),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(key: &str) -> InputEvent {
        InputEvent::KeyDown(key.to_string())
    }

    fn up(key: &str) -> InputEvent {
        InputEvent::KeyUp(key.to_string())
    }

    #[test]
    fn click_flips_and_two_clicks_restore() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &InputEvent::Click);
        assert!(state.is_animated);
        ctl.handle(&mut state, &InputEvent::Click);
        assert!(!state.is_animated);
    }

    #[test]
    fn animate_key_forces_on_then_off() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &down(" "));
        ctl.handle(&mut state, &down(" "));
        assert!(state.is_animated, "held key keeps animation on");
        ctl.handle(&mut state, &up(" "));
        assert!(!state.is_animated);
    }

    #[test]
    fn click_and_key_race_last_writer_wins() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &down(" "));
        ctl.handle(&mut state, &InputEvent::Click);
        assert!(!state.is_animated);
        ctl.handle(&mut state, &down(" "));
        assert!(state.is_animated);
    }

    #[test]
    fn later_direction_overwrites_earlier() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &down("ArrowRight"));
        assert_eq!(state.direction, Direction::Right);
        ctl.handle(&mut state, &down("ArrowLeft"));
        assert_eq!(state.direction, Direction::Left);
        ctl.handle(&mut state, &up("ArrowRight"));
        assert_eq!(state.direction, Direction::None);
    }

    #[test]
    fn unrelated_key_up_cancels_direction() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &down("ArrowUp"));
        ctl.handle(&mut state, &up("q"));
        assert_eq!(state.direction, Direction::None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let ctl = InputController::default();
        let mut state = InputState::new();
        ctl.handle(&mut state, &down("ArrowDown"));
        ctl.handle(&mut state, &down("x"));
        assert_eq!(state.direction, Direction::Down);
        assert!(!state.is_animated);
        assert_eq!(ctl.direction_from_key("PageUp"), None);
    }

    #[test]
    fn custom_bindings_are_honored() {
        let ctl = InputController::new(KeyBindings {
            animate: "a".into(),
            up: "w".into(),
            ..KeyBindings::default()
        });
        let mut state = InputState::new();
        ctl.handle(&mut state, &down("w"));
        ctl.handle(&mut state, &down("a"));
        assert_eq!(state, InputState { is_animated: true, direction: Direction::Up });
        assert!(!ctl.is_bound(" "));
        assert!(ctl.is_bound("ArrowLeft"));
    }
}
