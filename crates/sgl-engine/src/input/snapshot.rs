use std::collections::HashSet;

use super::frame::InputFrame;
use super::state::InputState;
use super::types::{Key, Modifiers, MouseButton};

/// Immutable copy of the input for one frame, handed to the game.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    keys_released: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    pointer: Option<(f32, f32)>,
    wheel_lines: (f32, f32),
    wheel_pixels: (f32, f32),
    modifiers: Modifiers,
    focused: bool,
    text: String,
}

impl InputSnapshot {
    pub fn capture(state: &InputState, frame: &InputFrame) -> Self {
        Self {
            keys_down: state.keys_down.clone(),
            keys_pressed: frame.keys_pressed.clone(),
            keys_released: frame.keys_released.clone(),
            buttons_down: state.buttons_down.clone(),
            buttons_pressed: frame.buttons_pressed.clone(),
            buttons_released: frame.buttons_released.clone(),
            pointer: state.pointer_pos,
            wheel_lines: frame.wheel_lines,
            wheel_pixels: frame.wheel_pixels,
            modifiers: state.modifiers,
            focused: state.focused,
            text: frame.text.clone(),
        }
    }

    /// Held this frame.
    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Went down since the previous frame (repeats excluded).
    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Pointer position in window pixels, `None` when outside the window.
    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.pointer
    }

    pub fn wheel_lines(&self) -> (f32, f32) {
        self.wheel_lines
    }

    pub fn wheel_pixels(&self) -> (f32, f32) {
        self.wheel_pixels
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Text typed this frame.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonState, InputEvent, WheelDelta};

    fn apply(state: &mut InputState, frame: &mut InputFrame, events: Vec<InputEvent>) {
        for ev in events {
            state.apply_event(frame, ev);
        }
    }

    fn key(key: Key, state: ButtonState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    // ── keys ──────────────────────────────────────────────────────────────

    #[test]
    fn press_hold_release_across_frames() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        apply(&mut state, &mut frame, vec![key(Key::W, ButtonState::Pressed, false)]);
        let first = InputSnapshot::capture(&state, &frame);
        assert!(first.is_key_down(Key::W) && first.is_key_pressed(Key::W));
        frame.clear();

        apply(&mut state, &mut frame, vec![key(Key::W, ButtonState::Pressed, true)]);
        let held = InputSnapshot::capture(&state, &frame);
        assert!(held.is_key_down(Key::W) && !held.is_key_pressed(Key::W));
        frame.clear();

        apply(&mut state, &mut frame, vec![key(Key::W, ButtonState::Released, false)]);
        let released = InputSnapshot::capture(&state, &frame);
        assert!(!released.is_key_down(Key::W) && released.is_key_released(Key::W));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            vec![
                key(Key::A, ButtonState::Pressed, false),
                InputEvent::Button { button: MouseButton::Left, state: ButtonState::Pressed },
                InputEvent::Focused(false),
            ],
        );
        assert!(!state.key_down(Key::A));
        assert!(!state.button_down(MouseButton::Left));
    }

    // ── mouse ─────────────────────────────────────────────────────────────

    #[test]
    fn pointer_wheel_and_text() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        apply(
            &mut state,
            &mut frame,
            vec![
                InputEvent::PointerMoved { x: 3.0, y: 4.0 },
                InputEvent::Wheel(WheelDelta::Lines { x: 0.0, y: 1.0 }),
                InputEvent::Wheel(WheelDelta::Lines { x: 0.0, y: 2.0 }),
                InputEvent::Wheel(WheelDelta::Pixels { x: 5.0, y: 0.0 }),
                InputEvent::Text("hi".into()),
            ],
        );
        let snap = InputSnapshot::capture(&state, &frame);
        assert_eq!(snap.mouse_position(), Some((3.0, 4.0)));
        assert_eq!(snap.wheel_lines(), (0.0, 3.0));
        assert_eq!(snap.wheel_pixels(), (5.0, 0.0));
        assert_eq!(snap.text(), "hi");

        frame.clear();
        state.apply_event(&mut frame, InputEvent::PointerLeft);
        let snap = InputSnapshot::capture(&state, &frame);
        assert_eq!(snap.mouse_position(), None);
        assert_eq!(snap.wheel_lines(), (0.0, 0.0));
    }
}
