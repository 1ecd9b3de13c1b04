use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};

/// Held keys/buttons and pointer position of the window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
    pub focused: bool,
    pub pointer_pos: Option<(f32, f32)>,
    pub keys_down: HashSet<Key>,
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Folds `ev` into the held state and records transitions in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::Modifiers(m) => self.modifiers = m,

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases are not delivered to an unfocused window.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((x, y)),
            InputEvent::PointerLeft => self.pointer_pos = None,

            InputEvent::Key { key, state, repeat } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(key) && !repeat {
                        frame.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    if self.keys_down.remove(&key) {
                        frame.keys_released.insert(key);
                    }
                }
            },

            InputEvent::Button { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_down.insert(button) {
                        frame.buttons_pressed.insert(button);
                    }
                }
                ButtonState::Released => {
                    if self.buttons_down.remove(&button) {
                        frame.buttons_released.insert(button);
                    }
                }
            },

            InputEvent::Wheel(WheelDelta::Lines { x, y }) => {
                frame.wheel_lines.0 += x;
                frame.wheel_lines.1 += y;
            }
            InputEvent::Wheel(WheelDelta::Pixels { x, y }) => {
                frame.wheel_pixels.0 += x;
                frame.wheel_pixels.1 += y;
            }

            InputEvent::Text(text) => frame.text.push_str(&text),
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }
}
