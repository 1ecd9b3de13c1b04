use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Transitions collected since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
    /// Accumulated `(x, y)` wheel lines.
    pub wheel_lines: (f32, f32),
    /// Accumulated `(x, y)` wheel pixels.
    pub wheel_pixels: (f32, f32),
    pub text: String,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel_lines = (0.0, 0.0);
        self.wheel_pixels = (0.0, 0.0);
        self.text.clear();
    }
}
