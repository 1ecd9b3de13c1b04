use std::fmt;

/// Keyboard key identifier, independent of the windowing backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Up,
    Down,
    Left,
    Right,

    Shift,
    Control,
    Alt,
    Super,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Num0, Num1, Num2, Num3, Num4,
    Num5, Num6, Num7, Num8, Num9,

    Minus,
    Equal,
    Comma,
    Period,
    Slash,
    Semicolon,
    Quote,
    LeftBracket,
    RightBracket,
    Backslash,
    Grave,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// A key without a variant; carries the backend's code when it has one.
    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.logo
    }
}

/// Scroll amount. `Lines` comes from notched wheels, `Pixels` from touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Lines { x: f32, y: f32 },
    Pixels { x: f32, y: f32 },
}

/// Backend-independent input events, as translated by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Modifiers(Modifiers),
    Key {
        key: Key,
        state: ButtonState,
        repeat: bool,
    },
    /// Pointer position in window pixels, origin top-left.
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    Button {
        button: MouseButton,
        state: ButtonState,
    },
    Wheel(WheelDelta),
    /// Committed text input.
    Text(String),
    Focused(bool),
}
