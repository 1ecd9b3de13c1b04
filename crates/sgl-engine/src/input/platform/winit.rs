use winit::event::{
    ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::input::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};

/// Translates a winit `WindowEvent` into engine `InputEvent`s, passing each to
/// `emit`. Events the input subsystem does not track are ignored.
///
/// Positions stay in physical pixels, matching the projection viewport.
pub(crate) fn translate_window_event(event: &WindowEvent, mut emit: impl FnMut(InputEvent)) {
    match event {
        WindowEvent::ModifiersChanged(m) => emit(InputEvent::Modifiers(map_modifiers(m.state()))),
        WindowEvent::Focused(f) => emit(InputEvent::Focused(*f)),
        WindowEvent::CursorLeft { .. } => emit(InputEvent::PointerLeft),
        WindowEvent::CursorMoved { position, .. } => emit(InputEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => emit(InputEvent::Button {
            button: map_mouse_button(*button),
            state: map_state(*state),
        }),
        WindowEvent::MouseWheel { delta, .. } => emit(InputEvent::Wheel(match *delta {
            MouseScrollDelta::LineDelta(x, y) => WheelDelta::Lines { x, y },
            MouseScrollDelta::PixelDelta(p) => WheelDelta::Pixels {
                x: p.x as f32,
                y: p.y as f32,
            },
        })),
        WindowEvent::KeyboardInput { event, .. } => {
            emit(InputEvent::Key {
                key: map_key(event.physical_key),
                state: map_state(event.state),
                repeat: event.repeat,
            });
            if event.state == ElementState::Pressed {
                if let Some(text) = event.text.as_ref().filter(|t| !t.chars().any(char::is_control)) {
                    emit(InputEvent::Text(text.to_string()));
                }
            }
        }
        WindowEvent::Ime(Ime::Commit(text)) if !text.is_empty() => {
            emit(InputEvent::Text(text.clone()))
        }
        _ => {}
    }
}

fn map_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        shift: m.shift_key(),
        ctrl: m.control_key(),
        alt: m.alt_key(),
        logo: m.super_key(),
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

macro_rules! key_table {
    ($code:expr; $($from:ident => $to:ident),* $(,)?) => {
        match $code {
            $(KeyCode::$from => Key::$to,)*
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
            KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
            KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
            KeyCode::SuperLeft | KeyCode::SuperRight => Key::Super,
            other => Key::Unknown(other as u32),
        }
    };
}

pub(crate) fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown(0);
    };
    key_table! { code;
        Escape => Escape, Enter => Enter, Tab => Tab, Backspace => Backspace, Space => Space,
        Insert => Insert, Delete => Delete, Home => Home, End => End,
        PageUp => PageUp, PageDown => PageDown,
        ArrowUp => Up, ArrowDown => Down, ArrowLeft => Left, ArrowRight => Right,
        KeyA => A, KeyB => B, KeyC => C, KeyD => D, KeyE => E, KeyF => F, KeyG => G,
        KeyH => H, KeyI => I, KeyJ => J, KeyK => K, KeyL => L, KeyM => M, KeyN => N,
        KeyO => O, KeyP => P, KeyQ => Q, KeyR => R, KeyS => S, KeyT => T, KeyU => U,
        KeyV => V, KeyW => W, KeyX => X, KeyY => Y, KeyZ => Z,
        Digit0 => Num0, Digit1 => Num1, Digit2 => Num2, Digit3 => Num3, Digit4 => Num4,
        Digit5 => Num5, Digit6 => Num6, Digit7 => Num7, Digit8 => Num8, Digit9 => Num9,
        Minus => Minus, Equal => Equal, Comma => Comma, Period => Period, Slash => Slash,
        Semicolon => Semicolon, Quote => Quote, BracketLeft => LeftBracket,
        BracketRight => RightBracket, Backslash => Backslash, Backquote => Grave,
        F1 => F1, F2 => F2, F3 => F3, F4 => F4, F5 => F5, F6 => F6,
        F7 => F7, F8 => F8, F9 => F9, F10 => F10, F11 => F11, F12 => F12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_letters_arrows_and_sided_modifiers() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowLeft)), Key::Left);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), Key::Shift);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Num7);
        assert!(matches!(
            map_key(PhysicalKey::Code(KeyCode::NumpadAdd)),
            Key::Unknown(_)
        ));
    }
}
