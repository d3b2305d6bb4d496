use std::fmt;

/// Keyboard key identifier.
///
/// Every key has a stable integer [`Key::code`] used to index the GUI's
/// pressed-key table. Letters and digits use their ASCII value; named keys
/// follow the 256+ range common to desktop windowing APIs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Space,
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,

    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,
    PageUp,
    PageDown,
    Home,
    End,

    ShiftLeft,
    ControlLeft,
    AltLeft,
    SuperLeft,
    ShiftRight,
    ControlRight,
    AltRight,
    SuperRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Key without a stable code. Never reaches the pressed-key table.
    Unknown,
}

const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
    Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
];

const FUNCTION: [Key; 12] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

impl Key {
    /// Stable integer code, or `-1` for [`Key::Unknown`].
    pub fn code(self) -> i32 {
        if let Some(i) = LETTERS.iter().position(|&k| k == self) {
            return 'A' as i32 + i as i32;
        }
        if let Some(i) = DIGITS.iter().position(|&k| k == self) {
            return '0' as i32 + i as i32;
        }
        if let Some(i) = FUNCTION.iter().position(|&k| k == self) {
            return 290 + i as i32;
        }

        match self {
            Key::Space => 32,
            Key::Escape => 256,
            Key::Enter => 257,
            Key::Tab => 258,
            Key::Backspace => 259,
            Key::Insert => 260,
            Key::Delete => 261,
            Key::ArrowRight => 262,
            Key::ArrowLeft => 263,
            Key::ArrowDown => 264,
            Key::ArrowUp => 265,
            Key::PageUp => 266,
            Key::PageDown => 267,
            Key::Home => 268,
            Key::End => 269,
            Key::ShiftLeft => 340,
            Key::ControlLeft => 341,
            Key::AltLeft => 342,
            Key::SuperLeft => 343,
            Key::ShiftRight => 344,
            Key::ControlRight => 345,
            Key::AltRight => 346,
            Key::SuperRight => 347,
            _ => -1,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Key or button transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Press,
    Release,
    /// Auto-repeat while held. Leaves pressed state unchanged.
    Repeat,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// Index into the GUI's pressed-button table. `Other` buttons land past
    /// the tracked range.
    pub fn index(self) -> i32 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(n) => 5 + i32::from(n),
        }
    }
}

/// Platform-agnostic input events emitted by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, action: Action },
    /// Committed text, one scalar value per event.
    Char(char),
    MouseButton { button: MouseButton, action: Action },
    /// Wheel delta in lines. `dx` is horizontal, `dy` vertical.
    Scroll { dx: f64, dy: f64 },
    /// Pointer position in logical window pixels.
    CursorMoved { x: f64, y: f64 },
    /// Pointer left the window.
    CursorLeft,
    Focused(bool),
}
