use nabu_gui::{ClipboardBackend, MouseCursor};
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, CursorIcon, Window};

use super::{ArboardClipboard, CursorMode, Platform};
use crate::input::{Action, InputEvent, Key, MouseButton};

/// Logical pixels per wheel line for high-precision (touchpad) scrolling.
const PIXELS_PER_LINE: f64 = 20.0;

/// Window facts winit only reports through events.
#[derive(Debug, Default)]
pub struct PlatformState {
    cursor_pos: Option<(f64, f64)>,
    focused: bool,
    cursor_mode: CursorMode,
}

impl PlatformState {
    pub fn new(window: &Window) -> Self {
        Self {
            focused: window.has_focus(),
            ..Self::default()
        }
    }

    /// Tracks pointer position and focus from translated events.
    pub fn observe(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::CursorMoved { x, y } => self.cursor_pos = Some((x, y)),
            InputEvent::CursorLeft => self.cursor_pos = None,
            InputEvent::Focused(f) => self.focused = f,
            _ => {}
        }
    }
}

/// [`Platform`] over a winit window for the duration of one callback.
pub struct WinitPlatform<'a> {
    window: &'a Window,
    state: &'a mut PlatformState,
}

impl<'a> WinitPlatform<'a> {
    pub fn new(window: &'a Window, state: &'a mut PlatformState) -> Self {
        Self { window, state }
    }
}

impl Platform for WinitPlatform<'_> {
    type Cursor = CursorIcon;

    fn window_size(&self) -> (u32, u32) {
        let logical: LogicalSize<f64> = self.window.inner_size().to_logical(self.window.scale_factor());
        (logical.width.round() as u32, logical.height.round() as u32)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn is_focused(&self) -> bool {
        self.state.focused
    }

    fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.state.cursor_pos
    }

    fn set_cursor_pos(&mut self, x: f64, y: f64) {
        match self.window.set_cursor_position(LogicalPosition::new(x, y)) {
            Ok(()) => self.state.cursor_pos = Some((x, y)),
            Err(e) => log::debug!("set_cursor_position unsupported: {e}"),
        }
    }

    fn cursor_mode(&self) -> CursorMode {
        self.state.cursor_mode
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        if self.state.cursor_mode == mode {
            return;
        }
        self.state.cursor_mode = mode;

        let grab = match mode {
            CursorMode::Normal | CursorMode::Hidden => CursorGrabMode::None,
            CursorMode::Disabled => CursorGrabMode::Locked,
        };
        self.window.set_cursor_visible(mode == CursorMode::Normal);

        if let Err(e) = self.window.set_cursor_grab(grab) {
            if mode == CursorMode::Disabled {
                // Not every platform can lock; confining is the closest fallback.
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::Confined) {
                    log::debug!("cursor grab unsupported: {e}");
                }
            } else {
                log::debug!("cursor release failed: {e}");
            }
        }
    }

    fn create_standard_cursor(&mut self, shape: MouseCursor) -> Option<CursorIcon> {
        let icon = match shape {
            MouseCursor::None => return None,
            MouseCursor::Arrow => CursorIcon::Default,
            MouseCursor::TextInput => CursorIcon::Text,
            MouseCursor::ResizeAll => CursorIcon::Move,
            MouseCursor::ResizeNS => CursorIcon::NsResize,
            MouseCursor::ResizeEW => CursorIcon::EwResize,
            MouseCursor::ResizeNESW => CursorIcon::NeswResize,
            MouseCursor::ResizeNWSE => CursorIcon::NwseResize,
            MouseCursor::Hand => CursorIcon::Pointer,
            MouseCursor::NotAllowed => CursorIcon::NotAllowed,
        };
        Some(icon)
    }

    fn set_cursor(&mut self, cursor: &CursorIcon) {
        self.window.set_cursor(*cursor);
    }

    fn destroy_cursor(&mut self, _cursor: CursorIcon) {}

    fn create_clipboard(&mut self) -> Option<Box<dyn ClipboardBackend>> {
        ArboardClipboard::new().map(|c| Box::new(c) as Box<dyn ClipboardBackend>)
    }
}

/// Translates a winit `WindowEvent` into zero or more engine events appended to `out`.
///
/// A key press carrying text yields the key event followed by one
/// [`InputEvent::Char`] per printable character.
pub fn translate_window_event(window: &Window, event: &WindowEvent, out: &mut Vec<InputEvent>) {
    match event {
        WindowEvent::Focused(f) => out.push(InputEvent::Focused(*f)),

        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(window, *position);
            out.push(InputEvent::CursorMoved { x, y });
        }

        WindowEvent::CursorLeft { .. } => out.push(InputEvent::CursorLeft),

        WindowEvent::MouseInput { state, button, .. } => {
            out.push(InputEvent::MouseButton {
                button: map_mouse_button(*button),
                action: map_state(*state, false),
            });
        }

        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (f64::from(*x), f64::from(*y)),
                MouseScrollDelta::PixelDelta(p) => {
                    let (x, y) = to_logical(window, *p);
                    (x / PIXELS_PER_LINE, y / PIXELS_PER_LINE)
                }
            };
            out.push(InputEvent::Scroll { dx, dy });
        }

        WindowEvent::KeyboardInput { event, .. } => {
            out.push(InputEvent::Key {
                key: map_key(event.physical_key),
                action: map_state(event.state, event.repeat),
            });

            if event.state == ElementState::Pressed {
                if let Some(text) = &event.text {
                    push_text(text, out);
                }
            }
        }

        WindowEvent::Ime(Ime::Commit(text)) => push_text(text, out),

        _ => {}
    }
}

fn push_text(text: &str, out: &mut Vec<InputEvent>) {
    out.extend(text.chars().filter(|c| !c.is_control()).map(InputEvent::Char));
}

fn to_logical(window: &Window, pos: PhysicalPosition<f64>) -> (f64, f64) {
    let logical = pos.to_logical::<f64>(window.scale_factor());
    (logical.x, logical.y)
}

fn map_state(state: ElementState, repeat: bool) -> Action {
    match (state, repeat) {
        (ElementState::Pressed, false) => Action::Press,
        (ElementState::Pressed, true) => Action::Repeat,
        (ElementState::Released, _) => Action::Release,
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

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        return Key::Unknown;
    };

    match code {
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,

        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,

        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::SuperLeft => Key::SuperLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::AltRight => Key::AltRight,
        KeyCode::SuperRight => Key::SuperRight,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_drops_control_characters() {
        let mut out = Vec::new();
        push_text("a\r\u{8}b", &mut out);
        assert_eq!(out, vec![InputEvent::Char('a'), InputEvent::Char('b')]);
    }

    #[test]
    fn repeat_maps_to_repeat_action() {
        assert_eq!(map_state(ElementState::Pressed, true), Action::Repeat);
        assert_eq!(map_state(ElementState::Released, true), Action::Release);
    }

    #[test]
    fn modifiers_keep_their_side() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlRight)), Key::ControlRight);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)), Key::ShiftLeft);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::CapsLock)), Key::Unknown);
    }

    #[test]
    fn state_tracks_pointer_and_focus() {
        let mut state = PlatformState::default();
        state.observe(&InputEvent::CursorMoved { x: 3.0, y: 4.0 });
        state.observe(&InputEvent::Focused(true));
        assert_eq!(state.cursor_pos, Some((3.0, 4.0)));
        assert!(state.focused);
    }

    #[test]
    fn leaving_the_window_forgets_the_pointer() {
        let mut state = PlatformState::default();
        state.observe(&InputEvent::CursorMoved { x: 3.0, y: 4.0 });
        state.observe(&InputEvent::CursorLeft);
        assert_eq!(state.cursor_pos, None);

        state.observe(&InputEvent::CursorMoved { x: 7.0, y: 1.0 });
        assert_eq!(state.cursor_pos, Some((7.0, 1.0)));
    }
}
