use crate::math::Vec2;

/// Number of addressable platform key codes in [`Io::keys_down`].
pub const KEYS_DOWN_LEN: usize = 512;

/// Number of tracked mouse buttons in [`Io::mouse_down`].
pub const MOUSE_BUTTONS_LEN: usize = 5;

/// Pointer position meaning "no pointer". Far outside any widget rectangle.
pub const MOUSE_POS_ABSENT: Vec2 = Vec2::new(-f32::MAX, -f32::MAX);

/// Keys the GUI needs for navigation and text editing.
///
/// The platform layer maps each one to its own key code via [`Io::key_map`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum NavKey {
    Tab,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,
    Backspace,
    Space,
    Enter,
    Escape,
    A,
    C,
    V,
    X,
    Y,
    Z,
}

impl NavKey {
    pub const COUNT: usize = 21;

    pub const ALL: [NavKey; NavKey::COUNT] = [
        NavKey::Tab,
        NavKey::LeftArrow,
        NavKey::RightArrow,
        NavKey::UpArrow,
        NavKey::DownArrow,
        NavKey::PageUp,
        NavKey::PageDown,
        NavKey::Home,
        NavKey::End,
        NavKey::Insert,
        NavKey::Delete,
        NavKey::Backspace,
        NavKey::Space,
        NavKey::Enter,
        NavKey::Escape,
        NavKey::A,
        NavKey::C,
        NavKey::V,
        NavKey::X,
        NavKey::Y,
        NavKey::Z,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// User-facing configuration switches.
///
/// Stored as booleans rather than bitflags to keep it explicit and stable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ConfigFlags {
    /// The platform layer must not touch the OS cursor shape or visibility.
    pub no_mouse_cursor_change: bool,
}

/// Capabilities advertised by the platform/renderer pairing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BackendFlags {
    /// The platform honors [`crate::Context::mouse_cursor`].
    pub has_mouse_cursors: bool,
    /// The platform honors [`Io::want_set_mouse_pos`].
    pub has_set_mouse_pos: bool,
}

/// System clipboard access registered by the platform layer.
pub trait ClipboardBackend {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: &str);
}

/// Per-frame input snapshot and output flags.
///
/// Event-driven fields (`keys_down`, `mouse_down`, wheel, characters) are
/// written by the platform as events arrive. Frame fields (`display_size`,
/// `display_framebuffer_scale`, `delta_time`, `mouse_pos`) must be written
/// before [`crate::Context::new_frame`]. The `want_*` outputs are computed by
/// [`crate::Context::render`] and describe the frame just built.
pub struct Io {
    pub config_flags: ConfigFlags,
    pub backend_flags: BackendFlags,

    /// Logical window size.
    pub display_size: Vec2,
    /// Physical pixels per logical pixel, per axis.
    pub display_framebuffer_scale: Vec2,
    /// Seconds since the previous frame.
    pub delta_time: f32,

    /// Draw a software cursor instead of the OS one.
    pub mouse_draw_cursor: bool,

    /// Platform key code for each [`NavKey`]. `None` disables the key.
    pub key_map: [Option<usize>; NavKey::COUNT],

    pub mouse_pos: Vec2,
    pub mouse_down: [bool; MOUSE_BUTTONS_LEN],
    /// Vertical wheel delta accumulated this frame.
    pub mouse_wheel: f32,
    /// Horizontal wheel delta accumulated this frame.
    pub mouse_wheel_h: f32,

    pub key_ctrl: bool,
    pub key_shift: bool,
    pub key_alt: bool,
    pub key_super: bool,
    pub keys_down: [bool; KEYS_DOWN_LEN],

    /// Text typed this frame, in arrival order.
    pub input_queue_characters: Vec<char>,

    pub want_capture_mouse: bool,
    pub want_capture_keyboard: bool,
    pub want_text_input: bool,
    /// The GUI asks the platform to move the OS cursor to `mouse_pos`.
    pub want_set_mouse_pos: bool,

    /// Smoothed frames per second.
    pub framerate: f32,

    clipboard: Option<Box<dyn ClipboardBackend>>,
}

impl Default for Io {
    fn default() -> Self {
        Self {
            config_flags: ConfigFlags::default(),
            backend_flags: BackendFlags::default(),
            display_size: Vec2::zero(),
            display_framebuffer_scale: Vec2::new(1.0, 1.0),
            delta_time: 1.0 / 60.0,
            mouse_draw_cursor: false,
            key_map: [None; NavKey::COUNT],
            mouse_pos: MOUSE_POS_ABSENT,
            mouse_down: [false; MOUSE_BUTTONS_LEN],
            mouse_wheel: 0.0,
            mouse_wheel_h: 0.0,
            key_ctrl: false,
            key_shift: false,
            key_alt: false,
            key_super: false,
            keys_down: [false; KEYS_DOWN_LEN],
            input_queue_characters: Vec::new(),
            want_capture_mouse: false,
            want_capture_keyboard: false,
            want_text_input: false,
            want_set_mouse_pos: false,
            framerate: 60.0,
            clipboard: None,
        }
    }
}

impl Io {
    /// Queues a typed character for the current frame.
    pub fn add_input_character(&mut self, c: char) {
        if c != '\0' {
            self.input_queue_characters.push(c);
        }
    }

    /// False while the pointer is reported as absent.
    #[inline]
    pub fn is_mouse_pos_valid(&self) -> bool {
        self.mouse_pos.x > -f32::MAX && self.mouse_pos.y > -f32::MAX
    }

    /// Whether the platform key mapped to `key` is currently held.
    pub fn nav_key_down(&self, key: NavKey) -> bool {
        self.key_map[key.index()]
            .and_then(|code| self.keys_down.get(code).copied())
            .unwrap_or(false)
    }

    pub fn set_clipboard_backend(&mut self, backend: Box<dyn ClipboardBackend>) {
        self.clipboard = Some(backend);
    }

    pub fn take_clipboard_backend(&mut self) -> Option<Box<dyn ClipboardBackend>> {
        self.clipboard.take()
    }

    pub fn clipboard_text(&mut self) -> Option<String> {
        self.clipboard.as_mut().and_then(|c| c.get())
    }

    pub fn set_clipboard_text(&mut self, text: &str) {
        if let Some(c) = self.clipboard.as_mut() {
            c.set(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pointer_is_absent() {
        let io = Io::default();
        assert!(!io.is_mouse_pos_valid());
    }

    #[test]
    fn nul_character_is_dropped() {
        let mut io = Io::default();
        io.add_input_character('\0');
        io.add_input_character('a');
        assert_eq!(io.input_queue_characters, vec!['a']);
    }

    #[test]
    fn nav_key_follows_key_map() {
        let mut io = Io::default();
        assert!(!io.nav_key_down(NavKey::Enter));
        io.key_map[NavKey::Enter.index()] = Some(257);
        io.keys_down[257] = true;
        assert!(io.nav_key_down(NavKey::Enter));
    }

    #[test]
    fn nav_key_out_of_range_mapping_is_not_down() {
        let mut io = Io::default();
        io.key_map[NavKey::Tab.index()] = Some(KEYS_DOWN_LEN + 10);
        assert!(!io.nav_key_down(NavKey::Tab));
    }
}
