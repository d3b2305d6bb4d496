//! Windowing collaborator as seen by the GUI bridge.
//!
//! The bridge only talks to [`Platform`]; `winit` lives behind
//! [`WinitPlatform`]. Tests substitute a recording mock.

mod clipboard;
mod winit;

use nabu_gui::{ClipboardBackend, MouseCursor};

pub use clipboard::ArboardClipboard;
pub use self::winit::{translate_window_event, PlatformState, WinitPlatform};

/// OS cursor visibility/capture mode.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CursorMode {
    #[default]
    Normal,
    Hidden,
    /// Hidden and locked to the window, e.g. for camera control.
    Disabled,
}

/// Window queries and commands needed by the per-frame bridge.
///
/// Sizes are `(width, height)`. Window sizes and cursor positions are in
/// logical pixels; framebuffer sizes are physical.
pub trait Platform {
    /// Native cursor handle.
    type Cursor;

    fn window_size(&self) -> (u32, u32);
    fn framebuffer_size(&self) -> (u32, u32);
    fn is_focused(&self) -> bool;

    /// Last known pointer position, `None` if the pointer was never seen.
    fn cursor_pos(&self) -> Option<(f64, f64)>;
    fn set_cursor_pos(&mut self, x: f64, y: f64);

    fn cursor_mode(&self) -> CursorMode;
    fn set_cursor_mode(&mut self, mode: CursorMode);

    /// `None` when the platform has no native shape for `shape`.
    fn create_standard_cursor(&mut self, shape: MouseCursor) -> Option<Self::Cursor>;
    fn set_cursor(&mut self, cursor: &Self::Cursor);
    fn destroy_cursor(&mut self, cursor: Self::Cursor);

    fn create_clipboard(&mut self) -> Option<Box<dyn ClipboardBackend>>;
}
