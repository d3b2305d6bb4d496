//! Immediate-mode GUI core.
//!
//! Produces vertex/index/command lists per frame and consumes an input
//! snapshot through [`Io`]. It knows nothing about windows or GPUs; a platform
//! bridge feeds it input and turns its [`DrawData`] into GPU work.

pub mod context;
pub mod cursor;
pub mod draw;
pub mod font;
pub mod io;
pub mod math;
pub mod ui;

pub use context::Context;
pub use cursor::MouseCursor;
pub use draw::{DrawCallback, DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, TextureId};
pub use font::{FontAtlas, FontConfig, Glyph};
pub use io::{
    BackendFlags, ClipboardBackend, ConfigFlags, Io, NavKey, KEYS_DOWN_LEN, MOUSE_BUTTONS_LEN,
    MOUSE_POS_ABSENT,
};
pub use math::{Rect, Vec2};
pub use ui::{Style, StyleColors, Ui, WindowOptions};
