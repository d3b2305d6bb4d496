//! Platform-agnostic input events.
//!
//! The runtime translates window-system events into [`InputEvent`]s; the GUI
//! bridge and the application both consume them. No winit types leak out.

mod types;

pub use types::{Action, InputEvent, Key, MouseButton};
