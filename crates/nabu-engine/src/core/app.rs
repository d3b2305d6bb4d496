use nabu_gui::Ui;

use super::ctx::{EventCtx, FrameCtx};
use crate::input::InputEvent;

/// Returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`crate::window::Runtime`].
pub trait App {
    /// Called for every input event after the GUI has seen it.
    ///
    /// Check `ctx` before acting on input the GUI may own.
    fn on_event(&mut self, event: &InputEvent, ctx: &EventCtx) -> AppControl {
        let _ = (event, ctx);
        AppControl::Continue
    }

    /// Builds this frame's GUI.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>, ui: &mut Ui<'_>) -> AppControl;
}
