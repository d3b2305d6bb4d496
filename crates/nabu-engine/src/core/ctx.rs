use crate::backend::BackendStats;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

/// GUI capture state at the time an event is delivered.
///
/// Reflects the frame rendered last, like the GUI's own `want_*` flags.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct EventCtx {
    pub gui_wants_keyboard: bool,
    pub gui_wants_mouse: bool,
}

/// Per-frame context passed to [`super::App::on_frame`].
pub struct FrameCtx<'a> {
    pub time: FrameTime,
    /// Logical pixels.
    pub window_size: (u32, u32),
    /// Physical pixels.
    pub framebuffer_size: (u32, u32),
    /// Counters of the previous flushed frame.
    pub stats: BackendStats,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_> {
    #[inline]
    pub fn exit(&mut self) {
        self.runtime.exit();
    }
}
