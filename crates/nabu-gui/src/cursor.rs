/// Pointer shape requested by the GUI for the current frame.
///
/// `None` asks the platform to hide the OS cursor entirely.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MouseCursor {
    None,
    #[default]
    Arrow,
    TextInput,
    ResizeAll,
    ResizeNS,
    ResizeEW,
    ResizeNESW,
    ResizeNWSE,
    Hand,
    NotAllowed,
}

impl MouseCursor {
    /// Every visible shape, in declaration order.
    pub const SHAPES: [MouseCursor; 9] = [
        MouseCursor::Arrow,
        MouseCursor::TextInput,
        MouseCursor::ResizeAll,
        MouseCursor::ResizeNS,
        MouseCursor::ResizeEW,
        MouseCursor::ResizeNESW,
        MouseCursor::ResizeNWSE,
        MouseCursor::Hand,
        MouseCursor::NotAllowed,
    ];
}
