//! Per-frame half of the input snapshot, written before GUI logic runs.

use nabu_gui::{Context, Io, MouseCursor, Vec2, MOUSE_POS_ABSENT};

use super::cursors::CursorRegistry;
use crate::platform::{CursorMode, Platform};

/// Logical display size and framebuffer scale for a window.
///
/// An axis with zero window extent (minimized) gets a zero scale.
pub fn display_metrics(window: (u32, u32), framebuffer: (u32, u32)) -> (Vec2, Vec2) {
    let (w, h) = (window.0 as f32, window.1 as f32);
    let (fw, fh) = (framebuffer.0 as f32, framebuffer.1 as f32);
    let scale = Vec2::new(
        if w > 0.0 { fw / w } else { 0.0 },
        if h > 0.0 { fh / h } else { 0.0 },
    );
    (Vec2::new(w, h), scale)
}

/// Writes display metrics, `dt`, pointer position and OS cursor state.
pub fn sync_frame<P: Platform>(ctx: &mut Context, cursors: &CursorRegistry<P::Cursor>, platform: &mut P, dt: f32) {
    let shape = ctx.mouse_cursor();
    let io = ctx.io_mut();

    let (size, scale) = display_metrics(platform.window_size(), platform.framebuffer_size());
    io.display_size = size;
    io.display_framebuffer_scale = scale;
    io.delta_time = dt;

    update_mouse_pos(io, platform);
    update_cursor(io, shape, cursors, platform);
}

/// Reports the OS pointer, or warps it when the GUI asked to move it.
///
/// Without focus the pointer is absent so nothing is hovered.
pub fn update_mouse_pos<P: Platform>(io: &mut Io, platform: &mut P) {
    let backup = io.mouse_pos;
    io.mouse_pos = MOUSE_POS_ABSENT;

    if !platform.is_focused() {
        return;
    }

    if io.want_set_mouse_pos {
        platform.set_cursor_pos(f64::from(backup.x), f64::from(backup.y));
    } else if let Some((x, y)) = platform.cursor_pos() {
        io.mouse_pos = Vec2::new(x as f32, y as f32);
    }
}

/// Applies the GUI cursor shape to the OS cursor.
pub fn update_cursor<P: Platform>(io: &Io, shape: MouseCursor, cursors: &CursorRegistry<P::Cursor>, platform: &mut P) {
    if io.config_flags.no_mouse_cursor_change || platform.cursor_mode() == CursorMode::Disabled {
        return;
    }

    if shape == MouseCursor::None || io.mouse_draw_cursor {
        platform.set_cursor_mode(CursorMode::Hidden);
        return;
    }

    if let Some(cursor) = cursors.get(shape) {
        platform.set_cursor(cursor);
    }
    platform.set_cursor_mode(CursorMode::Normal);
}
