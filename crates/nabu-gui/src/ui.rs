use crate::context::{hash_id, Context, Id, Window};
use crate::cursor::MouseCursor;
use crate::draw::{DrawCallback, DrawList, TextureId};
use crate::font::FontAtlas;
use crate::io::{Io, NavKey};
use crate::math::{Rect, Vec2};

/// Widget palette, RGBA8 straight alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StyleColors {
    pub text: [u8; 4],
    pub window_bg: [u8; 4],
    pub border: [u8; 4],
    pub title_bg: [u8; 4],
    pub title_bg_active: [u8; 4],
    pub frame_bg: [u8; 4],
    pub frame_bg_hovered: [u8; 4],
    pub button: [u8; 4],
    pub button_hovered: [u8; 4],
    pub button_active: [u8; 4],
    pub check_mark: [u8; 4],
    pub separator: [u8; 4],
}

impl Default for StyleColors {
    fn default() -> Self {
        Self {
            text: [255, 255, 255, 255],
            window_bg: [15, 15, 15, 240],
            border: [110, 110, 128, 128],
            title_bg: [10, 10, 10, 255],
            title_bg_active: [41, 74, 122, 255],
            frame_bg: [41, 74, 122, 138],
            frame_bg_hovered: [66, 150, 250, 102],
            button: [66, 150, 250, 102],
            button_hovered: [66, 150, 250, 255],
            button_active: [15, 135, 250, 255],
            check_mark: [66, 150, 250, 255],
            separator: [110, 110, 128, 128],
        }
    }
}

/// Layout metrics and colors. Read at widget submission time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Style {
    pub window_padding: Vec2,
    pub frame_padding: Vec2,
    pub item_spacing: Vec2,
    /// Width of the editable box of `input_text`.
    pub input_width: f32,
    pub colors: StyleColors,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            window_padding: Vec2::new(8.0, 8.0),
            frame_padding: Vec2::new(4.0, 3.0),
            item_spacing: Vec2::new(8.0, 4.0),
            input_width: 200.0,
            colors: StyleColors::default(),
        }
    }
}

/// Placement used when a window is first created.
///
/// Later frames keep the persisted position and size unless
/// `always_auto_resize` refits the size to the content.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowOptions {
    pub pos: Vec2,
    pub size: Vec2,
    pub always_auto_resize: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            pos: Vec2::new(60.0, 60.0),
            size: Vec2::new(300.0, 200.0),
            always_auto_resize: false,
        }
    }
}

/// Text shown for a label; `"##"` starts a hidden id suffix.
fn display_label(label: &str) -> &str {
    match label.find("##") {
        Some(i) => &label[..i],
        None => label,
    }
}

struct Layout {
    /// Index into `Context::windows`; `None` lays out on the background list.
    window: Option<usize>,
    id_seed: Id,
    clip: Rect,
    cursor: Vec2,
    line_start_x: f32,
    line_y: f32,
    line_height: f32,
    prev_item_max: Vec2,
    same_line: bool,
    content_max: Vec2,
}

impl Layout {
    fn new(window: Option<usize>, id_seed: Id, clip: Rect, origin: Vec2) -> Self {
        Self {
            window,
            id_seed,
            clip,
            cursor: origin,
            line_start_x: origin.x,
            line_y: origin.y,
            line_height: 0.0,
            prev_item_max: origin,
            same_line: false,
            content_max: origin,
        }
    }
}

/// Frame builder returned by [`Context::new_frame`].
pub struct Ui<'a> {
    ctx: &'a mut Context,
    layout: Layout,
}

impl<'a> Ui<'a> {
    pub(crate) fn new(ctx: &'a mut Context) -> Self {
        let origin = ctx.style.window_padding;
        let display = Rect::new(Vec2::zero(), ctx.io.display_size);
        Self { ctx, layout: Layout::new(None, 0, display, origin) }
    }

    #[inline]
    pub fn io(&self) -> &Io {
        &self.ctx.io
    }

    #[inline]
    pub fn fonts(&self) -> &FontAtlas {
        &self.ctx.fonts
    }

    #[inline]
    pub fn display_size(&self) -> Vec2 {
        self.ctx.io.display_size
    }

    #[inline]
    pub fn framerate(&self) -> f32 {
        self.ctx.io.framerate
    }

    /// Asks the platform to warp the OS cursor to `pos` before the next frame.
    ///
    /// Ignored unless the backend advertises `has_set_mouse_pos`.
    pub fn request_mouse_pos(&mut self, pos: Vec2) {
        let io = &mut self.ctx.io;
        if io.backend_flags.has_set_mouse_pos {
            io.mouse_pos = pos;
            io.want_set_mouse_pos = true;
        }
    }

    /// Raw platform key code went down this frame.
    pub fn is_key_pressed(&self, code: usize) -> bool {
        self.ctx.keys_pressed.get(code).copied().unwrap_or(false)
    }

    pub fn is_nav_key_pressed(&self, key: NavKey) -> bool {
        self.ctx.io.key_map[key.index()].is_some_and(|code| self.is_key_pressed(code))
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn make_id(&self, label: &str) -> Id {
        hash_id(self.layout.id_seed, label)
    }

    fn with_draw_list<R>(&mut self, f: impl FnOnce(&mut DrawList, &FontAtlas) -> R) -> R {
        let Context { windows, background, fonts, .. } = &mut *self.ctx;
        let dl = match self.layout.window {
            Some(i) => &mut windows[i].draw_list,
            None => background,
        };
        f(dl, fonts)
    }

    fn item_add(&mut self, size: Vec2) -> Rect {
        let spacing = self.ctx.style.item_spacing;
        let l = &mut self.layout;

        let pos = if l.same_line {
            Vec2::new(l.prev_item_max.x + spacing.x, l.line_y)
        } else {
            l.cursor
        };
        let rect = Rect::from_pos_size(pos, size);

        if l.same_line {
            l.line_height = l.line_height.max(size.y);
        } else {
            l.line_y = pos.y;
            l.line_height = size.y;
        }
        l.same_line = false;
        l.prev_item_max = rect.max;
        l.cursor = Vec2::new(l.line_start_x, l.line_y + l.line_height + spacing.y);
        l.content_max = l.content_max.max(rect.max);
        rect
    }

    fn item_hovered(&self, rect: Rect) -> bool {
        let ctx = &*self.ctx;
        let owner = self.layout.window.map(|i| ctx.windows[i].id);
        let mouse = ctx.io.mouse_pos;
        ctx.moving_window.is_none()
            && ctx.hovered_window == owner
            && self.layout.clip.contains(mouse)
            && rect.contains(mouse)
    }

    /// Press-and-release behavior. Returns `(hovered, held, pressed)`.
    fn button_behavior(&mut self, id: Id, rect: Rect) -> (bool, bool, bool) {
        let hovered = self.item_hovered(rect);
        let ctx = &mut *self.ctx;
        if hovered && ctx.mouse_clicked[0] {
            ctx.active_id = Some(id);
        }
        let active = ctx.active_id == Some(id);
        let held = active && ctx.io.mouse_down[0];
        let pressed = active && hovered && ctx.mouse_released[0];
        (hovered, held, pressed)
    }

    // ── windows ───────────────────────────────────────────────────────────

    /// Submits a window and its content. The title bar drags it.
    pub fn window(&mut self, name: &str, options: WindowOptions, build: impl FnOnce(&mut Self)) {
        let id = hash_id(0, name);
        let frame = self.ctx.frame_count;

        let idx = match self.ctx.windows.iter().position(|w| w.id == id) {
            Some(i) => i,
            None => {
                log::debug!("gui: created window '{name}'");
                self.ctx.windows.push(Window::new(id, name, options.pos, options.size));
                self.ctx.windows.len() - 1
            }
        };
        if self.ctx.windows[idx].last_frame_used == frame {
            log::warn!("gui: window '{name}' submitted twice in one frame; ignoring");
            return;
        }

        let style = self.ctx.style;
        let title_h = self.ctx.title_bar_height();
        let white = self.ctx.fonts.white_uv();
        let focused = self.ctx.windows.last().map(|w| w.id) == Some(id);

        let content_clip = {
            let Context { windows, fonts, .. } = &mut *self.ctx;
            let w = &mut windows[idx];
            w.last_frame_used = frame;

            let rect = w.rect();
            let title = w.title_bar_rect(title_h);
            let title_col = if focused { style.colors.title_bg_active } else { style.colors.title_bg };
            let label = display_label(&w.name);

            let dl = &mut w.draw_list;
            dl.reset(white, rect);
            dl.add_rect_filled(rect.min, rect.max, style.colors.window_bg);
            dl.add_rect_filled(title.min, title.max, title_col);
            dl.add_text(fonts, title.min + style.frame_padding, style.colors.text, label);
            dl.add_rect(rect.min, rect.max, style.colors.border, 1.0);

            let clip = Rect::new(Vec2::new(rect.min.x, title.max.y), rect.max);
            dl.push_clip_rect(clip);
            clip
        };

        let origin = content_clip.min + style.window_padding;
        let inner = Layout::new(Some(idx), id, content_clip, origin);
        let outer = std::mem::replace(&mut self.layout, inner);

        build(self);

        let inner = std::mem::replace(&mut self.layout, outer);
        let title_w = self.ctx.fonts.calc_text_size(display_label(name)).x + style.frame_padding.x * 2.0;

        let w = &mut self.ctx.windows[idx];
        w.draw_list.pop_clip_rect();
        if options.always_auto_resize {
            let content = inner.content_max - w.pos + style.window_padding;
            w.size = content.max(Vec2::new(title_w, title_h));
        }
    }

    // ── widgets ───────────────────────────────────────────────────────────

    /// Places the next item on the current line.
    pub fn same_line(&mut self) {
        self.layout.same_line = true;
    }

    pub fn text(&mut self, text: &str) {
        let col = self.ctx.style.colors.text;
        self.text_colored(col, text);
    }

    pub fn text_colored(&mut self, col: [u8; 4], text: &str) {
        let size = self.ctx.fonts.calc_text_size(text);
        let rect = self.item_add(size);
        self.with_draw_list(|dl, fonts| dl.add_text(fonts, rect.min, col, text));
    }

    pub fn separator(&mut self) {
        let pad = self.ctx.style.window_padding;
        let col = self.ctx.style.colors.separator;
        let width = (self.layout.clip.width() - pad.x * 2.0).max(0.0);
        let rect = self.item_add(Vec2::new(width, 1.0));
        self.with_draw_list(|dl, _| dl.add_rect_filled(rect.min, rect.max, col));
    }

    /// Returns true on the frame the button is released while hovered.
    pub fn button(&mut self, label: &str) -> bool {
        let id = self.make_id(label);
        let text = display_label(label);
        let style = self.ctx.style;
        let ts = self.ctx.fonts.calc_text_size(text);
        let rect = self.item_add(ts + style.frame_padding * 2.0);

        let (hovered, held, pressed) = self.button_behavior(id, rect);
        if hovered {
            self.ctx.mouse_cursor = MouseCursor::Hand;
        }

        let bg = if held {
            style.colors.button_active
        } else if hovered {
            style.colors.button_hovered
        } else {
            style.colors.button
        };
        self.with_draw_list(|dl, fonts| {
            dl.add_rect_filled(rect.min, rect.max, bg);
            dl.add_text(fonts, rect.min + style.frame_padding, style.colors.text, text);
        });
        pressed
    }

    /// Toggles `value` on click. Returns true when it changed.
    pub fn checkbox(&mut self, label: &str, value: &mut bool) -> bool {
        let id = self.make_id(label);
        let text = display_label(label);
        let style = self.ctx.style;
        let ts = self.ctx.fonts.calc_text_size(text);
        let box_size = self.ctx.fonts.line_height() + style.frame_padding.y * 2.0;
        let label_w = if text.is_empty() { 0.0 } else { style.item_spacing.x + ts.x };
        let rect = self.item_add(Vec2::new(box_size + label_w, box_size));

        let (hovered, _, pressed) = self.button_behavior(id, rect);
        if pressed {
            *value = !*value;
        }

        let check = *value;
        let bg = if hovered { style.colors.frame_bg_hovered } else { style.colors.frame_bg };
        self.with_draw_list(|dl, fonts| {
            let b = Rect::from_pos_size(rect.min, Vec2::new(box_size, box_size));
            dl.add_rect_filled(b.min, b.max, bg);
            if check {
                let inset = Vec2::new(box_size * 0.25, box_size * 0.25);
                dl.add_rect_filled(b.min + inset, b.max - inset, style.colors.check_mark);
            }
            let text_pos = Vec2::new(b.max.x + style.item_spacing.x, rect.min.y + style.frame_padding.y);
            dl.add_text(fonts, text_pos, style.colors.text, text);
        });
        pressed
    }

    /// Single-line text field. Click to focus; Enter or Escape releases focus.
    ///
    /// While focused: typed characters append, Backspace deletes, and
    /// Ctrl+C / Ctrl+X / Ctrl+V go through the registered clipboard.
    /// Returns true when `buf` changed.
    pub fn input_text(&mut self, label: &str, buf: &mut String) -> bool {
        let id = self.make_id(label);
        let text = display_label(label);
        let style = self.ctx.style;
        let ts = self.ctx.fonts.calc_text_size(text);
        let height = self.ctx.fonts.line_height() + style.frame_padding.y * 2.0;
        let label_w = if text.is_empty() { 0.0 } else { style.item_spacing.x + ts.x };
        let rect = self.item_add(Vec2::new(style.input_width + label_w, height));
        let frame = Rect::from_pos_size(rect.min, Vec2::new(style.input_width, height));

        let hovered = self.item_hovered(frame);
        if hovered {
            self.ctx.mouse_cursor = MouseCursor::TextInput;
            if self.ctx.mouse_clicked[0] {
                self.ctx.focused_input = Some(id);
                self.ctx.focus_claimed = true;
            }
        }

        let focused = self.ctx.focused_input == Some(id);
        let mut changed = false;
        if focused {
            changed = self.edit_focused_text(buf);
            if self.is_nav_key_pressed(NavKey::Enter) || self.is_nav_key_pressed(NavKey::Escape) {
                self.ctx.focused_input = None;
            }
        }

        let bg = if hovered || focused { style.colors.frame_bg_hovered } else { style.colors.frame_bg };
        let caret_h = self.ctx.fonts.line_height();
        self.with_draw_list(|dl, fonts| {
            dl.add_rect_filled(frame.min, frame.max, bg);
            dl.push_clip_rect(frame);
            let text_pos = frame.min + style.frame_padding;
            dl.add_text(fonts, text_pos, style.colors.text, buf);
            if focused {
                let x = text_pos.x + fonts.calc_text_size(buf).x;
                dl.add_rect_filled(
                    Vec2::new(x, text_pos.y),
                    Vec2::new(x + 1.0, text_pos.y + caret_h),
                    style.colors.text,
                );
            }
            dl.pop_clip_rect();
            if !text.is_empty() {
                let label_pos = Vec2::new(frame.max.x + style.item_spacing.x, text_pos.y);
                dl.add_text(fonts, label_pos, style.colors.text, text);
            }
        });
        changed
    }

    fn edit_focused_text(&mut self, buf: &mut String) -> bool {
        let mut changed = false;
        let ctrl = self.ctx.io.key_ctrl || self.ctx.io.key_super;

        if ctrl && (self.is_nav_key_pressed(NavKey::C) || self.is_nav_key_pressed(NavKey::X)) {
            self.ctx.io.set_clipboard_text(buf);
            if self.is_nav_key_pressed(NavKey::X) {
                buf.clear();
                changed = true;
            }
        }
        if ctrl && self.is_nav_key_pressed(NavKey::V) {
            if let Some(pasted) = self.ctx.io.clipboard_text() {
                let line = pasted.lines().next().unwrap_or_default();
                buf.extend(line.chars().filter(|c| !c.is_control()));
                changed = true;
            }
        }

        for &c in &self.ctx.io.input_queue_characters {
            if !c.is_control() {
                buf.push(c);
                changed = true;
            }
        }

        if self.is_nav_key_pressed(NavKey::Backspace) && buf.pop().is_some() {
            changed = true;
        }
        changed
    }

    /// Draws a user texture at the layout cursor.
    pub fn image(&mut self, texture: TextureId, size: Vec2) {
        let rect = self.item_add(size);
        self.with_draw_list(|dl, _| {
            dl.add_image(texture, rect.min, rect.max, [0.0, 0.0], [1.0, 1.0], [255, 255, 255, 255]);
        });
    }

    /// Inserts a render hook into the current list at this point.
    pub fn add_callback(&mut self, callback: DrawCallback) {
        self.with_draw_list(|dl, _| dl.add_callback(callback));
    }

    /// Text drawn behind every window at an absolute position.
    pub fn background_text(&mut self, pos: Vec2, col: [u8; 4], text: &str) {
        let Context { background, fonts, .. } = &mut *self.ctx;
        background.add_text(fonts, pos, col, text);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::draw::DrawCmd;
    use crate::font::FontConfig;
    use crate::io::ClipboardBackend;

    #[test]
    fn hidden_label_suffix() {
        assert_eq!(display_label("Save##file"), "Save");
        assert_eq!(display_label("##only"), "");
        assert_eq!(display_label("plain"), "plain");
    }

    fn ctx() -> Context {
        let mut ctx = Context::create(FontConfig::default());
        ctx.io_mut().display_size = Vec2::new(640.0, 480.0);
        ctx
    }

    #[test]
    fn same_line_places_items_side_by_side() {
        let mut ctx = ctx();
        let mut ui = ctx.new_frame();
        let a = ui.item_add(Vec2::new(10.0, 10.0));
        ui.same_line();
        let b = ui.item_add(Vec2::new(10.0, 20.0));
        let c = ui.item_add(Vec2::new(10.0, 10.0));

        assert_eq!(b.min.y, a.min.y);
        assert_eq!(b.min.x, a.max.x + 8.0);
        assert_eq!(c.min.x, a.min.x);
        assert_eq!(c.min.y, a.min.y + 20.0 + 4.0);
    }

    #[test]
    fn auto_resize_fits_content() {
        let mut ctx = ctx();
        let opts = WindowOptions { always_auto_resize: true, ..WindowOptions::default() };
        let mut ui = ctx.new_frame();
        ui.window("Fit", opts, |ui| {
            ui.item_add(Vec2::new(50.0, 30.0));
        });
        ctx.render();

        // 8px padding on each side below a 21px title bar.
        assert_eq!(ctx.windows[0].size, Vec2::new(66.0, 21.0 + 8.0 + 30.0 + 8.0));
    }

    #[test]
    fn background_items_land_on_background_list() {
        let mut ctx = ctx();
        let mut ui = ctx.new_frame();
        ui.separator();
        let data = ctx.render();
        assert_eq!(data.draw_lists.len(), 1);
        assert_eq!(data.total_idx_count(), 6);
    }

    #[test]
    fn image_and_callback_commands() {
        let mut ctx = ctx();
        let mut ui = ctx.new_frame();
        ui.image(TextureId::Backend(7), Vec2::new(16.0, 16.0));
        ui.add_callback(DrawCallback::new(|_| {}));
        let data = ctx.render();

        let cmds = &data.draw_lists[0].cmd_buffer;
        assert!(matches!(cmds[0], DrawCmd::Elements { texture_id: TextureId::Backend(7), .. }));
        assert!(matches!(cmds[1], DrawCmd::Callback { .. }));
    }

    struct SharedClipboard(Rc<RefCell<String>>);

    impl ClipboardBackend for SharedClipboard {
        fn get(&mut self) -> Option<String> {
            Some(self.0.borrow().clone())
        }
        fn set(&mut self, text: &str) {
            *self.0.borrow_mut() = text.to_owned();
        }
    }

    #[test]
    fn clipboard_shortcuts_in_focused_input() {
        const CTRL_C: usize = 67;
        const CTRL_V: usize = 86;

        let shared = Rc::new(RefCell::new(String::from("pasted\nignored")));
        let mut ctx = ctx();
        ctx.io_mut().set_clipboard_backend(Box::new(SharedClipboard(shared.clone())));
        ctx.io_mut().key_map[NavKey::C.index()] = Some(CTRL_C);
        ctx.io_mut().key_map[NavKey::V.index()] = Some(CTRL_V);
        ctx.focused_input = Some(hash_id(0, "##buf"));

        let mut buf = String::from("x");
        let mut frame = |ctx: &mut Context, buf: &mut String| {
            let mut ui = ctx.new_frame();
            ui.input_text("##buf", buf);
            ctx.render();
        };

        ctx.io_mut().key_ctrl = true;
        ctx.io_mut().keys_down[CTRL_V] = true;
        frame(&mut ctx, &mut buf);
        assert_eq!(buf, "xpasted");

        ctx.io_mut().keys_down[CTRL_V] = false;
        ctx.io_mut().keys_down[CTRL_C] = true;
        frame(&mut ctx, &mut buf);
        assert_eq!(*shared.borrow(), "xpasted");
    }
}
