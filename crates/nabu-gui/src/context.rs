use std::hash::{DefaultHasher, Hash, Hasher};

use crate::cursor::MouseCursor;
use crate::draw::{DrawData, DrawList};
use crate::font::{FontAtlas, FontConfig};
use crate::io::{Io, KEYS_DOWN_LEN, MOUSE_BUTTONS_LEN};
use crate::math::{Rect, Vec2};
use crate::ui::{Style, Ui};

pub(crate) type Id = u64;

pub(crate) fn hash_id(seed: Id, label: &str) -> Id {
    let mut h = DefaultHasher::new();
    seed.hash(&mut h);
    label.hash(&mut h);
    h.finish()
}

#[inline]
fn pos_valid(p: Vec2) -> bool {
    p.x > -f32::MAX && p.y > -f32::MAX
}

/// Persistent per-window state. Survives frames in which the window is not submitted.
pub(crate) struct Window {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) pos: Vec2,
    pub(crate) size: Vec2,
    pub(crate) draw_list: DrawList,
    pub(crate) last_frame_used: u64,
}

impl Window {
    pub(crate) fn new(id: Id, name: &str, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            name: name.to_owned(),
            pos,
            size,
            draw_list: DrawList::default(),
            last_frame_used: 0,
        }
    }

    #[inline]
    pub(crate) fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub(crate) fn title_bar_rect(&self, height: f32) -> Rect {
        Rect::from_pos_size(self.pos, Vec2::new(self.size.x, height))
    }
}

/// Owned GUI state: input snapshot, fonts, windows and the frame being built.
///
/// One frame is `new_frame()` → widget calls on the returned [`Ui`] → `render()`.
/// Several contexts can coexist; nothing is global.
pub struct Context {
    pub(crate) io: Io,
    pub(crate) fonts: FontAtlas,
    pub(crate) style: Style,

    /// Z-ordered back to front.
    pub(crate) windows: Vec<Window>,
    pub(crate) frame_count: u64,
    pub(crate) mouse_cursor: MouseCursor,

    pub(crate) hovered_window: Option<Id>,
    pub(crate) moving_window: Option<Id>,
    pub(crate) active_id: Option<Id>,
    pub(crate) focused_input: Option<Id>,
    pub(crate) focus_claimed: bool,

    pub(crate) mouse_clicked: [bool; MOUSE_BUTTONS_LEN],
    pub(crate) mouse_released: [bool; MOUSE_BUTTONS_LEN],
    mouse_down_prev: [bool; MOUSE_BUTTONS_LEN],
    pub(crate) keys_pressed: Vec<bool>,
    keys_down_prev: Vec<bool>,
    mouse_pos_prev: Vec2,
    pub(crate) mouse_delta: Vec2,

    pub(crate) background: DrawList,
    pub(crate) foreground: DrawList,
    draw_data: DrawData,
    in_frame: bool,
}

impl Context {
    pub fn create(font: FontConfig) -> Self {
        let fonts = FontAtlas::build(&font);
        let white = fonts.white_uv();
        Self {
            io: Io::default(),
            fonts,
            style: Style::default(),
            windows: Vec::new(),
            frame_count: 0,
            mouse_cursor: MouseCursor::Arrow,
            hovered_window: None,
            moving_window: None,
            active_id: None,
            focused_input: None,
            focus_claimed: false,
            mouse_clicked: [false; MOUSE_BUTTONS_LEN],
            mouse_released: [false; MOUSE_BUTTONS_LEN],
            mouse_down_prev: [false; MOUSE_BUTTONS_LEN],
            keys_pressed: vec![false; KEYS_DOWN_LEN],
            keys_down_prev: vec![false; KEYS_DOWN_LEN],
            mouse_pos_prev: crate::io::MOUSE_POS_ABSENT,
            mouse_delta: Vec2::zero(),
            background: DrawList::new(white),
            foreground: DrawList::new(white),
            draw_data: DrawData::default(),
            in_frame: false,
        }
    }

    #[inline]
    pub fn io(&self) -> &Io {
        &self.io
    }

    #[inline]
    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }

    #[inline]
    pub fn fonts(&self) -> &FontAtlas {
        &self.fonts
    }

    #[inline]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Cursor shape requested by the last frame's widgets.
    #[inline]
    pub fn mouse_cursor(&self) -> MouseCursor {
        self.mouse_cursor
    }

    pub(crate) fn title_bar_height(&self) -> f32 {
        self.fonts.line_height() + self.style.frame_padding.y * 2.0
    }

    /// Starts a frame. `Io` frame fields must already be up to date.
    pub fn new_frame(&mut self) -> Ui<'_> {
        if self.in_frame {
            log::warn!("Context: new_frame() called twice without render()");
        }
        self.in_frame = true;
        self.frame_count += 1;

        // Only meaningful for the frame that requested it.
        self.io.want_set_mouse_pos = false;

        let dt = self.io.delta_time;
        if dt > 0.0 {
            self.io.framerate += (1.0 / dt - self.io.framerate) * 0.05;
        }

        for i in 0..MOUSE_BUTTONS_LEN {
            let down = self.io.mouse_down[i];
            self.mouse_clicked[i] = down && !self.mouse_down_prev[i];
            self.mouse_released[i] = !down && self.mouse_down_prev[i];
            self.mouse_down_prev[i] = down;
        }
        for (i, &down) in self.io.keys_down.iter().enumerate() {
            self.keys_pressed[i] = down && !self.keys_down_prev[i];
            self.keys_down_prev[i] = down;
        }

        let pos = self.io.mouse_pos;
        self.mouse_delta = if pos_valid(pos) && pos_valid(self.mouse_pos_prev) {
            pos - self.mouse_pos_prev
        } else {
            Vec2::zero()
        };
        self.mouse_pos_prev = pos;

        self.mouse_cursor = MouseCursor::Arrow;
        self.focus_claimed = false;

        self.update_moving_window();
        self.update_hovered_window();
        self.update_window_focus();

        let display = Rect::new(Vec2::zero(), self.io.display_size);
        let white = self.fonts.white_uv();
        self.background.reset(white, display);
        self.foreground.reset(white, display);

        Ui::new(self)
    }

    fn update_moving_window(&mut self) {
        let Some(id) = self.moving_window else { return };

        if !self.io.mouse_down[0] {
            self.moving_window = None;
            return;
        }

        let delta = self.mouse_delta;
        if let Some(w) = self.windows.iter_mut().find(|w| w.id == id) {
            w.pos += delta;
        }
        self.mouse_cursor = MouseCursor::ResizeAll;
    }

    fn update_hovered_window(&mut self) {
        if let Some(id) = self.moving_window {
            self.hovered_window = Some(id);
            return;
        }

        let mouse = self.io.mouse_pos;
        let prev_frame = self.frame_count - 1;
        self.hovered_window = if pos_valid(mouse) {
            self.windows
                .iter()
                .rev()
                .filter(|w| w.last_frame_used == prev_frame)
                .find(|w| w.rect().contains(mouse))
                .map(|w| w.id)
        } else {
            None
        };
    }

    fn update_window_focus(&mut self) {
        if !self.mouse_clicked[0] || self.moving_window.is_some() {
            return;
        }
        let Some(id) = self.hovered_window else { return };
        let Some(idx) = self.windows.iter().position(|w| w.id == id) else { return };

        let title_h = self.title_bar_height();
        let w = self.windows.remove(idx);
        if w.title_bar_rect(title_h).contains(self.io.mouse_pos) {
            self.moving_window = Some(id);
            self.mouse_cursor = MouseCursor::ResizeAll;
        }
        self.windows.push(w);
    }

    /// Ends the frame: computes the `want_*` flags, clears per-frame input and
    /// assembles the draw data with clip rects in framebuffer pixels.
    pub fn render(&mut self) -> &DrawData {
        if !self.in_frame {
            log::warn!("Context: render() called without new_frame()");
        }
        self.in_frame = false;

        if self.mouse_clicked[0] && !self.focus_claimed {
            self.focused_input = None;
        }
        if !self.io.mouse_down[0] {
            self.active_id = None;
        }

        let io = &mut self.io;
        io.want_capture_mouse =
            self.hovered_window.is_some() || self.moving_window.is_some() || self.active_id.is_some();
        io.want_capture_keyboard = self.focused_input.is_some();
        io.want_text_input = self.focused_input.is_some();

        if io.mouse_draw_cursor && self.mouse_cursor != MouseCursor::None && pos_valid(io.mouse_pos) {
            let p = io.mouse_pos;
            let s = self.fonts.line_height();
            self.foreground.add_triangle_filled(
                p,
                p + Vec2::new(0.0, s),
                p + Vec2::new(s * 0.7, s * 0.7),
                self.style.colors.text,
            );
        }

        io.input_queue_characters.clear();
        io.mouse_wheel = 0.0;
        io.mouse_wheel_h = 0.0;

        let data = &mut self.draw_data;
        data.draw_lists.clear();
        if !self.background.is_empty() {
            data.draw_lists.push(std::mem::take(&mut self.background));
        }
        let frame = self.frame_count;
        for w in self.windows.iter_mut().filter(|w| w.last_frame_used == frame) {
            if !w.draw_list.is_empty() {
                data.draw_lists.push(std::mem::take(&mut w.draw_list));
            }
        }
        if !self.foreground.is_empty() {
            data.draw_lists.push(std::mem::take(&mut self.foreground));
        }

        data.display_pos = Vec2::zero();
        data.display_size = self.io.display_size;
        data.framebuffer_scale = self.io.display_framebuffer_scale;
        data.scale_clip_rects(self.io.display_framebuffer_scale);

        &self.draw_data
    }
}
