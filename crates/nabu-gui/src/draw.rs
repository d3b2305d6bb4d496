use std::fmt;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::font::FontAtlas;
use crate::math::{Rect, Vec2};

/// Vertex layout (20 bytes):
///
///  offset  0  pos  [f32; 2]   logical px
///  offset  8  uv   [f32; 2]
///  offset 16  col  [u8; 4]    RGBA, straight alpha, normalized by the GPU
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub col: [u8; 4],
}

pub type DrawIdx = u16;

/// Texture referenced by a draw command.
///
/// `Font` is the atlas the platform bridge uploads at init. `Backend` carries a
/// renderer-assigned texture index for user images.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TextureId {
    #[default]
    Font,
    Backend(u16),
}

/// Hook run by the renderer in place of a GPU draw.
///
/// The closure captures whatever context it needs.
#[derive(Clone)]
pub struct DrawCallback(Rc<dyn Fn(&DrawList)>);

impl DrawCallback {
    pub fn new(f: impl Fn(&DrawList) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn invoke(&self, list: &DrawList) {
        (self.0)(list)
    }
}

impl fmt::Debug for DrawCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DrawCallback(..)")
    }
}

/// One step of a draw list.
///
/// `clip_rect` is `[x1, y1, x2, y2]`. Logical px while the frame is being
/// built; framebuffer px once [`DrawData`] is handed to a renderer.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    /// Draw `elem_count` indices following those of the preceding commands.
    Elements {
        elem_count: u32,
        clip_rect: [f32; 4],
        texture_id: TextureId,
    },
    /// Run a hook instead of drawing. Consumes no indices.
    Callback {
        callback: DrawCallback,
        clip_rect: [f32; 4],
    },
}

impl DrawCmd {
    #[inline]
    pub fn elem_count(&self) -> u32 {
        match self {
            DrawCmd::Elements { elem_count, .. } => *elem_count,
            DrawCmd::Callback { .. } => 0,
        }
    }

    #[inline]
    pub fn clip_rect(&self) -> [f32; 4] {
        match self {
            DrawCmd::Elements { clip_rect, .. } | DrawCmd::Callback { clip_rect, .. } => *clip_rect,
        }
    }

    fn clip_rect_mut(&mut self) -> &mut [f32; 4] {
        match self {
            DrawCmd::Elements { clip_rect, .. } | DrawCmd::Callback { clip_rect, .. } => clip_rect,
        }
    }
}

/// Geometry for one window or layer: a shared vertex/index buffer plus the
/// commands that slice it.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<DrawIdx>,
    pub cmd_buffer: Vec<DrawCmd>,

    clip_stack: Vec<Rect>,
    texture_stack: Vec<TextureId>,
    white_uv: [f32; 2],
    warned_overflow: bool,
}

impl DrawList {
    pub fn new(white_uv: [f32; 2]) -> Self {
        Self { white_uv, ..Self::default() }
    }

    /// Clears geometry and stacks, keeping allocations. `clip` becomes the base clip.
    pub fn reset(&mut self, white_uv: [f32; 2], clip: Rect) {
        self.vtx_buffer.clear();
        self.idx_buffer.clear();
        self.cmd_buffer.clear();
        self.clip_stack.clear();
        self.texture_stack.clear();
        self.clip_stack.push(clip);
        self.white_uv = white_uv;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cmd_buffer.is_empty()
    }

    /// Pushes `rect` intersected with the current clip.
    pub fn push_clip_rect(&mut self, rect: Rect) {
        let clip = match self.clip_stack.last() {
            Some(parent) => parent.intersect(rect),
            None => rect,
        };
        self.clip_stack.push(clip);
    }

    pub fn pop_clip_rect(&mut self) {
        self.clip_stack.pop();
    }

    pub fn push_texture_id(&mut self, id: TextureId) {
        self.texture_stack.push(id);
    }

    pub fn pop_texture_id(&mut self) {
        self.texture_stack.pop();
    }

    fn current_clip(&self) -> [f32; 4] {
        self.clip_stack
            .last()
            .map_or([-8192.0, -8192.0, 8192.0, 8192.0], |r| r.to_array())
    }

    fn current_texture(&self) -> TextureId {
        self.texture_stack.last().copied().unwrap_or_default()
    }

    /// Opens room for a primitive and returns the index of its first vertex.
    ///
    /// Returns `None` when the 16-bit index space is exhausted; the primitive is dropped.
    fn prim_reserve(&mut self, idx_count: u32, vtx_count: usize) -> Option<DrawIdx> {
        let base = self.vtx_buffer.len();
        if base + vtx_count > DrawIdx::MAX as usize + 1 {
            if !self.warned_overflow {
                log::warn!("DrawList: 16-bit index space exhausted; dropping primitives");
                self.warned_overflow = true;
            }
            return None;
        }

        let clip = self.current_clip();
        let tex = self.current_texture();

        let merge = matches!(
            self.cmd_buffer.last(),
            Some(DrawCmd::Elements { clip_rect, texture_id, .. })
                if *clip_rect == clip && *texture_id == tex
        );

        if merge {
            if let Some(DrawCmd::Elements { elem_count, .. }) = self.cmd_buffer.last_mut() {
                *elem_count += idx_count;
            }
        } else {
            self.cmd_buffer.push(DrawCmd::Elements {
                elem_count: idx_count,
                clip_rect: clip,
                texture_id: tex,
            });
        }

        Some(base as DrawIdx)
    }

    fn prim_quad_uv(&mut self, min: Vec2, max: Vec2, uv0: [f32; 2], uv1: [f32; 2], col: [u8; 4]) {
        let Some(i) = self.prim_reserve(6, 4) else { return };

        self.vtx_buffer.extend_from_slice(&[
            DrawVert { pos: [min.x, min.y], uv: [uv0[0], uv0[1]], col },
            DrawVert { pos: [max.x, min.y], uv: [uv1[0], uv0[1]], col },
            DrawVert { pos: [max.x, max.y], uv: [uv1[0], uv1[1]], col },
            DrawVert { pos: [min.x, max.y], uv: [uv0[0], uv1[1]], col },
        ]);
        self.idx_buffer.extend_from_slice(&[i, i + 1, i + 2, i, i + 2, i + 3]);
    }

    pub fn add_rect_filled(&mut self, min: Vec2, max: Vec2, col: [u8; 4]) {
        if col[3] == 0 || max.x <= min.x || max.y <= min.y {
            return;
        }
        let uv = self.white_uv;
        self.prim_quad_uv(min, max, uv, uv, col);
    }

    /// Outline drawn as four filled bands inside `[min, max]`.
    pub fn add_rect(&mut self, min: Vec2, max: Vec2, col: [u8; 4], thickness: f32) {
        let t = thickness;
        self.add_rect_filled(min, Vec2::new(max.x, min.y + t), col);
        self.add_rect_filled(Vec2::new(min.x, max.y - t), max, col);
        self.add_rect_filled(Vec2::new(min.x, min.y + t), Vec2::new(min.x + t, max.y - t), col);
        self.add_rect_filled(Vec2::new(max.x - t, min.y + t), Vec2::new(max.x, max.y - t), col);
    }

    pub fn add_triangle_filled(&mut self, a: Vec2, b: Vec2, c: Vec2, col: [u8; 4]) {
        if col[3] == 0 {
            return;
        }
        let Some(i) = self.prim_reserve(3, 3) else { return };
        let uv = self.white_uv;
        for p in [a, b, c] {
            self.vtx_buffer.push(DrawVert { pos: [p.x, p.y], uv, col });
        }
        self.idx_buffer.extend_from_slice(&[i, i + 1, i + 2]);
    }

    pub fn add_image(&mut self, texture: TextureId, min: Vec2, max: Vec2, uv0: [f32; 2], uv1: [f32; 2], col: [u8; 4]) {
        self.push_texture_id(texture);
        self.prim_quad_uv(min, max, uv0, uv1, col);
        self.pop_texture_id();
    }

    /// Lays out `text` starting at `pos` (top-left of the first line).
    pub fn add_text(&mut self, font: &FontAtlas, pos: Vec2, col: [u8; 4], text: &str) {
        if col[3] == 0 {
            return;
        }

        self.push_texture_id(TextureId::Font);
        let mut pen = pos;
        for c in text.chars() {
            if c == '\n' {
                pen = Vec2::new(pos.x, pen.y + font.line_height());
                continue;
            }
            if let Some(g) = font.glyph(c).copied() {
                if g.size.x > 0.0 && g.size.y > 0.0 {
                    let min = Vec2::new((pen.x + g.offset.x).round(), (pen.y + g.offset.y).round());
                    self.prim_quad_uv(min, min + g.size, g.uv0, g.uv1, col);
                }
            }
            pen.x += font.advance(c);
        }
        self.pop_texture_id();
    }

    /// Appends a hook; geometry added afterwards starts a new command.
    pub fn add_callback(&mut self, callback: DrawCallback) {
        let clip_rect = self.current_clip();
        self.cmd_buffer.push(DrawCmd::Callback { callback, clip_rect });
    }
}

/// Everything to paint for one frame.
#[derive(Debug, Default, Clone)]
pub struct DrawData {
    pub draw_lists: Vec<DrawList>,
    /// Top-left of the displayed area in logical px.
    pub display_pos: Vec2,
    pub display_size: Vec2,
    pub framebuffer_scale: Vec2,
}

impl DrawData {
    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }

    /// Converts every clip rect from logical px to framebuffer px.
    pub fn scale_clip_rects(&mut self, scale: Vec2) {
        let origin = self.display_pos;
        for cmd in self.draw_lists.iter_mut().flat_map(|l| l.cmd_buffer.iter_mut()) {
            let c = cmd.clip_rect_mut();
            *c = [
                (c[0] - origin.x) * scale.x,
                (c[1] - origin.y) * scale.y,
                (c[2] - origin.x) * scale.x,
                (c[3] - origin.y) * scale.y,
            ];
        }
    }
}
