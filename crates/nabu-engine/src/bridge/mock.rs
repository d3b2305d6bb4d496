//! Recording collaborators for bridge tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;

use anyhow::{bail, Result};
use nabu_gui::{ClipboardBackend, MouseCursor};

use crate::backend::{
    BackendStats, ProgramHandle, RenderBackend, RenderState, ScissorRect, TextureFormat, TextureHandle,
    TransientIndexBuffer, TransientPool, TransientPoolConfig, TransientVertexBuffer, UniformHandle,
    UniformKind, VertexLayout, ViewId,
};
use crate::platform::{CursorMode, Platform};

// ── backend ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingDraw {
    pub scissor: Option<ScissorRect>,
    pub state: Option<RenderState>,
    pub texture: Option<(u8, UniformHandle, TextureHandle)>,
    pub vertex: Option<TransientVertexBuffer>,
    pub index: Option<(TransientIndexBuffer, u32, u32)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub view: ViewId,
    pub program: ProgramHandle,
    pub draw: PendingDraw,
}

impl Submission {
    pub fn index_range(&self) -> Option<Range<u32>> {
        self.draw.index.map(|(_, first, num)| first..first + num)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewRecord {
    pub rect: Option<(u16, u16, u16, u16)>,
    pub transform: Option<[f32; 16]>,
    pub clear: Option<u32>,
    pub touched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRecord {
    pub handle: TextureHandle,
    pub width: u16,
    pub height: u16,
    pub bytes: usize,
}

pub struct MockBackend {
    pool: TransientPool,
    next_handle: u16,
    pub fail_program: bool,

    pub textures: Vec<TextureRecord>,
    pub uniforms: Vec<(UniformHandle, String, UniformKind)>,
    pub programs: Vec<(ProgramHandle, String)>,
    pub destroyed_textures: Vec<TextureHandle>,
    pub destroyed_uniforms: Vec<UniformHandle>,
    pub destroyed_programs: Vec<ProgramHandle>,

    views: HashMap<ViewId, ViewRecord>,
    pending: PendingDraw,
    pub submissions: Vec<Submission>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::with_pool(TransientPoolConfig::default())
    }
}

impl MockBackend {
    pub fn with_pool(config: TransientPoolConfig) -> Self {
        Self {
            pool: TransientPool::new(config),
            next_handle: 1,
            fail_program: false,
            textures: Vec::new(),
            uniforms: Vec::new(),
            programs: Vec::new(),
            destroyed_textures: Vec::new(),
            destroyed_uniforms: Vec::new(),
            destroyed_programs: Vec::new(),
            views: HashMap::new(),
            pending: PendingDraw::default(),
            submissions: Vec::new(),
        }
    }

    pub fn view(&self, view: ViewId) -> ViewRecord {
        self.views.get(&view).cloned().unwrap_or_default()
    }

    pub fn vertex_bytes(&mut self, tvb: &TransientVertexBuffer) -> &[u8] {
        self.pool.vertex_bytes_mut(tvb.offset, tvb.size)
    }

    pub fn index_bytes(&mut self, tib: &TransientIndexBuffer) -> &[u8] {
        self.pool.index_bytes_mut(tib.offset, tib.size)
    }

    fn handle(&mut self) -> u16 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    fn view_mut(&mut self, view: ViewId) -> &mut ViewRecord {
        self.views.entry(view).or_default()
    }
}

impl RenderBackend for MockBackend {
    fn create_texture_2d(&mut self, width: u16, height: u16, _format: TextureFormat, data: &[u8]) -> Result<TextureHandle> {
        let handle = TextureHandle(self.handle());
        self.textures.push(TextureRecord { handle, width, height, bytes: data.len() });
        Ok(handle)
    }

    fn create_uniform(&mut self, name: &str, kind: UniformKind) -> Result<UniformHandle> {
        let handle = UniformHandle(self.handle());
        self.uniforms.push((handle, name.to_owned(), kind));
        Ok(handle)
    }

    fn create_program(&mut self, label: &str, _wgsl: &str) -> Result<ProgramHandle> {
        if self.fail_program {
            bail!("shader rejected");
        }
        let handle = ProgramHandle(self.handle());
        self.programs.push((handle, label.to_owned()));
        Ok(handle)
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        self.destroyed_textures.push(handle);
    }

    fn destroy_uniform(&mut self, handle: UniformHandle) {
        self.destroyed_uniforms.push(handle);
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        self.destroyed_programs.push(handle);
    }

    fn avail_transient_vertex_buffer(&self, num: u32, layout: &VertexLayout) -> u32 {
        self.pool.avail_vertices(num, layout.stride())
    }

    fn avail_transient_index_buffer(&self, num: u32) -> u32 {
        self.pool.avail_indices(num)
    }

    fn alloc_transient_vertex_buffer(&mut self, num: u32, layout: &VertexLayout) -> Option<TransientVertexBuffer> {
        let (offset, size) = self.pool.alloc_vertices(num, layout.stride())?;
        Some(TransientVertexBuffer { offset, size, num, layout: layout.clone() })
    }

    fn alloc_transient_index_buffer(&mut self, num: u32) -> Option<TransientIndexBuffer> {
        let (offset, size) = self.pool.alloc_indices(num)?;
        Some(TransientIndexBuffer { offset, size, num })
    }

    fn transient_vertex_data_mut(&mut self, tvb: &TransientVertexBuffer) -> &mut [u8] {
        self.pool.vertex_bytes_mut(tvb.offset, tvb.size)
    }

    fn transient_index_data_mut(&mut self, tib: &TransientIndexBuffer) -> &mut [u8] {
        self.pool.index_bytes_mut(tib.offset, tib.size)
    }

    fn set_view_rect(&mut self, view: ViewId, x: u16, y: u16, width: u16, height: u16) {
        self.view_mut(view).rect = Some((x, y, width, height));
    }

    fn set_view_transform(&mut self, view: ViewId, proj: [f32; 16]) {
        self.view_mut(view).transform = Some(proj);
    }

    fn set_view_clear(&mut self, view: ViewId, rgba: u32) {
        self.view_mut(view).clear = Some(rgba);
    }

    fn touch(&mut self, view: ViewId) {
        self.view_mut(view).touched = true;
    }

    fn set_scissor(&mut self, rect: ScissorRect) {
        self.pending.scissor = Some(rect);
    }

    fn set_state(&mut self, state: RenderState) {
        self.pending.state = Some(state);
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        self.pending.texture = Some((stage, sampler, texture));
    }

    fn set_vertex_buffer(&mut self, _stream: u8, tvb: &TransientVertexBuffer) {
        self.pending.vertex = Some(tvb.clone());
    }

    fn set_index_buffer(&mut self, tib: &TransientIndexBuffer, first: u32, num: u32) {
        self.pending.index = Some((*tib, first, num));
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        let draw = std::mem::take(&mut self.pending);
        self.submissions.push(Submission { view, program, draw });
    }

    fn stats(&self) -> BackendStats {
        BackendStats {
            num_draws: self.submissions.len() as u32,
            transient_vb_used: self.pool.vertex_used(),
            transient_ib_used: self.pool.index_used(),
            ..BackendStats::default()
        }
    }
}

// ── platform ──────────────────────────────────────────────────────────────

/// Clipboard shared between the mock platform and the GUI.
#[derive(Debug, Clone, Default)]
pub struct MockClipboard(pub Rc<RefCell<Option<String>>>);

impl ClipboardBackend for MockClipboard {
    fn get(&mut self) -> Option<String> {
        self.0.borrow().clone()
    }

    fn set(&mut self, text: &str) {
        *self.0.borrow_mut() = Some(text.to_owned());
    }
}

/// Native cursors are modelled by the shape they were created for.
#[derive(Debug, Default)]
pub struct MockPlatform {
    pub window: (u32, u32),
    pub framebuffer: (u32, u32),
    pub focused: bool,
    pub cursor: Option<(f64, f64)>,
    pub mode: CursorMode,

    pub warps: Vec<(f64, f64)>,
    pub unsupported: Vec<MouseCursor>,
    pub current: Option<MouseCursor>,
    pub destroyed: Vec<MouseCursor>,

    pub no_clipboard: bool,
    pub clipboard: MockClipboard,
}

impl Platform for MockPlatform {
    type Cursor = MouseCursor;

    fn window_size(&self) -> (u32, u32) {
        self.window
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.cursor
    }

    fn set_cursor_pos(&mut self, x: f64, y: f64) {
        self.warps.push((x, y));
        self.cursor = Some((x, y));
    }

    fn cursor_mode(&self) -> CursorMode {
        self.mode
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.mode = mode;
    }

    fn create_standard_cursor(&mut self, shape: MouseCursor) -> Option<MouseCursor> {
        (!self.unsupported.contains(&shape)).then_some(shape)
    }

    fn set_cursor(&mut self, cursor: &MouseCursor) {
        self.current = Some(*cursor);
    }

    fn destroy_cursor(&mut self, cursor: MouseCursor) {
        self.destroyed.push(cursor);
    }

    fn create_clipboard(&mut self) -> Option<Box<dyn ClipboardBackend>> {
        if self.no_clipboard {
            return None;
        }
        Some(Box::new(self.clipboard.clone()))
    }
}
