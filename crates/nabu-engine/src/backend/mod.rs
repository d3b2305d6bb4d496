//! GPU rendering collaborator.
//!
//! [`RenderBackend`] is a view/pass submission API: state is set piecewise
//! (scissor, blend state, textures, buffers) and captured by `submit`, which
//! records one draw into a numbered view. Views flush in ascending id order at
//! the backend's frame boundary. [`WgpuBackend`] implements it over wgpu.

mod pool;
mod wgpu_backend;

pub use pool::{TransientPool, TransientPoolConfig};
pub use wgpu_backend::WgpuBackend;

/// Numbered render pass.
pub type ViewId = u16;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(pub u16);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformHandle(pub u16);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(pub u16);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Sampler,
    Mat4,
}

// ── vertex layout ─────────────────────────────────────────────────────────

/// Vertex attribute semantic. The discriminant is the shader location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Attrib {
    Position = 0,
    TexCoord0 = 1,
    Color0 = 2,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AttribType {
    Uint8,
    Float,
}

impl AttribType {
    fn size(self) -> u32 {
        match self {
            AttribType::Uint8 => 1,
            AttribType::Float => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribDecl {
    pub attrib: Attrib,
    pub count: u8,
    pub ty: AttribType,
    /// Integer data is mapped to `[0, 1]` in the shader.
    pub normalized: bool,
    pub offset: u32,
}

/// Interleaved vertex format, built in declaration order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    attribs: Vec<AttribDecl>,
    stride: u32,
}

impl VertexLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, attrib: Attrib, count: u8, ty: AttribType, normalized: bool) -> Self {
        self.attribs.push(AttribDecl {
            attrib,
            count,
            ty,
            normalized,
            offset: self.stride,
        });
        self.stride += u32::from(count) * ty.size();
        self
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn attribs(&self) -> &[AttribDecl] {
        &self.attribs
    }
}

// ── render state ──────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    InvSrcAlpha,
}

/// Fixed-function state captured by the next `submit`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderState {
    pub write_rgb: bool,
    pub write_alpha: bool,
    /// Multisampled rasterization when the target supports it.
    pub msaa: bool,
    /// `(src, dst)` factors applied to color and alpha. `None` disables blending.
    pub blend: Option<(BlendFactor, BlendFactor)>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            write_rgb: true,
            write_alpha: true,
            msaa: false,
            blend: None,
        }
    }
}

/// Pixel rectangle; `w == 0` or `h == 0` discards the draw.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ScissorRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

// ── transient buffers ─────────────────────────────────────────────────────

/// Frame-scoped vertex storage returned by `alloc_transient_vertex_buffer`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientVertexBuffer {
    /// Byte offset into the backend's frame vertex arena.
    pub offset: u32,
    pub size: u32,
    pub num: u32,
    pub layout: VertexLayout,
}

/// Frame-scoped 16-bit index storage.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransientIndexBuffer {
    pub offset: u32,
    pub size: u32,
    pub num: u32,
}

/// Counters for the last flushed frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BackendStats {
    pub num_draws: u32,
    pub num_views: u32,
    pub transient_vb_used: u32,
    pub transient_ib_used: u32,
}

/// View/pass submission API used by the GUI bridge.
///
/// Creation failures are reported as errors; per-draw calls never fail and
/// silently drop work they cannot perform.
pub trait RenderBackend {
    fn create_texture_2d(
        &mut self,
        width: u16,
        height: u16,
        format: TextureFormat,
        data: &[u8],
    ) -> anyhow::Result<TextureHandle>;
    fn create_uniform(&mut self, name: &str, kind: UniformKind) -> anyhow::Result<UniformHandle>;
    /// Compiles a program from WGSL with `vs_main`/`fs_main` entry points.
    fn create_program(&mut self, label: &str, wgsl: &str) -> anyhow::Result<ProgramHandle>;

    fn destroy_texture(&mut self, handle: TextureHandle);
    fn destroy_uniform(&mut self, handle: UniformHandle);
    fn destroy_program(&mut self, handle: ProgramHandle);

    /// How many of `num` vertices fit in this frame's transient storage.
    fn avail_transient_vertex_buffer(&self, num: u32, layout: &VertexLayout) -> u32;
    /// How many of `num` 16-bit indices fit in this frame's transient storage.
    fn avail_transient_index_buffer(&self, num: u32) -> u32;
    fn alloc_transient_vertex_buffer(&mut self, num: u32, layout: &VertexLayout) -> Option<TransientVertexBuffer>;
    fn alloc_transient_index_buffer(&mut self, num: u32) -> Option<TransientIndexBuffer>;
    /// Writable bytes of an allocation, exactly `tvb.size` long.
    fn transient_vertex_data_mut(&mut self, tvb: &TransientVertexBuffer) -> &mut [u8];
    fn transient_index_data_mut(&mut self, tib: &TransientIndexBuffer) -> &mut [u8];

    fn set_view_rect(&mut self, view: ViewId, x: u16, y: u16, width: u16, height: u16);
    /// Column-major clip-from-view matrix.
    fn set_view_transform(&mut self, view: ViewId, proj: [f32; 16]);
    /// Clears color to `rgba` (0xRRGGBBAA) at the start of the view.
    fn set_view_clear(&mut self, view: ViewId, rgba: u32);
    /// Flushes the view this frame even without draws.
    fn touch(&mut self, view: ViewId);

    fn set_scissor(&mut self, rect: ScissorRect);
    fn set_state(&mut self, state: RenderState);
    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle);
    fn set_vertex_buffer(&mut self, stream: u8, tvb: &TransientVertexBuffer);
    fn set_index_buffer(&mut self, tib: &TransientIndexBuffer, first: u32, num: u32);
    /// Records a draw with the pending state into `view`, then resets the pending state.
    fn submit(&mut self, view: ViewId, program: ProgramHandle);

    fn stats(&self) -> BackendStats;
}
