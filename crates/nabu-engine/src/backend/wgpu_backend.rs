use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Result};

use super::{
    AttribDecl, AttribType, BackendStats, BlendFactor, ProgramHandle, RenderBackend, RenderState,
    ScissorRect, TextureFormat, TextureHandle, TransientIndexBuffer, TransientPool,
    TransientPoolConfig, TransientVertexBuffer, UniformHandle, UniformKind, VertexLayout, ViewId,
};

const MAT4_BYTES: u64 = 64;

const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

// ── handle slots ──────────────────────────────────────────────────────────

/// Dense storage addressed by 16-bit handles. Freed handles are reused.
struct Slots<T> {
    items: Vec<Option<T>>,
    free: Vec<u16>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { items: Vec::new(), free: Vec::new() }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> Option<u16> {
        if let Some(id) = self.free.pop() {
            self.items[id as usize] = Some(value);
            return Some(id);
        }
        let id = u16::try_from(self.items.len()).ok()?;
        self.items.push(Some(value));
        Some(id)
    }

    fn get(&self, id: u16) -> Option<&T> {
        self.items.get(id as usize).and_then(Option::as_ref)
    }

    fn remove(&mut self, id: u16) -> Option<T> {
        let value = self.items.get_mut(id as usize)?.take()?;
        self.free.push(id);
        Some(value)
    }

    fn len(&self) -> usize {
        self.items.len() - self.free.len()
    }
}

// ── recorded state ────────────────────────────────────────────────────────

struct GpuTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

struct Uniform {
    name: String,
    kind: UniformKind,
}

#[derive(Debug, Clone, Default)]
struct Pending {
    state: RenderState,
    scissor: Option<ScissorRect>,
    texture: Option<TextureHandle>,
    vertex: Option<TransientVertexBuffer>,
    index: Option<(TransientIndexBuffer, u32, u32)>,
}

#[derive(Debug, Clone)]
struct Draw {
    program: ProgramHandle,
    pending: Pending,
}

impl Draw {
    fn pipeline_key(&self) -> Option<PipelineKey> {
        let vertex = self.pending.vertex.as_ref()?;
        Some(PipelineKey {
            program: self.program,
            state: self.pending.state,
            layout: vertex.layout.clone(),
        })
    }
}

struct ViewState {
    rect: Option<(u16, u16, u16, u16)>,
    clear: Option<u32>,
    proj: [f32; 16],
    touched: bool,
    draws: Vec<Draw>,
    ubo: Option<(wgpu::Buffer, wgpu::BindGroup)>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            rect: None,
            clear: None,
            proj: IDENTITY,
            touched: false,
            draws: Vec::new(),
            ubo: None,
        }
    }
}

impl ViewState {
    fn is_active(&self) -> bool {
        self.touched || !self.draws.is_empty()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    state: RenderState,
    layout: VertexLayout,
}

// ── backend ───────────────────────────────────────────────────────────────

/// [`RenderBackend`] over wgpu.
///
/// Calls between two [`WgpuBackend::frame`]s only record. `frame` uploads the
/// transient arenas, encodes one render pass per active view in ascending id
/// order and resets all frame-scoped state.
///
/// Bind groups: group 0 holds the view's projection matrix, group 1 the bound
/// texture with a linear clamp sampler.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,

    sampler: wgpu::Sampler,
    view_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,

    textures: Slots<GpuTexture>,
    uniforms: Slots<Uniform>,
    programs: Slots<wgpu::ShaderModule>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    views: BTreeMap<ViewId, ViewState>,
    pending: Pending,

    pool: TransientPool,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,

    stats: BackendStats,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        target_format: wgpu::TextureFormat,
        pool: TransientPoolConfig,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("nabu sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let view_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu view bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(MAT4_BYTES),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("nabu texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("nabu pipeline layout"),
            bind_group_layouts: &[&view_bgl, &texture_bgl],
            immediate_size: 0,
        });

        Self {
            device,
            queue,
            target_format,
            sampler,
            view_bgl,
            texture_bgl,
            pipeline_layout,
            textures: Slots::default(),
            uniforms: Slots::default(),
            programs: Slots::default(),
            pipelines: HashMap::new(),
            views: BTreeMap::new(),
            pending: Pending::default(),
            pool: TransientPool::new(pool),
            vertex_buffer: None,
            index_buffer: None,
            stats: BackendStats::default(),
        }
    }

    /// Encodes everything recorded since the last frame into `encoder`,
    /// rendering into `target` of `size` physical pixels.
    pub fn frame(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, size: (u32, u32)) {
        self.upload_transients();
        self.prepare_pipelines();
        self.prepare_view_uniforms();

        let mut num_draws = 0;
        let mut num_views = 0;

        for (&id, view) in self.views.iter().filter(|(_, v)| v.is_active()) {
            num_views += 1;

            let load = match view.clear {
                Some(rgba) => wgpu::LoadOp::Clear(rgba_to_color(rgba)),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("nabu view pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some((x, y, w, h)) = clamp_view_rect(view.rect, size) {
                rpass.set_viewport(x as f32, y as f32, w as f32, h as f32, 0.0, 1.0);
            }

            let Some((_, view_bg)) = view.ubo.as_ref() else {
                log::debug!("WgpuBackend: view {id} has no uniform bind group");
                continue;
            };

            let (Some(vbuf), Some(ibuf)) = (self.vertex_buffer.as_ref(), self.index_buffer.as_ref()) else {
                continue;
            };

            for draw in &view.draws {
                let p = &draw.pending;
                let (Some(vb), Some((ib, first, num))) = (p.vertex.as_ref(), p.index.as_ref()) else {
                    continue;
                };
                if *num == 0 || vb.size == 0 || ib.size == 0 {
                    continue;
                }

                let Some(pipeline) = draw.pipeline_key().and_then(|k| self.pipelines.get(&k)) else {
                    continue;
                };
                let Some(texture) = p.texture.and_then(|t| self.textures.get(t.0)) else {
                    continue;
                };

                let (sx, sy, sw, sh) = clamp_scissor(p.scissor, size);
                if sw == 0 || sh == 0 {
                    continue;
                }

                rpass.set_scissor_rect(sx, sy, sw, sh);
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, view_bg, &[]);
                rpass.set_bind_group(1, &texture.bind_group, &[]);
                rpass.set_vertex_buffer(0, vbuf.slice(u64::from(vb.offset)..u64::from(vb.offset + vb.size)));
                rpass.set_index_buffer(
                    ibuf.slice(u64::from(ib.offset)..u64::from(ib.offset + ib.size)),
                    wgpu::IndexFormat::Uint16,
                );
                rpass.draw_indexed(*first..first + num, 0, 0..1);
                num_draws += 1;
            }
        }

        self.stats = BackendStats {
            num_draws,
            num_views,
            transient_vb_used: self.pool.vertex_used(),
            transient_ib_used: self.pool.index_used(),
        };

        self.end_frame();
    }

    /// Drops everything recorded this frame, e.g. when no surface texture was available.
    pub fn discard_frame(&mut self) {
        self.end_frame();
    }

    fn end_frame(&mut self) {
        for view in self.views.values_mut() {
            view.draws.clear();
            view.touched = false;
        }
        self.pending = Pending::default();
        self.pool.reset();
    }

    // ── frame preparation ────────────────────────────────────────────────

    fn upload_transients(&mut self) {
        let vertices = self.pool.staged_vertices();
        if !vertices.is_empty() {
            let buf = ensure_buffer(
                &self.device,
                &mut self.vertex_buffer,
                vertices.len() as u64,
                wgpu::BufferUsages::VERTEX,
                "nabu transient vb",
            );
            self.queue.write_buffer(buf, 0, vertices);
        }

        let indices = self.pool.staged_indices();
        if !indices.is_empty() {
            let buf = ensure_buffer(
                &self.device,
                &mut self.index_buffer,
                indices.len() as u64,
                wgpu::BufferUsages::INDEX,
                "nabu transient ib",
            );
            self.queue.write_buffer(buf, 0, indices);
        }
    }

    fn prepare_pipelines(&mut self) {
        let missing: Vec<PipelineKey> = self
            .views
            .values()
            .flat_map(|v| v.draws.iter())
            .filter_map(Draw::pipeline_key)
            .filter(|k| !self.pipelines.contains_key(k))
            .collect();

        for key in missing {
            if self.pipelines.contains_key(&key) {
                continue;
            }
            if let Some(pipeline) = self.create_pipeline(&key) {
                self.pipelines.insert(key, pipeline);
            }
        }
    }

    fn prepare_view_uniforms(&mut self) {
        for view in self.views.values_mut().filter(|v| v.is_active()) {
            let (buffer, _) = view.ubo.get_or_insert_with(|| {
                let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("nabu view ubo"),
                    size: MAT4_BYTES,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("nabu view bind group"),
                    layout: &self.view_bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                (buffer, bind_group)
            });
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&view.proj));
        }
    }

    fn create_pipeline(&self, key: &PipelineKey) -> Option<wgpu::RenderPipeline> {
        let Some(module) = self.programs.get(key.program.0) else {
            log::debug!("WgpuBackend: draw references destroyed program {:?}", key.program);
            return None;
        };

        let attributes: Vec<wgpu::VertexAttribute> = key
            .layout
            .attribs()
            .iter()
            .map(|a| {
                vertex_format(a).map(|format| wgpu::VertexAttribute {
                    format,
                    offset: u64::from(a.offset),
                    shader_location: a.attrib as u32,
                })
            })
            .collect::<Option<_>>()
            .or_else(|| {
                log::warn!("WgpuBackend: unsupported vertex layout {:?}", key.layout);
                None
            })?;

        let mut write_mask = wgpu::ColorWrites::empty();
        if key.state.write_rgb {
            write_mask |= wgpu::ColorWrites::COLOR;
        }
        if key.state.write_alpha {
            write_mask |= wgpu::ColorWrites::ALPHA;
        }

        let blend = key.state.blend.map(|(src, dst)| {
            let component = wgpu::BlendComponent {
                src_factor: blend_factor(src),
                dst_factor: blend_factor(dst),
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState { color: component, alpha: component }
        });

        log::debug!("WgpuBackend: creating pipeline for {:?} {:?}", key.program, key.state);

        Some(self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("nabu pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: u64::from(key.layout.stride()),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.target_format,
                    blend,
                    write_mask,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            // Single-sampled target; `RenderState::msaa` has nothing to resolve into.
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        }))
    }

    fn view_mut(&mut self, view: ViewId) -> &mut ViewState {
        self.views.entry(view).or_default()
    }
}

impl RenderBackend for WgpuBackend {
    fn create_texture_2d(
        &mut self,
        width: u16,
        height: u16,
        format: TextureFormat,
        data: &[u8],
    ) -> Result<TextureHandle> {
        let TextureFormat::Rgba8 = format;
        let (w, h) = (u32::from(width), u32::from(height));
        if w == 0 || h == 0 {
            bail!("texture has zero size ({w}x{h})");
        }
        if data.len() != (w * h * 4) as usize {
            bail!("texture data is {} bytes, expected {} for {w}x{h} RGBA8", data.len(), w * h * 4);
        }

        let size = wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("nabu texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w * 4),
                rows_per_image: Some(h),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("nabu texture bind group"),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let Some(id) = self.textures.insert(GpuTexture { _texture: texture, bind_group }) else {
            bail!("texture handles exhausted");
        };
        log::debug!("WgpuBackend: texture {id} created ({w}x{h})");
        Ok(TextureHandle(id))
    }

    fn create_uniform(&mut self, name: &str, kind: UniformKind) -> Result<UniformHandle> {
        let uniform = Uniform { name: name.to_owned(), kind };
        match self.uniforms.insert(uniform) {
            Some(id) => Ok(UniformHandle(id)),
            None => bail!("uniform handles exhausted"),
        }
    }

    fn create_program(&mut self, label: &str, wgsl: &str) -> Result<ProgramHandle> {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(wgsl.to_owned().into()),
        });
        match self.programs.insert(module) {
            Some(id) => Ok(ProgramHandle(id)),
            None => bail!("program handles exhausted"),
        }
    }

    fn destroy_texture(&mut self, handle: TextureHandle) {
        if self.textures.remove(handle.0).is_none() {
            log::debug!("WgpuBackend: destroy of unknown {handle:?}");
        }
    }

    fn destroy_uniform(&mut self, handle: UniformHandle) {
        if self.uniforms.remove(handle.0).is_none() {
            log::debug!("WgpuBackend: destroy of unknown {handle:?}");
        }
    }

    fn destroy_program(&mut self, handle: ProgramHandle) {
        if self.programs.remove(handle.0).is_none() {
            log::debug!("WgpuBackend: destroy of unknown {handle:?}");
        }
        self.pipelines.retain(|k, _| k.program != handle);
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
        self.view_mut(view).proj = proj;
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
        self.pending.state = state;
    }

    fn set_texture(&mut self, stage: u8, sampler: UniformHandle, texture: TextureHandle) {
        if stage != 0 {
            log::debug!("WgpuBackend: only texture stage 0 is bound; ignoring stage {stage}");
            return;
        }
        match self.uniforms.get(sampler.0) {
            Some(u) if u.kind == UniformKind::Sampler => self.pending.texture = Some(texture),
            Some(u) => log::debug!("WgpuBackend: uniform '{}' is not a sampler", u.name),
            None => log::debug!("WgpuBackend: unknown sampler {sampler:?}"),
        }
    }

    fn set_vertex_buffer(&mut self, stream: u8, tvb: &TransientVertexBuffer) {
        if stream != 0 {
            log::debug!("WgpuBackend: only vertex stream 0 is bound; ignoring stream {stream}");
            return;
        }
        self.pending.vertex = Some(tvb.clone());
    }

    fn set_index_buffer(&mut self, tib: &TransientIndexBuffer, first: u32, num: u32) {
        self.pending.index = Some((*tib, first, num));
    }

    fn submit(&mut self, view: ViewId, program: ProgramHandle) {
        let pending = std::mem::take(&mut self.pending);
        self.view_mut(view).draws.push(Draw { program, pending });
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }
}

impl Drop for WgpuBackend {
    fn drop(&mut self) {
        let leaked = self.textures.len() + self.uniforms.len() + self.programs.len();
        if leaked > 0 {
            log::debug!("WgpuBackend: {leaked} handles still alive at drop");
        }
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn ensure_buffer<'a>(
    device: &wgpu::Device,
    slot: &'a mut Option<wgpu::Buffer>,
    required: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
) -> &'a wgpu::Buffer {
    if slot.as_ref().is_some_and(|b| b.size() < required) {
        *slot = None;
    }
    slot.get_or_insert_with(|| {
        let size = required.next_power_of_two().max(4096);
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    })
}

fn vertex_format(a: &AttribDecl) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    match (a.ty, a.count, a.normalized) {
        (AttribType::Float, 1, _) => Some(F::Float32),
        (AttribType::Float, 2, _) => Some(F::Float32x2),
        (AttribType::Float, 3, _) => Some(F::Float32x3),
        (AttribType::Float, 4, _) => Some(F::Float32x4),
        (AttribType::Uint8, 4, true) => Some(F::Unorm8x4),
        (AttribType::Uint8, 4, false) => Some(F::Uint8x4),
        _ => None,
    }
}

fn blend_factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::InvSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
    }
}

fn rgba_to_color(rgba: u32) -> wgpu::Color {
    let channel = |shift: u32| f64::from((rgba >> shift) & 0xff) / 255.0;
    wgpu::Color {
        r: channel(24),
        g: channel(16),
        b: channel(8),
        a: channel(0),
    }
}

/// Restricts a scissor to the target. `None` covers the whole target.
fn clamp_scissor(rect: Option<ScissorRect>, (tw, th): (u32, u32)) -> (u32, u32, u32, u32) {
    let Some(r) = rect else {
        return (0, 0, tw, th);
    };
    let x = u32::from(r.x).min(tw);
    let y = u32::from(r.y).min(th);
    let w = u32::from(r.w).min(tw - x);
    let h = u32::from(r.h).min(th - y);
    (x, y, w, h)
}

/// Viewport for a view rect, `None` when unset or fully outside the target.
fn clamp_view_rect(rect: Option<(u16, u16, u16, u16)>, size: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let (x, y, w, h) = rect?;
    let clamped = clamp_scissor(Some(ScissorRect { x, y, w, h }), size);
    (clamped.2 > 0 && clamped.3 > 0).then_some(clamped)
}
