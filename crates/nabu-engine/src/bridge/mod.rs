//! Per-frame bridge between the GUI, the platform and the render backend.
//!
//! Frame order:
//!
//! 1. [`input::apply_event`] for every platform event;
//! 2. [`GuiBridge::sync_frame`] before `Context::new_frame`;
//! 3. GUI logic, then `Context::render`;
//! 4. [`GuiBridge::render_draw_data`] with the produced draw data.

use std::borrow::Cow;

use anyhow::{Context as _, Result};
use nabu_gui::{Context, DrawData, NavKey};

use crate::backend::{
    Attrib, AttribType, ProgramHandle, RenderBackend, TextureFormat, TextureHandle, UniformHandle,
    UniformKind, VertexLayout, ViewId,
};
use crate::input::Key;
use crate::platform::Platform;

mod cursors;
pub mod frame;
pub mod input;
#[cfg(test)]
pub(crate) mod mock;
pub mod render;

pub use cursors::CursorRegistry;

/// Bridge setup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// View the GUI is drawn on. Higher ids are drawn later.
    pub view_id: ViewId,
    /// WGSL with `vs_main`/`fs_main`, a `mat4x4` at group 0 and the texture
    /// and sampler at group 1.
    pub shader: Cow<'static, str>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            view_id: 200,
            shader: Cow::Borrowed(include_str!("../backend/gui.wgsl")),
        }
    }
}

/// GPU objects owned by the bridge between `init` and `shutdown`.
#[derive(Debug, Clone)]
pub struct GuiResources {
    pub layout: VertexLayout,
    pub font_texture: TextureHandle,
    /// `s_tex`, the sampler the font and user images are bound to.
    pub sampler: UniformHandle,
    pub program: ProgramHandle,
}

/// Vertex layout matching `nabu_gui::DrawVert`.
pub fn gui_vertex_layout() -> VertexLayout {
    VertexLayout::new()
        .add(Attrib::Position, 2, AttribType::Float, false)
        .add(Attrib::TexCoord0, 2, AttribType::Float, false)
        .add(Attrib::Color0, 4, AttribType::Uint8, true)
}

fn nav_key(key: NavKey) -> Key {
    match key {
        NavKey::Tab => Key::Tab,
        NavKey::LeftArrow => Key::ArrowLeft,
        NavKey::RightArrow => Key::ArrowRight,
        NavKey::UpArrow => Key::ArrowUp,
        NavKey::DownArrow => Key::ArrowDown,
        NavKey::PageUp => Key::PageUp,
        NavKey::PageDown => Key::PageDown,
        NavKey::Home => Key::Home,
        NavKey::End => Key::End,
        NavKey::Insert => Key::Insert,
        NavKey::Delete => Key::Delete,
        NavKey::Backspace => Key::Backspace,
        NavKey::Space => Key::Space,
        NavKey::Enter => Key::Enter,
        NavKey::Escape => Key::Escape,
        NavKey::A => Key::A,
        NavKey::C => Key::C,
        NavKey::V => Key::V,
        NavKey::X => Key::X,
        NavKey::Y => Key::Y,
        NavKey::Z => Key::Z,
    }
}

/// GUI key map in terms of [`Key::code`].
pub fn key_map() -> [Option<usize>; NavKey::COUNT] {
    NavKey::ALL.map(|k| usize::try_from(nav_key(k).code()).ok())
}

/// Owns the cursor registry and GPU resources of the GUI overlay.
///
/// `C` is the platform's native cursor handle.
pub struct GuiBridge<C> {
    view: ViewId,
    resources: GuiResources,
    cursors: CursorRegistry<C>,
}

impl<C> GuiBridge<C> {
    /// Registers platform capabilities, key map and clipboard on the GUI, then
    /// creates the font texture, sampler, program and native cursors.
    pub fn init<P, B>(ctx: &mut Context, platform: &mut P, backend: &mut B, config: &BridgeConfig) -> Result<Self>
    where
        P: Platform<Cursor = C>,
        B: RenderBackend + ?Sized,
    {
        let io = ctx.io_mut();
        io.backend_flags.has_mouse_cursors = true;
        io.backend_flags.has_set_mouse_pos = true;
        io.key_map = key_map();
        match platform.create_clipboard() {
            Some(clipboard) => io.set_clipboard_backend(clipboard),
            None => log::debug!("GuiBridge: no clipboard available"),
        }

        let (width, height, pixels) = ctx.fonts().tex_data_rgba32();
        let w = u16::try_from(width).context("font atlas too wide")?;
        let h = u16::try_from(height).context("font atlas too tall")?;
        let font_texture = backend
            .create_texture_2d(w, h, TextureFormat::Rgba8, pixels)
            .context("failed to upload font atlas")?;
        let sampler = backend
            .create_uniform("s_tex", UniformKind::Sampler)
            .context("failed to create s_tex sampler")?;
        let program = backend
            .create_program("nabu gui", &config.shader)
            .context("failed to create GUI program")?;

        let cursors = CursorRegistry::create(platform);

        log::debug!(
            "GuiBridge: initialized (view {}, font atlas {width}x{height})",
            config.view_id
        );

        Ok(Self {
            view: config.view_id,
            resources: GuiResources {
                layout: gui_vertex_layout(),
                font_texture,
                sampler,
                program,
            },
            cursors,
        })
    }

    #[inline]
    pub fn view(&self) -> ViewId {
        self.view
    }

    #[inline]
    pub fn resources(&self) -> &GuiResources {
        &self.resources
    }

    /// Resizes the GUI view to the framebuffer.
    pub fn reset<B>(&self, backend: &mut B, width: u32, height: u32)
    where
        B: RenderBackend + ?Sized,
    {
        let w = u16::try_from(width).unwrap_or(u16::MAX);
        let h = u16::try_from(height).unwrap_or(u16::MAX);
        backend.set_view_rect(self.view, 0, 0, w, h);
    }

    /// See [`frame::sync_frame`].
    pub fn sync_frame<P>(&self, ctx: &mut Context, platform: &mut P, dt: f32)
    where
        P: Platform<Cursor = C>,
    {
        frame::sync_frame(ctx, &self.cursors, platform, dt);
    }

    /// See [`render::render_draw_data`].
    pub fn render_draw_data<B>(&self, backend: &mut B, data: &DrawData)
    where
        B: RenderBackend + ?Sized,
    {
        render::render_draw_data(backend, &self.resources, self.view, data);
    }

    /// Releases cursors and GPU resources and unregisters the clipboard.
    pub fn shutdown<P, B>(self, ctx: &mut Context, platform: &mut P, backend: &mut B)
    where
        P: Platform<Cursor = C>,
        B: RenderBackend + ?Sized,
    {
        self.cursors.destroy(platform);
        backend.destroy_uniform(self.resources.sampler);
        backend.destroy_texture(self.resources.font_texture);
        backend.destroy_program(self.resources.program);
        drop(ctx.io_mut().take_clipboard_backend());
        log::debug!("GuiBridge: shut down");
    }
}

#[cfg(test)]
mod tests {
    use nabu_gui::{FontConfig, Vec2, WindowOptions};

    use super::mock::{MockBackend, MockPlatform};
    use super::*;
    use crate::input::{Action, InputEvent, MouseButton};

    fn platform() -> MockPlatform {
        MockPlatform {
            window: (800, 600),
            framebuffer: (800, 600),
            focused: true,
            cursor: Some((400.0, 300.0)),
            ..MockPlatform::default()
        }
    }

    fn setup() -> (Context, MockPlatform, MockBackend, GuiBridge<nabu_gui::MouseCursor>) {
        let mut ctx = Context::create(FontConfig::default());
        let mut platform = platform();
        let mut backend = MockBackend::default();
        let bridge = GuiBridge::init(&mut ctx, &mut platform, &mut backend, &BridgeConfig::default()).unwrap();
        (ctx, platform, backend, bridge)
    }

    #[test]
    fn layout_matches_draw_vert() {
        let layout = gui_vertex_layout();
        assert_eq!(layout.stride() as usize, std::mem::size_of::<nabu_gui::DrawVert>());
        assert_eq!(layout.attribs()[2].offset, 16);
    }

    #[test]
    fn key_map_uses_platform_codes() {
        let map = key_map();
        assert_eq!(map[NavKey::Enter.index()], Some(257));
        assert_eq!(map[NavKey::Tab.index()], Some(258));
        assert_eq!(map[NavKey::A.index()], Some('A' as usize));
        assert!(map.iter().all(Option::is_some));
    }

    #[test]
    fn init_registers_capabilities_and_resources() {
        let (ctx, _platform, backend, bridge) = setup();

        let io = ctx.io();
        assert!(io.backend_flags.has_mouse_cursors && io.backend_flags.has_set_mouse_pos);
        assert_eq!(io.key_map[NavKey::Escape.index()], Some(256));

        let (w, h, pixels) = ctx.fonts().tex_data_rgba32();
        assert_eq!(backend.textures.len(), 1);
        let tex = &backend.textures[0];
        assert_eq!((u32::from(tex.width), u32::from(tex.height), tex.bytes), (w, h, pixels.len()));
        assert_eq!(tex.handle, bridge.resources().font_texture);

        assert_eq!(backend.uniforms, vec![(bridge.resources().sampler, "s_tex".to_owned(), UniformKind::Sampler)]);
        assert_eq!(backend.programs.len(), 1);
        assert_eq!(bridge.view(), 200);
    }

    #[test]
    fn init_wires_clipboard() {
        let (mut ctx, platform, _backend, _bridge) = setup();
        ctx.io_mut().set_clipboard_text("copied");
        assert_eq!(platform.clipboard.0.borrow().as_deref(), Some("copied"));
        assert_eq!(ctx.io_mut().clipboard_text().as_deref(), Some("copied"));
    }

    #[test]
    fn init_without_clipboard_still_succeeds() {
        let mut ctx = Context::create(FontConfig::default());
        let mut platform = MockPlatform {
            no_clipboard: true,
            ..platform()
        };
        let mut backend = MockBackend::default();
        let bridge = GuiBridge::init(&mut ctx, &mut platform, &mut backend, &BridgeConfig::default());

        assert!(bridge.is_ok());
        ctx.io_mut().set_clipboard_text("lost");
        assert_eq!(ctx.io_mut().clipboard_text(), None);
        assert!(ctx.io_mut().take_clipboard_backend().is_none());
        assert_eq!(*platform.clipboard.0.borrow(), None);
    }

    #[test]
    fn requested_warp_is_skipped_while_unfocused() {
        let (mut ctx, mut platform, _backend, bridge) = setup();
        platform.focused = false;
        ctx.io_mut().mouse_pos = Vec2::new(120.0, 80.0);
        ctx.io_mut().want_set_mouse_pos = true;

        bridge.sync_frame(&mut ctx, &mut platform, 1.0 / 60.0);

        assert!(!ctx.io().is_mouse_pos_valid());
        assert!(platform.warps.is_empty());
        assert_eq!(platform.cursor, Some((400.0, 300.0)));
    }

    #[test]
    fn init_fails_when_program_is_rejected() {
        let mut ctx = Context::create(FontConfig::default());
        let mut backend = MockBackend::default();
        backend.fail_program = true;
        let result = GuiBridge::init(&mut ctx, &mut platform(), &mut backend, &BridgeConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn reset_sizes_gui_view() {
        let (_ctx, _platform, mut backend, bridge) = setup();
        bridge.reset(&mut backend, 1920, 100_000);
        assert_eq!(backend.view(200).rect, Some((0, 0, 1920, u16::MAX)));
    }

    #[test]
    fn shutdown_releases_everything() {
        let (mut ctx, mut platform, mut backend, bridge) = setup();
        let res = bridge.resources().clone();
        bridge.shutdown(&mut ctx, &mut platform, &mut backend);

        assert_eq!(backend.destroyed_textures, vec![res.font_texture]);
        assert_eq!(backend.destroyed_uniforms, vec![res.sampler]);
        assert_eq!(backend.destroyed_programs, vec![res.program]);
        assert_eq!(platform.destroyed.len(), nabu_gui::MouseCursor::SHAPES.len());
        assert_eq!(ctx.io_mut().clipboard_text(), None);
    }

    #[test]
    fn one_full_frame_reaches_the_backend() {
        let (mut ctx, mut platform, mut backend, bridge) = setup();

        input::apply_event(
            ctx.io_mut(),
            &InputEvent::MouseButton { button: MouseButton::Left, action: Action::Press },
        );
        bridge.sync_frame(&mut ctx, &mut platform, 1.0 / 60.0);
        assert_eq!(ctx.io().mouse_pos, Vec2::new(400.0, 300.0));

        {
            let mut ui = ctx.new_frame();
            ui.window("Demo", WindowOptions::default(), |ui| {
                ui.text("hello");
                ui.button("ok");
            });
        }
        let data = ctx.render();
        assert!(!data.draw_lists.is_empty());
        let total_idx = data.total_idx_count();

        bridge.render_draw_data(&mut backend, data);

        assert!(!backend.submissions.is_empty());
        assert!(backend.submissions.iter().all(|s| s.view == 200));
        assert!(backend.submissions.iter().all(|s| s.program == bridge.resources().program));
        let submitted: u32 = backend.submissions.iter().map(|s| s.index_range().map_or(0, |r| r.len() as u32)).sum();
        assert_eq!(submitted as usize, total_idx);

        let first = backend.submissions[0].clone();
        let (tib, ..) = first.draw.index.unwrap();
        assert_eq!(backend.index_bytes(&tib).len(), tib.num as usize * 2);
    }
}
