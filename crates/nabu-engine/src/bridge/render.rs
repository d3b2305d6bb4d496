//! Display list to backend submissions.

use nabu_gui::{DrawCmd, DrawData, TextureId, Vec2};

use super::GuiResources;
use crate::backend::{BlendFactor, RenderBackend, RenderState, ScissorRect, TextureHandle, ViewId};

/// Column-major orthographic projection over the displayed area.
/// Top-left origin, +Y down, depth fixed at 0.
pub fn ortho_projection(pos: Vec2, size: Vec2) -> [f32; 16] {
    let (l, r) = (pos.x, pos.x + size.x);
    let (t, b) = (pos.y, pos.y + size.y);
    [
        2.0 / (r - l), 0.0, 0.0, 0.0, //
        0.0, 2.0 / (t - b), 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        (r + l) / (l - r), (t + b) / (b - t), 0.0, 1.0,
    ]
}

/// Integer scissor for a `[x1, y1, x2, y2]` clip rect in framebuffer pixels.
///
/// Edges are clamped to `[0, 65535]` before the extent is taken, so an
/// inverted rect has zero extent.
pub fn scissor_for_clip(clip: [f32; 4]) -> ScissorRect {
    const MAX: f32 = u16::MAX as f32;
    let x = clip[0].clamp(0.0, MAX);
    let y = clip[1].clamp(0.0, MAX);
    let right = clip[2].min(MAX);
    let bottom = clip[3].min(MAX);
    // `as` saturates and maps NaN to 0.
    ScissorRect {
        x: x as u16,
        y: y as u16,
        w: (right - x).max(0.0) as u16,
        h: (bottom - y).max(0.0) as u16,
    }
}

fn gui_state() -> RenderState {
    RenderState {
        write_rgb: true,
        write_alpha: true,
        msaa: true,
        blend: Some((BlendFactor::SrcAlpha, BlendFactor::InvSrcAlpha)),
    }
}

fn resolve_texture(id: TextureId, font: TextureHandle) -> TextureHandle {
    match id {
        TextureId::Font => font,
        TextureId::Backend(index) => TextureHandle(index),
    }
}

/// Submits every draw list on `view`, in order.
///
/// Stops at the first list that does not fit in the transient pool; the
/// lists before it are still drawn.
pub fn render_draw_data<B>(backend: &mut B, resources: &GuiResources, view: ViewId, data: &DrawData)
where
    B: RenderBackend + ?Sized,
{
    if data.display_size.x <= 0.0 || data.display_size.y <= 0.0 {
        return;
    }
    backend.set_view_transform(view, ortho_projection(data.display_pos, data.display_size));

    let layout = &resources.layout;

    for (n, list) in data.draw_lists.iter().enumerate() {
        let num_vertices = list.vtx_buffer.len() as u32;
        let num_indices = list.idx_buffer.len() as u32;

        if backend.avail_transient_vertex_buffer(num_vertices, layout) != num_vertices
            || backend.avail_transient_index_buffer(num_indices) != num_indices
        {
            log::debug!(
                "GuiBridge: transient pool exhausted at list {n}/{}, truncating frame",
                data.draw_lists.len()
            );
            break;
        }

        let Some(tvb) = backend.alloc_transient_vertex_buffer(num_vertices, layout) else {
            log::debug!("GuiBridge: vertex allocation failed at list {n}");
            break;
        };
        let Some(tib) = backend.alloc_transient_index_buffer(num_indices) else {
            log::debug!("GuiBridge: index allocation failed at list {n}");
            break;
        };

        // Allocations are exactly the requested size.
        backend
            .transient_vertex_data_mut(&tvb)
            .copy_from_slice(bytemuck::cast_slice(&list.vtx_buffer));
        backend
            .transient_index_data_mut(&tib)
            .copy_from_slice(bytemuck::cast_slice(&list.idx_buffer));

        let mut offset = 0u32;
        for cmd in &list.cmd_buffer {
            match cmd {
                DrawCmd::Callback { callback, .. } => callback.invoke(list),
                &DrawCmd::Elements { elem_count, clip_rect, texture_id } if elem_count > 0 => {
                    backend.set_scissor(scissor_for_clip(clip_rect));
                    backend.set_state(gui_state());
                    backend.set_texture(0, resources.sampler, resolve_texture(texture_id, resources.font_texture));
                    backend.set_vertex_buffer(0, &tvb);
                    backend.set_index_buffer(&tib, offset, elem_count);
                    backend.submit(view, resources.program);
                }
                DrawCmd::Elements { .. } => {}
            }
            offset += cmd.elem_count();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use nabu_gui::{DrawCallback, DrawList, DrawVert};

    use super::*;
    use crate::backend::{ProgramHandle, TransientPoolConfig, UniformHandle};
    use crate::bridge::gui_vertex_layout;
    use crate::bridge::mock::MockBackend;

    const VIEW: ViewId = 200;
    const FULL: [f32; 4] = [0.0, 0.0, 800.0, 600.0];

    fn resources() -> GuiResources {
        GuiResources {
            layout: gui_vertex_layout(),
            font_texture: TextureHandle(7),
            sampler: UniformHandle(1),
            program: ProgramHandle(3),
        }
    }

    fn quad_list(cmds: Vec<DrawCmd>, idx_len: usize) -> DrawList {
        let mut list = DrawList::default();
        list.vtx_buffer = (0..4)
            .map(|i| DrawVert {
                pos: [i as f32, 2.0 * i as f32],
                uv: [0.5, 0.25],
                col: [255, 128, 0, i as u8],
            })
            .collect();
        list.idx_buffer = (0..idx_len).map(|i| (i % 4) as u16).collect();
        list.cmd_buffer = cmds;
        list
    }

    fn elements(elem_count: u32, texture_id: TextureId) -> DrawCmd {
        DrawCmd::Elements { elem_count, clip_rect: FULL, texture_id }
    }

    fn data(lists: Vec<DrawList>) -> DrawData {
        DrawData {
            draw_lists: lists,
            display_pos: Vec2::zero(),
            display_size: Vec2::new(800.0, 600.0),
            framebuffer_scale: Vec2::new(1.0, 1.0),
        }
    }

    #[test]
    fn single_quad_is_one_font_textured_draw() {
        let mut backend = MockBackend::default();
        let res = resources();
        let list = quad_list(vec![elements(6, TextureId::Font)], 6);
        let expected_vertices = bytemuck::cast_slice::<DrawVert, u8>(&list.vtx_buffer).to_vec();
        let expected_indices = bytemuck::cast_slice::<u16, u8>(&list.idx_buffer).to_vec();

        render_draw_data(&mut backend, &res, VIEW, &data(vec![list]));

        assert_eq!(backend.submissions.len(), 1);
        let s = &backend.submissions[0];
        assert_eq!(s.view, VIEW);
        assert_eq!(s.program, res.program);
        assert_eq!(s.index_range(), Some(0..6));
        assert_eq!(s.draw.texture, Some((0, res.sampler, res.font_texture)));
        assert_eq!(s.draw.state, Some(gui_state()));
        assert_eq!(s.draw.scissor, Some(ScissorRect { x: 0, y: 0, w: 800, h: 600 }));

        let tvb = s.draw.vertex.clone().unwrap();
        let (tib, ..) = s.draw.index.clone().unwrap();
        assert_eq!(tvb.num, 4);
        assert_eq!(backend.vertex_bytes(&tvb), expected_vertices.as_slice());
        assert_eq!(backend.index_bytes(&tib), expected_indices.as_slice());
    }

    #[test]
    fn index_offset_runs_across_commands() {
        let mut backend = MockBackend::default();
        let list = quad_list(
            vec![elements(10, TextureId::Font), elements(20, TextureId::Backend(4))],
            30,
        );

        render_draw_data(&mut backend, &resources(), VIEW, &data(vec![list]));

        let ranges: Vec<_> = backend.submissions.iter().map(|s| s.index_range()).collect();
        assert_eq!(ranges, vec![Some(0..10), Some(10..30)]);
        assert_eq!(backend.submissions[1].draw.texture.map(|t| t.2), Some(TextureHandle(4)));
    }

    #[test]
    fn zero_count_command_submits_nothing_and_keeps_offset() {
        let mut backend = MockBackend::default();
        let list = quad_list(
            vec![elements(3, TextureId::Font), elements(0, TextureId::Font), elements(3, TextureId::Font)],
            6,
        );

        render_draw_data(&mut backend, &resources(), VIEW, &data(vec![list]));

        let ranges: Vec<_> = backend.submissions.iter().map(|s| s.index_range()).collect();
        assert_eq!(ranges, vec![Some(0..3), Some(3..6)]);
    }

    #[test]
    fn callback_runs_instead_of_a_draw() {
        let mut backend = MockBackend::default();
        let seen = Rc::new(Cell::new(0usize));
        let hook = {
            let seen = Rc::clone(&seen);
            DrawCallback::new(move |list| seen.set(list.vtx_buffer.len()))
        };
        let list = quad_list(
            vec![
                elements(3, TextureId::Font),
                DrawCmd::Callback { callback: hook, clip_rect: FULL },
                elements(3, TextureId::Font),
            ],
            6,
        );

        render_draw_data(&mut backend, &resources(), VIEW, &data(vec![list]));

        assert_eq!(seen.get(), 4);
        let ranges: Vec<_> = backend.submissions.iter().map(|s| s.index_range()).collect();
        assert_eq!(ranges, vec![Some(0..3), Some(3..6)]);
    }

    #[test]
    fn each_list_starts_at_offset_zero() {
        let mut backend = MockBackend::default();
        let a = quad_list(vec![elements(6, TextureId::Font)], 6);
        let b = quad_list(vec![elements(6, TextureId::Font)], 6);

        render_draw_data(&mut backend, &resources(), VIEW, &data(vec![a, b]));

        assert_eq!(backend.submissions.len(), 2);
        let (first, second) = (&backend.submissions[0], &backend.submissions[1]);
        assert_eq!(second.index_range(), Some(0..6));
        assert_ne!(
            first.draw.index.map(|(tib, ..)| tib.offset),
            second.draw.index.map(|(tib, ..)| tib.offset)
        );
    }

    #[test]
    fn exhausted_pool_truncates_remaining_lists() {
        // Room for one quad list (4 * 20 bytes of vertices) but not two.
        let mut backend = MockBackend::with_pool(TransientPoolConfig {
            vertex_bytes: 100,
            index_bytes: 1024,
        });
        let lists = (0..3).map(|_| quad_list(vec![elements(6, TextureId::Font)], 6)).collect();

        render_draw_data(&mut backend, &resources(), VIEW, &data(lists));

        assert_eq!(backend.submissions.len(), 1);
    }

    #[test]
    fn view_transform_maps_display_to_clip_space() {
        let mut backend = MockBackend::default();
        render_draw_data(&mut backend, &resources(), VIEW, &data(vec![]));

        let m = backend.view(VIEW).transform.unwrap();
        let close = |x: f32, y: f32, expect: (f32, f32)| {
            let got = (m[0] * x + m[12], m[5] * y + m[13]);
            assert!((got.0 - expect.0).abs() < 1e-6 && (got.1 - expect.1).abs() < 1e-6, "{got:?}");
        };
        close(0.0, 0.0, (-1.0, 1.0));
        close(800.0, 600.0, (1.0, -1.0));
        close(400.0, 300.0, (0.0, 0.0));
    }

    #[test]
    fn empty_display_renders_nothing() {
        let mut backend = MockBackend::default();
        let mut d = data(vec![quad_list(vec![elements(6, TextureId::Font)], 6)]);
        d.display_size = Vec2::zero();

        render_draw_data(&mut backend, &resources(), VIEW, &d);

        assert!(backend.submissions.is_empty());
        assert!(backend.view(VIEW).transform.is_none());
    }

    #[test]
    fn scissor_clamps_edges_first() {
        assert_eq!(
            scissor_for_clip([-10.0, -5.0, 100.0, 50.0]),
            ScissorRect { x: 0, y: 0, w: 100, h: 50 }
        );
        assert_eq!(
            scissor_for_clip([10.0, 20.0, 70000.0, 80000.0]),
            ScissorRect { x: 10, y: 20, w: 65525, h: 65515 }
        );
    }

    #[test]
    fn inverted_clip_has_zero_extent() {
        let s = scissor_for_clip([300.0, 200.0, 100.0, 50.0]);
        assert_eq!((s.x, s.y, s.w, s.h), (300, 200, 0, 0));

        let s = scissor_for_clip([-50.0, 0.0, -80.0, 10.0]);
        assert_eq!((s.x, s.w, s.h), (0, 0, 10));
    }
}
