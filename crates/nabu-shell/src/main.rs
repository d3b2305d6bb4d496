use anyhow::Result;
use winit::dpi::LogicalSize;

use nabu_engine::core::{App, AppControl, EventCtx, FrameCtx};
use nabu_engine::device::GpuInit;
use nabu_engine::input::{Action, InputEvent, Key};
use nabu_engine::logging::{init_logging, LoggingConfig};
use nabu_engine::window::{Runtime, RuntimeConfig};
use nabu_gui::{FontConfig, TextureId, Ui, Vec2, WindowOptions};

const CLEAR: u32 = 0x1a1a1fff;
const CLEAR_DIM: u32 = 0x08080aff;
const HINT: [u8; 4] = [200, 200, 200, 255];

#[derive(Default)]
struct Shell {
    show_stats: bool,
    dim_background: bool,
    show_atlas: bool,
    clicks: u32,
    name: String,
}

/// F1 toggles the stats window on press, unless a text field has the keyboard.
fn toggles_stats(event: &InputEvent, ctx: &EventCtx) -> bool {
    let f1_pressed = matches!(
        event,
        InputEvent::Key { key: Key::F1, action: Action::Press }
    );
    f1_pressed && !ctx.gui_wants_keyboard
}

fn resolution_text((width, height): (u32, u32)) -> String {
    format!("Current window resolution is {width}x{height}")
}

impl App for Shell {
    fn on_event(&mut self, event: &InputEvent, ctx: &EventCtx) -> AppControl {
        if toggles_stats(event, ctx) {
            self.show_stats = !self.show_stats;
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>, ui: &mut Ui<'_>) -> AppControl {
        let mut quit = false;

        ui.background_text(Vec2::new(10.0, 10.0), HINT, "Press F1 to toggle stats.");

        let info = WindowOptions {
            pos: Vec2::new(20.0, 40.0),
            size: Vec2::new(260.0, 80.0),
            always_auto_resize: true,
        };
        ui.window("Information", info, |ui| {
            ui.text(&resolution_text(ctx.window_size));
            let fps = ui.framerate();
            ui.text(&format!("{fps:.1} FPS"));
        });

        let demo = WindowOptions {
            pos: Vec2::new(20.0, 150.0),
            size: Vec2::new(340.0, 240.0),
            always_auto_resize: false,
        };
        ui.window("Demo", demo, |ui| {
            if ui.checkbox("Dim background", &mut self.dim_background) {
                let rgba = if self.dim_background { CLEAR_DIM } else { CLEAR };
                ctx.runtime.set_clear_color(rgba);
            }

            if ui.button("Click me") {
                self.clicks += 1;
            }
            ui.same_line();
            ui.text(&format!("clicked {} times", self.clicks));

            ui.input_text("Name", &mut self.name);
            if !self.name.is_empty() {
                ui.text(&format!("Hello, {}!", self.name));
            }

            ui.separator();
            ui.checkbox("Show font atlas", &mut self.show_atlas);
            if self.show_atlas {
                ui.image(TextureId::Font, Vec2::new(256.0, 256.0));
            }

            ui.separator();
            if ui.button("Center pointer") {
                let display = ui.display_size();
                ui.request_mouse_pos(Vec2::new(display.x * 0.5, display.y * 0.5));
            }
            ui.same_line();
            if ui.button("Quit") {
                quit = true;
            }
        });

        if self.show_stats {
            let stats = ctx.stats;
            let dt_ms = ctx.time.dt * 1000.0;
            let opts = WindowOptions {
                pos: Vec2::new(380.0, 40.0),
                size: Vec2::new(240.0, 120.0),
                always_auto_resize: true,
            };
            ui.window("Stats", opts, |ui| {
                ui.text(&format!("Frame: {dt_ms:.2} ms"));
                ui.text(&format!("Draws: {}  Views: {}", stats.num_draws, stats.num_views));
                ui.text(&format!("Transient VB: {} B", stats.transient_vb_used));
                ui.text(&format!("Transient IB: {} B", stats.transient_ib_used));
            });
        }

        if quit {
            ctx.exit();
        }
        AppControl::Continue
    }
}

fn load_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\segoeui.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let font = load_font();
    if font.is_none() {
        log::warn!("no system font found; GUI text will not render");
    }

    let config = RuntimeConfig {
        title: "nabu + gui".to_string(),
        initial_size: LogicalSize::new(1024.0, 768.0),
        clear_color: CLEAR,
        font: FontConfig {
            data: font,
            ..FontConfig::default()
        },
        ..RuntimeConfig::default()
    };

    // GUI colors are blended unconverted, as on a linear target.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    Runtime::run(config, gpu_init, Shell::default())
}
