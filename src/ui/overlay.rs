//! ImGui overlay for onscreen windows
//!
//! Integrates Dear ImGui with wgpu and winit to draw the help panel, the
//! frame-rate meter and short-lived status notices (e.g. "screenshot
//! saved") on top of the rendered scene.

use std::time::{Duration, Instant};

use imgui::{Condition, Context, FontConfig, FontSource};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::Window,
};

/// How long a status notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(3);

const HELP_TEXT: &str = "\
Keyboard shortcuts:
  Show help:         F1, H
  Quit window:       Escape, Q
  Screenshot:        Space
  Toggle axes:       A
  Toggle HDR:        D
  Toggle grid:       G
  Toggle fps meter:  F
  Toggle lighting:   L
  Toggle fog:        O
  Toggle floor:      P
  Reset camera:      R
  Toggle shadows:    S
  Toggle textures:   T
  Toggle wireframe:  W

Mouse control:
  Rotate:            LMB drag
  Pan:               Shift + LMB drag
  Zoom:              wheel";

/// Overlay state and ImGui plumbing for one window.
pub struct Overlay {
    pub context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    show_help: bool,
    show_fps: bool,
    notice: Option<(String, Instant)>,
}

impl Overlay {
    pub fn new(
        device: &Device,
        queue: &Queue,
        output_color_format: TextureFormat,
        window: &Window,
        show_fps: bool,
    ) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Default);

        let font_size = 16.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        let renderer_config = RendererConfig {
            texture_format: output_color_format,
            ..Default::default()
        };
        let renderer = Renderer::new(&mut context, device, queue, renderer_config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            show_help: false,
            show_fps,
            notice: None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_fps(&mut self) {
        self.show_fps = !self.show_fps;
    }

    /// Shows a transient status message in the window corner.
    pub fn notify(&mut self, message: String) {
        self.notice = Some((message, Instant::now()));
    }

    /// Feeds an event through ImGui; returns true when the UI captured it.
    ///
    /// Only input events count as capturable, so redraws and resizes always
    /// reach the application even while the cursor is over a UI window.
    pub fn handle_input<T>(&mut self, window: &Window, event: &Event<T>) -> bool {
        self.platform
            .handle_event(self.context.io_mut(), window, event);

        let is_input = matches!(
            event,
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { .. }
                    | WindowEvent::MouseInput { .. }
                    | WindowEvent::MouseWheel { .. }
                    | WindowEvent::KeyboardInput { .. },
                ..
            }
        );
        if !is_input {
            return false;
        }
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Builds and renders the overlay into `color_attachment`, preserving
    /// the scene beneath it.
    pub fn draw(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        window: &Window,
        color_attachment: &TextureView,
    ) {
        let now = Instant::now();
        self.context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("overlay frame preparation failed: {}", e);
            return;
        }

        if let Some((_, since)) = &self.notice {
            if since.elapsed() > NOTICE_TTL {
                self.notice = None;
            }
        }

        let show_help = self.show_help;
        let show_fps = self.show_fps;
        let notice = self.notice.as_ref().map(|(text, _)| text.clone());

        let ui = self.context.frame();

        if show_help {
            ui.window("Help")
                .position([10.0, 10.0], Condition::FirstUseEver)
                .always_auto_resize(true)
                .collapsible(false)
                .build(|| {
                    ui.text(HELP_TEXT);
                });
        }
        if show_fps {
            let framerate = ui.io().framerate;
            ui.window("fps")
                .position([10.0, 10.0], Condition::Always)
                .no_decoration()
                .always_auto_resize(true)
                .bg_alpha(0.4)
                .build(|| {
                    ui.text(format!("{:5.1} fps", framerate));
                });
        }
        if let Some(text) = notice {
            let [_, height] = ui.io().display_size;
            ui.window("notice")
                .position([10.0, height - 40.0], Condition::Always)
                .no_decoration()
                .always_auto_resize(true)
                .bg_alpha(0.4)
                .build(|| {
                    ui.text(text);
                });
        }

        self.platform.prepare_render(ui, window);

        let draw_data = self.context.render();
        if draw_data.display_size[0] <= 0.0 || draw_data.display_size[1] <= 0.0 {
            return;
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_attachment,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // preserve the scene
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(e) = self
            .renderer
            .render(draw_data, queue, device, &mut render_pass)
        {
            log::warn!("overlay rendering failed: {}", e);
        }
    }
}
