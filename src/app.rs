//! Render-thread application
//!
//! [`ViewerApp`] owns the scene and renderer on the render thread. For
//! onscreen viewers it is the winit `ApplicationHandler`: it creates the
//! window and device on resume, drains commands delivered as user events,
//! drives the per-frame redraw and handles the fixed keyboard shortcuts.
//! For offscreen viewers there is no event loop; [`run_offscreen`] services
//! the command channel directly and renders only when a capture is
//! requested.

use std::sync::{mpsc, Arc};

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::command::{Command, Reply, Request};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gfx::rendering::{screenshot, RenderEngine, Screenshot};
use crate::gfx::resources::material::Material;
use crate::gfx::scene::scene::{DEFAULT_CAMERA_EYE, DEFAULT_CAMERA_TARGET};
use crate::gfx::scene::Scene;
use crate::ui::Overlay;

/// Scene, renderer and window state living on the render thread.
pub(crate) struct ViewerApp {
    config: ViewerConfig,
    title: String,
    scene: Scene,
    renderer: Option<RenderEngine>,
    overlay: Option<Overlay>,
    window: Option<Arc<Window>>,
    /// Startup handshake; consumed after the first successful resume.
    ready: Option<mpsc::Sender<Result<()>>>,
}

impl ViewerApp {
    /// Prepares the onscreen application; the window and renderer are
    /// created once the event loop delivers `resumed`.
    pub fn new_onscreen(
        config: ViewerConfig,
        title: String,
        ready: mpsc::Sender<Result<()>>,
    ) -> Self {
        let (width, height) = config.window_size;
        let scene = Scene::new(&config, width as f32 / height as f32);
        Self {
            config,
            title,
            scene,
            renderer: None,
            overlay: None,
            window: None,
            ready: Some(ready),
        }
    }

    /// Builds the windowless application, creating the headless renderer
    /// up front.
    pub fn new_offscreen(config: ViewerConfig) -> Result<Self> {
        let (width, height) = config.window_size;
        let renderer =
            pollster::block_on(RenderEngine::new_headless(width, height, &config))?;
        let scene = Scene::new(&config, width as f32 / height as f32);
        Ok(Self {
            config,
            title: String::new(),
            scene,
            renderer: Some(renderer),
            overlay: None,
            window: None,
            ready: None,
        })
    }

    /// Executes one request against the scene and renderer.
    ///
    /// Commands only flow after initialization, so the renderer is always
    /// present here.
    pub fn execute(&mut self, request: Request) -> Result<Reply> {
        let renderer = self
            .renderer
            .as_ref()
            .expect("renderer initialized before command execution");

        match request {
            Request::AppendGroup { name } => {
                self.scene.append_group(&name);
                Ok(Reply::Done)
            }
            Request::RemoveGroup { name } => {
                self.scene.remove_group(&name)?;
                Ok(Reply::Done)
            }
            Request::ShowGroup { name, visible } => {
                self.scene.show_group(&name, visible)?;
                Ok(Reply::Done)
            }
            Request::AppendShape { group, name, shape } => {
                let (geometry, scale) = shape.build()?;
                let node = self.scene.append_node(&group, &name, geometry, scale)?;
                renderer.upload_node(node);
                Ok(Reply::Done)
            }
            Request::SetMaterial {
                group,
                name,
                color_rgba,
                texture_path,
            } => {
                let node = self.scene.node_mut(&group, &name)?;
                node.material = Material::new(color_rgba, 0.0, 0.4);
                if let Some(path) = texture_path {
                    renderer.upload_node_texture(node, &path)?;
                }
                Ok(Reply::Done)
            }
            Request::MoveNodes { group, poses } => {
                self.scene.move_nodes(&group, &poses)?;
                Ok(Reply::Done)
            }
            Request::NodePose { group, name } => {
                Ok(Reply::Pose(self.scene.node(&group, &name)?.pose))
            }
            Request::ResetCamera { eye, target } => {
                self.scene.camera_manager.camera.look_from(eye, target);
                Ok(Reply::Done)
            }
            Request::EnableLights(enable) => {
                self.scene.lights.enabled = enable;
                Ok(Reply::Done)
            }
            Request::EnableLight { index, enable } => {
                self.scene.lights.set_light(index, enable)?;
                Ok(Reply::Done)
            }
            Request::EnableShadow(enable) => {
                self.scene.toggles.shadow = enable;
                Ok(Reply::Done)
            }
            Request::EnableHdr(enable) => {
                self.scene.toggles.hdr = enable;
                Ok(Reply::Done)
            }
            Request::EnableFog(enable) => {
                self.scene.toggles.fog = enable;
                Ok(Reply::Done)
            }
            Request::ShowAxes(show) => {
                self.scene.axes.visible = show;
                Ok(Reply::Done)
            }
            Request::ShowGrid(show) => {
                self.scene.grid.visible = show;
                Ok(Reply::Done)
            }
            Request::ShowFloor(show) => {
                self.scene.show_floor = show;
                Ok(Reply::Done)
            }
            Request::SetBackgroundColor(color) => {
                self.scene.background = color;
                Ok(Reply::Done)
            }
            Request::SaveScreenshot { path } => {
                let path = path.unwrap_or_else(screenshot::timestamped_filename);
                let (width, height, rgba) = self.capture()?;
                screenshot::write_image(&path, width, height, rgba)?;
                log::info!("screenshot written to {}", path.display());
                Ok(Reply::SavedTo(path))
            }
            Request::GetScreenshot { format } => {
                let (width, height, rgba) = self.capture()?;
                let data = format.swizzle(&rgba);
                Ok(Reply::Screenshot(Screenshot {
                    width,
                    height,
                    channels: format.channels(),
                    data,
                }))
            }
            // handled by the surrounding loop
            Request::Stop => Ok(Reply::Done),
        }
    }

    /// Renders one frame and reads it back as tight RGBA.
    fn capture(&mut self) -> Result<(u32, u32, Vec<u8>)> {
        let renderer = self
            .renderer
            .as_mut()
            .expect("renderer initialized before command execution");
        renderer.prepare_frame(&mut self.scene);
        let (width, height) = renderer.size();
        let rgba = renderer.capture_frame(&self.scene)?;
        Ok((width, height, rgba))
    }

    /// Renders one onscreen frame with the overlay on top.
    fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let Some(window) = self.window.as_ref() else {
            return;
        };

        renderer.prepare_frame(&mut self.scene);

        let result = if let Some(overlay) = self.overlay.as_mut() {
            let window = window.clone();
            renderer.render_frame(
                &self.scene,
                Some(|device: &wgpu::Device,
                      queue: &wgpu::Queue,
                      encoder: &mut wgpu::CommandEncoder,
                      view: &wgpu::TextureView| {
                    overlay.draw(device, queue, encoder, &window, view);
                }),
            )
        } else {
            renderer.render_frame(
                &self.scene,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            )
        };

        if let Err(e) = result {
            log::error!("frame rendering failed: {}", e);
        }
    }

    /// The fixed keyboard bindings of onscreen windows.
    fn handle_shortcut(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        match key {
            KeyCode::Escape | KeyCode::KeyQ => event_loop.exit(),
            KeyCode::Space => {
                let message = match self.execute(Request::SaveScreenshot { path: None }) {
                    Ok(Reply::SavedTo(path)) => format!("saved {}", path.display()),
                    Ok(_) => return,
                    Err(e) => {
                        log::error!("screenshot failed: {}", e);
                        format!("screenshot failed: {}", e)
                    }
                };
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.notify(message);
                }
            }
            KeyCode::F1 | KeyCode::KeyH => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.toggle_help();
                }
            }
            KeyCode::KeyF => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.toggle_fps();
                }
            }
            KeyCode::KeyA => self.scene.axes.visible = !self.scene.axes.visible,
            KeyCode::KeyG => self.scene.grid.visible = !self.scene.grid.visible,
            KeyCode::KeyP => self.scene.show_floor = !self.scene.show_floor,
            KeyCode::KeyL => self.scene.lights.enabled = !self.scene.lights.enabled,
            KeyCode::KeyS => self.scene.toggles.shadow = !self.scene.toggles.shadow,
            KeyCode::KeyD => self.scene.toggles.hdr = !self.scene.toggles.hdr,
            KeyCode::KeyO => self.scene.toggles.fog = !self.scene.toggles.fog,
            KeyCode::KeyT => self.scene.toggles.textures = !self.scene.toggles.textures,
            KeyCode::KeyW => {
                let supported = self
                    .renderer
                    .as_ref()
                    .map(|r| r.wireframe_supported())
                    .unwrap_or(false);
                if supported {
                    self.scene.toggles.wireframe = !self.scene.toggles.wireframe;
                } else {
                    log::warn!("wireframe rendering is not supported by this adapter");
                }
            }
            KeyCode::KeyR => {
                self.scene
                    .camera_manager
                    .camera
                    .look_from(DEFAULT_CAMERA_EYE, DEFAULT_CAMERA_TARGET);
            }
            _ => (),
        }
    }
}

impl ApplicationHandler<Command> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.config.window_size;
        let attributes = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(!self.config.window_fixed);

        let setup = event_loop
            .create_window(attributes)
            .map_err(|e| {
                ViewerError::InitializationFailed(format!("cannot create window: {}", e))
            })
            .and_then(|window| {
                let window = Arc::new(window);
                let (width, height) = window.inner_size().into();
                let renderer = pollster::block_on(RenderEngine::new_windowed(
                    window.clone(),
                    width,
                    height,
                    &self.config,
                ))?;
                let overlay = Overlay::new(
                    renderer.device(),
                    renderer.queue(),
                    renderer.surface_format(),
                    &window,
                    self.config.show_fps,
                );
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                self.window = Some(window);
                self.overlay = Some(overlay);
                self.renderer = Some(renderer);
                Ok(())
            });

        let failed = setup.is_err();
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(setup);
        }
        if failed {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // The overlay sees events first and may capture them.
        if let Some(overlay) = self.overlay.as_mut() {
            let ui_event: winit::event::Event<Command> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if overlay.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                self.scene.camera_manager.process_keyboard_event(&key_event);
                if key_event.state == winit::event::ElementState::Pressed && !key_event.repeat {
                    if let PhysicalKey::Code(key_code) = key_event.physical_key {
                        self.handle_shortcut(key_code, event_loop);
                    }
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                self.render();
            }
            _ => (),
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        if matches!(command.request, Request::Stop) {
            let _ = command.reply.send(Ok(Reply::Done));
            event_loop.exit();
            return;
        }
        let result = self.execute(command.request);
        let _ = command.reply.send(result);
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let Some(window) = self.window.as_ref() else {
            return;
        };

        // Skip camera control while the overlay owns the mouse.
        if let Some(overlay) = self.overlay.as_ref() {
            let io = overlay.context.io();
            if io.want_capture_mouse || io.want_capture_keyboard {
                return;
            }
        }

        self.scene.camera_manager.process_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Services the command channel of a windowless viewer until `Stop` arrives
/// or every sender is gone.
pub(crate) fn run_offscreen(
    config: ViewerConfig,
    commands: mpsc::Receiver<Command>,
    ready: mpsc::Sender<Result<()>>,
) {
    let mut app = match ViewerApp::new_offscreen(config) {
        Ok(app) => {
            let _ = ready.send(Ok(()));
            app
        }
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    while let Ok(command) = commands.recv() {
        if matches!(command.request, Request::Stop) {
            let _ = command.reply.send(Ok(Reply::Done));
            break;
        }
        let result = app.execute(command.request);
        let _ = command.reply.send(result);
    }
    log::debug!("offscreen viewer loop finished");
}
