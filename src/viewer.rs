//! Viewer facade
//!
//! [`Viewer`] is the caller-side handle: it spawns the render thread,
//! translates every scene-editing verb into a command sent across, and
//! blocks for the reply so the API stays synchronous. Onscreen viewers run
//! a winit event loop on the render thread and receive commands as user
//! events; offscreen viewers have no window and service a plain channel.
//!
//! ```no_run
//! use vantage::{Viewer, ViewerConfig, WindowType};
//!
//! let mut viewer = Viewer::new(WindowType::Onscreen, "demo", ViewerConfig::default())?;
//! viewer.append_group("root")?;
//! viewer.append_box("root", "b1", [0.5, 0.5, 0.5])?;
//! viewer.set_material("root", "b1", [0.9, 0.1, 0.1, 1.0], None)?;
//! viewer.join();
//! # Ok::<(), vantage::ViewerError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use cgmath::Vector3;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopProxy};

use crate::app::{self, ViewerApp};
use crate::command::{Command, Reply, Request};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gfx::geometry::Shape;
use crate::gfx::rendering::screenshot::ChannelFormat;
use crate::gfx::rendering::Screenshot;
use crate::gfx::scene::Pose;

/// Whether a viewer opens a visible window or renders to memory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Visible window with input handling and the overlay.
    Onscreen,
    /// No window; frames exist only for screenshot capture.
    Offscreen,
}

/// Transport for commands into the render thread.
enum CommandSender {
    /// Onscreen: commands arrive as winit user events.
    Proxy(EventLoopProxy<Command>),
    /// Offscreen: plain channel serviced by the worker loop.
    Channel(mpsc::Sender<Command>),
}

impl CommandSender {
    fn send(&self, command: Command) -> Result<()> {
        match self {
            CommandSender::Proxy(proxy) => proxy
                .send_event(command)
                .map_err(|_| ViewerError::ViewerClosed),
            CommandSender::Channel(sender) => {
                sender.send(command).map_err(|_| ViewerError::ViewerClosed)
            }
        }
    }
}

/// A 3D viewer handle.
///
/// Construction blocks until the render thread has a working window and
/// device (or reports why not). All methods are synchronous round-trips to
/// that thread; once the viewer is stopped or the user closes the window,
/// they fail with [`ViewerError::ViewerClosed`].
pub struct Viewer {
    sender: CommandSender,
    handle: Option<JoinHandle<()>>,
    window_type: WindowType,
    stopped: AtomicBool,
}

impl Viewer {
    /// Opens a viewer.
    ///
    /// # Arguments
    /// * `window_type` - onscreen window or offscreen rendering
    /// * `window_title` - title of the onscreen window
    /// * `config` - startup configuration (validated here)
    pub fn new(window_type: WindowType, window_title: &str, config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        match window_type {
            WindowType::Onscreen => Self::spawn_onscreen(window_title.to_string(), config),
            WindowType::Offscreen => Self::spawn_offscreen(config),
        }
    }

    /// Opens an onscreen viewer with default configuration.
    pub fn onscreen(window_title: &str) -> Result<Self> {
        Self::new(WindowType::Onscreen, window_title, ViewerConfig::default())
    }

    /// Opens an offscreen viewer with default configuration.
    pub fn offscreen() -> Result<Self> {
        Self::new(WindowType::Offscreen, "", ViewerConfig::default())
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    fn spawn_onscreen(title: String, config: ViewerConfig) -> Result<Self> {
        let (proxy_tx, proxy_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("viewer-render".into())
            .spawn(move || {
                let mut builder = EventLoop::<Command>::with_user_event();

                // The event loop lives on this thread, not the main one;
                // X11, Wayland and Windows allow that explicitly.
                #[cfg(target_os = "linux")]
                {
                    use winit::platform::wayland::EventLoopBuilderExtWayland;
                    use winit::platform::x11::EventLoopBuilderExtX11;
                    EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
                    EventLoopBuilderExtWayland::with_any_thread(&mut builder, true);
                }
                #[cfg(target_os = "windows")]
                {
                    use winit::platform::windows::EventLoopBuilderExtWindows;
                    EventLoopBuilderExtWindows::with_any_thread(&mut builder, true);
                }

                let event_loop = match builder.build() {
                    Ok(event_loop) => event_loop,
                    Err(e) => {
                        let _ = proxy_tx.send(Err(ViewerError::InitializationFailed(format!(
                            "cannot create event loop: {}",
                            e
                        ))));
                        return;
                    }
                };
                let _ = proxy_tx.send(Ok(event_loop.create_proxy()));
                event_loop.set_control_flow(ControlFlow::Poll);

                let mut app = ViewerApp::new_onscreen(config, title, ready_tx);
                if let Err(e) = event_loop.run_app(&mut app) {
                    log::error!("viewer event loop failed: {}", e);
                }
            })?;

        fn startup_exited() -> ViewerError {
            ViewerError::InitializationFailed("render thread exited during startup".into())
        }

        let proxy = match proxy_rx.recv().map_err(|_| startup_exited()) {
            Ok(Ok(proxy)) => proxy,
            Ok(Err(e)) | Err(e) => {
                let _ = handle.join();
                return Err(e);
            }
        };
        match ready_rx.recv().map_err(|_| startup_exited()) {
            Ok(Ok(())) => {}
            Ok(Err(e)) | Err(e) => {
                let _ = handle.join();
                return Err(e);
            }
        }

        Ok(Self {
            sender: CommandSender::Proxy(proxy),
            handle: Some(handle),
            window_type: WindowType::Onscreen,
            stopped: AtomicBool::new(false),
        })
    }

    fn spawn_offscreen(config: ViewerConfig) -> Result<Self> {
        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("viewer-render".into())
            .spawn(move || app::run_offscreen(config, command_rx, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                sender: CommandSender::Channel(command_tx),
                handle: Some(handle),
                window_type: WindowType::Offscreen,
                stopped: AtomicBool::new(false),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(ViewerError::InitializationFailed(
                    "render thread exited during startup".into(),
                ))
            }
        }
    }

    /// Sends one request and blocks for its reply.
    fn call(&self, request: Request) -> Result<Reply> {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(ViewerError::ViewerClosed);
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        self.sender.send(Command {
            request,
            reply: reply_tx,
        })?;
        reply_rx.recv().map_err(|_| ViewerError::ViewerClosed)?
    }

    fn call_done(&self, request: Request) -> Result<()> {
        self.call(request).map(|_| ())
    }

    // --- groups and nodes -------------------------------------------------

    /// Appends a root for a group of nodes, replacing any existing group
    /// with the same name.
    pub fn append_group(&self, name: &str) -> Result<()> {
        self.call_done(Request::AppendGroup {
            name: name.to_string(),
        })
    }

    /// Removes a group and all nodes inside it.
    pub fn remove_group(&self, name: &str) -> Result<()> {
        self.call_done(Request::RemoveGroup {
            name: name.to_string(),
        })
    }

    /// Turns rendering of a whole group on or off.
    pub fn show_group(&self, name: &str, show: bool) -> Result<()> {
        self.call_done(Request::ShowGroup {
            name: name.to_string(),
            visible: show,
        })
    }

    /// Appends a box node with the given edge lengths.
    pub fn append_box(&self, group: &str, name: &str, extents: [f32; 3]) -> Result<()> {
        self.append_shape(group, name, Shape::Box { extents })
    }

    /// Appends a sphere node.
    pub fn append_sphere(&self, group: &str, name: &str, radius: f32) -> Result<()> {
        self.append_shape(group, name, Shape::Sphere { radius })
    }

    /// Appends a capped cylinder node along the Z axis.
    pub fn append_cylinder(&self, group: &str, name: &str, radius: f32, length: f32) -> Result<()> {
        self.append_shape(group, name, Shape::Cylinder { radius, length })
    }

    /// Appends a capsule node along the Z axis.
    pub fn append_capsule(&self, group: &str, name: &str, radius: f32, length: f32) -> Result<()> {
        self.append_shape(group, name, Shape::Capsule { radius, length })
    }

    /// Appends a plane node in the XY plane.
    pub fn append_plane(&self, group: &str, name: &str, size: [f32; 2]) -> Result<()> {
        self.append_shape(group, name, Shape::Plane { size })
    }

    /// Appends a mesh node loaded from a Wavefront OBJ file.
    pub fn append_mesh(
        &self,
        group: &str,
        name: &str,
        mesh_path: &Path,
        scale: [f32; 3],
    ) -> Result<()> {
        self.append_shape(
            group,
            name,
            Shape::Mesh {
                path: mesh_path.to_path_buf(),
                scale,
            },
        )
    }

    fn append_shape(&self, group: &str, name: &str, shape: Shape) -> Result<()> {
        self.call_done(Request::AppendShape {
            group: group.to_string(),
            name: name.to_string(),
            shape,
        })
    }

    /// Overrides the material of a node; `texture_path` optionally loads an
    /// albedo texture from disk. Alpha below 1.0 renders blended.
    pub fn set_material(
        &self,
        group: &str,
        name: &str,
        color_rgba: [f32; 4],
        texture_path: Option<&Path>,
    ) -> Result<()> {
        self.call_done(Request::SetMaterial {
            group: group.to_string(),
            name: name.to_string(),
            color_rgba,
            texture_path: texture_path.map(Path::to_path_buf),
        })
    }

    /// Sets poses for nodes within a group, in order. An unknown node name
    /// fails the batch with [`ViewerError::NotFound`]; updates already
    /// applied stay in place.
    pub fn move_nodes(&self, group: &str, poses: &[(&str, Pose)]) -> Result<()> {
        self.call_done(Request::MoveNodes {
            group: group.to_string(),
            poses: poses
                .iter()
                .map(|(name, pose)| (name.to_string(), *pose))
                .collect(),
        })
    }

    /// Returns the current pose of a node.
    pub fn node_pose(&self, group: &str, name: &str) -> Result<Pose> {
        match self.call(Request::NodePose {
            group: group.to_string(),
            name: name.to_string(),
        })? {
            Reply::Pose(pose) => Ok(pose),
            _ => unreachable!("mismatched viewer reply"),
        }
    }

    // --- camera and rendering toggles -------------------------------------

    /// Repositions the camera at `pos`, aimed at `look_at`.
    pub fn reset_camera(
        &self,
        pos: impl Into<Vector3<f32>>,
        look_at: impl Into<Vector3<f32>>,
    ) -> Result<()> {
        self.call_done(Request::ResetCamera {
            eye: pos.into(),
            target: look_at.into(),
        })
    }

    /// Turns the light rig on or off; per-light masks are preserved.
    pub fn enable_lights(&self, enable: bool) -> Result<()> {
        self.call_done(Request::EnableLights(enable))
    }

    /// Turns one light on or off: index 0 is the ambient term, 1 through 4
    /// the directional lights.
    pub fn enable_light(&self, index: usize, enable: bool) -> Result<()> {
        self.call_done(Request::EnableLight { index, enable })
    }

    /// Turns shadow rendering on or off.
    pub fn enable_shadow(&self, enable: bool) -> Result<()> {
        self.call_done(Request::EnableShadow(enable))
    }

    /// Turns the tone-mapping ramp on or off.
    pub fn enable_hdr(&self, enable: bool) -> Result<()> {
        self.call_done(Request::EnableHdr(enable))
    }

    /// Turns distance fog on or off.
    pub fn enable_fog(&self, enable: bool) -> Result<()> {
        self.call_done(Request::EnableFog(enable))
    }

    /// Shows or hides the axes tripod.
    pub fn show_axes(&self, show: bool) -> Result<()> {
        self.call_done(Request::ShowAxes(show))
    }

    /// Shows or hides the ground grid.
    pub fn show_grid(&self, show: bool) -> Result<()> {
        self.call_done(Request::ShowGrid(show))
    }

    /// Shows or hides the floor plane.
    pub fn show_floor(&self, show: bool) -> Result<()> {
        self.call_done(Request::ShowFloor(show))
    }

    /// Sets the window background color; the fog color follows it.
    pub fn set_background_color(&self, color_rgb: [f32; 3]) -> Result<()> {
        self.call_done(Request::SetBackgroundColor(color_rgb))
    }

    // --- screenshots ------------------------------------------------------

    /// Renders a frame and writes it to disk, inferring the format from the
    /// file extension. Without a filename, a timestamped PNG is written to
    /// the working directory. Returns the path written.
    pub fn save_screenshot(&self, filename: Option<&Path>) -> Result<PathBuf> {
        match self.call(Request::SaveScreenshot {
            path: filename.map(Path::to_path_buf),
        })? {
            Reply::SavedTo(path) => Ok(path),
            _ => unreachable!("mismatched viewer reply"),
        }
    }

    /// Renders a frame and returns its pixels as a dense
    /// `height x width x channels` buffer in the requested channel order:
    /// any non-repeating combination of `R`, `G`, `B`, `A` (e.g. `"RGB"`,
    /// `"BGRA"`).
    pub fn get_screenshot(&self, requested_format: &str) -> Result<Screenshot> {
        let format = ChannelFormat::parse(requested_format)?;
        match self.call(Request::GetScreenshot { format })? {
            Reply::Screenshot(screenshot) => Ok(screenshot),
            _ => unreachable!("mismatched viewer reply"),
        }
    }

    // --- lifecycle --------------------------------------------------------

    /// Signals shutdown and waits for the render thread to acknowledge.
    /// Afterwards every scene-editing call fails with
    /// [`ViewerError::ViewerClosed`]. Idempotent.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        if self
            .sender
            .send(Command {
                request: Request::Stop,
                reply: reply_tx,
            })
            .is_ok()
        {
            // ignore the reply content; the thread may already be gone
            let _ = reply_rx.recv();
        }
    }

    /// Blocks until the render thread exits: for onscreen viewers until the
    /// user closes the window or [`Viewer::stop`] is called. Offscreen
    /// viewers have no user-driven exit, so `join` returns immediately
    /// unless the viewer was stopped first.
    pub fn join(&mut self) {
        let join_now = match self.window_type {
            WindowType::Onscreen => true,
            WindowType::Offscreen => self.stopped.load(Ordering::SeqCst),
        };
        if join_now {
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
            self.stopped.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
