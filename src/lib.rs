//! Vantage 3D Viewer
//!
//! A simple and efficient 3D viewer library built on wgpu and winit.
//!
//! A [`Viewer`] owns a render thread (onscreen window or offscreen target)
//! and exposes a small synchronous API on top of it: named groups of nodes,
//! primitive-geometry helpers, material setters, camera control and
//! screenshot capture.
//!
//! ```no_run
//! use vantage::{Viewer, ViewerConfig, WindowType};
//!
//! let config = ViewerConfig::default().with_multisamples(4).with_floor(true);
//! let mut viewer = Viewer::new(WindowType::Onscreen, "vantage", config)?;
//!
//! viewer.append_group("root")?;
//! viewer.append_sphere("root", "ball", 0.5)?;
//! viewer.set_material("root", "ball", [0.2, 0.6, 0.9, 1.0], None)?;
//! viewer.reset_camera([4.0, -4.0, 2.0], [0.0, 0.0, 0.5])?;
//!
//! // blocks until the user closes the window
//! viewer.join();
//! # Ok::<(), vantage::ViewerError>(())
//! ```

mod app;
mod command;

pub mod config;
pub mod error;
pub mod gfx;
pub mod prelude;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use gfx::geometry::Shape;
pub use gfx::rendering::Screenshot;
pub use gfx::scene::Pose;
pub use viewer::{Viewer, WindowType};

/// Opens an onscreen viewer with default settings.
pub fn onscreen(window_title: &str) -> Result<Viewer> {
    Viewer::onscreen(window_title)
}

/// Opens an offscreen viewer with default settings.
pub fn offscreen() -> Result<Viewer> {
    Viewer::offscreen()
}
