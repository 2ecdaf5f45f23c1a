//! # Vantage Prelude
//!
//! Brings the commonly used types into scope:
//!
//! ```no_run
//! use vantage::prelude::*;
//!
//! let viewer = Viewer::new(WindowType::Offscreen, "", ViewerConfig::default())?;
//! viewer.append_group("root")?;
//! viewer.append_box("root", "b1", [1.0, 1.0, 1.0])?;
//! let shot = viewer.get_screenshot("RGB")?;
//! assert_eq!(shot.channels, 3);
//! # Ok::<(), ViewerError>(())
//! ```

// Re-export core viewer types
pub use crate::config::ViewerConfig;
pub use crate::error::{Result, ViewerError};
pub use crate::viewer::{Viewer, WindowType};

// Re-export scene and capture types
pub use crate::gfx::geometry::Shape;
pub use crate::gfx::rendering::Screenshot;
pub use crate::gfx::scene::Pose;

// Re-export common external dependencies
pub use cgmath::{Quaternion, Vector3};
