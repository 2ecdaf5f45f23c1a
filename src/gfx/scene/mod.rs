//! # Scene Management Module
//!
//! The scene is the render thread's view of the world: a flat table of
//! named node groups, the helper geometry, the light rig and the camera.
//!
//! ## Key Components
//!
//! - [`Scene`] - group/node tables plus camera, lights and helpers
//! - [`Node`] - a single renderable shape with pose, scale and material
//! - [`Pose`] - position + orientation quaternion
//! - [`Vertex3D`] / [`LineVertex`] - GPU vertex formats

pub mod node;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use node::{Node, Pose};
pub use scene::{Group, LineSet, RenderToggles, Scene};
pub use vertex::{LineVertex, Vertex3D};
