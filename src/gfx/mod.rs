//! # Graphics Module
//!
//! Everything between the viewer facade and the GPU: camera system,
//! procedural geometry, scene state, lighting, GPU resources and the
//! rendering engine.
//!
//! - **Camera** ([`camera`]) - Z-up orbit camera with mouse control
//! - **Geometry** ([`geometry`]) - primitive generation and OBJ loading
//! - **Scene** ([`scene`]) - group/node tables, helpers and toggles
//! - **Lighting** ([`lighting`]) - the default light rig
//! - **Rendering** ([`rendering`]) - pipelines, passes and capture
//! - **Resources** ([`resources`]) - textures, materials, uniform bindings

pub mod camera;
pub mod geometry;
pub mod lighting;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
