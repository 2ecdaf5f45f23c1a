//! Core rendering functionality
//!
//! Render pipelines, frame rendering and screenshot capture.

pub mod pipeline_manager;
pub mod render_engine;
pub mod screenshot;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
pub use screenshot::Screenshot;
