//! GPU resource management
//!
//! Textures, materials, per-node bindings and the global uniform buffer.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUniform, GlobalUBO};
pub use material::{Material, NodeBindings};
pub use texture_resource::TextureResource;
