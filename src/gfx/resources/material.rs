//! Material definitions and per-node bind group layouts
//!
//! Each node owns one material (color, surface parameters, optional albedo
//! texture). The GPU side is a small uniform buffer plus a texture/sampler
//! pair bound in the same group; nodes without a texture bind the shared
//! white texture so the shader path stays uniform.

use crate::wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

/// Surface properties of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// RGBA base color; alpha below 1.0 renders blended.
    pub base_color: [f32; 4],
    /// Metallic factor (0.0 = dielectric, 1.0 = metallic).
    pub metallic: f32,
    /// Surface roughness (0.0 = mirror, 1.0 = rough).
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

impl Material {
    pub fn new(base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
        }
    }

    /// Material of the helper floor plane.
    pub fn floor() -> Self {
        Self::new([0.3, 0.3, 0.3, 1.0], 0.0, 0.8)
    }

    pub(crate) fn to_uniform(self, has_texture: bool) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            metallic: self.metallic,
            roughness: self.roughness,
            has_texture: has_texture as u32,
            _padding: 0,
        }
    }
}

/// GPU uniform mirror of [`Material`]; must match the WGSL declaration.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub has_texture: u32,
    _padding: u32,
}

/// Bind group layouts shared by every node: group 1 carries the model
/// transform (vertex stage), group 2 the material uniform plus albedo
/// texture and sampler (fragment stage).
pub struct NodeBindings {
    pub transform_layout: BindGroupLayoutWithDesc,
    pub material_layout: BindGroupLayoutWithDesc,
}

impl NodeBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let transform_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(device, "Transform Bind Group Layout");

        let material_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
            .create(device, "Material Bind Group Layout");

        Self {
            transform_layout,
            material_layout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_defaults() {
        let material = Material::default();
        assert_eq!(material.base_color, [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(material.metallic, 0.0);
        assert_eq!(material.roughness, 0.5);
    }

    #[test]
    fn test_material_clamps_factors() {
        let material = Material::new([1.0, 0.0, 0.0, 1.0], 2.0, -1.0);
        assert_eq!(material.metallic, 1.0);
        assert_eq!(material.roughness, 0.0);
    }

    #[test]
    fn test_uniform_mirrors_material() {
        let material = Material::new([0.1, 0.2, 0.3, 0.4], 0.5, 0.6);
        let uniform = material.to_uniform(true);
        assert_eq!(uniform.base_color, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(uniform.has_texture, 1);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }
}
