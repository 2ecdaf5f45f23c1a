//! Global uniform bindings
//!
//! The per-frame uniform buffer shared by every pipeline: camera matrices,
//! the light rig, the shadow caster's view-projection, fog parameters and
//! the runtime render toggles. Bound at group 0, and the layout must match
//! the `Globals` struct in the WGSL shaders exactly.

use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

/// One directional light as the shaders see it; `direction.w` is the enable
/// flag (1.0 or 0.0).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub direction: [f32; 4],
    pub color: [f32; 4],
}

/// Per-frame global uniform content.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    /// Camera view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera eye position, homogeneous.
    pub view_position: [f32; 4],
    /// Shadow caster view-projection matrix.
    pub light_view_proj: [[f32; 4]; 4],
    /// Ambient light contribution.
    pub ambient: [f32; 4],
    pub lights: [GpuLight; 4],
    /// Fog color (rgb) and exponential-squared density (w).
    pub fog: [f32; 4],
    /// x: lights on, y: shadows on, z: hdr on, w: fog on.
    pub toggles: [u32; 4],
    /// x: textures on; remaining components reserved.
    pub extra: [u32; 4],
}

impl Default for GlobalUniform {
    fn default() -> Self {
        let identity = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self {
            view_proj: identity,
            view_position: [0.0; 4],
            light_view_proj: identity,
            ambient: [0.0, 0.0, 0.0, 1.0],
            lights: [GpuLight::default(); 4],
            fog: [0.0, 0.0, 0.0, 0.1],
            toggles: [0; 4],
            extra: [1, 0, 0, 0],
        }
    }
}

/// Type alias for the global uniform buffer.
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Layout and bind group for the global uniforms (group 0 everywhere).
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    /// Creates the bind group; must run once before rendering.
    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Globals Bind Group"),
        );
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// # Panics
    /// Panics if `create_bind_group` has not been called.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("global bind group has not been created yet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_is_tightly_packed() {
        // 2 matrices + view position + ambient + 4 lights + fog + 2 flag
        // vectors; any mismatch here would desync the WGSL mirror.
        assert_eq!(
            std::mem::size_of::<GlobalUniform>(),
            64 + 16 + 64 + 16 + 4 * 32 + 16 + 16 + 16
        );
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }
}
