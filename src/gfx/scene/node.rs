//! Scene nodes
//!
//! A [`Node`] is a single renderable shape or mesh instance living inside a
//! named group. It owns its pose, per-axis scale and material on the CPU
//! side; GPU buffers are attached separately once a device exists, so the
//! bookkeeping stays testable without a graphics stack.

use cgmath::{Matrix4, Quaternion, Vector3};
use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;
use crate::gfx::resources::material::{Material, MaterialUniform, NodeBindings};
use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{BindGroupBuilder, UniformBuffer};

/// Position plus orientation of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, orientation: Quaternion<f32>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Origin with identity orientation.
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

type TransformUniform = [[f32; 4]; 4];

/// GPU resources of one node; created by [`Node::init_gpu_resources`].
pub(crate) struct NodeGpu {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    transform_ubo: UniformBuffer<TransformUniform>,
    pub transform_bind_group: wgpu::BindGroup,
    material_ubo: UniformBuffer<MaterialUniform>,
    pub material_bind_group: wgpu::BindGroup,
    // Kept alive for the bind group; None while the shared white texture is
    // bound instead.
    _texture: Option<TextureResource>,
}

/// A single renderable shape or mesh instance.
pub struct Node {
    pub pose: Pose,
    pub scale: Vector3<f32>,
    pub material: Material,
    geometry: GeometryData,
    pub(crate) gpu: Option<NodeGpu>,
}

impl Node {
    pub fn new(geometry: GeometryData, scale: Vector3<f32>) -> Self {
        Self {
            pose: Pose::identity(),
            scale,
            material: Material::default(),
            geometry,
            gpu: None,
        }
    }

    pub fn geometry(&self) -> &GeometryData {
        &self.geometry
    }

    /// Model matrix: translation * rotation * scale.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.pose.position)
            * Matrix4::from(self.pose.orientation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Whether the node needs alpha blending.
    pub fn is_transparent(&self) -> bool {
        self.material.base_color[3] < 1.0
    }

    /// Uploads the mesh and creates the per-node uniform buffers and bind
    /// groups. Runs once, right after the node is appended on the render
    /// thread.
    pub(crate) fn init_gpu_resources(
        &mut self,
        device: &wgpu::Device,
        bindings: &NodeBindings,
        fallback_texture: &TextureResource,
    ) {
        let vertices = self.geometry.to_vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Node Index Buffer"),
            contents: bytemuck::cast_slice(&self.geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let model: TransformUniform = self.model_matrix().into();
        let transform_ubo = UniformBuffer::new_with_data(device, &model);
        let transform_bind_group = BindGroupBuilder::new(&bindings.transform_layout)
            .resource(transform_ubo.binding_resource())
            .create(device, "Node Transform Bind Group");

        let material_ubo = UniformBuffer::new_with_data(device, &self.material.to_uniform(false));
        let material_bind_group = BindGroupBuilder::new(&bindings.material_layout)
            .resource(material_ubo.binding_resource())
            .texture(&fallback_texture.view)
            .sampler(&fallback_texture.sampler)
            .create(device, "Node Material Bind Group");

        self.gpu = Some(NodeGpu {
            vertex_buffer,
            index_buffer,
            index_count: self.geometry.indices.len() as u32,
            transform_ubo,
            transform_bind_group,
            material_ubo,
            material_bind_group,
            _texture: None,
        });
    }

    /// Attaches an albedo texture, rebuilding the material bind group.
    pub(crate) fn set_texture(
        &mut self,
        device: &wgpu::Device,
        bindings: &NodeBindings,
        texture: TextureResource,
    ) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.material_bind_group = BindGroupBuilder::new(&bindings.material_layout)
                .resource(gpu.material_ubo.binding_resource())
                .texture(&texture.view)
                .sampler(&texture.sampler)
                .create(device, "Node Material Bind Group");
            gpu._texture = Some(texture);
        }
    }

    pub(crate) fn has_texture(&self) -> bool {
        self.gpu
            .as_ref()
            .map(|gpu| gpu._texture.is_some())
            .unwrap_or(false)
    }

    /// Syncs transform and material uniforms to the GPU; cheap when nothing
    /// changed.
    pub(crate) fn sync(&mut self, queue: &wgpu::Queue) {
        let model: TransformUniform = self.model_matrix().into();
        let material = self.material.to_uniform(self.has_texture());
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.transform_ubo.update_content(queue, model);
            gpu.material_ubo.update_content(queue, material);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_identity_pose() {
        let pose = Pose::identity();
        assert_eq!(pose.position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(pose.orientation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_model_matrix_applies_scale_and_translation() {
        let mut node = Node::new(generate_cube(), Vector3::new(2.0, 3.0, 4.0));
        node.pose = Pose::new(
            Vector3::new(1.0, 0.0, -1.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        );
        let m = node.model_matrix();
        // corner (0.5, 0.5, 0.5) lands at scale + translation
        let corner = m * cgmath::Vector4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(corner, cgmath::Vector4::new(2.0, 1.5, 1.0, 1.0));
    }

    #[test]
    fn test_transparency_from_alpha() {
        let mut node = Node::new(generate_cube(), Vector3::new(1.0, 1.0, 1.0));
        assert!(!node.is_transparent());
        node.material.base_color[3] = 0.5;
        assert!(node.is_transparent());
    }
}
