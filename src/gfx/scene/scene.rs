//! Scene state
//!
//! The scene is a flat table of named groups, each holding named nodes,
//! plus everything a frame needs besides the nodes themselves: camera,
//! light rig, render toggles, background color and the helper geometry
//! (axes tripod, ground grid, floor plane).
//!
//! All table operations are plain CPU bookkeeping; GPU resources are
//! attached to nodes by the render thread after the fact.

use std::collections::HashMap;

use cgmath::Vector3;

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::gfx::camera::{CameraController, CameraManager, OrbitCamera};
use crate::gfx::geometry::{generate_axes, generate_grid, generate_plane, GeometryData};
use crate::gfx::lighting::LightRig;
use crate::gfx::resources::material::Material;
use crate::gfx::scene::node::{Node, Pose};
use crate::gfx::scene::vertex::LineVertex;

/// Camera pose applied at startup and on camera reset.
pub const DEFAULT_CAMERA_EYE: Vector3<f32> = Vector3::new(4.0, -4.0, 1.5);
pub const DEFAULT_CAMERA_TARGET: Vector3<f32> = Vector3::new(0.0, 0.0, 0.5);

/// Default window background; the fog color follows it.
pub const DEFAULT_BACKGROUND: [f32; 3] = [0.41, 0.41, 0.41];

/// Runtime render switches not tied to the light rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderToggles {
    pub shadow: bool,
    pub hdr: bool,
    pub fog: bool,
    pub textures: bool,
    pub wireframe: bool,
}

/// A named bucket of nodes with a shared visibility flag.
#[derive(Default)]
pub struct Group {
    pub visible: bool,
    nodes: HashMap<String, Node>,
}

impl Group {
    fn new() -> Self {
        Self {
            visible: true,
            nodes: HashMap::new(),
        }
    }
}

/// Unlit line geometry (axes tripod, ground grid).
pub struct LineSet {
    pub visible: bool,
    vertices: Vec<LineVertex>,
    pub(crate) gpu: Option<LineGpu>,
}

pub(crate) struct LineGpu {
    pub vertex_buffer: wgpu::Buffer,
    pub vertex_count: u32,
}

impl LineSet {
    fn new(vertices: Vec<LineVertex>, visible: bool) -> Self {
        Self {
            visible,
            vertices,
            gpu: None,
        }
    }

    pub(crate) fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        use wgpu::util::DeviceExt;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.gpu = Some(LineGpu {
            vertex_buffer,
            vertex_count: self.vertices.len() as u32,
        });
    }
}

/// Main scene containing node groups, helpers, lights and the camera.
pub struct Scene {
    groups: HashMap<String, Group>,
    pub camera_manager: CameraManager,
    pub lights: LightRig,
    pub toggles: RenderToggles,
    pub background: [f32; 3],
    pub axes: LineSet,
    pub grid: LineSet,
    pub show_floor: bool,
    pub(crate) floor: Node,
}

impl Scene {
    /// Creates the scene a fresh viewer starts with, applying the startup
    /// configuration.
    pub fn new(config: &ViewerConfig, aspect: f32) -> Self {
        let camera = OrbitCamera::new(DEFAULT_CAMERA_EYE, DEFAULT_CAMERA_TARGET, aspect);
        let controller = CameraController::new(0.005, 0.1);
        let camera_manager = CameraManager::new(camera, controller);

        let mut floor = Node::new(generate_plane(10.0, 10.0), Vector3::new(1.0, 1.0, 1.0));
        floor.material = Material::floor();

        Self {
            groups: HashMap::new(),
            camera_manager,
            lights: LightRig::new(config.lights_enabled),
            toggles: RenderToggles {
                shadow: config.shadow_enabled,
                hdr: config.hdr_enabled,
                fog: config.fog_enabled,
                textures: true,
                wireframe: false,
            },
            background: DEFAULT_BACKGROUND,
            axes: LineSet::new(generate_axes(), config.show_axes),
            grid: LineSet::new(generate_grid(10, 1.0), config.show_grid),
            show_floor: config.show_floor,
            floor,
        }
    }

    /// Updates per-frame state (camera matrices).
    pub fn update(&mut self) {
        self.camera_manager.camera.update_view_proj();
    }

    // --- group table ------------------------------------------------------

    /// Creates a group, replacing (and dropping the nodes of) any existing
    /// group with the same name.
    pub fn append_group(&mut self, name: &str) {
        if self.groups.insert(name.to_string(), Group::new()).is_some() {
            log::debug!("group '{}' replaced", name);
        }
    }

    /// Removes a group and all its nodes.
    pub fn remove_group(&mut self, name: &str) -> Result<()> {
        self.groups
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ViewerError::NotFound(format!("group '{}'", name)))
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Toggles rendering of every node in a group.
    pub fn show_group(&mut self, name: &str, visible: bool) -> Result<()> {
        let group = self
            .groups
            .get_mut(name)
            .ok_or_else(|| ViewerError::NotFound(format!("group '{}'", name)))?;
        group.visible = visible;
        Ok(())
    }

    // --- node table -------------------------------------------------------

    /// Inserts a node under a group and returns it for GPU setup.
    pub fn append_node(
        &mut self,
        group: &str,
        name: &str,
        geometry: GeometryData,
        scale: Vector3<f32>,
    ) -> Result<&mut Node> {
        let bucket = self
            .groups
            .get_mut(group)
            .ok_or_else(|| ViewerError::NotFound(format!("group '{}'", group)))?;
        if bucket.nodes.contains_key(name) {
            return Err(ViewerError::AlreadyExists(format!("{}/{}", group, name)));
        }
        Ok(bucket
            .nodes
            .entry(name.to_string())
            .or_insert(Node::new(geometry, scale)))
    }

    pub fn node(&self, group: &str, name: &str) -> Result<&Node> {
        self.groups
            .get(group)
            .ok_or_else(|| ViewerError::NotFound(format!("group '{}'", group)))?
            .nodes
            .get(name)
            .ok_or_else(|| ViewerError::NotFound(format!("node '{}/{}'", group, name)))
    }

    pub fn node_mut(&mut self, group: &str, name: &str) -> Result<&mut Node> {
        self.groups
            .get_mut(group)
            .ok_or_else(|| ViewerError::NotFound(format!("group '{}'", group)))?
            .nodes
            .get_mut(name)
            .ok_or_else(|| ViewerError::NotFound(format!("node '{}/{}'", group, name)))
    }

    /// Applies a batch of pose updates in order. An unknown node name stops
    /// the batch with an error; updates already applied stay in place.
    pub fn move_nodes(&mut self, group: &str, poses: &[(String, Pose)]) -> Result<()> {
        for (name, pose) in poses {
            self.node_mut(group, name)?.pose = *pose;
        }
        Ok(())
    }

    /// Total node count across all groups.
    pub fn node_count(&self) -> usize {
        self.groups.values().map(|g| g.nodes.len()).sum()
    }

    /// Nodes of visible groups, plus the floor when shown.
    pub(crate) fn draw_nodes(&self) -> impl Iterator<Item = &Node> {
        let floor = self.show_floor.then_some(&self.floor);
        self.groups
            .values()
            .filter(|group| group.visible)
            .flat_map(|group| group.nodes.values())
            .chain(floor)
    }

    /// Mutable variant of [`Scene::draw_nodes`] used for the per-frame
    /// uniform sync.
    pub(crate) fn draw_nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        let floor = self.show_floor.then_some(&mut self.floor);
        self.groups
            .values_mut()
            .filter(|group| group.visible)
            .flat_map(|group| group.nodes.values_mut())
            .chain(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;
    use cgmath::Quaternion;

    fn test_scene() -> Scene {
        Scene::new(&ViewerConfig::default(), 800.0 / 600.0)
    }

    fn cube() -> (GeometryData, Vector3<f32>) {
        (generate_cube(), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_remove_group_drops_nodes() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "b1", geometry, scale).unwrap();
        assert_eq!(scene.node_count(), 1);

        scene.remove_group("root").unwrap();
        assert_eq!(scene.node_count(), 0);
        assert!(matches!(
            scene.node("root", "b1"),
            Err(ViewerError::NotFound(_))
        ));
    }

    #[test]
    fn test_append_node_requires_group() {
        let mut scene = test_scene();
        let (geometry, scale) = cube();
        assert!(matches!(
            scene.append_node("missing", "b1", geometry, scale),
            Err(ViewerError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "b1", geometry, scale).unwrap();
        let (geometry, scale) = cube();
        assert!(matches!(
            scene.append_node("root", "b1", geometry, scale),
            Err(ViewerError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_append_group_replaces_existing() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "b1", geometry, scale).unwrap();

        scene.append_group("root");
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn test_pose_roundtrip() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "b1", geometry, scale).unwrap();

        let pose = Pose::new(
            Vector3::new(1.0, 2.0, 3.0),
            Quaternion::new(0.5, 0.5, 0.5, 0.5),
        );
        scene
            .move_nodes("root", &[("b1".to_string(), pose)])
            .unwrap();
        assert_eq!(scene.node("root", "b1").unwrap().pose, pose);
    }

    #[test]
    fn test_move_nodes_partial_application() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "a", geometry, scale).unwrap();

        let moved = Pose::new(
            Vector3::new(9.0, 9.0, 9.0),
            Quaternion::new(1.0, 0.0, 0.0, 0.0),
        );
        let result = scene.move_nodes(
            "root",
            &[("a".to_string(), moved), ("ghost".to_string(), moved)],
        );
        assert!(matches!(result, Err(ViewerError::NotFound(_))));
        // the update before the failure stays applied
        assert_eq!(scene.node("root", "a").unwrap().pose, moved);
    }

    #[test]
    fn test_show_group_hides_nodes_from_draw_list() {
        let mut scene = test_scene();
        scene.append_group("root");
        let (geometry, scale) = cube();
        scene.append_node("root", "b1", geometry, scale).unwrap();

        assert_eq!(scene.draw_nodes().count(), 1);
        scene.show_group("root", false).unwrap();
        assert_eq!(scene.draw_nodes().count(), 0);
        assert!(scene.show_group("ghost", true).is_err());
    }

    #[test]
    fn test_floor_joins_draw_list_when_shown() {
        let mut scene = test_scene();
        assert_eq!(scene.draw_nodes().count(), 0);
        scene.show_floor = true;
        assert_eq!(scene.draw_nodes().count(), 1);
    }
}
