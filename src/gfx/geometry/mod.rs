//! # Procedural Geometry
//!
//! Generates the primitive shapes a viewer can attach to node groups and
//! loads meshes from OBJ files. All generated shapes carry normals and
//! texture coordinates and use the crate's Z-up, right-handed convention.

pub mod primitives;

pub use primitives::*;

use std::path::{Path, PathBuf};

use cgmath::Vector3;

use crate::error::{Result, ViewerError};
use crate::gfx::scene::vertex::Vertex3D;

/// Geometry attached to a node by the `append_*` viewer calls.
///
/// Primitive variants generate their mesh procedurally; `Mesh` loads a
/// Wavefront OBJ from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box with the given edge lengths.
    Box { extents: [f32; 3] },
    /// UV sphere.
    Sphere { radius: f32 },
    /// Capped cylinder along the Z axis.
    Cylinder { radius: f32, length: f32 },
    /// Capsule along the Z axis; `length` is the distance between the
    /// hemisphere centers.
    Capsule { radius: f32, length: f32 },
    /// Rectangle in the XY plane with normal +Z.
    Plane { size: [f32; 2] },
    /// Mesh loaded from an OBJ file, scaled per axis.
    Mesh { path: PathBuf, scale: [f32; 3] },
}

impl Shape {
    /// Builds the mesh data and the node scale this shape implies.
    ///
    /// Uniform primitives (box, sphere, cylinder) are generated at unit size
    /// and sized through the node transform, so editing a node's scale later
    /// keeps its proportions meaningful.
    pub(crate) fn build(&self) -> Result<(GeometryData, Vector3<f32>)> {
        match *self {
            Shape::Box { extents } => Ok((generate_cube(), extents.into())),
            Shape::Sphere { radius } => Ok((
                generate_sphere(16, 16),
                Vector3::new(radius, radius, radius),
            )),
            Shape::Cylinder { radius, length } => Ok((
                generate_cylinder(32),
                Vector3::new(radius, radius, length),
            )),
            Shape::Capsule { radius, length } => Ok((
                generate_capsule(radius, length, 16, 16),
                Vector3::new(1.0, 1.0, 1.0),
            )),
            Shape::Plane { size } => Ok((
                generate_plane(size[0], size[1]),
                Vector3::new(1.0, 1.0, 1.0),
            )),
            Shape::Mesh { ref path, scale } => Ok((load_obj(path)?, scale.into())),
        }
    }
}

/// Mesh data ready for GPU upload.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute arrays into the renderer's vertex format.
    /// Missing normals default to +Z, missing texture coordinates to (0, 0).
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
            })
            .collect()
    }
}

/// Loads a Wavefront OBJ file, merging all models into one mesh.
///
/// Normals are taken from the file when present and consistent, otherwise
/// recomputed by area-weighted face averaging.
pub fn load_obj(path: &Path) -> Result<GeometryData> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|err| {
        ViewerError::InvalidArgument(format!("cannot load mesh {}: {}", path.display(), err))
    })?;

    if models.is_empty() {
        return Err(ViewerError::InvalidArgument(format!(
            "mesh {} contains no geometry",
            path.display()
        )));
    }

    let mut data = GeometryData::new();
    for model in &models {
        let mesh = &model.mesh;
        let base = data.vertices.len() as u32;

        let normals = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.clone()
        } else {
            compute_vertex_normals(&mesh.positions, &mesh.indices)
        };

        for i in 0..mesh.positions.len() / 3 {
            data.vertices.push([
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ]);
            data.normals
                .push([normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]]);
            if mesh.texcoords.len() >= (i + 1) * 2 {
                data.tex_coords
                    .push([mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]);
            } else {
                data.tex_coords.push([0.0, 0.0]);
            }
        }
        data.indices.extend(mesh.indices.iter().map(|i| i + base));
    }

    log::debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        data.vertex_count(),
        data.triangle_count()
    );
    Ok(data)
}

/// Computes smooth vertex normals by accumulating face normals.
pub(crate) fn compute_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    let mut normals = vec![0.0f32; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let v = |i: usize| {
            Vector3::new(
                positions[i * 3],
                positions[i * 3 + 1],
                positions[i * 3 + 2],
            )
        };
        // Cross product length is proportional to face area, which weights
        // the average toward larger faces.
        let face = (v(i1) - v(i0)).cross(v(i2) - v(i0));
        for &i in &[i0, i1, i2] {
            normals[i * 3] += face.x;
            normals[i * 3 + 1] += face.y;
            normals[i * 3 + 2] += face.z;
        }
    }

    for n in normals.chunks_exact_mut(3) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > 0.0 {
            n[0] /= len;
            n[1] /= len;
            n[2] /= len;
        }
    }
    normals
}
