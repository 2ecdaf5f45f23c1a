//! # Primitive Shape Generation
//!
//! Functions generating the common 3D primitives plus the axes/grid line
//! helpers. All shapes come with outward normals and texture coordinates,
//! use counter-clockwise winding and the Z-up convention.

use std::f32::consts::PI;

use super::GeometryData;
use crate::gfx::scene::vertex::LineVertex;

/// Generate a unit cube centered at the origin.
///
/// Vertices span -0.5 to 0.5 on all axes; each face has its own four
/// vertices so normals stay flat.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    ];
    let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

    for (normal, tu, tv) in faces {
        let base = data.vertices.len() as u32;
        for (u, v) in corners {
            let position = [
                normal[0] * 0.5 + tu[0] * (u - 0.5) + tv[0] * (v - 0.5),
                normal[1] * 0.5 + tu[1] * (u - 0.5) + tv[1] * (v - 0.5),
                normal[2] * 0.5 + tu[2] * (u - 0.5) + tv[2] * (v - 0.5),
            ];
            data.vertices.push(position);
            data.normals.push(normal);
            data.tex_coords.push([u, v]);
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit UV sphere centered at the origin.
///
/// # Arguments
/// * `segments` - longitude subdivisions (min 3)
/// * `rings` - latitude subdivisions (min 2)
pub fn generate_sphere(segments: u32, rings: u32) -> GeometryData {
    generate_capsule(1.0, 0.0, segments, rings)
}

/// Generate a capsule along the Z axis.
///
/// Sampled like a UV sphere with the two hemispheres pushed apart by
/// `length / 2`; the wall between the split rings forms the cylindrical
/// side, so the mesh stays watertight. A zero `length` yields a sphere.
///
/// # Arguments
/// * `radius` - hemisphere radius
/// * `length` - distance between the hemisphere centers
/// * `segments` - longitude subdivisions (min 3)
/// * `rings` - latitude subdivisions (min 2)
pub fn generate_capsule(radius: f32, length: f32, segments: u32, rings: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let rings = rings.max(2);

    for lat in 0..=rings {
        let theta = lat as f32 * PI / rings as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        let offset = if cos_theta > 0.0 {
            0.5 * length
        } else if cos_theta < 0.0 {
            -0.5 * length
        } else {
            0.0
        };

        for long in 0..=segs {
            let phi = long as f32 * 2.0 * PI / segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = sin_theta * sin_phi;
            let z = cos_theta;

            data.vertices
                .push([x * radius, y * radius, z * radius + offset]);
            data.normals.push([x, y, z]);
            data.tex_coords
                .push([long as f32 / segs as f32, lat as f32 / rings as f32]);
        }
    }

    for lat in 0..rings {
        for long in 0..segs {
            let first = lat * (segs + 1) + long;
            let second = first + segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices
                .extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

/// Generate a capped unit cylinder along the Z axis.
///
/// Radius 1, extending from -0.5 to 0.5 in Z; sized through the node
/// transform.
///
/// # Arguments
/// * `segments` - circular subdivisions (min 3)
pub fn generate_cylinder(segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);

    // Side wall, seam column duplicated for clean texture wrapping.
    for i in 0..=segs {
        let phi = i as f32 * 2.0 * PI / segs as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let u = i as f32 / segs as f32;

        for (z, v) in [(-0.5, 0.0), (0.5, 1.0)] {
            data.vertices.push([cos_phi, sin_phi, z]);
            data.normals.push([cos_phi, sin_phi, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }
    for i in 0..segs {
        let bottom = i * 2;
        let top = bottom + 1;
        let bottom_next = bottom + 2;
        let top_next = bottom + 3;

        data.indices.extend_from_slice(&[bottom, bottom_next, top]);
        data.indices.extend_from_slice(&[top, bottom_next, top_next]);
    }

    // Caps, fanned around a center vertex.
    for z in [-0.5f32, 0.5] {
        let normal = [0.0, 0.0, z.signum()];
        let center = data.vertices.len() as u32;
        data.vertices.push([0.0, 0.0, z]);
        data.normals.push(normal);
        data.tex_coords.push([0.5, 0.5]);

        for i in 0..=segs {
            let phi = i as f32 * 2.0 * PI / segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            data.vertices.push([cos_phi, sin_phi, z]);
            data.normals.push(normal);
            data.tex_coords
                .push([0.5 + 0.5 * cos_phi, 0.5 + 0.5 * sin_phi]);
        }
        for i in 0..segs {
            let ring = center + 1 + i;
            if z > 0.0 {
                data.indices.extend_from_slice(&[center, ring, ring + 1]);
            } else {
                data.indices.extend_from_slice(&[center, ring + 1, ring]);
            }
        }
    }

    data
}

/// Generate a rectangle in the XY plane, centered at the origin, with the
/// normal pointing up (+Z).
pub fn generate_plane(size_x: f32, size_y: f32) -> GeometryData {
    let mut data = GeometryData::new();

    for (u, v) in [(0.0f32, 0.0f32), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        data.vertices
            .push([(u - 0.5) * size_x, (v - 0.5) * size_y, 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push([u, v]);
    }
    data.indices = vec![0, 1, 2, 2, 3, 0];

    data
}

/// Generate the unlit axes tripod: unit lines from the origin along X, Y, Z
/// colored red, green and blue.
pub fn generate_axes() -> Vec<LineVertex> {
    let mut vertices = Vec::with_capacity(6);
    for axis in 0..3 {
        let mut direction = [0.0f32; 3];
        direction[axis] = 1.0;
        let mut color = [0.0, 0.0, 0.0, 1.0];
        color[axis] = 1.0;

        vertices.push(LineVertex {
            position: [0.0, 0.0, 0.0],
            color,
        });
        vertices.push(LineVertex {
            position: direction,
            color,
        });
    }
    vertices
}

/// Generate the ground-plane grid at Z = 0.
///
/// # Arguments
/// * `num_ticks` - tick count per axis
/// * `step` - spacing between ticks
pub fn generate_grid(num_ticks: u32, step: f32) -> Vec<LineVertex> {
    const GRID_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

    let half = num_ticks as i32 / 2;
    let extent = half as f32 * step;
    let mut vertices = Vec::with_capacity(((2 * half + 1) * 4) as usize);

    for i in -half..=half {
        let t = i as f32 * step;
        for (a, b) in [
            ([t, -extent, 0.0], [t, extent, 0.0]),
            ([-extent, t, 0.0], [extent, t, 0.0]),
        ] {
            vertices.push(LineVertex {
                position: a,
                color: GRID_COLOR,
            });
            vertices.push(LineVertex {
                position: b,
                color: GRID_COLOR,
            });
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.triangle_count(), 12);

        // every vertex sits on the unit cube surface
        for v in &cube.vertices {
            assert!(v.iter().any(|c| c.abs() == 0.5));
            assert!(v.iter().all(|c| c.abs() <= 0.5));
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(!sphere.vertices.is_empty());
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());

        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_capsule_extends_sphere() {
        let capsule = generate_capsule(0.5, 2.0, 8, 8);
        let max_z = capsule
            .vertices
            .iter()
            .map(|v| v[2])
            .fold(f32::MIN, f32::max);
        let min_z = capsule
            .vertices
            .iter()
            .map(|v| v[2])
            .fold(f32::MAX, f32::min);
        assert!((max_z - 1.5).abs() < 1e-5); // length/2 + radius
        assert!((min_z + 1.5).abs() < 1e-5);

        // indices all in range
        assert!(capsule
            .indices
            .iter()
            .all(|&i| (i as usize) < capsule.vertices.len()));
    }

    #[test]
    fn test_cylinder_generation() {
        let cyl = generate_cylinder(16);
        // 2 * (segs + 1) side vertices + 2 * (segs + 2) cap vertices
        assert_eq!(cyl.vertices.len(), 2 * 17 + 2 * 18);
        // segs * 2 side triangles + 2 * segs cap triangles
        assert_eq!(cyl.triangle_count(), 16 * 2 + 2 * 16);
        assert!(cyl.indices.iter().all(|&i| (i as usize) < cyl.vertices.len()));
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(4.0, 2.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert!(plane.vertices.iter().all(|v| v[2] == 0.0));
        assert!(plane.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
        assert!(plane
            .vertices
            .iter()
            .all(|v| v[0].abs() == 2.0 && v[1].abs() == 1.0));
    }

    #[test]
    fn test_axes_and_grid() {
        let axes = generate_axes();
        assert_eq!(axes.len(), 6);
        // X axis drawn red
        assert_eq!(axes[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(axes[1].color, [1.0, 0.0, 0.0, 1.0]);

        let grid = generate_grid(10, 1.0);
        // 11 ticks, two lines each, two vertices per line
        assert_eq!(grid.len(), 11 * 4);
        assert!(grid.iter().all(|v| v.position[2] == 0.0));
    }
}
