//! Procedural sphere mesh used to draw each particle.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

use crate::math::Vec3;

/// A single mesh vertex, laid out for direct upload as a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
}

impl MeshVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<Vec3> for MeshVertex {
    fn from(v: Vec3) -> Self {
        Self { position: v.to_array() }
    }
}

/// Flat, non-indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
}

impl Mesh {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// Point on a sphere of the given radius. `theta` sweeps around the Y axis,
/// `rho` runs from the north pole (`0`) to the south pole (`PI`).
pub fn spherical_to_cartesian(radius: f32, theta: f32, rho: f32) -> Vec3 {
    Vec3::new(theta.sin() * rho.sin(), rho.cos(), theta.cos() * rho.sin()) * radius
}

/// Builds a UV sphere as `theta_segments * rho_segments` quads, two
/// triangles each.
pub fn make_sphere(radius: f32, theta_segments: u32, rho_segments: u32) -> Mesh {
    let theta_step = TAU / theta_segments as f32;
    let rho_step = PI / rho_segments as f32;

    let mut vertices = Vec::with_capacity((theta_segments * rho_segments * 6) as usize);
    for j in 0..rho_segments {
        for i in 0..theta_segments {
            // Corner k is (theta index i + k % 2, rho index j + k / 2).
            let corner = |k: u32| {
                let theta = (i + k % 2) as f32 * theta_step;
                let rho = (j + k / 2) as f32 * rho_step;
                MeshVertex::from(spherical_to_cartesian(radius, theta, rho))
            };
            let quad = [corner(0), corner(1), corner(2), corner(3)];
            for k in [0, 1, 3, 0, 3, 2] {
                vertices.push(quad[k]);
            }
        }
    }

    Mesh { vertices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertex_count() {
        let mesh = make_sphere(0.3, 16, 16);
        assert_eq!(mesh.vertices.len(), 16 * 16 * 6);
        assert_eq!(mesh.triangle_count(), 16 * 16 * 2);

        let mesh = make_sphere(1.0, 7, 3);
        assert_eq!(mesh.vertex_count(), 7 * 3 * 6);
    }

    #[test]
    fn test_sphere_is_deterministic() {
        assert_eq!(make_sphere(0.3, 16, 16), make_sphere(0.3, 16, 16));
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let radius = 0.75;
        for v in make_sphere(radius, 12, 9).vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - radius).abs() < 1e-5, "vertex at distance {}", len);
        }
    }

    #[test]
    fn test_sphere_reaches_both_poles() {
        let mesh = make_sphere(1.0, 8, 8);
        let max_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let min_y = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((max_y - 1.0).abs() < 1e-5);
        assert!((min_y + 1.0).abs() < 1e-5);
    }
}
