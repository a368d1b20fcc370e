//! Triangle meshes for instanced groups.
//!
//! Small procedural shapes with per-vertex normals. Polyhedra are flat
//! shaded (each face gets its own vertices); the sphere is smooth.

use crate::config::OrnamentShape;
use crate::Vec3;
use bytemuck::{Pod, Zeroable};
use std::f32::consts::{PI, TAU};

/// GPU layout of one mesh vertex.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Mesh used for an ornament group.
    pub fn for_shape(shape: OrnamentShape) -> Self {
        match shape {
            OrnamentShape::Sphere => Self::uv_sphere(1.0, 32, 32),
            OrnamentShape::Box => Self::cuboid(Vec3::ONE),
        }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smooth UV sphere around the Y axis.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);

        for ring in 0..=rings {
            let theta = PI * ring as f32 / rings as f32;
            for seg in 0..=segments {
                let phi = TAU * seg as f32 / segments as f32;
                let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                vertices.push(MeshVertex::new(normal * radius, normal));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = a + stride;
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            }
        }

        Self { vertices, indices }
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size * 0.5;
        // (normal, u, v) with u x v = normal
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = (normal + u * su + v * sv) * half;
                mesh.vertices.push(MeshVertex::new(corner, normal));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Regular octahedron with vertices on the axes at `radius`.
    pub fn octahedron(radius: f32) -> Self {
        let mut faces = Vec::with_capacity(8);
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    faces.push([Vec3::X * sx, Vec3::Y * sy, Vec3::Z * sz]);
                }
            }
        }
        Self::flat_polyhedron(&faces, radius)
    }

    /// Regular icosahedron with circumradius `radius`.
    pub fn icosahedron(radius: f32) -> Self {
        let t = (1.0 + 5.0f32.sqrt()) / 2.0;
        let corners = [
            Vec3::new(-1.0, t, 0.0),
            Vec3::new(1.0, t, 0.0),
            Vec3::new(-1.0, -t, 0.0),
            Vec3::new(1.0, -t, 0.0),
            Vec3::new(0.0, -1.0, t),
            Vec3::new(0.0, 1.0, t),
            Vec3::new(0.0, -1.0, -t),
            Vec3::new(0.0, 1.0, -t),
            Vec3::new(t, 0.0, -1.0),
            Vec3::new(t, 0.0, 1.0),
            Vec3::new(-t, 0.0, -1.0),
            Vec3::new(-t, 0.0, 1.0),
        ];
        const FACES: [[usize; 3]; 20] = [
            [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
            [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
            [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
            [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
        ];

        let faces: Vec<[Vec3; 3]> = FACES
            .iter()
            .map(|f| [corners[f[0]], corners[f[1]], corners[f[2]]])
            .collect();
        Self::flat_polyhedron(&faces, radius)
    }

    /// Flat-shaded convex polyhedron centred on the origin.
    ///
    /// Corners are pushed out to `radius` and every face is wound so its
    /// normal points away from the centre.
    fn flat_polyhedron(faces: &[[Vec3; 3]], radius: f32) -> Self {
        let mut mesh = Self::default();
        for face in faces {
            let [mut a, b, mut c] = face.map(|p| p.normalize() * radius);
            let mut normal = (b - a).cross(c - a).normalize();
            if normal.dot(a + b + c) < 0.0 {
                std::mem::swap(&mut a, &mut c);
                normal = -normal;
            }
            let base = mesh.vertices.len() as u32;
            for p in [a, b, c] {
                mesh.vertices.push(MeshVertex::new(p, normal));
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        mesh
    }
}
