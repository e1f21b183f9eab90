//! Indexed triangle mesh produced by surface extraction.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use static_assertions::const_assert_eq;

use crate::error::MeshError;

/// Positions, triangle indices and per-vertex normals.
///
/// Every triangle owns its three vertices, which share the triangle's flat
/// normal. `indices.len()` is a multiple of 3, every index is below
/// `vertices.len()`, and `normals` runs parallel to `vertices`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
    /// Unit normal of each vertex.
    pub normals: Vec<Vec3>,
}

/// Interleaved vertex layout for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    /// Position in world space.
    pub position: [f32; 3],
    /// Unit normal.
    pub normal: [f32; 3],
}

const_assert_eq!(std::mem::size_of::<GpuVertex>(), 24);

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append one triangle with a shared flat normal.
    ///
    /// Fails without modifying the mesh if the new vertices could not be
    /// addressed by `u32` indices.
    pub fn push_triangle(&mut self, positions: [Vec3; 3], normal: Vec3) -> Result<(), MeshError> {
        let base = triangle_base(self.vertices.len())?;
        self.vertices.extend_from_slice(&positions);
        self.normals.extend_from_slice(&[normal; 3]);
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
        Ok(())
    }

    /// Concatenate `other` after this mesh, rebasing its indices.
    pub fn append(&mut self, other: Mesh) -> Result<(), MeshError> {
        let total = self.vertices.len() + other.vertices.len();
        if total > u32::MAX as usize {
            return Err(MeshError::IndexOverflow(total));
        }
        self.vertices
            .try_reserve(other.vertices.len())
            .map_err(MeshError::Allocation)?;
        self.normals
            .try_reserve(other.normals.len())
            .map_err(MeshError::Allocation)?;
        self.indices
            .try_reserve(other.indices.len())
            .map_err(MeshError::Allocation)?;

        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
        Ok(())
    }

    /// Shift every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        if offset == Vec3::ZERO {
            return;
        }
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Triangle corner positions in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds of all vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), &v| (min.min(v), max.max(v))),
        )
    }

    /// Check the index, normal and unit-length invariants.
    pub fn is_well_formed(&self) -> bool {
        let count = self.vertices.len();
        self.indices.len() % 3 == 0
            && self.normals.len() == count
            && self.indices.iter().all(|&i| (i as usize) < count)
            && self
                .normals
                .iter()
                .all(|n| (n.length() - 1.0).abs() < 1e-4)
    }

    /// Interleave positions and normals for GPU upload.
    pub fn interleaved(&self) -> Vec<GpuVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .map(|(p, n)| GpuVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }

    /// The index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// First index of a triangle appended after `len` vertices.
fn triangle_base(len: usize) -> Result<u32, MeshError> {
    u32::try_from(len)
        .ok()
        .filter(|base| base.checked_add(2).is_some())
        .ok_or(MeshError::IndexOverflow(len.saturating_add(3)))
}
