//! Vertex to triangle lookup for per-vertex lighting
//!
//! Built once per face. Points are matched by exact value, so two triangles
//! share a vertex only when they carry the very same coordinates.

use std::collections::HashMap;
use crate::rasterizer::Vec3;
use super::Face;

#[derive(Debug, Clone, Default)]
pub struct VertexAdjacency {
    triangles_at: HashMap<[u32; 3], Vec<usize>>,
}

impl VertexAdjacency {
    pub fn build(face: &Face) -> Self {
        let mut triangles_at: HashMap<[u32; 3], Vec<usize>> = HashMap::new();
        for (index, triangle) in face.triangles().iter().enumerate() {
            for point in triangle.points() {
                let list = triangles_at.entry(point.bits()).or_default();
                // A triangle may repeat a point; list it once
                if list.last() != Some(&index) {
                    list.push(index);
                }
            }
        }
        Self { triangles_at }
    }

    /// Indices of every triangle that has `point` as a vertex
    pub fn triangles_at(&self, point: Vec3) -> &[usize] {
        self.triangles_at
            .get(&point.bits())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mean of the facet normals around `point` (not renormalized)
    pub fn vertex_normal(&self, face: &Face, point: Vec3) -> Vec3 {
        let adjacent = self.triangles_at(point);
        if adjacent.is_empty() {
            return Vec3::ZERO;
        }
        let mut sum = Vec3::ZERO;
        for &i in adjacent {
            sum += face.triangles()[i].normal();
        }
        sum * (1.0 / adjacent.len() as f32)
    }
}
