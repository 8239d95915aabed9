//! Reference face selector
//!
//! The K reference faces sit on the vertices of a regular polygon. Clicking a
//! vertex picks that face; clicking inside the polygon blends all of them
//! with inverse-distance weights.

use std::f32::consts::PI;
use crate::model::{InterpolationWeights, ModelError};
use crate::rasterizer::Vec2;

/// Diameter of a drawn vertex marker, in pixels
pub const POINT_SIZE: f32 = 8.0;

/// Polygon radius as a fraction of the panel's smaller side
const RADIUS_FRACTION: f32 = 0.385;

/// What a click in the selector panel means
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Reference face (0-based vertex index)
    Reference(usize),
    /// Blend of every reference face
    Blend { point: Vec2, weights: InterpolationWeights },
    /// Outside the polygon
    None,
}

/// Regular K-gon laid out in a `width` x `height` panel
#[derive(Debug, Clone)]
pub struct Selector {
    vertices: Vec<Vec2>,
}

impl Selector {
    /// Vertex i sits at angle 2 pi i / K - pi / 2, so vertex 0 is at the top
    pub fn new(face_count: usize, width: f32, height: f32) -> Self {
        let center = Vec2::new(width * 0.5, height * 0.57);
        let radius = width.min(height) * RADIUS_FRACTION;
        let vertices = (0..face_count)
            .map(|i| {
                let angle = 2.0 * PI * i as f32 / face_count as f32 - PI / 2.0;
                Vec2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Vertex whose marker covers `point`
    pub fn hit_vertex(&self, point: Vec2) -> Option<usize> {
        self.vertices
            .iter()
            .position(|v| v.distance(point) <= POINT_SIZE / 2.0)
    }

    /// Even-odd point in polygon test
    pub fn contains(&self, point: Vec2) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (self.vertices[i], self.vertices[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Inverse-distance weights, w_i = 1 / |point - v_i|, normalized
    ///
    /// A point exactly on a vertex gets all of the weight.
    pub fn weights_at(&self, point: Vec2) -> Result<InterpolationWeights, ModelError> {
        let distances: Vec<f32> = self.vertices.iter().map(|v| v.distance(point)).collect();
        if let Some(on_vertex) = distances.iter().position(|&d| d == 0.0) {
            return InterpolationWeights::one_hot(distances.len(), on_vertex);
        }
        InterpolationWeights::normalized(distances.into_iter().map(|d| 1.0 / d).collect())
    }

    /// Classify a click in panel coordinates
    pub fn select(&self, point: Vec2) -> Result<Selection, ModelError> {
        if let Some(index) = self.hit_vertex(point) {
            return Ok(Selection::Reference(index));
        }
        if !self.contains(point) {
            return Ok(Selection::None);
        }
        let weights = self.weights_at(point)?;
        Ok(Selection::Blend { point, weights })
    }
}
