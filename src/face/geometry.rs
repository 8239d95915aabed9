//! Triangles, faces and bounds
//!
//! Pure data structures. Lighting and rasterization live in `rasterizer`.

use crate::rasterizer::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Tightest box around `points`; an empty iterator gives a zero box
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let mut bounds = Self::new(first, first);
        for p in iter {
            bounds.expand(p);
        }
        bounds
    }

    /// Expand bounds to include a point
    pub fn expand(&mut self, point: Vec3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Get center of the box
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }
}

/// A triangle with one RGB color per vertex
///
/// `painter_z` caches the greatest Z of the three points and is the sort key
/// for painter's algorithm. Fields stay private so the cache is refreshed on
/// every change.
#[derive(Debug, Clone)]
pub struct Triangle {
    points: [Vec3; 3],
    colors: [Vec3; 3],
    painter_z: f32,
}

impl Triangle {
    pub fn new(points: [Vec3; 3], colors: [Vec3; 3]) -> Self {
        Self {
            points,
            colors,
            painter_z: max_z(&points),
        }
    }

    pub fn points(&self) -> &[Vec3; 3] {
        &self.points
    }

    pub fn colors(&self) -> &[Vec3; 3] {
        &self.colors
    }

    /// Greatest Z among the three points (nearest the viewer)
    pub fn painter_z(&self) -> f32 {
        self.painter_z
    }

    /// Unit facet normal, cross(P2 - P1, P3 - P1); zero when degenerate
    pub fn normal(&self) -> Vec3 {
        let [p1, p2, p3] = self.points;
        (p2 - p1).cross(p3 - p1).normalize()
    }

    /// Copy with every coordinate and color channel multiplied by `w`
    pub fn scaled(&self, w: f32) -> Triangle {
        Triangle::new(self.points.map(|p| p * w), self.colors.map(|c| c * w))
    }

    /// Add another triangle's points and colors slot by slot
    pub fn accumulate(&mut self, other: &Triangle) {
        for i in 0..3 {
            self.points[i] += other.points[i];
            self.colors[i] += other.colors[i];
        }
        self.painter_z = max_z(&self.points);
    }

    /// Copy with the points moved by `f`, colors untouched
    pub fn map_points(&self, f: impl Fn(Vec3) -> Vec3) -> Triangle {
        Triangle::new(self.points.map(f), self.colors)
    }

    /// Points ordered by Z (ties broken on Y then X) for comparisons
    fn sorted_points(&self) -> [Vec3; 3] {
        let mut sorted = self.points;
        sorted.sort_by(|a, b| {
            a.z.total_cmp(&b.z)
                .then_with(|| a.y.total_cmp(&b.y))
                .then_with(|| a.x.total_cmp(&b.x))
        });
        sorted
    }
}

/// Two triangles are equal when they are made of the same points, in any
/// order. Colors are ignored.
impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_points() == other.sorted_points()
    }
}

fn max_z(points: &[Vec3; 3]) -> f32 {
    points[0].z.max(points[1].z).max(points[2].z)
}

/// A face: triangles in mesh order
///
/// Triangle `i` of any face corresponds to mesh entry `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Face {
    triangles: Vec<Triangle>,
}

impl Face {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Bounding box over every vertex of every triangle
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.triangles.iter().flat_map(|t| t.points().iter().copied()))
    }

    /// Add `other` into this face slot by slot (same mesh, same order)
    pub fn accumulate(&mut self, other: &Face) {
        debug_assert_eq!(self.len(), other.len());
        for (acc, t) in self.triangles.iter_mut().zip(&other.triangles) {
            acc.accumulate(t);
        }
    }

    /// Copy with every triangle scaled by `w`
    pub fn scaled(&self, w: f32) -> Face {
        Face::new(self.triangles.iter().map(|t| t.scaled(w)).collect())
    }

    /// Copy rotated about the vertical axis through `pivot`
    ///
    /// Positive angles turn +X towards -Z:
    /// x' = x cos(a) + z sin(a), z' = -x sin(a) + z cos(a), relative to the
    /// pivot. Y and colors are unchanged.
    pub fn rotated_y(&self, angle: f32, pivot: Vec3) -> Face {
        let (sin, cos) = angle.sin_cos();
        let rotate = |p: Vec3| {
            let x = p.x - pivot.x;
            let z = p.z - pivot.z;
            Vec3::new(x * cos + z * sin + pivot.x, p.y, -x * sin + z * cos + pivot.z)
        };
        Face::new(self.triangles.iter().map(|t| t.map_points(rotate)).collect())
    }

    /// Triangle indices, farthest first (stable on ties)
    pub fn painter_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.triangles.len()).collect();
        order.sort_by(|&a, &b| {
            self.triangles[a].painter_z().total_cmp(&self.triangles[b].painter_z())
        });
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tri(z: [f32; 3]) -> Triangle {
        Triangle::new(
            [Vec3::new(0.0, 0.0, z[0]), Vec3::new(1.0, 0.0, z[1]), Vec3::new(0.0, 1.0, z[2])],
            [Vec3::new(10.0, 20.0, 30.0); 3],
        )
    }

    #[test]
    fn test_painter_z_is_max_and_tracks_accumulate() {
        let mut t = tri([1.0, 5.0, -2.0]);
        assert_eq!(t.painter_z(), 5.0);
        t.accumulate(&tri([0.0, -10.0, 10.0]));
        assert_eq!(t.painter_z(), 8.0);
    }

    #[test]
    fn test_equality_ignores_vertex_order_and_color() {
        let a = Triangle::new(
            [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 2.0), Vec3::new(0.0, 1.0, 3.0)],
            [Vec3::ZERO; 3],
        );
        let b = Triangle::new(
            [Vec3::new(0.0, 1.0, 3.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 2.0)],
            [Vec3::new(1.0, 1.0, 1.0); 3],
        );
        assert_eq!(a, b);
        assert_ne!(a, tri([1.0, 2.0, 4.0]));
    }

    #[test]
    fn test_painter_order_is_ascending_and_stable() {
        let face = Face::new(vec![tri([3.0; 3]), tri([1.0; 3]), tri([3.0; 3]), tri([-2.0, 0.0, 2.0])]);
        assert_eq!(face.painter_order(), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_bounds_cover_all_points() {
        let face = Face::new(vec![tri([1.0, 5.0, -2.0])]);
        let b = face.bounds();
        assert_eq!(b.min, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(b.max, Vec3::new(1.0, 1.0, 5.0));
        assert_eq!(b.center(), Vec3::new(0.5, 0.5, 1.5));
        assert_eq!(Face::default().bounds(), Aabb::default());
    }

    #[test]
    fn test_rotation_round_trip() {
        let face = Face::new(vec![
            Triangle::new(
                [Vec3::new(12.5, -3.0, 40.0), Vec3::new(-7.0, 2.0, 11.0), Vec3::new(3.0, 9.0, -25.0)],
                [Vec3::new(200.0, 100.0, 50.0); 3],
            ),
            tri([1.0, 5.0, -2.0]),
        ]);
        let pivot = face.bounds().center();
        let step = PI / 10.0;

        let mut rotated = face.clone();
        for _ in 0..10 {
            rotated = rotated.rotated_y(step, pivot);
        }
        for _ in 0..10 {
            rotated = rotated.rotated_y(-step, pivot);
        }

        for (a, b) in face.triangles().iter().zip(rotated.triangles()) {
            for (p, q) in a.points().iter().zip(b.points()) {
                assert!((*p - *q).len() < 1e-3, "{:?} drifted to {:?}", p, q);
            }
            assert_eq!(a.colors(), b.colors());
        }
    }

    #[test]
    fn test_half_turn_mirrors_about_pivot() {
        let face = Face::new(vec![tri([0.0, 0.0, 0.0])]);
        let turned = face.rotated_y(PI, Vec3::ZERO);
        let p = turned.triangles()[0].points()[1];
        assert!((p.x + 1.0).abs() < 1e-6 && p.z.abs() < 1e-6 && p.y == 0.0);
    }
}
