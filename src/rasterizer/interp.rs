//! Barycentric color interpolation across a triangle
//!
//! A `TriangleSampler` is built from three screen-space vertices, their
//! colors and an affine transform. It holds no reference to any surface:
//! callers ask it for individual pixels or let it fill a `Framebuffer`.

use super::math::{Affine2, Vec2, Vec3};
use super::render::{line_points, Framebuffer};
use super::types::{mix_colors, Color};

/// Sub-pixel sample positions for 4x multisampling (rotated grid)
pub const MSAA_SAMPLES: [(f32, f32); 4] = [
    (0.375, 0.125),
    (0.875, 0.375),
    (0.625, 0.875),
    (0.125, 0.625),
];

/// Precomputed barycentric constants for one triangle
///
/// Barycentric coordinates of a point P are weights (l1, l2, l3) with
/// P = l1 * V1 + l2 * V2 + l3 * V3 and l1 + l2 + l3 = 1. Solving for l1 and
/// l2 relative to V3 gives
///
/// l1 = (y23 (x - x3) - x23 (y - y3)) / d
///
/// l2 = (x13 (y - y3) - y13 (x - x3)) / d
///
/// where d = y23 x13 - x23 y13 is twice the signed area. A negative weight
/// means P lies outside the triangle.
#[derive(Debug, Clone)]
pub struct TriangleSampler {
    points: [Vec2; 3],
    colors: [Color; 3],
    x23: f32,
    x13: f32,
    y23: f32,
    y13: f32,
    denominator: f32,
}

impl TriangleSampler {
    /// Returns `None` for zero-area (or non-finite) triangles
    pub fn new(points: [Vec2; 3], colors: [Color; 3], xform: &Affine2) -> Option<Self> {
        let p = points.map(|p| xform.apply(p));

        let x23 = p[1].x - p[2].x;
        let x13 = p[0].x - p[2].x;
        let y23 = p[1].y - p[2].y;
        let y13 = p[0].y - p[2].y;
        let denominator = (y23 * x13) - (x23 * y13);

        if denominator == 0.0 || !denominator.is_finite() {
            return None;
        }

        Some(Self {
            points: p,
            colors,
            x23,
            x13,
            y23,
            y13,
            denominator,
        })
    }

    /// Barycentric weights (l1, l2, l3) of the point (x, y)
    pub fn barycentric(&self, x: f32, y: f32) -> Vec3 {
        let dx = x - self.points[2].x;
        let dy = y - self.points[2].y;
        let l1 = (self.y23 * dx - self.x23 * dy) / self.denominator;
        let l2 = (self.x13 * dy - self.y13 * dx) / self.denominator;
        Vec3::new(l1, l2, 1.0 - l1 - l2)
    }

    /// Interpolated color at (x, y), or `None` outside the triangle
    pub fn color_at(&self, x: f32, y: f32) -> Option<Color> {
        let l = self.barycentric(x, y);
        if l.x < 0.0 || l.y < 0.0 || l.z < 0.0 {
            return None;
        }
        Some(mix_colors(&self.colors, &[l.x, l.y, l.z]))
    }

    /// Color at (x, y) with the weights clamped onto the triangle
    ///
    /// Used for pixels just outside an edge.
    pub fn color_nearest(&self, x: f32, y: f32) -> Color {
        let l = self.barycentric(x, y).clamp(0.0, f32::MAX);
        mix_colors(&self.colors, &[l.x, l.y, l.z])
    }

    /// Single sample at the center of pixel (px, py)
    pub fn sample(&self, px: i32, py: i32) -> Color {
        self.color_at(px as f32 + 0.5, py as f32 + 0.5)
            .unwrap_or(Color::TRANSPARENT)
    }

    /// Four samples per pixel; alpha is scaled by the covered fraction
    pub fn sample_msaa(&self, px: i32, py: i32) -> Color {
        let mut mixes = [Color::TRANSPARENT; 4];
        let mut weights = [0.0f32; 4];

        for (i, (ox, oy)) in MSAA_SAMPLES.iter().enumerate() {
            if let Some(c) = self.color_at(px as f32 + ox, py as f32 + oy) {
                mixes[i] = c;
                weights[i] = 1.0;
            }
        }

        let covered: f32 = weights.iter().sum();
        if covered == 0.0 {
            return Color::TRANSPARENT;
        }
        mix_colors(&mixes, &weights).scale_alpha(covered * 0.25)
    }

    /// Pixel range covering the triangle, clamped to `width` x `height`
    fn pixel_bounds(&self, width: usize, height: usize) -> Option<(i32, i32, i32, i32)> {
        let min_x = self.points.iter().map(|p| p.x).fold(f32::MAX, f32::min).floor().max(0.0);
        let min_y = self.points.iter().map(|p| p.y).fold(f32::MAX, f32::min).floor().max(0.0);
        let max_x = self.points.iter().map(|p| p.x).fold(f32::MIN, f32::max).ceil().min(width as f32);
        let max_y = self.points.iter().map(|p| p.y).fold(f32::MIN, f32::max).ceil().min(height as f32);

        if min_x >= max_x || min_y >= max_y {
            return None;
        }
        Some((min_x as i32, min_y as i32, max_x as i32, max_y as i32))
    }

    /// Rasterize into the framebuffer, compositing over what is there
    pub fn fill(&self, fb: &mut Framebuffer, antialias: bool) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(fb.width, fb.height) else {
            return;
        };

        for py in y0..y1 {
            for px in x0..x1 {
                let color = if antialias {
                    self.sample_msaa(px, py)
                } else {
                    self.sample(px, py)
                };
                if color.a > 0 {
                    fb.blend_pixel(px as usize, py as usize, color);
                }
            }
        }
    }

    /// Stroke the three edges with the interpolated color
    ///
    /// Antialiased neighbours each leave partial coverage along a shared
    /// edge, which shows up as a hairline seam once composited. The stroke
    /// runs through the pixels whose centers lie on the edge.
    pub fn seal_edges(&self, fb: &mut Framebuffer) {
        let pixel = |p: Vec2| ((p.x - 0.5).round() as i32, (p.y - 0.5).round() as i32);
        for i in 0..3 {
            let (x0, y0) = pixel(self.points[i]);
            let (x1, y1) = pixel(self.points[(i + 1) % 3]);
            for (x, y) in line_points(x0, y0, x1, y1) {
                if x < 0 || y < 0 {
                    continue;
                }
                let color = self.color_nearest(x as f32 + 0.5, y as f32 + 0.5);
                if color.a > 0 {
                    fb.blend_pixel(x as usize, y as usize, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> TriangleSampler {
        TriangleSampler::new(
            [Vec2::new(0.0, 0.0), Vec2::new(40.0, 0.0), Vec2::new(0.0, 40.0)],
            [Color::new(255, 0, 0), Color::new(0, 255, 0), Color::new(0, 0, 255)],
            &Affine2::IDENTITY,
        )
        .expect("triangle has area")
    }

    #[test]
    fn test_weights_at_vertex_one_are_exact() {
        let s = sampler();
        assert_eq!(s.barycentric(0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(s.color_at(0.0, 0.0), Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_interior_weights_partition_unity() {
        let s = sampler();
        for &(x, y) in &[(1.0, 1.0), (10.0, 5.0), (19.5, 20.0), (3.25, 30.0)] {
            let l = s.barycentric(x, y);
            assert!((l.x + l.y + l.z - 1.0).abs() < 1e-5);
            for w in [l.x, l.y, l.z] {
                assert!((0.0..=1.0).contains(&w), "weight {} out of range at ({}, {})", w, x, y);
            }
        }
    }

    #[test]
    fn test_outside_pixel_is_transparent() {
        let s = sampler();
        assert_eq!(s.sample(35, 35), Color::TRANSPARENT);
        assert_eq!(s.sample_msaa(35, 35), Color::TRANSPARENT);
    }

    #[test]
    fn test_msaa_interior_is_opaque() {
        let s = sampler();
        assert_eq!(s.sample_msaa(5, 5).a, 255);
    }

    #[test]
    fn test_msaa_alpha_tracks_coverage() {
        // Right half-plane edge at x = 10.5 inside one pixel column
        let s = TriangleSampler::new(
            [Vec2::new(10.5, -100.0), Vec2::new(100.0, 50.0), Vec2::new(10.5, 200.0)],
            [Color::WHITE; 3],
            &Affine2::IDENTITY,
        )
        .expect("triangle has area");
        // Samples at x offsets 0.375 and 0.125 fall left of the edge
        let c = s.sample_msaa(10, 20);
        assert_eq!(c.a, 127);
        assert_eq!((c.r, c.g, c.b), (255, 255, 255));
    }

    #[test]
    fn test_zero_area_triangle_is_rejected() {
        let collinear = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0)];
        assert!(TriangleSampler::new(collinear, [Color::WHITE; 3], &Affine2::IDENTITY).is_none());
        let point = [Vec2::new(3.0, 3.0); 3];
        assert!(TriangleSampler::new(point, [Color::WHITE; 3], &Affine2::IDENTITY).is_none());
    }

    #[test]
    fn test_transform_moves_coverage() {
        let s = TriangleSampler::new(
            [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0)],
            [Color::WHITE; 3],
            &Affine2 { tx: 20.0, ty: 20.0, ..Affine2::IDENTITY },
        )
        .expect("triangle has area");
        assert_eq!(s.sample(0, 0), Color::TRANSPARENT);
        assert_eq!(s.sample(20, 20), Color::WHITE);
    }

    #[test]
    fn test_seal_edges_clips_negative_coordinates() {
        // Hypotenuse x + y = 20 crosses the buffer, the other edges lie off it
        let s = TriangleSampler::new(
            [Vec2::new(-10.0, -10.0), Vec2::new(30.0, -10.0), Vec2::new(-10.0, 30.0)],
            [Color::new(0, 0, 200); 3],
            &Affine2::IDENTITY,
        )
        .expect("triangle has area");
        let mut fb = Framebuffer::new(20, 20);
        fb.clear(Color::WHITE);
        s.seal_edges(&mut fb);

        for i in 0..20 {
            assert_eq!(fb.get_pixel(i, 19 - i), Color::new(0, 0, 200), "pixel ({}, {})", i, 19 - i);
        }
        assert_eq!(fb.get_pixel(0, 0), Color::WHITE);
        assert_eq!(fb.get_pixel(19, 19), Color::WHITE);
    }

    #[test]
    fn test_fill_writes_only_inside() {
        let mut fb = Framebuffer::new(50, 50);
        fb.clear(Color::BLACK);
        sampler().fill(&mut fb, false);
        assert!(fb.get_pixel(2, 2).r > 0);
        assert_eq!(fb.get_pixel(45, 45), Color::BLACK);
    }
}
