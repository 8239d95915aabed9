//! Core rendering functions
//! Orthographic face drawing with painter's algorithm and Lambert lighting

use log::trace;
use super::interp::TriangleSampler;
use super::math::{Affine2, Vec2, Vec3};
use super::types::{Color, RenderMode, RenderSettings};
use crate::face::{Aabb, Face, Triangle, VertexAdjacency};

/// Framebuffer for software rendering
pub struct Framebuffer {
    pub pixels: Vec<u8>, // RGBA, 4 bytes per pixel
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for pixel in self.pixels.chunks_exact_mut(4) {
            pixel.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let p = &self.pixels[idx..idx + 4];
            Color::with_alpha(p[0], p[1], p[2], p[3])
        } else {
            Color::TRANSPARENT
        }
    }

    /// Composite `color` over the existing pixel
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let blended = color.over(self.get_pixel(x, y));
            self.set_pixel(x, y, blended);
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        for (x, y) in line_points(x0, y0, x1, y1) {
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }
        }
    }
}

/// Pixels on the line from (x0, y0) to (x1, y1), endpoints included
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;
    let mut points = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        points.push((x, y));

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Remap a model-space point into a `width` x `height` viewport
///
/// X and Y are stretched independently from the bounds to the viewport, Y is
/// flipped so model +Y points up the screen. Z uses the X range. An axis
/// with no extent collapses to 0.
pub fn scale_point(p: Vec3, bounds: &Aabb, width: f32, height: f32) -> Vec3 {
    fn remap(v: f32, min: f32, max: f32, size: f32) -> f32 {
        let range = max - min;
        if range == 0.0 || !range.is_finite() {
            return 0.0;
        }
        (v - min) / range * size
    }

    Vec3::new(
        remap(p.x, bounds.min.x, bounds.max.x, width),
        height - remap(p.y, bounds.min.y, bounds.max.y, height),
        remap(p.z, bounds.min.z, bounds.max.z, width),
    )
}

/// Lambert term for a normal, |n . l| * kd * I
pub fn light_intensity(normal: Vec3, settings: &RenderSettings) -> f32 {
    (normal.dot(settings.light_dir) * settings.diffuse * settings.light_intensity).abs()
}

/// Multiply an RGB color by the light intensity, clamped to 0-255
pub fn illuminate(color: Vec3, intensity: f32) -> Vec3 {
    (color * intensity).clamp(0.0, 255.0)
}

/// Single facet color: vertex 1's color, lit by the facet normal
pub fn flat_color(triangle: &Triangle, settings: &RenderSettings) -> Color {
    let base = triangle.colors()[0];
    if !settings.lighting {
        return Color::from_rgb(base);
    }
    Color::from_rgb(illuminate(base, light_intensity(triangle.normal(), settings)))
}

/// Per-vertex colors, each lit by the mean normal of the triangles around it
pub fn gouraud_colors(
    face: &Face,
    adjacency: &VertexAdjacency,
    index: usize,
    settings: &RenderSettings,
) -> [Color; 3] {
    let triangle = &face.triangles()[index];
    let colors = triangle.colors();
    let mut lit = [Color::BLACK; 3];
    for i in 0..3 {
        lit[i] = if settings.lighting {
            let normal = adjacency.vertex_normal(face, triangle.points()[i]);
            Color::from_rgb(illuminate(colors[i], light_intensity(normal, settings)))
        } else {
            Color::from_rgb(colors[i])
        };
    }
    lit
}

/// What happened during one `render_face` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    /// Triangle indices in the order they were drawn
    pub order: Vec<usize>,
    /// Zero-area triangles that were not filled
    pub skipped: usize,
}

/// Render a face to the framebuffer
///
/// `bounds` is the box recorded when the face was loaded; it drives the
/// viewport mapping. Lighting is evaluated on model-space geometry.
pub fn render_face(
    fb: &mut Framebuffer,
    face: &Face,
    adjacency: &VertexAdjacency,
    bounds: &Aabb,
    settings: &RenderSettings,
) -> RenderReport {
    let width = fb.width as f32;
    let height = fb.height as f32;
    let mut report = RenderReport::default();

    // Painter's algorithm: farthest max-Z first, nearer triangles overwrite
    for index in face.painter_order() {
        let triangle = &face.triangles()[index];
        let screen = triangle
            .points()
            .map(|p| {
                let s = scale_point(p, bounds, width, height);
                Vec2::new(s.x, s.y)
            });

        match settings.mode {
            RenderMode::Wireframe => {
                for i in 0..3 {
                    let a = screen[i];
                    let b = screen[(i + 1) % 3];
                    fb.draw_line(
                        a.x.round() as i32,
                        a.y.round() as i32,
                        b.x.round() as i32,
                        b.y.round() as i32,
                        settings.wire_color,
                    );
                }
            }
            RenderMode::Flat => {
                let color = flat_color(triangle, settings);
                match TriangleSampler::new(screen, [color; 3], &Affine2::IDENTITY) {
                    Some(sampler) => sampler.fill(fb, false),
                    None => {
                        trace!("skipping zero-area triangle {}", index);
                        report.skipped += 1;
                        continue;
                    }
                }
            }
            RenderMode::Gouraud => {
                let colors = gouraud_colors(face, adjacency, index, settings);
                match TriangleSampler::new(screen, colors, &Affine2::IDENTITY) {
                    Some(sampler) => {
                        sampler.fill(fb, settings.antialiasing);
                        if settings.antialiasing {
                            sampler.seal_edges(fb);
                        }
                    }
                    None => {
                        trace!("skipping zero-area triangle {}", index);
                        report.skipped += 1;
                        continue;
                    }
                }
            }
        }
        report.order.push(index);
    }

    report
}
