//! Core types for the rasterizer

use serde::{Serialize, Deserialize};
use super::math::Vec3;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const DARK_GRAY: Color = Color { r: 64, g: 64, b: 64, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from an RGB triple, clamped into 0-255 and truncated
    pub fn from_rgb(rgb: Vec3) -> Self {
        let c = rgb.clamp(0.0, 255.0);
        Self::new(c.x as u8, c.y as u8, c.z as u8)
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Scale the alpha channel by `m` (0.0-1.0), leaving RGB alone
    pub fn scale_alpha(self, m: f32) -> Self {
        let a = (self.a as f32 / 255.0 * m * 255.0) as u32 & 0xff;
        Self { a: a as u8, ..self }
    }

    /// Composite `self` over `dst` (straight alpha, source-over)
    pub fn over(self, dst: Color) -> Color {
        match self.a {
            255 => self,
            0 => dst,
            _ => {
                let sa = self.a as f32 / 255.0;
                let da = dst.a as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                let mix = |s: u8, d: u8| {
                    ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a).round() as u8
                };
                Color {
                    r: mix(self.r, dst.r),
                    g: mix(self.g, dst.g),
                    b: mix(self.b, dst.b),
                    a: (out_a * 255.0).round() as u8,
                }
            }
        }
    }
}

/// Mix colors channel by channel with the given weights
///
/// Weights are renormalized to sum to one. Each of A, R, G, B is blended
/// independently and rounded back to 8 bits.
pub fn mix_colors(colors: &[Color], weights: &[f32]) -> Color {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return Color::TRANSPARENT;
    }
    let normalize = 1.0 / total;
    let mut acc = [0.0f32; 4];
    for (c, w) in colors.iter().zip(weights) {
        acc[0] += c.a as f32 * w;
        acc[1] += c.r as f32 * w;
        acc[2] += c.g as f32 * w;
        acc[3] += c.b as f32 * w;
    }
    Color {
        a: (acc[0] * normalize).round() as u8,
        r: (acc[1] * normalize).round() as u8,
        g: (acc[2] * normalize).round() as u8,
        b: (acc[3] * normalize).round() as u8,
    }
}

/// How faces are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// One light calculation per facet, vertex-1 color fills the triangle
    #[default]
    Flat,
    /// Light per vertex, colors interpolated across the triangle
    Gouraud,
    /// Edges only, no fill
    Wireframe,
}

impl RenderMode {
    pub fn label(&self) -> &'static str {
        match self {
            RenderMode::Flat => "Flat",
            RenderMode::Gouraud => "Interpolated",
            RenderMode::Wireframe => "Wireframe",
        }
    }
}

/// Rasterizer settings, passed explicitly into every render call
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Shading mode
    pub mode: RenderMode,
    /// Apply the directional light (false = colors used as-is)
    pub lighting: bool,
    /// 4x multisampling for interpolated fills
    pub antialiasing: bool,
    /// Light direction (for shading)
    pub light_dir: Vec3,
    /// Intensity of the incoming light
    pub light_intensity: f32,
    /// Diffuse reflection coefficient of the surface
    pub diffuse: f32,
    /// Edge color in wireframe mode
    pub wire_color: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::Flat,
            lighting: true,
            antialiasing: true,
            light_dir: Vec3::TOWARDS_VIEWER,
            light_intensity: 1.2,
            diffuse: 1.0,
            wire_color: Color::DARK_GRAY,
        }
    }
}
