//! Software rasterizer for face meshes
//!
//! Features:
//! - Orthographic viewport mapping (no perspective)
//! - Flat, Gouraud and wireframe modes
//! - Painter's algorithm (no Z-buffer)
//! - Barycentric color interpolation with optional 4x MSAA

mod math;
mod types;
mod interp;
mod render;

pub use math::*;
pub use types::*;
pub use render::*;

/// Default face viewport size
pub const WIDTH: usize = 600;
pub const HEIGHT: usize = 600;
