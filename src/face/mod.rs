//! Face module - colored triangle meshes
//!
//! - `Triangle`: three points, three RGB colors, cached depth key
//! - `Face`: triangles in mesh order, plus bounds and rotation
//! - `VertexAdjacency`: which triangles touch each point

mod adjacency;
mod geometry;

pub use adjacency::*;
pub use geometry::*;
