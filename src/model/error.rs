//! Errors raised while loading tables or building faces

use std::path::PathBuf;

#[derive(Debug)]
pub enum ModelError {
    /// A table file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// A row did not parse; `line` is 1-based
    Parse { path: PathBuf, line: usize, message: String },
    /// Mesh entry refers to a vertex that does not exist
    MeshIndex { entry: usize, index: u32, vertex_count: usize },
    /// A table has the wrong number of rows
    TableLength { table: String, expected: usize, found: usize },
    /// Fewer weights than reference faces, or shape/color counts differ
    WeightCount { faces: usize, shape: usize, color: usize },
    /// Reference face number outside 1..=K
    FaceOutOfRange { face: usize, count: usize },
    /// Interpolation weights do not cover every reference face
    WeightLength { expected: usize, found: usize },
    /// Interpolation weights cannot be normalized
    InvalidWeights(String),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Io { path, source } => {
                write!(f, "IO error reading {}: {}", path.display(), source)
            }
            ModelError::Parse { path, line, message } => {
                write!(f, "Parse error in {} line {}: {}", path.display(), line, message)
            }
            ModelError::MeshIndex { entry, index, vertex_count } => write!(
                f,
                "Mesh entry {} uses vertex {} but only {} vertices exist",
                entry + 1,
                index,
                vertex_count
            ),
            ModelError::TableLength { table, expected, found } => {
                write!(f, "{} has {} rows, expected {}", table, found, expected)
            }
            ModelError::WeightCount { faces, shape, color } => write!(
                f,
                "{} reference faces need as many weights (shape: {}, color: {})",
                faces, shape, color
            ),
            ModelError::FaceOutOfRange { face, count } => {
                write!(f, "Reference face {} is outside 1..={}", face, count)
            }
            ModelError::WeightLength { expected, found } => {
                write!(f, "Got {} interpolation weights, expected {}", found, expected)
            }
            ModelError::InvalidWeights(reason) => write!(f, "Invalid weights: {}", reason),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
