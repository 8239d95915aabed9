//! Data-directory tables
//!
//! Layout of a data directory:
//! - `mesh.csv`: one triangle per line, three 1-based vertex indices
//! - `sh_000.csv` / `tx_000.csv`: average shape (x,y,z) and color (r,g,b)
//! - `sh_NNN.csv` / `tx_NNN.csv`: offsets for reference face NNN
//! - `sh_ev.csv` / `tx_ev.csv`: one weight per line, line n for face n

use std::fs;
use std::path::{Path, PathBuf};
use log::debug;
use crate::rasterizer::Vec3;
use super::error::ModelError;
use super::reference::{MeshEntry, ModelTables, OffsetSource};

/// File name for a reference table, `sh_007.csv` style
pub fn table_name(prefix: &str, index: usize) -> String {
    format!("{}_{:03}.csv", prefix, index)
}

/// Non-blank lines with their 1-based line numbers
fn rows(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

fn parse_field(field: &str, path: &Path, line: usize) -> Result<f32, ModelError> {
    let field = field.trim();
    let value: f32 = field.parse().map_err(|_| ModelError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("'{}' is not a number", field),
    })?;
    if !value.is_finite() {
        return Err(ModelError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("'{}' is not finite", field),
        });
    }
    Ok(value)
}

fn parse_row3(row: &str, path: &Path, line: usize) -> Result<[f32; 3], ModelError> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() != 3 {
        return Err(ModelError::Parse {
            path: path.to_path_buf(),
            line,
            message: format!("expected 3 fields, found {}", fields.len()),
        });
    }
    Ok([
        parse_field(fields[0], path, line)?,
        parse_field(fields[1], path, line)?,
        parse_field(fields[2], path, line)?,
    ])
}

/// Parse a table of x,y,z (or r,g,b) rows
pub fn parse_triples(text: &str, path: &Path) -> Result<Vec<Vec3>, ModelError> {
    rows(text)
        .map(|(line, row)| {
            let [x, y, z] = parse_row3(row, path, line)?;
            Ok(Vec3::new(x, y, z))
        })
        .collect()
}

/// Parse a table with one number per row
pub fn parse_scalars(text: &str, path: &Path) -> Result<Vec<f32>, ModelError> {
    rows(text)
        .map(|(line, row)| parse_field(row, path, line))
        .collect()
}

/// Parse mesh rows; indices may be written as floats but must be whole and >= 1
pub fn parse_mesh(text: &str, path: &Path) -> Result<Vec<MeshEntry>, ModelError> {
    rows(text)
        .map(|(line, row)| {
            let values = parse_row3(row, path, line)?;
            let mut idx = [0u32; 3];
            for (slot, v) in idx.iter_mut().zip(values) {
                if v < 1.0 || v.fract() != 0.0 || v > u32::MAX as f32 {
                    return Err(ModelError::Parse {
                        path: path.to_path_buf(),
                        line,
                        message: format!("{} is not a valid 1-based vertex index", v),
                    });
                }
                *slot = v as u32;
            }
            Ok(MeshEntry(idx[0], idx[1], idx[2]))
        })
        .collect()
}

fn read(path: &Path) -> Result<String, ModelError> {
    fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// A directory of face tables on disk
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn triples(&self, name: &str) -> Result<Vec<Vec3>, ModelError> {
        let path = self.file(name);
        parse_triples(&read(&path)?, &path)
    }

    fn scalars(&self, name: &str) -> Result<Vec<f32>, ModelError> {
        let path = self.file(name);
        parse_scalars(&read(&path)?, &path)
    }

    /// Load every table needed up front (mesh, averages, weights)
    pub fn load_tables(&self) -> Result<ModelTables, ModelError> {
        let mesh_path = self.file("mesh.csv");
        let mesh = parse_mesh(&read(&mesh_path)?, &mesh_path)?;
        let tables = ModelTables {
            mesh,
            average_shape: self.triples(&table_name("sh", 0))?,
            average_color: self.triples(&table_name("tx", 0))?,
            shape_weights: self.scalars("sh_ev.csv")?,
            color_weights: self.scalars("tx_ev.csv")?,
        };
        debug!(
            "Loaded {}: {} triangles, {} vertices, {} weights",
            self.root.display(),
            tables.mesh.len(),
            tables.average_shape.len(),
            tables.shape_weights.len()
        );
        Ok(tables)
    }
}

impl OffsetSource for DataDir {
    fn shape_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError> {
        self.triples(&table_name("sh", face_num))
    }

    fn color_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError> {
        self.triples(&table_name("tx", face_num))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("test.csv")
    }

    #[test]
    fn test_table_names_are_zero_padded() {
        assert_eq!(table_name("sh", 0), "sh_000.csv");
        assert_eq!(table_name("tx", 7), "tx_007.csv");
        assert_eq!(table_name("sh", 199), "sh_199.csv");
    }

    #[test]
    fn test_triples_trim_and_skip_blank_lines() {
        let table = parse_triples("1, 2 ,3\n\n  -4.5,0,1e2\r\n", &path()).unwrap();
        assert_eq!(table, vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(-4.5, 0.0, 100.0)]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_triples("1,2,3\n\n4,x,6\n", &path()).unwrap_err();
        match err {
            ModelError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {:?}", other),
        }
        let err = parse_triples("1,2\n", &path()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_mesh_accepts_float_indices() {
        let mesh = parse_mesh("1,2,3\n4.0,5.0,6.0\n", &path()).unwrap();
        assert_eq!(mesh, vec![MeshEntry(1, 2, 3), MeshEntry(4, 5, 6)]);
    }

    #[test]
    fn test_mesh_rejects_zero_and_fractional_indices() {
        assert!(parse_mesh("0,1,2\n", &path()).is_err());
        assert!(parse_mesh("1,2.5,3\n", &path()).is_err());
        assert!(parse_mesh("1,-2,3\n", &path()).is_err());
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_scalars("0.5\n 2 \n", &path()).unwrap(), vec![0.5, 2.0]);
        assert!(parse_scalars("nan\n", &path()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = DataDir::new("/nonexistent/face-data");
        match dir.load_tables() {
            Err(ModelError::Io { path, .. }) => assert!(path.ends_with("mesh.csv")),
            other => panic!("unexpected result {:?}", other.map(|_| ())),
        }
    }
}
