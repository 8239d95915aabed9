//! Morphable face model
//!
//! Reference face n (1-based) is the average face plus that face's offsets
//! scaled by its weight:
//!
//! vertex = average[i] + offset_n[i] * weight[n - 1]
//!
//! for both shape and color. An interpolated face is a weighted sum of the
//! reference faces, accumulated triangle slot by triangle slot.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use log::{debug, info};
use crate::face::{Face, Triangle};
use crate::rasterizer::Vec3;
use super::error::ModelError;
use super::loader::{table_name, DataDir};

/// Three 1-based vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshEntry(pub u32, pub u32, pub u32);

impl MeshEntry {
    /// Indices as 0-based `usize`, ready for table lookups
    pub fn zero_based(&self) -> [usize; 3] {
        [self.0, self.1, self.2].map(|i| i as usize - 1)
    }

    fn indices(&self) -> [u32; 3] {
        [self.0, self.1, self.2]
    }
}

/// Where per-face offset tables come from
///
/// Tables are requested by 1-based reference face number each time a face
/// is built.
pub trait OffsetSource {
    fn shape_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError>;
    fn color_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError>;
}

/// Offset tables held in memory; entry 0 belongs to face 1
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct InMemoryOffsets {
    pub shape: Vec<Vec<Vec3>>,
    pub color: Vec<Vec<Vec3>>,
}

#[cfg(test)]
impl InMemoryOffsets {
    fn lookup(tables: &[Vec<Vec3>], face_num: usize) -> Result<Vec<Vec3>, ModelError> {
        face_num
            .checked_sub(1)
            .and_then(|i| tables.get(i))
            .cloned()
            .ok_or(ModelError::FaceOutOfRange { face: face_num, count: tables.len() })
    }
}

#[cfg(test)]
impl OffsetSource for InMemoryOffsets {
    fn shape_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError> {
        Self::lookup(&self.shape, face_num)
    }

    fn color_offsets(&self, face_num: usize) -> Result<Vec<Vec3>, ModelError> {
        Self::lookup(&self.color, face_num)
    }
}

/// Tables loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct ModelTables {
    pub mesh: Vec<MeshEntry>,
    pub average_shape: Vec<Vec3>,
    pub average_color: Vec<Vec3>,
    pub shape_weights: Vec<f32>,
    pub color_weights: Vec<f32>,
}

/// Offsets for one reference face
#[derive(Debug)]
struct Offsets {
    shape: Vec<Vec3>,
    color: Vec<Vec3>,
}

/// Interpolation weights, normalized to sum to 1
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationWeights(Vec<f32>);

impl InterpolationWeights {
    /// Normalize `raw` by its sum
    ///
    /// Rejects empty input, negative or non-finite values, and all zeros.
    pub fn normalized(raw: Vec<f32>) -> Result<Self, ModelError> {
        if raw.is_empty() {
            return Err(ModelError::InvalidWeights("no weights".to_string()));
        }
        if let Some(bad) = raw.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(ModelError::InvalidWeights(format!("{} is not a non-negative number", bad)));
        }
        let sum: f32 = raw.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return Err(ModelError::InvalidWeights("weights sum to zero".to_string()));
        }
        Ok(Self(raw.into_iter().map(|w| w / sum).collect()))
    }

    /// 1.0 at `index`, 0 elsewhere
    pub fn one_hot(len: usize, index: usize) -> Result<Self, ModelError> {
        let mut raw = vec![0.0; len];
        match raw.get_mut(index) {
            Some(w) => *w = 1.0,
            None => return Err(ModelError::FaceOutOfRange { face: index + 1, count: len }),
        }
        Self::normalized(raw)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The morphable model: average face, mesh, weights and offset tables
pub struct ReferenceModel {
    tables: ModelTables,
    face_count: usize,
    source: Box<dyn OffsetSource>,
    cache: Option<RefCell<HashMap<usize, Rc<Offsets>>>>,
}

impl ReferenceModel {
    /// Validate the tables against each other and `face_count`
    pub fn new(
        tables: ModelTables,
        face_count: usize,
        source: Box<dyn OffsetSource>,
    ) -> Result<Self, ModelError> {
        let vertex_count = tables.average_shape.len();

        if tables.average_color.len() != vertex_count {
            return Err(ModelError::TableLength {
                table: table_name("tx", 0),
                expected: vertex_count,
                found: tables.average_color.len(),
            });
        }

        let (shape, color) = (tables.shape_weights.len(), tables.color_weights.len());
        if face_count == 0 || shape != color || shape < face_count {
            return Err(ModelError::WeightCount { faces: face_count, shape, color });
        }

        for (entry, m) in tables.mesh.iter().enumerate() {
            for index in m.indices() {
                if index == 0 || index as usize > vertex_count {
                    return Err(ModelError::MeshIndex { entry, index, vertex_count });
                }
            }
        }

        Ok(Self {
            tables,
            face_count,
            source,
            cache: None,
        })
    }

    /// Load a model from a data directory
    pub fn load(data_dir: &DataDir, face_count: usize) -> Result<Self, ModelError> {
        let tables = data_dir.load_tables()?;
        let model = Self::new(tables, face_count, Box::new(data_dir.clone()))?;
        info!(
            "Model ready: {} reference faces, {} triangles",
            face_count,
            model.triangle_count()
        );
        Ok(model)
    }

    /// Keep offset tables in memory after first use
    pub fn with_offset_cache(mut self) -> Self {
        self.cache = Some(RefCell::new(HashMap::new()));
        self
    }

    /// Number of reference faces (K)
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    pub fn triangle_count(&self) -> usize {
        self.tables.mesh.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.tables.average_shape.len()
    }

    /// Fetch and check the offset tables for one face
    fn offsets(&self, face_num: usize) -> Result<Rc<Offsets>, ModelError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.borrow().get(&face_num) {
                return Ok(Rc::clone(hit));
            }
        }

        let expected = self.vertex_count();
        let shape = self.source.shape_offsets(face_num)?;
        if shape.len() != expected {
            return Err(ModelError::TableLength {
                table: table_name("sh", face_num),
                expected,
                found: shape.len(),
            });
        }
        let color = self.source.color_offsets(face_num)?;
        if color.len() != expected {
            return Err(ModelError::TableLength {
                table: table_name("tx", face_num),
                expected,
                found: color.len(),
            });
        }

        let offsets = Rc::new(Offsets { shape, color });
        if let Some(cache) = &self.cache {
            cache.borrow_mut().insert(face_num, Rc::clone(&offsets));
        }
        Ok(offsets)
    }

    /// Build reference face `face_num` (1-based)
    pub fn reconstruct_reference_face(&self, face_num: usize) -> Result<Face, ModelError> {
        if face_num == 0 || face_num > self.face_count {
            return Err(ModelError::FaceOutOfRange { face: face_num, count: self.face_count });
        }

        let offsets = self.offsets(face_num)?;
        let shape_w = self.tables.shape_weights[face_num - 1];
        let color_w = self.tables.color_weights[face_num - 1];
        let t = &self.tables;

        let triangles = t
            .mesh
            .iter()
            .map(|entry| {
                let idx = entry.zero_based();
                let points = idx.map(|i| t.average_shape[i] + offsets.shape[i] * shape_w);
                let colors = idx.map(|i| t.average_color[i] + offsets.color[i] * color_w);
                Triangle::new(points, colors)
            })
            .collect();

        Ok(Face::new(triangles))
    }

    /// Weighted sum of every reference face
    pub fn interpolate(&self, weights: &InterpolationWeights) -> Result<Face, ModelError> {
        if weights.len() != self.face_count {
            return Err(ModelError::WeightLength {
                expected: self.face_count,
                found: weights.len(),
            });
        }

        let mut blended = Face::default();
        for (k, &w) in weights.as_slice().iter().enumerate() {
            debug!("Blending reference face {} with weight {:.4}", k + 1, w);
            let part = self.reconstruct_reference_face(k + 1)?.scaled(w);
            // First face seeds the slots, the rest add in place
            if k == 0 {
                blended = part;
            } else {
                blended.accumulate(&part);
            }
        }
        Ok(blended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn v(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    /// Four vertices, two triangles, three reference faces
    fn small_model() -> ReferenceModel {
        let tables = ModelTables {
            mesh: vec![MeshEntry(1, 2, 3), MeshEntry(2, 4, 3)],
            average_shape: vec![v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 1.0)],
            average_color: vec![v(100.0, 100.0, 100.0); 4],
            shape_weights: vec![2.0, 0.5, -1.0],
            color_weights: vec![1.0, 10.0, 0.0],
        };
        let offsets = InMemoryOffsets {
            shape: (1..=3).map(|k| vec![v(k as f32, 0.0, 0.0); 4]).collect(),
            color: (1..=3).map(|k| vec![v(0.0, k as f32, 0.0); 4]).collect(),
        };
        ReferenceModel::new(tables, 3, Box::new(offsets)).unwrap()
    }

    #[test]
    fn test_reconstruction_is_average_plus_weighted_offset() {
        let model = small_model();
        let face = model.reconstruct_reference_face(2).unwrap();
        assert_eq!(face.len(), 2);

        // Face 2: offset (2,0,0) scaled by 0.5; color offset (0,2,0) scaled by 10
        let t = &face.triangles()[1];
        assert_eq!(t.points()[0], v(1.0 + 2.0 * 0.5, 0.0, 0.0));
        assert_eq!(t.points()[1], v(1.0 + 2.0 * 0.5, 1.0, 1.0));
        assert_eq!(t.colors()[2], v(100.0, 100.0 + 2.0 * 10.0, 100.0));
    }

    #[test]
    fn test_face_number_is_one_based() {
        let model = small_model();
        assert!(matches!(
            model.reconstruct_reference_face(0),
            Err(ModelError::FaceOutOfRange { face: 0, count: 3 })
        ));
        assert!(model.reconstruct_reference_face(4).is_err());
        assert!(model.reconstruct_reference_face(3).is_ok());
    }

    #[test]
    fn test_weights_normalize_to_one() {
        let w = InterpolationWeights::normalized(vec![1.0, 3.0, 4.0]).unwrap();
        let sum: f32 = w.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert_eq!(w.as_slice()[0], 0.125);
    }

    #[test]
    fn test_bad_weights_are_rejected() {
        assert!(InterpolationWeights::normalized(vec![]).is_err());
        assert!(InterpolationWeights::normalized(vec![0.0, 0.0]).is_err());
        assert!(InterpolationWeights::normalized(vec![1.0, -0.5]).is_err());
        assert!(InterpolationWeights::normalized(vec![1.0, f32::NAN]).is_err());
        assert!(InterpolationWeights::one_hot(3, 3).is_err());
    }

    #[test]
    fn test_one_hot_interpolation_matches_reference() {
        let model = small_model();
        for k in 0..3 {
            let weights = InterpolationWeights::one_hot(3, k).unwrap();
            let blended = model.interpolate(&weights).unwrap();
            let reference = model.reconstruct_reference_face(k + 1).unwrap();
            assert_eq!(blended, reference);
            for (a, b) in blended.triangles().iter().zip(reference.triangles()) {
                assert_eq!(a.colors(), b.colors());
            }
        }
    }

    #[test]
    fn test_interpolation_is_linear_blend() {
        let model = small_model();
        let weights = InterpolationWeights::normalized(vec![1.0, 1.0, 0.0]).unwrap();
        let blended = model.interpolate(&weights).unwrap();
        let f1 = model.reconstruct_reference_face(1).unwrap();
        let f2 = model.reconstruct_reference_face(2).unwrap();
        let p = blended.triangles()[0].points()[0];
        let expected = f1.triangles()[0].points()[0] * 0.5 + f2.triangles()[0].points()[0] * 0.5;
        assert!((p - expected).len() < 1e-5);
    }

    #[test]
    fn test_wrong_weight_length_is_rejected() {
        let model = small_model();
        let weights = InterpolationWeights::normalized(vec![1.0, 1.0]).unwrap();
        assert!(matches!(
            model.interpolate(&weights),
            Err(ModelError::WeightLength { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_degenerate_single_vertex_model_returns_average() {
        let tables = ModelTables {
            mesh: vec![MeshEntry(1, 1, 1)],
            average_shape: vec![Vec3::ZERO],
            average_color: vec![v(10.0, 20.0, 30.0)],
            shape_weights: vec![1.0; 3],
            color_weights: vec![1.0; 3],
        };
        let offsets = InMemoryOffsets {
            shape: vec![vec![Vec3::ZERO]; 3],
            color: vec![vec![Vec3::ZERO]; 3],
        };
        let model = ReferenceModel::new(tables, 3, Box::new(offsets)).unwrap();
        let weights = InterpolationWeights::normalized(vec![1.0, 0.0, 0.0]).unwrap();
        let face = model.interpolate(&weights).unwrap();

        assert_eq!(face.len(), 1);
        let t = &face.triangles()[0];
        assert_eq!(t.points(), &[Vec3::ZERO; 3]);
        assert_eq!(t.colors(), &[v(10.0, 20.0, 30.0); 3]);
    }

    #[test]
    fn test_construction_validates_tables() {
        let base = || ModelTables {
            mesh: vec![MeshEntry(1, 2, 2)],
            average_shape: vec![Vec3::ZERO; 2],
            average_color: vec![Vec3::ZERO; 2],
            shape_weights: vec![1.0; 3],
            color_weights: vec![1.0; 3],
        };
        let src = || Box::new(InMemoryOffsets::default());

        assert!(ReferenceModel::new(base(), 3, src()).is_ok());

        let mut t = base();
        t.mesh = vec![MeshEntry(1, 2, 3)];
        assert!(matches!(
            ReferenceModel::new(t, 3, src()),
            Err(ModelError::MeshIndex { index: 3, vertex_count: 2, .. })
        ));

        let mut t = base();
        t.average_color.pop();
        assert!(matches!(ReferenceModel::new(t, 3, src()), Err(ModelError::TableLength { .. })));

        let mut t = base();
        t.color_weights.pop();
        assert!(matches!(ReferenceModel::new(t, 3, src()), Err(ModelError::WeightCount { .. })));

        assert!(matches!(ReferenceModel::new(base(), 4, src()), Err(ModelError::WeightCount { .. })));
    }

    #[test]
    fn test_short_offset_table_is_reported() {
        let tables = ModelTables {
            mesh: vec![MeshEntry(1, 2, 2)],
            average_shape: vec![Vec3::ZERO; 2],
            average_color: vec![Vec3::ZERO; 2],
            shape_weights: vec![1.0; 3],
            color_weights: vec![1.0; 3],
        };
        let offsets = InMemoryOffsets {
            shape: vec![vec![Vec3::ZERO; 2], vec![Vec3::ZERO; 1], vec![Vec3::ZERO; 2]],
            color: vec![vec![Vec3::ZERO; 2]; 3],
        };
        let model = ReferenceModel::new(tables, 3, Box::new(offsets)).unwrap();
        match model.reconstruct_reference_face(2) {
            Err(ModelError::TableLength { table, expected, found }) => {
                assert_eq!(table, "sh_002.csv");
                assert_eq!((expected, found), (2, 1));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_offset_cache_returns_same_face() {
        let model = small_model().with_offset_cache();
        let first = model.reconstruct_reference_face(1).unwrap();
        let second = model.reconstruct_reference_face(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(model.cache.as_ref().map(|c| c.borrow().len()), Some(1));
    }
}
