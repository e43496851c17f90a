use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::math::euclidean_distance;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KnownFacesError {
    #[error("entry {index} ({voter_id}) has {found} dimensions, expected {expected}")]
    Dimension {
        index: usize,
        voter_id: String,
        found: usize,
        expected: usize,
    },
}

/// One enrolled voter: a reference face embedding and the voter's identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownFace {
    pub voter_id: String,
    pub embedding: Vec<f32>,
}

/// The nearest known face to a probe embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct Match<'a> {
    pub voter_id: &'a str,
    pub distance: f64,
}

/// Immutable set of enrolled faces sharing one embedding dimension.
///
/// Built once at startup and shared read-only (typically behind an `Arc`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnownFaces {
    faces: Vec<KnownFace>,
    dimension: Option<usize>,
}

impl KnownFaces {
    /// Rejects the first entry whose embedding is empty or differs in length
    /// from the first entry's.
    pub fn new(faces: Vec<KnownFace>) -> Result<Self, KnownFacesError> {
        let dimension = faces.first().map(|f| f.embedding.len());
        if let Some(dim) = dimension {
            for (index, face) in faces.iter().enumerate() {
                if face.embedding.is_empty() || face.embedding.len() != dim {
                    return Err(KnownFacesError::Dimension {
                        index,
                        voter_id: face.voter_id.clone(),
                        found: face.embedding.len(),
                        expected: dim,
                    });
                }
            }
        }
        Ok(Self { faces, dimension })
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Embedding length shared by every entry; `None` when empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnownFace> {
        self.faces.iter()
    }

    /// First enrolled entry for `voter_id`.
    pub fn find(&self, voter_id: &str) -> Option<&KnownFace> {
        self.faces.iter().find(|f| f.voter_id == voter_id)
    }

    /// Nearest entry by Euclidean distance. The earliest entry wins ties.
    ///
    /// Callers must check the probe's dimension first.
    pub fn nearest(&self, embedding: &[f32]) -> Option<Match<'_>> {
        let mut best: Option<Match<'_>> = None;
        for face in &self.faces {
            let distance = euclidean_distance(embedding, &face.embedding);
            if best.as_ref().map_or(true, |b| distance < b.distance) {
                best = Some(Match {
                    voter_id: &face.voter_id,
                    distance,
                });
            }
        }
        best
    }
}
