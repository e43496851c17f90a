use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::recognition::domain::face_locator::FaceLocator;
use crate::recognition::domain::known_face::{KnownFaces, Match};
use crate::shared::frame::Frame;
use crate::shared::math::euclidean_distance;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("face embedding has {found} dimensions, known faces have {expected}")]
    DimensionMismatch { found: usize, expected: usize },
    #[error("encoder returned {embeddings} embeddings for {faces} faces")]
    EmbeddingCount { faces: usize, embeddings: usize },
}

/// Outcome of checking a frame against one claimed voter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub voter_id: String,
    pub matched: bool,
    /// Distance from the closest face in the frame; `None` when no face was found.
    pub distance: Option<f64>,
}

/// Matches faces in a frame against the enrolled voters.
///
/// Faces are tried in detection order; the first one whose nearest known
/// embedding lies strictly within `threshold` decides the result.
pub struct FaceMatcher {
    known: Arc<KnownFaces>,
    locator: Box<dyn FaceLocator>,
    encoder: Box<dyn FaceEncoder>,
    threshold: f64,
}

impl FaceMatcher {
    pub fn new(
        known: Arc<KnownFaces>,
        locator: Box<dyn FaceLocator>,
        encoder: Box<dyn FaceEncoder>,
        threshold: f64,
    ) -> Self {
        Self {
            known,
            locator,
            encoder,
            threshold,
        }
    }

    pub fn known_faces(&self) -> &KnownFaces {
        &self.known
    }

    /// Returns the voter id of the first matching face, or `None`.
    ///
    /// With no enrolled voters nothing can match, so the models are not run.
    pub fn recognize(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<String>, Box<dyn std::error::Error>> {
        if self.known.is_empty() {
            log::debug!("No known faces loaded, skipping face matching");
            return Ok(None);
        }

        for (i, embedding) in self.embed_faces(frame)?.iter().enumerate() {
            let Some(best) = self.closest(embedding)? else {
                continue;
            };
            log::debug!(
                "Face {i}: nearest voter {} at distance {:.4}",
                best.voter_id,
                best.distance
            );
            if best.distance < self.threshold {
                return Ok(Some(best.voter_id.to_string()));
            }
        }
        Ok(None)
    }

    /// Checks whether the frame shows the voter enrolled as `voter_id`.
    ///
    /// Returns `None` when `voter_id` is not enrolled. Otherwise the closest
    /// face in the frame decides, and it matches when its distance is strictly
    /// below the threshold.
    pub fn verify(
        &mut self,
        frame: &Frame,
        voter_id: &str,
    ) -> Result<Option<Verification>, Box<dyn std::error::Error>> {
        let known = Arc::clone(&self.known);
        let Some(claimed) = known.find(voter_id) else {
            log::debug!("Voter {voter_id} is not enrolled");
            return Ok(None);
        };

        let mut distance: Option<f64> = None;
        for embedding in self.embed_faces(frame)? {
            self.check_dimension(&embedding)?;
            let d = euclidean_distance(&embedding, &claimed.embedding);
            if distance.map_or(true, |best| d < best) {
                distance = Some(d);
            }
        }
        let matched = distance.is_some_and(|d| d < self.threshold);
        log::debug!("Verified {voter_id}: matched={matched}, distance={distance:?}");

        Ok(Some(Verification {
            voter_id: claimed.voter_id.clone(),
            matched,
            distance,
        }))
    }

    /// Nearest enrolled voter to `embedding`, regardless of threshold.
    pub fn closest(&self, embedding: &[f32]) -> Result<Option<Match<'_>>, MatchError> {
        self.check_dimension(embedding)?;
        Ok(self.known.nearest(embedding))
    }

    /// One embedding per located face, in detection order.
    fn embed_faces(&mut self, frame: &Frame) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>> {
        let rgb = frame.to_rgb();
        let faces = self.locator.locate(&rgb)?;
        log::debug!("Located {} face(s)", faces.len());
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.encoder.encode(&rgb, &faces)?;
        if embeddings.len() != faces.len() {
            return Err(MatchError::EmbeddingCount {
                faces: faces.len(),
                embeddings: embeddings.len(),
            }
            .into());
        }
        Ok(embeddings)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), MatchError> {
        match self.known.dimension() {
            Some(expected) if embedding.len() != expected => Err(MatchError::DimensionMismatch {
                found: embedding.len(),
                expected,
            }),
            _ => Ok(()),
        }
    }
}
