use std::path::Path;
use std::time::Instant;

use crate::imaging::domain::frame_reader::FrameReader;
use crate::recognition::domain::face_matcher::{FaceMatcher, Verification};

/// Single-image 1:1 check of a claimed voter identity.
pub struct VerifyVoterUseCase {
    reader: Box<dyn FrameReader>,
    matcher: FaceMatcher,
}

impl VerifyVoterUseCase {
    pub fn new(reader: Box<dyn FrameReader>, matcher: FaceMatcher) -> Self {
        Self { reader, matcher }
    }

    /// `None` when `voter_id` has no enrolled embedding.
    pub fn execute(
        &mut self,
        input_path: &Path,
        voter_id: &str,
    ) -> Result<Option<Verification>, Box<dyn std::error::Error>> {
        let frame = self.reader.read(input_path)?;

        let start = Instant::now();
        let verification = self.matcher.verify(&frame, voter_id)?;
        log::debug!(
            "Verification took {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(verification)
    }
}
