use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for computing face embeddings.
///
/// Must return exactly one embedding per region, in the same order.
pub trait FaceEncoder: Send {
    fn encode(
        &mut self,
        frame: &Frame,
        faces: &[Region],
    ) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>>;
}
