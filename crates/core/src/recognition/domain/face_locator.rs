use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for finding faces in a frame.
///
/// Receives RGB frames only. Returns regions in detection order, which is
/// the order the matcher tries them in.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
