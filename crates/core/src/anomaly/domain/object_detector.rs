use crate::shared::frame::Frame;

/// One detected object instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f64,
    /// `[x1, y1, x2, y2]` in frame pixels.
    pub bbox: [f64; 4],
}

/// Domain interface for object detection.
///
/// Receives RGB frames only. Detections come back in detection order;
/// the caller applies its own confidence threshold on top.
pub trait ObjectDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
