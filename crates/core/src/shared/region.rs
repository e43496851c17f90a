/// A face bounding box in frame pixel coordinates.
///
/// Always clamped to the frame it was detected in.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f64,
}

impl Region {
    /// Builds a region from corner coordinates, clamping to the frame bounds.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        score: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.clamp(0.0, fw).round() as i32;
        let top = y1.clamp(0.0, fh).round() as i32;
        let right = x2.clamp(0.0, fw).round() as i32;
        let bottom = y2.clamp(0.0, fh).round() as i32;
        Self {
            x: left,
            y: top,
            width: (right - left).max(0),
            height: (bottom - top).max(0),
            score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}
