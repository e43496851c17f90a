use std::path::Path;

use crate::shared::frame::Frame;

/// Loads a still image into a [`Frame`].
///
/// Implementations handle decoding; the use cases only see frames.
pub trait FrameReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
