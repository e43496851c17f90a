use std::path::Path;

use crate::imaging::domain::frame_reader::FrameReader;
use crate::shared::frame::{Frame, PixelFormat};

/// Decodes image files (JPEG, PNG, ...) into RGB frames with the `image` crate.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let img = image::open(path)?.into_rgb8();
        let (width, height) = img.dimensions();
        log::debug!("Decoded {} ({width}x{height})", path.display());
        Ok(Frame::try_new(
            img.into_raw(),
            width,
            height,
            PixelFormat::Rgb,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_png_as_rgb_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        let img = image::RgbImage::from_fn(4, 3, |x, _| image::Rgb([x as u8 * 10, 100, 200]));
        img.save(&path).unwrap();

        let frame = ImageFileReader::new().read(&path).unwrap();

        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.format(), PixelFormat::Rgb);
        assert_eq!(&frame.data()[3..6], &[10, 100, 200]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageFileReader::new()
            .read(&dir.path().join("absent.png"))
            .is_err());
    }

    #[test]
    fn test_non_image_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(ImageFileReader::new().read(&path).is_err());
    }
}
