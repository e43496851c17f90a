use std::borrow::Cow;

use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of color channels every frame carries.
pub const CHANNELS: usize = 3;

/// Channel order of the pixel data.
///
/// Camera capture paths deliver BGR; the face and object models expect RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Rgb,
    #[default]
    Bgr,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}x3")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("frame has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// A single captured image: contiguous 3-channel bytes in row-major order.
///
/// The caller owns the frame; detectors only borrow it for the duration of
/// one call.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Frame {
    /// Unchecked constructor for buffers the crate sized itself. Outside
    /// callers go through [`Frame::try_new`].
    pub(crate) fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            format,
        }
    }

    /// Validating constructor for buffers coming from outside the crate.
    ///
    /// Every public path to a `Frame` runs through here, so the pixel view
    /// returned by [`Frame::as_ndarray`] always matches the dimensions.
    pub fn try_new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = (width as usize) * (height as usize) * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::new(data, width, height, format))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The frame in RGB channel order, borrowed when no conversion is needed.
    pub fn to_rgb(&self) -> Cow<'_, Frame> {
        match self.format {
            PixelFormat::Rgb => Cow::Borrowed(self),
            PixelFormat::Bgr => {
                let mut data = self.data.clone();
                for px in data.chunks_exact_mut(CHANNELS) {
                    px.swap(0, 2);
                }
                Cow::Owned(Frame::new(data, self.width, self.height, PixelFormat::Rgb))
            }
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}
