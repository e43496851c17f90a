//! Pre- and post-processing shared by the YOLO-family ONNX models.

use crate::shared::frame::Frame;

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// A frame letterboxed into a square NCHW float tensor.
pub struct Letterbox {
    pub tensor: ndarray::Array4<f32>,
    pub scale: f64,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl Letterbox {
    /// Map a point from letterbox coordinates back to the source frame.
    pub fn unmap(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// Letterbox-resize an RGB frame to `target_size` × `target_size`.
pub fn letterbox(frame: &Frame, target_size: u32) -> Letterbox {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padding is 114/255 gray, the YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    Letterbox {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

/// Row-wise view over a YOLO output tensor.
///
/// Exports come as `[1, features, anchors]` (Ultralytics default) or
/// `[1, anchors, features]`; the smaller of the two trailing axes is taken
/// to be the feature axis.
pub struct YoloRows<'a> {
    data: &'a [f32],
    num_rows: usize,
    num_feats: usize,
    transposed: bool,
}

impl<'a> YoloRows<'a> {
    pub fn new(data: &'a [f32], shape: &[usize]) -> Result<Self, Box<dyn std::error::Error>> {
        if shape.len() != 3 || shape[0] != 1 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }
        let transposed = shape[1] < shape[2];
        let (num_rows, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if data.len() != num_rows * num_feats {
            return Err(format!(
                "YOLO output holds {} values, shape {shape:?} needs {}",
                data.len(),
                num_rows * num_feats
            )
            .into());
        }
        Ok(Self {
            data,
            num_rows,
            num_feats,
            transposed,
        })
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn num_features(&self) -> usize {
        self.num_feats
    }

    /// Feature `f` of row `i`.
    pub fn get(&self, i: usize, f: usize) -> f32 {
        if self.transposed {
            self.data[f * self.num_rows + i]
        } else {
            self.data[i * self.num_feats + f]
        }
    }
}
