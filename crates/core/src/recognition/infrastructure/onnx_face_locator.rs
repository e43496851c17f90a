/// YOLO face locator using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference and NMS. Landmark columns that
/// pose-style face models append after the confidence are ignored.
use std::path::Path;

use crate::recognition::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;
use crate::shared::math::nms_indices;
use crate::shared::onnx_session;
use crate::shared::region::Region;
use crate::shared::yolo::{letterbox, Letterbox, YoloRows, DEFAULT_INPUT_SIZE};

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.45;

/// Columns before any landmark data: cx, cy, w, h, conf.
const BOX_FEATURES: usize = 5;

pub struct OnnxFaceLocator {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxFaceLocator {
    /// Load a YOLO face model.
    ///
    /// The input resolution is read from the model's NCHW input shape,
    /// falling back to 640 when the shape is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = onnx_session::load_session(model_path)?;
        let input_size = onnx_session::input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!("Face model input size: {input_size}");
        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceLocator for OnnxFaceLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let mut lb = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(std::mem::take(&mut lb.tensor))?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let rows = YoloRows::new(data, &shape)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        Ok(decode_faces(
            &rows,
            &lb,
            self.confidence,
            frame.width(),
            frame.height(),
        ))
    }
}

/// Threshold, unmap and NMS the raw rows. Output is ordered by descending
/// confidence; empty regions (fully off-frame) are dropped.
fn decode_faces(
    rows: &YoloRows<'_>,
    lb: &Letterbox,
    confidence: f64,
    frame_width: u32,
    frame_height: u32,
) -> Vec<Region> {
    if rows.num_features() < BOX_FEATURES {
        return Vec::new();
    }

    let mut candidates: Vec<([f64; 4], f64)> = Vec::new();
    for i in 0..rows.len() {
        let conf = rows.get(i, 4) as f64;
        if conf < confidence {
            continue;
        }
        let cx = rows.get(i, 0) as f64;
        let cy = rows.get(i, 1) as f64;
        let w = rows.get(i, 2) as f64;
        let h = rows.get(i, 3) as f64;
        let (x1, y1) = lb.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = lb.unmap(cx + w / 2.0, cy + h / 2.0);
        candidates.push(([x1, y1, x2, y2], conf));
    }

    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    let boxes: Vec<[f64; 4]> = candidates.iter().map(|(b, _)| *b).collect();

    nms_indices(&boxes, NMS_IOU_THRESH, |_, _| true)
        .into_iter()
        .map(|i| {
            let ([x1, y1, x2, y2], score) = candidates[i];
            Region::from_corners(x1, y1, x2, y2, score, frame_width, frame_height)
        })
        .filter(|r| !r.is_empty())
        .collect()
}
