/// Ultralytics YOLO object detector using ONNX Runtime via `ort`.
///
/// Expects the standard detection export: one output of
/// `[1, 4 + num_classes, num_anchors]` holding `cx, cy, w, h` followed by
/// per-class scores.
use std::path::Path;

use crate::anomaly::domain::object_detector::{Detection, ObjectDetector};
use crate::shared::frame::Frame;
use crate::shared::math::nms_indices;
use crate::shared::onnx_session;
use crate::shared::yolo::{letterbox, Letterbox, YoloRows, DEFAULT_INPUT_SIZE};

/// Class-aware NMS IoU threshold (Ultralytics predict default).
const NMS_IOU_THRESH: f64 = 0.7;

/// Upper bound on detections kept per frame.
const MAX_DETECTIONS: usize = 300;

const BOX_FEATURES: usize = 4;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    min_confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO detection model.
    ///
    /// `min_confidence` prunes candidates before NMS; the anomaly detector
    /// applies its own threshold on the result.
    pub fn new(model_path: &Path, min_confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = onnx_session::load_session(model_path)?;
        let input_size = onnx_session::input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!("Detection model input size: {input_size}");
        Ok(Self {
            session,
            min_confidence,
            input_size,
        })
    }
}

impl ObjectDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let mut lb = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(std::mem::take(&mut lb.tensor))?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let rows = YoloRows::new(data, &shape)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if rows.num_features() <= BOX_FEATURES {
            return Err(format!("YOLO output has no class scores: {shape:?}").into());
        }

        Ok(decode_detections(
            &rows,
            &lb,
            self.min_confidence,
            frame.width(),
            frame.height(),
        ))
    }
}

/// Best class per anchor, threshold, class-aware NMS. Output is ordered by
/// descending confidence and boxes are clamped to the frame.
fn decode_detections(
    rows: &YoloRows<'_>,
    lb: &Letterbox,
    min_confidence: f64,
    frame_width: u32,
    frame_height: u32,
) -> Vec<Detection> {
    let num_classes = rows.num_features().saturating_sub(BOX_FEATURES);
    let fw = frame_width as f64;
    let fh = frame_height as f64;

    let mut candidates = Vec::new();
    for i in 0..rows.len() {
        let (class_id, score) = (0..num_classes)
            .map(|c| (c, rows.get(i, BOX_FEATURES + c)))
            .fold((0usize, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
        let confidence = score as f64;
        if num_classes == 0 || confidence < min_confidence {
            continue;
        }

        let cx = rows.get(i, 0) as f64;
        let cy = rows.get(i, 1) as f64;
        let w = rows.get(i, 2) as f64;
        let h = rows.get(i, 3) as f64;
        let (x1, y1) = lb.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = lb.unmap(cx + w / 2.0, cy + h / 2.0);

        candidates.push(Detection {
            class_id,
            confidence,
            bbox: [
                x1.clamp(0.0, fw),
                y1.clamp(0.0, fh),
                x2.clamp(0.0, fw),
                y2.clamp(0.0, fh),
            ],
        });
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let boxes: Vec<[f64; 4]> = candidates.iter().map(|d| d.bbox).collect();

    nms_indices(&boxes, NMS_IOU_THRESH, |i, j| {
        candidates[i].class_id == candidates[j].class_id
    })
    .into_iter()
    .take(MAX_DETECTIONS)
    .map(|i| candidates[i].clone())
    .collect()
}
