/// ArcFace embedding encoder using ONNX Runtime.
///
/// Each face crop is resized to 112x112 and normalized to [-1, 1]; the
/// resulting embedding is L2-normalized so Euclidean distances fall in [0, 2].
/// Enrollment embeddings must come from this same model and normalization.
use std::path::Path;

use crate::recognition::domain::face_encoder::FaceEncoder;
use crate::shared::frame::Frame;
use crate::shared::math::l2_normalize;
use crate::shared::onnx_session;
use crate::shared::region::Region;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct OnnxFaceEncoder {
    session: ort::session::Session,
}

impl OnnxFaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = onnx_session::load_session(model_path)?;
        Ok(Self { session })
    }

    fn embed(&mut self, frame: &Frame, face: &Region) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let tensor = preprocess(frame, face);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(embedding)
    }
}

impl FaceEncoder for OnnxFaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        faces: &[Region],
    ) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>> {
        faces.iter().map(|face| self.embed(frame, face)).collect()
    }
}

/// Crop `face` out of an RGB frame, resize to 112x112, normalize, NCHW layout.
fn preprocess(frame: &Frame, face: &Region) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let fw = frame.width() as usize;
    let fh = frame.height() as usize;

    let x0 = (face.x.max(0) as usize).min(fw - 1);
    let y0 = (face.y.max(0) as usize).min(fh - 1);
    let crop_w = (face.width.max(1) as usize).min(fw - x0);
    let crop_h = (face.height.max(1) as usize).min(fh - y0);

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = y0
            + (((y as f64 + 0.5) * crop_h as f64 / INPUT_SIZE as f64) as usize).min(crop_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x = x0
                + (((x as f64 + 0.5) * crop_w as f64 / INPUT_SIZE as f64) as usize)
                    .min(crop_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    tensor
}
