use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::anomaly::domain::anomaly_detector::AnomalyDetector;
use crate::imaging::domain::frame_reader::FrameReader;
use crate::recognition::domain::face_matcher::FaceMatcher;

/// Outcome of screening one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScreeningReport {
    pub voter_id: Option<String>,
    pub anomalies: Vec<String>,
}

/// Single-image screening: read → match face → detect anomalies.
///
/// Either component may be absent; its part of the report stays empty.
pub struct ScreenImageUseCase {
    reader: Box<dyn FrameReader>,
    matcher: Option<FaceMatcher>,
    anomaly_detector: Option<AnomalyDetector>,
}

impl ScreenImageUseCase {
    pub fn new(
        reader: Box<dyn FrameReader>,
        matcher: Option<FaceMatcher>,
        anomaly_detector: Option<AnomalyDetector>,
    ) -> Self {
        Self {
            reader,
            matcher,
            anomaly_detector,
        }
    }

    pub fn execute(&mut self, input_path: &Path) -> Result<ScreeningReport, Box<dyn std::error::Error>> {
        let frame = self.reader.read(input_path)?;
        let mut report = ScreeningReport::default();

        if let Some(matcher) = self.matcher.as_mut() {
            let start = Instant::now();
            report.voter_id = matcher.recognize(&frame)?;
            log::debug!(
                "Face matching took {:.1} ms",
                start.elapsed().as_secs_f64() * 1000.0
            );
        }

        if let Some(detector) = self.anomaly_detector.as_mut() {
            let start = Instant::now();
            report.anomalies = detector.detect_anomalies(&frame)?;
            log::debug!(
                "Anomaly detection took {:.1} ms",
                start.elapsed().as_secs_f64() * 1000.0
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::domain::class_labels::ClassLabels;
    use crate::anomaly::domain::object_detector::{Detection, ObjectDetector};
    use crate::recognition::domain::face_encoder::FaceEncoder;
    use crate::recognition::domain::face_locator::FaceLocator;
    use crate::recognition::domain::known_face::{KnownFace, KnownFaces};
    use crate::shared::frame::{Frame, FrameError, PixelFormat};
    use crate::shared::region::Region;
    use std::sync::Arc;

    // --- Stubs ---

    struct StubReader;

    impl FrameReader for StubReader {
        fn read(&self, _path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            Ok(Frame::new(vec![0u8; 8 * 8 * 3], 8, 8, PixelFormat::Rgb))
        }
    }

    struct MissingReader;

    impl FrameReader for MissingReader {
        fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            Err(format!("cannot open {}", path.display()).into())
        }
    }

    struct TruncatedReader;

    impl FrameReader for TruncatedReader {
        fn read(&self, _path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
            Ok(Frame::try_new(vec![0u8; 10], 2, 2, PixelFormat::Bgr)?)
        }
    }

    struct OneFace;

    impl FaceLocator for OneFace {
        fn locate(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(vec![Region {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
                score: 0.9,
            }])
        }
    }

    struct FixedEncoder(Vec<f32>);

    impl FaceEncoder for FixedEncoder {
        fn encode(
            &mut self,
            _frame: &Frame,
            faces: &[Region],
        ) -> Result<Vec<Vec<f32>>, Box<dyn std::error::Error>> {
            Ok(faces.iter().map(|_| self.0.clone()).collect())
        }
    }

    struct FixedDetector(Vec<Detection>);

    impl ObjectDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    // --- Helpers ---

    fn matcher(probe: Vec<f32>) -> FaceMatcher {
        let known = KnownFaces::new(vec![KnownFace {
            voter_id: "VTR0042".into(),
            embedding: vec![0.0, 0.0],
        }])
        .unwrap();
        FaceMatcher::new(
            Arc::new(known),
            Box::new(OneFace),
            Box::new(FixedEncoder(probe)),
            0.6,
        )
    }

    fn detector() -> AnomalyDetector {
        let dets = vec![
            Detection {
                class_id: 67,
                confidence: 0.91,
                bbox: [0.0, 0.0, 4.0, 4.0],
            },
            Detection {
                class_id: 0,
                confidence: 0.3,
                bbox: [4.0, 4.0, 8.0, 8.0],
            },
        ];
        AnomalyDetector::new(Box::new(FixedDetector(dets)), ClassLabels::coco(), 0.5)
    }

    // --- Tests ---

    #[test]
    fn test_runs_both_components() {
        let mut uc = ScreenImageUseCase::new(
            Box::new(StubReader),
            Some(matcher(vec![0.1, 0.1])),
            Some(detector()),
        );

        let report = uc.execute(Path::new("booth.jpg")).unwrap();

        assert_eq!(report.voter_id.as_deref(), Some("VTR0042"));
        assert_eq!(report.anomalies, vec!["cell phone"]);
    }

    #[test]
    fn test_matcher_only() {
        let mut uc = ScreenImageUseCase::new(Box::new(StubReader), Some(matcher(vec![5.0, 5.0])), None);

        let report = uc.execute(Path::new("booth.jpg")).unwrap();

        assert_eq!(report, ScreeningReport::default());
    }

    #[test]
    fn test_detector_only() {
        let mut uc = ScreenImageUseCase::new(Box::new(StubReader), None, Some(detector()));

        let report = uc.execute(Path::new("booth.jpg")).unwrap();

        assert_eq!(report.voter_id, None);
        assert_eq!(report.anomalies, vec!["cell phone"]);
    }

    #[test]
    fn test_reader_errors_propagate() {
        let mut uc = ScreenImageUseCase::new(Box::new(MissingReader), None, Some(detector()));
        let err = uc.execute(Path::new("gone.jpg")).unwrap_err();
        assert_eq!(err.to_string(), "cannot open gone.jpg");
    }

    #[test]
    fn test_truncated_frame_is_error_not_panic() {
        let mut uc = ScreenImageUseCase::new(
            Box::new(TruncatedReader),
            Some(matcher(vec![0.0, 0.0])),
            Some(detector()),
        );

        let err = uc.execute(Path::new("booth.jpg")).unwrap_err();

        assert!(err.downcast_ref::<FrameError>().is_some());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = ScreeningReport {
            voter_id: Some("VTR0042".into()),
            anomalies: vec!["cell phone".into(), "cell phone".into()],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"voter_id":"VTR0042","anomalies":["cell phone","cell phone"]}"#
        );
    }
}
