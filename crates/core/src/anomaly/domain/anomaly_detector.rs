use crate::anomaly::domain::class_labels::ClassLabels;
use crate::anomaly::domain::object_detector::ObjectDetector;
use crate::shared::frame::Frame;

/// Names the objects an object-detection model finds in a frame.
///
/// One label per detected instance, in detection order, so duplicates are
/// kept. Detections scoring below `confidence` are dropped.
pub struct AnomalyDetector {
    detector: Box<dyn ObjectDetector>,
    labels: ClassLabels,
    confidence: f64,
}

impl AnomalyDetector {
    pub fn new(detector: Box<dyn ObjectDetector>, labels: ClassLabels, confidence: f64) -> Self {
        Self {
            detector,
            labels,
            confidence,
        }
    }

    pub fn detect_anomalies(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let rgb = frame.to_rgb();
        let detections = self.detector.detect(&rgb)?;

        let labels: Vec<String> = detections
            .iter()
            .filter(|d| d.confidence >= self.confidence)
            .map(|d| self.label(d.class_id))
            .collect();
        log::debug!(
            "{} of {} detection(s) at or above {:.2}",
            labels.len(),
            detections.len(),
            self.confidence
        );
        Ok(labels)
    }

    fn label(&self, class_id: usize) -> String {
        match self.labels.name(class_id) {
            Some(name) => name.to_string(),
            None => {
                log::warn!(
                    "Class index {class_id} has no label ({} known)",
                    self.labels.len()
                );
                format!("class_{class_id}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::domain::object_detector::Detection;
    use crate::shared::frame::PixelFormat;
    use std::sync::{Arc, Mutex};

    struct StubDetector {
        detections: Vec<Detection>,
        seen: Arc<Mutex<Vec<PixelFormat>>>,
    }

    impl StubDetector {
        fn new(detections: Vec<Detection>) -> Self {
            Self {
                detections,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ObjectDetector for StubDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(frame.format());
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector;

    impl ObjectDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
            Err("model input rank mismatch".into())
        }
    }

    fn det(class_id: usize, confidence: f64) -> Detection {
        Detection {
            class_id,
            confidence,
            bbox: [0.0, 0.0, 10.0, 10.0],
        }
    }

    fn labels() -> ClassLabels {
        ClassLabels::new(vec!["A".into(), "B".into(), "C".into()])
    }

    fn frame() -> Frame {
        Frame::new(vec![0u8; 4 * 4 * 3], 4, 4, PixelFormat::Bgr)
    }

    #[test]
    fn test_no_detections_is_empty() {
        let mut d = AnomalyDetector::new(Box::new(StubDetector::new(vec![])), labels(), 0.5);
        assert!(d.detect_anomalies(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_two_detections_in_detection_order() {
        let stub = StubDetector::new(vec![det(0, 0.9), det(1, 0.7)]);
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        assert_eq!(d.detect_anomalies(&frame()).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_order_follows_detector_not_class_index() {
        let stub = StubDetector::new(vec![det(2, 0.9), det(0, 0.8)]);
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        assert_eq!(d.detect_anomalies(&frame()).unwrap(), vec!["C", "A"]);
    }

    #[test]
    fn test_below_threshold_excluded() {
        let stub = StubDetector::new(vec![det(0, 0.49), det(1, 0.5), det(2, 0.2)]);
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        assert_eq!(d.detect_anomalies(&frame()).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_duplicates_kept_per_instance() {
        let stub = StubDetector::new(vec![det(1, 0.9), det(1, 0.8), det(0, 0.6)]);
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        assert_eq!(d.detect_anomalies(&frame()).unwrap(), vec!["B", "B", "A"]);
    }

    #[test]
    fn test_unknown_class_gets_placeholder_label() {
        let stub = StubDetector::new(vec![det(7, 0.9)]);
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        assert_eq!(d.detect_anomalies(&frame()).unwrap(), vec!["class_7"]);
    }

    #[test]
    fn test_detector_receives_rgb_frame() {
        let stub = StubDetector::new(vec![]);
        let seen = stub.seen.clone();
        let mut d = AnomalyDetector::new(Box::new(stub), labels(), 0.5);
        d.detect_anomalies(&frame()).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![PixelFormat::Rgb]);
    }

    #[test]
    fn test_detector_errors_propagate() {
        let mut d = AnomalyDetector::new(Box::new(FailingDetector), labels(), 0.5);
        let err = d.detect_anomalies(&frame()).unwrap_err();
        assert_eq!(err.to_string(), "model input rank mismatch");
    }
}
