pub mod anomaly_detector;
pub mod class_labels;
pub mod object_detector;
