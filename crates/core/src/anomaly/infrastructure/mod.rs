pub mod label_file;
pub mod onnx_yolo_detector;
