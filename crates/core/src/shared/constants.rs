pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const DEFAULT_EMBEDDINGS_FILE: &str = "embeddings.json";
pub const DEFAULT_ANOMALY_MODEL_FILE: &str = "best.onnx";

/// Maximum Euclidean distance (exclusive) for two face embeddings to match.
///
/// Distances are only comparable within one embedding space: the enrollment
/// file must hold L2-normalized embeddings from the same ArcFace model
/// (`EMBEDDING_MODEL_NAME`) the encoder runs. On unit vectors 0.6 means a
/// cosine similarity above 0.82, which is strict; sites that see too many
/// false rejections should raise `match_threshold` in their settings.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Minimum confidence for an object detection to count as an anomaly.
pub const DEFAULT_ANOMALY_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_FACE_CONFIDENCE: f64 = 0.5;

/// Directory name used under the platform cache/config directories.
pub const APP_DIR_NAME: &str = "Pollwatch";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
