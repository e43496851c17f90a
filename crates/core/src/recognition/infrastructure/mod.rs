pub mod embedding_store;
pub mod onnx_face_encoder;
pub mod onnx_face_locator;
