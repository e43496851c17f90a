pub mod face_encoder;
pub mod face_locator;
pub mod face_matcher;
pub mod known_face;
