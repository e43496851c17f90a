pub mod anomaly;
pub mod imaging;
pub mod pipeline;
pub mod recognition;
pub mod shared;
