pub mod decode;
#[cfg(feature = "desktop")]
pub mod detector;
pub mod landmark;
#[cfg(feature = "desktop")]
pub mod preprocess;
pub mod skeleton;

pub use decode::{decode_landmarks, Letterbox};
#[cfg(feature = "desktop")]
pub use detector::LandmarkDetector;
pub use landmark::{Landmark, LandmarkIndex, PoseLandmarks};
#[cfg(feature = "desktop")]
pub use preprocess::preprocess_for_landmarks;
pub use skeleton::POSE_CONNECTIONS;
