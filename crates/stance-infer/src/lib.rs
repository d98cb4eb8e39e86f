pub mod backend;
pub mod backends;
pub mod device;
pub mod error;
pub mod modelsource;
pub mod posenet;
pub mod session;

pub use backend::Backend;
pub use device::Device;
pub use error::InferError;
pub use modelsource::ModelSource;
pub use session::Session;

#[cfg(feature = "onnx")]
pub use backends::OnnxBackend;

pub use posenet::{
    GatedKeypoint, JointPair, Keypoint, KeypointIndex, LineSegment, PoseConfig, PoseFrame,
    PoseTracker, RenderSink, Rgb, JOINT_COUNT,
};
