//! Single-person pose decoding from heatmap and offset outputs.

mod config;
mod decoder;
mod gate;
mod heatmap;
mod mapper;
mod preprocess;
mod skeleton;
mod smoother;
mod tracker;
mod types;

pub use config::PoseConfig;
pub use decoder::PoseDecoder;
pub use gate::ConfidenceGate;
pub use heatmap::{DecodedJoint, PoseOutputs};
pub use mapper::{quantized_stride, CoordinateMapper, STRIDE_QUANTUM};
pub use preprocess::{preprocess, Normalization, RESNET_MEAN};
pub use skeleton::{segments, SKELETON};
pub use smoother::TemporalSmoother;
pub use tracker::PoseTracker;
pub use types::{
    GatedKeypoint, JointPair, Keypoint, KeypointIndex, LineSegment, PoseFrame, RenderSink, Rgb,
    JOINT_COUNT, JOINT_NAMES,
};
