use stance_base::Vec2;

/// Number of joints decoded per frame.
pub const JOINT_COUNT: usize = 17;

/// Joint names, indexed by `KeypointIndex`.
pub const JOINT_NAMES: [&str; JOINT_COUNT] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// Body joint indices, matching the heatmap channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const ALL: [KeypointIndex; JOINT_COUNT] = [
        KeypointIndex::Nose,
        KeypointIndex::LeftEye,
        KeypointIndex::RightEye,
        KeypointIndex::LeftEar,
        KeypointIndex::RightEar,
        KeypointIndex::LeftShoulder,
        KeypointIndex::RightShoulder,
        KeypointIndex::LeftElbow,
        KeypointIndex::RightElbow,
        KeypointIndex::LeftWrist,
        KeypointIndex::RightWrist,
        KeypointIndex::LeftHip,
        KeypointIndex::RightHip,
        KeypointIndex::LeftKnee,
        KeypointIndex::RightKnee,
        KeypointIndex::LeftAnkle,
        KeypointIndex::RightAnkle,
    ];

    pub fn name(self) -> &'static str {
        JOINT_NAMES[self as usize]
    }
}

impl From<KeypointIndex> for usize {
    fn from(index: KeypointIndex) -> usize {
        index as usize
    }
}

impl TryFrom<usize> for KeypointIndex {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        KeypointIndex::ALL.get(value).copied().ok_or_else(|| {
            format!(
                "Invalid keypoint index: {}. Must be in range 0-{}.",
                value,
                JOINT_COUNT - 1
            )
        })
    }
}

/// One joint's location in source-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub index: KeypointIndex,
    pub position: Vec2<f32>,
    /// Heatmap score in [0.0, 1.0].
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(index: KeypointIndex, position: Vec2<f32>, confidence: f32) -> Self {
        Self {
            index,
            position,
            confidence,
        }
    }

    /// Zero-confidence keypoint at the origin.
    pub fn empty(index: KeypointIndex) -> Self {
        Self::new(index, Vec2::zero(), 0.0)
    }
}

/// A keypoint together with the confidence gate's decision for this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GatedKeypoint {
    pub keypoint: Keypoint,
    pub renderable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const MAGENTA: Rgb = Rgb(255, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

/// One skeletal edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPair {
    pub start: KeypointIndex,
    pub end: KeypointIndex,
    pub color: Rgb,
}

/// A draw request handed to the render sink.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Keypoint,
    pub to: Keypoint,
    pub width: f32,
    pub color: Rgb,
}

/// Everything produced for one frame. Buffers are reused across frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseFrame {
    /// One entry per joint, in `KeypointIndex` order.
    pub keypoints: Vec<GatedKeypoint>,
    /// Edges whose endpoints both passed the gate, in topology order.
    pub segments: Vec<LineSegment>,
}

impl PoseFrame {
    pub fn with_capacity(joints: usize, edges: usize) -> Self {
        Self {
            keypoints: Vec::with_capacity(joints),
            segments: Vec::with_capacity(edges),
        }
    }

    pub fn keypoint(&self, index: KeypointIndex) -> Option<&GatedKeypoint> {
        self.keypoints.get(usize::from(index))
    }

    pub fn clear(&mut self) {
        self.keypoints.clear();
        self.segments.clear();
    }
}

/// Consumer of draw requests, e.g. a line renderer.
pub trait RenderSink {
    fn draw_segment(&mut self, segment: &LineSegment);
}
