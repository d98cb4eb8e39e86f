use super::config::PoseConfig;
use super::gate::ConfidenceGate;
use super::heatmap::PoseOutputs;
use super::mapper::CoordinateMapper;
use super::skeleton::{segments, SKELETON};
use super::smoother::TemporalSmoother;
use super::types::{
    GatedKeypoint, JointPair, Keypoint, KeypointIndex, PoseFrame, JOINT_COUNT, JOINT_NAMES,
};
use crate::InferError;

/// Turns one frame's model outputs into gated, smoothed keypoints and draw
/// requests.
///
/// Stages run in order: heatmap peak per joint, mapping to source pixels,
/// confidence gate on the raw detection, moving average, topology. All buffers
/// are sized once here and reused for every frame.
#[derive(Debug, Clone)]
pub struct PoseDecoder {
    input_height: usize,
    line_width: f32,
    gate: ConfidenceGate,
    smoother: TemporalSmoother,
    topology: &'static [JointPair],
    raw: Vec<Keypoint>,
    frame: PoseFrame,
}

fn check_topology(topology: &[JointPair]) -> Result<(), InferError> {
    if JOINT_NAMES.len() != JOINT_COUNT || KeypointIndex::ALL.len() != JOINT_COUNT {
        return Err(InferError::Config(format!(
            "joint table has {} names for {} joints",
            JOINT_NAMES.len(),
            JOINT_COUNT
        )));
    }
    for edge in topology {
        let (start, end) = (usize::from(edge.start), usize::from(edge.end));
        if start >= JOINT_COUNT || end >= JOINT_COUNT || start == end {
            return Err(InferError::Config(format!(
                "invalid skeleton edge ({start}, {end})"
            )));
        }
    }
    Ok(())
}

impl PoseDecoder {
    pub fn new(config: &PoseConfig) -> Result<Self, InferError> {
        Self::with_topology(config, &SKELETON)
    }

    /// Decoder drawing a custom edge table instead of [`SKELETON`].
    pub fn with_topology(
        config: &PoseConfig,
        topology: &'static [JointPair],
    ) -> Result<Self, InferError> {
        config.validate()?;
        check_topology(topology)?;

        Ok(Self {
            input_height: config.input_height(),
            line_width: config.line_width(),
            gate: ConfidenceGate::new(config.confidence_threshold())?,
            smoother: TemporalSmoother::new(JOINT_COUNT, config.filter_window()),
            topology,
            raw: KeypointIndex::ALL.iter().map(|&i| Keypoint::empty(i)).collect(),
            frame: PoseFrame::with_capacity(JOINT_COUNT, topology.len()),
        })
    }

    pub fn gate(&self) -> &ConfidenceGate {
        &self.gate
    }

    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    pub fn topology(&self) -> &'static [JointPair] {
        self.topology
    }

    /// Result of the last successful [`decode`](Self::decode).
    pub fn frame(&self) -> &PoseFrame {
        &self.frame
    }

    pub fn set_filter_window(&mut self, window: usize) {
        self.smoother.set_window(window);
    }

    pub fn set_confidence_threshold(&mut self, threshold: f32) -> Result<(), InferError> {
        self.gate.set_threshold(threshold)
    }

    /// Forget the smoothing history, e.g. after a seek.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.frame.clear();
    }

    /// Peak-decode and map every joint without touching the smoother.
    ///
    /// Identical inputs always give identical keypoints.
    pub fn decode_raw(
        &mut self,
        outputs: &PoseOutputs<'_>,
        source_width: usize,
        source_height: usize,
    ) -> Result<&[Keypoint], InferError> {
        if outputs.num_joints() != JOINT_COUNT {
            return Err(InferError::ShapeMismatch {
                expected: format!("{JOINT_COUNT} joint channels"),
                got: format!("{} joint channels", outputs.num_joints()),
            });
        }
        let mapper = CoordinateMapper::new(
            self.input_height,
            outputs.grid_height(),
            source_width,
            source_height,
        )?;

        for (joint, keypoint) in self.raw.iter_mut().enumerate() {
            let decoded = outputs.decode_joint(joint);
            keypoint.position = mapper.map_joint(&decoded);
            keypoint.confidence = decoded.confidence;
        }

        Ok(&self.raw)
    }

    /// Run the full pipeline for one frame.
    ///
    /// On error nothing is recorded: the smoothing history and the previous
    /// frame stay as they were.
    pub fn decode(
        &mut self,
        outputs: &PoseOutputs<'_>,
        source_width: usize,
        source_height: usize,
    ) -> Result<&PoseFrame, InferError> {
        self.decode_raw(outputs, source_width, source_height)?;

        self.frame.clear();
        for raw in &self.raw {
            let renderable = self.gate.passes(raw);
            self.frame.keypoints.push(GatedKeypoint {
                keypoint: self.smoother.smooth(*raw),
                renderable,
            });
        }
        self.frame.segments.extend(segments(
            self.topology,
            &self.frame.keypoints,
            self.line_width,
        ));

        Ok(&self.frame)
    }
}
