use stance_base::{Tensor, Vec2};
use stance_infer::posenet::CoordinateMapper;
use stance_infer::{
    Backend, InferError, KeypointIndex, LineSegment, ModelSource, PoseConfig, PoseTracker,
    RenderSink, Session, JOINT_COUNT,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

const GRID: usize = 23;
const HEATMAPS: &str = "float_heatmaps";
const OFFSETS: &str = "float_short_offsets";

type Outputs = (Tensor<f32>, Tensor<f32>);

/// Replays queued outputs (or errors) in order, then blank outputs.
#[derive(Default)]
struct Script {
    queue: VecDeque<Result<Outputs, String>>,
    input_shapes: Vec<Vec<usize>>,
}

struct ScriptedSession {
    inputs: Vec<String>,
    outputs: Vec<String>,
    joints: usize,
    script: Rc<RefCell<Script>>,
}

impl ScriptedSession {
    fn new(script: Rc<RefCell<Script>>) -> Self {
        Self {
            inputs: vec!["image".to_string()],
            outputs: vec![HEATMAPS.to_string(), OFFSETS.to_string()],
            joints: JOINT_COUNT,
            script,
        }
    }
}

fn blank_outputs(joints: usize) -> Outputs {
    (
        Tensor::zeros(vec![1, GRID, GRID, joints]).unwrap(),
        Tensor::zeros(vec![1, GRID, GRID, 2 * joints]).unwrap(),
    )
}

fn with_peak(joint: KeypointIndex, x: usize, y: usize, score: f32) -> Outputs {
    let (mut heatmaps, offsets) = blank_outputs(JOINT_COUNT);
    heatmaps.data[(y * GRID + x) * JOINT_COUNT + joint as usize] = score;
    (heatmaps, offsets)
}

impl Session for ScriptedSession {
    fn run(
        &mut self,
        inputs: &[(&str, Tensor<f32>)],
    ) -> Result<HashMap<String, Tensor<f32>>, InferError> {
        let mut script = self.script.borrow_mut();
        script.input_shapes.push(inputs[0].1.shape.clone());
        let (heatmaps, offsets) = match script.queue.pop_front() {
            Some(Ok(outputs)) => outputs,
            Some(Err(msg)) => return Err(InferError::BackendError(msg)),
            None => blank_outputs(self.joints),
        };
        Ok(HashMap::from([
            (HEATMAPS.to_string(), heatmaps),
            (OFFSETS.to_string(), offsets),
        ]))
    }

    fn input_names(&self) -> &[String] {
        &self.inputs
    }

    fn output_names(&self) -> &[String] {
        &self.outputs
    }
}

struct ScriptedBackend {
    script: Rc<RefCell<Script>>,
}

impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn load_model(&self, _model: ModelSource) -> Result<Box<dyn Session>, InferError> {
        Ok(Box::new(ScriptedSession::new(self.script.clone())))
    }
}

#[derive(Default)]
struct CollectingSink {
    segments: Vec<LineSegment>,
}

impl RenderSink for CollectingSink {
    fn draw_segment(&mut self, segment: &LineSegment) {
        self.segments.push(*segment);
    }
}

fn frame_image(h: usize, w: usize) -> Tensor<f32> {
    Tensor::new(vec![h, w, 3], vec![128.0; h * w * 3]).unwrap()
}

fn tracker(config: PoseConfig) -> (PoseTracker, Rc<RefCell<Script>>) {
    let script = Rc::new(RefCell::new(Script::default()));
    let session = Box::new(ScriptedSession::new(script.clone()));
    let tracker = PoseTracker::with_session(session, config).unwrap();
    (tracker, script)
}

#[test]
fn test_construction_probes_model_once() {
    let (_tracker, script) = tracker(PoseConfig::default());
    let script = script.borrow();
    assert_eq!(script.input_shapes, vec![vec![1, 360, 360, 3]]);
}

#[test]
fn test_new_loads_through_backend() {
    let script = Rc::new(RefCell::new(Script::default()));
    let backend = ScriptedBackend {
        script: script.clone(),
    };
    let tracker = PoseTracker::new(
        ModelSource::File("posenet.onnx".into()),
        &backend,
        PoseConfig::default(),
    );
    assert!(tracker.is_ok());
}

#[test]
fn test_construction_rejects_joint_count_mismatch() {
    let script = Rc::new(RefCell::new(Script::default()));
    let mut session = ScriptedSession::new(script);
    session.joints = 16;

    let result = PoseTracker::with_session(Box::new(session), PoseConfig::default());
    assert!(matches!(result, Err(InferError::ShapeMismatch { .. })));
}

#[test]
fn test_construction_rejects_missing_output_layer() {
    let script = Rc::new(RefCell::new(Script::default()));
    let session = ScriptedSession::new(script);
    let config = PoseConfig::default().with_offset_output("displacement_fwd");

    match PoseTracker::with_session(Box::new(session), config) {
        Err(InferError::MissingOutput { name, available }) => {
            assert_eq!(name, "displacement_fwd");
            assert_eq!(available.len(), 2);
        }
        Err(other) => panic!("expected MissingOutput, got {other:?}"),
        Ok(_) => panic!("expected MissingOutput"),
    }
}

#[test]
fn test_construction_rejects_unknown_input_name() {
    let script = Rc::new(RefCell::new(Script::default()));
    let session = ScriptedSession::new(script);
    let config = PoseConfig::default().with_input_name("pixels");

    let result = PoseTracker::with_session(Box::new(session), config);
    assert!(matches!(result, Err(InferError::InvalidInput { .. })));
}

#[test]
fn test_construction_rejects_zero_stride_grid() {
    let script = Rc::new(RefCell::new(Script::default()));
    // 359 / 45 = 7, which quantizes to 0
    script.borrow_mut().queue.push_back(Ok((
        Tensor::zeros(vec![1, 46, 46, JOINT_COUNT]).unwrap(),
        Tensor::zeros(vec![1, 46, 46, 2 * JOINT_COUNT]).unwrap(),
    )));
    let session = ScriptedSession::new(script);

    let result = PoseTracker::with_session(Box::new(session), PoseConfig::default());
    assert!(matches!(result, Err(InferError::Config(_))));
}

#[test]
fn test_track_feeds_preprocessed_frame_and_maps_to_source() {
    let (mut tracker, script) = tracker(PoseConfig::default());
    script
        .borrow_mut()
        .queue
        .push_back(Ok(with_peak(KeypointIndex::LeftWrist, 6, 9, 0.8)));

    let frame = tracker.track(&frame_image(72, 128)).unwrap();
    let wrist = frame.keypoint(KeypointIndex::LeftWrist).unwrap();
    let expected = CoordinateMapper::new(360, GRID, 128, 72)
        .unwrap()
        .map(Vec2::new(6, 9), Vec2::new(0.0, 0.0));
    assert_eq!(wrist.keypoint.position, expected);
    assert_eq!(wrist.keypoint.confidence, 0.8);
    assert_eq!(frame.keypoints.len(), JOINT_COUNT);

    assert_eq!(script.borrow().input_shapes[1], vec![1, 360, 360, 3]);
}

#[test]
fn test_inference_failure_leaves_history_untouched() {
    let (mut tracker, script) = tracker(PoseConfig::default().with_filter_window(3));
    let image = frame_image(36, 36);

    script
        .borrow_mut()
        .queue
        .push_back(Ok(with_peak(KeypointIndex::Nose, 2, 2, 0.9)));
    let before = tracker.track(&image).unwrap().clone();

    script
        .borrow_mut()
        .queue
        .push_back(Err("malformed input".to_string()));
    let result = tracker.track(&image);
    assert!(matches!(result, Err(InferError::BackendError(_))));

    assert_eq!(tracker.decoder().smoother().history_len(0), 1);
    assert_eq!(tracker.frame(), &before);
}

#[test]
fn test_malformed_output_leaves_history_untouched() {
    let (mut tracker, script) = tracker(PoseConfig::default().with_filter_window(3));
    let image = frame_image(36, 36);

    script
        .borrow_mut()
        .queue
        .push_back(Ok(with_peak(KeypointIndex::Nose, 2, 2, 0.9)));
    let before = tracker.track(&image).unwrap().clone();

    let (_, offsets) = blank_outputs(JOINT_COUNT);
    let truncated = Tensor {
        shape: vec![1, GRID, GRID, JOINT_COUNT],
        data: vec![0.0; 10],
    };
    script.borrow_mut().queue.push_back(Ok((truncated, offsets)));

    let result = tracker.track(&image);
    assert!(matches!(result, Err(InferError::ShapeMismatch { .. })));
    assert_eq!(tracker.decoder().smoother().history_len(0), 1);
    assert_eq!(tracker.frame(), &before);
}

#[test]
fn test_bad_frame_shape_is_rejected_before_inference() {
    let (mut tracker, script) = tracker(PoseConfig::default());
    let flat = Tensor::new(vec![36, 36], vec![0.0; 36 * 36]).unwrap();

    assert!(matches!(
        tracker.track(&flat),
        Err(InferError::ShapeMismatch { .. })
    ));
    assert_eq!(script.borrow().input_shapes.len(), 1);
}

#[test]
fn test_reset_restarts_smoothing() {
    let (mut tracker, script) = tracker(PoseConfig::default().with_filter_window(4));
    let image = frame_image(36, 36);

    for x in [2, 4] {
        script
            .borrow_mut()
            .queue
            .push_back(Ok(with_peak(KeypointIndex::Nose, x, 0, 1.0)));
        tracker.track(&image).unwrap();
    }
    assert_eq!(tracker.decoder().smoother().history_len(0), 2);

    tracker.reset();
    assert_eq!(tracker.decoder().smoother().history_len(0), 0);

    script
        .borrow_mut()
        .queue
        .push_back(Ok(with_peak(KeypointIndex::Nose, 8, 0, 1.0)));
    let frame = tracker.track(&image).unwrap();
    let expected = CoordinateMapper::new(360, GRID, 36, 36)
        .unwrap()
        .map(Vec2::new(8, 0), Vec2::new(0.0, 0.0));
    assert_eq!(
        frame.keypoint(KeypointIndex::Nose).unwrap().keypoint.position,
        expected
    );
}

#[test]
fn test_runtime_tuning() {
    let (mut tracker, _script) = tracker(PoseConfig::default());
    tracker.set_filter_window(5);
    assert_eq!(tracker.filter_window(), 5);

    tracker.set_confidence_percent(65.0).unwrap();
    assert!((tracker.confidence_threshold() - 0.65).abs() < 1e-6);

    assert!(tracker.set_confidence_threshold(1.5).is_err());
    assert!((tracker.confidence_threshold() - 0.65).abs() < 1e-6);
}

#[test]
fn test_render_replays_segments_into_sink() {
    let (mut tracker, script) = tracker(PoseConfig::default().with_confidence_threshold(0.5));
    let (mut heatmaps, offsets) = blank_outputs(JOINT_COUNT);
    for (joint, x, y) in [
        (KeypointIndex::LeftHip, 8, 12),
        (KeypointIndex::LeftKnee, 8, 16),
        (KeypointIndex::LeftAnkle, 8, 20),
    ] {
        heatmaps.data[(y * GRID + x) * JOINT_COUNT + joint as usize] = 0.9;
    }
    script.borrow_mut().queue.push_back(Ok((heatmaps, offsets)));
    tracker.track(&frame_image(36, 36)).unwrap();

    let mut sink = CollectingSink::default();
    tracker.render(&mut sink);

    let edges: Vec<_> = sink
        .segments
        .iter()
        .map(|s| (s.from.index, s.to.index))
        .collect();
    assert_eq!(
        edges,
        vec![
            (KeypointIndex::LeftHip, KeypointIndex::LeftKnee),
            (KeypointIndex::LeftKnee, KeypointIndex::LeftAnkle),
        ]
    );
    assert!(sink.segments.iter().all(|s| s.width == 5.0));
}
