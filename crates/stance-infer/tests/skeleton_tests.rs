use stance_base::{Tensor, Vec2};
use stance_infer::posenet::{segments, PoseDecoder, PoseOutputs, SKELETON};
use stance_infer::{GatedKeypoint, Keypoint, KeypointIndex, PoseConfig, Rgb, JOINT_COUNT};

fn gated(confidences: &[(KeypointIndex, f32)], threshold: f32) -> Vec<GatedKeypoint> {
    KeypointIndex::ALL
        .iter()
        .map(|&index| {
            let confidence = confidences
                .iter()
                .find(|(i, _)| *i == index)
                .map_or(0.0, |(_, c)| *c);
            GatedKeypoint {
                keypoint: Keypoint::new(index, Vec2::new(index as usize as f32, 0.0), confidence),
                renderable: confidence >= threshold,
            }
        })
        .collect()
}

#[test]
fn test_reference_topology_is_exact() {
    let expected: [(usize, usize, Rgb); 18] = [
        (0, 1, Rgb::MAGENTA),
        (0, 2, Rgb::MAGENTA),
        (1, 3, Rgb::MAGENTA),
        (2, 4, Rgb::MAGENTA),
        (5, 6, Rgb::RED),
        (5, 11, Rgb::RED),
        (6, 12, Rgb::RED),
        (5, 12, Rgb::RED),
        (6, 11, Rgb::RED),
        (11, 12, Rgb::RED),
        (5, 7, Rgb::GREEN),
        (7, 9, Rgb::GREEN),
        (6, 8, Rgb::GREEN),
        (8, 10, Rgb::GREEN),
        (11, 13, Rgb::BLUE),
        (13, 15, Rgb::BLUE),
        (12, 14, Rgb::BLUE),
        (14, 16, Rgb::BLUE),
    ];

    let actual: Vec<(usize, usize, Rgb)> = SKELETON
        .iter()
        .map(|edge| (usize::from(edge.start), usize::from(edge.end), edge.color))
        .collect();
    assert_eq!(actual, expected.to_vec());
}

#[test]
fn test_edge_with_one_failing_endpoint_is_skipped() {
    let keypoints = gated(
        &[
            (KeypointIndex::LeftShoulder, 0.9),
            (KeypointIndex::LeftElbow, 0.2),
        ],
        0.5,
    );
    assert!(keypoints[KeypointIndex::LeftShoulder as usize].renderable);

    let drawn: Vec<_> = segments(&SKELETON, &keypoints, 4.0).collect();
    assert!(drawn.is_empty());
}

#[test]
fn test_edge_with_both_endpoints_is_drawn() {
    let keypoints = gated(
        &[
            (KeypointIndex::LeftShoulder, 0.9),
            (KeypointIndex::LeftElbow, 0.6),
            (KeypointIndex::LeftWrist, 0.1),
        ],
        0.5,
    );

    let drawn: Vec<_> = segments(&SKELETON, &keypoints, 4.0).collect();
    assert_eq!(drawn.len(), 1);
    let segment = drawn[0];
    assert_eq!(segment.from.index, KeypointIndex::LeftShoulder);
    assert_eq!(segment.to.index, KeypointIndex::LeftElbow);
    assert_eq!(segment.color, Rgb::GREEN);
    assert_eq!(segment.width, 4.0);
}

#[test]
fn test_all_visible_draws_every_edge_in_order() {
    let keypoints = gated(&[], 0.0);
    let drawn: Vec<_> = segments(&SKELETON, &keypoints, 1.0).collect();
    assert_eq!(drawn.len(), SKELETON.len());
    for (segment, edge) in drawn.iter().zip(SKELETON.iter()) {
        assert_eq!(segment.from.index, edge.start);
        assert_eq!(segment.to.index, edge.end);
    }
}

#[test]
fn test_missing_keypoints_skip_edges() {
    let keypoints = gated(&[], 0.0);
    let drawn: Vec<_> = segments(&SKELETON, &keypoints[..5], 1.0).collect();
    // only the four face edges have both endpoints below index 5
    assert_eq!(drawn.len(), 4);
}

#[test]
fn test_decoder_applies_threshold_before_topology() {
    let mut heatmaps = Tensor::<f32>::zeros(vec![1, 23, 23, JOINT_COUNT]).unwrap();
    let offsets = Tensor::<f32>::zeros(vec![1, 23, 23, 2 * JOINT_COUNT]).unwrap();
    heatmaps.data[5 * 23 * JOINT_COUNT + KeypointIndex::LeftShoulder as usize] = 0.9;
    heatmaps.data[9 * 23 * JOINT_COUNT + KeypointIndex::LeftElbow as usize] = 0.2;

    let config = PoseConfig::default().with_confidence_threshold(0.5);
    let mut decoder = PoseDecoder::new(&config).unwrap();
    let outputs = PoseOutputs::new(&heatmaps, &offsets, JOINT_COUNT).unwrap();
    let frame = decoder.decode(&outputs, 640, 480).unwrap();

    assert!(frame.segments.is_empty());
    assert!(frame.keypoint(KeypointIndex::LeftShoulder).unwrap().renderable);
    assert!(!frame.keypoint(KeypointIndex::LeftElbow).unwrap().renderable);
}
