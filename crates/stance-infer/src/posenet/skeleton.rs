use super::types::{GatedKeypoint, JointPair, KeypointIndex, LineSegment, Rgb};

use KeypointIndex::*;

const fn pair(start: KeypointIndex, end: KeypointIndex, color: Rgb) -> JointPair {
    JointPair { start, end, color }
}

/// Skeleton edges in draw order.
pub const SKELETON: [JointPair; 18] = [
    // Face
    pair(Nose, LeftEye, Rgb::MAGENTA),
    pair(Nose, RightEye, Rgb::MAGENTA),
    pair(LeftEye, LeftEar, Rgb::MAGENTA),
    pair(RightEye, RightEar, Rgb::MAGENTA),
    // Torso
    pair(LeftShoulder, RightShoulder, Rgb::RED),
    pair(LeftShoulder, LeftHip, Rgb::RED),
    pair(RightShoulder, RightHip, Rgb::RED),
    pair(LeftShoulder, RightHip, Rgb::RED),
    pair(RightShoulder, LeftHip, Rgb::RED),
    pair(LeftHip, RightHip, Rgb::RED),
    // Arms
    pair(LeftShoulder, LeftElbow, Rgb::GREEN),
    pair(LeftElbow, LeftWrist, Rgb::GREEN),
    pair(RightShoulder, RightElbow, Rgb::GREEN),
    pair(RightElbow, RightWrist, Rgb::GREEN),
    // Legs
    pair(LeftHip, LeftKnee, Rgb::BLUE),
    pair(LeftKnee, LeftAnkle, Rgb::BLUE),
    pair(RightHip, RightKnee, Rgb::BLUE),
    pair(RightKnee, RightAnkle, Rgb::BLUE),
];

/// Draw requests for every edge whose two endpoints are renderable.
///
/// `keypoints` is indexed by joint. Edges with a failing or missing endpoint are
/// skipped whole.
pub fn segments<'a>(
    topology: &'a [JointPair],
    keypoints: &'a [GatedKeypoint],
    width: f32,
) -> impl Iterator<Item = LineSegment> + 'a {
    topology.iter().filter_map(move |edge| {
        let from = keypoints.get(usize::from(edge.start))?;
        let to = keypoints.get(usize::from(edge.end))?;
        (from.renderable && to.renderable).then_some(LineSegment {
            from: from.keypoint,
            to: to.keypoint,
            width,
            color: edge.color,
        })
    })
}
