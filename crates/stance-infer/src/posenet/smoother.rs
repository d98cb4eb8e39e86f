use super::types::Keypoint;
use stance_base::Vec2;
use std::collections::VecDeque;

/// Moving-average filter over the last `window` raw keypoints of each joint.
///
/// Larger windows suppress more jitter but the reported position trails the
/// true one by about `window / 2` frames. A window of 0 disables filtering and
/// keeps no history. History survives across frames until [`reset`] and must be
/// reset by the caller when the video seeks or restarts.
///
/// [`reset`]: TemporalSmoother::reset
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: usize,
    history: Vec<VecDeque<Keypoint>>,
}

impl TemporalSmoother {
    pub fn new(num_joints: usize, window: usize) -> Self {
        Self {
            window,
            history: (0..num_joints)
                .map(|_| VecDeque::with_capacity(window + 1))
                .collect(),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Change the window. Shrinking drops the oldest entries right away; 0 drops all.
    pub fn set_window(&mut self, window: usize) {
        self.window = window;
        for frames in &mut self.history {
            while frames.len() > window {
                frames.pop_front();
            }
            frames.reserve((window + 1).saturating_sub(frames.len()));
        }
    }

    /// Number of raw keypoints currently held for `joint`.
    pub fn history_len(&self, joint: usize) -> usize {
        self.history.get(joint).map_or(0, VecDeque::len)
    }

    pub fn reset(&mut self) {
        for frames in &mut self.history {
            frames.clear();
        }
    }

    /// Record `raw` for its joint and return the mean over that joint's history.
    ///
    /// Before the window fills the mean covers the frames seen so far.
    pub fn smooth(&mut self, raw: Keypoint) -> Keypoint {
        if self.window == 0 {
            return raw;
        }

        // joints beyond the configured count pass through unfiltered
        let Some(frames) = self.history.get_mut(usize::from(raw.index)) else {
            return raw;
        };
        frames.push_back(raw);
        if frames.len() > self.window {
            frames.pop_front();
        }

        let mut position = Vec2::zero();
        let mut confidence = 0.0;
        for keypoint in frames.iter() {
            position += keypoint.position;
            confidence += keypoint.confidence;
        }
        let count = frames.len() as f32;

        Keypoint::new(raw.index, position / count, confidence / count)
    }
}
