use super::types::Keypoint;
use crate::InferError;

/// Per-frame, per-joint visibility test: `confidence >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self { threshold: 0.0 }
    }
}

fn check_threshold(threshold: f32) -> Result<f32, InferError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(InferError::Config(format!(
            "confidence threshold {threshold} outside [0, 1]"
        )))
    }
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Result<Self, InferError> {
        Ok(Self {
            threshold: check_threshold(threshold)?,
        })
    }

    /// Build from a 0-100 percentage, as exposed by UI sliders.
    pub fn from_percent(percent: f32) -> Result<Self, InferError> {
        Self::new(percent / 100.0)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), InferError> {
        self.threshold = check_threshold(threshold)?;
        Ok(())
    }

    pub fn passes(&self, keypoint: &Keypoint) -> bool {
        keypoint.confidence >= self.threshold
    }
}
