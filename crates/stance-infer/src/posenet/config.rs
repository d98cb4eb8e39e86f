use super::preprocess::Normalization;
use crate::InferError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables of the pose pipeline.
///
/// Built with `PoseConfig::default().with_*()` or read from JSON, where every
/// field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoseConfig {
    input_width: usize,
    input_height: usize,
    input_name: Option<String>,
    heatmap_output: String,
    offset_output: String,
    normalization: Normalization,
    filter_window: usize,
    confidence_threshold: f32,
    line_width: f32,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            input_width: 360,
            input_height: 360,
            input_name: None,
            heatmap_output: "float_heatmaps".to_string(),
            offset_output: "float_short_offsets".to_string(),
            normalization: Normalization::MobileNet,
            filter_window: 0,
            confidence_threshold: 0.0,
            line_width: 5.0,
        }
    }
}

impl PoseConfig {
    pub fn from_json(json: &str) -> Result<Self, InferError> {
        let config: PoseConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), InferError> {
        if self.input_width < 2 || self.input_height < 2 {
            return Err(InferError::Config(format!(
                "network input {}x{} is too small",
                self.input_width, self.input_height
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(InferError::Config(format!(
                "confidence threshold {} outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            return Err(InferError::Config(format!(
                "line width {} must be positive",
                self.line_width
            )));
        }
        if self.heatmap_output == self.offset_output {
            return Err(InferError::Config(format!(
                "heatmap and offset outputs are both '{}'",
                self.heatmap_output
            )));
        }
        Ok(())
    }

    /// Set the network input size in pixels.
    pub fn with_input_size(mut self, width: usize, height: usize) -> Self {
        self.input_width = width;
        self.input_height = height;
        self
    }

    /// Name of the model input to feed; the first input when unset.
    pub fn with_input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    pub fn with_heatmap_output(mut self, name: impl Into<String>) -> Self {
        self.heatmap_output = name.into();
        self
    }

    pub fn with_offset_output(mut self, name: impl Into<String>) -> Self {
        self.offset_output = name.into();
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Moving-average window in frames, 0 to disable smoothing.
    pub fn with_filter_window(mut self, window: usize) -> Self {
        self.filter_window = window;
        self
    }

    /// Minimum confidence in [0, 1] for a joint to be drawn.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Same as `with_confidence_threshold`, on a 0-100 scale.
    pub fn with_confidence_percent(self, percent: f32) -> Self {
        self.with_confidence_threshold(percent / 100.0)
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    // Getters
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn input_height(&self) -> usize {
        self.input_height
    }

    pub fn input_name(&self) -> Option<&str> {
        self.input_name.as_deref()
    }

    pub fn heatmap_output(&self) -> &str {
        &self.heatmap_output
    }

    pub fn offset_output(&self) -> &str {
        &self.offset_output
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn filter_window(&self) -> usize {
        self.filter_window
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }
}
