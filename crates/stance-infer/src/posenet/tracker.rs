use super::config::PoseConfig;
use super::decoder::PoseDecoder;
use super::heatmap::PoseOutputs;
use super::mapper::quantized_stride;
use super::preprocess::preprocess;
use super::types::{PoseFrame, RenderSink, JOINT_COUNT};
use crate::{Backend, InferError, ModelSource, Session};
use stance_base::Tensor;
use std::collections::HashMap;

/// Single-person pose tracking over a video stream.
///
/// Each call to [`track`](Self::track) runs one synchronous inference and one
/// decode; frames are never overlapped. The inference session is released when
/// the tracker is dropped.
pub struct PoseTracker {
    session: Box<dyn Session>,
    config: PoseConfig,
    input_name: String,
    decoder: PoseDecoder,
}

fn find_output<'a>(
    outputs: &'a HashMap<String, Tensor<f32>>,
    name: &str,
) -> Result<&'a Tensor<f32>, InferError> {
    outputs.get(name).ok_or_else(|| InferError::MissingOutput {
        name: name.to_string(),
        available: outputs.keys().cloned().collect(),
    })
}

impl PoseTracker {
    /// Load `model` with `backend` and validate it against `config`.
    pub fn new(
        model: ModelSource,
        backend: &dyn Backend,
        config: PoseConfig,
    ) -> Result<Self, InferError> {
        log::info!("loading pose model with {} backend", backend.name());
        let session = backend.load_model(model)?;
        Self::with_session(session, config)
    }

    /// Wrap an already loaded session.
    ///
    /// Resolves the input and output layer names, then runs one blank frame
    /// through the model to check that both outputs carry [`JOINT_COUNT`] joints
    /// on a usable grid. Any mismatch is returned here rather than per frame.
    pub fn with_session(
        mut session: Box<dyn Session>,
        config: PoseConfig,
    ) -> Result<Self, InferError> {
        let decoder = PoseDecoder::new(&config)?;

        let input_name = match config.input_name() {
            Some(name) if session.input_names().iter().any(|n| n == name) => name.to_string(),
            Some(name) => {
                return Err(InferError::InvalidInput {
                    name: name.to_string(),
                    expected_names: session.input_names().to_vec(),
                });
            }
            None => session
                .input_names()
                .first()
                .ok_or_else(|| InferError::BackendError("model has no inputs".to_string()))?
                .clone(),
        };

        for name in [config.heatmap_output(), config.offset_output()] {
            if !session.output_names().iter().any(|n| n == name) {
                return Err(InferError::MissingOutput {
                    name: name.to_string(),
                    available: session.output_names().to_vec(),
                });
            }
        }

        let probe = Tensor::<f32>::zeros(vec![1, config.input_height(), config.input_width(), 3])?;
        let outputs = session.run(&[(input_name.as_str(), probe)])?;
        let validated = PoseOutputs::new(
            find_output(&outputs, config.heatmap_output())?,
            find_output(&outputs, config.offset_output())?,
            JOINT_COUNT,
        )?;
        let stride = quantized_stride(config.input_height(), validated.grid_height());
        if stride == 0 {
            return Err(InferError::Config(format!(
                "grid height {} gives a zero stride for input height {}",
                validated.grid_height(),
                config.input_height()
            )));
        }

        log::info!(
            "pose tracker ready: input '{}' {}x{}, grid {}x{}, stride {}, window {}, threshold {}",
            input_name,
            config.input_width(),
            config.input_height(),
            validated.grid_width(),
            validated.grid_height(),
            stride,
            config.filter_window(),
            config.confidence_threshold()
        );

        Ok(Self {
            session,
            config,
            input_name,
            decoder,
        })
    }

    pub fn config(&self) -> &PoseConfig {
        &self.config
    }

    pub fn decoder(&self) -> &PoseDecoder {
        &self.decoder
    }

    /// Result of the last successful frame.
    pub fn frame(&self) -> &PoseFrame {
        self.decoder.frame()
    }

    /// Estimate the pose in one frame.
    ///
    /// `image` is `[H, W, 3]` with values in [0, 255]. If preprocessing,
    /// inference or decoding fails the error is returned and the smoothing
    /// history is left untouched.
    pub fn track(&mut self, image: &Tensor<f32>) -> Result<&PoseFrame, InferError> {
        if let Err(err) = self.run_frame(image) {
            log::warn!("frame dropped: {}", err);
            return Err(err);
        }
        Ok(self.decoder.frame())
    }

    fn run_frame(&mut self, image: &Tensor<f32>) -> Result<(), InferError> {
        let Some([source_height, source_width, _]) = image.dims::<3>() else {
            return Err(InferError::ShapeMismatch {
                expected: "[H, W, 3]".to_string(),
                got: format!("{:?}", image.shape),
            });
        };

        let input = preprocess(
            image,
            self.config.input_width(),
            self.config.input_height(),
            self.config.normalization(),
        )?;
        let outputs = self.session.run(&[(self.input_name.as_str(), input)])?;
        let pose_outputs = PoseOutputs::new(
            find_output(&outputs, self.config.heatmap_output())?,
            find_output(&outputs, self.config.offset_output())?,
            JOINT_COUNT,
        )?;

        self.decoder.decode(&pose_outputs, source_width, source_height)?;
        Ok(())
    }

    /// Replay the last frame's draw requests into `sink`.
    pub fn render<S: RenderSink + ?Sized>(&self, sink: &mut S) {
        for segment in &self.decoder.frame().segments {
            sink.draw_segment(segment);
        }
    }

    /// Clear the smoothing history. Call on seek or restart.
    pub fn reset(&mut self) {
        log::info!("pose tracker reset");
        self.decoder.reset();
    }

    pub fn filter_window(&self) -> usize {
        self.decoder.smoother().window()
    }

    pub fn set_filter_window(&mut self, window: usize) {
        log::debug!("filter window {} -> {}", self.filter_window(), window);
        self.decoder.set_filter_window(window);
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.decoder.gate().threshold()
    }

    pub fn set_confidence_threshold(&mut self, threshold: f32) -> Result<(), InferError> {
        self.decoder.set_confidence_threshold(threshold)?;
        log::debug!("confidence threshold set to {}", threshold);
        Ok(())
    }

    /// Set the threshold on a 0-100 scale.
    pub fn set_confidence_percent(&mut self, percent: f32) -> Result<(), InferError> {
        self.set_confidence_threshold(percent / 100.0)
    }
}
