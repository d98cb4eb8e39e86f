use crate::Device;
use std::fmt;

#[derive(Debug)]
pub enum InferError {
    /// A tensor does not have the layout the pipeline was configured for.
    ShapeMismatch { expected: String, got: String },
    /// Invalid or inconsistent configuration.
    Config(String),
    ModelLoad(String),
    BackendError(String),
    InvalidInput {
        name: String,
        expected_names: Vec<String>,
    },
    /// A named output layer is not produced by the model.
    MissingOutput {
        name: String,
        available: Vec<String>,
    },
    UnsupportedDevice(Device),
    UnsupportedDtype(String),
    Io(String),
    Json(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferError::ShapeMismatch { expected, got } => {
                write!(f, "shape mismatch: expected {expected}, got {got}")
            }
            InferError::Config(msg) => write!(f, "configuration error: {msg}"),
            InferError::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            InferError::BackendError(msg) => write!(f, "backend error: {msg}"),
            InferError::InvalidInput {
                name,
                expected_names,
            } => write!(f, "invalid input '{name}', model expects {expected_names:?}"),
            InferError::MissingOutput { name, available } => {
                write!(f, "model has no output '{name}', available: {available:?}")
            }
            InferError::UnsupportedDevice(device) => write!(f, "unsupported device: {device}"),
            InferError::UnsupportedDtype(msg) => write!(f, "unsupported dtype: {msg}"),
            InferError::Io(msg) => write!(f, "io error: {msg}"),
            InferError::Json(msg) => write!(f, "json error: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}

impl From<std::io::Error> for InferError {
    fn from(err: std::io::Error) -> Self {
        InferError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for InferError {
    fn from(err: serde_json::Error) -> Self {
        InferError::Json(err.to_string())
    }
}

impl From<stance_base::TensorError> for InferError {
    fn from(err: stance_base::TensorError) -> Self {
        InferError::ShapeMismatch {
            expected: "data length matching shape".to_string(),
            got: err.to_string(),
        }
    }
}
