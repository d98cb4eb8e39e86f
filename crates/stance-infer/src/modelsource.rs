use std::path::PathBuf;

/// Where the inference engine reads the model graph from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    File(PathBuf),
    Memory(Vec<u8>),
}
