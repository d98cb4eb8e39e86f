//! Still-image frame source for the pose pipeline.
//!
//! Frames are decoded into `Tensor<u8>` with HWC layout `[height, width, 3]`,
//! whatever the pixel format of the file.

pub mod error;

pub use error::ImageError;

use stance_base::Tensor;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions accepted by [`list_frames`], lowercase.
pub const FRAME_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "webp"];

/// Decodes an encoded image into an RGB tensor `[height, width, 3]`.
///
/// The format is auto-detected. Grayscale, alpha and 16-bit images are converted
/// to 8-bit RGB; alpha is dropped.
pub fn decode_rgb(data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    let rgb = image::load_from_memory(data)?.into_rgb8();
    let (width, height) = rgb.dimensions();
    let tensor = Tensor::new(vec![height as usize, width as usize, 3], rgb.into_raw())?;
    Ok(tensor)
}

/// Reads and decodes one frame from disk.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<Tensor<u8>, ImageError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ImageError::Io(format!("{}: {e}", path.display())))?;
    decode_rgb(&bytes)
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by file name.
///
/// Frame order is the lexical order of the names, so sequences should be
/// zero-padded (`frame_0001.jpg`).
pub fn list_frames(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ImageError> {
    let mut frames = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && is_frame_file(&path) {
            frames.push(path);
        }
    }
    frames.sort();
    log::debug!("found {} frames in {}", frames.len(), dir.as_ref().display());
    Ok(frames)
}
