use crate::InferError;
use serde::{Deserialize, Serialize};
use stance_base::Tensor;

/// ImageNet channel means used by ResNet backbones, in [0, 255].
pub const RESNET_MEAN: [f32; 3] = [123.15, 115.90, 103.06];

/// Pixel normalization expected by the model backbone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Scale [0, 255] to [-1, 1].
    #[default]
    MobileNet,
    /// Subtract the ImageNet channel means.
    ResNet,
}

impl Normalization {
    #[inline]
    fn apply(self, value: f32, channel: usize) -> f32 {
        match self {
            Normalization::MobileNet => value / 127.5 - 1.0,
            Normalization::ResNet => value - RESNET_MEAN[channel],
        }
    }
}

/// Prepare a frame for inference.
///
/// Takes an HWC image `[H, W, 3]` with values in [0, 255], resizes it with
/// nearest-neighbour sampling to `width` x `height` without preserving the aspect
/// ratio, and returns an NHWC tensor `[1, height, width, 3]`.
pub fn preprocess(
    image: &Tensor<f32>,
    width: usize,
    height: usize,
    normalization: Normalization,
) -> Result<Tensor<f32>, InferError> {
    let Some([src_h, src_w, channels]) = image.dims::<3>() else {
        return Err(InferError::ShapeMismatch {
            expected: "[H, W, 3]".to_string(),
            got: format!("{:?}", image.shape),
        });
    };
    if channels != 3 {
        return Err(InferError::ShapeMismatch {
            expected: "3 channels".to_string(),
            got: format!("{} channels", channels),
        });
    }
    if src_h == 0 || src_w == 0 || width == 0 || height == 0 {
        return Err(InferError::ShapeMismatch {
            expected: "non-empty image and target size".to_string(),
            got: format!("{src_w}x{src_h} -> {width}x{height}"),
        });
    }

    if image.data.len() != src_h * src_w * 3 {
        return Err(InferError::ShapeMismatch {
            expected: format!("{} values for shape {:?}", src_h * src_w * 3, image.shape),
            got: format!("{} values", image.data.len()),
        });
    }

    let scale_x = src_w as f32 / width as f32;
    let scale_y = src_h as f32 / height as f32;

    let mut data = Vec::with_capacity(height * width * 3);
    for out_y in 0..height {
        let src_y = ((out_y as f32 * scale_y) as usize).min(src_h - 1);
        for out_x in 0..width {
            let src_x = ((out_x as f32 * scale_x) as usize).min(src_w - 1);
            let src = (src_y * src_w + src_x) * 3;
            for ch in 0..3 {
                data.push(normalization.apply(image.data[src + ch], ch));
            }
        }
    }

    Ok(Tensor::new(vec![1, height, width, 3], data)?)
}
