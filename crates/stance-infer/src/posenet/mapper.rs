use super::heatmap::DecodedJoint;
use crate::InferError;
use stance_base::Vec2;

/// Network output strides are floored to a multiple of this many pixels.
pub const STRIDE_QUANTUM: usize = 8;

/// Maps decoded grid cells to source-frame pixels.
///
/// The frame was squeezed to a square `input_height` x `input_height` network
/// input, so x is stretched back by the frame's aspect ratio. y is measured from
/// the bottom of the network input before scaling. Results are not clamped to the
/// frame; offsets can push joints slightly outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    input_height: usize,
    stride: usize,
    scale: f32,
    aspect: f32,
}

/// Network output stride for a given input and grid height, floored to a
/// multiple of [`STRIDE_QUANTUM`].
///
/// Returns 0 when `input_height` is 0 or the grid has fewer than 2 rows.
pub fn quantized_stride(input_height: usize, grid_height: usize) -> usize {
    if input_height == 0 || grid_height < 2 {
        return 0;
    }
    let stride = (input_height - 1) / (grid_height - 1);
    stride - stride % STRIDE_QUANTUM
}

impl CoordinateMapper {
    pub fn new(
        input_height: usize,
        grid_height: usize,
        source_width: usize,
        source_height: usize,
    ) -> Result<Self, InferError> {
        if input_height < 2 || grid_height < 2 {
            return Err(InferError::Config(format!(
                "input height {input_height} and grid height {grid_height} must both be at least 2"
            )));
        }
        if source_width == 0 || source_height == 0 {
            return Err(InferError::ShapeMismatch {
                expected: "non-empty source frame".to_string(),
                got: format!("{source_width}x{source_height}"),
            });
        }

        Ok(Self {
            input_height,
            stride: quantized_stride(input_height, grid_height),
            scale: source_height as f32 / input_height as f32,
            aspect: source_width as f32 / source_height as f32,
        })
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Source-frame position of a grid cell refined by `offset`.
    pub fn map(&self, cell: Vec2<usize>, offset: Vec2<f32>) -> Vec2<f32> {
        let stride = self.stride as f32;
        let x = (cell.x as f32 * stride + offset.x) * self.scale * self.aspect;
        let y = (self.input_height as f32 - (cell.y as f32 * stride + offset.y)) * self.scale;
        Vec2::new(x, y)
    }

    pub fn map_joint(&self, joint: &DecodedJoint) -> Vec2<f32> {
        self.map(joint.cell, joint.offset)
    }
}
