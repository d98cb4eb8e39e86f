use crate::InferError;
use stance_base::{Tensor, Vec2};

/// The two model outputs for one frame, validated against the joint count.
///
/// Heatmaps are `[1, gridH, gridW, J]`. Offsets are `[1, gridH, gridW, 2J]` with the
/// y offset of joint `j` at channel `j` and the x offset at channel `j + J`.
#[derive(Debug, Clone, Copy)]
pub struct PoseOutputs<'a> {
    heatmaps: &'a Tensor<f32>,
    offsets: &'a Tensor<f32>,
    grid_height: usize,
    grid_width: usize,
    num_joints: usize,
}

/// Peak of one joint's heatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedJoint {
    /// Grid cell as (column, row).
    pub cell: Vec2<usize>,
    /// Sub-cell refinement in network input pixels.
    pub offset: Vec2<f32>,
    pub confidence: f32,
}

fn shape_error(expected: String, tensor: &Tensor<f32>) -> InferError {
    InferError::ShapeMismatch {
        expected,
        got: format!("{:?}", tensor.shape),
    }
}

impl<'a> PoseOutputs<'a> {
    pub fn new(
        heatmaps: &'a Tensor<f32>,
        offsets: &'a Tensor<f32>,
        num_joints: usize,
    ) -> Result<Self, InferError> {
        let Some([batch, grid_height, grid_width, channels]) = heatmaps.dims::<4>() else {
            return Err(shape_error(format!("heatmaps [1, H, W, {num_joints}]"), heatmaps));
        };
        if batch != 1 || channels != num_joints {
            return Err(shape_error(format!("heatmaps [1, H, W, {num_joints}]"), heatmaps));
        }
        // the stride computation divides by gridH - 1
        if grid_height < 2 || grid_width == 0 {
            return Err(shape_error(
                format!("heatmap grid of at least 2x1 cells for {num_joints} joints"),
                heatmaps,
            ));
        }
        if offsets.dims::<4>() != Some([1, grid_height, grid_width, 2 * num_joints]) {
            return Err(shape_error(
                format!("offsets [1, {grid_height}, {grid_width}, {}]", 2 * num_joints),
                offsets,
            ));
        }
        let cells = grid_height * grid_width;
        for (tensor, channels) in [(heatmaps, num_joints), (offsets, 2 * num_joints)] {
            if tensor.data.len() != cells * channels {
                return Err(InferError::ShapeMismatch {
                    expected: format!("{} values for shape {:?}", cells * channels, tensor.shape),
                    got: format!("{} values", tensor.data.len()),
                });
            }
        }

        Ok(Self {
            heatmaps,
            offsets,
            grid_height,
            grid_width,
            num_joints,
        })
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn num_joints(&self) -> usize {
        self.num_joints
    }

    /// Find the highest-scoring cell of `joint`'s heatmap.
    ///
    /// Only a strictly greater score replaces the current best, starting from 0,
    /// so ties keep the first cell in row-major order and an all-zero (or all
    /// negative) heatmap decodes to cell (0, 0) with confidence 0.
    ///
    /// Panics if `joint >= num_joints()`.
    pub fn decode_joint(&self, joint: usize) -> DecodedJoint {
        assert!(joint < self.num_joints, "joint {joint} out of range");

        let scores = &self.heatmaps.data;
        let stride = self.num_joints;
        let mut best = 0.0f32;
        let mut best_cell = 0;

        let cells = self.grid_height * self.grid_width;
        for cell in 0..cells {
            let score = scores[cell * stride + joint];
            if score > best {
                best = score;
                best_cell = cell;
            }
        }

        let base = best_cell * 2 * self.num_joints;
        let offset = Vec2::new(
            self.offsets.data[base + joint + self.num_joints],
            self.offsets.data[base + joint],
        );

        DecodedJoint {
            cell: Vec2::new(best_cell % self.grid_width, best_cell / self.grid_width),
            offset,
            confidence: best,
        }
    }
}
