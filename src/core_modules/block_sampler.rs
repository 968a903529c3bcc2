// THEORY:
// The block sampler performs the first transformation of the analysis: it slices the
// `GrayMatrix` into a spatially organised grid of `BlockView`s and reduces each one to
// its mean intensity.
//
// Key rules:
// 1.  **Fixed grid**: blocks start at (0, 0) and advance by `block_size` in both axes.
//     Only `floor(h / b) x floor(w / b)` whole blocks are produced. A remainder strip
//     narrower than a block is dropped rather than padded.
// 2.  **Row-major order**: top-to-bottom, left-to-right. Every later stage preserves this
//     order, so results are reproducible block-for-block.
// 3.  **Stateless**: the sampler has no memory. An undersized matrix (or a zero block
//     size) simply yields an empty grid.

use crate::core_modules::block::block::{BlockView, SampledBlock};
use crate::core_modules::gray_matrix::GrayMatrix;

/// Dimensions of the sampling grid, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    pub fn for_matrix(matrix: &GrayMatrix, block_size: u32) -> Self {
        if block_size == 0 {
            return Self {
                columns: 0,
                rows: 0,
            };
        }
        Self {
            columns: matrix.width() / block_size,
            rows: matrix.height() / block_size,
        }
    }

    pub fn block_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Samples every whole block of the matrix, in row-major order.
pub fn sample(matrix: &GrayMatrix, block_size: u32) -> Vec<SampledBlock> {
    let shape = GridShape::for_matrix(matrix, block_size);
    let mut samples = Vec::with_capacity(shape.block_count());

    for block_index in 0..shape.block_count() {
        let block_y = (block_index / shape.columns as usize) as u32;
        let block_x = (block_index % shape.columns as usize) as u32;

        if let Some(view) = BlockView::new(
            matrix,
            block_x * block_size,
            block_y * block_size,
            block_size,
        ) {
            samples.push(view.sample());
        }
    }

    samples
}
