// THEORY:
// A block is a square, non-overlapping window onto the `GrayMatrix`. It is the unit of
// regional analysis: averaging a whole block cancels single-pixel noise and sensor
// artifacts, so the calibration is only ever applied to spatially coherent intensities.
//
// Two shapes of data live here:
// 1.  `BlockView` borrows the matrix and knows how to summarise itself (its mean). It
//     never copies pixels.
// 2.  `SampledBlock` and `BlockRecord` are the owned, immutable results. A `BlockRecord`
//     can only be created through a checked constructor, so a record with a
//     concentration outside [0, 1] never exists.

pub mod block {
    use crate::core_modules::gray_matrix::GrayMatrix;
    use serde::Serialize;

    /// The default edge length of a block, in pixels.
    pub const DEFAULT_BLOCK_SIZE: u32 = 16;

    /// A borrowed square window onto a `GrayMatrix`.
    pub struct BlockView<'a> {
        matrix: &'a GrayMatrix,
        /// Column of the top-left pixel.
        pub x: u32,
        /// Row of the top-left pixel.
        pub y: u32,
        /// Edge length in pixels.
        pub size: u32,
    }

    impl<'a> BlockView<'a> {
        /// Returns `None` when the window would extend past the matrix.
        pub fn new(matrix: &'a GrayMatrix, x: u32, y: u32, size: u32) -> Option<Self> {
            let fits_x = x.checked_add(size).is_some_and(|end| end <= matrix.width());
            let fits_y = y.checked_add(size).is_some_and(|end| end <= matrix.height());
            if size == 0 || !fits_x || !fits_y {
                return None;
            }
            Some(Self { matrix, x, y, size })
        }

        /// Arithmetic mean of every intensity inside the block.
        ///
        /// Rows are summed pairwise and the row sums are combined pairwise again, which keeps
        /// rounding error at O(log n) and makes uniform power-of-two blocks average exactly.
        pub fn mean_intensity(&self) -> f64 {
            let count = self.size as f64 * self.size as f64;
            self.rows_sum(self.y, self.size) / count
        }

        /// Pairwise sum over `rows` rows starting at `first`, split the same way as
        /// `pairwise_sum` so no buffer of row sums is needed.
        fn rows_sum(&self, first: u32, rows: u32) -> f64 {
            match rows {
                0 => 0.0,
                1 => {
                    let start = self.x as usize;
                    pairwise_sum(&self.matrix.row(first)[start..start + self.size as usize])
                }
                _ => {
                    let half = rows / 2;
                    self.rows_sum(first, half) + self.rows_sum(first + half, rows - half)
                }
            }
        }

        pub fn sample(&self) -> SampledBlock {
            SampledBlock {
                x: self.x,
                y: self.y,
                size: self.size,
                mean_intensity: self.mean_intensity(),
            }
        }
    }

    fn pairwise_sum(values: &[f64]) -> f64 {
        match values.len() {
            0 => 0.0,
            1 => values[0],
            len => {
                let (left, right) = values.split_at(len / 2);
                pairwise_sum(left) + pairwise_sum(right)
            }
        }
    }

    /// The summary of one grid cell as produced by the sampler.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct SampledBlock {
        pub x: u32,
        pub y: u32,
        pub size: u32,
        pub mean_intensity: f64,
    }

    /// A block whose calibrated concentration lies inside [0, 1].
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct BlockRecord {
        x: u32,
        y: u32,
        mean_intensity: f64,
        concentration: f64,
    }

    impl BlockRecord {
        /// Creates a record, or `None` if `concentration` is outside [0, 1] (or NaN).
        pub fn new(x: u32, y: u32, mean_intensity: f64, concentration: f64) -> Option<Self> {
            if !(0.0..=1.0).contains(&concentration) {
                return None;
            }
            Some(Self {
                x,
                y,
                mean_intensity,
                // -0.0 + 0.0 == +0.0
                concentration: concentration + 0.0,
            })
        }

        pub fn x(&self) -> u32 {
            self.x
        }

        pub fn y(&self) -> u32 {
            self.y
        }

        pub fn mean_intensity(&self) -> f64 {
            self.mean_intensity
        }

        pub fn concentration(&self) -> f64 {
            self.concentration
        }
    }
}
