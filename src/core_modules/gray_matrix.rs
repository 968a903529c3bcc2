// THEORY:
// `GrayMatrix` is the Image Matrix of the analysis: a row-major grid of gray
// intensities that the sampler reads and never mutates. It is the hand-off point
// between decoding (RGB images of any supported format) and the block core, so it
// validates its shape once at construction and exposes only read access afterwards.
//
// Grayscale conversion follows the ITU-R 601-2 luma transform in 16-bit fixed point,
// so that an 8-bit RGB image produces the same integer gray levels as common imaging
// toolkits' "L" conversion. Intensities are stored as `f64` because callers (and tests)
// may hand in already-averaged or synthetic non-integer levels.

use crate::error::{ScanError, ScanResult};
use image::RgbImage;

/// An immutable 2D grid of gray intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayMatrix {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl GrayMatrix {
    /// Builds a matrix from a flat row-major buffer.
    pub fn new(width: u32, height: u32, data: Vec<f64>) -> ScanResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ScanError::InvalidMatrix(format!(
                "expected {} intensities for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ScanError::InvalidMatrix(format!(
                "intensities must be finite and non-negative, found {}",
                bad
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a matrix from a list of rows. All rows must share the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> ScanResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.len()) as u32;
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() as u32 != width)
        {
            return Err(ScanError::InvalidMatrix(format!(
                "row {} has {} columns, expected {}",
                index,
                row.len(),
                width
            )));
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// A matrix where every cell holds `value`.
    pub fn uniform(width: u32, height: u32, value: f64) -> ScanResult<Self> {
        Self::new(width, height, vec![value; width as usize * height as usize])
    }

    /// Converts an RGB image to gray with the fixed-point Rec. 601 luma transform.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image
            .pixels()
            .map(|pixel| luma_601(pixel[0], pixel[1], pixel[2]) as f64)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// A full row of intensities, left to right.
    pub fn row(&self, y: u32) -> &[f64] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }
}

/// L = R * 299/1000 + G * 587/1000 + B * 114/1000, rounded, in 16-bit fixed point.
fn luma_601(red: u8, green: u8, blue: u8) -> u8 {
    let weighted = red as u32 * 19595 + green as u32 * 38470 + blue as u32 * 7471 + 0x8000;
    (weighted >> 16) as u8
}
