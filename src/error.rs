// THEORY:
// Only genuinely exceptional conditions live here: malformed input matrices, bad
// configuration, undecodable files and worker failures. The "natural" outcomes of an
// analysis (an image too small to hold a block, or one with no block inside the
// calibrated range) are not errors and are reported as `Report` variants instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the concentration scanner.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid intensity matrix: {0}")]
    InvalidMatrix(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unsupported image format for {0} (expected jpg, jpeg, png or bmp)")]
    UnsupportedFormat(PathBuf),
    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Analysis worker failed: {0}")]
    Worker(String),
}

pub type ScanResult<T> = Result<T, ScanError>;
