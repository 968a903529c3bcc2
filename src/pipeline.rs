// THEORY:
// The `pipeline` module is the top-level API of the concentration engine. It bundles the
// block stages behind one call so that a consumer hands in a `GrayMatrix` and gets back
// a `Report` describing the dominant concentration band, or why there is none.
//
// All tunables are explicit in `PipelineConfig` and validated once, when the pipeline is
// built. After that the pipeline is immutable and `analyze` is a pure function of its
// input, which makes it safe to share across threads (see `batch`).

use crate::core_modules::band_selector::{
    DEFAULT_ROUNDING_DECIMALS, MAX_ROUNDING_DECIMALS, band_selector, round_concentration,
};
use crate::core_modules::block::block::DEFAULT_BLOCK_SIZE;
use crate::core_modules::block_classifier::classify;
use crate::core_modules::block_sampler::sample;
use crate::core_modules::histogram::{ConcentrationHistogram, DEFAULT_HISTOGRAM_BINS};
use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

// Re-export key data structures for the public API.
pub use crate::core_modules::band_selector::{Band, BandMode, BandSelection};
pub use crate::core_modules::block::block::BlockRecord;
pub use crate::core_modules::calibration::Calibration;
pub use crate::core_modules::gray_matrix::GrayMatrix;

/// Configuration for the ConcentrationPipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Edge length of a sampling block, in pixels.
    pub block_size: u32,
    pub calibration: Calibration,
    pub band_mode: BandMode,
    /// Decimal places used for mode and band membership.
    pub rounding_decimals: u32,
    /// Bin count of the report histogram. Informational only.
    pub histogram_bins: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            calibration: Calibration::default(),
            band_mode: BandMode::default(),
            rounding_decimals: DEFAULT_ROUNDING_DECIMALS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> ScanResult<()> {
        if self.block_size == 0 {
            return Err(ScanError::InvalidConfig(
                "block_size must be at least 1".to_string(),
            ));
        }
        if self.rounding_decimals > MAX_ROUNDING_DECIMALS {
            return Err(ScanError::InvalidConfig(format!(
                "rounding_decimals must be at most {}, got {}",
                MAX_ROUNDING_DECIMALS, self.rounding_decimals
            )));
        }
        if self.histogram_bins == 0 {
            return Err(ScanError::InvalidConfig(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        self.calibration.validate()
    }
}

/// The detailed data package for an image with a valid region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionData {
    /// How many whole blocks the sampler produced.
    pub sampled_blocks: usize,
    /// Every block inside the calibrated range, in row-major order.
    pub records: Vec<BlockRecord>,
    pub selection: BandSelection,
    pub histogram: ConcentrationHistogram,
}

impl RegionData {
    pub fn band(&self) -> Band {
        self.selection.band
    }

    /// The blocks to highlight.
    pub fn highlighted(&self) -> &[BlockRecord] {
        &self.selection.subset
    }

    /// One-line human summary, concentrations as percentages.
    pub fn summary(&self) -> String {
        format!(
            "Salicylic acid concentration range: {:.2}% ~ {:.2}%, {} blocks",
            self.selection.band.lower * 100.0,
            self.selection.band.upper * 100.0,
            self.selection.subset.len()
        )
    }
}

/// The primary output of the pipeline for a single image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Report {
    /// The image is smaller than one block in at least one dimension.
    NoBlocks,
    /// Blocks were sampled but none calibrated into [0, 1].
    NoValidRegion { sampled_blocks: usize },
    Region(RegionData),
}

impl Report {
    pub fn region(&self) -> Option<&RegionData> {
        match self {
            Report::Region(data) => Some(data),
            _ => None,
        }
    }
}

/// The main, top-level struct for the concentration engine.
#[derive(Debug, Clone)]
pub struct ConcentrationPipeline {
    config: PipelineConfig,
}

impl ConcentrationPipeline {
    pub fn new(config: PipelineConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analyze(&self, matrix: &GrayMatrix) -> Report {
        // Stage 1: Block sampling
        let samples = sample(matrix, self.config.block_size);
        if samples.is_empty() {
            debug!(
                width = matrix.width(),
                height = matrix.height(),
                block_size = self.config.block_size,
                "image smaller than one block"
            );
            return Report::NoBlocks;
        }

        // Stage 2: Calibration and filtering
        let records = classify(&samples, &self.config.calibration);

        // Stage 3: Dominant band
        let Some(selection) = band_selector::select_band(
            &records,
            self.config.band_mode,
            self.config.rounding_decimals,
        ) else {
            return Report::NoValidRegion {
                sampled_blocks: samples.len(),
            };
        };

        // Stage 4: Histogram over rounded values
        let decimals = self.config.rounding_decimals;
        let all: Vec<f64> = records
            .iter()
            .map(|r| round_concentration(r.concentration(), decimals))
            .collect();
        let in_band: Vec<f64> = selection
            .subset
            .iter()
            .map(|r| round_concentration(r.concentration(), decimals))
            .collect();
        let histogram = ConcentrationHistogram::build(&all, &in_band, self.config.histogram_bins);

        debug!(
            lower = selection.band.lower,
            upper = selection.band.upper,
            highlighted = selection.subset.len(),
            "selected band"
        );

        Report::Region(RegionData {
            sampled_blocks: samples.len(),
            records,
            selection,
            histogram,
        })
    }
}
