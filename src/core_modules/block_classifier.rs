// THEORY:
// The classifier decides which sampled blocks are chemically meaningful. Each block's
// mean intensity is pushed through the `Calibration`; blocks whose concentration lands
// inside [0, 1] become `BlockRecord`s and everything else is dropped.
//
// Dropping is not an error. Highlights, shadows and background routinely fall outside the
// calibrated working range, and excluding them is the whole point of this stage. An empty
// output is a legitimate "no valid region" outcome that the pipeline reports as data.

use crate::core_modules::block::block::{BlockRecord, SampledBlock};
use crate::core_modules::calibration::Calibration;
use tracing::debug;

/// Calibrates each sampled block and keeps those inside [0, 1], preserving sampler order.
pub fn classify(samples: &[SampledBlock], calibration: &Calibration) -> Vec<BlockRecord> {
    let records: Vec<BlockRecord> = samples
        .iter()
        .filter_map(|block| {
            let concentration = calibration.concentration(block.mean_intensity);
            BlockRecord::new(block.x, block.y, block.mean_intensity, concentration)
        })
        .collect();

    debug!(
        sampled = samples.len(),
        retained = records.len(),
        discarded = samples.len() - records.len(),
        "classified blocks"
    );

    records
}
