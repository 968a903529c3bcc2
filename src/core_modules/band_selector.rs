// THEORY:
// The band selector turns the list of valid blocks into a "region of interest": the
// concentration band that dominates the image.
//
// Algorithm:
// 1.  **Rounding**: every concentration is rounded to a fixed number of decimals (3 by
//     default). Rounding is part of the contract, not a display detail. It decides which
//     blocks tie for "most common". Values are keyed by the integer `round(c * 10^d)` so
//     counting and band membership are exact integer comparisons.
// 2.  **Mode**: the rounded value with the highest count. Counts are kept in insertion
//     order, and on a tie the value that appeared first in block order wins. This keeps
//     the result reproducible for identical images.
// 3.  **Band**: in `Range` mode the band runs from the mode up to the maximum rounded
//     concentration. In `Single` mode it collapses to the mode alone.
// 4.  **Subset**: the records whose rounded concentration falls inside the band, in their
//     original order. These are the blocks a caller highlights.
// 5.  **Stateless Utility**: an empty record list has no mode. The selector returns `None`
//     ("no band") instead of inventing one.

use crate::core_modules::block::block::BlockRecord;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Decimal places used when rounding concentrations for mode and band membership.
pub const DEFAULT_ROUNDING_DECIMALS: u32 = 3;
/// Largest precision the integer keying supports without overflow concerns.
pub const MAX_ROUNDING_DECIMALS: u32 = 12;

/// Which blocks count as the region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandMode {
    /// From the most common concentration up to the highest one.
    #[default]
    Range,
    /// Only blocks at exactly the most common concentration.
    Single,
}

/// An inclusive concentration interval, `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub fn contains(&self, concentration: f64) -> bool {
        self.lower <= concentration && concentration <= self.upper
    }
}

/// The outcome of a successful band selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSelection {
    pub band: Band,
    /// The most common rounded concentration.
    pub mode: f64,
    /// How many records share the mode.
    pub mode_count: usize,
    /// The highest rounded concentration.
    pub max: f64,
    /// Records inside the band, in block order.
    pub subset: Vec<BlockRecord>,
}

/// Rounds `value` to `decimals` places (half away from zero).
pub fn round_concentration(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

pub mod band_selector {
    use super::*; // Make types from the parent module available.

    fn rounded_key(concentration: f64, factor: f64) -> i64 {
        (concentration * factor).round() as i64
    }

    /// Selects the dominant concentration band, or `None` when there are no records.
    pub fn select_band(
        records: &[BlockRecord],
        mode: BandMode,
        decimals: u32,
    ) -> Option<BandSelection> {
        let factor = 10f64.powi(decimals.min(MAX_ROUNDING_DECIMALS) as i32);
        let keys: Vec<i64> = records
            .iter()
            .map(|record| rounded_key(record.concentration(), factor))
            .collect();

        // --- 1. Frequency multiset, first-seen order ---
        let mut counts: IndexMap<i64, usize> = IndexMap::new();
        for &key in &keys {
            *counts.entry(key).or_insert(0) += 1;
        }

        // --- 2. Mode with first-encountered tie-break ---
        // Only a strictly greater count replaces the current best.
        let mut best: Option<(i64, usize)> = None;
        for (&key, &count) in &counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((key, count)),
            }
        }
        let (mode_key, mode_count) = best?;
        let max_key = keys.iter().copied().max()?;

        // --- 3. Band boundaries ---
        let (lower_key, upper_key) = match mode {
            BandMode::Range => (mode_key, max_key),
            BandMode::Single => (mode_key, mode_key),
        };
        let band = Band {
            lower: lower_key as f64 / factor,
            upper: upper_key as f64 / factor,
        };

        // --- 4. Subset ---
        // Keys and bounds go through the same division, so membership stays exact.
        let subset: Vec<BlockRecord> = records
            .iter()
            .zip(&keys)
            .filter(|(_, key)| band.contains(**key as f64 / factor))
            .map(|(record, _)| *record)
            .collect();

        Some(BandSelection {
            band,
            mode: mode_key as f64 / factor,
            mode_count,
            max: max_key as f64 / factor,
            subset,
        })
    }
}
