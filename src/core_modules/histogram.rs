//! Histogram of rounded block concentrations.
//!
//! Two series share one set of equal-width edges: every valid block, and the blocks
//! inside the selected band. Sharing edges keeps the in-band counts a per-bin subset of
//! the overall counts, which is what a plotting front end needs to overlay them.

use serde::Serialize;

/// Default number of bins.
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Binned concentration counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationHistogram {
    /// `bins + 1` ascending edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    /// Counts over every valid block.
    pub all: Vec<usize>,
    /// Counts over the blocks inside the band.
    pub in_band: Vec<usize>,
}

impl ConcentrationHistogram {
    /// Bins `all` and `in_band` over the range of `all`.
    ///
    /// A degenerate range (every value equal) is widened to `[v - 0.5, v + 0.5]`, and an
    /// empty `all` falls back to `[0, 1]`.
    pub fn build(all: &[f64], in_band: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (low, high) = value_range(all);
        let width = (high - low) / bins as f64;
        let edges = (0..=bins).map(|i| low + width * i as f64).collect();

        Self {
            edges,
            all: count(all, low, high, bins),
            in_band: count(in_band, low, high, bins),
        }
    }

    pub fn bins(&self) -> usize {
        self.all.len()
    }

    /// The bin holding the most blocks overall (first on ties).
    pub fn peak_bin(&self) -> Option<usize> {
        let max = *self.all.iter().max()?;
        if max == 0 {
            return None;
        }
        self.all.iter().position(|&c| c == max)
    }

    /// Lower and upper edge of the peak bin.
    pub fn peak_interval(&self) -> Option<(f64, f64)> {
        let bin = self.peak_bin()?;
        Some((*self.edges.get(bin)?, *self.edges.get(bin + 1)?))
    }
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return (0.0, 1.0);
    };
    let (low, high) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if low == high {
        (low - 0.5, high + 0.5)
    } else {
        (low, high)
    }
}

fn count(values: &[f64], low: f64, high: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let span = high - low;
    for &value in values {
        if !(low..=high).contains(&value) {
            continue;
        }
        let bin = (((value - low) / span) * bins as f64) as usize;
        counts[bin.min(bins - 1)] += 1;
    }
    counts
}
