use serde::{Deserialize, Serialize};

use crate::types::Label;

/// Running counters for a sampling session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingStats {
    /// Non-empty batches returned.
    pub batches: usize,
    pub positives: usize,
    pub negatives: usize,
    /// Pool rebuilds triggered by without-replacement draws.
    pub pool_refills: usize,
}

impl SamplingStats {
    pub(crate) fn record(&mut self, other: &SamplingStats) {
        self.batches += other.batches;
        self.positives += other.positives;
        self.negatives += other.negatives;
        self.pool_refills += other.pool_refills;
    }

    /// Negatives emitted per positive so far (`0.0` before any positive).
    pub fn negative_ratio(&self) -> f64 {
        if self.positives == 0 {
            0.0
        } else {
            self.negatives as f64 / self.positives as f64
        }
    }
}

/// Split of a label column into observed (non-zero) and negative rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelCounts {
    pub observed: usize,
    pub negative: usize,
}

/// Count non-zero and zero labels.
///
/// Observed rows whose dataset label is itself `0.0` are counted as negative.
pub fn label_counts(labels: &[Label]) -> LabelCounts {
    let negative = labels.iter().filter(|label| **label == 0.0).count();
    LabelCounts {
        observed: labels.len() - negative,
        negative,
    }
}
