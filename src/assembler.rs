use std::ops::Range;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::errors::SamplerError;
use crate::metrics::SamplingStats;
use crate::policy::NegativePolicy;
use crate::rejection::RejectionSampler;
use crate::shape::{EmittedRow, RowShape};
use crate::source::ConsumedSet;

/// Mixes positive rows with synthesized negatives.
///
/// One assembler serves every combination of negative policy and row shape.
#[derive(Clone, Copy, Debug)]
pub struct BatchAssembler {
    num_neg: usize,
}

impl BatchAssembler {
    /// Assembler emitting `num_neg` negatives per positive. `0` is rejected.
    pub fn new(num_neg: usize) -> Result<Self, SamplerError> {
        if num_neg == 0 {
            return Err(SamplerError::InvalidConfig(
                "num_neg must be a positive integer".into(),
            ));
        }
        Ok(Self { num_neg })
    }

    /// Negatives emitted per positive row.
    pub fn num_neg(&self) -> usize {
        self.num_neg
    }

    /// Materialize the whole split: every positive in order, followed by
    /// `num_neg` rejection-sampled negatives per positive (row-major). Not permuted.
    pub fn transform_full<S: RowShape, R: Rng + ?Sized>(
        &self,
        shape: &S,
        consumed: &ConsumedSet,
        rejection: &mut RejectionSampler,
        rng: &mut R,
    ) -> Result<S::Batch, SamplerError> {
        let total = shape.len();
        let mut rows: Vec<EmittedRow> = Vec::with_capacity(total * (self.num_neg + 1));
        rows.extend((0..total).map(EmittedRow::Positive));
        for source in 0..total {
            let user = shape.user(source);
            for item in rejection.sample_many(consumed, user, self.num_neg, rng)? {
                rows.push(EmittedRow::Negative { source, item });
            }
        }
        Ok(shape.assemble(&rows))
    }

    /// Assemble one cursor slice: each positive followed by its negatives,
    /// then one uniform permutation over all rows.
    ///
    /// All draws complete before anything is materialized, so an error leaves
    /// no partial batch behind.
    pub fn assemble_slice<S: RowShape, R: Rng + ?Sized>(
        &self,
        shape: &S,
        slice: Range<usize>,
        policy: &mut NegativePolicy<'_>,
        consumed: &ConsumedSet,
        rng: &mut R,
    ) -> Result<(S::Batch, SamplingStats), SamplerError> {
        let mut stats = SamplingStats::default();
        let mut rows: Vec<EmittedRow> = Vec::with_capacity(slice.len() * (self.num_neg + 1));
        for source in slice {
            rows.push(EmittedRow::Positive(source));
            let draw = policy.draw(consumed, shape.user(source), self.num_neg, rng)?;
            stats.positives += 1;
            if draw.pool_refilled {
                stats.pool_refills += 1;
            }
            rows.extend(
                draw.items
                    .into_iter()
                    .map(|item| EmittedRow::Negative { source, item }),
            );
        }
        rows.shuffle(rng);
        stats.negatives = rows.iter().filter(|row| row.is_negative()).count();
        if !rows.is_empty() {
            stats.batches = 1;
        }
        Ok((shape.assemble(&rows), stats))
    }
}
