//! Pairwise (BPR-style) sampling.
//!
//! Every protocol pairs an observed `(user, item_i)` training row with one
//! negative `item_j` drawn by rejection sampling, so `item_j` is never in the
//! user's consumed set. Margins are computed only when a scorer is supplied.

use rand::Rng;

use crate::config::PairwiseConfig;
use crate::constants::sampler::{NEGATIVE_LABEL, PAIRWISE_SEED_OFFSET};
use crate::cursor::Cursor;
use crate::data::{InteractionBatch, KnnPair, Mode, PairwiseBatch, PairwiseSample};
use crate::errors::SamplerError;
use crate::rejection::RejectionSampler;
use crate::rng::DeterministicRng;
use crate::scoring::{PairScorer, SimilarityMatrix};
use crate::source::InteractionSource;

/// Result of [`PairwiseSampler::next_pair`].
#[derive(Clone, Debug, PartialEq)]
pub enum PairwiseOutput {
    /// Bootstrap or single-row protocol.
    Pair(PairwiseSample),
    /// Multi-row protocol.
    Batch(PairwiseBatch),
    /// The cursor ran past the end of the training split.
    Exhausted,
}

/// Pairwise sampler over the training split.
pub struct PairwiseSampler<'a, S: InteractionSource + ?Sized> {
    source: &'a S,
    config: PairwiseConfig,
    cursor: Cursor,
    rng: DeterministicRng,
    rejection: RejectionSampler,
}

impl<'a, S: InteractionSource + ?Sized> PairwiseSampler<'a, S> {
    /// Validate `config` and position the cursor at the first training row.
    pub fn new(source: &'a S, config: PairwiseConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        let rejection = RejectionSampler::new(source.n_items(), config.max_rejection_attempts)?;
        Ok(Self {
            source,
            cursor: Cursor::new(source.split(Mode::Train).len()),
            rng: DeterministicRng::with_stream(config.seed, PAIRWISE_SEED_OFFSET),
            config,
            rejection,
        })
    }

    pub fn config(&self) -> &PairwiseConfig {
        &self.config
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// `true` once the cursor protocols have walked the whole training split.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// Dispatch on configuration: bootstrap, single row (`batch_size == 1`),
    /// or multi-row batch.
    pub fn next_pair(
        &mut self,
        scorer: Option<&dyn PairScorer>,
    ) -> Result<PairwiseOutput, SamplerError> {
        if self.config.bootstrap {
            return self.sample_pair_bootstrap(scorer).map(PairwiseOutput::Pair);
        }
        if self.config.batch_size == 1 {
            return Ok(self
                .sample_pair_single(scorer)?
                .map_or(PairwiseOutput::Exhausted, PairwiseOutput::Pair));
        }
        let batch = self.sample_pair_batch(scorer)?;
        if batch.is_empty() {
            Ok(PairwiseOutput::Exhausted)
        } else {
            Ok(PairwiseOutput::Batch(batch))
        }
    }

    /// Pick a training row uniformly (with replacement) and pair it with a negative.
    pub fn sample_pair_bootstrap(
        &mut self,
        scorer: Option<&dyn PairScorer>,
    ) -> Result<PairwiseSample, SamplerError> {
        let len = self.source.split(Mode::Train).len();
        if len == 0 {
            return Err(SamplerError::InconsistentData(
                "cannot bootstrap pairs from an empty training split".into(),
            ));
        }
        let row = self.rng.random_range(0..len);
        self.pair_for_row(row, scorer)
    }

    /// Pair the cursor's current row and advance one row. `None` once exhausted.
    pub fn sample_pair_single(
        &mut self,
        scorer: Option<&dyn PairScorer>,
    ) -> Result<Option<PairwiseSample>, SamplerError> {
        let slice = self.cursor.peek(1);
        if slice.is_empty() {
            self.cursor.advance(1);
            return Ok(None);
        }
        let sample = self.pair_for_row(slice.start, scorer)?;
        self.cursor.advance(1);
        Ok(Some(sample))
    }

    /// Pair every row of the next `batch_size` slice. Empty once exhausted.
    pub fn sample_pair_batch(
        &mut self,
        scorer: Option<&dyn PairScorer>,
    ) -> Result<PairwiseBatch, SamplerError> {
        let width = self.config.batch_size;
        if width == 0 {
            return Err(SamplerError::InvalidConfig(
                "batch_size must be a positive integer for batched pair sampling".into(),
            ));
        }
        let slice = self.cursor.peek(width);
        let mut batch = PairwiseBatch {
            users: Vec::with_capacity(slice.len()),
            items_i: Vec::with_capacity(slice.len()),
            items_j: Vec::with_capacity(slice.len()),
            margins: scorer.map(|_| Vec::with_capacity(slice.len())),
        };
        for row in slice {
            let sample = self.pair_for_row(row, scorer)?;
            batch.users.push(sample.user);
            batch.items_i.push(sample.item_i);
            batch.items_j.push(sample.item_j);
            if let (Some(margins), Some(x_uij)) = (batch.margins.as_mut(), sample.x_uij) {
                margins.push(x_uij);
            }
        }
        self.cursor.advance(width);
        Ok(batch)
    }

    /// Similarity-based triple for the cursor's current row. `None` once exhausted.
    ///
    /// `x_ui` and `x_uj` are the summed similarities of the `k` consumed items
    /// nearest to `item_i` and `item_j`.
    pub fn sample_pair_knn(
        &mut self,
        sim: &SimilarityMatrix,
        k: usize,
    ) -> Result<Option<KnnPair>, SamplerError> {
        if k == 0 {
            return Err(SamplerError::InvalidConfig(
                "k must be a positive integer".into(),
            ));
        }
        let slice = self.cursor.peek(1);
        if slice.is_empty() {
            self.cursor.advance(1);
            return Ok(None);
        }
        let sample = self.pair_for_row(slice.start, None)?;
        let consumed = self.source.consumed();
        let mut user_items: Vec<_> = consumed
            .items(sample.user)
            .map(|items| items.iter().copied().collect())
            .unwrap_or_default();
        user_items.sort_unstable();
        let (item_i_neighbors, x_ui) = sim.top_k(sample.item_i, &user_items, k)?;
        let (item_j_neighbors, x_uj) = sim.top_k(sample.item_j, &user_items, k)?;
        self.cursor.advance(1);
        Ok(Some(KnnPair {
            user: sample.user,
            item_i: sample.item_i,
            item_i_neighbors,
            item_j: sample.item_j,
            item_j_neighbors,
            x_uij: x_ui - x_uj,
        }))
    }

    /// Every row of `mode` immediately followed by one negative for its user.
    pub fn transform_full(&mut self, mode: Mode) -> Result<InteractionBatch, SamplerError> {
        let source = self.source;
        let split = source.split(mode);
        let mut batch = InteractionBatch::with_capacity(split.len() * 2);
        for row in 0..split.len() {
            let user = split.users()[row];
            let item_j = self
                .rejection
                .sample_negative(source.consumed(), user, &mut self.rng)?;
            batch.users.extend([user, user]);
            batch.items.extend([split.items()[row], item_j]);
            batch.labels.extend([split.labels()[row], NEGATIVE_LABEL]);
        }
        Ok(batch)
    }

    fn pair_for_row(
        &mut self,
        row: usize,
        scorer: Option<&dyn PairScorer>,
    ) -> Result<PairwiseSample, SamplerError> {
        let source = self.source;
        let split = source.split(Mode::Train);
        let user = split.users()[row];
        let item_i = split.items()[row];
        let item_j = self
            .rejection
            .sample_negative(source.consumed(), user, &mut self.rng)?;
        let x_uij = scorer
            .map(|scorer| scorer.margin(user, item_i, item_j))
            .transpose()?;
        Ok(PairwiseSample {
            user,
            item_i,
            item_j,
            x_uij,
        })
    }
}
