//! Per-epoch pointwise sampling driver.
//!
//! A `SamplingSession` owns everything that changes while an epoch is
//! consumed: the cursor, the seeded generator, the rejection sampler, and
//! (for without-replacement sampling) the candidate pools. It borrows the
//! interaction source read-only. One session has exactly one writer; hosts
//! that parallelize must give each worker its own session.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assembler::BatchAssembler;
use crate::config::{NegativeStrategy, SamplerConfig};
use crate::constants::sampler::EMPTY_SPLIT_MSG;
use crate::cursor::Cursor;
use crate::data::{FeatureBatch, InteractionBatch, Mode};
use crate::errors::SamplerError;
use crate::metrics::SamplingStats;
use crate::policy::NegativePolicy;
use crate::pool::CandidatePoolManager;
use crate::rejection::RejectionSampler;
use crate::rng::DeterministicRng;
use crate::shape::{FeatureRows, PlainRows, RowShape};
use crate::source::{ConsumedSet, InteractionSource};

/// Resumable state of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub offset: usize,
    pub steps: usize,
    pub rng_state: u64,
    /// Candidate pools as they stood at the snapshot. `None` when the session
    /// had not built any (rejection-only sessions).
    #[serde(default)]
    pub pools: Option<CandidatePoolManager>,
}

/// Cursor-driven negative sampling over one split.
pub struct SamplingSession<'a, S: InteractionSource + ?Sized> {
    source: &'a S,
    mode: Mode,
    config: SamplerConfig,
    cursor: Cursor,
    rng: DeterministicRng,
    assembler: BatchAssembler,
    rejection: RejectionSampler,
    pools: Option<CandidatePoolManager>,
    stats: SamplingStats,
}

impl<'a, S: InteractionSource + ?Sized> SamplingSession<'a, S> {
    /// Start a session at offset 0 of `mode`'s split.
    ///
    /// Pools are built up front unless `replacement_sampling` is set.
    pub fn new(source: &'a S, mode: Mode, config: SamplerConfig) -> Result<Self, SamplerError> {
        let pools = if config.replacement_sampling {
            None
        } else {
            Some(CandidatePoolManager::initialize(
                source.consumed(),
                source.n_items(),
            )?)
        };
        Self::build(source, mode, config, pools)
    }

    /// Start a session that continues depleting pools from a previous epoch.
    pub fn with_pools(
        source: &'a S,
        mode: Mode,
        config: SamplerConfig,
        pools: CandidatePoolManager,
    ) -> Result<Self, SamplerError> {
        if pools.n_items() != source.n_items() {
            return Err(SamplerError::InconsistentData(format!(
                "candidate pools cover {} items but the source has {}",
                pools.n_items(),
                source.n_items()
            )));
        }
        Self::build(source, mode, config, Some(pools))
    }

    fn build(
        source: &'a S,
        mode: Mode,
        config: SamplerConfig,
        pools: Option<CandidatePoolManager>,
    ) -> Result<Self, SamplerError> {
        config.validate()?;
        let assembler = BatchAssembler::new(config.num_neg)?;
        let rejection = RejectionSampler::new(source.n_items(), config.max_rejection_attempts)?;
        let len = source.split(mode).len();
        if len == 0 {
            warn!(?mode, message = EMPTY_SPLIT_MSG);
        }
        Ok(Self {
            source,
            mode,
            rng: DeterministicRng::new(config.seed),
            config,
            cursor: Cursor::new(len),
            assembler,
            rejection,
            pools,
            stats: SamplingStats::default(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Configuration the session was built with.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// Counters accumulated over every non-failing batch call.
    pub fn stats(&self) -> &SamplingStats {
        &self.stats
    }

    /// Draws that hit the rejection attempt cap and used the complement instead.
    pub fn rejection_fallbacks(&self) -> usize {
        self.rejection.fallbacks()
    }

    /// Candidate pools, once built.
    pub fn pools(&self) -> Option<&CandidatePoolManager> {
        self.pools.as_ref()
    }

    /// End the session and hand its pools to the next epoch.
    pub fn into_pools(self) -> Option<CandidatePoolManager> {
        self.pools
    }

    /// One-shot negative augmentation of a whole split (plain rows).
    ///
    /// Does not touch the cursor. Negatives always come from rejection sampling.
    pub fn transform_full(&mut self, mode: Mode) -> Result<InteractionBatch, SamplerError> {
        let source = self.source;
        let shape = PlainRows::new(source.split(mode));
        self.assembler
            .transform_full(&shape, source.consumed(), &mut self.rejection, &mut self.rng)
    }

    /// One-shot negative augmentation of a whole split (feature rows).
    pub fn transform_full_features(&mut self, mode: Mode) -> Result<FeatureBatch, SamplerError> {
        let source = self.source;
        let shape = FeatureRows::new(source.split(mode))?;
        self.assembler
            .transform_full(&shape, source.consumed(), &mut self.rejection, &mut self.rng)
    }

    /// Next slice using the configured strategy.
    pub fn next_batch(&mut self) -> Result<InteractionBatch, SamplerError> {
        let strategy = self.config.strategy();
        self.next_plain(strategy)
    }

    /// Next slice with negatives taken from the candidate pools.
    pub fn next_batch_without_replacement(&mut self) -> Result<InteractionBatch, SamplerError> {
        self.next_plain(NegativeStrategy::PoolBased)
    }

    /// Next slice with rejection-sampled negatives.
    pub fn next_batch_with_replacement(&mut self) -> Result<InteractionBatch, SamplerError> {
        self.next_plain(NegativeStrategy::Rejection)
    }

    /// Feature-row counterpart of [`SamplingSession::next_batch`].
    pub fn next_feature_batch(&mut self) -> Result<FeatureBatch, SamplerError> {
        let strategy = self.config.strategy();
        self.next_features(strategy)
    }

    /// Feature rows with negatives taken from the candidate pools.
    pub fn next_feature_batch_without_replacement(&mut self) -> Result<FeatureBatch, SamplerError> {
        self.next_features(NegativeStrategy::PoolBased)
    }

    /// Feature rows with rejection-sampled negatives.
    pub fn next_feature_batch_with_replacement(&mut self) -> Result<FeatureBatch, SamplerError> {
        self.next_features(NegativeStrategy::Rejection)
    }

    /// Capture cursor, generator, and pool state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            offset: self.cursor.offset(),
            steps: self.cursor.steps(),
            rng_state: self.rng.state(),
            pools: self.pools.clone(),
        }
    }

    /// Resume from a snapshot taken on a session over the same split.
    ///
    /// Pools are replaced by the snapshot's. A snapshot without pools leaves
    /// the session to rebuild full pools on the next without-replacement draw.
    pub fn restore(&mut self, snapshot: &SessionSnapshot) -> Result<(), SamplerError> {
        if snapshot.mode != self.mode {
            return Err(SamplerError::InconsistentData(format!(
                "snapshot was taken on {:?} but the session samples {:?}",
                snapshot.mode, self.mode
            )));
        }
        if snapshot.offset > self.cursor.len() {
            return Err(SamplerError::InconsistentData(format!(
                "snapshot offset {} is past the split length {}",
                snapshot.offset,
                self.cursor.len()
            )));
        }
        if let Some(pools) = &snapshot.pools
            && pools.n_items() != self.source.n_items()
        {
            return Err(SamplerError::InconsistentData(format!(
                "snapshot pools cover {} items but the source has {}",
                pools.n_items(),
                self.source.n_items()
            )));
        }
        self.cursor.seek(snapshot.offset, snapshot.steps);
        self.rng = DeterministicRng::from_state(snapshot.rng_state);
        self.pools = snapshot.pools.clone();
        Ok(())
    }

    fn next_plain(&mut self, strategy: NegativeStrategy) -> Result<InteractionBatch, SamplerError> {
        let source = self.source;
        let shape = PlainRows::new(source.split(self.mode));
        self.next_slice(&shape, strategy)
    }

    fn next_features(&mut self, strategy: NegativeStrategy) -> Result<FeatureBatch, SamplerError> {
        let source = self.source;
        let shape = FeatureRows::new(source.split(self.mode))?;
        self.next_slice(&shape, strategy)
    }

    fn next_slice<Sh: RowShape>(
        &mut self,
        shape: &Sh,
        strategy: NegativeStrategy,
    ) -> Result<Sh::Batch, SamplerError> {
        let width = self.config.batch_size;
        let slice = self.cursor.peek(width);
        let source = self.source;
        let consumed = source.consumed();
        let mut policy = match strategy {
            NegativeStrategy::Rejection => NegativePolicy::Rejection(&mut self.rejection),
            NegativeStrategy::PoolBased => NegativePolicy::PoolBased(ensure_pools(
                &mut self.pools,
                consumed,
                source.n_items(),
            )?),
        };
        let (batch, stats) =
            self.assembler
                .assemble_slice(shape, slice, &mut policy, consumed, &mut self.rng)?;
        self.cursor.advance(width);
        self.stats.record(&stats);
        Ok(batch)
    }
}

fn ensure_pools<'p>(
    pools: &'p mut Option<CandidatePoolManager>,
    consumed: &ConsumedSet,
    n_items: usize,
) -> Result<&'p mut CandidatePoolManager, SamplerError> {
    let manager = match pools.take() {
        Some(manager) => manager,
        None => CandidatePoolManager::initialize(consumed, n_items)?,
    };
    Ok(pools.insert(manager))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FeatureColumns, InMemorySource, InteractionSplit};

    fn source() -> InMemorySource {
        let train = InteractionSplit::new(
            vec![0, 0, 1, 1, 2],
            vec![0, 1, 2, 3, 4],
            vec![1.0; 5],
        )
        .unwrap();
        let features = FeatureColumns::new(
            (0..5).map(|row| vec![100 + row, row]).collect(),
            (0..5).map(|_| vec![1.0, 1.0]).collect(),
        )
        .unwrap();
        let train = train.with_features(features).unwrap();
        let test = InteractionSplit::new(vec![2], vec![0], vec![1.0]).unwrap();
        InMemorySource::new(3, 12, train, test).unwrap()
    }

    fn config(batch_size: usize, num_neg: usize) -> SamplerConfig {
        SamplerConfig {
            batch_size,
            num_neg,
            seed: 17,
            ..SamplerConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let source = source();
        assert!(matches!(
            SamplingSession::new(&source, Mode::Train, config(0, 1)),
            Err(SamplerError::InvalidConfig(_))
        ));
        assert!(matches!(
            SamplingSession::new(&source, Mode::Train, config(2, 0)),
            Err(SamplerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn replacement_session_builds_pools_lazily() {
        let source = source();
        let mut session = SamplingSession::new(
            &source,
            Mode::Train,
            SamplerConfig {
                replacement_sampling: true,
                ..config(2, 1)
            },
        )
        .unwrap();
        assert!(session.pools().is_none());
        session.next_batch().unwrap();
        assert!(session.pools().is_none());
        session.next_batch_without_replacement().unwrap();
        assert!(session.pools().is_some());
    }

    #[test]
    fn cursor_advances_once_per_call_even_when_empty() {
        let source = source();
        let mut session = SamplingSession::new(&source, Mode::Train, config(2, 1)).unwrap();
        let sizes: Vec<usize> = (0..5)
            .map(|_| session.next_batch().unwrap().len())
            .collect();
        assert_eq!(sizes, vec![4, 4, 2, 0, 0]);
        assert_eq!(session.cursor().steps(), 5);
        assert_eq!(session.stats().batches, 3);
        assert_eq!(session.stats().positives, 5);
    }

    #[test]
    fn feature_batches_follow_the_same_cursor() {
        let source = source();
        let mut session = SamplingSession::new(&source, Mode::Train, config(3, 2)).unwrap();
        let batch = session.next_feature_batch().unwrap();
        assert_eq!(batch.len(), 9);
        for (indices, label) in batch.feat_indices.iter().zip(&batch.labels) {
            if *label == 0.0 {
                let user = if indices[0] < 102 { 0 } else { 1 };
                assert!(!source.consumed().contains(user, indices[1]));
            }
        }
        assert_eq!(session.cursor().offset(), 3);
    }

    #[test]
    fn feature_batches_require_feature_columns() {
        let source = source();
        let mut session = SamplingSession::new(&source, Mode::Test, config(3, 2)).unwrap();
        assert!(session.next_feature_batch().is_err());
        assert_eq!(session.cursor().steps(), 0);
    }

    #[test]
    fn failed_draw_leaves_cursor_in_place() {
        let source = source();
        // user 0 has 10 candidates; 11 negatives per positive cannot be drawn distinct.
        let mut session = SamplingSession::new(&source, Mode::Train, config(2, 11)).unwrap();
        let err = session.next_batch_without_replacement().unwrap_err();
        assert!(matches!(err, SamplerError::SamplingExhausted { .. }));
        assert_eq!(session.cursor().offset(), 0);
        assert_eq!(session.cursor().steps(), 0);
    }

    #[test]
    fn restore_rejects_foreign_snapshots() {
        let source = source();
        let mut session = SamplingSession::new(&source, Mode::Train, config(2, 1)).unwrap();
        let snapshot = SessionSnapshot {
            mode: Mode::Test,
            offset: 0,
            steps: 0,
            rng_state: 1,
            pools: None,
        };
        assert!(session.restore(&snapshot).is_err());
        let snapshot = SessionSnapshot {
            mode: Mode::Train,
            offset: 99,
            steps: 0,
            rng_state: 1,
            pools: None,
        };
        assert!(session.restore(&snapshot).is_err());
        let narrow = CandidatePoolManager::initialize(source.consumed(), 5).unwrap();
        let snapshot = SessionSnapshot {
            mode: Mode::Train,
            offset: 0,
            steps: 0,
            rng_state: 1,
            pools: Some(narrow),
        };
        assert!(matches!(
            session.restore(&snapshot),
            Err(SamplerError::InconsistentData(_))
        ));
        assert_eq!(session.pools().unwrap().n_items(), 12);
    }

    #[test]
    fn restore_replaces_pools_with_snapshot_pools() {
        let source = source();
        let mut original = SamplingSession::new(&source, Mode::Train, config(2, 3)).unwrap();
        original.next_batch().unwrap();
        let snapshot = original.snapshot();
        assert_eq!(snapshot.pools.as_ref(), original.pools());

        let mut resumed = SamplingSession::new(&source, Mode::Train, config(2, 3)).unwrap();
        assert_ne!(resumed.pools(), original.pools());
        resumed.restore(&snapshot).unwrap();
        assert_eq!(resumed.pools(), original.pools());
        assert_eq!(resumed.next_batch().unwrap(), original.next_batch().unwrap());
    }
}
