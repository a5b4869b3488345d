use serde::{Deserialize, Serialize};

use crate::constants::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_REJECTION_ATTEMPTS, DEFAULT_NUM_NEG, DEFAULT_SEED,
};
use crate::errors::SamplerError;

/// Strategy used to synthesize negatives for a positive row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegativeStrategy {
    /// Draw uniformly and retest against the user's consumed set (with replacement).
    Rejection,
    /// Draw from a per-user pool of never-sampled candidates (without replacement).
    PoolBased,
}

/// Top-level configuration for pointwise negative sampling sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// RNG seed that controls negative draws and batch permutation.
    pub seed: u64,
    /// Positive rows consumed per cursor step.
    pub batch_size: usize,
    /// Negatives generated for every positive row.
    pub num_neg: usize,
    /// `true` selects rejection sampling, `false` selects pool-based sampling.
    ///
    /// Pools are only built up front when this is `false`; a replacement
    /// session still builds them lazily if a without-replacement batch is requested.
    pub replacement_sampling: bool,
    /// Rejected draws tolerated before the rejection sampler enumerates the
    /// user's complement instead of retrying.
    pub max_rejection_attempts: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            batch_size: DEFAULT_BATCH_SIZE,
            num_neg: DEFAULT_NUM_NEG,
            replacement_sampling: false,
            max_rejection_attempts: DEFAULT_MAX_REJECTION_ATTEMPTS,
        }
    }
}

impl SamplerConfig {
    /// Strategy implied by `replacement_sampling`.
    pub fn strategy(&self) -> NegativeStrategy {
        if self.replacement_sampling {
            NegativeStrategy::Rejection
        } else {
            NegativeStrategy::PoolBased
        }
    }

    /// Reject settings that would yield semantically wrong batches.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.batch_size == 0 {
            return Err(SamplerError::InvalidConfig(
                "batch_size must be a positive integer".into(),
            ));
        }
        if self.num_neg == 0 {
            return Err(SamplerError::InvalidConfig(
                "num_neg must be a positive integer".into(),
            ));
        }
        if self.max_rejection_attempts == 0 {
            return Err(SamplerError::InvalidConfig(
                "max_rejection_attempts must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for pairwise (BPR-style) sampling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairwiseConfig {
    /// RNG seed for row selection and negative draws.
    pub seed: u64,
    /// Draw rows uniformly with replacement instead of walking a cursor.
    pub bootstrap: bool,
    /// Rows per cursor step. `1` selects the single-row protocol.
    /// Ignored in bootstrap mode; `0` is only valid together with `bootstrap`.
    pub batch_size: usize,
    /// Rejected draws tolerated before falling back to the explicit complement.
    pub max_rejection_attempts: usize,
}

impl Default for PairwiseConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            bootstrap: false,
            batch_size: DEFAULT_BATCH_SIZE,
            max_rejection_attempts: DEFAULT_MAX_REJECTION_ATTEMPTS,
        }
    }
}

impl PairwiseConfig {
    /// Reject configurations that select no retrieval protocol.
    pub fn validate(&self) -> Result<(), SamplerError> {
        if !self.bootstrap && self.batch_size == 0 {
            return Err(SamplerError::InvalidConfig(
                "either use bootstrap or set batch_size to a positive integer".into(),
            ));
        }
        if self.max_rejection_attempts == 0 {
            return Err(SamplerError::InvalidConfig(
                "max_rejection_attempts must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}
