#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Mixed positive/negative batch assembly.
pub mod assembler;
/// Sampling configuration types.
pub mod config;
/// Centralized constants used across samplers.
pub mod constants;
/// Monotone cursor over positive rows.
pub mod cursor;
/// Batch and mode types handed to model trainers.
pub mod data;
/// Cost and capacity estimation helpers.
pub mod heuristics;
/// Aggregate sampling counters.
pub mod metrics;
/// Pairwise (ranking) sampling.
pub mod pairwise;
/// Negative-sampling policies.
pub mod policy;
/// Without-replacement candidate pools.
pub mod pool;
/// Bounded rejection sampling.
pub mod rejection;
/// Seeded random generator.
pub mod rng;
/// Pairwise scoring collaborators.
pub mod scoring;
/// Per-epoch pointwise sampling sessions.
pub mod session;
/// Row layouts batches are materialized into.
pub mod shape;
/// Observed-interaction inputs.
pub mod source;
/// Shared type aliases.
pub mod types;
/// Item-universe helpers.
pub mod utils;

mod errors;

pub use assembler::BatchAssembler;
pub use config::{NegativeStrategy, PairwiseConfig, SamplerConfig};
pub use cursor::Cursor;
pub use data::{
    FeatureBatch, InteractionBatch, KnnPair, Mode, PairwiseBatch, PairwiseSample,
};
pub use errors::SamplerError;
pub use metrics::{LabelCounts, SamplingStats, label_counts};
pub use pairwise::{PairwiseOutput, PairwiseSampler};
pub use policy::{NegativeDraw, NegativePolicy};
pub use pool::{CandidatePoolManager, PoolDraw};
pub use rejection::RejectionSampler;
pub use rng::DeterministicRng;
pub use scoring::{LatentFactors, PairScorer, SimilarityMatrix};
pub use session::{SamplingSession, SessionSnapshot};
pub use shape::{EmittedRow, FeatureRows, PlainRows, RowShape};
pub use source::{ConsumedSet, FeatureColumns, InMemorySource, InteractionSource, InteractionSplit};
pub use types::{FeatureIndex, FeatureValue, ItemId, Label, Score, UserId};
