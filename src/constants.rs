/// Constants used by sampling configuration defaults.
pub mod config {
    /// Default RNG seed shared by negative draws and batch permutation.
    pub const DEFAULT_SEED: u64 = 42;
    /// Default number of positive rows per cursor slice.
    pub const DEFAULT_BATCH_SIZE: usize = 64;
    /// Default negatives generated per positive row.
    pub const DEFAULT_NUM_NEG: usize = 1;
    /// Rejected draws tolerated before falling back to the explicit complement.
    pub const DEFAULT_MAX_REJECTION_ATTEMPTS: usize = 64;
}

/// Constants used by the samplers at runtime.
pub mod sampler {
    /// Label assigned to every synthesized negative row.
    pub const NEGATIVE_LABEL: f32 = 0.0;
    /// Log message emitted when a without-replacement pool is rebuilt.
    pub const POOL_EXHAUSTED_MSG: &str = "negative pool exhausted";
    /// Log message emitted when rejection sampling falls back to the complement.
    pub const REJECTION_FALLBACK_MSG: &str = "rejection sampling hit attempt cap";
    /// Log message emitted when a session is built over an empty split.
    pub const EMPTY_SPLIT_MSG: &str = "sampling session created over empty split";
    /// Offset mixed into the seed of pairwise samplers so they do not replay
    /// the pointwise session stream when both share a seed.
    pub const PAIRWISE_SEED_OFFSET: u64 = 0xB4C3_5EED;
}

/// Constants used by capacity and cost heuristics.
pub mod heuristics {
    /// Expected rejection draws per negative above which pool sampling is preferred.
    pub const DENSE_USER_DRAW_THRESHOLD: f64 = 4.0;
}
