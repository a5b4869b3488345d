use thiserror::Error;

use crate::types::UserId;

/// Error type for sampler configuration, input consistency, and exhausted negatives.
#[derive(Debug, Error, PartialEq)]
pub enum SamplerError {
    /// A configuration value is out of range.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
    /// Fewer negatives exist for a user than a draw requested.
    #[error(
        "no negatives available for user {user}: requested {requested}, only {available} candidates exist"
    )]
    SamplingExhausted {
        /// User whose negatives ran out.
        user: UserId,
        /// Negatives the draw asked for.
        requested: usize,
        /// Candidates that exist for the user.
        available: usize,
    },
    /// Input columns disagree in length or reference ids outside the universe.
    #[error("interaction data is inconsistent: {0}")]
    InconsistentData(String),
    /// A scorer has no entry for the requested id.
    #[error("unknown {kind} id {id} (expected < {bound})")]
    UnknownId {
        kind: &'static str,
        id: u32,
        bound: usize,
    },
}
