use rand::Rng;

use crate::errors::SamplerError;
use crate::pool::CandidatePoolManager;
use crate::rejection::RejectionSampler;
use crate::source::ConsumedSet;
use crate::types::{ItemId, UserId};

/// A negative-sampling policy bound to the state it draws from.
pub enum NegativePolicy<'p> {
    /// With-replacement draws from the rejection sampler.
    Rejection(&'p mut RejectionSampler),
    /// Without-replacement draws from per-user candidate pools.
    PoolBased(&'p mut CandidatePoolManager),
}

/// Negatives drawn for one positive row.
#[derive(Clone, Debug, PartialEq)]
pub struct NegativeDraw {
    pub items: Vec<ItemId>,
    /// Set when a pool-based draw rebuilt the user's pool.
    pub pool_refilled: bool,
}

impl NegativePolicy<'_> {
    /// Draw `k` negatives for `user`. None of them is in `consumed[user]`.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        consumed: &ConsumedSet,
        user: UserId,
        k: usize,
        rng: &mut R,
    ) -> Result<NegativeDraw, SamplerError> {
        match self {
            NegativePolicy::Rejection(sampler) => Ok(NegativeDraw {
                items: sampler.sample_many(consumed, user, k, rng)?,
                pool_refilled: false,
            }),
            NegativePolicy::PoolBased(pools) => {
                let draw = pools.draw_without_replacement(consumed, user, k, rng)?;
                Ok(NegativeDraw {
                    items: draw.items,
                    pool_refilled: draw.refilled,
                })
            }
        }
    }
}
