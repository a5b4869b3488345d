use indexmap::IndexMap;
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::sampler::POOL_EXHAUSTED_MSG;
use crate::errors::SamplerError;
use crate::source::ConsumedSet;
use crate::types::{ItemId, UserId};
use crate::utils::{available_negatives, item_complement};

/// Result of one without-replacement draw.
#[derive(Clone, Debug, PartialEq)]
pub struct PoolDraw {
    /// Distinct negatives, in draw order.
    pub items: Vec<ItemId>,
    /// `true` when the user's pool ran low and was rebuilt after this draw.
    pub refilled: bool,
}

/// Per-user reservoirs of negatives not yet handed out.
///
/// Invariant: `pool[u] ∩ consumed[u] = ∅`. Pools shrink with every draw and
/// are rebuilt from `AllItems − consumed[u]` once they can no longer satisfy
/// a draw of the same size. Refills are routine and never fail the caller.
///
/// Serializable so a session checkpoint can carry partly depleted pools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePoolManager {
    n_items: usize,
    pools: IndexMap<UserId, Vec<ItemId>>,
    refills: usize,
}

impl CandidatePoolManager {
    /// Build a pool for every user present in `consumed`.
    pub fn initialize(consumed: &ConsumedSet, n_items: usize) -> Result<Self, SamplerError> {
        if n_items == 0 {
            return Err(SamplerError::InvalidConfig(
                "n_items must be a positive integer".into(),
            ));
        }
        let pools = consumed
            .users()
            .into_iter()
            .map(|user| (user, item_complement(n_items, consumed.items(user))))
            .collect();
        Ok(Self {
            n_items,
            pools,
            refills: 0,
        })
    }

    /// Size of the item universe the pools are drawn from.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Remaining candidates for `user`, if a pool exists yet.
    pub fn pool(&self, user: UserId) -> Option<&[ItemId]> {
        self.pools.get(&user).map(Vec::as_slice)
    }

    /// Remaining candidate count for `user`, if a pool exists yet.
    pub fn pool_len(&self, user: UserId) -> Option<usize> {
        self.pools.get(&user).map(Vec::len)
    }

    /// Users with a pool, in creation order.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.pools.keys().copied()
    }

    /// Total pool rebuilds since initialization.
    pub fn refill_count(&self) -> usize {
        self.refills
    }

    /// Take `k` distinct negatives for `user` out of its pool.
    ///
    /// Cold users get a pool covering every item on first use. Fails without
    /// touching the pool when even a full pool holds fewer than `k` candidates.
    pub fn draw_without_replacement<R: Rng + ?Sized>(
        &mut self,
        consumed: &ConsumedSet,
        user: UserId,
        k: usize,
        rng: &mut R,
    ) -> Result<PoolDraw, SamplerError> {
        if k == 0 {
            return Err(SamplerError::InvalidConfig(
                "negatives per draw must be a positive integer".into(),
            ));
        }
        let consumed_items = consumed.items(user);
        let capacity = available_negatives(self.n_items, consumed_items);
        if capacity < k {
            return Err(SamplerError::SamplingExhausted {
                user,
                requested: k,
                available: capacity,
            });
        }

        let n_items = self.n_items;
        let pool = self
            .pools
            .entry(user)
            .or_insert_with(|| item_complement(n_items, consumed_items));
        if pool.len() < k {
            // Pools carried over from a session with a smaller `num_neg`.
            *pool = item_complement(n_items, consumed_items);
            self.refills += 1;
        }

        let picked = index::sample(rng, pool.len(), k).into_vec();
        let items: Vec<ItemId> = picked.iter().map(|&idx| pool[idx]).collect();
        let mut removal = picked;
        removal.sort_unstable_by(|a, b| b.cmp(a));
        for idx in removal {
            pool.swap_remove(idx);
        }

        let refilled = pool.len() < k;
        if refilled {
            *pool = item_complement(n_items, consumed_items);
            self.refills += 1;
            debug!(
                user,
                pool_len = pool.len(),
                refills = self.refills,
                message = POOL_EXHAUSTED_MSG
            );
        }
        Ok(PoolDraw { items, refilled })
    }
}
