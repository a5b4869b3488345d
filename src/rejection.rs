use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::constants::sampler::REJECTION_FALLBACK_MSG;
use crate::errors::SamplerError;
use crate::source::ConsumedSet;
use crate::types::{ItemId, UserId};
use crate::utils::{available_negatives, item_complement};

/// Draws uniform item ids and retests them against a user's consumed set.
///
/// Expected cost is `1 / (1 - density)` draws where density is
/// `|consumed[u]| / n_items`. Two guards keep the loop bounded:
/// - a user who consumed every item fails fast with `SamplingExhausted`;
/// - after `max_attempts` rejections the draw is taken uniformly from the
///   explicit complement instead.
#[derive(Clone, Debug)]
pub struct RejectionSampler {
    n_items: usize,
    max_attempts: usize,
    fallbacks: usize,
}

impl RejectionSampler {
    /// Sampler over `0..n_items`. Both arguments must be positive.
    pub fn new(n_items: usize, max_attempts: usize) -> Result<Self, SamplerError> {
        if n_items == 0 {
            return Err(SamplerError::InvalidConfig(
                "n_items must be a positive integer".into(),
            ));
        }
        if max_attempts == 0 {
            return Err(SamplerError::InvalidConfig(
                "max_rejection_attempts must be a positive integer".into(),
            ));
        }
        Ok(Self {
            n_items,
            max_attempts,
            fallbacks: 0,
        })
    }

    /// Size of the item universe.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of draws that had to fall back to the explicit complement.
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Draw one item not consumed by `user`.
    pub fn sample_negative<R: Rng + ?Sized>(
        &mut self,
        consumed: &ConsumedSet,
        user: UserId,
        rng: &mut R,
    ) -> Result<ItemId, SamplerError> {
        let items = consumed.items(user);
        let upper = self.n_items as ItemId;
        let Some(items) = items else {
            return Ok(rng.random_range(0..upper));
        };
        if available_negatives(self.n_items, Some(items)) == 0 {
            return Err(SamplerError::SamplingExhausted {
                user,
                requested: 1,
                available: 0,
            });
        }
        for _ in 0..self.max_attempts {
            let candidate = rng.random_range(0..upper);
            if !items.contains(&candidate) {
                return Ok(candidate);
            }
        }
        self.fallbacks += 1;
        debug!(
            user,
            consumed = items.len(),
            n_items = self.n_items,
            attempts = self.max_attempts,
            message = REJECTION_FALLBACK_MSG
        );
        let complement = item_complement(self.n_items, Some(items));
        complement
            .choose(rng)
            .copied()
            .ok_or(SamplerError::SamplingExhausted {
                user,
                requested: 1,
                available: 0,
            })
    }

    /// Draw `k` independent negatives (repeats allowed) for `user`.
    pub fn sample_many<R: Rng + ?Sized>(
        &mut self,
        consumed: &ConsumedSet,
        user: UserId,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<ItemId>, SamplerError> {
        (0..k)
            .map(|_| self.sample_negative(consumed, user, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::DeterministicRng;

    #[test]
    fn negatives_avoid_consumed_items() {
        let consumed = ConsumedSet::from_pairs([(0, 0), (0, 1), (0, 2), (0, 3)]);
        let mut sampler = RejectionSampler::new(6, 64).unwrap();
        let mut rng = DeterministicRng::new(5);
        for _ in 0..200 {
            let item = sampler.sample_negative(&consumed, 0, &mut rng).unwrap();
            assert!(item == 4 || item == 5);
        }
    }

    #[test]
    fn cold_user_draws_from_whole_universe() {
        let consumed = ConsumedSet::new();
        let mut sampler = RejectionSampler::new(3, 8).unwrap();
        let mut rng = DeterministicRng::new(1);
        let mut seen = [false; 3];
        for _ in 0..100 {
            let item = sampler.sample_negative(&consumed, 9, &mut rng).unwrap();
            seen[item as usize] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn saturated_user_fails_instead_of_looping() {
        let consumed = ConsumedSet::from_pairs((0..10).map(|item| (0, item)));
        let mut sampler = RejectionSampler::new(10, 64).unwrap();
        let mut rng = DeterministicRng::new(11);
        let err = sampler.sample_negative(&consumed, 0, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SamplerError::SamplingExhausted {
                user: 0,
                requested: 1,
                available: 0
            }
        );
    }

    #[test]
    fn attempt_cap_falls_back_to_complement() {
        // One free item out of 1000 with a single attempt almost always misses.
        let consumed = ConsumedSet::from_pairs((0..999).map(|item| (0, item)));
        let mut sampler = RejectionSampler::new(1000, 1).unwrap();
        let mut rng = DeterministicRng::new(2);
        for _ in 0..20 {
            assert_eq!(sampler.sample_negative(&consumed, 0, &mut rng).unwrap(), 999);
        }
        assert!(sampler.fallbacks() > 0);
    }

    #[test]
    fn zero_item_universe_is_invalid() {
        assert!(matches!(
            RejectionSampler::new(0, 4),
            Err(SamplerError::InvalidConfig(_))
        ));
    }
}
