use crate::config::NegativeStrategy;
pub use crate::constants::heuristics::DENSE_USER_DRAW_THRESHOLD;
use crate::source::InteractionSource;
use crate::types::UserId;
use crate::utils::available_negatives;

/// Expected uniform draws per accepted negative: `1 / (1 - consumed/n_items)`.
///
/// Infinite when the user has consumed the whole universe.
pub fn expected_rejection_draws(consumed_len: usize, n_items: usize) -> f64 {
    if n_items == 0 || consumed_len >= n_items {
        return f64::INFINITY;
    }
    let density = consumed_len as f64 / n_items as f64;
    1.0 / (1.0 - density)
}

/// Cursor steps that return a non-empty batch: `ceil(rows / batch_size)`.
pub fn batches_per_epoch(rows: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    rows.div_ceil(batch_size)
}

/// Rows a full epoch emits with `num_neg` negatives per positive.
pub fn rows_per_epoch(rows: usize, num_neg: usize) -> usize {
    rows.saturating_mul(num_neg.saturating_add(1))
}

/// Densest user in the training split and its expected rejection draws.
pub fn densest_user<S: InteractionSource + ?Sized>(source: &S) -> Option<(UserId, f64)> {
    let consumed = source.consumed();
    consumed
        .users()
        .into_iter()
        .map(|user| {
            let available = available_negatives(source.n_items(), consumed.items(user));
            let taken = source.n_items() - available;
            (user, expected_rejection_draws(taken, source.n_items()))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
}

/// Prefer pool sampling when some user would need more than `threshold`
/// expected draws per rejection-sampled negative.
pub fn recommend_strategy<S: InteractionSource + ?Sized>(
    source: &S,
    threshold: f64,
) -> NegativeStrategy {
    match densest_user(source) {
        Some((_, draws)) if draws > threshold => NegativeStrategy::PoolBased,
        _ => NegativeStrategy::Rejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InMemorySource, InteractionSplit};

    fn source(rows: &[(u32, u32)], n_items: usize) -> InMemorySource {
        let split = InteractionSplit::new(
            rows.iter().map(|(u, _)| *u).collect(),
            rows.iter().map(|(_, i)| *i).collect(),
            vec![1.0; rows.len()],
        )
        .unwrap();
        InMemorySource::new(2, n_items, split, InteractionSplit::default()).unwrap()
    }

    #[test]
    fn expected_draws_grow_with_density() {
        assert!((expected_rejection_draws(0, 10) - 1.0).abs() < 1e-12);
        assert!((expected_rejection_draws(5, 10) - 2.0).abs() < 1e-12);
        assert!((expected_rejection_draws(9, 10) - 10.0).abs() < 1e-9);
        assert!(expected_rejection_draws(10, 10).is_infinite());
    }

    #[test]
    fn epoch_counts() {
        assert_eq!(batches_per_epoch(10, 3), 4);
        assert_eq!(batches_per_epoch(9, 3), 3);
        assert_eq!(batches_per_epoch(0, 3), 0);
        assert_eq!(batches_per_epoch(5, 0), 0);
        assert_eq!(rows_per_epoch(10, 4), 50);
    }

    #[test]
    fn dense_users_steer_towards_pools() {
        let sparse = source(&[(0, 0), (1, 1)], 10);
        assert_eq!(
            recommend_strategy(&sparse, DENSE_USER_DRAW_THRESHOLD),
            NegativeStrategy::Rejection
        );
        let dense_rows: Vec<(u32, u32)> = (0..9).map(|item| (1, item)).collect();
        let dense = source(&dense_rows, 10);
        assert_eq!(densest_user(&dense).map(|(user, _)| user), Some(1));
        assert_eq!(
            recommend_strategy(&dense, DENSE_USER_DRAW_THRESHOLD),
            NegativeStrategy::PoolBased
        );
    }
}
