//! Small helpers shared by the samplers.

use std::collections::HashSet;

use crate::types::ItemId;

/// Items in `0..n_items` not present in `consumed`, ascending.
pub fn item_complement(n_items: usize, consumed: Option<&HashSet<ItemId>>) -> Vec<ItemId> {
    let universe = 0..n_items as ItemId;
    match consumed {
        Some(consumed) => universe.filter(|item| !consumed.contains(item)).collect(),
        None => universe.collect(),
    }
}

/// Number of items in `0..n_items` that `consumed` leaves available.
pub fn available_negatives(n_items: usize, consumed: Option<&HashSet<ItemId>>) -> usize {
    let taken = consumed.map_or(0, |consumed| {
        consumed
            .iter()
            .filter(|item| (**item as usize) < n_items)
            .count()
    });
    n_items - taken
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_skips_consumed_items() {
        let consumed: HashSet<ItemId> = [1, 2, 3].into_iter().collect();
        assert_eq!(item_complement(6, Some(&consumed)), vec![0, 4, 5]);
        assert_eq!(item_complement(3, None), vec![0, 1, 2]);
        assert_eq!(available_negatives(6, Some(&consumed)), 3);
    }

    #[test]
    fn out_of_universe_items_do_not_count_as_taken() {
        let consumed: HashSet<ItemId> = [0, 10].into_iter().collect();
        assert_eq!(available_negatives(2, Some(&consumed)), 1);
    }
}
