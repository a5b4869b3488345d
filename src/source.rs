//! Observed-interaction inputs.
//!
//! Ownership model:
//! - `InteractionSource` is the read-only, sampler-facing view of a dataset.
//! - `ConsumedSet` records, per user, every item seen in the training split.
//!   Negatives must never be drawn from it.
//! - `InMemorySource` is the built-in source backed by owned vectors.

use std::collections::{HashMap, HashSet};

use crate::data::Mode;
use crate::errors::SamplerError;
use crate::types::{FeatureIndex, FeatureValue, ItemId, Label, UserId};

/// Per-user set of items observed in the training split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConsumedSet {
    by_user: HashMap<UserId, HashSet<ItemId>>,
}

impl ConsumedSet {
    /// Empty set: every user is cold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(user, item)` pairs; duplicates collapse.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (UserId, ItemId)>) -> Self {
        let mut consumed = Self::new();
        for (user, item) in pairs {
            consumed.insert(user, item);
        }
        consumed
    }

    /// Record that `user` consumed `item`.
    pub fn insert(&mut self, user: UserId, item: ItemId) {
        self.by_user.entry(user).or_default().insert(item);
    }

    /// Items consumed by `user`, or `None` for a cold user.
    pub fn items(&self, user: UserId) -> Option<&HashSet<ItemId>> {
        self.by_user.get(&user)
    }

    /// `true` when `item` is a known positive of `user`.
    pub fn contains(&self, user: UserId, item: ItemId) -> bool {
        self.by_user
            .get(&user)
            .is_some_and(|items| items.contains(&item))
    }

    /// Number of items consumed by `user` (0 for cold users).
    pub fn count(&self, user: UserId) -> usize {
        self.by_user.get(&user).map_or(0, HashSet::len)
    }

    /// Users with at least one consumed item, in ascending id order.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.by_user.keys().copied().collect();
        users.sort_unstable();
        users
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

/// Per-row sparse feature slots and their dense values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureColumns {
    indices: Vec<Vec<FeatureIndex>>,
    values: Vec<Vec<FeatureValue>>,
}

impl FeatureColumns {
    /// Pair index rows with value rows.
    ///
    /// Every row needs at least one slot (the item slot) and matching index/value widths.
    pub fn new(
        indices: Vec<Vec<FeatureIndex>>,
        values: Vec<Vec<FeatureValue>>,
    ) -> Result<Self, SamplerError> {
        if indices.len() != values.len() {
            return Err(SamplerError::InconsistentData(format!(
                "{} feature index rows but {} feature value rows",
                indices.len(),
                values.len()
            )));
        }
        for (row, (idx, val)) in indices.iter().zip(&values).enumerate() {
            if idx.is_empty() {
                return Err(SamplerError::InconsistentData(format!(
                    "feature row {row} has no item slot"
                )));
            }
            if idx.len() != val.len() {
                return Err(SamplerError::InconsistentData(format!(
                    "feature row {row} has {} indices but {} values",
                    idx.len(),
                    val.len()
                )));
            }
        }
        Ok(Self { indices, values })
    }

    pub fn indices(&self) -> &[Vec<FeatureIndex>] {
        &self.indices
    }

    pub fn values(&self) -> &[Vec<FeatureValue>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Parallel positive columns for one split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionSplit {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    labels: Vec<Label>,
    features: Option<FeatureColumns>,
}

impl InteractionSplit {
    /// Build a split from parallel columns of equal length.
    pub fn new(
        users: Vec<UserId>,
        items: Vec<ItemId>,
        labels: Vec<Label>,
    ) -> Result<Self, SamplerError> {
        if users.len() != items.len() || users.len() != labels.len() {
            return Err(SamplerError::InconsistentData(format!(
                "column lengths differ: users={}, items={}, labels={}",
                users.len(),
                items.len(),
                labels.len()
            )));
        }
        Ok(Self {
            users,
            items,
            labels,
            features: None,
        })
    }

    /// Attach per-row feature columns. Row counts must match the split.
    pub fn with_features(mut self, features: FeatureColumns) -> Result<Self, SamplerError> {
        if features.len() != self.len() {
            return Err(SamplerError::InconsistentData(format!(
                "{} feature rows for {} interactions",
                features.len(),
                self.len()
            )));
        }
        self.features = Some(features);
        Ok(self)
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn features(&self) -> Option<&FeatureColumns> {
        self.features.as_ref()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Sampler-facing view of an observed-interaction dataset.
///
/// Implementations must keep `consumed()` consistent with the training split
/// for the lifetime of any session borrowing them.
pub trait InteractionSource {
    /// Size of the user id universe.
    fn n_users(&self) -> usize;
    /// Size of the item id universe; negatives are drawn from `0..n_items`.
    fn n_items(&self) -> usize;
    /// Items each user has interacted with in the training split.
    fn consumed(&self) -> &ConsumedSet;
    /// Positive rows for `mode`.
    fn split(&self, mode: Mode) -> &InteractionSplit;
}

/// In-memory source backed by owned split columns.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    n_users: usize,
    n_items: usize,
    consumed: ConsumedSet,
    train: InteractionSplit,
    test: InteractionSplit,
}

impl InMemorySource {
    /// Build a source; the consumed set is derived from `train`.
    pub fn new(
        n_users: usize,
        n_items: usize,
        train: InteractionSplit,
        test: InteractionSplit,
    ) -> Result<Self, SamplerError> {
        check_ids("train", &train, n_users, n_items)?;
        check_ids("test", &test, n_users, n_items)?;
        let consumed = ConsumedSet::from_pairs(
            train
                .users()
                .iter()
                .copied()
                .zip(train.items().iter().copied()),
        );
        Ok(Self {
            n_users,
            n_items,
            consumed,
            train,
            test,
        })
    }

    /// Replace the derived consumed set, e.g. with one that also covers
    /// interactions held outside the training split.
    pub fn with_consumed(mut self, consumed: ConsumedSet) -> Result<Self, SamplerError> {
        for user in consumed.users() {
            if user as usize >= self.n_users {
                return Err(SamplerError::InconsistentData(format!(
                    "consumed set references user {user} but n_users is {}",
                    self.n_users
                )));
            }
            if let Some(items) = consumed.items(user)
                && let Some(item) = items.iter().find(|item| **item as usize >= self.n_items)
            {
                return Err(SamplerError::InconsistentData(format!(
                    "consumed set references item {item} but n_items is {}",
                    self.n_items
                )));
            }
        }
        self.consumed = consumed;
        Ok(self)
    }
}

impl InteractionSource for InMemorySource {
    fn n_users(&self) -> usize {
        self.n_users
    }

    fn n_items(&self) -> usize {
        self.n_items
    }

    fn consumed(&self) -> &ConsumedSet {
        &self.consumed
    }

    fn split(&self, mode: Mode) -> &InteractionSplit {
        match mode {
            Mode::Train => &self.train,
            Mode::Test => &self.test,
        }
    }
}

fn check_ids(
    name: &str,
    split: &InteractionSplit,
    n_users: usize,
    n_items: usize,
) -> Result<(), SamplerError> {
    if let Some(user) = split.users().iter().find(|user| **user as usize >= n_users) {
        return Err(SamplerError::InconsistentData(format!(
            "{name} split references user {user} but n_users is {n_users}"
        )));
    }
    if let Some(item) = split.items().iter().find(|item| **item as usize >= n_items) {
        return Err(SamplerError::InconsistentData(format!(
            "{name} split references item {item} but n_items is {n_items}"
        )));
    }
    Ok(())
}
