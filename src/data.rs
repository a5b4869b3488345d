use serde::{Deserialize, Serialize};

pub use crate::types::{FeatureIndex, FeatureValue, ItemId, Label, Score, UserId};

/// Dataset split a sampler reads positives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Training split. Its interactions define every user's consumed set.
    Train,
    /// Held-out split.
    Test,
}

/// Plain mixed batch of positives and synthesized negatives.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionBatch {
    pub users: Vec<UserId>,
    pub items: Vec<ItemId>,
    pub labels: Vec<Label>,
}

impl InteractionBatch {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            users: Vec::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// `true` once the session cursor has run past the end of the split.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(user, item, label)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (UserId, ItemId, Label)> + '_ {
        self.users
            .iter()
            .zip(&self.items)
            .zip(&self.labels)
            .map(|((user, item), label)| (*user, *item, *label))
    }
}

/// Feature-augmented mixed batch.
///
/// The last slot of every `feat_indices` row holds the row's item id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureBatch {
    pub feat_indices: Vec<Vec<FeatureIndex>>,
    pub feat_values: Vec<Vec<FeatureValue>>,
    pub labels: Vec<Label>,
}

impl FeatureBatch {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            feat_indices: Vec::with_capacity(capacity),
            feat_values: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// One BPR triple: observed `item_i`, sampled `item_j`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairwiseSample {
    pub user: UserId,
    pub item_i: ItemId,
    pub item_j: ItemId,
    /// `score(user, item_i) - score(user, item_j)` when a scorer was supplied.
    pub x_uij: Option<Score>,
}

/// Parallel BPR triples for one cursor slice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairwiseBatch {
    pub users: Vec<UserId>,
    pub items_i: Vec<ItemId>,
    pub items_j: Vec<ItemId>,
    /// Per-row margins when a scorer was supplied.
    pub margins: Option<Vec<Score>>,
}

impl PairwiseBatch {
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Similarity-ranked triple used by neighborhood ranking models.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnnPair {
    pub user: UserId,
    pub item_i: ItemId,
    /// Consumed items most similar to `item_i`, best first.
    pub item_i_neighbors: Vec<ItemId>,
    pub item_j: ItemId,
    /// Consumed items most similar to `item_j`, best first.
    pub item_j_neighbors: Vec<ItemId>,
    /// Summed neighbor similarity of `item_i` minus that of `item_j`.
    pub x_uij: Score,
}
