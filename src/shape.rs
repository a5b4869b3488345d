use crate::constants::sampler::NEGATIVE_LABEL;
use crate::data::{FeatureBatch, InteractionBatch};
use crate::errors::SamplerError;
use crate::source::{FeatureColumns, InteractionSplit};
use crate::types::{ItemId, UserId};

/// One row of an assembled batch, expressed against the source split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmittedRow {
    /// Source row copied as-is, keeping its label.
    Positive(usize),
    /// Source row with its item replaced by a sampled negative, labeled `0.0`.
    Negative { source: usize, item: ItemId },
}

impl EmittedRow {
    /// `true` for synthesized rows.
    pub fn is_negative(&self) -> bool {
        matches!(self, EmittedRow::Negative { .. })
    }
}

/// Layout of the rows a batch is materialized into.
pub trait RowShape {
    /// Output batch type.
    type Batch;
    /// Number of positive rows in the underlying split.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// User owning positive row `row`.
    fn user(&self, row: usize) -> UserId;
    /// Materialize `rows` in order. Every output row is an independent copy.
    fn assemble(&self, rows: &[EmittedRow]) -> Self::Batch;
}

/// Plain `(user, item, label)` rows.
#[derive(Clone, Copy, Debug)]
pub struct PlainRows<'a> {
    split: &'a InteractionSplit,
}

impl<'a> PlainRows<'a> {
    /// Plain view over `split`.
    pub fn new(split: &'a InteractionSplit) -> Self {
        Self { split }
    }
}

impl RowShape for PlainRows<'_> {
    type Batch = InteractionBatch;

    fn len(&self) -> usize {
        self.split.len()
    }

    fn user(&self, row: usize) -> UserId {
        self.split.users()[row]
    }

    fn assemble(&self, rows: &[EmittedRow]) -> InteractionBatch {
        let mut batch = InteractionBatch::with_capacity(rows.len());
        for row in rows {
            match *row {
                EmittedRow::Positive(idx) => {
                    batch.users.push(self.split.users()[idx]);
                    batch.items.push(self.split.items()[idx]);
                    batch.labels.push(self.split.labels()[idx]);
                }
                EmittedRow::Negative { source, item } => {
                    batch.users.push(self.split.users()[source]);
                    batch.items.push(item);
                    batch.labels.push(NEGATIVE_LABEL);
                }
            }
        }
        batch
    }
}

/// Feature-augmented rows. Negatives copy every slot of their source row and
/// overwrite the last index slot with the sampled item.
#[derive(Clone, Copy, Debug)]
pub struct FeatureRows<'a> {
    split: &'a InteractionSplit,
    features: &'a FeatureColumns,
}

impl<'a> FeatureRows<'a> {
    /// Feature view over `split`; fails when the split has no feature columns.
    pub fn new(split: &'a InteractionSplit) -> Result<Self, SamplerError> {
        let features = split.features().ok_or_else(|| {
            SamplerError::InconsistentData("split carries no feature columns".into())
        })?;
        Ok(Self { split, features })
    }
}

impl RowShape for FeatureRows<'_> {
    type Batch = FeatureBatch;

    fn len(&self) -> usize {
        self.split.len()
    }

    fn user(&self, row: usize) -> UserId {
        self.split.users()[row]
    }

    fn assemble(&self, rows: &[EmittedRow]) -> FeatureBatch {
        let mut batch = FeatureBatch::with_capacity(rows.len());
        for row in rows {
            match *row {
                EmittedRow::Positive(idx) => {
                    batch.feat_indices.push(self.features.indices()[idx].clone());
                    batch.feat_values.push(self.features.values()[idx].clone());
                    batch.labels.push(self.split.labels()[idx]);
                }
                EmittedRow::Negative { source, item } => {
                    let mut indices = self.features.indices()[source].clone();
                    if let Some(slot) = indices.last_mut() {
                        *slot = item;
                    }
                    batch.feat_indices.push(indices);
                    batch.feat_values.push(self.features.values()[source].clone());
                    batch.labels.push(NEGATIVE_LABEL);
                }
            }
        }
        batch
    }
}
