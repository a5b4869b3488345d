use crate::errors::SamplerError;
use crate::types::{ItemId, Score, UserId};

/// Caller-supplied scoring used to precompute pairwise margins.
pub trait PairScorer {
    /// Preference of `user` for `item`.
    fn score(&self, user: UserId, item: ItemId) -> Result<Score, SamplerError>;

    /// `score(user, item_i) - score(user, item_j)`.
    fn margin(&self, user: UserId, item_i: ItemId, item_j: ItemId) -> Result<Score, SamplerError> {
        Ok(self.score(user, item_i)? - self.score(user, item_j)?)
    }
}

/// Dense user and item factor matrices (row-major, shared dimension).
#[derive(Clone, Debug, PartialEq)]
pub struct LatentFactors {
    dim: usize,
    user_factors: Vec<f32>,
    item_factors: Vec<f32>,
}

impl LatentFactors {
    /// Wrap flat row-major factor buffers of width `dim`.
    pub fn new(
        dim: usize,
        user_factors: Vec<f32>,
        item_factors: Vec<f32>,
    ) -> Result<Self, SamplerError> {
        if dim == 0 {
            return Err(SamplerError::InvalidConfig(
                "factor dimension must be a positive integer".into(),
            ));
        }
        if user_factors.len() % dim != 0 || item_factors.len() % dim != 0 {
            return Err(SamplerError::InvalidConfig(format!(
                "factor buffers ({} user, {} item values) are not multiples of dimension {dim}",
                user_factors.len(),
                item_factors.len()
            )));
        }
        Ok(Self {
            dim,
            user_factors,
            item_factors,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_users(&self) -> usize {
        self.user_factors.len() / self.dim
    }

    pub fn n_items(&self) -> usize {
        self.item_factors.len() / self.dim
    }

    pub fn user_vector(&self, user: UserId) -> Result<&[f32], SamplerError> {
        row(&self.user_factors, self.dim, user, "user")
    }

    pub fn item_vector(&self, item: ItemId) -> Result<&[f32], SamplerError> {
        row(&self.item_factors, self.dim, item, "item")
    }
}

impl PairScorer for LatentFactors {
    fn score(&self, user: UserId, item: ItemId) -> Result<Score, SamplerError> {
        let u = self.user_vector(user)?;
        let i = self.item_vector(item)?;
        Ok(u.iter().zip(i).map(|(a, b)| a * b).sum())
    }
}

fn row<'m>(
    matrix: &'m [f32],
    dim: usize,
    id: u32,
    kind: &'static str,
) -> Result<&'m [f32], SamplerError> {
    let start = id as usize * dim;
    matrix
        .get(start..start + dim)
        .ok_or(SamplerError::UnknownId {
            kind,
            id,
            bound: matrix.len() / dim,
        })
}

/// Dense item-item similarity matrix (row-major, `n_items × n_items`).
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMatrix {
    n_items: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wrap `n_items * n_items` row-major similarities.
    pub fn new(n_items: usize, values: Vec<f32>) -> Result<Self, SamplerError> {
        if values.len() != n_items * n_items {
            return Err(SamplerError::InvalidConfig(format!(
                "similarity matrix has {} values, expected {n_items}x{n_items}",
                values.len()
            )));
        }
        Ok(Self { n_items, values })
    }

    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Similarity of `a` to `b`.
    pub fn get(&self, a: ItemId, b: ItemId) -> Result<f32, SamplerError> {
        for id in [a, b] {
            if id as usize >= self.n_items {
                return Err(SamplerError::UnknownId {
                    kind: "item",
                    id,
                    bound: self.n_items,
                });
            }
        }
        Ok(self.values[a as usize * self.n_items + b as usize])
    }

    /// The `k` items of `candidates` most similar to `item`, best first, and
    /// their summed similarity. Ties go to the smaller item id.
    pub fn top_k(
        &self,
        item: ItemId,
        candidates: &[ItemId],
        k: usize,
    ) -> Result<(Vec<ItemId>, Score), SamplerError> {
        let mut scored = candidates
            .iter()
            .map(|candidate| Ok((*candidate, self.get(item, *candidate)?)))
            .collect::<Result<Vec<_>, SamplerError>>()?;
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);
        let sum = scored.iter().map(|(_, sim)| sim).sum();
        Ok((scored.into_iter().map(|(id, _)| id).collect(), sum))
    }
}
