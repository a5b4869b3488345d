/// Dense user identifier in `0..n_users`.
/// Example: `0`, `17`
pub type UserId = u32;
/// Dense item identifier in `0..n_items`.
/// Example: `4`, `2048`
pub type ItemId = u32;
/// Sparse feature slot index. The last slot of a feature row holds the item id.
/// Example: `[3, 11, 0, 5]` where `0` is the user and `5` the item
pub type FeatureIndex = u32;
/// Dense feature value paired with a feature slot.
/// Example: `1.0`, `0.37`
pub type FeatureValue = f32;
/// Training target. Observed rows keep their dataset label, negatives use `0.0`.
/// Example: `1.0`, `4.5`, `0.0`
pub type Label = f32;
/// Model score or score margin.
/// Example: `0.82`, `-0.13`
pub type Score = f32;
