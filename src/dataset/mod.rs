//! Assembled training data and deterministic partitioning.
//!
//! - `Observation` / `Dataset`: the assembled rows the model trains on
//! - `train_test_split`: seeded Fisher-Yates shuffle, reproducible for a
//!   fixed seed and input order
//! - `kfold_indices`: pinned contiguous fold assignment (no shuffling) so
//!   fold membership is identical across runs and reimplementations

pub mod assembler;
pub mod schema;

pub use assembler::DatasetAssembler;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::types::FEATURE_COUNT;

/// One assembled training row. All numeric fields are finite; rows failing
/// coercion never become observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Join key into the point catalog
    pub id_point: String,
    pub precipitation_level: f64,
    /// Decimal degrees
    pub latitude: f64,
    /// Decimal degrees
    pub longitude: f64,
    /// Meters
    pub altitude: f64,
    /// Target, conceptually in [0, 1]; neither clamped nor rejected
    pub flood_risk: f64,
}

impl Observation {
    /// Feature vector in [`crate::types::FEATURE_NAMES`] order.
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.precipitation_level,
            self.latitude,
            self.longitude,
            self.altitude,
        ]
    }
}

/// Assembled dataset. Row order carries no semantics but is preserved so
/// split and fold membership are reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Feature matrix for all rows, in row order.
    pub fn features(&self) -> Vec<[f64; FEATURE_COUNT]> {
        self.observations.iter().map(Observation::features).collect()
    }

    /// Target vector for all rows, in row order.
    pub fn targets(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.flood_risk).collect()
    }

    /// Feature/target arrays for the given row indices. Crate-internal:
    /// callers are the training stages, which only pass indices produced by
    /// `train_test_split` / `kfold_indices` over this dataset's length.
    pub(crate) fn subset(&self, indices: &[usize]) -> (Vec<[f64; FEATURE_COUNT]>, Vec<f64>) {
        let features = indices
            .iter()
            .map(|&i| self.observations[i].features())
            .collect();
        let targets = indices.iter().map(|&i| self.observations[i].flood_risk).collect();
        (features, targets)
    }
}

/// Split row indices into (train, test) with a seeded shuffle.
///
/// Test size is `round(n * test_fraction)` clamped to `[1, n-1]`; callers
/// guard minimum partition sizes themselves. Deterministic for a fixed seed
/// and fixed `n`.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = test_partition_size(n_rows, test_fraction);

    let test = indices[..n_test.min(n_rows)].to_vec();
    let train = indices[n_test.min(n_rows)..].to_vec();
    (train, test)
}

/// Test-partition size for `n_rows`: `round(n * test_fraction)` clamped to
/// `[1, n-1]`. Shared by the split itself and by guard calculations so both
/// agree on partition sizing.
pub(crate) fn test_partition_size(n_rows: usize, test_fraction: f64) -> usize {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_test = ((n_rows as f64) * test_fraction).round() as usize;
    n_test.clamp(1, n_rows.saturating_sub(1).max(1))
}

/// Contiguous k-fold assignment over `0..n_rows`.
///
/// Fold f covers a contiguous index block in row order; the first
/// `n mod k` folds get one extra row. Returns (train, test) index pairs.
/// Every row appears in exactly one test block and in k-1 train blocks.
pub fn kfold_indices(n_rows: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    let base = n_rows / k;
    let extra = n_rows % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        let test: Vec<usize> = (start..end).collect();
        let train: Vec<usize> = (0..start).chain(end..n_rows).collect();
        folds.push((train, test));
        start = end;
    }
    folds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_observation(i: usize) -> Observation {
        Observation {
            id_point: format!("{i}"),
            precipitation_level: i as f64,
            latitude: 40.0,
            longitude: -3.7,
            altitude: 600.0,
            flood_risk: 0.5,
        }
    }

    #[test]
    fn test_split_is_reproducible() {
        let (train_a, test_a) = train_test_split(50, 0.2, 42);
        let (train_b, test_b) = train_test_split(50, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_split_differs_across_seeds() {
        let (_, test_a) = train_test_split(50, 0.2, 42);
        let (_, test_b) = train_test_split(50, 0.2, 43);
        assert_ne!(test_a, test_b);
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let (train, test) = train_test_split(50, 0.2, 7);
        assert_eq!(test.len(), 10);
        assert_eq!(train.len(), 40);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_clamps_tiny_inputs() {
        // 4 rows at 20% rounds to 1 test row, never 0
        let (train, test) = train_test_split(4, 0.2, 1);
        assert_eq!(test.len(), 1);
        assert_eq!(train.len(), 3);
    }

    #[test]
    fn test_kfold_scores_every_row_exactly_once() {
        let folds = kfold_indices(23, 5);
        assert_eq!(folds.len(), 5);

        let mut scored: Vec<usize> = folds.iter().flat_map(|(_, test)| test.clone()).collect();
        scored.sort_unstable();
        assert_eq!(scored, (0..23).collect::<Vec<_>>());

        // Each row trains in exactly k-1 folds
        let mut train_counts = vec![0usize; 23];
        for (train, _) in &folds {
            for &i in train {
                train_counts[i] += 1;
            }
        }
        assert!(train_counts.iter().all(|&c| c == 4));
    }

    #[test]
    fn test_kfold_fold_sizes_balanced() {
        let folds = kfold_indices(23, 5);
        let sizes: Vec<usize> = folds.iter().map(|(_, test)| test.len()).collect();
        // 23 = 5+5+5+4+4
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);
    }

    #[test]
    fn test_subset_extracts_matching_rows() {
        let dataset = Dataset::new((0..5).map(make_observation).collect());
        let (features, targets) = dataset.subset(&[1, 3]);
        assert_eq!(features.len(), 2);
        assert_eq!(targets.len(), 2);
        assert!((features[0][0] - 1.0).abs() < f64::EPSILON);
        assert!((features[1][0] - 3.0).abs() < f64::EPSILON);
    }
}
