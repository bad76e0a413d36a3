//! Random-forest regressor: bagged CART regression trees.
//!
//! Each tree fits a bootstrap resample of the training rows; predictions
//! average the per-tree outputs. Per-tree RNGs derive from the caller's seed
//! plus the tree index, so a fit is reproducible for a fixed seed and input
//! order. Feature importances are summed SSE reductions across all trees,
//! normalized to sum to 1.

mod tree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::TrainError;
use crate::types::FEATURE_COUNT;
use tree::RegressionTree;

/// Hyperparameters of the forest model family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth; None is unconstrained
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl std::fmt::Display for ForestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n_estimators={}, max_depth={}, min_samples_split={}",
            self.n_estimators,
            self.max_depth.map_or("None".to_string(), |d| d.to_string()),
            self.min_samples_split
        )
    }
}

/// A fitted forest. Ephemeral: owned by the invocation that created it and
/// discarded when the invocation ends; there is no save/load.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    params: ForestParams,
    importances: [f64; FEATURE_COUNT],
}

impl RandomForestRegressor {
    /// Fit a forest on the full feature matrix and target vector.
    ///
    /// # Errors
    /// `TrainError::Training` on empty input, mismatched lengths, a zero
    /// tree count, or non-finite values that slipped past coercion.
    pub fn fit(
        features: &[[f64; FEATURE_COUNT]],
        targets: &[f64],
        params: &ForestParams,
        seed: u64,
    ) -> Result<Self, TrainError> {
        if features.is_empty() || features.len() != targets.len() {
            return Err(TrainError::Training {
                stage: "forest_fit",
                detail: format!(
                    "invalid training shape: {} feature rows, {} targets",
                    features.len(),
                    targets.len()
                ),
            });
        }
        if params.n_estimators == 0 {
            return Err(TrainError::Training {
                stage: "forest_fit",
                detail: "n_estimators must be at least 1".to_string(),
            });
        }
        let finite = features.iter().flatten().all(|v| v.is_finite())
            && targets.iter().all(|v| v.is_finite());
        if !finite {
            return Err(TrainError::Training {
                stage: "forest_fit",
                detail: "non-finite value in training data".to_string(),
            });
        }

        let n = features.len();
        let trees: Vec<RegressionTree> = (0..params.n_estimators)
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(
                    features,
                    targets,
                    &sample,
                    params.max_depth,
                    params.min_samples_split,
                )
            })
            .collect();

        let mut importances = [0.0; FEATURE_COUNT];
        for tree in &trees {
            for (total, part) in importances.iter_mut().zip(tree.importances()) {
                *total += part;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for value in &mut importances {
                *value /= sum;
            }
        }

        Ok(Self {
            trees,
            params: params.clone(),
            importances,
        })
    }

    /// Predict one target value as the mean over all trees.
    pub fn predict(&self, sample: &[f64; FEATURE_COUNT]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(sample)).sum();
        sum / self.trees.len() as f64
    }

    /// Predict targets for every row of a feature matrix.
    pub fn predict_batch(&self, features: &[[f64; FEATURE_COUNT]]) -> Vec<f64> {
        features.iter().map(|s| self.predict(s)).collect()
    }

    /// Normalized per-feature importances (sum to 1 when any split occurred,
    /// all zeros otherwise).
    pub fn feature_importances(&self) -> [f64; FEATURE_COUNT] {
        self.importances
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}
