//! K-fold cross-validation of the forest model family.
//!
//! Re-scores the same model family over 5 pinned contiguous folds, training
//! on k-1 folds and scoring RMSE on the remainder. Every row is scored
//! exactly once. No model from this stage is retained; it exists purely to
//! produce the mean-RMSE metric.

use tracing::{debug, info};

use crate::dataset::{kfold_indices, Dataset};
use crate::error::TrainError;
use crate::forest::{ForestParams, RandomForestRegressor};
use crate::ml_engine::metrics;
use crate::types::training_thresholds::MIN_PARTITION_ROWS;

/// K-fold RMSE estimator.
pub struct CrossValidator;

impl CrossValidator {
    /// Mean RMSE across `k` folds.
    ///
    /// Fold assignment is contiguous in row order (pinned, no shuffling);
    /// the per-fold fit seed derives from `seed` plus the fold index.
    ///
    /// # Errors
    /// `InsufficientData` when the dataset holds fewer than two rows per
    /// fold, the smallest size where fold scores still mean anything.
    pub fn mean_rmse(
        dataset: &Dataset,
        params: &ForestParams,
        k: usize,
        seed: u64,
    ) -> Result<f64, TrainError> {
        let n = dataset.len();
        // At least two rows per fold
        let required = (k + MIN_PARTITION_ROWS).max(k * MIN_PARTITION_ROWS);
        if n < required {
            return Err(TrainError::InsufficientData {
                stage: "cross_validation",
                rows: n,
                required,
            });
        }

        let mut fold_rmses = Vec::with_capacity(k);
        for (fold, (train_idx, test_idx)) in kfold_indices(n, k).into_iter().enumerate() {
            let (train_features, train_targets) = dataset.subset(&train_idx);
            let (test_features, test_targets) = dataset.subset(&test_idx);

            let model = RandomForestRegressor::fit(
                &train_features,
                &train_targets,
                params,
                seed.wrapping_add(fold as u64),
            )?;
            let predictions = model.predict_batch(&test_features);
            let fold_rmse = metrics::rmse(&predictions, &test_targets);
            debug!(fold, fold_rmse, test_rows = test_idx.len(), "fold scored");
            fold_rmses.push(fold_rmse);
        }

        let mean = fold_rmses.iter().sum::<f64>() / fold_rmses.len() as f64;
        info!(folds = k, mean_rmse = mean, "cross-validation complete");
        Ok(mean)
    }
}
