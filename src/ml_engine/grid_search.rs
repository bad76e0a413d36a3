//! Exhaustive hyperparameter search with nested cross-validation.
//!
//! Every grid cell is scored by 3-fold cross-validated negative MSE. The
//! cell with the greatest score wins; ties break to the lowest enumeration
//! index (row-major over n_estimators × max_depth × min_samples_split).
//! Cells evaluate in parallel via rayon — each cell × fold is independent —
//! and the (score, index) max-reduction makes aggregation order-independent
//! up to the pinned tie-break. A failing fold aborts the whole search; the
//! wall-clock budget is checked before each cell starts.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::{kfold_indices, Dataset};
use crate::error::TrainError;
use crate::forest::{ForestParams, RandomForestRegressor};
use crate::ml_engine::metrics;
use crate::types::training_thresholds::MIN_PARTITION_ROWS;

/// Finite hyperparameter grid. Default covers the 12 standard combinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200],
            max_depth: vec![Some(5), Some(10), None],
            min_samples_split: vec![2, 5],
        }
    }
}

impl SearchGrid {
    /// Enumerate all cells in pinned row-major order: n_estimators outermost,
    /// then max_depth, then min_samples_split. The enumeration index is the
    /// tie-break rank.
    pub fn cells(&self) -> Vec<ForestParams> {
        let mut cells =
            Vec::with_capacity(self.n_estimators.len() * self.max_depth.len() * self.min_samples_split.len());
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    cells.push(ForestParams {
                        n_estimators,
                        max_depth,
                        min_samples_split,
                    });
                }
            }
        }
        cells
    }

    pub fn is_empty(&self) -> bool {
        self.n_estimators.is_empty()
            || self.max_depth.is_empty()
            || self.min_samples_split.is_empty()
    }
}

/// Result of a completed search.
#[derive(Debug)]
pub struct GridSearchOutcome {
    /// Winning configuration
    pub best_params: ForestParams,
    /// Winning negative-MSE score
    pub best_score: f64,
    /// Model refit on the ENTIRE dataset with the winning configuration
    pub model: RandomForestRegressor,
    /// Cells evaluated (always the full grid on success)
    pub cells_evaluated: usize,
}

/// Exhaustive grid search over the forest model family.
pub struct GridSearch;

impl GridSearch {
    /// Score every cell, pick the winner and refit it on the full dataset.
    ///
    /// # Errors
    /// - `InsufficientData` when the dataset cannot support `folds`
    /// - `Training` when a fold fails (detail names the cell) or the
    ///   wall-clock budget is exhausted
    pub fn run(
        dataset: &Dataset,
        grid: &SearchGrid,
        folds: usize,
        seed: u64,
        budget: Duration,
    ) -> Result<GridSearchOutcome, TrainError> {
        let n = dataset.len();
        let required = (folds + MIN_PARTITION_ROWS).max(folds * MIN_PARTITION_ROWS);
        if n < required {
            return Err(TrainError::InsufficientData {
                stage: "grid_search",
                rows: n,
                required,
            });
        }
        if grid.is_empty() {
            return Err(TrainError::Training {
                stage: "grid_search",
                detail: "hyperparameter grid is empty".to_string(),
            });
        }

        let cells = grid.cells();
        let fold_splits = kfold_indices(n, folds);
        let started = Instant::now();

        info!(cells = cells.len(), folds, rows = n, "grid search starting");

        // collect preserves cell order, so scores[i] belongs to cells[i]
        let scores: Vec<f64> = cells
            .par_iter()
            .enumerate()
            .map(|(idx, params)| {
                if started.elapsed() > budget {
                    return Err(TrainError::Training {
                        stage: "grid_search",
                        detail: format!(
                            "time budget of {budget:?} exhausted before cell {idx} ({params})"
                        ),
                    });
                }
                let score = Self::score_cell(dataset, &fold_splits, params, seed, idx)?;
                debug!(cell = idx, %params, score, "cell scored");
                Ok(score)
            })
            .collect::<Result<_, _>>()?;

        // Strict > keeps the first-encountered cell on ties
        let mut best_idx = 0;
        for (idx, &score) in scores.iter().enumerate() {
            if score > scores[best_idx] {
                best_idx = idx;
            }
        }
        let best_params = cells[best_idx].clone();
        let best_score = scores[best_idx];

        let model = RandomForestRegressor::fit(
            &dataset.features(),
            &dataset.targets(),
            &best_params,
            seed,
        )?;

        info!(
            best_cell = best_idx,
            params = %best_params,
            best_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "grid search complete"
        );

        Ok(GridSearchOutcome {
            best_params,
            best_score,
            model,
            cells_evaluated: cells.len(),
        })
    }

    /// Negative mean MSE of one cell across all folds.
    fn score_cell(
        dataset: &Dataset,
        fold_splits: &[(Vec<usize>, Vec<usize>)],
        params: &ForestParams,
        seed: u64,
        cell_idx: usize,
    ) -> Result<f64, TrainError> {
        let mut total_mse = 0.0;
        for (fold, (train_idx, test_idx)) in fold_splits.iter().enumerate() {
            let (train_features, train_targets) = dataset.subset(train_idx);
            let (test_features, test_targets) = dataset.subset(test_idx);

            let model = RandomForestRegressor::fit(
                &train_features,
                &train_targets,
                params,
                seed.wrapping_add(fold as u64),
            )
            .map_err(|e| TrainError::Training {
                stage: "grid_search",
                detail: format!("cell {cell_idx} ({params}), fold {fold}: {e}"),
            })?;

            let predictions = model.predict_batch(&test_features);
            total_mse += metrics::mse(&predictions, &test_targets);
        }
        Ok(-(total_mse / fold_splits.len() as f64))
    }
}
