//! Shared types: training thresholds, `TrainingReport`, `FeatureImportance`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forest::ForestParams;

/// Pipeline defaults and guard thresholds.
pub mod training_thresholds {
    /// Fraction of rows held out for the test partition
    pub const TEST_FRACTION: f64 = 0.2;
    /// Folds for the standalone cross-validation stage
    pub const CV_FOLDS: usize = 5;
    /// Folds for grid-search nested cross-validation
    pub const SEARCH_FOLDS: usize = 3;
    /// Minimum rows in either side of a train/test split
    pub const MIN_PARTITION_ROWS: usize = 2;
    /// Wall-clock budget for the grid search (seconds)
    pub const DEFAULT_SEARCH_BUDGET_SECS: u64 = 60;
    /// Default seed for reproducible splits and bootstrap resampling
    pub const DEFAULT_SEED: u64 = 42;
}

/// Names of the four model inputs, in feature-vector order.
pub const FEATURE_NAMES: [&str; 4] = [
    "precipitation_level",
    "latitude",
    "longitude",
    "altitude",
];

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 4;

/// A feature name paired with its importance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Non-negative; importances sum to 1 across features when the refit
    /// model made at least one split.
    pub importance: f64,
}

/// Final output of one pipeline invocation. All-or-nothing: a report is only
/// produced when every stage succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// Rows in the assembled dataset (after join and completeness filter)
    pub sample_count: usize,
    /// RMSE on the 20% held-out partition
    pub held_out_rmse: f64,
    /// R² on the held-out partition
    pub held_out_r2: f64,
    /// RMSE on the training partition. Train RMSE far below held-out RMSE
    /// indicates high variance; reporting only, no remediation is triggered.
    pub train_rmse: f64,
    /// Mean RMSE across the 5 cross-validation folds
    pub cv_mean_rmse: f64,
    /// Winning grid-search configuration
    pub best_params: ForestParams,
    /// Importance pairs sorted ascending by score (bar-chart convention)
    pub feature_importance: Vec<FeatureImportance>,
}
