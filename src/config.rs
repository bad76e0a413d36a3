//! Pipeline configuration with defaults and validation.
//!
//! Table names are not configurable: the schema contract is fixed in
//! [`crate::dataset::schema`]. Connection secrets and caching belong to the
//! caller that implements [`crate::source::TableSource`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TrainError;
use crate::forest::ForestParams;
use crate::ml_engine::SearchGrid;
use crate::types::training_thresholds::{
    CV_FOLDS, DEFAULT_SEARCH_BUDGET_SECS, DEFAULT_SEED, SEARCH_FOLDS, TEST_FRACTION,
};

/// Configuration for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Seed for the train/test shuffle and bootstrap resampling
    pub seed: u64,
    /// Held-out fraction of the train/test split
    pub test_fraction: f64,
    /// Folds for the standalone cross-validation stage
    pub cv_folds: usize,
    /// Folds for grid-search nested cross-validation
    pub search_folds: usize,
    /// Forest parameters for the train/test and cross-validation stages
    pub base_params: ForestParams,
    /// Hyperparameter grid for the search stage
    pub grid: SearchGrid,
    /// Wall-clock budget for the grid search
    pub search_budget: Duration,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: TEST_FRACTION,
            cv_folds: CV_FOLDS,
            search_folds: SEARCH_FOLDS,
            base_params: ForestParams::default(),
            grid: SearchGrid::default(),
            search_budget: Duration::from_secs(DEFAULT_SEARCH_BUDGET_SECS),
        }
    }
}

impl TrainingConfig {
    /// Reject configurations no stage could honor.
    pub fn validate(&self) -> Result<(), TrainError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(TrainError::Training {
                stage: "config",
                detail: format!("test_fraction {} outside (0, 1)", self.test_fraction),
            });
        }
        if self.cv_folds < 2 || self.search_folds < 2 {
            return Err(TrainError::Training {
                stage: "config",
                detail: format!(
                    "cross-validation needs at least 2 folds (cv_folds={}, search_folds={})",
                    self.cv_folds, self.search_folds
                ),
            });
        }
        if self.grid.is_empty() {
            return Err(TrainError::Training {
                stage: "config",
                detail: "hyperparameter grid is empty".to_string(),
            });
        }
        if self.search_budget.is_zero() {
            return Err(TrainError::Training {
                stage: "config",
                detail: "search budget must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_test_fraction_rejected() {
        let config = TrainingConfig {
            test_fraction: 1.0,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_single_fold_rejected() {
        let config = TrainingConfig {
            cv_folds: 1,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = TrainingConfig {
            search_budget: Duration::ZERO,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
