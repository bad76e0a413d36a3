//! Pipeline orchestrator.
//!
//! Runs assembly → train/test evaluation → cross-validation → grid search →
//! importance reporting in order, all within one blocking call. Every stage
//! validates its own preconditions; any failure aborts the invocation and no
//! partial report is produced. Nothing is cached or shared between calls:
//! each invocation gets a fresh dataset snapshot and a fresh model.

use chrono::Utc;
use tracing::info;

use crate::config::TrainingConfig;
use crate::dataset::schema::{POINTS_TABLE, PREDICTIONS_TABLE};
use crate::dataset::{Dataset, DatasetAssembler};
use crate::error::TrainError;
use crate::ml_engine::{
    importance, CrossValidator, GridSearch, TrainTestEvaluator,
};
use crate::source::TableSource;
use crate::types::TrainingReport;

/// End-to-end trainer for the flood-risk model.
pub struct RiskModelTrainer {
    config: TrainingConfig,
}

impl RiskModelTrainer {
    /// Build a trainer, rejecting invalid configuration up front.
    pub fn new(config: TrainingConfig) -> Result<Self, TrainError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Fetch both tables from the source, assemble and train.
    ///
    /// The source owns connectivity and caching; fetch failures surface as
    /// empty tables and end up as an insufficient-data error here.
    pub fn train_from_source(&self, source: &dyn TableSource) -> Result<TrainingReport, TrainError> {
        let predictions = source.fetch_table(PREDICTIONS_TABLE);
        let points = source.fetch_table(POINTS_TABLE);
        info!(
            predictions = predictions.len(),
            points = points.len(),
            "tables fetched"
        );

        let dataset = DatasetAssembler::assemble(&predictions, &points)?;
        self.train(&dataset)
    }

    /// Train on an already-assembled dataset and produce the full report.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingReport, TrainError> {
        let config = &self.config;
        info!(rows = dataset.len(), seed = config.seed, "training pipeline starting");

        let evaluation = TrainTestEvaluator::evaluate(
            dataset,
            &config.base_params,
            config.test_fraction,
            config.seed,
        )?;

        let cv_mean_rmse = CrossValidator::mean_rmse(
            dataset,
            &config.base_params,
            config.cv_folds,
            config.seed,
        )?;

        let outcome = GridSearch::run(
            dataset,
            &config.grid,
            config.search_folds,
            config.seed,
            config.search_budget,
        )?;

        let feature_importance = importance::ranked_importances(&outcome.model);

        info!(
            held_out_rmse = evaluation.held_out_rmse,
            cv_mean_rmse,
            best_params = %outcome.best_params,
            "training pipeline complete"
        );

        Ok(TrainingReport {
            generated_at: Utc::now(),
            sample_count: dataset.len(),
            held_out_rmse: evaluation.held_out_rmse,
            held_out_r2: evaluation.held_out_r2,
            train_rmse: evaluation.train_rmse,
            cv_mean_rmse,
            best_params: outcome.best_params,
            feature_importance,
        })
    }
}
