//! riada-core: Flood-Risk Model Training Engine
//!
//! Library for training a flood-risk regression model from two relational
//! tables (risk predictions and critical monitoring points).
//!
//! ## Architecture
//!
//! - **Dataset Assembler**: Joins predictions onto the point catalog,
//!   validates the schema contract and drops incomplete rows
//! - **Train/Test Evaluator**: Seeded 80/20 split with held-out RMSE/R² and
//!   train RMSE for bias-variance reporting
//! - **Cross-Validator**: 5-fold mean RMSE for a robust generalization estimate
//! - **Grid Search**: Exhaustive 12-cell hyperparameter search with nested
//!   3-fold cross-validation and a wall-clock budget
//! - **Importance Reporter**: Impurity-decrease feature importances from the
//!   refit best model
//!
//! One synchronous invocation runs all stages in order and produces a
//! [`TrainingReport`] or a typed [`TrainError`]; nothing is persisted and no
//! state is shared between invocations.

pub mod config;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod ml_engine;
pub mod source;
pub mod types;

// Re-export configuration
pub use config::TrainingConfig;

// Re-export commonly used types
pub use types::{FeatureImportance, TrainingReport, training_thresholds};

// Re-export dataset assembly
pub use dataset::{Dataset, DatasetAssembler, Observation};

// Re-export model family
pub use forest::{ForestParams, RandomForestRegressor};

// Re-export training stages
pub use ml_engine::{
    CrossValidator, GridSearch, GridSearchOutcome, RiskModelTrainer, SearchGrid,
    SplitEvaluation, TrainTestEvaluator,
};

// Re-export errors and the table source boundary
pub use error::TrainError;
pub use source::{Record, StaticTableSource, TableSource};
