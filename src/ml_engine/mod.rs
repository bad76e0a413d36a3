//! Training stages for the flood-risk model.
//!
//! ## Architecture
//! - `metrics`: RMSE / MSE / R² scoring
//! - `evaluator`: single seeded 80/20 split with bias-variance reporting
//! - `cross_validation`: 5-fold mean RMSE generalization estimate
//! - `grid_search`: exhaustive 12-cell search with nested 3-fold CV,
//!   deterministic tie-break and a wall-clock budget
//! - `importance`: ascending feature-importance pairs from the refit model
//! - `analyzer`: orchestrator running all stages into a `TrainingReport`

pub mod cross_validation;
pub mod evaluator;
pub mod grid_search;
pub mod importance;
pub mod metrics;

mod analyzer;

// Re-export public types
pub use analyzer::RiskModelTrainer;
pub use cross_validation::CrossValidator;
pub use evaluator::{SplitEvaluation, TrainTestEvaluator};
pub use grid_search::{GridSearch, GridSearchOutcome, SearchGrid};
pub use importance::ranked_importances;
