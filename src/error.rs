//! Typed errors for the training pipeline.
//!
//! Every failure is terminal for the current invocation: there are no retries
//! and no partial reports. Each stage validates its own preconditions before
//! doing expensive work.

use thiserror::Error;

/// Errors surfaced by the training pipeline.
#[derive(Error, Debug)]
pub enum TrainError {
    /// Required columns absent from a fetched table. Carries the complete
    /// list of missing columns, never just the first one found.
    #[error("table '{table}' is missing required columns: {missing:?}")]
    Schema { table: String, missing: Vec<String> },

    /// Assembled dataset is empty or too small for a meaningful split or
    /// fold partition.
    #[error("insufficient data in {stage}: {rows} rows (need {required})")]
    InsufficientData {
        stage: &'static str,
        rows: usize,
        required: usize,
    },

    /// A fit or scoring operation failed for numerical reasons, or the grid
    /// search exceeded its time budget. The detail names the parameter
    /// combination where applicable, so the failure can be reproduced.
    #[error("training failed in {stage}: {detail}")]
    Training { stage: &'static str, detail: String },
}

impl TrainError {
    /// Stage name where the error originated (for logging and assertions).
    /// Schema violations always originate in assembly.
    pub fn stage(&self) -> &str {
        match self {
            Self::Schema { .. } => "assembly",
            Self::InsufficientData { stage, .. } | Self::Training { stage, .. } => stage,
        }
    }
}
