//! Feature-importance reporting.
//!
//! Pairs each feature name with the refit model's normalized importance and
//! sorts ASCENDING by score. Ascending order is a presentation convention
//! carried from the dashboard's bar chart, not a numerical requirement;
//! equal scores keep feature-vector order (stable sort).

use crate::forest::RandomForestRegressor;
use crate::types::{FeatureImportance, FEATURE_NAMES};

/// Ascending importance pairs from a fitted model.
pub fn ranked_importances(model: &RandomForestRegressor) -> Vec<FeatureImportance> {
    let mut pairs: Vec<FeatureImportance> = FEATURE_NAMES
        .iter()
        .zip(model.feature_importances())
        .map(|(name, importance)| FeatureImportance {
            feature: (*name).to_string(),
            importance,
        })
        .collect();
    pairs.sort_by(|a, b| {
        a.importance
            .partial_cmp(&b.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pairs
}
