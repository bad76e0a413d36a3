//! Dataset assembly: join, select, coerce, filter.
//!
//! Joins prediction rows onto the critical-point catalog by `id_punto`,
//! selects the five required fields, coerces every cell to a finite number
//! and drops any row with a missing value. Column presence is validated
//! up front against the fixed schema contract, before any join work.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::dataset::schema::{
    self, columns, POINTS_TABLE, POINT_COLUMNS, PREDICTIONS_TABLE, PREDICTION_COLUMNS,
};
use crate::dataset::{Dataset, Observation};
use crate::error::TrainError;
use crate::source::Record;

/// Assembles raw fetched rows into a training dataset.
pub struct DatasetAssembler;

impl DatasetAssembler {
    /// Assemble observations from raw prediction and point rows.
    ///
    /// Left-join semantics: a prediction whose `id_punto` has no catalog
    /// match carries missing geo fields and is dropped by the completeness
    /// filter, so it never reaches training. Duplicate catalog keys keep the
    /// first row seen.
    ///
    /// An empty result is not an error here; downstream stages raise
    /// `InsufficientData` instead of fitting on nothing.
    ///
    /// # Errors
    /// `TrainError::Schema` when required columns are absent from either
    /// table's field set (complete missing list, checked before the join).
    pub fn assemble(predictions: &[Record], points: &[Record]) -> Result<Dataset, TrainError> {
        let predictions: Vec<Record> = predictions.iter().map(schema::normalize_record).collect();
        let points: Vec<Record> = points.iter().map(schema::normalize_record).collect();

        schema::validate_columns(PREDICTIONS_TABLE, &predictions, &PREDICTION_COLUMNS)?;
        schema::validate_columns(POINTS_TABLE, &points, &POINT_COLUMNS)?;

        // Point catalog index by canonical join key, first match wins
        let mut catalog: HashMap<String, &Record> = HashMap::with_capacity(points.len());
        for point in &points {
            if let Some(key) = point.get(columns::ID_PUNTO).and_then(schema::join_key) {
                catalog.entry(key).or_insert(point);
            }
        }

        let mut observations = Vec::with_capacity(predictions.len());
        let mut dropped = 0usize;

        for prediction in &predictions {
            match Self::assemble_row(prediction, &catalog) {
                Some(observation) => observations.push(observation),
                None => dropped += 1,
            }
        }

        info!(
            rows = observations.len(),
            dropped,
            points = catalog.len(),
            "dataset assembled"
        );

        Ok(Dataset::new(observations))
    }

    /// Join and coerce a single prediction row; None means the row is
    /// incomplete and excluded (never imputed).
    fn assemble_row(
        prediction: &Record,
        catalog: &HashMap<String, &Record>,
    ) -> Option<Observation> {
        let key = prediction
            .get(columns::ID_PUNTO)
            .and_then(schema::join_key)?;

        let precipitation_level = prediction
            .get(columns::NIVEL_PRECIPITACION)
            .and_then(schema::coerce_numeric)?;
        let flood_risk = prediction
            .get(columns::RIESGO_INUNDACION)
            .and_then(schema::coerce_numeric)?;

        let point = match catalog.get(&key) {
            Some(point) => point,
            None => {
                debug!(id_punto = %key, "prediction has no catalog match, dropping");
                return None;
            }
        };

        let latitude = point.get(columns::LATITUD).and_then(schema::coerce_numeric)?;
        let longitude = point.get(columns::LONGITUD).and_then(schema::coerce_numeric)?;
        let altitude = point.get(columns::ALTITUD).and_then(schema::coerce_numeric)?;

        Some(Observation {
            id_point: key,
            precipitation_level,
            latitude,
            longitude,
            altitude,
            flood_risk,
        })
    }
}
