//! Schema contract for the two source tables.
//!
//! The hosted backend uses Spanish column names with inconsistent casing
//! across revisions. Instead of heuristic substring matching at call sites,
//! the expected column set per table is fixed here and validated once at the
//! assembler boundary; all lookups happen on lower-cased names.

use serde_json::Value;
use std::collections::HashSet;

use crate::error::TrainError;
use crate::source::Record;

/// Risk-prediction rows (one per monitored point reading).
pub const PREDICTIONS_TABLE: &str = "predicciones_inundacion";
/// Critical-point catalog (one per monitored location).
pub const POINTS_TABLE: &str = "puntos_criticos";

/// Source column names, post lower-casing.
pub mod columns {
    /// Join key, present in both tables
    pub const ID_PUNTO: &str = "id_punto";
    pub const NIVEL_PRECIPITACION: &str = "nivel_precipitacion";
    pub const RIESGO_INUNDACION: &str = "riesgo_inundacion";
    pub const NOMBRE: &str = "nombre";
    pub const LATITUD: &str = "latitud";
    pub const LONGITUD: &str = "longitud";
    pub const ALTITUD: &str = "altitud";
}

/// Columns the prediction table must carry.
pub const PREDICTION_COLUMNS: [&str; 3] = [
    columns::ID_PUNTO,
    columns::NIVEL_PRECIPITACION,
    columns::RIESGO_INUNDACION,
];

/// Columns the point catalog must carry.
pub const POINT_COLUMNS: [&str; 5] = [
    columns::ID_PUNTO,
    columns::NOMBRE,
    columns::LATITUD,
    columns::LONGITUD,
    columns::ALTITUD,
];

/// Lower-case every field name of a record. Values pass through untouched.
pub fn normalize_record(record: &Record) -> Record {
    record
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value.clone()))
        .collect()
}

/// Validate that every required column appears in the table's field set.
///
/// The field set is the union of keys across all rows (the backend returns
/// consistent keys per table, but a union tolerates sparse rows). An empty
/// table passes vacuously: zero rows is a downstream insufficient-data
/// condition, not a schema violation.
///
/// Fails with the COMPLETE list of missing columns, not just the first.
pub fn validate_columns(
    table: &str,
    rows: &[Record],
    required: &[&str],
) -> Result<(), TrainError> {
    if rows.is_empty() {
        return Ok(());
    }

    let field_set: HashSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|col| !field_set.contains(**col))
        .map(|col| (*col).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(TrainError::Schema {
            table: table.to_string(),
            missing,
        })
    }
}

/// Coerce a raw cell to a finite f64.
///
/// Numbers pass through; strings are trimmed and parsed. Everything else
/// (null, bool, nested values, unparseable or non-finite text) becomes
/// missing rather than raising — incomplete rows are dropped, never imputed.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Canonical join-key form for an `id_punto` cell.
///
/// Integral numbers and their decimal renderings collapse to the same key
/// ("7", 7 and "7.0" all join), string keys are trimmed. Null and
/// non-scalar cells have no key and the row is dropped from the join.
pub fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let v = n.as_f64()?;
            if !v.is_finite() {
                return None;
            }
            if v.fract() == 0.0 {
                Some(format!("{}", v as i64))
            } else {
                Some(format!("{v}"))
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            // Numeric-looking strings canonicalize through the number path
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(format!("{}", v as i64)),
                Ok(v) if v.is_finite() => Some(format!("{v}")),
                _ => Some(trimmed.to_string()),
            }
        }
        _ => None,
    }
}
