//! Training Pipeline Regression Tests
//!
//! Exercises the full pipeline through RiskModelTrainer with synthetic
//! tables fed in via StaticTableSource. Asserts on join behavior, error
//! surfacing for empty and malformed inputs, report reproducibility, and
//! model quality on a precipitation-driven synthetic dataset.

use riada_core::{
    ForestParams, Record, RiskModelTrainer, SearchGrid, StaticTableSource, TableSource,
    TrainError, TrainingConfig,
};
use serde_json::{json, Value};

const PREDICTIONS_TABLE: &str = "predicciones_inundacion";
const POINTS_TABLE: &str = "puntos_criticos";

fn record(pairs: &[(&str, Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Deterministic noise in [-0.5, 0.5) so tests need no RNG seeds of their own.
fn noise(seed: usize) -> f64 {
    ((seed.wrapping_mul(1_103_515_245).wrapping_add(12_345)) % (1 << 31)) as f64
        / f64::from(1u32 << 31)
        - 0.5
}

/// 50 monitored points where flood risk tracks precipitation; latitude,
/// longitude and altitude are uncorrelated noise.
fn synthetic_source(n: usize) -> StaticTableSource {
    let points: Vec<Record> = (0..n)
        .map(|i| {
            record(&[
                ("id_punto", json!(i)),
                ("nombre", json!(format!("Punto {i}"))),
                ("latitud", json!(39.0 + noise(i * 3))),
                ("longitud", json!(-0.4 + noise(i * 5))),
                ("altitud", json!(50.0 + noise(i * 7) * 40.0)),
            ])
        })
        .collect();

    let predictions: Vec<Record> = (0..n)
        .map(|i| {
            // Spread precipitation non-monotonically across row order so
            // contiguous CV folds interpolate rather than extrapolate
            let precipitation = ((i * 17) % n) as f64;
            let risk = precipitation / n as f64 + noise(i * 11) * 0.05;
            record(&[
                ("id_punto", json!(i)),
                ("nivel_precipitacion", json!(precipitation)),
                ("riesgo_inundacion", json!(risk)),
            ])
        })
        .collect();

    StaticTableSource::new()
        .with_table(POINTS_TABLE, points)
        .with_table(PREDICTIONS_TABLE, predictions)
}

/// Config sized for tests: smaller base forest and a 4-cell grid.
fn test_config() -> TrainingConfig {
    TrainingConfig {
        base_params: ForestParams {
            n_estimators: 40,
            ..ForestParams::default()
        },
        grid: SearchGrid {
            n_estimators: vec![20, 40],
            max_depth: vec![Some(5), None],
            min_samples_split: vec![2],
        },
        ..TrainingConfig::default()
    }
}

#[test]
fn end_to_end_learns_precipitation_signal() {
    let source = synthetic_source(50);
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let report = trainer.train_from_source(&source).unwrap();

    assert_eq!(report.sample_count, 50);
    assert!(
        report.held_out_r2 > 0.5,
        "held-out R² {} should exceed 0.5 on a strong signal",
        report.held_out_r2
    );

    // Importance pairs ascending; precipitation must rank highest
    let importance = &report.feature_importance;
    assert_eq!(importance.len(), 4);
    for window in importance.windows(2) {
        assert!(window[0].importance <= window[1].importance);
    }
    assert_eq!(importance[3].feature, "precipitation_level");

    let sum: f64 = importance.iter().map(|p| p.importance).sum();
    assert!((sum - 1.0).abs() < 1e-9, "importances sum to {sum}");
}

#[test]
fn repeated_invocations_are_reproducible() {
    let source = synthetic_source(50);
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let a = trainer.train_from_source(&source).unwrap();
    let b = trainer.train_from_source(&source).unwrap();

    assert_eq!(a.held_out_rmse.to_bits(), b.held_out_rmse.to_bits());
    assert_eq!(a.held_out_r2.to_bits(), b.held_out_r2.to_bits());
    assert_eq!(a.train_rmse.to_bits(), b.train_rmse.to_bits());
    assert_eq!(a.cv_mean_rmse.to_bits(), b.cv_mean_rmse.to_bits());
    assert_eq!(a.best_params, b.best_params);
}

#[test]
fn bias_variance_pair_is_reported() {
    let source = synthetic_source(50);
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let report = trainer.train_from_source(&source).unwrap();
    // Reporting only: both numbers present and finite, no remediation implied
    assert!(report.train_rmse.is_finite() && report.train_rmse >= 0.0);
    assert!(report.held_out_rmse.is_finite() && report.held_out_rmse >= 0.0);
    assert!(report.cv_mean_rmse.is_finite() && report.cv_mean_rmse >= 0.0);
}

#[test]
fn empty_predictions_surface_insufficient_data() {
    let points_only = synthetic_source(10);
    let source = StaticTableSource::new()
        .with_table(POINTS_TABLE, points_only.fetch_table(POINTS_TABLE))
        .with_table(PREDICTIONS_TABLE, Vec::new());
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let err = trainer.train_from_source(&source).unwrap_err();
    assert!(
        matches!(err, TrainError::InsufficientData { rows: 0, .. }),
        "expected InsufficientData, got {err:?}"
    );
}

#[test]
fn missing_table_surfaces_insufficient_data_not_panic() {
    // A fetch failure is surfaced by the collaborator as an empty table
    let source = StaticTableSource::new();
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let err = trainer.train_from_source(&source).unwrap_err();
    assert!(matches!(err, TrainError::InsufficientData { rows: 0, .. }));
}

#[test]
fn missing_altitude_column_names_it_in_schema_error() {
    let n = 10;
    let points: Vec<Record> = (0..n)
        .map(|i| {
            record(&[
                ("id_punto", json!(i)),
                ("nombre", json!("p")),
                ("latitud", json!(39.0)),
                ("longitud", json!(-0.4)),
                // altitud deliberately absent
            ])
        })
        .collect();
    let predictions: Vec<Record> = (0..n)
        .map(|i| {
            record(&[
                ("id_punto", json!(i)),
                ("nivel_precipitacion", json!(i as f64)),
                ("riesgo_inundacion", json!(0.5)),
            ])
        })
        .collect();
    let source = StaticTableSource::new()
        .with_table(POINTS_TABLE, points)
        .with_table(PREDICTIONS_TABLE, predictions);
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let err = trainer.train_from_source(&source).unwrap_err();
    match err {
        TrainError::Schema { table, missing } => {
            assert_eq!(table, POINTS_TABLE);
            assert_eq!(missing, vec!["altitud".to_string()]);
        }
        other => panic!("expected Schema error, got {other:?}"),
    }
}

#[test]
fn unmatched_predictions_never_reach_training() {
    // Catalog covers ids 0..10 but predictions reference 0..20; only matched
    // rows may be assembled
    let matched = 10usize;
    let points: Vec<Record> = (0..matched)
        .map(|i| {
            record(&[
                ("id_punto", json!(i)),
                ("nombre", json!("p")),
                ("latitud", json!(39.0 + noise(i))),
                ("longitud", json!(-0.4)),
                ("altitud", json!(20.0)),
            ])
        })
        .collect();
    let predictions: Vec<Record> = (0..20)
        .map(|i| {
            record(&[
                ("id_punto", json!(i)),
                ("nivel_precipitacion", json!(((i * 7) % 20) as f64)),
                ("riesgo_inundacion", json!(((i * 7) % 20) as f64 / 20.0)),
            ])
        })
        .collect();
    let source = StaticTableSource::new()
        .with_table(POINTS_TABLE, points)
        .with_table(PREDICTIONS_TABLE, predictions);
    let trainer = RiskModelTrainer::new(test_config()).unwrap();

    let report = trainer.train_from_source(&source).unwrap();
    assert_eq!(report.sample_count, matched);
}
