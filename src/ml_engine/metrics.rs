//! Regression scoring: MSE, RMSE and R².

/// Mean squared error between predictions and actuals.
///
/// Callers guarantee equal, non-zero lengths (both come from the same index
/// set).
pub fn mse(predictions: &[f64], actuals: &[f64]) -> f64 {
    let n = predictions.len() as f64;
    predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a) * (p - a))
        .sum::<f64>()
        / n
}

/// Root mean squared error; lower is better.
pub fn rmse(predictions: &[f64], actuals: &[f64]) -> f64 {
    mse(predictions, actuals).sqrt()
}

/// Coefficient of determination.
///
/// Returns None when the actuals have (near-)zero variance, where R² is
/// undefined; callers surface that as a training error rather than dividing
/// by zero.
pub fn r_squared(predictions: &[f64], actuals: &[f64]) -> Option<f64> {
    let n = actuals.len() as f64;
    let mean = actuals.iter().sum::<f64>() / n;
    let ss_total: f64 = actuals.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_total <= f64::EPSILON {
        return None;
    }
    let ss_residual: f64 = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (a - p) * (a - p))
        .sum();
    Some(1.0 - ss_residual / ss_total)
}
