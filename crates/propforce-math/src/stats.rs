//! Agreement statistics between measured and predicted series.

use ndarray::Array1;
use propforce_types::error::{PropError, PropResult};

/// Guard on the total sum of squares in R².
const SS_TOT_EPS: f64 = 1e-12;

/// Root-mean-square error, mean absolute error and coefficient of
/// determination of a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Compare `y_pred` against the reference series `y_true`.
pub fn error_metrics(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> PropResult<ErrorMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(PropError::InvalidArgument(format!(
            "series length mismatch: {} reference vs {} predicted",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PropError::InvalidArgument(
            "error metrics need at least one sample".to_string(),
        ));
    }
    let n = y_true.len() as f64;
    let errors = y_true - y_pred;
    let ss_res: f64 = errors.iter().map(|e| e * e).sum();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean) * (y - mean)).sum();

    Ok(ErrorMetrics {
        rmse: (ss_res / n).sqrt(),
        mae,
        r2: 1.0 - ss_res / (ss_tot + SS_TOT_EPS),
    })
}
