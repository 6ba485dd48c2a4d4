//! Power-series evaluation.
//!
//! Coefficients are ordered lowest power first: `c[0] + c[1]·x + c[2]·x² + …`.

use ndarray::Array1;

/// Horner evaluation of Σ cᵢ·xⁱ. An empty slice is the zero polynomial.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

/// [`polyval`] applied elementwise.
pub fn polyval_array(coeffs: &[f64], x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|xi| polyval(coeffs, xi))
}
