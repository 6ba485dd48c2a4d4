// ─────────────────────────────────────────────────────────────────────
// PropForce — Integrate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Composite trapezoidal quadrature over sampled radial profiles.

use ndarray::Array1;

/// Trapezoidal rule with constant spacing `dx`.
///
/// Fewer than two samples integrate to zero.
pub fn trapezoid_uniform(y: &Array1<f64>, dx: f64) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    (0..n - 1).map(|i| dx * (y[i] + y[i + 1]) / 2.0).sum()
}

/// Trapezoidal rule on an arbitrary monotone abscissa.
///
/// Panics if `x` and `y` differ in length.
pub fn trapezoid(y: &Array1<f64>, x: &Array1<f64>) -> f64 {
    assert_eq!(y.len(), x.len(), "trapezoid: x and y must match in length");
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    (0..n - 1)
        .map(|i| (x[i + 1] - x[i]) * (y[i] + y[i + 1]) / 2.0)
        .sum()
}
