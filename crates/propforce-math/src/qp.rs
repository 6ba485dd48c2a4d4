// ─────────────────────────────────────────────────────────────────────
// PropForce — QP Subproblems
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Convex quadratic subproblems for the SQP step.
//!
//! Minimizes `½·dᵀBd + gᵀd` subject to `lower ≤ d ≤ upper` and at most one
//! linear inequality `c + aᵀd ≥ 0`. `B` must be symmetric positive definite.
//!
//! The bound-constrained problem is solved by a primal active-set method.
//! The single inequality is handled by bisecting on its Lagrange
//! multiplier λ: for fixed λ the problem is a box QP in `g − λ·a`, and
//! `c + aᵀd(λ)` is non-decreasing in λ.

use crate::linalg::cholesky_solve;
use ndarray::{Array1, Array2};

/// Step and multiplier magnitude treated as zero in the active-set loop.
const STATIONARY_TOL: f64 = 1e-10;

/// Growth steps allowed when bracketing the multiplier.
const MAX_BRACKET_DOUBLINGS: usize = 80;

/// Bisection steps allowed once the multiplier is bracketed.
const MAX_BISECTIONS: usize = 100;

/// Relative multiplier bracket width at which bisection stops.
const MULTIPLIER_REL_TOL: f64 = 1e-12;

/// Linearized inequality `value + gradientᵀ·d ≥ 0`.
#[derive(Debug, Clone, Copy)]
pub struct LinearInequality<'a> {
    pub gradient: &'a Array1<f64>,
    pub value: f64,
}

impl LinearInequality<'_> {
    /// Linearized constraint value after step `d`.
    pub fn at(&self, d: &Array1<f64>) -> f64 {
        self.value + self.gradient.dot(d)
    }
}

/// Step returned by [`solve_qp`].
#[derive(Debug, Clone)]
pub struct QpSolution {
    pub step: Array1<f64>,
    /// Multiplier of the inequality; 0 when it is inactive or absent.
    pub multiplier: f64,
    /// `false` when no step within the box satisfies the inequality. `step`
    /// then moves as far toward feasibility as the box allows.
    pub feasible: bool,
}

/// Primal active-set solve of `min ½·dᵀBd + qᵀd` s.t. `lower ≤ d ≤ upper`.
///
/// Starts from the origin projected into the box. Free variables take a
/// Newton step on the reduced system; a blocking bound joins the working
/// set, and a bound whose multiplier has the wrong sign leaves it.
/// Coordinates with `lower == upper` stay fixed.
pub fn solve_box_qp(
    hessian: &Array2<f64>,
    linear: &Array1<f64>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
) -> Array1<f64> {
    let n = linear.len();
    let mut d = Array1::from_shape_fn(n, |i| 0.0_f64.max(lower[i]).min(upper[i]));
    let mut working: Vec<bool> = (0..n).map(|i| d[i] <= lower[i] || d[i] >= upper[i]).collect();

    for _ in 0..50 * (n + 1) {
        let residual = hessian.dot(&d) + linear;
        let free: Vec<usize> = (0..n).filter(|&i| !working[i]).collect();

        let mut p = Array1::<f64>::zeros(n);
        if !free.is_empty() {
            let m = free.len();
            let reduced = Array2::from_shape_fn((m, m), |(a, b)| hessian[[free[a], free[b]]]);
            let rhs = Array1::from_shape_fn(m, |a| -residual[free[a]]);
            let sol = cholesky_solve(&reduced, &rhs).unwrap_or_else(|| {
                Array1::from_shape_fn(m, |a| {
                    let i = free[a];
                    -residual[i] / hessian[[i, i]].max(1e-12)
                })
            });
            for (a, &i) in free.iter().enumerate() {
                p[i] = sol[a];
            }
        }

        let scale = 1.0 + d.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let p_norm = p.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if p_norm <= STATIONARY_TOL * scale {
            // Stationary on the working set: release the bound with the most
            // negative multiplier, or stop if all multipliers are signed right.
            let r_norm = residual.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let mut worst_value = -STATIONARY_TOL * (1.0 + r_norm);
            let mut worst = None;
            for i in (0..n).filter(|&i| working[i] && upper[i] > lower[i]) {
                let multiplier = if d[i] <= lower[i] {
                    residual[i]
                } else {
                    -residual[i]
                };
                if multiplier < worst_value {
                    worst_value = multiplier;
                    worst = Some(i);
                }
            }
            match worst {
                Some(i) => working[i] = false,
                None => return d,
            }
            continue;
        }

        let mut alpha = 1.0;
        let mut blocking = None;
        for &i in &free {
            if p[i] < 0.0 && d[i] + p[i] < lower[i] {
                let t = (lower[i] - d[i]) / p[i];
                if t < alpha {
                    alpha = t;
                    blocking = Some((i, lower[i]));
                }
            } else if p[i] > 0.0 && d[i] + p[i] > upper[i] {
                let t = (upper[i] - d[i]) / p[i];
                if t < alpha {
                    alpha = t;
                    blocking = Some((i, upper[i]));
                }
            }
        }
        for &i in &free {
            d[i] += alpha * p[i];
        }
        if let Some((i, bound)) = blocking {
            d[i] = bound;
            working[i] = true;
        }
    }
    d
}

/// Solve the SQP subproblem with an optional single linear inequality.
///
/// `feasibility_tol` is the relative slack, scaled by `1 + |c|`, accepted on
/// the linearized inequality when bisection stops.
pub fn solve_qp(
    hessian: &Array2<f64>,
    gradient: &Array1<f64>,
    inequality: Option<LinearInequality<'_>>,
    lower: &Array1<f64>,
    upper: &Array1<f64>,
    feasibility_tol: f64,
) -> QpSolution {
    let unconstrained = solve_box_qp(hessian, gradient, lower, upper);
    let ineq = match inequality {
        Some(ineq) => ineq,
        None => {
            return QpSolution {
                step: unconstrained,
                multiplier: 0.0,
                feasible: true,
            }
        }
    };
    if ineq.at(&unconstrained) >= 0.0 {
        return QpSolution {
            step: unconstrained,
            multiplier: 0.0,
            feasible: true,
        };
    }

    let step_at = |lambda: f64| {
        let shifted = gradient - &(ineq.gradient * lambda);
        solve_box_qp(hessian, &shifted, lower, upper)
    };

    // ── Bracket ──
    let mut lam_lo = 0.0;
    let mut lam_hi = 1.0;
    let mut d_hi = step_at(lam_hi);
    let mut bracketed = ineq.at(&d_hi) >= 0.0;
    for _ in 1..MAX_BRACKET_DOUBLINGS {
        if bracketed {
            break;
        }
        lam_lo = lam_hi;
        lam_hi *= 2.0;
        d_hi = step_at(lam_hi);
        bracketed = ineq.at(&d_hi) >= 0.0;
    }
    if !bracketed {
        return QpSolution {
            step: d_hi,
            multiplier: lam_hi,
            feasible: false,
        };
    }

    // ── Bisect ──
    let slack_tol = feasibility_tol * (1.0 + ineq.value.abs());
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lam_lo + lam_hi);
        let d_mid = step_at(mid);
        let h = ineq.at(&d_mid);
        if h >= 0.0 {
            lam_hi = mid;
            d_hi = d_mid;
            if h <= slack_tol {
                break;
            }
        } else {
            lam_lo = mid;
        }
        if lam_hi - lam_lo <= MULTIPLIER_REL_TOL * lam_hi {
            break;
        }
    }

    QpSolution {
        step: d_hi,
        multiplier: lam_hi,
        feasible: true,
    }
}
