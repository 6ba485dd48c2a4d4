// ─────────────────────────────────────────────────────────────────────
// PropForce — Augmented Lagrangian
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bound-constrained augmented Lagrangian for one inequality.
//!
//! The inequality is folded into
//!
//! `L_A(x) = f(x) + (max(0, λ - ρ·c(x))² - λ²) / (2ρ)`
//!
//! and each outer pass minimizes `L_A` over the box with the bounded
//! quasi-Newton solver. Afterwards `λ ← max(0, λ - ρ·c)`. The penalty grows
//! tenfold whenever the violation fails to shrink by 4×. Inner iterations
//! share the caller's iteration cap.

use crate::nlp::{
    Bounds, NonlinearProgram, SolverConfig, SolverOutcome, MSG_ITERATION_LIMIT, MSG_SUCCESS,
};
use crate::sqp;
use log::trace;
use ndarray::Array1;

const INITIAL_PENALTY: f64 = 10.0;
const PENALTY_GROWTH: f64 = 10.0;
const MAX_PENALTY: f64 = 1e8;

/// Required violation reduction per outer pass before the penalty grows.
const VIOLATION_SHRINK: f64 = 0.25;

/// Relative multiplier change accepted as converged.
const MULTIPLIER_TOL: f64 = 1e-3;

const MAX_OUTER_ITERATIONS: usize = 100;

const MSG_OUTER_LIMIT: &str = "Augmented Lagrangian outer iterations exhausted";

/// Augmented objective for fixed multiplier and penalty.
struct AugmentedSubproblem<'a, P: ?Sized> {
    inner: &'a mut P,
    multiplier: f64,
    penalty: f64,
}

impl<P: NonlinearProgram + ?Sized> NonlinearProgram for AugmentedSubproblem<'_, P> {
    fn objective(&mut self, x: &Array1<f64>) -> f64 {
        let c = self.inner.inequality(x);
        let f = self.inner.objective(x);
        let shifted = (self.multiplier - self.penalty * c).max(0.0);
        f + (shifted * shifted - self.multiplier * self.multiplier) / (2.0 * self.penalty)
    }
}

fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0_f64, |m, (p, q)| m.max((p - q).abs()))
}

/// Outcome at `x`, re-evaluating the original objective and constraint.
fn finish<P: NonlinearProgram + ?Sized>(
    problem: &mut P,
    x: Array1<f64>,
    iterations: usize,
    success: bool,
    message: &str,
) -> SolverOutcome {
    let c = problem.inequality(&x);
    let objective = problem.objective(&x);
    SolverOutcome {
        x,
        objective,
        constraint_violation: (-c).max(0.0),
        iterations,
        success,
        message: message.to_string(),
    }
}

/// Run the augmented Lagrangian from `x0`.
///
/// Problems without an inequality go straight to the bounded solver.
pub fn solve<P: NonlinearProgram + ?Sized>(
    problem: &mut P,
    x0: &Array1<f64>,
    bounds: &Bounds,
    config: &SolverConfig,
) -> SolverOutcome {
    if !problem.has_inequality() {
        return sqp::solve(problem, x0, bounds, config);
    }

    let feas_tol = config.feasibility_tolerance;
    let mut multiplier = 0.0_f64;
    let mut penalty = INITIAL_PENALTY;
    let mut previous_violation = f64::INFINITY;
    let mut x = bounds.clip(x0);
    let mut used = 0usize;

    for outer in 0..MAX_OUTER_ITERATIONS {
        if used >= config.max_iterations {
            return finish(problem, x, used, false, MSG_ITERATION_LIMIT);
        }
        let inner_config = SolverConfig {
            max_iterations: config.max_iterations - used,
            ..*config
        };
        let inner = {
            let mut sub = AugmentedSubproblem {
                inner: &mut *problem,
                multiplier,
                penalty,
            };
            sqp::solve(&mut sub, &x, bounds, &inner_config)
        };
        used += inner.iterations;
        let moved = max_abs_diff(&inner.x, &x);
        x = inner.x;

        let c = problem.inequality(&x);
        let violation = (-c).max(0.0);
        let updated = (multiplier - penalty * c).max(0.0);
        trace!(
            "auglag outer {outer}: violation = {violation:.3e}, lambda = {updated:.6e}, rho = {penalty:.1e}, inner iters = {}",
            inner.iterations
        );

        let scale = 1.0 + x.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let multiplier_settled = (updated - multiplier).abs() <= MULTIPLIER_TOL * updated.max(1.0);
        let iterate_settled = moved <= config.tolerance * scale;
        if violation <= feas_tol && (multiplier_settled || iterate_settled) {
            return finish(problem, x, used, true, MSG_SUCCESS);
        }

        multiplier = updated;
        if violation > feas_tol && violation > VIOLATION_SHRINK * previous_violation {
            penalty = (penalty * PENALTY_GROWTH).min(MAX_PENALTY);
        }
        previous_violation = violation;
    }

    finish(problem, x, used, false, MSG_OUTER_LIMIT)
}
