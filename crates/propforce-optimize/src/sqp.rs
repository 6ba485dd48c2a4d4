// ─────────────────────────────────────────────────────────────────────
// PropForce — SQP
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sequential quadratic programming with a damped-BFGS Hessian.
//!
//! Each major iteration:
//! 1. solves the QP `min ½dᵀBd + ∇fᵀd` s.t. `c + ∇cᵀd ≥ 0` inside the box,
//! 2. backtracks on the L1 merit `f + μ·max(0, -c)`,
//! 3. refreshes forward-difference gradients and updates `B` with the
//!    Lagrangian gradient difference.
//!
//! Without an inequality this reduces to a bounded quasi-Newton method.

use crate::nlp::{
    forward_difference, Bounds, NonlinearProgram, SolverConfig, SolverOutcome, MSG_INCOMPATIBLE,
    MSG_ITERATION_LIMIT, MSG_SUCCESS,
};
use log::trace;
use ndarray::{Array1, Array2};
use propforce_math::linalg::bfgs_update;
use propforce_math::qp::{solve_qp, LinearInequality};

/// Slack accepted on the linearized inequality, relative to `1 + |c|`.
const QP_FEASIBILITY_TOL: f64 = 1e-10;

/// A step below this (∞-norm) from an infeasible QP means no progress is possible.
const NULL_STEP: f64 = 1e-10;

/// Armijo sufficient-decrease constant.
const ARMIJO: f64 = 1e-4;

const MAX_BACKTRACKS: usize = 30;

/// Directional derivative, relative to `1 + |f|`, accepted as stationary
/// when the line search cannot make progress.
const STALL_TOL: f64 = 1e-3;

const MSG_STALLED: &str = "Optimization terminated: line search cannot improve further";
const MSG_LINE_SEARCH: &str = "Positive directional derivative for linesearch";

fn violation(constrained: bool, c: f64) -> f64 {
    if constrained {
        (-c).max(0.0)
    } else {
        0.0
    }
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

struct Iterate {
    x: Array1<f64>,
    f: f64,
    c: f64,
}

impl Iterate {
    fn finish(self, constrained: bool, iterations: usize, success: bool, message: &str) -> SolverOutcome {
        SolverOutcome {
            constraint_violation: violation(constrained, self.c),
            x: self.x,
            objective: self.f,
            iterations,
            success,
            message: message.to_string(),
        }
    }
}

/// Run SQP from `x0` (projected into `bounds`).
pub fn solve<P: NonlinearProgram + ?Sized>(
    problem: &mut P,
    x0: &Array1<f64>,
    bounds: &Bounds,
    config: &SolverConfig,
) -> SolverOutcome {
    let n = x0.len();
    let constrained = problem.has_inequality();
    let tol = config.tolerance;
    let feas_tol = config.feasibility_tolerance;

    let x = bounds.clip(x0);
    let f = problem.objective(&x);
    let c = if constrained {
        problem.inequality(&x)
    } else {
        0.0
    };
    let mut current = Iterate { x, f, c };

    let mut grad = forward_difference(
        |z| problem.objective(z),
        &current.x,
        current.f,
        bounds,
        config.fd_step,
    );
    let mut jac = if constrained {
        forward_difference(
            |z| problem.inequality(z),
            &current.x,
            current.c,
            bounds,
            config.fd_step,
        )
    } else {
        Array1::zeros(n)
    };

    let mut hessian = Array2::<f64>::eye(n);
    let mut penalty = 0.0_f64;

    for iteration in 1..=config.max_iterations {
        let lower = &bounds.lower - &current.x;
        let upper = &bounds.upper - &current.x;
        let linearized = constrained.then_some(LinearInequality {
            gradient: &jac,
            value: current.c,
        });
        let qp = solve_qp(&hessian, &grad, linearized, &lower, &upper, QP_FEASIBILITY_TOL);
        let step = qp.step;
        let multiplier = qp.multiplier;
        let viol = violation(constrained, current.c);

        if !qp.feasible && max_abs(&step) <= NULL_STEP {
            return current.finish(constrained, iteration, false, MSG_INCOMPATIBLE);
        }

        penalty = penalty.max(multiplier);
        let slope = grad.dot(&step);
        if slope.abs() + (multiplier * current.c).abs() < tol && viol <= feas_tol {
            return current.finish(constrained, iteration, true, MSG_SUCCESS);
        }

        // ── Line search on the L1 merit ──
        let merit = current.f + penalty * viol;
        let directional = (slope - penalty * viol).min(0.0);
        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..MAX_BACKTRACKS {
            let x_trial = bounds.clip(&(&current.x + &(&step * alpha)));
            let f_trial = problem.objective(&x_trial);
            let c_trial = if constrained {
                problem.inequality(&x_trial)
            } else {
                0.0
            };
            let merit_trial = f_trial + penalty * violation(constrained, c_trial);
            if merit_trial <= merit + ARMIJO * alpha * directional {
                accepted = Some(Iterate {
                    x: x_trial,
                    f: f_trial,
                    c: c_trial,
                });
                break;
            }
            alpha *= 0.5;
        }
        let next = match accepted {
            Some(next) => next,
            None => {
                let stationary = viol <= feas_tol && slope.abs() <= STALL_TOL * (1.0 + current.f.abs());
                let message = if stationary {
                    MSG_STALLED
                } else {
                    MSG_LINE_SEARCH
                };
                return current.finish(constrained, iteration, stationary, message);
            }
        };

        trace!(
            "sqp iter {iteration}: f = {:.6e}, violation = {:.3e}, step = {:.3e}, lambda = {:.3e}",
            next.f,
            violation(constrained, next.c),
            alpha,
            multiplier
        );

        // ── Quasi-Newton update ──
        let grad_next = forward_difference(
            |z| problem.objective(z),
            &next.x,
            next.f,
            bounds,
            config.fd_step,
        );
        let jac_next = if constrained {
            forward_difference(
                |z| problem.inequality(z),
                &next.x,
                next.c,
                bounds,
                config.fd_step,
            )
        } else {
            Array1::zeros(n)
        };
        // An infeasible QP leaves the multiplier at its bracketing cap.
        let lambda = if qp.feasible { multiplier } else { 0.0 };
        let s = &next.x - &current.x;
        let y = (&grad_next - &(&jac_next * lambda)) - (&grad - &(&jac * lambda));
        bfgs_update(&mut hessian, &s, &y);

        let change = (next.f - current.f).abs();
        current = next;
        grad = grad_next;
        jac = jac_next;

        if change < tol * current.f.abs().max(1.0) && violation(constrained, current.c) <= feas_tol {
            return current.finish(constrained, iteration, true, MSG_SUCCESS);
        }
    }

    current.finish(constrained, config.max_iterations, false, MSG_ITERATION_LIMIT)
}
