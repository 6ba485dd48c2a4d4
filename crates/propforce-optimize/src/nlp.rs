// ─────────────────────────────────────────────────────────────────────
// PropForce — Nonlinear Programs
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Box-bounded nonlinear programs with at most one inequality.
//!
//! `min f(x)  s.t.  c(x) ≥ 0,  lower ≤ x ≤ upper`
//!
//! Problems are evaluated through `&mut self` so an adaptor can keep its
//! own bookkeeping (e.g. an evaluation log) without shared mutable state.

use crate::augmented;
use crate::sqp;
use log::warn;
use ndarray::Array1;
use propforce_types::config::SolverMethod;

/// √ε for f64, the classic forward-difference step.
pub const DEFAULT_FD_STEP: f64 = 1.490_116_119_384_765_6e-8;

pub const MSG_SUCCESS: &str = "Optimization terminated successfully";
pub const MSG_INCOMPATIBLE: &str = "Inequality constraints incompatible";
pub const MSG_ITERATION_LIMIT: &str = "Iteration limit reached";

pub trait NonlinearProgram {
    /// Objective to minimize.
    fn objective(&mut self, x: &Array1<f64>) -> f64;

    fn has_inequality(&self) -> bool {
        false
    }

    /// Inequality value; `x` is feasible when this is >= 0.
    fn inequality(&mut self, _x: &Array1<f64>) -> f64 {
        0.0
    }
}

/// Per-coordinate box.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
}

impl Bounds {
    /// Same interval on every coordinate.
    pub fn uniform(dim: usize, lower: f64, upper: f64) -> Self {
        Bounds {
            lower: Array1::from_elem(dim, lower),
            upper: Array1::from_elem(dim, upper),
        }
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Project `x` into the box.
    pub fn clip(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from_shape_fn(x.len(), |i| x[i].max(self.lower[i]).min(self.upper[i]))
    }

    pub fn contains(&self, x: &Array1<f64>) -> bool {
        (0..x.len()).all(|i| x[i] >= self.lower[i] && x[i] <= self.upper[i])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Cap on major iterations; the only termination guarantee.
    pub max_iterations: usize,
    /// Relative objective change, and KKT residual, accepted as converged.
    pub tolerance: f64,
    /// Constraint violation accepted at a solution.
    pub feasibility_tolerance: f64,
    /// Relative forward-difference step.
    pub fd_step: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-6,
            feasibility_tolerance: 1e-6,
            fd_step: DEFAULT_FD_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub x: Array1<f64>,
    pub objective: f64,
    /// `max(0, -c(x))`, or 0 without an inequality.
    pub constraint_violation: f64,
    pub iterations: usize,
    pub success: bool,
    pub message: String,
}

/// Forward-difference gradient of `f` at `x`, given `fx = f(x)`.
///
/// The step is mirrored backward when the forward probe would leave the box.
pub fn forward_difference<F>(
    mut f: F,
    x: &Array1<f64>,
    fx: f64,
    bounds: &Bounds,
    step: f64,
) -> Array1<f64>
where
    F: FnMut(&Array1<f64>) -> f64,
{
    let n = x.len();
    let mut grad = Array1::zeros(n);
    let mut probe = x.clone();
    for i in 0..n {
        let mut h = step * x[i].abs().max(1.0);
        if x[i] + h > bounds.upper[i] {
            h = -h;
        }
        probe[i] = x[i] + h;
        grad[i] = (f(&probe) - fx) / h;
        probe[i] = x[i];
    }
    grad
}

/// Hides the inequality of the wrapped problem.
struct BoundOnly<'a, P: ?Sized>(&'a mut P);

impl<P: NonlinearProgram + ?Sized> NonlinearProgram for BoundOnly<'_, P> {
    fn objective(&mut self, x: &Array1<f64>) -> f64 {
        self.0.objective(x)
    }
}

/// Minimize `problem` from `x0` with the chosen method.
///
/// `x0` is projected into `bounds` first. Non-convergence is reported in the
/// outcome, never as an error.
pub fn minimize<P: NonlinearProgram + ?Sized>(
    problem: &mut P,
    method: SolverMethod,
    x0: &Array1<f64>,
    bounds: &Bounds,
    config: &SolverConfig,
) -> SolverOutcome {
    match method {
        SolverMethod::Slsqp => sqp::solve(problem, x0, bounds, config),
        SolverMethod::AugmentedLagrangian => augmented::solve(problem, x0, bounds, config),
        SolverMethod::BoundedQuasiNewton => {
            if problem.has_inequality() {
                warn!("{method} cannot represent the inequality constraint; it will be ignored");
            }
            sqp::solve(&mut BoundOnly(problem), x0, bounds, config)
        }
    }
}
