// ─────────────────────────────────────────────────────────────────────
// PropForce — Loading Optimizer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Search for the loading polynomial that minimizes power under a thrust
//! floor, or maximizes thrust under a power ceiling.
//!
//! Every objective evaluation requested by the solver goes through
//! [`PerformanceModel::compute_performance`] and is appended to an
//! [`EvaluationHistory`] owned by that single call. The reported thrust and
//! power come from a fresh evaluation at the returned coefficients.

use crate::history::EvaluationHistory;
use crate::nlp::{minimize, Bounds, NonlinearProgram, SolverConfig};
use log::{debug, warn};
use ndarray::Array1;
use propforce_core::disk::PerformanceModel;
use propforce_types::config::{ObjectiveKind, OptimizerConfig, SolverMethod};
use propforce_types::error::{PropError, PropResult};
use propforce_types::state::FlowState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Range of the random initial coefficients.
const INITIAL_GUESS_RANGE: (f64, f64) = (1.0, 3.0);

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    /// Number of polynomial coefficients searched.
    pub n_poly: usize,
    /// Box applied to every coefficient.
    pub bounds: (f64, f64),
    pub method: SolverMethod,
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Seed for the random initial guess; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            n_poly: 5,
            bounds: (0.0, 10.0),
            method: SolverMethod::Slsqp,
            max_iterations: 200,
            tolerance: 1e-6,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRequest {
    pub objective: ObjectiveKind,
    /// Thrust floor [N] for power minimization.
    pub thrust_target: Option<f64>,
    /// Power ceiling [W] for thrust maximization.
    pub power_limit: Option<f64>,
    pub initial_guess: Option<Vec<f64>>,
    pub options: OptimizerOptions,
}

impl OptimizationRequest {
    /// Unconstrained request with default options.
    pub fn new(objective: ObjectiveKind) -> Self {
        Self {
            objective,
            thrust_target: None,
            power_limit: None,
            initial_guess: None,
            options: OptimizerOptions::default(),
        }
    }

    /// Minimize power subject to `thrust >= thrust_target`.
    pub fn minimize_power(thrust_target: f64) -> Self {
        Self::new(ObjectiveKind::MinimizePower).with_thrust_target(thrust_target)
    }

    /// Maximize thrust subject to `power <= power_limit`.
    pub fn maximize_thrust(power_limit: f64) -> Self {
        Self::new(ObjectiveKind::MaximizeThrust).with_power_limit(power_limit)
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            objective: config.objective,
            thrust_target: config.thrust_target,
            power_limit: config.power_limit,
            initial_guess: config.initial_guess.clone(),
            options: OptimizerOptions {
                n_poly: config.n_poly,
                bounds: (config.bounds[0], config.bounds[1]),
                method: config.method,
                max_iterations: config.max_iterations,
                tolerance: config.tolerance,
                seed: config.seed,
            },
        }
    }

    pub fn with_thrust_target(mut self, thrust_target: f64) -> Self {
        self.thrust_target = Some(thrust_target);
        self
    }

    pub fn with_power_limit(mut self, power_limit: f64) -> Self {
        self.power_limit = Some(power_limit);
        self
    }

    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    pub fn with_n_poly(mut self, n_poly: usize) -> Self {
        self.options.n_poly = n_poly;
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.options.bounds = (lower, upper);
        self
    }

    pub fn with_method(mut self, method: SolverMethod) -> Self {
        self.options.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.options.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.options.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// Reject malformed requests before anything is evaluated.
    pub fn validate(&self) -> PropResult<()> {
        let opts = &self.options;
        if opts.n_poly == 0 {
            return Err(PropError::InvalidArgument(
                "n_poly must be >= 1".to_string(),
            ));
        }
        let (lo, hi) = opts.bounds;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(PropError::InvalidArgument(format!(
                "bounds must be finite with lower <= upper, got ({lo}, {hi})"
            )));
        }
        if opts.max_iterations == 0 {
            return Err(PropError::InvalidArgument(
                "max_iterations must be >= 1".to_string(),
            ));
        }
        if !opts.tolerance.is_finite() || opts.tolerance <= 0.0 {
            return Err(PropError::InvalidArgument(format!(
                "tolerance must be finite and > 0, got {}",
                opts.tolerance
            )));
        }
        if let Some(guess) = &self.initial_guess {
            if guess.len() != opts.n_poly {
                return Err(PropError::InvalidArgument(format!(
                    "initial_guess has {} coefficients, expected n_poly = {}",
                    guess.len(),
                    opts.n_poly
                )));
            }
            if guess.iter().any(|g| !g.is_finite()) {
                return Err(PropError::InvalidArgument(
                    "initial_guess must be finite".to_string(),
                ));
            }
        }
        for (name, value) in [
            ("thrust_target", self.thrust_target),
            ("power_limit", self.power_limit),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(PropError::InvalidArgument(format!(
                        "{name} must be finite, got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// The inequality that applies to this objective, if any.
    fn constraint(&self) -> Option<LoadingConstraint> {
        match self.objective {
            ObjectiveKind::MinimizePower => {
                if self.power_limit.is_some() {
                    warn!("power_limit is ignored when minimizing power");
                }
                self.thrust_target.map(LoadingConstraint::MinThrust)
            }
            ObjectiveKind::MaximizeThrust => {
                if self.thrust_target.is_some() {
                    warn!("thrust_target is ignored when maximizing thrust");
                }
                self.power_limit.map(LoadingConstraint::MaxPower)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub success: bool,
    pub optimal_coefficients: Vec<f64>,
    /// Solver objective: power [W], or negated thrust [N] when maximizing.
    pub optimal_objective_value: f64,
    /// Thrust [N] re-evaluated at `optimal_coefficients`.
    pub thrust: f64,
    /// Power [W] re-evaluated at `optimal_coefficients`.
    pub power: f64,
    pub iterations: usize,
    pub message: String,
    pub history: EvaluationHistory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoadingConstraint {
    MinThrust(f64),
    MaxPower(f64),
}

/// Loading search as a nonlinear program over the coefficient vector.
struct LoadingProblem<'a, M: ?Sized> {
    model: &'a M,
    flow: &'a FlowState,
    objective: ObjectiveKind,
    constraint: Option<LoadingConstraint>,
    history: EvaluationHistory,
}

impl<M: PerformanceModel + ?Sized> NonlinearProgram for LoadingProblem<'_, M> {
    fn objective(&mut self, x: &Array1<f64>) -> f64 {
        let perf = self.model.compute_performance(&x.to_vec(), self.flow);
        let value = match self.objective {
            ObjectiveKind::MinimizePower => perf.power,
            ObjectiveKind::MaximizeThrust => -perf.thrust,
        };
        self.history.record(value, perf.thrust, perf.power);
        value
    }

    fn has_inequality(&self) -> bool {
        self.constraint.is_some()
    }

    fn inequality(&mut self, x: &Array1<f64>) -> f64 {
        let perf = self.model.compute_performance(&x.to_vec(), self.flow);
        match self.constraint {
            Some(LoadingConstraint::MinThrust(target)) => perf.thrust - target,
            Some(LoadingConstraint::MaxPower(limit)) => limit - perf.power,
            None => 0.0,
        }
    }
}

/// `n` coefficients drawn uniformly from [1, 3).
pub fn random_initial_guess(n: usize, seed: Option<u64>) -> Vec<f64> {
    match seed {
        Some(seed) => initial_guess_with_rng(n, &mut StdRng::seed_from_u64(seed)),
        None => initial_guess_with_rng(n, &mut rand::thread_rng()),
    }
}

fn initial_guess_with_rng<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    (0..n)
        .map(|_| rng.gen_range(INITIAL_GUESS_RANGE.0..INITIAL_GUESS_RANGE.1))
        .collect()
}

/// Optimize the loading coefficients of `model` at `flow`.
///
/// Malformed requests fail with `InvalidArgument` before the model is
/// called. Solver failure is not an error: the result carries
/// `success == false`, the termination message and the partial history.
pub fn optimize_loading<M: PerformanceModel + ?Sized>(
    model: &M,
    flow: &FlowState,
    request: &OptimizationRequest,
) -> PropResult<OptimizationResult> {
    request.validate()?;
    let opts = &request.options;
    let bounds = Bounds::uniform(opts.n_poly, opts.bounds.0, opts.bounds.1);

    let guess = match &request.initial_guess {
        Some(guess) => Array1::from(guess.clone()),
        None => Array1::from(random_initial_guess(opts.n_poly, opts.seed)),
    };
    let x0 = bounds.clip(&guess);
    if x0 != guess {
        warn!("initial guess clipped into bounds [{}, {}]", opts.bounds.0, opts.bounds.1);
    }

    let mut problem = LoadingProblem {
        model,
        flow,
        objective: request.objective,
        constraint: request.constraint(),
        history: EvaluationHistory::new(),
    };
    debug!(
        "optimize_loading: {} via {}, n_poly = {}, constraint = {:?}",
        request.objective, opts.method, opts.n_poly, problem.constraint
    );

    let config = SolverConfig {
        max_iterations: opts.max_iterations,
        tolerance: opts.tolerance,
        ..SolverConfig::default()
    };
    let outcome = minimize(&mut problem, opts.method, &x0, &bounds, &config);
    let history = problem.history;

    let optimal_coefficients = outcome.x.to_vec();
    let fresh = model.compute_performance(&optimal_coefficients, flow);
    debug!(
        "optimize_loading: success = {}, {} iterations, {} evaluations, T = {:.4} N, P = {:.3} W ({})",
        outcome.success,
        outcome.iterations,
        history.len(),
        fresh.thrust,
        fresh.power,
        outcome.message
    );

    Ok(OptimizationResult {
        success: outcome.success,
        optimal_coefficients,
        optimal_objective_value: outcome.objective,
        thrust: fresh.thrust,
        power: fresh.power,
        iterations: outcome.iterations,
        message: outcome.message,
        history,
    })
}

/// [`optimize_loading`] with the objective given by name.
///
/// An unknown name fails with `InvalidArgument` before any evaluation.
pub fn optimize_loading_named<M: PerformanceModel + ?Sized>(
    model: &M,
    flow: &FlowState,
    objective: &str,
    request: &OptimizationRequest,
) -> PropResult<OptimizationResult> {
    let objective: ObjectiveKind = objective.parse()?;
    let request = OptimizationRequest {
        objective,
        ..request.clone()
    };
    optimize_loading(model, flow, &request)
}
