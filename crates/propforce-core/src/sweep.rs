// ─────────────────────────────────────────────────────────────────────
// PropForce — Sweeps
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! RPM sweeps and thrust matching on top of a [`PerformanceModel`].

use crate::disk::PerformanceModel;
use crate::metrics::compute_coefficients;
use propforce_types::error::PropResult;
use propforce_types::state::{FlowState, PerformanceCoefficients};
use rayon::prelude::*;
use serde::Serialize;

/// Guard on the reference thrust when rescaling a loading shape.
const MATCH_THRUST_EPS: f64 = 1e-9;

/// Performance map over shaft speed. All vectors share the `rpm` indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceSweep {
    pub rpm: Vec<f64>,
    pub thrust: Vec<f64>,
    pub power: Vec<f64>,
    pub advance_ratio: Vec<f64>,
    pub thrust_coeff: Vec<f64>,
    pub power_coeff: Vec<f64>,
    pub efficiency: Vec<f64>,
}

impl PerformanceSweep {
    pub fn len(&self) -> usize {
        self.rpm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rpm.is_empty()
    }
}

/// One row of a sweep.
struct SweepPoint {
    rpm: f64,
    thrust: f64,
    power: f64,
    coefficients: PerformanceCoefficients,
}

fn sweep_point<M: PerformanceModel + ?Sized>(
    model: &M,
    coefficients: &[f64],
    rpm: f64,
    velocity: f64,
    density: f64,
) -> PropResult<SweepPoint> {
    let flow = FlowState::new(velocity, rpm, density)?;
    let perf = model.compute_performance(coefficients, &flow);
    Ok(SweepPoint {
        rpm,
        thrust: perf.thrust,
        power: perf.power,
        coefficients: compute_coefficients(perf.thrust, perf.power, model.geometry(), &flow),
    })
}

fn assemble(points: Vec<SweepPoint>) -> PerformanceSweep {
    let mut sweep = PerformanceSweep::default();
    for p in points {
        sweep.rpm.push(p.rpm);
        sweep.thrust.push(p.thrust);
        sweep.power.push(p.power);
        sweep.advance_ratio.push(p.coefficients.advance_ratio);
        sweep.thrust_coeff.push(p.coefficients.thrust_coeff);
        sweep.power_coeff.push(p.coefficients.power_coeff);
        sweep.efficiency.push(p.coefficients.efficiency);
    }
    sweep
}

/// Evaluate `coefficients` at each shaft speed in `rpms`.
///
/// Fails with `InvalidFlow` on the first non-positive or non-finite speed.
pub fn performance_sweep<M: PerformanceModel + ?Sized>(
    model: &M,
    coefficients: &[f64],
    rpms: &[f64],
    velocity: f64,
    density: f64,
) -> PropResult<PerformanceSweep> {
    let points = rpms
        .iter()
        .map(|&rpm| sweep_point(model, coefficients, rpm, velocity, density))
        .collect::<PropResult<Vec<_>>>()?;
    Ok(assemble(points))
}

/// [`performance_sweep`] with the speeds evaluated in parallel via Rayon.
///
/// Output order follows `rpms`; results are identical to the serial sweep.
pub fn par_performance_sweep<M: PerformanceModel + Sync + ?Sized>(
    model: &M,
    coefficients: &[f64],
    rpms: &[f64],
    velocity: f64,
    density: f64,
) -> PropResult<PerformanceSweep> {
    let points = rpms
        .par_iter()
        .map(|&rpm| sweep_point(model, coefficients, rpm, velocity, density))
        .collect::<PropResult<Vec<_>>>()?;
    Ok(assemble(points))
}

/// Rescale `base_coefficients` so the model produces `target_thrust`.
///
/// Thrust is linear in the coefficients while the loading stays
/// non-negative, so a single evaluation fixes the scale.
pub fn match_thrust<M: PerformanceModel + ?Sized>(
    model: &M,
    base_coefficients: &[f64],
    target_thrust: f64,
    flow: &FlowState,
) -> Vec<f64> {
    let reference = model.compute_performance(base_coefficients, flow).thrust;
    let scale = target_thrust / (reference + MATCH_THRUST_EPS);
    base_coefficients.iter().map(|c| c * scale).collect()
}
