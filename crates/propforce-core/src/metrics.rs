//! Non-dimensional propeller coefficients.

use propforce_types::constants::{
    CP_MIN_FOR_EFFICIENCY, EPS_ADVANCE, EPS_COEFF, POWER_MIN_FOR_EFFICIENCY,
};
use propforce_types::state::{FlowState, Geometry, PerformanceCoefficients};

/// J, CT, CP and η for a thrust/power pair at an operating point.
///
/// Denominators are epsilon-guarded; η is 0 when CP is negligible.
pub fn compute_coefficients(
    thrust: f64,
    power: f64,
    geometry: &Geometry,
    flow: &FlowState,
) -> PerformanceCoefficients {
    let n = flow.rev_per_sec();
    let d = geometry.diameter();
    let rho = flow.density();

    let advance_ratio = flow.velocity_inf() / (n * d + EPS_ADVANCE);
    let thrust_coeff = thrust / (rho * n.powi(2) * d.powi(4) + EPS_COEFF);
    let power_coeff = power / (rho * n.powi(3) * d.powi(5) + EPS_COEFF);
    let efficiency = if power_coeff > CP_MIN_FOR_EFFICIENCY {
        advance_ratio * thrust_coeff / (power_coeff + EPS_COEFF)
    } else {
        0.0
    };

    PerformanceCoefficients {
        advance_ratio,
        thrust_coeff,
        power_coeff,
        efficiency,
    }
}

/// Propulsive efficiency η = T·V / P, zero for negligible power.
pub fn compute_efficiency(thrust: f64, power: f64, velocity: f64) -> f64 {
    if power < POWER_MIN_FOR_EFFICIENCY {
        return 0.0;
    }
    thrust * velocity / power
}
