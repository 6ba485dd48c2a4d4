// ─────────────────────────────────────────────────────────────────────
// PropForce — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Sea-level ISA air density (kg/m³).
pub const RHO_SEA_LEVEL: f64 = 1.225;

/// Default blade count. The actuator disk does not resolve blades;
/// the count is carried for reporting only.
pub const DEFAULT_BLADE_COUNT: u32 = 2;

/// Default hub radius as a fraction of tip radius.
pub const DEFAULT_HUB_RADIUS_RATIO: f64 = 0.2;

/// Default number of radial stations.
pub const DEFAULT_STATIONS: usize = 30;

/// Default tip-loss factor, mimics a Prandtl correction (0.9-1.0 typical).
pub const DEFAULT_TIP_LOSS: f64 = 0.95;

/// Torque proxy calibration: dQ/dr = SWIRL_FACTOR · dT/dr · r.
/// Empirical, no independent physical derivation.
pub const DEFAULT_SWIRL_FACTOR: f64 = 0.05;

/// Normalized radius where the tip taper starts.
pub const TAPER_START: f64 = 0.7;

/// Velocity guard in the first induced-velocity estimate (m/s).
pub const EPS_VELOCITY: f64 = 1e-3;

/// Denominator guard in the momentum equation.
pub const EPS_MOMENTUM: f64 = 1e-6;

/// Guard on the advance-ratio denominator.
pub const EPS_ADVANCE: f64 = 1e-9;

/// Guard on the CT / CP denominators.
pub const EPS_COEFF: f64 = 1e-12;

/// Below this CP the efficiency is reported as zero.
pub const CP_MIN_FOR_EFFICIENCY: f64 = 1e-9;

/// Below this power (W) propulsive efficiency is reported as zero.
pub const POWER_MIN_FOR_EFFICIENCY: f64 = 1e-6;
