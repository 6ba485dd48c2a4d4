// ─────────────────────────────────────────────────────────────────────
// PropForce — Actuator Disk
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radial actuator disk driven by a polynomial loading distribution.
//!
//! The rotor is replaced by an annulus from hub to tip, sampled at
//! `n_stations` equally spaced radii. A coefficient vector `c` defines the
//! non-dimensional loading shape `Σ cᵢ·(r/R)ⁱ`, tapered toward the tip and
//! clamped at zero. Induced velocity follows linearized momentum theory
//! with a fixed number of Picard corrections (one by default). Thrust,
//! torque and power are trapezoidal integrals over the grid.
//!
//! Every evaluation is a pure function of `(coefficients, flow)`. The grid is
//! built once and never mutated, so a model can be shared across threads.

use log::debug;
use ndarray::Array1;
use propforce_math::integrate::trapezoid_uniform;
use propforce_math::poly::polyval;
use propforce_types::config::{DiskModelConfig, LoadingNormalization, ScenarioConfig};
use propforce_types::constants::{EPS_MOMENTUM, EPS_VELOCITY, TAPER_START};
use propforce_types::error::PropResult;
use propforce_types::state::{FlowState, Geometry, PerformanceResult};
use std::f64::consts::PI;

/// Anything that maps loading coefficients and an operating point to
/// integrated rotor performance.
pub trait PerformanceModel {
    fn geometry(&self) -> &Geometry;

    fn compute_performance(&self, coefficients: &[f64], flow: &FlowState) -> PerformanceResult;
}

/// Radial stations from hub to tip, strictly increasing.
#[derive(Debug, Clone)]
pub struct RadialGrid {
    radii: Array1<f64>,
    normalized: Array1<f64>,
    spacing: f64,
}

impl RadialGrid {
    /// `n_stations` radii spaced evenly on `[hub_radius, radius]`.
    /// The last station sits exactly on the tip.
    pub fn new(geometry: &Geometry, n_stations: usize) -> Self {
        let tip = geometry.radius();
        let mut radii = Array1::linspace(geometry.hub_radius(), tip, n_stations);
        if n_stations > 0 {
            radii[n_stations - 1] = tip;
        }
        let normalized = radii.mapv(|r| r / tip);
        let spacing = if n_stations >= 2 {
            radii[1] - radii[0]
        } else {
            0.0
        };
        RadialGrid {
            radii,
            normalized,
            spacing,
        }
    }

    /// Station radii [m].
    pub fn radii(&self) -> &Array1<f64> {
        &self.radii
    }

    /// Station radii divided by the tip radius, in (0, 1].
    pub fn normalized(&self) -> &Array1<f64> {
        &self.normalized
    }

    /// Uniform station spacing [m].
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }
}

/// Radial actuator-disk model with a precomputed station grid.
#[derive(Debug, Clone)]
pub struct ActuatorDiskModel {
    geometry: Geometry,
    grid: RadialGrid,
    config: DiskModelConfig,
}

impl ActuatorDiskModel {
    /// Build the model and its radial grid.
    ///
    /// Fails with `ConfigError` if the discretization or calibration in
    /// `config` is invalid.
    pub fn new(geometry: Geometry, config: DiskModelConfig) -> PropResult<Self> {
        config.validate()?;
        let grid = RadialGrid::new(&geometry, config.n_stations);
        debug!(
            "actuator disk: D = {:.4} m, {} stations on [{:.4}, {:.4}] m, tip loss {}",
            geometry.diameter(),
            grid.len(),
            geometry.hub_radius(),
            geometry.radius(),
            config.tip_loss_factor
        );
        Ok(ActuatorDiskModel {
            geometry,
            grid,
            config,
        })
    }

    /// Default calibration with a custom station count and tip-loss factor.
    pub fn with_stations(
        geometry: Geometry,
        n_stations: usize,
        tip_loss_factor: f64,
    ) -> PropResult<Self> {
        Self::new(
            geometry,
            DiskModelConfig::with_stations(n_stations, tip_loss_factor),
        )
    }

    /// Model for the geometry and model settings of a scenario file.
    pub fn from_scenario(scenario: &ScenarioConfig) -> PropResult<Self> {
        Self::new(scenario.geometry()?, scenario.model.clone())
    }

    pub fn grid(&self) -> &RadialGrid {
        &self.grid
    }

    pub fn config(&self) -> &DiskModelConfig {
        &self.config
    }

    /// Tip-relief multiplier at normalized radius `r_norm`.
    ///
    /// 1.0 inboard of 0.7, falling linearly to `tip_loss_factor` at the tip,
    /// always within `[tip_loss_factor, 1]`.
    pub fn tip_taper(&self, r_norm: f64) -> f64 {
        let tip = self.config.tip_loss_factor;
        let taper = 1.0 - (1.0 - tip) * (r_norm - TAPER_START) / (1.0 - TAPER_START);
        taper.clamp(tip, 1.0)
    }

    /// Non-dimensional loading shape at every station, never negative.
    pub fn compute_loading(&self, coefficients: &[f64]) -> Array1<f64> {
        self.grid
            .normalized
            .mapv(|x| (polyval(coefficients, x) * self.tip_taper(x)).max(0.0))
    }

    /// Loading scale [N/m] that turns the shape into sectional thrust.
    ///
    /// `ρ·n²·D³/π` for rotor-referenced coefficients, 1 for dimensional ones.
    pub fn reference_loading(&self, flow: &FlowState) -> f64 {
        match self.config.normalization {
            LoadingNormalization::RotorReference => {
                let n = flow.rev_per_sec();
                let d = self.geometry.diameter();
                d * d * d * flow.density() * n * n / PI
            }
            LoadingNormalization::Dimensional => 1.0,
        }
    }

    /// Sectional loading [N/m] for an operating point.
    pub fn sectional_loading(&self, coefficients: &[f64], flow: &FlowState) -> Array1<f64> {
        let q_ref = self.reference_loading(flow);
        self.compute_loading(coefficients) * q_ref
    }

    /// Axial induced velocity [m/s] for a sectional loading [N/m].
    ///
    /// First estimate uses the freestream alone; each corrector pass then
    /// substitutes `V + w/2` as the effective velocity.
    pub fn compute_induced_velocity(&self, loading: &Array1<f64>, flow: &FlowState) -> Array1<f64> {
        let rho = flow.density();
        let v = flow.velocity_inf();
        let r = &self.grid.radii;

        let mut w = Array1::from_shape_fn(loading.len(), |i| {
            loading[i] / (4.0 * PI * rho * (v + EPS_VELOCITY) * r[i] + EPS_MOMENTUM)
        });
        for _ in 0..self.config.corrector_steps {
            w = Array1::from_shape_fn(loading.len(), |i| {
                loading[i] / (4.0 * PI * rho * (v + 0.5 * w[i]) * r[i] + EPS_MOMENTUM)
            });
        }
        w
    }

    /// Integrated thrust, torque and power with their radial distributions.
    pub fn compute_performance(&self, coefficients: &[f64], flow: &FlowState) -> PerformanceResult {
        let loading = self.sectional_loading(coefficients, flow);
        let induced_velocity = self.compute_induced_velocity(&loading, flow);
        let r = &self.grid.radii;
        let dx = self.grid.spacing;
        let v = flow.velocity_inf();

        let thrust = trapezoid_uniform(&loading, dx);

        // Swirl proxy: dQ/dr = k·dT/dr·r
        let swirl = self.config.swirl_factor;
        let torque_density = Array1::from_shape_fn(loading.len(), |i| swirl * loading[i] * r[i]);
        let torque = trapezoid_uniform(&torque_density, dx);

        let axial_density =
            Array1::from_shape_fn(loading.len(), |i| loading[i] * (v + induced_velocity[i]));
        let power = trapezoid_uniform(&axial_density, dx) + torque * flow.angular_rate();

        PerformanceResult {
            thrust,
            torque,
            power,
            loading,
            induced_velocity,
        }
    }
}

impl PerformanceModel for ActuatorDiskModel {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn compute_performance(&self, coefficients: &[f64], flow: &FlowState) -> PerformanceResult {
        ActuatorDiskModel::compute_performance(self, coefficients, flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propforce_types::error::PropError;

    const ELLIPTIC: [f64; 5] = [0.5, 1.0, 3.0, -1.5, 0.0];

    fn apc_model() -> ActuatorDiskModel {
        ActuatorDiskModel::with_stations(Geometry::with_diameter(0.254).unwrap(), 30, 0.95)
            .unwrap()
    }

    #[test]
    fn test_grid_spans_hub_to_tip() {
        let model = apc_model();
        let grid = model.grid();
        assert_eq!(grid.len(), 30);
        assert!((grid.radii()[0] - 0.0254).abs() < 1e-15);
        assert_eq!(grid.radii()[29], 0.127);
        assert_eq!(grid.normalized()[29], 1.0);
        for i in 1..grid.len() {
            assert!(grid.radii()[i] > grid.radii()[i - 1]);
        }
        assert!((grid.spacing() - (0.127 - 0.0254) / 29.0).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_single_station() {
        let geom = Geometry::with_diameter(0.254).unwrap();
        assert!(matches!(
            ActuatorDiskModel::with_stations(geom, 1, 0.95),
            Err(PropError::ConfigError(_))
        ));
        assert!(ActuatorDiskModel::with_stations(geom, 30, 0.0).is_err());
        assert!(ActuatorDiskModel::with_stations(geom, 30, 1.2).is_err());
    }

    #[test]
    fn test_tip_taper_profile() {
        let model = apc_model();
        assert_eq!(model.tip_taper(0.3), 1.0);
        assert_eq!(model.tip_taper(0.7), 1.0);
        assert!((model.tip_taper(0.85) - 0.975).abs() < 1e-12);
        assert!((model.tip_taper(1.0) - 0.95).abs() < 1e-12);
        assert_eq!(model.tip_taper(1.5), 0.95);
    }

    #[test]
    fn test_loading_clamped_non_negative() {
        let model = apc_model();
        let loading = model.compute_loading(&[-1.0, 0.5, 0.0]);
        assert!(loading.iter().all(|&l| l >= 0.0));
        // -1 + 0.5·x < 0 everywhere on (0, 1]
        assert!(loading.iter().all(|&l| l == 0.0));
    }

    #[test]
    fn test_uniform_loading_tapers_at_tip() {
        let model = apc_model();
        let loading = model.compute_loading(&[2.0]);
        assert_eq!(loading[0], 2.0);
        assert!((loading[29] - 1.9).abs() < 1e-12);
    }

    #[test]
    fn test_zero_coefficients_zero_performance() {
        let model = apc_model();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        let perf = model.compute_performance(&[0.0; 5], &flow);
        assert!(perf.thrust.abs() < 1e-6);
        assert!(perf.power.abs() < 1e-6);
        assert!(perf.induced_velocity.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_reference_loading_scales_with_rpm_squared() {
        let model = apc_model();
        let slow = FlowState::sea_level(10.0, 2500.0).unwrap();
        let fast = FlowState::sea_level(10.0, 5000.0).unwrap();
        let ratio = model.reference_loading(&fast) / model.reference_loading(&slow);
        assert!((ratio - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimensional_mode_is_unscaled() {
        let geom = Geometry::with_diameter(0.254).unwrap();
        let config = DiskModelConfig {
            normalization: LoadingNormalization::Dimensional,
            ..DiskModelConfig::default()
        };
        let model = ActuatorDiskModel::new(geom, config).unwrap();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        assert_eq!(model.reference_loading(&flow), 1.0);
        let perf = model.compute_performance(&ELLIPTIC, &flow);
        assert_eq!(perf.loading, model.compute_loading(&ELLIPTIC));
    }

    #[test]
    fn test_regression_baseline() {
        let model = apc_model();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        let perf = model.compute_performance(&ELLIPTIC, &flow);
        assert!((perf.thrust - 8.324).abs() < 0.01, "T = {}", perf.thrust);
        assert!((perf.power - 145.18).abs() < 0.1, "P = {}", perf.power);
        assert!((perf.torque - 0.03583).abs() < 1e-4, "Q = {}", perf.torque);
    }

    #[test]
    fn test_corrector_steps_zero_returns_first_estimate() {
        let geom = Geometry::with_diameter(0.254).unwrap();
        let config = DiskModelConfig {
            corrector_steps: 0,
            ..DiskModelConfig::default()
        };
        let model = ActuatorDiskModel::new(geom, config).unwrap();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        let loading = model.sectional_loading(&ELLIPTIC, &flow);
        let w = model.compute_induced_velocity(&loading, &flow);
        let r = model.grid().radii();
        for i in 0..w.len() {
            let expected = loading[i] / (4.0 * PI * 1.225 * (10.0 + 1e-3) * r[i] + 1e-6);
            assert_eq!(w[i], expected);
        }
    }

    #[test]
    fn test_corrector_reduces_induced_velocity() {
        let model = apc_model();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        let loading = model.sectional_loading(&ELLIPTIC, &flow);
        let first = Array1::from_shape_fn(loading.len(), |i| {
            loading[i] / (4.0 * PI * 1.225 * (10.0 + 1e-3) * model.grid().radii()[i] + 1e-6)
        });
        let corrected = model.compute_induced_velocity(&loading, &flow);
        for i in 0..loading.len() {
            assert!(corrected[i] <= first[i]);
            assert!(corrected[i] >= 0.0);
        }
    }

    #[test]
    fn test_trait_dispatch_matches_inherent() {
        let model = apc_model();
        let flow = FlowState::sea_level(10.0, 5000.0).unwrap();
        let dynamic: &dyn PerformanceModel = &model;
        assert_eq!(
            dynamic.compute_performance(&ELLIPTIC, &flow),
            model.compute_performance(&ELLIPTIC, &flow)
        );
        assert_eq!(dynamic.geometry().diameter(), 0.254);
    }

    #[test]
    fn test_model_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ActuatorDiskModel>();
    }
}
