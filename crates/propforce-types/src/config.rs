// ─────────────────────────────────────────────────────────────────────
// PropForce — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{
    DEFAULT_BLADE_COUNT, DEFAULT_HUB_RADIUS_RATIO, DEFAULT_STATIONS, DEFAULT_SWIRL_FACTOR,
    DEFAULT_TIP_LOSS, RHO_SEA_LEVEL,
};
use crate::error::{PropError, PropResult};
use crate::state::{FlowState, Geometry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level scenario: one propeller, one operating point, model settings
/// and an optional optimization request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub geometry: GeometryConfig,
    pub flow: FlowConfig,
    #[serde(default)]
    pub model: DiskModelConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub diameter: f64,
    #[serde(default = "default_blade_count")]
    pub blade_count: u32,
    #[serde(default = "default_hub_radius_ratio")]
    pub hub_radius_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    pub velocity_inf: f64,
    pub rpm: f64,
    #[serde(default = "default_density")]
    pub density: f64,
}

/// How polynomial coefficients are turned into sectional loading [N/m].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingNormalization {
    /// Coefficients are non-dimensional; loading is scaled by ρ·n²·D³/π.
    #[default]
    RotorReference,
    /// Coefficients are already sectional loading in N/m.
    Dimensional,
}

/// Actuator-disk discretization and empirical calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskModelConfig {
    #[serde(default = "default_stations")]
    pub n_stations: usize,
    #[serde(default = "default_tip_loss")]
    pub tip_loss_factor: f64,
    #[serde(default = "default_swirl_factor")]
    pub swirl_factor: f64,
    /// Picard corrector passes on the induced-velocity estimate.
    #[serde(default = "default_corrector_steps")]
    pub corrector_steps: usize,
    #[serde(default)]
    pub normalization: LoadingNormalization,
}

/// What the loading optimizer minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Minimize shaft power, optionally subject to thrust >= target.
    #[serde(alias = "min_power")]
    MinimizePower,
    /// Maximize thrust, optionally subject to power <= limit.
    #[serde(alias = "max_thrust")]
    MaximizeThrust,
}

/// Nonlinear programming routine driving the loading search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Sequential quadratic programming.
    #[default]
    #[serde(alias = "SLSQP", alias = "sqp")]
    Slsqp,
    /// Bound-constrained augmented Lagrangian.
    #[serde(alias = "trust-constr")]
    AugmentedLagrangian,
    /// Bound-only quasi-Newton; ignores the inequality constraint.
    #[serde(alias = "l-bfgs-b", alias = "L-BFGS-B")]
    BoundedQuasiNewton,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub objective: ObjectiveKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thrust_target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_guess: Option<Vec<f64>>,
    #[serde(default = "default_n_poly")]
    pub n_poly: usize,
    #[serde(default = "default_bounds")]
    pub bounds: [f64; 2],
    #[serde(default)]
    pub method: SolverMethod,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_blade_count() -> u32 {
    DEFAULT_BLADE_COUNT
}
fn default_hub_radius_ratio() -> f64 {
    DEFAULT_HUB_RADIUS_RATIO
}
fn default_density() -> f64 {
    RHO_SEA_LEVEL
}
fn default_stations() -> usize {
    DEFAULT_STATIONS
}
fn default_tip_loss() -> f64 {
    DEFAULT_TIP_LOSS
}
fn default_swirl_factor() -> f64 {
    DEFAULT_SWIRL_FACTOR
}
fn default_corrector_steps() -> usize {
    1
}
fn default_n_poly() -> usize {
    5
}
fn default_bounds() -> [f64; 2] {
    [0.0, 10.0]
}
fn default_max_iterations() -> usize {
    200
}
fn default_tolerance() -> f64 {
    1e-6
}

impl Default for DiskModelConfig {
    fn default() -> Self {
        DiskModelConfig {
            n_stations: default_stations(),
            tip_loss_factor: default_tip_loss(),
            swirl_factor: default_swirl_factor(),
            corrector_steps: default_corrector_steps(),
            normalization: LoadingNormalization::default(),
        }
    }
}

impl DiskModelConfig {
    /// Default calibration with a custom discretization.
    pub fn with_stations(n_stations: usize, tip_loss_factor: f64) -> Self {
        DiskModelConfig {
            n_stations,
            tip_loss_factor,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> PropResult<()> {
        if self.n_stations < 2 {
            return Err(PropError::ConfigError(format!(
                "model.n_stations must be >= 2, got {}",
                self.n_stations
            )));
        }
        if !self.tip_loss_factor.is_finite()
            || self.tip_loss_factor <= 0.0
            || self.tip_loss_factor > 1.0
        {
            return Err(PropError::ConfigError(format!(
                "model.tip_loss_factor must be in (0, 1], got {}",
                self.tip_loss_factor
            )));
        }
        if !self.swirl_factor.is_finite() || self.swirl_factor < 0.0 {
            return Err(PropError::ConfigError(format!(
                "model.swirl_factor must be finite and >= 0, got {}",
                self.swirl_factor
            )));
        }
        Ok(())
    }
}

impl OptimizerConfig {
    pub fn new(objective: ObjectiveKind) -> Self {
        OptimizerConfig {
            objective,
            thrust_target: None,
            power_limit: None,
            initial_guess: None,
            n_poly: default_n_poly(),
            bounds: default_bounds(),
            method: SolverMethod::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            seed: None,
        }
    }
}

impl GeometryConfig {
    pub fn to_geometry(&self) -> PropResult<Geometry> {
        Geometry::new(self.diameter, self.blade_count, self.hub_radius_ratio)
    }
}

impl FlowConfig {
    pub fn to_flow(&self) -> PropResult<FlowState> {
        FlowState::new(self.velocity_inf, self.rpm, self.density)
    }
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file.
    pub fn from_file(path: &str) -> PropResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.model.validate()?;
        Ok(config)
    }

    pub fn geometry(&self) -> PropResult<Geometry> {
        self.geometry.to_geometry()
    }

    pub fn flow(&self) -> PropResult<FlowState> {
        self.flow.to_flow()
    }
}

// ── Name parsing ─────────────────────────────────────────────────────

impl ObjectiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectiveKind::MinimizePower => "minimize_power",
            ObjectiveKind::MaximizeThrust => "maximize_thrust",
        }
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObjectiveKind {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimize_power" | "min_power" => Ok(ObjectiveKind::MinimizePower),
            "maximize_thrust" | "max_thrust" => Ok(ObjectiveKind::MaximizeThrust),
            other => Err(PropError::InvalidArgument(format!(
                "Unknown objective: {other}. Choose from minimize_power, maximize_thrust"
            ))),
        }
    }
}

impl SolverMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SolverMethod::Slsqp => "slsqp",
            SolverMethod::AugmentedLagrangian => "augmented_lagrangian",
            SolverMethod::BoundedQuasiNewton => "bounded_quasi_newton",
        }
    }

    /// Whether the method can honour an inequality constraint.
    pub fn supports_inequality(&self) -> bool {
        !matches!(self, SolverMethod::BoundedQuasiNewton)
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverMethod {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slsqp" | "sqp" => Ok(SolverMethod::Slsqp),
            "augmented_lagrangian" | "augmented-lagrangian" | "trust-constr" => {
                Ok(SolverMethod::AugmentedLagrangian)
            }
            "bounded_quasi_newton" | "bounded-quasi-newton" | "l-bfgs-b" => {
                Ok(SolverMethod::BoundedQuasiNewton)
            }
            other => Err(PropError::InvalidArgument(format!(
                "Unknown solver method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// CARGO_MANIFEST_DIR points to crates/propforce-types/ at compile time,
    /// so we go up 2 levels to reach the workspace root.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
    }

    fn config_path(relative: &str) -> String {
        project_root().join(relative).to_string_lossy().to_string()
    }

    #[test]
    fn test_load_apc_config() {
        let cfg = ScenarioConfig::from_file(&config_path("configs/apc_10x7.json")).unwrap();
        assert_eq!(cfg.name, "APC-10x7-cruise");
        assert!((cfg.geometry.diameter - 0.254).abs() < 1e-12);
        assert_eq!(cfg.geometry.blade_count, 2);
        assert_eq!(cfg.model.n_stations, 30);
        let opt = cfg.optimizer.as_ref().unwrap();
        assert_eq!(opt.objective, ObjectiveKind::MinimizePower);
        assert_eq!(opt.thrust_target, Some(15.0));
        assert_eq!(opt.bounds, [0.0, 8.0]);
        assert_eq!(opt.method, SolverMethod::Slsqp);
    }

    #[test]
    fn test_load_static_config_defaults() {
        let cfg = ScenarioConfig::from_file(&config_path("configs/static_hover.json")).unwrap();
        assert_eq!(cfg.flow.velocity_inf, 0.0);
        assert!((cfg.flow.density - 1.225).abs() < 1e-15);
        assert_eq!(cfg.model.corrector_steps, 3);
        assert_eq!(cfg.model.normalization, LoadingNormalization::Dimensional);
        assert!(cfg.optimizer.is_none());
    }

    #[test]
    fn test_load_all_configs() {
        for relative in [
            "configs/apc_10x7.json",
            "configs/static_hover.json",
            "configs/power_limited.json",
        ] {
            let path = config_path(relative);
            let cfg = ScenarioConfig::from_file(&path);
            assert!(cfg.is_ok(), "Failed to load config: {}", path);
            let cfg = cfg.unwrap();
            assert!(cfg.geometry().is_ok());
            assert!(cfg.flow().is_ok());
        }
    }

    #[test]
    fn test_legacy_names_deserialize() {
        let json = r#"{"objective": "max_thrust", "power_limit": 200.0, "method": "trust-constr"}"#;
        let cfg: OptimizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.objective, ObjectiveKind::MaximizeThrust);
        assert_eq!(cfg.method, SolverMethod::AugmentedLagrangian);
        assert_eq!(cfg.n_poly, 5);
        assert_eq!(cfg.bounds, [0.0, 10.0]);
        assert_eq!(cfg.max_iterations, 200);
    }

    #[test]
    fn test_unknown_objective_rejected_by_serde() {
        let json = r#"{"objective": "min_noise"}"#;
        let parsed: Result<OptimizerConfig, _> = serde_json::from_str(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_objective_from_str() {
        assert_eq!(
            "min_power".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::MinimizePower
        );
        assert_eq!(
            "Maximize_Thrust".parse::<ObjectiveKind>().unwrap(),
            ObjectiveKind::MaximizeThrust
        );
        assert!(matches!(
            "min_noise".parse::<ObjectiveKind>(),
            Err(PropError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_solver_from_str() {
        assert_eq!("SLSQP".parse::<SolverMethod>().unwrap(), SolverMethod::Slsqp);
        assert_eq!(
            "L-BFGS-B".parse::<SolverMethod>().unwrap(),
            SolverMethod::BoundedQuasiNewton
        );
        assert!("nelder-mead".parse::<SolverMethod>().is_err());
        assert!(!SolverMethod::BoundedQuasiNewton.supports_inequality());
    }

    #[test]
    fn test_model_config_validation() {
        assert!(DiskModelConfig::default().validate().is_ok());
        assert!(DiskModelConfig::with_stations(1, 0.95).validate().is_err());
        assert!(DiskModelConfig::with_stations(30, 0.0).validate().is_err());
        assert!(DiskModelConfig::with_stations(30, 1.01).validate().is_err());
        assert!(DiskModelConfig::with_stations(30, 1.0).validate().is_ok());
        let cfg = DiskModelConfig {
            swirl_factor: -0.1,
            ..DiskModelConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PropError::ConfigError(_))));
    }

    #[test]
    fn test_roundtrip_serialization() {
        let cfg = ScenarioConfig::from_file(&config_path("configs/apc_10x7.json")).unwrap();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let cfg2: ScenarioConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.name, cfg2.name);
        assert_eq!(cfg.model.n_stations, cfg2.model.n_stations);
        assert_eq!(
            cfg.optimizer.as_ref().map(|o| o.bounds),
            cfg2.optimizer.as_ref().map(|o| o.bounds)
        );
    }
}
