// ─────────────────────────────────────────────────────────────────────
// PropForce — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DEFAULT_BLADE_COUNT, DEFAULT_HUB_RADIUS_RATIO, RHO_SEA_LEVEL};
use crate::error::{PropError, PropResult};
use ndarray::Array1;
use serde::Serialize;
use std::f64::consts::PI;

/// Propeller shape descriptor. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    diameter: f64,
    blade_count: u32,
    hub_radius_ratio: f64,
}

impl Geometry {
    /// Build a geometry, rejecting non-positive diameters, zero blades and
    /// hub ratios outside (0, 1).
    pub fn new(diameter: f64, blade_count: u32, hub_radius_ratio: f64) -> PropResult<Self> {
        if !diameter.is_finite() || diameter <= 0.0 {
            return Err(PropError::InvalidGeometry(format!(
                "diameter must be finite and > 0, got {diameter}"
            )));
        }
        if blade_count == 0 {
            return Err(PropError::InvalidGeometry(
                "blade_count must be >= 1".to_string(),
            ));
        }
        if !hub_radius_ratio.is_finite() || hub_radius_ratio <= 0.0 || hub_radius_ratio >= 1.0 {
            return Err(PropError::InvalidGeometry(format!(
                "hub_radius_ratio must be in (0, 1), got {hub_radius_ratio}"
            )));
        }
        Ok(Geometry {
            diameter,
            blade_count,
            hub_radius_ratio,
        })
    }

    /// Two blades, hub at 20% radius.
    pub fn with_diameter(diameter: f64) -> PropResult<Self> {
        Self::new(diameter, DEFAULT_BLADE_COUNT, DEFAULT_HUB_RADIUS_RATIO)
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }

    pub fn hub_radius_ratio(&self) -> f64 {
        self.hub_radius_ratio
    }

    /// Tip radius [m].
    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    /// Hub radius [m].
    pub fn hub_radius(&self) -> f64 {
        self.radius() * self.hub_radius_ratio
    }

    /// Swept annulus area between hub and tip [m²].
    pub fn annulus_area(&self) -> f64 {
        let r = self.radius();
        let rh = self.hub_radius();
        PI * (r * r - rh * rh)
    }
}

/// Operating condition of the rotor. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowState {
    velocity_inf: f64,
    rpm: f64,
    density: f64,
}

impl FlowState {
    pub fn new(velocity_inf: f64, rpm: f64, density: f64) -> PropResult<Self> {
        if !velocity_inf.is_finite() || velocity_inf < 0.0 {
            return Err(PropError::InvalidFlow(format!(
                "freestream velocity must be finite and >= 0, got {velocity_inf}"
            )));
        }
        if !rpm.is_finite() || rpm <= 0.0 {
            return Err(PropError::InvalidFlow(format!(
                "rpm must be finite and > 0, got {rpm}"
            )));
        }
        if !density.is_finite() || density <= 0.0 {
            return Err(PropError::InvalidFlow(format!(
                "density must be finite and > 0, got {density}"
            )));
        }
        Ok(FlowState {
            velocity_inf,
            rpm,
            density,
        })
    }

    /// Flow at sea-level density.
    pub fn sea_level(velocity_inf: f64, rpm: f64) -> PropResult<Self> {
        Self::new(velocity_inf, rpm, RHO_SEA_LEVEL)
    }

    /// Same velocity and density at a different shaft speed.
    pub fn with_rpm(&self, rpm: f64) -> PropResult<Self> {
        Self::new(self.velocity_inf, rpm, self.density)
    }

    pub fn velocity_inf(&self) -> f64 {
        self.velocity_inf
    }

    pub fn rpm(&self) -> f64 {
        self.rpm
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Ω [rad/s].
    pub fn angular_rate(&self) -> f64 {
        self.rpm * 2.0 * PI / 60.0
    }

    /// n [rev/s].
    pub fn rev_per_sec(&self) -> f64 {
        self.rpm / 60.0
    }
}

/// Integrated forces plus the radial distributions they came from.
/// `loading` [N/m] and `induced_velocity` [m/s] are aligned with the
/// model's radial grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceResult {
    pub thrust: f64,
    pub torque: f64,
    pub power: f64,
    pub loading: Array1<f64>,
    pub induced_velocity: Array1<f64>,
}

/// Non-dimensional propeller coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceCoefficients {
    /// J = V / (n·D)
    pub advance_ratio: f64,
    /// CT = T / (ρ·n²·D⁴)
    pub thrust_coeff: f64,
    /// CP = P / (ρ·n³·D⁵)
    pub power_coeff: f64,
    /// η = J·CT / CP
    pub efficiency: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_derived_radii() {
        let geom = Geometry::new(0.254, 2, 0.2).unwrap();
        assert!((geom.radius() - 0.127).abs() < 1e-15);
        assert!((geom.hub_radius() - 0.0254).abs() < 1e-15);
        assert!(geom.hub_radius() < geom.radius());
    }

    #[test]
    fn test_geometry_defaults() {
        let geom = Geometry::with_diameter(0.3).unwrap();
        assert_eq!(geom.blade_count(), 2);
        assert!((geom.hub_radius_ratio() - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_geometry_rejects_bad_hub_ratio() {
        assert!(Geometry::new(0.25, 2, 1.0).is_err());
        assert!(Geometry::new(0.25, 2, 0.0).is_err());
        assert!(Geometry::new(0.25, 2, f64::NAN).is_err());
    }

    #[test]
    fn test_geometry_rejects_zero_blades_and_diameter() {
        assert!(matches!(
            Geometry::new(0.25, 0, 0.2),
            Err(PropError::InvalidGeometry(_))
        ));
        assert!(Geometry::new(0.0, 2, 0.2).is_err());
        assert!(Geometry::new(-1.0, 2, 0.2).is_err());
    }

    #[test]
    fn test_annulus_area() {
        let geom = Geometry::new(2.0, 2, 0.5).unwrap();
        assert!((geom.annulus_area() - PI * 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_flow_derived_rates() {
        let flow = FlowState::sea_level(10.0, 6000.0).unwrap();
        assert!((flow.rev_per_sec() - 100.0).abs() < 1e-12);
        assert!((flow.angular_rate() - 200.0 * PI).abs() < 1e-9);
        assert!((flow.density() - 1.225).abs() < 1e-15);
    }

    #[test]
    fn test_flow_static_thrust_allowed() {
        let flow = FlowState::new(0.0, 5000.0, 1.225).unwrap();
        assert_eq!(flow.velocity_inf(), 0.0);
    }

    #[test]
    fn test_flow_rejects_invalid() {
        assert!(matches!(
            FlowState::new(-1.0, 5000.0, 1.225),
            Err(PropError::InvalidFlow(_))
        ));
        assert!(FlowState::new(10.0, 0.0, 1.225).is_err());
        assert!(FlowState::new(10.0, 5000.0, 0.0).is_err());
        assert!(FlowState::new(f64::INFINITY, 5000.0, 1.225).is_err());
    }

    #[test]
    fn test_with_rpm_keeps_velocity_and_density() {
        let flow = FlowState::new(12.0, 3000.0, 1.1).unwrap();
        let faster = flow.with_rpm(9000.0).unwrap();
        assert_eq!(faster.velocity_inf(), 12.0);
        assert_eq!(faster.density(), 1.1);
        assert_eq!(faster.rpm(), 9000.0);
    }
}
